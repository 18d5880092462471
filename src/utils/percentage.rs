use std::{fmt::Display, ops::Deref};

/// Whole-number percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(u32);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub const FULL: Percentage = Percentage(100);

    pub fn new_opt(value: u32) -> Option<Percentage> {
        if value > 100 {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Share of `value` in `whole`, rounded half away from zero and capped at 100.
    /// An empty `whole` counts as fully done once anything has been recorded.
    ///
    /// 100% is reserved for `value >= whole`, so 199 of 200 reports 99%.
    pub fn of(value: u64, whole: u64) -> Percentage {
        if whole == 0 {
            return if value > 0 { Self::FULL } else { Percentage(0) };
        }
        if value >= whole {
            return Self::FULL;
        }
        let rounded = (value as f64 * 100. / whole as f64).round() as u32;
        Percentage(rounded.min(99))
    }

    /// Rounded mean of the given percentages. Zero for an empty input.
    pub fn average(values: impl IntoIterator<Item = Percentage>) -> Percentage {
        let (sum, count) = values
            .into_iter()
            .fold((0u32, 0u32), |(sum, count), v| (sum + v.0, count + 1));
        if count == 0 {
            Percentage(0)
        } else {
            Percentage((sum as f64 / count as f64).round() as u32)
        }
    }
}

impl Deref for Percentage {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
