use anyhow::Result;

/// The tracker runs on a single thread: the menu and the reminder only interleave at await
/// points, so the habit list never needs a lock.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
