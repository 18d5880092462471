use anyhow::Result;
use habit_tracker::{cli::run_cli, utils::runtime::single_thread_runtime};
use tracing::error;

fn main() -> Result<()> {
    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(run_cli()).inspect_err(|e| {
        error!("Error running cli {e:?}");
    });
    // stdin reads sit on the blocking pool and never finish on their own
    runtime.shutdown_background();
    result
}
