//! flagbind demo: bind a sample configuration from the process arguments
//! and print the result as JSON.

use anyhow::{Context, Result};
use flagbind::{bind, bindable};

bindable! {
    /// Settings for a synthetic batch worker.
    #[derive(Debug, PartialEq, serde::Serialize)]
    pub struct WorkerConfig {
        /// Parallel worker count.
        threads: u32 = 1,
        /// Items emitted per second.
        rate: f64 = 10.0,
        /// Name shown in summaries.
        label: String = String::from("worker"),
        /// Print progress while running.
        verbose: bool = false,
        /// Optional RNG seed; time-based when absent.
        seed: Option<u64> = None,
    }
}

fn main() -> Result<()> {
    let config: WorkerConfig = bind().context("failed to bind arguments")?;

    let rendered =
        serde_json::to_string_pretty(&config).context("failed to render configuration")?;
    println!("{}", rendered);

    Ok(())
}
