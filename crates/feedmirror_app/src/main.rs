mod config;
mod logging;
mod run;

use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::initialize(logging::LogDestination::Terminal);

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_FILE.to_string());

    match run::run(Path::new(&config_path)) {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            log::error!("{} of {} feed jobs failed", summary.failed, summary.total);
            ExitCode::FAILURE
        }
        Err(err) => {
            log::error!("run aborted: {err:#}");
            ExitCode::FAILURE
        }
    }
}
