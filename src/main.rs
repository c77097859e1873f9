use std::process::ExitCode;

use batch_core::InMemoryEventStore;
use batch_persistence::JsonLinesEventStore;
use batchflow::{serve, AppConfig};
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };

    let report = match &cfg.run_log {
        Some(path) => match JsonLinesEventStore::open(path) {
            Ok(store) => serve(&cfg, store).await,
            Err(e) => {
                error!("cannot open run log {}: {e}", path.display());
                return ExitCode::from(2);
            }
        },
        None => serve(&cfg, InMemoryEventStore::default()).await,
    };

    info!("stopped after {} ticks: {} completed, {} failed, {} stopped, {} rejected",
          report.ticks,
          report.completed,
          report.failed,
          report.stopped,
          report.rejected);
    ExitCode::SUCCESS
}
