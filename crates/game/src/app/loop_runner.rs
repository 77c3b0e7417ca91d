use std::process::ExitCode;

use engine::run_app_with_metrics;
use tracing::{error, info};

use super::bootstrap::{AppWiring, GameError};

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app_with_metrics(app.config, app.scene, app.metrics) {
        error!(error = %GameError::from(err), "startup_failed");
        return ExitCode::FAILURE;
    }

    info!("=== Space Colony Shutdown ===");
    ExitCode::SUCCESS
}
