use crate::cli::TrackerCli;
use crate::error::ProbeError;
use tracing::info;

pub const NOT_INSTALLED_MESSAGE: &str = "It looks like the CoffeeCup CLI is not installed!";
pub const REMEDIATION_URL: &str = "https://github.com/fischeversenker/coffeecup-cli";

/// Checks once that the tracker binary answers `version`.
///
/// On success returns the first line it printed.
pub async fn probe(cli: &TrackerCli) -> Result<String, ProbeError> {
    let output = cli.version().await.map_err(|failure| ProbeError {
        program: cli.program().to_string(),
        failure,
    })?;
    let version = output.stdout.lines().next().unwrap_or("").trim().to_string();
    info!(event = "tracker_available", program = %cli.program(), version = %version);
    Ok(version)
}
