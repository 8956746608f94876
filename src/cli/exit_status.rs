use std::process::ExitCode;

/// Exit status of a CLI command.
///
/// - `Success` (0): Command completed
/// - `Failure` (1): Command refused to run (e.g. `init` with an existing config)
/// - `Error` (2): Command failed (config error, plural conflict, unwritable output, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
