//! CLI errors and their process exit codes (0 ok, 2 usage via clap,
//! 10 simulation, 11 I/O, 12 input, 13 serialization).

use flowfield_core::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Scene validation or simulation setup failed.
    #[error(transparent)]
    Sim(FlowError),
    /// Reading the scene or writing the snapshot failed.
    #[error("{0}")]
    Io(String),
    /// Unparseable scene, `--params` or `--background`.
    #[error("{0}")]
    Input(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Sim(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl From<FlowError> for CliError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Io(msg) => CliError::Io(msg),
            err @ FlowError::InvalidColor(_) => CliError::Input(err.to_string()),
            other => CliError::Sim(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_errors_route_by_kind() {
        let routed = [
            (FlowError::InvalidScene("no fields".into()), 10, "no fields"),
            (FlowError::InvalidDimensions, 10, "dimensions"),
            (FlowError::Io("disk full".into()), 11, "disk full"),
            (FlowError::InvalidColor("#zz".into()), 12, "#zz"),
        ];
        for (flow, code, text) in routed {
            let cli = CliError::from(flow);
            assert_eq!(cli.exit_code(), code, "{cli}");
            assert!(cli.to_string().contains(text), "{cli}");
        }
    }

    #[test]
    fn json_output_failure_is_serialization() {
        let bad = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        assert_eq!(CliError::from(bad).exit_code(), 13);
    }
}
