use std::process::ExitStatus;

use log::debug;
use snafu::{ResultExt, Snafu};
use tokio::process::Command;

use crate::config::models::Relay;
use crate::status::models::RelayPosition;

/// A two-state output that follows printer connectivity.
#[allow(async_fn_in_trait)]
pub trait RelaySwitch {
    async fn switch(&mut self, position: RelayPosition) -> Result<(), RelayError>;
}

/// Drives a relay by changing a GPIO pin's mode with an external program,
/// e.g. `gpio -g mode 17 out` (WiringPi).
pub struct GpioModeRelay {
    enabled: bool,
    program: String,
    pin: u8,
}

impl GpioModeRelay {
    pub fn new(settings: &Relay) -> Self {
        Self { enabled: settings.enabled, program: settings.program.clone(), pin: settings.pin }
    }

    fn mode(position: RelayPosition) -> &'static str {
        match position {
            RelayPosition::Active => "out",
            RelayPosition::Inactive => "in",
        }
    }
}

impl RelaySwitch for GpioModeRelay {
    async fn switch(&mut self, position: RelayPosition) -> Result<(), RelayError> {
        let mode = Self::mode(position);
        if !self.enabled {
            debug!("Relay disabled, skipping switch to '{}'", mode);
            return Ok(());
        }

        let pin = self.pin.to_string();
        debug!("Running {} -g mode {} {}", self.program, pin, mode);
        let status = Command::new(&self.program)
            .args(["-g", "mode", pin.as_str(), mode])
            .status()
            .await
            .context(SpawnSnafu { program: self.program.as_str() })?;

        if !status.success() {
            return FailedSnafu { program: self.program.as_str(), status }.fail();
        }
        Ok(())
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum RelayError {
    #[snafu(display("Could not run {program}"))]
    Spawn { program: String, source: std::io::Error },

    #[snafu(display("{program} exited with {status}"))]
    Failed { program: String, status: ExitStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay(program: &str, enabled: bool) -> GpioModeRelay {
        GpioModeRelay::new(&Relay { enabled, program: program.to_string(), pin: 17 })
    }

    #[test]
    fn positions_map_to_pin_modes() {
        assert_eq!(GpioModeRelay::mode(RelayPosition::Active), "out");
        assert_eq!(GpioModeRelay::mode(RelayPosition::Inactive), "in");
    }

    #[tokio::test]
    async fn disabled_relay_does_not_spawn() {
        let mut relay = relay("/nonexistent/gpio", false);

        assert!(relay.switch(RelayPosition::Active).await.is_ok());
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let mut relay = relay("/nonexistent/gpio", true);

        assert!(matches!(relay.switch(RelayPosition::Active).await, Err(RelayError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_decides_success() {
        assert!(relay("true", true).switch(RelayPosition::Inactive).await.is_ok());
        assert!(matches!(relay("false", true).switch(RelayPosition::Inactive).await, Err(RelayError::Failed { .. })));
    }
}
