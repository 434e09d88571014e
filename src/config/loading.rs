use config::{Config, Environment};
use log::info;
use snafu::{ResultExt, Snafu};

use super::models::Settings;

pub fn load_config() -> Result<Settings, ConfigError> {
    // As Rust has no native support for .env files,
    // we use the dotenv_flow crate to import to actual ENV vars.
    if let Ok(dotenv_path) = dotenv_flow::dotenv_flow() {
        info!("Loaded dotenv file: {:?}", dotenv_path);
    }

    build_config(environment())
}

fn environment() -> Environment {
    Environment::default()
        .prefix("O2L")
        .separator("_")
        .prefix_separator("_")
        .try_parsing(true)
}

fn build_config(environment: Environment) -> Result<Settings, ConfigError> {
    let config = Config::builder()
        .add_source(environment)
        .set_default("octoprint.host", "127.0.0.1").context(BuildSnafu)?
        .set_default("octoprint.port", "5000").context(BuildSnafu)?
        .set_default("octoprint.apikey", "").context(BuildSnafu)?
        .set_default("octoprint.timeout", "10s").context(BuildSnafu)?
        .set_default("leds.count", "36").context(BuildSnafu)?
        .set_default("leds.brightness", "0.2").context(BuildSnafu)?
        .set_default("leds.spidevice", "/dev/spidev0.0").context(BuildSnafu)?
        .set_default("relay.enabled", "true").context(BuildSnafu)?
        .set_default("relay.program", "gpio").context(BuildSnafu)?
        .set_default("relay.pin", "17").context(BuildSnafu)?
        .set_default("fade.steps", "50").context(BuildSnafu)?
        .set_default("fade.stepduration", "5ms").context(BuildSnafu)?
        .set_default("pollinterval", "5s").context(BuildSnafu)?
        .set_default("sentrydsn", "").context(BuildSnafu)?
        .build().context(BuildSnafu)?;

    config.try_deserialize().context(DeserializeSnafu)
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Could not assemble configuration sources"))]
    Build { source: config::ConfigError },

    #[snafu(display("Could not read settings from configuration"))]
    Deserialize { source: config::ConfigError },
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use config::Map;

    use super::*;

    fn environment_from(vars: &[(&str, &str)]) -> Environment {
        let map: Map<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        environment().source(Some(map))
    }

    #[test]
    fn defaults_match_a_stock_octoprint_install() {
        let settings = build_config(environment_from(&[])).unwrap();

        assert_eq!(settings.octoprint.host, "127.0.0.1");
        assert_eq!(settings.octoprint.port, 5000);
        assert_eq!(settings.leds.count, 36);
        assert_eq!(settings.leds.brightness_level(), 51);
        assert_eq!(settings.relay.pin, 17);
        assert_eq!(settings.fade.steps, 50);
        assert_eq!(settings.fade.step_duration, Duration::from_millis(5));
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = build_config(environment_from(&[
            ("O2L_OCTOPRINT_HOST", "octopi.local"),
            ("O2L_OCTOPRINT_APIKEY", "secret"),
            ("O2L_LEDS_COUNT", "60"),
            ("O2L_RELAY_ENABLED", "false"),
            ("O2L_POLLINTERVAL", "2s"),
        ])).unwrap();

        assert_eq!(settings.octoprint.host, "octopi.local");
        assert_eq!(settings.octoprint.api_key, "secret");
        assert_eq!(settings.leds.count, 60);
        assert!(!settings.relay.enabled);
        assert_eq!(settings.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn invalid_duration_is_reported() {
        let result = build_config(environment_from(&[("O2L_POLLINTERVAL", "soon")]));

        assert!(matches!(result, Err(ConfigError::Deserialize { .. })));
    }
}
