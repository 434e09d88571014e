use std::time::Duration;

use serde_derive::Deserialize;

// When changing anything here, make sure to add
// #[serde(alias = "ihavenounderscores")]
// where needed, so it can be read from the ENV vars.

#[derive(Debug, Clone, Deserialize)]
pub struct Octoprint {
    pub host: String,
    pub port: u16,
    #[serde(alias = "apikey")]
    pub api_key: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Leds {
    pub count: usize,
    pub brightness: f32,
    #[serde(alias = "spidevice")]
    pub spi_device: String,
}

impl Leds {
    /// Brightness as the 0-255 scale used when flushing to the strip.
    pub fn brightness_level(&self) -> u8 {
        (self.brightness.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relay {
    pub enabled: bool,
    pub program: String,
    pub pin: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fade {
    pub steps: u32,
    #[serde(alias = "stepduration", with = "humantime_serde")]
    pub step_duration: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub octoprint: Octoprint,
    pub leds: Leds,
    pub relay: Relay,
    pub fade: Fade,
    #[serde(alias = "pollinterval", with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(alias = "sentrydsn")]
    pub sentry_dsn: Option<String>,
}
