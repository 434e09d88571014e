use std::process::ExitCode;

use log::{error, info, warn};
use snafu::{ResultExt, Whatever};

use crate::config::models::Settings;
use crate::leds::driver::open_spi_strip;
use crate::leds::renderer::LedRenderer;
use crate::monitor::monitor_loop::{MonitorLoop, MonitorSettings};
use crate::octoprint_client::client::OctoprintClient;
use crate::relay::GpioModeRelay;

mod config;
mod leds;
mod monitor;
mod octoprint_client;
mod relay;
mod status;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    colog::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", snafu::Report::from_error(e));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Whatever> {
    let settings = crate::config::loading::load_config().whatever_context("Could not load configuration")?;
    let _sentry = init_sentry(&settings);

    let printer = OctoprintClient::new(&settings.octoprint).whatever_context("Could not create OctoPrint client")?;
    match printer.get_version().await {
        Ok(version) => info!("Talking to OctoPrint {} at {}:{}", version, settings.octoprint.host, settings.octoprint.port),
        Err(e) => warn!("Could not get OctoPrint version: {}", e),
    }

    let strip = open_spi_strip(&settings.leds.spi_device).whatever_context("Could not open LED strip")?;
    let leds = LedRenderer::new(strip, settings.leds.count, settings.leds.brightness_level());
    let relay = GpioModeRelay::new(&settings.relay);

    let mut monitor = MonitorLoop::new(printer, leds, relay, MonitorSettings::from(&settings));
    monitor.switch_off().whatever_context("Could not clear LED strip")?;

    tokio::select! {
        _ = monitor.run() => {},
        _ = shutdown_signal() => info!("Shutting down."),
    }

    monitor.switch_off().whatever_context("Could not switch off LED strip")
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref().filter(|dsn| !dsn.is_empty())?;
    let dsn = match dsn.parse::<sentry::types::Dsn>() {
        Ok(dsn) => dsn,
        Err(e) => {
            warn!("Ignoring invalid Sentry DSN: {}", e);
            return None;
        }
    };

    Some(sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        ..Default::default()
    }))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
                return;
            }
            Err(e) => warn!("Could not listen for SIGTERM: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
