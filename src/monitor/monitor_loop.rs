use std::fmt::Debug;
use std::time::Duration;

use chrono::{Local, TimeDelta};
use log::{debug, error, info, warn};
use smart_leds::{SmartLedsWrite, RGB8};

use crate::config::models::Settings;
use crate::leds::renderer::LedRenderer;
use crate::leds::{LedError, CONNECTED, DISCONNECTED, OFF, PROGRESS_DONE, PROGRESS_REMAINING};
use crate::octoprint_client::PrinterApi;
use crate::relay::RelaySwitch;
use crate::status::classifier::transition;
use crate::status::models::*;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub fade_step: Duration,
    pub fade_steps: u32,
    pub pixel_count: usize,
}

impl From<&Settings> for MonitorSettings {
    fn from(settings: &Settings) -> Self {
        MonitorSettings {
            poll_interval: settings.poll_interval,
            fade_step: settings.fade.step_duration,
            fade_steps: settings.fade.steps,
            pixel_count: settings.leds.count,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub edges: Edges,
    /// Percentage drawn this tick, if a progress bar was rendered.
    pub progress: Option<u8>,
}

/// Polls the printer and mirrors its state on the LED strip and relay.
pub struct MonitorLoop<P, W, R> {
    printer: P,
    leds: LedRenderer<W>,
    relay: R,
    /// Relay position that failed to apply and is retried on the next tick.
    pending_relay: Option<RelayPosition>,
    state: DisplayState,
    settings: MonitorSettings,
}

impl<P, W, R> MonitorLoop<P, W, R>
where
    P: PrinterApi,
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: Debug,
    R: RelaySwitch,
{
    pub fn new(printer: P, leds: LedRenderer<W>, relay: R, settings: MonitorSettings) -> Self {
        Self { printer, leds, relay, pending_relay: None, state: DisplayState::Unset, settings }
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// Ticks forever, sleeping the poll interval between ticks.
    pub async fn run(&mut self) {
        info!("Polling printer every {}", humantime::format_duration(self.settings.poll_interval));
        loop {
            self.tick().await;
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    pub async fn tick(&mut self) -> TickReport {
        let Some(observation) = self.observe().await else {
            return TickReport::default();
        };

        if let Observation::Reported(PrinterStatus::Unknown(text)) = &observation {
            warn!("Could not determine printer status from '{}'", text);
        }

        let (next, edges) = transition(self.state, &observation);

        if let Some(fade) = edges.fade {
            if let Err(e) = self.fade(fade).await {
                // Leave the state untouched so the transition is retried next tick.
                error!("Could not render transition to {:?}: {}", fade, e);
                return TickReport::default();
            }
        }

        if let Some(position) = edges.relay.or(self.pending_relay) {
            match self.relay.switch(position).await {
                Ok(()) => self.pending_relay = None,
                Err(e) => {
                    error!("Could not switch relay to {:?}: {}", position, e);
                    self.pending_relay = Some(position);
                }
            }
        }

        if next != self.state {
            info!("Printer status: {}", describe(next));
        } else {
            debug!("Printer status unchanged: {}", describe(next));
        }
        self.state = next;

        let progress = if edges.render_progress { self.render_progress().await } else { None };
        TickReport { edges, progress }
    }

    /// Switches every pixel off and flushes.
    pub fn switch_off(&mut self) -> Result<(), LedError> {
        self.leds.fill_solid(OFF);
        self.leds.show()
    }

    async fn observe(&self) -> Option<Observation> {
        match self.printer.is_printer_connected().await {
            Ok(true) => {}
            Ok(false) => return Some(Observation::Unreachable),
            Err(e) if e.is_unreachable() => {
                warn!("OctoPrint is unreachable: {}", e);
                return Some(Observation::Unreachable);
            }
            Err(e) => {
                error!("Printer connection probe failed: {}", e);
                return Some(Observation::Unreachable);
            }
        }

        match self.printer.get_printer_status().await {
            Ok(text) => Some(Observation::Reported(PrinterStatus::from_text(&text))),
            Err(e) => {
                error!("Could not get printer status: {}", e);
                None
            }
        }
    }

    async fn fade(&mut self, fade: Fade) -> Result<(), LedError> {
        let (from, to) = match fade {
            Fade::ToOperational => (DISCONNECTED, CONNECTED),
            Fade::ToDisconnected => (CONNECTED, DISCONNECTED),
        };
        self.leds.crossfade(from, to, self.settings.fade_step, self.settings.fade_steps).await
    }

    async fn render_progress(&mut self) -> Option<u8> {
        let percent = match self.printer.get_print_progress().await {
            Ok(percent) => percent,
            Err(e) => {
                warn!("Could not get progress of printer: {}", e);
                return None;
            }
        };

        self.leds.render_progress(f64::from(percent) / 100.0, self.settings.pixel_count, PROGRESS_DONE, PROGRESS_REMAINING);
        if let Err(e) = self.leds.show() {
            error!("Could not show print progress: {}", e);
            return None;
        }

        self.log_job(percent).await;
        Some(percent)
    }

    async fn log_job(&self, percent: u8) {
        let file = self.printer.get_file_printing().await.unwrap_or_else(|e| {
            debug!("Could not get file being printed: {}", e);
            String::new()
        });

        match self.printer.get_print_time_left().await {
            Ok(seconds) if seconds > 0 => {
                let left = Duration::from_secs(seconds);
                let eta = TimeDelta::try_seconds(seconds as i64)
                    .and_then(|delta| Local::now().checked_add_signed(delta))
                    .map(|eta| eta.format("%H:%M").to_string())
                    .unwrap_or_default();
                info!("Printing {} {}% ({} left, done at {})", file, percent, humantime::format_duration(left), eta);
            }
            Ok(_) => info!("Printing {} {}%", file, percent),
            Err(e) => {
                debug!("Could not get print time left: {}", e);
                info!("Printing {} {}%", file, percent);
            }
        }
    }

    #[cfg(test)]
    pub fn printer(&self) -> &P {
        &self.printer
    }

    #[cfg(test)]
    pub fn relay(&self) -> &R {
        &self.relay
    }

    #[cfg(test)]
    pub fn leds(&self) -> &LedRenderer<W> {
        &self.leds
    }
}

fn describe(state: DisplayState) -> String {
    match state {
        DisplayState::Unset => "unset".to_string(),
        DisplayState::Rendered(state) => state.to_string(),
    }
}
