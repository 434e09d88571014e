pub mod driver;
pub mod renderer;

use smart_leds::RGB8;
use snafu::Snafu;

// ////// //
// Colors //
// ////// //

pub const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
pub const CONNECTED: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
pub const DISCONNECTED: RGB8 = RGB8 { r: 0, g: 0, b: 255 };
pub const PROGRESS_DONE: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
pub const PROGRESS_REMAINING: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum LedError {
    #[snafu(display("Could not open LED strip on {device}: {message}"))]
    Open { device: String, message: String },

    #[snafu(display("Could not write frame to LED strip: {message}"))]
    Write { message: String },
}
