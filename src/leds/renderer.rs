use std::fmt::Debug;
use std::time::Duration;

use smart_leds::{brightness, SmartLedsWrite, RGB8};

use super::{LedError, OFF};

/// Owns the pixel buffer for one strip.
///
/// Mutations only touch the buffer; nothing reaches the strip until
/// [`LedRenderer::show`] is called, so several writes can share one flush.
pub struct LedRenderer<W> {
    strip: W,
    pixels: Vec<RGB8>,
    brightness: u8,
}

impl<W> LedRenderer<W>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: Debug,
{
    pub fn new(strip: W, count: usize, brightness: u8) -> Self {
        Self { strip, pixels: vec![OFF; count], brightness }
    }

    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    pub fn fill_solid(&mut self, color: RGB8) {
        self.pixels.fill(color);
    }

    /// Clears the buffer and lights the two pixels around the middle of the strip.
    pub fn fill_two_point(&mut self, color: RGB8) {
        self.pixels.fill(OFF);
        let upper = (self.pixels.len() as f64 / 2.0).round() as usize;
        for index in [upper, upper.wrapping_sub(1)] {
            if let Some(pixel) = self.pixels.get_mut(index) {
                *pixel = color;
            }
        }
    }

    /// Fades the two middle pixels from `from` to `to`, flushing every frame.
    ///
    /// Renders `from` followed by `steps` frames, each channel moving by
    /// `(to - from) / steps` per frame. The running value is truncated before
    /// rendering, so the last frame can sit one unit short of `to`.
    pub async fn crossfade(&mut self, from: RGB8, to: RGB8, step_duration: Duration, steps: u32) -> Result<(), LedError> {
        let steps = steps.max(1);
        let channel_step = |a: u8, b: u8| (f64::from(b) - f64::from(a)) / f64::from(steps);
        let delta = [channel_step(from.r, to.r), channel_step(from.g, to.g), channel_step(from.b, to.b)];
        let mut current = [f64::from(from.r), f64::from(from.g), f64::from(from.b)];

        self.fill_two_point(from);
        self.show()?;

        for _ in 0..steps {
            tokio::time::sleep(step_duration).await;
            for (value, step) in current.iter_mut().zip(delta) {
                *value += step;
            }
            self.fill_two_point(RGB8 { r: channel(current[0]), g: channel(current[1]), b: channel(current[2]) });
            self.show()?;
        }

        Ok(())
    }

    /// Draws a progress bar over the first `total_pixels` pixels.
    ///
    /// `done` is painted from the top index downwards for `round(total * fraction)`
    /// pixels, then `remaining` continues downwards until index 1. Index 0 only
    /// shows `done` on a full bar and is off otherwise.
    pub fn render_progress(&mut self, fraction: f64, total_pixels: usize, done: RGB8, remaining: RGB8) {
        let total = total_pixels.min(self.pixels.len());
        let lit = ((total as f64 * fraction.clamp(0.0, 1.0)).round() as usize).min(total);

        if lit < total {
            self.pixels[0] = OFF;
        }

        for index in (total - lit..total).rev() {
            self.pixels[index] = done;
        }
        for index in (1..total - lit).rev() {
            self.pixels[index] = remaining;
        }
    }

    pub fn show(&mut self) -> Result<(), LedError> {
        let frame = brightness(self.pixels.iter().copied(), self.brightness);
        self.strip
            .write(frame)
            .map_err(|e| LedError::Write { message: format!("{e:?}") })
    }

    #[cfg(test)]
    pub fn strip(&self) -> &W {
        &self.strip
    }
}

fn channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
pub(crate) mod tests {
    use std::convert::Infallible;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::leds::{CONNECTED, DISCONNECTED, PROGRESS_DONE, PROGRESS_REMAINING};

    /// Strip that keeps every flushed frame.
    #[derive(Default)]
    pub struct RecordingStrip {
        pub frames: Vec<Vec<RGB8>>,
    }

    impl SmartLedsWrite for RecordingStrip {
        type Error = Infallible;
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            self.frames.push(iterator.into_iter().map(Into::into).collect());
            Ok(())
        }
    }

    fn renderer(count: usize) -> LedRenderer<RecordingStrip> {
        LedRenderer::new(RecordingStrip::default(), count, 255)
    }

    fn lit(pixels: &[RGB8], color: RGB8) -> Vec<usize> {
        pixels.iter().enumerate().filter(|(_, p)| **p == color).map(|(i, _)| i).collect()
    }

    #[test]
    fn two_point_lights_middle_pair() {
        let mut leds = renderer(36);
        leds.fill_solid(DISCONNECTED);
        leds.fill_two_point(CONNECTED);

        assert_eq!(lit(leds.pixels(), CONNECTED), vec![17, 18]);
        assert_eq!(lit(leds.pixels(), OFF).len(), 34);
    }

    #[test]
    fn two_point_on_single_pixel_strip_stays_in_bounds() {
        let mut leds = renderer(1);
        leds.fill_two_point(CONNECTED);

        assert_eq!(leds.pixels(), &[CONNECTED]);
    }

    #[test]
    fn nothing_reaches_the_strip_before_show() {
        let mut leds = renderer(4);
        leds.fill_solid(CONNECTED);
        assert!(leds.strip().frames.is_empty());

        leds.show().unwrap();
        assert_eq!(leds.strip().frames, vec![vec![CONNECTED; 4]]);
    }

    #[test]
    fn show_applies_brightness() {
        let mut leds = LedRenderer::new(RecordingStrip::default(), 2, 51);
        leds.fill_solid(RGB8 { r: 255, g: 0, b: 0 });
        leds.show().unwrap();

        let frame = &leds.strip().frames[0];
        assert!(frame[0].r < 60 && frame[0].r > 40);
    }

    #[test]
    fn progress_lights_rounded_share_of_pixels() {
        for total in [1usize, 7, 36, 60] {
            for percent in 0..=100u32 {
                let mut leds = renderer(total);
                leds.render_progress(f64::from(percent) / 100.0, total, PROGRESS_DONE, PROGRESS_REMAINING);

                let expected = (total as f64 * (f64::from(percent) / 100.0)).round() as usize;
                assert_eq!(lit(leds.pixels(), PROGRESS_DONE).len(), expected, "total={total} percent={percent}");
            }
        }
    }

    #[test]
    fn progress_fills_from_both_ends() {
        let mut leds = renderer(10);
        leds.render_progress(0.4, 10, PROGRESS_DONE, PROGRESS_REMAINING);

        assert_eq!(lit(leds.pixels(), PROGRESS_DONE), vec![6, 7, 8, 9]);
        assert_eq!(lit(leds.pixels(), PROGRESS_REMAINING), vec![1, 2, 3, 4, 5]);
        assert_eq!(leds.pixels()[0], OFF);
    }

    #[test]
    fn progress_after_full_bar_clears_first_pixel() {
        let mut leds = renderer(10);
        leds.render_progress(1.0, 10, PROGRESS_DONE, PROGRESS_REMAINING);
        assert_eq!(leds.pixels()[0], PROGRESS_DONE);

        leds.render_progress(0.5, 10, PROGRESS_DONE, PROGRESS_REMAINING);

        assert_eq!(lit(leds.pixels(), PROGRESS_DONE), vec![5, 6, 7, 8, 9]);
        assert_eq!(leds.pixels()[0], OFF);
    }

    #[test]
    fn progress_is_idempotent() {
        let mut leds = renderer(36);
        leds.render_progress(0.55, 36, PROGRESS_DONE, PROGRESS_REMAINING);
        let first = leds.pixels().to_vec();
        leds.render_progress(0.55, 36, PROGRESS_DONE, PROGRESS_REMAINING);

        assert_eq!(leds.pixels(), first.as_slice());
    }

    #[tokio::test]
    async fn single_step_crossfade_starts_at_from_and_ends_near_to() {
        let mut leds = renderer(36);
        leds.crossfade(DISCONNECTED, CONNECTED, Duration::ZERO, 1).await.unwrap();

        let frames = &leds.strip().frames;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0][17], DISCONNECTED);
        assert_eq!(frames[1][17], CONNECTED);
    }

    #[tokio::test]
    async fn crossfade_endpoint_is_within_one_step() {
        let from = RGB8 { r: 0, g: 255, b: 0 };
        let to = RGB8 { r: 17, g: 0, b: 255 };
        let mut leds = renderer(36);
        leds.crossfade(from, to, Duration::ZERO, 7).await.unwrap();

        let last = leds.strip().frames.last().unwrap()[18];
        assert!(last.r.abs_diff(to.r) <= 3);
        assert!(last.g.abs_diff(to.g) <= 37);
        assert!(last.b.abs_diff(to.b) <= 37);
        assert_eq!(leds.strip().frames.len(), 8);
    }
}
