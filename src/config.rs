//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_COLUMNS, MAX_ROWS};
use crate::sequence::{InitStep, ST7789V_INIT};

/// Bytes per RGB565 pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Default deferred update rate in flushes per second
pub const DEFAULT_FRAME_RATE: u32 = 24;

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels (columns)
    pub width: u16,
    /// Height in pixels (rows)
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero or
    /// exceeds the controller frame memory (MAX_COLUMNS x MAX_ROWS).
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_COLUMNS || height == 0 || height > MAX_ROWS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Bytes per framebuffer row
    pub fn row_stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.row_stride() * self.height as usize
    }
}

/// Display configuration
///
/// Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Attach without resetting or programming the controller
    ///
    /// For panels already brought up by firmware.
    pub skip_init: bool,
    /// Deferred flushes per second
    pub frame_rate: u32,
    /// Register programming replayed on bring-up
    pub init_sequence: &'static [InitStep],
}

impl Config {
    /// Period between deferred flush ticks in microseconds
    ///
    /// A zero `frame_rate` is treated as one flush per second.
    pub fn frame_period_us(&self) -> u32 {
        1_000_000 / self.frame_rate.max(1)
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use st7789fb::{Builder, Dimensions};
///
/// let dims = match Dimensions::new(240, 320) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new().dimensions(dims).frame_rate(30).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.frame_period_us(), 33_333);
/// ```
#[must_use]
pub struct Builder {
    dimensions: Option<Dimensions>,
    skip_init: bool,
    frame_rate: u32,
    init_sequence: &'static [InitStep],
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            skip_init: false,
            frame_rate: DEFAULT_FRAME_RATE,
            init_sequence: ST7789V_INIT,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Skip reset and register programming on attach
    pub fn skip_init(mut self, value: bool) -> Self {
        self.skip_init = value;
        self
    }

    /// Set the deferred flush rate (flushes per second)
    pub fn frame_rate(mut self, value: u32) -> Self {
        self.frame_rate = value;
        self
    }

    /// Replace the register programming sequence
    ///
    /// The sequence should select 16 bits per pixel
    /// ([`PIXEL_FORMAT_16BIT`](crate::command::PIXEL_FORMAT_16BIT)); the framebuffer is always RGB565.
    pub fn init_sequence(mut self, sequence: &'static [InitStep]) -> Self {
        self.init_sequence = sequence;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set,
    /// `BuilderError::InvalidFrameRate` if the frame rate is zero or above
    /// one million.
    pub fn build(self) -> Result<Config, BuilderError> {
        if self.frame_rate == 0 || self.frame_rate > 1_000_000 {
            return Err(BuilderError::InvalidFrameRate(self.frame_rate));
        }
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            skip_init: self.skip_init,
            frame_rate: self.frame_rate,
            init_sequence: self.init_sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_reject_zero_and_oversize() {
        assert!(Dimensions::new(0, 320).is_err());
        assert!(Dimensions::new(240, 0).is_err());
        assert!(Dimensions::new(MAX_COLUMNS + 1, 320).is_err());
        assert!(Dimensions::new(240, MAX_ROWS + 1).is_err());
    }

    #[test]
    fn test_buffer_size_is_two_bytes_per_pixel() {
        let dims = Dimensions::new(240, 320).unwrap();
        assert_eq!(dims.row_stride(), 480);
        assert_eq!(dims.buffer_size(), 240 * 320 * 2);
    }

    #[test]
    fn test_builder_defaults() {
        let config = Builder::new()
            .dimensions(Dimensions::new(240, 320).unwrap())
            .build()
            .unwrap();
        assert!(!config.skip_init);
        assert_eq!(config.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(config.frame_period_us(), 41_666);
        assert_eq!(config.init_sequence, ST7789V_INIT);
    }

    #[test]
    fn test_builder_missing_dimensions() {
        assert!(matches!(
            Builder::new().build(),
            Err(BuilderError::MissingDimensions)
        ));
    }

    #[test]
    fn test_builder_zero_frame_rate() {
        let result = Builder::new()
            .dimensions(Dimensions::new(240, 320).unwrap())
            .frame_rate(0)
            .build();
        assert!(matches!(result, Err(BuilderError::InvalidFrameRate(0))));
    }

    #[test]
    fn test_frame_period_survives_zero_rate() {
        let mut config = Builder::new()
            .dimensions(Dimensions::new(240, 320).unwrap())
            .build()
            .unwrap();
        assert_eq!(config.frame_period_us(), 41_666);
        config.frame_rate = 0;
        assert_eq!(config.frame_period_us(), 1_000_000);
    }
}
