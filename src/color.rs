//! RGB565 color type
//!
//! The controller is programmed for 16 bits per pixel. A [`Color`] holds the
//! packed RGB565 value:
//!
//! | Bits   | Channel |
//! |--------|---------|
//! | 15..11 | Red     |
//! | 10..5  | Green   |
//! | 4..0   | Blue    |
//!
//! In the framebuffer each pixel is stored little-endian (host order). The
//! controller expects big-endian on the wire; the swap happens in the
//! transport just before a pixel transfer.
//!
//! ## Example
//!
//! ```
//! use st7789fb::Color;
//!
//! let red = Color::from_rgb(31, 0, 0);
//! assert_eq!(red.raw(), 0xF800);
//! assert_eq!(red.to_le_bytes(), [0x00, 0xF8]);
//! ```

/// A packed RGB565 pixel value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(u16);

impl Color {
    /// Black (all channels off)
    pub const BLACK: Self = Self(0x0000);
    /// White (all channels at maximum)
    pub const WHITE: Self = Self(0xFFFF);

    /// Create a color from a raw RGB565 value
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Create a color from channel values
    ///
    /// Red and blue are 5-bit (0..=31), green is 6-bit (0..=63). Values out of
    /// range are masked.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = (r as u16) & 0x1F;
        let g = (g as u16) & 0x3F;
        let b = (b as u16) & 0x1F;
        Self((r << 11) | (g << 5) | b)
    }

    /// Raw RGB565 value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Framebuffer (host order) representation
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    /// Decode a framebuffer (host order) pixel
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }
}

impl From<u16> for Color {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Color> for u16 {
    fn from(color: Color) -> Self {
        color.0
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::Rgb565> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::Rgb565) -> Self {
        use embedded_graphics_core::prelude::IntoStorage;
        Self(color.into_storage())
    }
}

#[cfg(feature = "graphics")]
impl From<Color> for embedded_graphics_core::pixelcolor::Rgb565 {
    fn from(color: Color) -> Self {
        use embedded_graphics_core::pixelcolor::raw::RawU16;
        Self::from(RawU16::new(color.0))
    }
}
