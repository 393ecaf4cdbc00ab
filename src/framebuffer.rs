//! Host-side pixel memory
//!
//! The [`Framebuffer`] owns `width * height * 2` bytes of RGB565 pixels in
//! row-major, host (little-endian) order. Every mutation is bounds-checked and
//! reports the inclusive [`RowRange`] it touched; out-of-bounds writes are
//! rejected whole, leaving the buffer unmodified.
//!
//! ## Example
//!
//! ```
//! use st7789fb::{Color, Dimensions, Framebuffer, RowRange};
//!
//! # let dims = match Dimensions::new(4, 4) {
//! #     Ok(dims) => dims,
//! #     Err(_) => return,
//! # };
//! let mut fb = match Framebuffer::new([0u8; 32], dims) {
//!     Ok(fb) => fb,
//!     Err(_) => return,
//! };
//!
//! // 12 bytes at offset 4 cover the end of row 0 and all of row 1
//! assert_eq!(fb.write(4, &[0xFF; 12]), Ok(RowRange::new(0, 1)));
//!
//! let _ = fb.write_pixel(3, 3, Color::WHITE);
//! assert_eq!(fb.read_pixel(3, 3), Ok(Color::WHITE));
//! ```

use crate::color::Color;
use crate::config::{BYTES_PER_PIXEL, Dimensions};
use crate::display::AddressWindow;
use crate::error::RangeError;

/// Inclusive range of pixel rows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowRange {
    /// First row
    pub start: u16,
    /// Last row (inclusive)
    pub end: u16,
}

impl RowRange {
    /// Create a new range, no ordering is enforced
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Range covering a single row
    pub const fn single(row: u16) -> Self {
        Self::new(row, row)
    }

    /// Smallest range covering both
    ///
    /// Disjoint ranges are coalesced, including the rows between them.
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether `start <= end < height`
    pub fn is_valid(&self, height: u16) -> bool {
        self.start <= self.end && self.end < height
    }

    /// Whether `other` lies inside this range
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        usize::from(self.end.saturating_sub(self.start)) + 1
    }

    /// Always false, a range holds at least one row
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// RGB565 framebuffer backed by caller-provided memory
///
/// ## Type Parameters
///
/// * `B` - Buffer type implementing `AsRef<[u8]> + AsMut<[u8]>`, e.g. a static
///   array or a `Vec<u8>`
pub struct Framebuffer<B> {
    buffer: B,
    dimensions: Dimensions,
}

impl<B> Framebuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wrap `buffer` as the framebuffer of a display of `dimensions`
    ///
    /// Bytes past `dimensions.buffer_size()` are never touched.
    ///
    /// # Errors
    ///
    /// Returns `RangeError::OutOfBounds` (with `len` the required size and
    /// `capacity` the provided size) if the buffer is too small.
    pub fn new(buffer: B, dimensions: Dimensions) -> Result<Self, RangeError> {
        let required = dimensions.buffer_size();
        let provided = buffer.as_ref().len();
        if provided < required {
            return Err(RangeError::OutOfBounds {
                offset: 0,
                len: required,
                capacity: provided,
            });
        }
        Ok(Self { buffer, dimensions })
    }

    /// Display dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Size of the pixel memory in bytes
    pub fn capacity(&self) -> usize {
        self.dimensions.buffer_size()
    }

    /// Raw pixel bytes (host order)
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.capacity()]
    }

    /// Give back the backing memory
    pub fn release(self) -> B {
        self.buffer
    }

    /// Copy `bytes` into the framebuffer at byte `offset`
    ///
    /// Returns the rows touched, `[offset / stride, (offset + len - 1) / stride]`.
    ///
    /// # Errors
    ///
    /// Returns `RangeError::EmptyWrite` for an empty slice and
    /// `RangeError::OutOfBounds` if `offset + len` exceeds the capacity. The
    /// buffer is left unmodified in both cases.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<RowRange, RangeError> {
        let end = self.check_span(offset, bytes.len())?;
        self.buffer.as_mut()[offset..end].copy_from_slice(bytes);

        let stride = self.dimensions.row_stride();
        Ok(RowRange::new(
            (offset / stride) as u16,
            ((end - 1) / stride) as u16,
        ))
    }

    /// Validate that `len` bytes fit at `offset`, returning the end offset
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    pub fn check_span(&self, offset: usize, len: usize) -> Result<usize, RangeError> {
        let capacity = self.capacity();
        if len == 0 {
            return Err(RangeError::EmptyWrite { offset });
        }
        match offset.checked_add(len) {
            Some(end) if end <= capacity => Ok(end),
            _ => Err(RangeError::OutOfBounds {
                offset,
                len,
                capacity,
            }),
        }
    }

    /// Read a single pixel
    ///
    /// # Errors
    ///
    /// Returns `RangeError::PixelOutOfBounds` outside `width x height`.
    pub fn read_pixel(&self, x: u16, y: u16) -> Result<Color, RangeError> {
        let index = self.pixel_index(x, y)?;
        let bytes = self.buffer.as_ref();
        Ok(Color::from_le_bytes([bytes[index], bytes[index + 1]]))
    }

    /// Write a single pixel
    ///
    /// # Errors
    ///
    /// Returns `RangeError::PixelOutOfBounds` outside `width x height`.
    pub fn write_pixel(&mut self, x: u16, y: u16, color: Color) -> Result<(), RangeError> {
        let index = self.pixel_index(x, y)?;
        self.buffer.as_mut()[index..index + BYTES_PER_PIXEL].copy_from_slice(&color.to_le_bytes());
        Ok(())
    }

    /// Fill an inclusive window with one color
    ///
    /// # Errors
    ///
    /// Returns `RangeError::PixelOutOfBounds` if any corner lies outside the
    /// display or the window is inverted. Nothing is written in that case.
    pub fn fill(&mut self, window: &AddressWindow, color: Color) -> Result<RowRange, RangeError> {
        if window.x_start > window.x_end || window.y_start > window.y_end {
            return Err(RangeError::PixelOutOfBounds {
                x: window.x_start,
                y: window.y_start,
            });
        }
        let first = self.pixel_index(window.x_start, window.y_start)?;
        self.pixel_index(window.x_end, window.y_end)?;

        let stride = self.dimensions.row_stride();
        let span = usize::from(window.x_end - window.x_start + 1) * BYTES_PER_PIXEL;
        let pixel = color.to_le_bytes();
        let buffer = self.buffer.as_mut();
        for row in 0..=usize::from(window.y_end - window.y_start) {
            let start = first + row * stride;
            for dst in buffer[start..start + span].chunks_exact_mut(BYTES_PER_PIXEL) {
                dst.copy_from_slice(&pixel);
            }
        }
        Ok(RowRange::new(window.y_start, window.y_end))
    }

    /// Mutable bytes of whole rows, for streaming to the controller
    ///
    /// `rows` must be valid for this display.
    pub(crate) fn rows_mut(&mut self, rows: RowRange) -> &mut [u8] {
        let stride = self.dimensions.row_stride();
        let start = usize::from(rows.start) * stride;
        let end = (usize::from(rows.end) + 1) * stride;
        &mut self.buffer.as_mut()[start..end]
    }

    fn pixel_index(&self, x: u16, y: u16) -> Result<usize, RangeError> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return Err(RangeError::PixelOutOfBounds { x, y });
        }
        Ok(usize::from(y) * self.dimensions.row_stride() + usize::from(x) * BYTES_PER_PIXEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn framebuffer(width: u16, height: u16) -> Framebuffer<Vec<u8>> {
        let dims = Dimensions::new(width, height).unwrap();
        Framebuffer::new(vec![0u8; dims.buffer_size()], dims).unwrap()
    }

    #[test]
    fn test_new_rejects_small_buffer() {
        let dims = Dimensions::new(10, 10).unwrap();
        let result = Framebuffer::new(vec![0u8; 199], dims);
        assert!(matches!(
            result,
            Err(RangeError::OutOfBounds {
                len: 200,
                capacity: 199,
                ..
            })
        ));
    }

    #[test]
    fn test_write_returns_touched_rows() {
        let mut fb = framebuffer(10, 10);
        // stride is 20 bytes
        assert_eq!(fb.write(0, &[1; 20]), Ok(RowRange::new(0, 0)));
        assert_eq!(fb.write(19, &[1; 2]), Ok(RowRange::new(0, 1)));
        assert_eq!(fb.write(45, &[1; 1]), Ok(RowRange::new(2, 2)));
        assert_eq!(fb.write(180, &[1; 20]), Ok(RowRange::new(9, 9)));
    }

    #[test]
    fn test_write_copies_bytes() {
        let mut fb = framebuffer(10, 10);
        fb.write(3, &[7, 8, 9]).unwrap();
        assert_eq!(&fb.as_bytes()[2..7], &[0, 7, 8, 9, 0]);
    }

    #[test]
    fn test_out_of_bounds_write_leaves_buffer_unmodified() {
        let mut fb = framebuffer(10, 10);
        let capacity = fb.capacity();
        for (offset, len) in [(0, capacity + 1), (capacity, 1), (capacity - 3, 4), (usize::MAX, 2)] {
            let result = fb.write(offset, &vec![0xAA; len.min(capacity + 1)]);
            assert!(matches!(result, Err(RangeError::OutOfBounds { .. })));
            assert!(fb.as_bytes().iter().all(|b| *b == 0));
        }
    }

    #[test]
    fn test_empty_write_is_rejected() {
        let mut fb = framebuffer(10, 10);
        assert_eq!(fb.write(4, &[]), Err(RangeError::EmptyWrite { offset: 4 }));
    }

    #[test]
    fn test_pixel_round_trip_everywhere() {
        let mut fb = framebuffer(12, 9);
        for y in 0..9u16 {
            for x in 0..12u16 {
                let color = Color::new(y * 256 + x);
                fb.write_pixel(x, y, color).unwrap();
                assert_eq!(fb.read_pixel(x, y), Ok(color));
            }
        }
    }

    #[test]
    fn test_pixel_is_stored_little_endian() {
        let mut fb = framebuffer(4, 4);
        fb.write_pixel(1, 0, Color::new(0xF800)).unwrap();
        assert_eq!(&fb.as_bytes()[2..4], &[0x00, 0xF8]);
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let mut fb = framebuffer(4, 4);
        assert_eq!(
            fb.write_pixel(4, 0, Color::WHITE),
            Err(RangeError::PixelOutOfBounds { x: 4, y: 0 })
        );
        assert_eq!(
            fb.read_pixel(0, 4),
            Err(RangeError::PixelOutOfBounds { x: 0, y: 4 })
        );
    }

    #[test]
    fn test_fill_window() {
        let mut fb = framebuffer(4, 4);
        let window = AddressWindow::new(1, 1, 2, 2);
        assert_eq!(fb.fill(&window, Color::WHITE), Ok(RowRange::new(1, 2)));
        for y in 0..4 {
            for x in 0..4 {
                let inside = (1..=2).contains(&x) && (1..=2).contains(&y);
                let expected = if inside { Color::WHITE } else { Color::BLACK };
                assert_eq!(fb.read_pixel(x, y), Ok(expected));
            }
        }
    }

    #[test]
    fn test_fill_partly_outside_writes_nothing() {
        let mut fb = framebuffer(4, 4);
        let window = AddressWindow::new(2, 2, 4, 3);
        assert!(fb.fill(&window, Color::WHITE).is_err());
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_row_range_union_is_order_independent() {
        let a = RowRange::new(2, 4);
        let b = RowRange::new(7, 9);
        let c = RowRange::new(3, 5);
        assert_eq!(a.union(b), RowRange::new(2, 9));
        assert_eq!(a.union(b), b.union(a));
        assert_eq!(a.union(b).union(c), a.union(c.union(b)));
    }

    #[test]
    fn test_row_range_validity() {
        assert!(RowRange::new(0, 9).is_valid(10));
        assert!(!RowRange::new(0, 10).is_valid(10));
        assert!(!RowRange::new(5, 4).is_valid(10));
        assert_eq!(RowRange::new(2, 9).len(), 8);
    }
}
