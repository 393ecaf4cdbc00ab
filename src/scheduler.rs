//! Dirty-row tracking and flushing
//!
//! The [`UpdateScheduler`] accumulates rows touched by deferred writes into a
//! single covering [`RowRange`]. [`flush`] streams a row range to the
//! controller: it programs a full-width address window, starts a memory write
//! and sends the framebuffer bytes for those rows.

use crate::display::{AddressWindow, Display};
use crate::error::Error;
use crate::framebuffer::{Framebuffer, RowRange};
use crate::interface::DisplayInterface;

/// Pending dirty rows since the last flush
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateScheduler {
    height: u16,
    pending: Option<RowRange>,
}

impl UpdateScheduler {
    /// Create a scheduler for a panel `height` rows tall with nothing pending
    pub const fn new(height: u16) -> Self {
        Self {
            height,
            pending: None,
        }
    }

    /// Add `rows` to the pending range
    ///
    /// Disjoint ranges are coalesced into one covering range. A malformed
    /// range is clamped with [`normalize`] first, so the pending range always
    /// lies on the panel.
    pub fn mark(&mut self, rows: RowRange) {
        let rows = normalize(rows, self.height);
        self.pending = Some(match self.pending {
            Some(pending) => pending.union(rows),
            None => rows,
        });
    }

    /// Rows waiting for the next deferred flush
    pub fn pending(&self) -> Option<RowRange> {
        self.pending
    }

    /// Take the pending range, leaving nothing pending
    pub fn take(&mut self) -> Option<RowRange> {
        self.pending.take()
    }

    /// Drop the pending range if `flushed` already covers it
    pub fn clear_if_covered(&mut self, flushed: RowRange) {
        if self.pending.is_some_and(|pending| flushed.contains(&pending)) {
            self.pending = None;
        }
    }
}

/// Clamp a malformed range to the whole screen
///
/// A range with `start > end` or `end >= height` becomes `[0, height - 1]`.
pub fn normalize(rows: RowRange, height: u16) -> RowRange {
    if rows.is_valid(height) {
        return rows;
    }
    log::warn!(
        "malformed dirty range {}..={} for height {height}, flushing full screen",
        rows.start,
        rows.end
    );
    RowRange::new(0, height.saturating_sub(1))
}

/// Stream `rows` of `framebuffer` to the controller
///
/// Returns the range actually flushed, after clamping.
///
/// # Errors
///
/// Returns `Error::Interface` if any transfer fails. The flush is not retried.
pub fn flush<I, B>(
    display: &mut Display<I>,
    framebuffer: &mut Framebuffer<B>,
    rows: RowRange,
) -> Result<RowRange, Error<I>>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let dimensions = framebuffer.dimensions();
    let rows = normalize(rows, dimensions.height);
    log::trace!("flush rows {}..={}", rows.start, rows.end);

    display.set_address_window(AddressWindow::rows(dimensions, rows))?;
    display.write_memory_start()?;
    display.write_pixels(framebuffer.rows_mut(rows))?;
    Ok(rows)
}

/// Flush whatever is pending, if anything
///
/// Returns the range flushed, or `None` without touching the bus when no
/// rows are dirty. On failure the pending range is kept for the next tick.
///
/// # Errors
///
/// Same as [`flush`].
pub fn flush_pending<I, B>(
    scheduler: &mut UpdateScheduler,
    display: &mut Display<I>,
    framebuffer: &mut Framebuffer<B>,
) -> Result<Option<RowRange>, Error<I>>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let Some(rows) = scheduler.take() else {
        return Ok(None);
    };
    match flush(display, framebuffer, rows) {
        Ok(flushed) => Ok(Some(flushed)),
        Err(e) => {
            scheduler.mark(rows);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::command::{SET_COLUMN_ADDRESS, SET_PAGE_ADDRESS, WRITE_MEMORY_START};
    use crate::config::{Builder, Dimensions};
    use crate::interface::test_spy::{Op, SpyInterface};
    use alloc::vec;
    use alloc::vec::Vec;

    const WIDTH: u16 = 4;
    const HEIGHT: u16 = 12;

    fn setup() -> (Display<SpyInterface>, Framebuffer<Vec<u8>>) {
        let dims = Dimensions::new(WIDTH, HEIGHT).unwrap();
        let config = Builder::new().dimensions(dims).build().unwrap();
        let mut display = Display::new(SpyInterface::new(), config);
        display.assume_active();
        let framebuffer = Framebuffer::new(vec![0u8; dims.buffer_size()], dims).unwrap();
        (display, framebuffer)
    }

    #[test]
    fn test_mark_coalesces_disjoint_ranges() {
        let mut forward = UpdateScheduler::new(HEIGHT);
        forward.mark(RowRange::new(2, 4));
        forward.mark(RowRange::new(7, 9));

        let mut backward = UpdateScheduler::new(HEIGHT);
        backward.mark(RowRange::new(7, 9));
        backward.mark(RowRange::new(2, 4));

        assert_eq!(forward.pending(), Some(RowRange::new(2, 9)));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_mark_clamps_malformed_range() {
        let mut scheduler = UpdateScheduler::new(HEIGHT);
        scheduler.mark(RowRange::new(2, 4));
        scheduler.mark(RowRange::new(9, 2));
        assert_eq!(scheduler.pending(), Some(RowRange::new(0, HEIGHT - 1)));

        let mut scheduler = UpdateScheduler::new(HEIGHT);
        scheduler.mark(RowRange::new(3, HEIGHT + 5));
        assert_eq!(scheduler.pending(), Some(RowRange::new(0, HEIGHT - 1)));
    }

    #[test]
    fn test_malformed_mark_flushes_full_screen() {
        let (mut display, mut fb) = setup();
        let mut scheduler = UpdateScheduler::new(HEIGHT);
        scheduler.mark(RowRange::new(9, 2));

        let flushed = flush_pending(&mut scheduler, &mut display, &mut fb).unwrap();
        assert_eq!(flushed, Some(RowRange::new(0, HEIGHT - 1)));
        assert_eq!(
            display.interface_mut().data_after(SET_PAGE_ADDRESS),
            [vec![0, 0, 0, HEIGHT as u8 - 1]]
        );
    }

    #[test]
    fn test_union_is_associative() {
        let (a, b, c) = (RowRange::new(5, 5), RowRange::new(0, 1), RowRange::new(9, 11));
        assert_eq!(a.union(b).union(c), a.union(b.union(c)));
    }

    #[test]
    fn test_disjoint_writes_flush_once() {
        let (mut display, mut fb) = setup();
        let mut scheduler = UpdateScheduler::new(HEIGHT);
        scheduler.mark(fb.write_pixel_rows(2, 4));
        scheduler.mark(fb.write_pixel_rows(7, 9));

        let flushed = flush_pending(&mut scheduler, &mut display, &mut fb).unwrap();
        assert_eq!(flushed, Some(RowRange::new(2, 9)));
        assert_eq!(scheduler.pending(), None);

        let spy = display.interface_mut();
        assert_eq!(spy.commands(), [SET_COLUMN_ADDRESS, SET_PAGE_ADDRESS, WRITE_MEMORY_START]);
        assert_eq!(spy.data_after(SET_PAGE_ADDRESS), [vec![0, 2, 0, 9]]);
        assert_eq!(spy.data_after(SET_COLUMN_ADDRESS), [vec![0, 0, 0, WIDTH as u8 - 1]]);
        let pixels = spy.data_after(WRITE_MEMORY_START);
        assert_eq!(pixels[0].len(), 8 * usize::from(WIDTH) * 2);
    }

    #[test]
    fn test_flush_sends_big_endian_and_keeps_host_order() {
        let (mut display, mut fb) = setup();
        fb.write_pixel(0, 0, Color::new(0x1234)).unwrap();
        flush(&mut display, &mut fb, RowRange::single(0)).unwrap();

        let sent = display.interface_mut().data_after(WRITE_MEMORY_START);
        assert_eq!(&sent[0][..2], &[0x12, 0x34]);
        assert_eq!(&fb.as_bytes()[..2], &[0x34, 0x12]);
    }

    #[test]
    fn test_malformed_range_is_clamped() {
        assert_eq!(normalize(RowRange::new(5, 3), HEIGHT), RowRange::new(0, HEIGHT - 1));
        assert_eq!(normalize(RowRange::new(0, HEIGHT), HEIGHT), RowRange::new(0, HEIGHT - 1));
        assert_eq!(normalize(RowRange::new(3, 5), HEIGHT), RowRange::new(3, 5));

        let (mut display, mut fb) = setup();
        let flushed = flush(&mut display, &mut fb, RowRange::new(9, 2)).unwrap();
        assert_eq!(flushed, RowRange::new(0, HEIGHT - 1));
        assert_eq!(
            display.interface_mut().data_after(SET_PAGE_ADDRESS),
            [vec![0, 0, 0, HEIGHT as u8 - 1]]
        );
    }

    #[test]
    fn test_clean_tick_is_silent() {
        let (mut display, mut fb) = setup();
        let mut scheduler = UpdateScheduler::new(HEIGHT);
        assert_eq!(flush_pending(&mut scheduler, &mut display, &mut fb).unwrap(), None);
        assert_eq!(display.interface_mut().transfers(), 0);
    }

    #[test]
    fn test_failed_flush_keeps_pending() {
        let (mut display, mut fb) = setup();
        display.interface_mut().fail_data = true;
        let mut scheduler = UpdateScheduler::new(HEIGHT);
        scheduler.mark(RowRange::new(1, 3));
        assert!(flush_pending(&mut scheduler, &mut display, &mut fb).is_err());
        assert_eq!(scheduler.pending(), Some(RowRange::new(1, 3)));
        assert_eq!(display.interface_mut().ops[0], Op::Command(SET_COLUMN_ADDRESS));
    }

    #[test]
    fn test_clear_if_covered() {
        let mut scheduler = UpdateScheduler::new(HEIGHT);
        scheduler.mark(RowRange::new(3, 4));
        scheduler.clear_if_covered(RowRange::new(4, 6));
        assert!(scheduler.pending().is_some());
        scheduler.clear_if_covered(RowRange::new(0, 6));
        assert!(scheduler.pending().is_none());
    }

    trait WriteRows {
        fn write_pixel_rows(&mut self, first: u16, last: u16) -> RowRange;
    }

    impl WriteRows for Framebuffer<Vec<u8>> {
        fn write_pixel_rows(&mut self, first: u16, last: u16) -> RowRange {
            let stride = self.dimensions().row_stride();
            let offset = usize::from(first) * stride;
            let len = usize::from(last - first + 1) * stride;
            self.write(offset, &vec![0xAA; len]).unwrap()
        }
    }
}
