//! Per-device handle
//!
//! A [`Driver`] owns one transport, one framebuffer and the dirty-row state.
//! Everything lives behind a single [`spin::Mutex`], so a command, a raw
//! framebuffer write and the periodic deferred flush never interleave their
//! bus traffic.
//!
//! ## Example
//!
//! ```
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use st7789fb::{Builder, Command, Dimensions, Driver, Interface, Reply, State};
//! use st7789fb::dispatch::GET_WINDOW;
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(&mut self, _operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let interface = Interface::new(MockSpi, MockPin, MockPin, Some(MockPin), None::<MockPin>);
//! let dims = match Dimensions::new(240, 320) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let driver = match Driver::attach(interface, config, [0u8; 240 * 320 * 2], &mut delay) {
//!     Ok(driver) => driver,
//!     Err(_) => return,
//! };
//! assert_eq!(driver.state(), State::Active);
//!
//! // Raw writes are flushed by the next tick
//! let _ = driver.write_bytes(0, &[0xff; 480]);
//! let _ = driver.tick();
//!
//! let reply = Command::decode(GET_WINDOW, &[]).map(|cmd| driver.dispatch(cmd, &mut delay));
//! assert!(matches!(reply, Ok(Ok(Reply::Window(_)))));
//! ```

use embedded_hal::delay::DelayNs;
use spin::Mutex;

use crate::config::{Config, Dimensions};
use crate::dispatch::{self, Command, Position, Reply};
use crate::display::{BlankMode, Display, State};
use crate::error::Error;
use crate::framebuffer::{Framebuffer, RowRange};
use crate::interface::DisplayInterface;
use crate::scheduler::{self, UpdateScheduler};

/// State guarded by the device lock
pub(crate) struct Inner<I, B>
where
    I: DisplayInterface,
{
    pub(crate) display: Display<I>,
    pub(crate) framebuffer: Framebuffer<B>,
    pub(crate) scheduler: UpdateScheduler,
    pub(crate) cursor: Position,
}

/// Resources handed back by [`Driver::detach`]
pub struct Released<I, B>
where
    I: DisplayInterface,
{
    /// The transport with all its lines
    pub interface: I,
    /// The framebuffer memory
    pub buffer: B,
    /// Outcome of the power-down sequence
    pub teardown: Result<(), Error<I>>,
}

/// Display driver with a framebuffer and deferred updates
///
/// ## Type Parameters
///
/// * `I` - Interface type implementing [`DisplayInterface`]
/// * `B` - Framebuffer memory implementing `AsRef<[u8]> + AsMut<[u8]>`
pub struct Driver<I, B>
where
    I: DisplayInterface,
{
    inner: Mutex<Inner<I, B>>,
    frame_period_us: u32,
}

impl<I, B> Driver<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Attach to a display
    ///
    /// Resets and programs the controller unless `config.skip_init` is set.
    /// After a full bring-up the whole framebuffer is marked dirty so the
    /// first tick paints the panel.
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if `buffer` cannot hold the display,
    /// `Error::Init` if bring-up fails. All resources are dropped on failure.
    pub fn attach<D: DelayNs>(
        interface: I,
        config: Config,
        buffer: B,
        delay: &mut D,
    ) -> Result<Self, Error<I>> {
        let dimensions = config.dimensions;
        let provided = buffer.as_ref().len();
        let framebuffer = Framebuffer::new(buffer, dimensions).map_err(|_| {
            Error::BufferTooSmall {
                required: dimensions.buffer_size(),
                provided,
            }
        })?;

        let frame_period_us = config.frame_period_us();
        let skip_init = config.skip_init;
        let mut display = Display::new(interface, config);
        let mut scheduler = UpdateScheduler::new(dimensions.height);
        if skip_init {
            display.assume_active();
        } else {
            display.reset(delay)?;
            display.bring_up(delay)?;
            scheduler.mark(RowRange::new(0, dimensions.height.saturating_sub(1)));
        }
        log::info!(
            "attached {}x{} display, {} us frame period",
            dimensions.width,
            dimensions.height,
            frame_period_us
        );

        Ok(Self {
            inner: Mutex::new(Inner {
                display,
                framebuffer,
                scheduler,
                cursor: Position::default(),
            }),
            frame_period_us,
        })
    }

    /// Power down and give back the transport and framebuffer memory
    ///
    /// Teardown is skipped if the controller is already off.
    pub fn detach(self) -> Released<I, B> {
        let Inner {
            mut display,
            framebuffer,
            ..
        } = self.inner.into_inner();
        let teardown = match display.state() {
            State::Off => Ok(()),
            _ => display.teardown(),
        };
        Released {
            interface: display.release(),
            buffer: framebuffer.release(),
            teardown,
        }
    }

    /// Execute a control command
    ///
    /// Drawing commands update the framebuffer and flush the touched rows
    /// before returning.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidState` unless the controller is active (`Reset` is
    ///   also accepted after a failed bring-up)
    /// - `Error::Command` for invalid arguments, with no hardware effect
    /// - `Error::Interface` on a bus failure
    pub fn dispatch<D: DelayNs>(
        &self,
        command: Command<'_>,
        delay: &mut D,
    ) -> Result<Reply, Error<I>> {
        dispatch::execute(&mut self.inner.lock(), command, delay)
    }

    /// Copy raw pixel bytes into the framebuffer at byte `offset`
    ///
    /// The touched rows are flushed by the next [`tick`](Self::tick).
    ///
    /// # Errors
    ///
    /// Returns `Error::Range` for an empty write or one past the end of the
    /// framebuffer. Nothing is copied in that case.
    pub fn write_bytes(&self, offset: usize, bytes: &[u8]) -> Result<RowRange, Error<I>> {
        let mut inner = self.inner.lock();
        let rows = inner.framebuffer.write(offset, bytes)?;
        inner.scheduler.mark(rows);
        Ok(rows)
    }

    /// Deferred flush, called every [`frame_period_us`](Self::frame_period_us)
    ///
    /// Returns the rows sent, or `None` without bus traffic when nothing is
    /// dirty.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` unless the controller is active and
    /// `Error::Interface` on a bus failure; the dirty rows stay pending.
    pub fn tick(&self) -> Result<Option<RowRange>, Error<I>> {
        let mut inner = self.inner.lock();
        let Inner {
            display,
            framebuffer,
            scheduler: updates,
            ..
        } = &mut *inner;
        if display.state() != State::Active {
            return Err(Error::InvalidState {
                state: display.state(),
            });
        }
        scheduler::flush_pending(updates, display, framebuffer)
    }

    /// Blank or unblank the panel
    pub fn blank(&self, mode: BlankMode) -> Result<(), Error<I>> {
        let mut inner = self.inner.lock();
        match inner.display.state() {
            State::Active => inner.display.blank(mode),
            state => Err(Error::InvalidState { state }),
        }
    }

    /// Power the controller down
    ///
    /// Always ends in [`State::Off`]; see [`Display::teardown`].
    pub fn teardown(&self) -> Result<(), Error<I>> {
        self.inner.lock().display.teardown()
    }

    /// Current controller state
    pub fn state(&self) -> State {
        self.inner.lock().display.state()
    }

    /// Whether the backlight is on
    pub fn backlight_enabled(&self) -> bool {
        self.inner.lock().display.backlight_enabled()
    }

    /// Cursor left by the last `SetCursor`, `WritePixel` or `ReadPixel`
    ///
    /// Positionless `WritePixel` and `ReadPixel` act on this pixel.
    pub fn cursor(&self) -> Position {
        self.inner.lock().cursor
    }

    /// Rows waiting for the next tick
    pub fn pending(&self) -> Option<RowRange> {
        self.inner.lock().scheduler.pending()
    }

    /// Display dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.inner.lock().framebuffer.dimensions()
    }

    /// Interval between deferred flushes in microseconds
    pub fn frame_period_us(&self) -> u32 {
        self.frame_period_us
    }

    /// Run `f` on the framebuffer, marking the rows it reports dirty
    pub fn with_framebuffer<R>(
        &self,
        f: impl FnOnce(&mut Framebuffer<B>) -> (R, Option<RowRange>),
    ) -> R {
        let mut inner = self.inner.lock();
        let (result, rows) = f(&mut inner.framebuffer);
        if let Some(rows) = rows {
            inner.scheduler.mark(rows);
        }
        result
    }

    /// Exclusive access without locking
    pub(crate) fn inner_mut(&mut self) -> &mut Inner<I, B> {
        self.inner.get_mut()
    }
}
