//! Controller bring-up, teardown and addressing
//!
//! [`Display`] sequences the controller through its lifecycle:
//!
//! ```text
//! Uninitialized --reset()--> Resetting --bring_up()--> ProgrammingRegisters --> Active
//! Active --teardown()--> TearingDown --> Off
//! ```
//!
//! It also programs the address window and streams pixel memory writes.

use embedded_hal::delay::DelayNs;

use crate::command::{
    ENTER_SLEEP_MODE, EXIT_SLEEP_MODE, SET_COLUMN_ADDRESS, SET_DISPLAY_OFF, SET_DISPLAY_ON,
    SET_PAGE_ADDRESS, WRITE_MEMORY_START,
};
use crate::config::{Config, Dimensions};
use crate::error::Error;
use crate::framebuffer::RowRange;
use crate::interface::DisplayInterface;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Reset line hold time in milliseconds
pub const RESET_PULSE_MS: u32 = 20;
/// Settling time after releasing reset, before any bus activity
pub const RESET_SETTLE_MS: u32 = 200;
/// Wait after EXIT_SLEEP_MODE before programming registers
pub const SLEEP_OUT_MS: u32 = 120;

/// Controller lifecycle state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum State {
    /// Not yet reset
    #[default]
    Uninitialized,
    /// Hardware reset done, waiting for bring-up
    Resetting,
    /// Replaying the register programming sequence
    ProgrammingRegisters,
    /// Displaying; commands and flushes are allowed
    Active,
    /// Running the power-down sequence
    TearingDown,
    /// Powered down
    Off,
}

/// Rectangle of controller memory written by the next pixel stream
///
/// Corners are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressWindow {
    /// First column
    pub x_start: u16,
    /// First row
    pub y_start: u16,
    /// Last column (inclusive)
    pub x_end: u16,
    /// Last row (inclusive)
    pub y_end: u16,
}

impl AddressWindow {
    /// Create a new window
    pub const fn new(x_start: u16, y_start: u16, x_end: u16, y_end: u16) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    /// The whole display
    pub fn full(dimensions: Dimensions) -> Self {
        Self::new(
            0,
            0,
            dimensions.width.saturating_sub(1),
            dimensions.height.saturating_sub(1),
        )
    }

    /// Full-width band of rows
    pub fn rows(dimensions: Dimensions, rows: RowRange) -> Self {
        Self::new(0, rows.start, dimensions.width.saturating_sub(1), rows.end)
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.x_end.saturating_sub(self.x_start) + 1
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.y_end.saturating_sub(self.y_start) + 1
    }
}

/// Panel blanking level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlankMode {
    /// Display on, backlight on
    Unblank,
    /// Display off and asleep, backlight untouched
    Normal,
    /// Same as `Normal`
    Suspend,
    /// Display off and asleep, backlight off
    Powerdown,
}

/// Core display driver
///
/// This struct provides low-level operations for the controller.
/// Shared access with a framebuffer and deferred updates goes through
/// [`Driver`](crate::Driver).
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Lifecycle state
    state: State,
    /// Window last programmed into the controller
    window: AddressWindow,
    /// Whether the backlight line is driven on
    backlight_on: bool,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        let window = AddressWindow::full(config.dimensions);
        Self {
            interface,
            config,
            state: State::Uninitialized,
            window,
            backlight_on: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// Pulse the reset line
    ///
    /// Holds reset for [`RESET_PULSE_MS`], then waits [`RESET_SETTLE_MS`]
    /// before returning. Allowed from any state except `TearingDown`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Init` if the reset line cannot be driven.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        if self.state == State::TearingDown {
            return Err(Error::InvalidState { state: self.state });
        }
        log::debug!("reset from {:?}", self.state);
        self.state = State::Uninitialized;
        self.interface.set_reset(true).map_err(Error::Init)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.interface.set_reset(false).map_err(Error::Init)?;
        delay.delay_ms(RESET_SETTLE_MS);
        self.state = State::Resetting;
        Ok(())
    }

    /// Wake the controller and replay the init sequence
    ///
    /// Sends EXIT_SLEEP_MODE, waits [`SLEEP_OUT_MS`], replays
    /// `config.init_sequence`, turns the display on and enables the
    /// backlight.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` unless called right after
    /// [`reset`](Self::reset), and `Error::Init` on any bus failure. The
    /// controller is left `Uninitialized` after a failure and needs another
    /// reset.
    pub fn bring_up<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        if self.state != State::Resetting {
            return Err(Error::InvalidState { state: self.state });
        }
        self.state = State::ProgrammingRegisters;
        match self.program(delay) {
            Ok(()) => {
                self.state = State::Active;
                self.window = AddressWindow::full(self.config.dimensions);
                log::debug!("controller active");
                Ok(())
            }
            Err(e) => {
                log::error!("bring-up failed: {e:?}");
                self.state = State::Uninitialized;
                Err(Error::Init(e))
            }
        }
    }

    fn program<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), I::Error> {
        self.interface.send_command(EXIT_SLEEP_MODE)?;
        delay.delay_ms(SLEEP_OUT_MS);

        for step in self.config.init_sequence {
            self.interface.send_command(step.register)?;
            if !step.payload.is_empty() {
                self.interface.send_data(step.payload)?;
            }
        }

        self.interface.send_command(SET_DISPLAY_ON)?;
        self.interface.set_backlight(true)?;
        self.backlight_on = self.interface.has_backlight();
        Ok(())
    }

    /// Mark a controller already configured by firmware as active
    ///
    /// No bus traffic. Used when `config.skip_init` is set.
    pub fn assume_active(&mut self) {
        log::debug!("skipping controller initialization");
        self.state = State::Active;
    }

    /// Power the controller down
    ///
    /// Sends SET_DISPLAY_OFF and ENTER_SLEEP_MODE, switches the backlight off
    /// and releases the power line. Every step runs even if an earlier one
    /// fails; the state always ends in [`State::Off`].
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered, after all steps ran.
    pub fn teardown(&mut self) -> DisplayResult<I> {
        log::debug!("teardown from {:?}", self.state);
        self.state = State::TearingDown;
        let steps = [
            self.interface.send_command(SET_DISPLAY_OFF),
            self.interface.send_command(ENTER_SLEEP_MODE),
            self.interface.set_backlight(false),
            self.interface.set_power(false),
        ];
        self.backlight_on = false;
        self.state = State::Off;

        let mut first = None;
        for (index, result) in steps.into_iter().enumerate() {
            if let Err(e) = result {
                log::error!("teardown step {index} failed: {e:?}");
                first.get_or_insert(e);
            }
        }
        match first {
            Some(e) => Err(Error::Interface(e)),
            None => Ok(()),
        }
    }

    /// Program column and page address ranges
    ///
    /// The window must be reissued before every pixel stream; the controller
    /// does not keep it across sleep.
    pub fn set_address_window(&mut self, window: AddressWindow) -> DisplayResult<I> {
        log::debug!(
            "window x={}..={} y={}..={}",
            window.x_start,
            window.x_end,
            window.y_start,
            window.y_end
        );
        self.send_command(SET_COLUMN_ADDRESS)?;
        self.send_data(&range_bytes(window.x_start, window.x_end))?;
        self.send_command(SET_PAGE_ADDRESS)?;
        self.send_data(&range_bytes(window.y_start, window.y_end))?;
        self.window = window;
        Ok(())
    }

    /// Start a memory write into the current window
    pub fn write_memory_start(&mut self) -> DisplayResult<I> {
        self.send_command(WRITE_MEMORY_START)
    }

    /// Stream host-order RGB565 pixels
    pub fn write_pixels(&mut self, pixels: &mut [u8]) -> DisplayResult<I> {
        self.interface.send_pixels(pixels).map_err(Error::Interface)
    }

    /// Turn the panel output on or off
    pub fn set_display_on(&mut self, on: bool) -> DisplayResult<I> {
        self.send_command(if on { SET_DISPLAY_ON } else { SET_DISPLAY_OFF })
    }

    /// Switch the backlight line
    pub fn set_backlight(&mut self, on: bool) -> DisplayResult<I> {
        self.interface.set_backlight(on).map_err(Error::Interface)?;
        self.backlight_on = on && self.interface.has_backlight();
        Ok(())
    }

    /// Whether the backlight is currently on
    ///
    /// Always false without a backlight line.
    pub fn backlight_enabled(&self) -> bool {
        self.backlight_on
    }

    /// Blank or unblank the panel
    pub fn blank(&mut self, mode: BlankMode) -> DisplayResult<I> {
        match mode {
            BlankMode::Unblank => {
                self.set_backlight(true)?;
                self.send_command(SET_DISPLAY_ON)?;
                self.send_command(EXIT_SLEEP_MODE)
            }
            BlankMode::Normal | BlankMode::Suspend | BlankMode::Powerdown => {
                if mode == BlankMode::Powerdown {
                    self.set_backlight(false)?;
                }
                self.send_command(SET_DISPLAY_OFF)?;
                self.send_command(ENTER_SLEEP_MODE)
            }
        }
    }

    /// Send a command to the display controller
    pub fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }

    /// Send data to the display controller
    pub fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
    }

    /// Window last programmed into the controller
    pub fn window(&self) -> AddressWindow {
        self.window
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give back the interface
    pub fn release(self) -> I {
        self.interface
    }

    #[cfg(test)]
    pub(crate) fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }
}

/// Big-endian start/end pair for column and page address commands
fn range_bytes(start: u16, end: u16) -> [u8; 4] {
    let [s0, s1] = start.to_be_bytes();
    let [e0, e1] = end.to_be_bytes();
    [s0, s1, e0, e1]
}
