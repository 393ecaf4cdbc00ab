//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for communicating with the controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The controller requires:
//! - SPI bus (MOSI + SCK, CS handled by the [`SpiDevice`])
//! - GPIO outputs:
//!   - **DC**: Data/Command select (low=command, high=data)
//!   - **RST**: Reset (active low)
//!   - **BL**: Backlight enable (optional, active high)
//!   - **PWR**: Panel power enable (optional, active high)
//!
//! ## Example
//!
//! ```rust,no_run
//! use core::num::NonZeroUsize;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use st7789fb::{DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! // SPI, DC, RST, backlight, no power switch
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin, Some(MockPin), None::<MockPin>);
//!
//! // The SPI master can only move 64 bytes per transfer
//! interface.set_max_transfer_size(NonZeroUsize::new(64));
//!
//! // Send command
//! let _ = interface.send_command(0x11); // Exit sleep
//!
//! // Send data (split into 64 byte transfers)
//! let _ = interface.send_data(&[0u8; 200]);
//! ```

use core::fmt::Debug;
use core::num::NonZeroUsize;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Swap every 16-bit pixel between host (little-endian) and wire (big-endian) order
///
/// A trailing odd byte is left untouched.
pub fn swap_pixel_bytes(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(2) {
        pixel.swap(0, 1);
    }
}

/// Trait for hardware interface to the display controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// SPI + GPIO implementation that satisfies embedded-hal traits.
///
/// Every call is synchronous: it returns once the transfer completed or failed.
/// Implementations never retry.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. If you need
/// custom behavior (e.g., different pin polarities, a DMA-backed bus),
/// implement this trait on your own type.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send a command byte to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin low (command mode)
    /// 2. Send the command byte over SPI
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send data bytes to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin high (data mode)
    /// 2. Send the data bytes over SPI, split into bus-sized chunks if needed
    ///
    /// DC must stay high across all chunks of one call.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Send RGB565 pixels stored in host order
    ///
    /// Pixels are swapped to big-endian in place for the transfer and swapped
    /// back afterwards, so `pixels` is unchanged when this returns, on
    /// success or failure.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_pixels(&mut self, pixels: &mut [u8]) -> InterfaceResult<(), Self::Error> {
        swap_pixel_bytes(pixels);
        let result = self.send_data(pixels);
        swap_pixel_bytes(pixels);
        result
    }

    /// Drive the reset line (`true` = held in reset)
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO fails.
    fn set_reset(&mut self, asserted: bool) -> InterfaceResult<(), Self::Error>;

    /// Switch the backlight, a no-op without a backlight line
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO fails.
    fn set_backlight(&mut self, on: bool) -> InterfaceResult<(), Self::Error>;

    /// Whether a backlight line is wired
    fn has_backlight(&self) -> bool;

    /// Switch panel power, a no-op without a power line
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO fails.
    fn set_power(&mut self, on: bool) -> InterfaceResult<(), Self::Error>;
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Hardware interface implementation for 4-wire SPI TFT controllers
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
/// Owns the bus and every line; [`release`](Self::release) hands them back.
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BL` - Backlight enable pin implementing [`OutputPin`]
/// * `PWR` - Power enable pin implementing [`OutputPin`]
pub struct Interface<SPI, DC, RST, BL, PWR> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Backlight enable (active high)
    backlight: Option<BL>,
    /// Panel power enable (active high)
    power: Option<PWR>,
    /// Largest single SPI transfer the bus accepts
    max_transfer_size: Option<NonZeroUsize>,
}

impl<SPI, DC, RST, BL, PWR> Interface<SPI, DC, RST, BL, PWR>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
    PWR: OutputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    /// * `backlight` - Backlight enable pin, if wired
    /// * `power` - Panel power enable pin, if wired
    pub fn new(spi: SPI, dc: DC, rst: RST, backlight: Option<BL>, power: Option<PWR>) -> Self {
        Self {
            spi,
            dc,
            rst,
            backlight,
            power,
            max_transfer_size: None,
        }
    }

    /// Limit the size of a single SPI transfer
    ///
    /// Longer payloads are sent as consecutive transfers of at most this many
    /// bytes. `None` (the default) sends every payload in one transfer.
    pub fn set_max_transfer_size(&mut self, size: Option<NonZeroUsize>) -> &mut Self {
        self.max_transfer_size = size;
        self
    }

    /// Get the transfer size limit
    pub fn max_transfer_size(&self) -> Option<NonZeroUsize> {
        self.max_transfer_size
    }

    /// Release the bus and lines
    pub fn release(self) -> (SPI, DC, RST, Option<BL>, Option<PWR>) {
        (self.spi, self.dc, self.rst, self.backlight, self.power)
    }
}

impl<SPI, DC, RST, BL, PWR, PinErr> DisplayInterface for Interface<SPI, DC, RST, BL, PWR>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BL: OutputPin<Error = PinErr>,
    PWR: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        log::trace!("command 0x{command:02x}");
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        log::trace!("data {} bytes", data.len());
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        let chunk_size = self.max_transfer_size.map_or(data.len(), NonZeroUsize::get);
        if chunk_size == 0 {
            return Ok(());
        }
        for chunk in data.chunks(chunk_size) {
            self.spi.write(chunk).map_err(InterfaceError::Spi)?;
        }
        Ok(())
    }

    fn set_reset(&mut self, asserted: bool) -> InterfaceResult<(), Self::Error> {
        if asserted {
            self.rst.set_low().map_err(InterfaceError::Pin)
        } else {
            self.rst.set_high().map_err(InterfaceError::Pin)
        }
    }

    fn set_backlight(&mut self, on: bool) -> InterfaceResult<(), Self::Error> {
        match self.backlight.as_mut() {
            Some(pin) if on => pin.set_high().map_err(InterfaceError::Pin),
            Some(pin) => pin.set_low().map_err(InterfaceError::Pin),
            None => Ok(()),
        }
    }

    fn has_backlight(&self) -> bool {
        self.backlight.is_some()
    }

    fn set_power(&mut self, on: bool) -> InterfaceResult<(), Self::Error> {
        match self.power.as_mut() {
            Some(pin) if on => pin.set_high().map_err(InterfaceError::Pin),
            Some(pin) => pin.set_low().map_err(InterfaceError::Pin),
            None => Ok(()),
        }
    }
}
