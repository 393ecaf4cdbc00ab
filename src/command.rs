//! ST7789V / ILI9341 command definitions
//!
//! This module defines the command bytes used to control MIPI DCS compatible
//! TFT controllers. Commands are sent over SPI with the DC pin low for the
//! command byte and high for its parameter bytes.
//!
//! ## Command Structure
//!
//! All commands follow the pattern:
//! 1. Set DC low (command mode)
//! 2. Send command byte
//! 3. Set DC high (data mode)
//! 4. Send parameter bytes (if any)
//!
//! ## Example
//!
//! ```rust,no_run
//! use st7789fb::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::{Operation, SpiDevice};
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
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin, None::<MockPin>, None::<MockPin>);
//! // Select 16 bits per pixel
//! let _ = interface.send_command(command::SET_PIXEL_FORMAT);
//! let _ = interface.send_data(&[command::PIXEL_FORMAT_16BIT]);
//!
//! // Turn the panel on
//! let _ = interface.send_command(command::SET_DISPLAY_ON);
//! ```

// MIPI DCS commands

/// Enter sleep mode (0x10)
///
/// Stops the internal oscillator and DC/DC converter. Frame memory is kept.
pub const ENTER_SLEEP_MODE: u8 = 0x10;

/// Exit sleep mode (0x11)
///
/// The controller needs 120ms after this command before it accepts the
/// register programming sequence.
pub const EXIT_SLEEP_MODE: u8 = 0x11;

/// Display off (0x28)
///
/// Blanks the panel output. Frame memory content is preserved.
pub const SET_DISPLAY_OFF: u8 = 0x28;

/// Display on (0x29)
pub const SET_DISPLAY_ON: u8 = 0x29;

/// Column address set (0x2A)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB]
pub const SET_COLUMN_ADDRESS: u8 = 0x2A;

/// Page (row) address set (0x2B)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB]
pub const SET_PAGE_ADDRESS: u8 = 0x2B;

/// Memory write (0x2C)
///
/// Following data bytes are streamed into the current address window,
/// row-major, starting at the top-left corner.
pub const WRITE_MEMORY_START: u8 = 0x2C;

/// Memory data access control (0x36)
///
/// Controls scan direction and RGB/BGR order. Requires 1 byte.
pub const SET_ADDRESS_MODE: u8 = 0x36;

/// Interface pixel format (0x3A)
///
/// Requires 1 byte, see [`PIXEL_FORMAT_16BIT`].
pub const SET_PIXEL_FORMAT: u8 = 0x3A;

/// 16 bits per pixel (RGB565) parameter for [`SET_PIXEL_FORMAT`]
pub const PIXEL_FORMAT_16BIT: u8 = 0x55;

// ST7789V vendor registers

/// Porch setting (0xB2), 5 bytes
pub const PORCTRL: u8 = 0xB2;

/// Gate control (0xB7), 1 byte
pub const GCTRL: u8 = 0xB7;

/// VCOM setting (0xBB), 1 byte
pub const VCOMS: u8 = 0xBB;

/// LCM control (0xC0), 1 byte
pub const LCM: u8 = 0xC0;

/// VDV and VRH command enable (0xC2), 1 byte
pub const VDVVRHEN: u8 = 0xC2;

/// VRH set (0xC3), 1 byte
pub const VRHS: u8 = 0xC3;

/// VDV set (0xC4), 1 byte
pub const VDVS: u8 = 0xC4;

/// VCOM offset set (0xC5), 1 byte
pub const VCMOFSET: u8 = 0xC5;

/// Frame rate control in normal mode (0xC6), 1 byte
pub const FRCTRL: u8 = 0xC6;

/// Power control 1 (0xD0), 2 bytes
pub const PWCTRL1: u8 = 0xD0;

/// Positive voltage gamma control (0xE0), 14 bytes
pub const PVGAMCTRL: u8 = 0xE0;

/// Negative voltage gamma control (0xE1), 14 bytes
pub const NVGAMCTRL: u8 = 0xE1;
