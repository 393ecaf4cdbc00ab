//! ST7789V / ILI9341 Framebuffer Driver
//!
//! A driver for SPI-attached TFT display controllers of the ST7789V and
//! ILI9341 class, with a host-side RGB565 framebuffer and dirty-row flushing.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Chunked SPI transfers with a configurable maximum transfer size
//! - Reset, bring-up and teardown sequencing with a replayable init sequence
//! - Immediate flushes for draw commands, periodic deferred flushes for raw writes
//! - A 14-opcode control protocol with a binary decoder
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use st7789fb::{Builder, Color, Command, Dimensions, Driver, Interface};
//! use st7789fb::dispatch::Position;
//!
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
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let backlight = MockPin;
//! # let mut delay = MockDelay;
//! let framebuffer = [0u8; 240 * 320 * 2];
//!
//! let interface = Interface::new(spi, dc, rst, Some(backlight), None::<MockPin>);
//! let dims = match Dimensions::new(240, 320) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).frame_rate(24).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let driver = match Driver::attach(interface, config, framebuffer, &mut delay) {
//!     Ok(driver) => driver,
//!     Err(_) => return,
//! };
//!
//! let _ = driver.dispatch(
//!     Command::WritePixel {
//!         position: Some(Position::new(10, 20)),
//!         color: Color::WHITE,
//!     },
//!     &mut delay,
//! );
//!
//! // Call from a timer every `driver.frame_period_us()`
//! let _ = driver.tick();
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// RGB565 color type
pub mod color;
/// MIPI DCS and ST7789V command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Control-command protocol
pub mod dispatch;
/// Controller lifecycle and addressing
pub mod display;
/// Per-device driver handle
pub mod driver;
/// Error types for the driver
pub mod error;
/// Host-side pixel memory
pub mod framebuffer;
/// Hardware interface abstraction
pub mod interface;
/// Dirty-row tracking and flushing
pub mod scheduler;
/// Register programming sequences
pub mod sequence;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use color::Color;
pub use config::{Builder, Config, Dimensions, MAX_COLUMNS, MAX_ROWS};
pub use dispatch::{Command, Reply};
pub use display::{AddressWindow, BlankMode, Display, State};
pub use driver::{Driver, Released};
pub use error::{BuilderError, CommandError, Error, RangeError};
pub use framebuffer::{Framebuffer, RowRange};
pub use interface::InterfaceError;
pub use interface::{DisplayInterface, Interface};
pub use scheduler::UpdateScheduler;
