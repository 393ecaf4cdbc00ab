//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! framebuffer access ([`RangeError`]), control commands ([`CommandError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`RangeError`] - Out-of-bounds framebuffer access, rejected before any hardware effect
//! - [`CommandError`] - Malformed or unknown control commands
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! ## Example
//!
//! ```
//! use st7789fb::{Builder, BuilderError, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(480, 320); // Too wide
//! assert!(result.is_err());
//! ```

use crate::display::State;
use crate::interface::DisplayInterface;

/// Maximum columns addressable in the controller frame memory
pub const MAX_COLUMNS: u16 = 240;

/// Maximum rows addressable in the controller frame memory
pub const MAX_ROWS: u16 = 320;

/// Out-of-bounds framebuffer access
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeError {
    /// Byte range does not fit in the framebuffer
    OutOfBounds {
        /// Byte offset of the write
        offset: usize,
        /// Length of the write in bytes
        len: usize,
        /// Framebuffer capacity in bytes
        capacity: usize,
    },
    /// Zero-length write
    EmptyWrite {
        /// Byte offset of the write
        offset: usize,
    },
    /// Pixel coordinate outside the display
    PixelOutOfBounds {
        /// X coordinate
        x: u16,
        /// Y coordinate
        y: u16,
    },
}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds {
                offset,
                len,
                capacity,
            } => write!(
                f,
                "Write of {len} bytes at offset {offset} exceeds capacity {capacity}"
            ),
            Self::EmptyWrite { offset } => write!(f, "Empty write at offset {offset}"),
            Self::PixelOutOfBounds { x, y } => write!(f, "Pixel ({x}, {y}) out of bounds"),
        }
    }
}

impl core::error::Error for RangeError {}

/// Control command rejected before any hardware effect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// Payload has the wrong shape or addresses pixels outside the display
    InvalidArgument,
    /// Opcode is not part of the protocol
    Unsupported {
        /// The unknown opcode
        opcode: u8,
    },
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "Invalid command argument"),
            Self::Unsupported { opcode } => write!(f, "Unsupported opcode {opcode}"),
        }
    }
}

impl core::error::Error for CommandError {}

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    /// Never retried by the driver.
    Interface(I::Error),
    /// Bus failure while bringing the controller up
    ///
    /// Fatal to attach.
    Init(I::Error),
    /// Out-of-bounds framebuffer access
    Range(RangeError),
    /// Rejected control command
    Command(CommandError),
    /// Operation not allowed in the current controller state
    ///
    /// Commands and flushes need [`State::Active`], bring-up needs
    /// [`State::Resetting`].
    InvalidState {
        /// State the controller was in
        state: State,
    },
    /// Framebuffer memory is too small for the display
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
}

impl<I: DisplayInterface> From<RangeError> for Error<I> {
    fn from(err: RangeError) -> Self {
        Self::Range(err)
    }
}

impl<I: DisplayInterface> From<CommandError> for Error<I> {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
            Self::Init(e) => write!(f, "Initialization failed: {e:?}"),
            Self::Range(e) => write!(f, "{e}"),
            Self::Command(e) => write!(f, "{e}"),
            Self::InvalidState { state } => write!(f, "Invalid controller state {state:?}"),
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Debug)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width requested
        width: u16,
        /// Height requested
        height: u16,
    },
    /// Deferred flush rate must be between 1 and 1_000_000 per second
    InvalidFrameRate(u32),
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_COLUMNS}x{MAX_ROWS})"
            ),
            Self::InvalidFrameRate(rate) => write!(f, "Invalid frame rate {rate}"),
        }
    }
}

impl core::error::Error for BuilderError {}
