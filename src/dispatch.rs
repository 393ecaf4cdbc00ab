//! Control-command protocol
//!
//! Fourteen opcodes drive the display from outside the crate. A transport
//! hands the driver an opcode and a packed payload; [`Command::decode`] turns
//! them into a typed [`Command`] and [`Driver::dispatch`](crate::Driver::dispatch)
//! executes it.
//!
//! Payload fields are little-endian `u16`s, packed without padding:
//!
//! | Opcode | Command | Payload |
//! |---|---|---|
//! | 0 | `WriteRawCmd` | command byte, then parameter bytes |
//! | 1 | `WriteRawData` | data bytes |
//! | 2 | `Reset` | empty |
//! | 3 | `BacklightCtrl` | 1 byte, non-zero is on |
//! | 4 | `DisplayCtrl` | 1 byte, non-zero is on |
//! | 5 | `DrawHLine` | x, y, length, color |
//! | 6 | `DrawVLine` | x, y, length, color |
//! | 7 | `SetCursor` | x, y |
//! | 8 | `WritePixel` | x, y, color; or color alone to write at the cursor |
//! | 9 | `ReadPixel` | x, y; or empty to read at the cursor |
//! | 10 | `SetPartialWindow` | bottom-left x, bottom-left y, width, height |
//! | 11 | `GetWindow` | empty |
//! | 12 | `DrawRectangle` | bottom-left x, bottom-left y, width, height, color |
//! | 13 | `DrawBitmap` | `u32` byte offset, then pixel bytes |
//!
//! ## Example
//!
//! ```
//! use st7789fb::{Color, Command, CommandError};
//! use st7789fb::dispatch::{Position, WRITE_PIXEL};
//!
//! let command = Command::decode(WRITE_PIXEL, &[3, 0, 4, 0, 0xff, 0xff]);
//! assert_eq!(
//!     command,
//!     Ok(Command::WritePixel {
//!         position: Some(Position::new(3, 4)),
//!         color: Color::WHITE,
//!     })
//! );
//! assert_eq!(
//!     Command::decode(42, &[]),
//!     Err(CommandError::Unsupported { opcode: 42 })
//! );
//! ```

use embedded_hal::delay::DelayNs;

use crate::color::Color;
use crate::config::Dimensions;
use crate::display::{AddressWindow, State};
use crate::driver::Inner;
use crate::error::{CommandError, Error};
use crate::framebuffer::RowRange;
use crate::interface::DisplayInterface;
use crate::scheduler;

/// Send a raw command byte with parameters
pub const WRITE_CMD: u8 = 0;
/// Send raw data bytes
pub const WRITE_DATA: u8 = 1;
/// Reset and re-initialize the controller
pub const RESET: u8 = 2;
/// Switch the backlight
pub const BACKLIGHT_CTRL: u8 = 3;
/// Switch the panel output
pub const DISPLAY_CTRL: u8 = 4;
/// Draw a horizontal line
pub const DRAW_H_LINE: u8 = 5;
/// Draw a vertical line
pub const DRAW_V_LINE: u8 = 6;
/// Move the cursor
pub const SET_CURSOR: u8 = 7;
/// Write one pixel
pub const WRITE_PIXEL: u8 = 8;
/// Read one pixel
pub const READ_PIXEL: u8 = 9;
/// Program the address window for raw writes
pub const SET_PARTIAL_WINDOW: u8 = 10;
/// Query the address window size
pub const GET_WINDOW: u8 = 11;
/// Fill a rectangle
pub const DRAW_RECTANGLE: u8 = 12;
/// Copy pixel bytes into the framebuffer
pub const DRAW_BITMAP: u8 = 13;

/// Pixel coordinate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// Column
    pub x: u16,
    /// Row
    pub y: u16,
}

impl Position {
    /// Create a new position
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    fn check(self, dimensions: Dimensions) -> Result<Self, CommandError> {
        if self.x < dimensions.width && self.y < dimensions.height {
            Ok(self)
        } else {
            Err(CommandError::InvalidArgument)
        }
    }
}

/// Size of a window in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowSize {
    /// Columns
    pub width: u16,
    /// Rows
    pub height: u16,
}

/// Rectangle anchored at its bottom-left corner
///
/// Rows grow downward, so the window covers rows
/// `bottom_left.y - height + 1 ..= bottom_left.y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    /// Bottom-left corner
    pub bottom_left: Position,
    /// Width and height
    pub size: WindowSize,
}

impl Window {
    /// Controller window for this rectangle
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidArgument` for an empty window or one that
    /// is not wholly inside `dimensions`.
    pub fn to_address_window(&self, dimensions: Dimensions) -> Result<AddressWindow, CommandError> {
        let Position { x, y } = self.bottom_left.check(dimensions)?;
        let WindowSize { width, height } = self.size;
        if width == 0 || height == 0 {
            return Err(CommandError::InvalidArgument);
        }
        let y_start = (y + 1)
            .checked_sub(height)
            .ok_or(CommandError::InvalidArgument)?;
        let x_end = x
            .checked_add(width - 1)
            .filter(|end| *end < dimensions.width)
            .ok_or(CommandError::InvalidArgument)?;
        Ok(AddressWindow::new(x, y_start, x_end, y))
    }
}

/// Straight line of one color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    /// First pixel
    pub start: Position,
    /// Number of pixels
    pub length: u16,
    /// Line color
    pub color: Color,
}

impl Line {
    fn window(&self, dimensions: Dimensions, vertical: bool) -> Result<AddressWindow, CommandError> {
        let Position { x, y } = self.start.check(dimensions)?;
        let last = self
            .length
            .checked_sub(1)
            .ok_or(CommandError::InvalidArgument)?;
        let window = if vertical {
            y.checked_add(last).map(|end| AddressWindow::new(x, y, x, end))
        } else {
            x.checked_add(last).map(|end| AddressWindow::new(x, y, end, y))
        }
        .ok_or(CommandError::InvalidArgument)?;
        Position::new(window.x_end, window.y_end).check(dimensions)?;
        Ok(window)
    }
}

/// A decoded control command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// Send the first byte as a command and the rest as its parameters
    WriteRawCmd(&'a [u8]),
    /// Send bytes as data
    WriteRawData(&'a [u8]),
    /// Reset the controller and replay bring-up
    Reset,
    /// Switch the backlight
    BacklightCtrl(bool),
    /// Switch the panel output
    DisplayCtrl(bool),
    /// Horizontal line to the right of `start`
    DrawHLine(Line),
    /// Vertical line below `start`
    DrawVLine(Line),
    /// Move the cursor used by positionless `WritePixel` and `ReadPixel`
    SetCursor(Position),
    /// Write one pixel and flush its row
    WritePixel {
        /// Pixel to write, the cursor when `None`
        position: Option<Position>,
        /// New color
        color: Color,
    },
    /// Read one pixel from the framebuffer, at the cursor when `None`
    ReadPixel(Option<Position>),
    /// Program the address window for raw data writes
    SetPartialWindow(Window),
    /// Report the size of the current address window
    GetWindow,
    /// Fill a rectangle and flush it
    DrawRectangle {
        /// Area to fill
        window: Window,
        /// Fill color
        color: Color,
    },
    /// Copy host-order pixel bytes into the framebuffer and flush them
    DrawBitmap {
        /// Byte offset into the framebuffer
        offset: usize,
        /// Pixel bytes
        data: &'a [u8],
    },
}

/// Result of a successful command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to report
    None,
    /// Color read by `ReadPixel`
    Pixel(Color),
    /// Window size reported by `GetWindow`
    Window(WindowSize),
}

/// Split a payload of exactly `N` little-endian `u16`s
fn fields<const N: usize>(payload: &[u8]) -> Result<[u16; N], CommandError> {
    if payload.len() != N * 2 {
        return Err(CommandError::InvalidArgument);
    }
    let mut out = [0u16; N];
    for (field, bytes) in out.iter_mut().zip(payload.chunks_exact(2)) {
        *field = u16::from_le_bytes([bytes[0], bytes[1]]);
    }
    Ok(out)
}

fn flag(payload: &[u8]) -> Result<bool, CommandError> {
    match payload {
        [value] => Ok(*value != 0),
        _ => Err(CommandError::InvalidArgument),
    }
}

impl<'a> Command<'a> {
    /// Decode an opcode and its packed payload
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Unsupported` for an unknown opcode and
    /// `CommandError::InvalidArgument` when the payload has the wrong length.
    pub fn decode(opcode: u8, payload: &'a [u8]) -> Result<Self, CommandError> {
        let command = match opcode {
            WRITE_CMD => Self::WriteRawCmd(payload),
            WRITE_DATA => Self::WriteRawData(payload),
            RESET => {
                fields::<0>(payload)?;
                Self::Reset
            }
            BACKLIGHT_CTRL => Self::BacklightCtrl(flag(payload)?),
            DISPLAY_CTRL => Self::DisplayCtrl(flag(payload)?),
            DRAW_H_LINE | DRAW_V_LINE => {
                let [x, y, length, color] = fields(payload)?;
                let line = Line {
                    start: Position::new(x, y),
                    length,
                    color: Color::new(color),
                };
                if opcode == DRAW_H_LINE {
                    Self::DrawHLine(line)
                } else {
                    Self::DrawVLine(line)
                }
            }
            SET_CURSOR => {
                let [x, y] = fields(payload)?;
                Self::SetCursor(Position::new(x, y))
            }
            WRITE_PIXEL if payload.len() == 2 => {
                let [color] = fields(payload)?;
                Self::WritePixel {
                    position: None,
                    color: Color::new(color),
                }
            }
            WRITE_PIXEL => {
                let [x, y, color] = fields(payload)?;
                Self::WritePixel {
                    position: Some(Position::new(x, y)),
                    color: Color::new(color),
                }
            }
            READ_PIXEL if payload.is_empty() => Self::ReadPixel(None),
            READ_PIXEL => {
                let [x, y] = fields(payload)?;
                Self::ReadPixel(Some(Position::new(x, y)))
            }
            SET_PARTIAL_WINDOW => {
                let [x, y, width, height] = fields(payload)?;
                Self::SetPartialWindow(window(x, y, width, height))
            }
            GET_WINDOW => {
                fields::<0>(payload)?;
                Self::GetWindow
            }
            DRAW_RECTANGLE => {
                let [x, y, width, height, color] = fields(payload)?;
                Self::DrawRectangle {
                    window: window(x, y, width, height),
                    color: Color::new(color),
                }
            }
            DRAW_BITMAP => {
                let (offset, data) = payload
                    .split_first_chunk::<4>()
                    .ok_or(CommandError::InvalidArgument)?;
                let offset = usize::try_from(u32::from_le_bytes(*offset))
                    .map_err(|_| CommandError::InvalidArgument)?;
                Self::DrawBitmap { offset, data }
            }
            opcode => return Err(CommandError::Unsupported { opcode }),
        };
        Ok(command)
    }

    /// Protocol opcode of this command
    pub fn opcode(&self) -> u8 {
        match self {
            Self::WriteRawCmd(_) => WRITE_CMD,
            Self::WriteRawData(_) => WRITE_DATA,
            Self::Reset => RESET,
            Self::BacklightCtrl(_) => BACKLIGHT_CTRL,
            Self::DisplayCtrl(_) => DISPLAY_CTRL,
            Self::DrawHLine(_) => DRAW_H_LINE,
            Self::DrawVLine(_) => DRAW_V_LINE,
            Self::SetCursor(_) => SET_CURSOR,
            Self::WritePixel { .. } => WRITE_PIXEL,
            Self::ReadPixel(_) => READ_PIXEL,
            Self::SetPartialWindow(_) => SET_PARTIAL_WINDOW,
            Self::GetWindow => GET_WINDOW,
            Self::DrawRectangle { .. } => DRAW_RECTANGLE,
            Self::DrawBitmap { .. } => DRAW_BITMAP,
        }
    }
}

fn window(x: u16, y: u16, width: u16, height: u16) -> Window {
    Window {
        bottom_left: Position::new(x, y),
        size: WindowSize { width, height },
    }
}

fn invalid<E>(_: E) -> CommandError {
    CommandError::InvalidArgument
}

/// Validate and run one command against locked driver state
///
/// Arguments are checked before anything reaches the bus; a rejected command
/// leaves the framebuffer and the controller untouched.
pub(crate) fn execute<I, B, D>(
    inner: &mut Inner<I, B>,
    command: Command<'_>,
    delay: &mut D,
) -> Result<Reply, Error<I>>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
    D: DelayNs,
{
    let state = inner.display.state();
    let allowed = match command {
        Command::Reset => state != State::Off,
        _ => state == State::Active,
    };
    if !allowed {
        return Err(Error::InvalidState { state });
    }
    log::debug!("dispatch opcode {}", command.opcode());

    let dimensions = inner.framebuffer.dimensions();
    match command {
        Command::WriteRawCmd(bytes) => {
            let (&cmd, params) = bytes.split_first().ok_or(CommandError::InvalidArgument)?;
            inner.display.send_command(cmd)?;
            if !params.is_empty() {
                inner.display.send_data(params)?;
            }
        }
        Command::WriteRawData(bytes) => {
            if bytes.is_empty() {
                return Err(CommandError::InvalidArgument.into());
            }
            inner.display.send_data(bytes)?;
        }
        Command::Reset => {
            inner.display.reset(delay)?;
            inner.display.bring_up(delay)?;
            inner
                .scheduler
                .mark(RowRange::new(0, dimensions.height.saturating_sub(1)));
        }
        Command::BacklightCtrl(on) => inner.display.set_backlight(on)?,
        Command::DisplayCtrl(on) => inner.display.set_display_on(on)?,
        Command::DrawHLine(line) | Command::DrawVLine(line) => {
            let vertical = matches!(command, Command::DrawVLine(_));
            let window = line.window(dimensions, vertical)?;
            fill_and_flush(inner, &window, line.color)?;
        }
        Command::SetCursor(position) => {
            inner.cursor = position.check(dimensions)?;
        }
        Command::WritePixel { position, color } => {
            let position = position.unwrap_or(inner.cursor);
            let Position { x, y } = position.check(dimensions)?;
            inner.framebuffer.write_pixel(x, y, color).map_err(invalid)?;
            inner.cursor = position;
            flush_now(inner, RowRange::single(y))?;
        }
        Command::ReadPixel(position) => {
            let position = position.unwrap_or(inner.cursor);
            let color = inner
                .framebuffer
                .read_pixel(position.x, position.y)
                .map_err(invalid)?;
            inner.cursor = position;
            return Ok(Reply::Pixel(color));
        }
        Command::SetPartialWindow(window) => {
            let window = window.to_address_window(dimensions)?;
            inner.display.set_address_window(window)?;
            inner.display.write_memory_start()?;
        }
        Command::GetWindow => {
            let window = inner.display.window();
            return Ok(Reply::Window(WindowSize {
                width: window.width(),
                height: window.height(),
            }));
        }
        Command::DrawRectangle { window, color } => {
            let window = window.to_address_window(dimensions)?;
            fill_and_flush(inner, &window, color)?;
        }
        Command::DrawBitmap { offset, data } => {
            inner
                .framebuffer
                .check_span(offset, data.len())
                .map_err(invalid)?;
            let rows = inner.framebuffer.write(offset, data)?;
            flush_now(inner, rows)?;
        }
    }
    Ok(Reply::None)
}

fn fill_and_flush<I, B>(
    inner: &mut Inner<I, B>,
    window: &AddressWindow,
    color: Color,
) -> Result<(), Error<I>>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let rows = inner.framebuffer.fill(window, color).map_err(invalid)?;
    flush_now(inner, rows)
}

/// Immediate flush of the rows a command touched
///
/// On failure the rows are marked dirty so the next tick retries them.
fn flush_now<I, B>(inner: &mut Inner<I, B>, rows: RowRange) -> Result<(), Error<I>>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    match scheduler::flush(&mut inner.display, &mut inner.framebuffer, rows) {
        Ok(flushed) => {
            inner.scheduler.clear_if_covered(flushed);
            Ok(())
        }
        Err(e) => {
            inner.scheduler.mark(rows);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> Dimensions {
        Dimensions::new(240, 320).unwrap()
    }

    #[test]
    fn test_decode_fixed_payloads() {
        assert_eq!(
            Command::decode(DRAW_H_LINE, &[1, 0, 2, 0, 10, 0, 0x1f, 0x00]),
            Ok(Command::DrawHLine(Line {
                start: Position::new(1, 2),
                length: 10,
                color: Color::new(0x001f),
            }))
        );
        assert_eq!(
            Command::decode(DRAW_RECTANGLE, &[0, 0, 9, 0, 4, 0, 5, 0, 0, 0xf8]),
            Ok(Command::DrawRectangle {
                window: window(0, 9, 4, 5),
                color: Color::new(0xf800),
            })
        );
        assert_eq!(Command::decode(RESET, &[]), Ok(Command::Reset));
        assert_eq!(Command::decode(BACKLIGHT_CTRL, &[2]), Ok(Command::BacklightCtrl(true)));
        assert_eq!(Command::decode(DISPLAY_CTRL, &[0]), Ok(Command::DisplayCtrl(false)));
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(
            Command::decode(SET_CURSOR, &[1, 0, 2]),
            Err(CommandError::InvalidArgument)
        );
        assert_eq!(
            Command::decode(GET_WINDOW, &[0]),
            Err(CommandError::InvalidArgument)
        );
        assert_eq!(
            Command::decode(BACKLIGHT_CTRL, &[]),
            Err(CommandError::InvalidArgument)
        );
        assert_eq!(
            Command::decode(DRAW_BITMAP, &[0, 0, 0]),
            Err(CommandError::InvalidArgument)
        );
    }

    #[test]
    fn test_decode_positionless_pixel_ops() {
        assert_eq!(
            Command::decode(WRITE_PIXEL, &[0x00, 0xf8]),
            Ok(Command::WritePixel {
                position: None,
                color: Color::new(0xf800),
            })
        );
        assert_eq!(Command::decode(READ_PIXEL, &[]), Ok(Command::ReadPixel(None)));
        assert_eq!(
            Command::decode(READ_PIXEL, &[7, 0, 9, 0]),
            Ok(Command::ReadPixel(Some(Position::new(7, 9))))
        );
        assert_eq!(
            Command::decode(WRITE_PIXEL, &[0, 0, 0, 0]),
            Err(CommandError::InvalidArgument)
        );
    }

    #[test]
    fn test_decode_bitmap_offset() {
        let payload = [0x10, 0x01, 0, 0, 0xaa, 0xbb];
        assert_eq!(
            Command::decode(DRAW_BITMAP, &payload),
            Ok(Command::DrawBitmap {
                offset: 0x110,
                data: &[0xaa, 0xbb],
            })
        );
    }

    #[test]
    fn test_unknown_opcode_is_unsupported() {
        for opcode in [14, 0x7f, u8::MAX] {
            assert_eq!(
                Command::decode(opcode, &[]),
                Err(CommandError::Unsupported { opcode })
            );
        }
    }

    #[test]
    fn test_opcode_matches_decode() {
        for opcode in 0..=DRAW_BITMAP {
            let payload: &[u8] = match opcode {
                WRITE_CMD | WRITE_DATA => &[0x29],
                RESET | GET_WINDOW => &[],
                BACKLIGHT_CTRL | DISPLAY_CTRL => &[1],
                SET_CURSOR | READ_PIXEL => &[0; 4],
                WRITE_PIXEL => &[0; 6],
                DRAW_RECTANGLE => &[0; 10],
                _ => &[0; 8],
            };
            assert_eq!(Command::decode(opcode, payload).unwrap().opcode(), opcode);
        }
    }

    #[test]
    fn test_window_is_anchored_bottom_left() {
        let window = window(10, 50, 20, 5).to_address_window(dims()).unwrap();
        assert_eq!(window, AddressWindow::new(10, 46, 29, 50));
        assert_eq!((window.width(), window.height()), (20, 5));
    }

    #[test]
    fn test_window_bounds() {
        assert!(window(0, 319, 240, 320).to_address_window(dims()).is_ok());
        assert!(window(0, 318, 240, 320).to_address_window(dims()).is_err());
        assert!(window(1, 319, 240, 1).to_address_window(dims()).is_err());
        assert!(window(240, 0, 1, 1).to_address_window(dims()).is_err());
        assert!(window(0, 0, 0, 1).to_address_window(dims()).is_err());
        assert!(window(0, 0, 1, 0).to_address_window(dims()).is_err());
    }

    #[test]
    fn test_line_bounds() {
        let line = |x, y, length| Line {
            start: Position::new(x, y),
            length,
            color: Color::BLACK,
        };
        assert_eq!(
            line(0, 5, 240).window(dims(), false),
            Ok(AddressWindow::new(0, 5, 239, 5))
        );
        assert_eq!(
            line(3, 0, 320).window(dims(), true),
            Ok(AddressWindow::new(3, 0, 3, 319))
        );
        assert!(line(1, 5, 240).window(dims(), false).is_err());
        assert!(line(0, 1, 320).window(dims(), true).is_err());
        assert!(line(0, 0, 0).window(dims(), false).is_err());
        assert!(line(0, 0, u16::MAX).window(dims(), true).is_err());
    }
}
