//! Register programming sequences
//!
//! A bring-up sequence is an ordered list of [`InitStep`]s. Each step is sent
//! as one command byte followed by its (possibly empty) parameter bytes. The
//! sequence is replayed as a whole after the controller leaves sleep mode.
//!
//! ## Example
//!
//! ```
//! use st7789fb::command;
//! use st7789fb::sequence::{InitStep, ST7789V_INIT};
//!
//! // The default sequence selects 16 bits per pixel
//! let step = InitStep::new(command::SET_PIXEL_FORMAT, &[command::PIXEL_FORMAT_16BIT]);
//! assert!(ST7789V_INIT.contains(&step));
//! ```

use crate::command::{
    FRCTRL, GCTRL, LCM, NVGAMCTRL, PIXEL_FORMAT_16BIT, PORCTRL, PVGAMCTRL, PWCTRL1,
    SET_ADDRESS_MODE, SET_PIXEL_FORMAT, VDVS, VDVVRHEN, VRHS,
};

/// One register write of a bring-up sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitStep {
    /// Command (register) byte
    pub register: u8,
    /// Parameter bytes sent after the command
    pub payload: &'static [u8],
}

impl InitStep {
    /// Create a new step
    pub const fn new(register: u8, payload: &'static [u8]) -> Self {
        Self { register, payload }
    }
}

/// Positive gamma curve for the 240x320 ST7789V panel
pub const ST7789V_PVGAMCTRL: [u8; 14] = [
    0xf0, 0x0c, 0x15, 0x0d, 0x0d, 0x2a, 0x3b, 0x5c, 0x4b, 0x3b, 0x17, 0x15, 0x1c, 0x1f,
];

/// Negative gamma curve for the 240x320 ST7789V panel
pub const ST7789V_NVGAMCTRL: [u8; 14] = [
    0xf0, 0x0c, 0x15, 0x0d, 0x0d, 0x2a, 0x3b, 0x3c, 0x4b, 0x3b, 0x17, 0x15, 0x1c, 0x1f,
];

/// Register programming for the 240x320 ST7789V panel
///
/// Sent after EXIT_SLEEP_MODE and before SET_DISPLAY_ON.
pub const ST7789V_INIT: &[InitStep] = &[
    InitStep::new(SET_ADDRESS_MODE, &[0x00]),
    InitStep::new(SET_PIXEL_FORMAT, &[PIXEL_FORMAT_16BIT]),
    InitStep::new(PORCTRL, &[0x0c, 0x0c, 0x00, 0x33, 0x33]),
    InitStep::new(GCTRL, &[0x35]),
    InitStep::new(LCM, &[0x2c]),
    InitStep::new(VDVVRHEN, &[0x01]),
    InitStep::new(VRHS, &[0x1b]),
    InitStep::new(VDVS, &[0x20]),
    InitStep::new(FRCTRL, &[0x0f]),
    InitStep::new(PWCTRL1, &[0xa4, 0x71]),
    InitStep::new(PVGAMCTRL, &ST7789V_PVGAMCTRL),
    InitStep::new(NVGAMCTRL, &ST7789V_NVGAMCTRL),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn position(register: u8) -> Option<usize> {
        ST7789V_INIT.iter().position(|step| step.register == register)
    }

    #[test]
    fn test_gamma_follows_pixel_format() {
        let format = position(SET_PIXEL_FORMAT).unwrap();
        let gamma = position(PVGAMCTRL).unwrap();
        assert!(format < gamma);
        assert_eq!(ST7789V_INIT[gamma].payload, &ST7789V_PVGAMCTRL);
    }

    #[test]
    fn test_gamma_payloads_are_fourteen_bytes() {
        for step in ST7789V_INIT {
            if step.register == PVGAMCTRL || step.register == NVGAMCTRL {
                assert_eq!(step.payload.len(), 14);
            }
        }
    }
}
