//! Abstractions used to configure the MCP23017 hardware.

use crate::registers::{iocon, set_bit};

/// The contents of the IOCON configuration register.
///
/// Only the interrupt output behavior is configurable. The remaining bits are pinned to the
/// values the driver depends on: paired register addressing (`BANK = 0`), address pointer
/// auto-increment (`SEQOP = 0`), slew rate control enabled, hardware addressing disabled and
/// push-pull interrupt outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoConfig {
    /// Internally connect INTA and INTB, so an interrupt on either port asserts both pins.
    pub mirror_interrupts: bool,
    /// Drive the interrupt pins active-high instead of active-low.
    pub active_high_interrupts: bool,
}

impl IoConfig {
    /// Build a configuration from the two interrupt output settings.
    pub fn new(mirror_interrupts: bool, active_high_interrupts: bool) -> Self {
        Self {
            mirror_interrupts,
            active_high_interrupts,
        }
    }
}

impl From<IoConfig> for u8 {
    fn from(cfg: IoConfig) -> u8 {
        let bits = [
            (iocon::BANK, false),
            (iocon::MIRROR, cfg.mirror_interrupts),
            (iocon::SEQOP, false),
            (iocon::DISSLW, false),
            (iocon::HAEN, false),
            (iocon::ODR, false),
            (iocon::INTPOL, cfg.active_high_interrupts),
        ];
        bits.iter()
            .fold(0u16, |value, &(bit, on)| set_bit(value, bit, on)) as u8
    }
}
