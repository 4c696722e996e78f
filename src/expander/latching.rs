//! Latching output adapter.

use crate::expander::pin::OutputSwitch;
use crate::expander::Mcp23017;
use crate::interface::ExpanderInterface;
use crate::registers::valid_pin;

/// A dual-coil latching relay (or similar bistable switch) driven by two output pins on the
/// MCP23017: one pulsed to switch off, the other pulsed to switch on.
///
/// A state change is a two step pulse. [`drive`](OutputSwitch::drive) asserts exactly one of the
/// pins, and [`release`](OutputSwitch::release) deasserts both once the latch has moved, so the
/// coil is not left energized. Timing the pulse is up to the caller.
///
/// Both steps go through the driver's output cache, so other output pins on the same expander
/// keep their cached states, and each step is a single write of the port register.
pub struct LatchingOutput<'e, EI: ExpanderInterface> {
    expander: &'e Mcp23017<EI>,
    off_pin: u8,
    on_pin: u8,
}

impl<'e, EI: ExpanderInterface> LatchingOutput<'e, EI> {
    pub(crate) fn new(expander: &'e Mcp23017<EI>, off_pin: u8, on_pin: u8) -> Self {
        assert_ne!(off_pin, on_pin, "latching output needs two distinct pins");
        Self {
            expander,
            off_pin: valid_pin(off_pin),
            on_pin: valid_pin(on_pin),
        }
    }

    /// The pin pulsed to switch off.
    pub fn off_pin(&self) -> u8 {
        self.off_pin
    }

    /// The pin pulsed to switch on.
    pub fn on_pin(&self) -> u8 {
        self.on_pin
    }

    fn set_pins(&self, off: bool, on: bool) -> Result<(), EI::Error> {
        self.expander.set_output_bit_for_pin(self.off_pin, off);
        self.expander.set_output_bit_for_pin(self.on_pin, on);
        self.expander.flush_output()
    }
}

impl<'e, EI: ExpanderInterface> OutputSwitch for LatchingOutput<'e, EI> {
    type Error = EI::Error;

    fn drive(&self, desired_state: bool) -> Result<(), EI::Error> {
        self.set_pins(!desired_state, desired_state)
    }

    fn release(&self) -> Result<(), EI::Error> {
        self.set_pins(false, false)
    }
}
