//! Input adapter.

#[cfg(feature = "unproven")]
use core::convert::Infallible;

#[cfg(feature = "unproven")]
use hal::digital::v2::InputPin;

use crate::expander::pin::InputDetect;
use crate::expander::Mcp23017;
use crate::interface::ExpanderInterface;
use crate::registers::valid_pin;

/// A single input pin on the MCP23017, reporting the level held in the driver's input cache.
///
/// Reading an `Input` never generates bus traffic. Call
/// [`Mcp23017::update_input_values`] to refresh the cache, typically once per polling cycle or
/// from an interrupt handler, before reading any inputs.
pub struct Input<'e, EI: ExpanderInterface> {
    expander: &'e Mcp23017<EI>,
    pin: u8,
}

impl<'e, EI: ExpanderInterface> Input<'e, EI> {
    pub(crate) fn new(expander: &'e Mcp23017<EI>, pin: u8) -> Self {
        Self {
            expander,
            pin: valid_pin(pin),
        }
    }

    /// The pin index this adapter reads.
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl<'e, EI: ExpanderInterface> InputDetect for Input<'e, EI> {
    fn read_state(&self) -> bool {
        self.expander.get_input_pin_value(self.pin)
    }
}

#[cfg(feature = "unproven")]
impl<'e, EI: ExpanderInterface> InputPin for Input<'e, EI> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.read_state())
    }
    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.read_state())
    }
}
