//! The port expander device API. This provides the `Mcp23017` type which is a direct abstraction
//! of the MCP23017. It allows direct use of all register operations the driver supports, and
//! keeps a local cache of the output latch and of the most recently read input levels.

use core::cell::Cell;

use crate::config::IoConfig;
use crate::expander::input::Input;
use crate::expander::latching::LatchingOutput;
use crate::interface::ExpanderInterface;
use crate::registers::{is_bit_set, set_bit, valid_pin, Bank, Register};

pub mod input;
pub mod latching;
pub mod pin;

/// The port expander device itself.
///
/// All 16-bit values map pin `n` to bit `n`: bank A (GPA0-GPA7) in the low byte and bank B
/// (GPB0-GPB7) in the high byte.
///
/// Methods take `&self` so that adapters can borrow the driver side by side. The caches are
/// plain `Cell`s, which makes `Mcp23017` `!Sync`; it is meant to be driven from a single thread.
pub struct Mcp23017<EI: ExpanderInterface> {
    iface: EI,
    output: Cell<u16>,
    last_input: Cell<u16>,
}

impl<EI: ExpanderInterface> Mcp23017<EI> {
    /// Create a new `Mcp23017`.
    ///
    /// Takes ownership of the `ExpanderInterface` which it should use to communicate with the
    /// MCP23017. No bus traffic is generated until a method is called.
    pub fn new(iface: EI) -> Self {
        Self {
            iface,
            output: Cell::new(0),
            last_input: Cell::new(0),
        }
    }

    /// Release the `ExpanderInterface`, consuming the driver.
    pub fn free(self) -> EI {
        self.iface
    }

    /// The bus address of the expander.
    pub fn address(&self) -> u8 {
        self.iface.address()
    }

    /// Configure interrupt output behavior through the IOCON register.
    ///
    /// `mirror_interrupts` internally connects INTA and INTB; `active_high_polarity` selects the
    /// polarity of the interrupt pins. All other IOCON bits are written as zero (see
    /// [`IoConfig`]).
    pub fn configure(
        &self,
        mirror_interrupts: bool,
        active_high_polarity: bool,
    ) -> Result<(), EI::Error> {
        self.write_config(IoConfig::new(mirror_interrupts, active_high_polarity))
    }

    /// Write `cfg` to IOCONA, then to IOCONB. IOCONB is skipped if the first write fails.
    pub fn write_config(&self, cfg: IoConfig) -> Result<(), EI::Error> {
        let value = u8::from(cfg);
        for &bank in [Bank::A, Bank::B].iter() {
            trace!("write IOCON {=u8:#x}", value);
            self.iface
                .write_registers(Register::Configuration.address(bank), &[value])?;
        }
        Ok(())
    }

    /// Set the direction of every pin. Set bits are inputs, clear bits outputs.
    pub fn set_io_direction(&self, mask: u16) -> Result<(), EI::Error> {
        self.write_pair(Register::Direction, mask)
    }

    /// Enable the weak 100k pull-up on every pin whose bit is set.
    pub fn set_pullup(&self, mask: u16) -> Result<(), EI::Error> {
        self.write_pair(Register::Pullup, mask)
    }

    /// Select what interrupt-on-change compares against. Set bits compare the pin with its
    /// default value (see [`set_interrupt_default_values`](Self::set_interrupt_default_values)),
    /// clear bits with the previously sampled value.
    pub fn set_interrupt_compare_mode(&self, mask: u16) -> Result<(), EI::Error> {
        self.write_pair(Register::InterruptControl, mask)
    }

    /// Set the reference levels for pins in compare-to-default interrupt mode. An interrupt
    /// fires when such a pin differs from its bit here.
    pub fn set_interrupt_default_values(&self, values: u16) -> Result<(), EI::Error> {
        self.write_pair(Register::DefaultValue, values)
    }

    /// Arm interrupt-on-change for every pin whose bit is set.
    pub fn set_interrupt_enable(&self, mask: u16) -> Result<(), EI::Error> {
        self.write_pair(Register::InterruptEnable, mask)
    }

    /// Read the live port levels into the input cache. On failure the cache keeps its previous
    /// contents.
    pub fn update_input_values(&self) -> Result<(), EI::Error> {
        let values = self.read_pair(Register::Port)?;
        self.last_input.set(values);
        Ok(())
    }

    /// The level of `pin` as of the last successful
    /// [`update_input_values`](Self::update_input_values). Does not touch the bus. Pins above 15
    /// read as low.
    pub fn get_input_pin_value(&self, pin: u8) -> bool {
        is_bit_set(self.last_input.get(), pin)
    }

    /// All pin levels as of the last successful
    /// [`update_input_values`](Self::update_input_values).
    pub fn get_input_pin_values(&self) -> u16 {
        self.last_input.get()
    }

    /// Find a pin that caused the pending interrupt, by reading the interrupt flags and
    /// returning the lowest flagged pin, or `None` if no flag is set.
    ///
    /// This is not fully reliable: when several pins change close together only one of them is
    /// reported, and the result says nothing about the order in which they changed.
    pub fn get_last_interrupt_pin(&self) -> Result<Option<u8>, EI::Error> {
        let flags = self.read_pair(Register::InterruptFlag)?;
        debug!("INTF {=u16:#x}", flags);
        Ok((0..=15).find(|&pin| is_bit_set(flags, pin)))
    }

    /// Read the port levels captured when the last interrupt occurred.
    pub fn get_interrupt_values(&self) -> Result<u16, EI::Error> {
        self.read_pair(Register::InterruptCapture)
    }

    /// Replace the output cache with `bits` and write it to the port register.
    ///
    /// The cache is updated even if the write fails, so a later
    /// [`flush_output`](Self::flush_output) retries with the same value.
    pub fn set_all_output_bits(&self, bits: u16) -> Result<(), EI::Error> {
        self.output.set(bits);
        self.flush_output()
    }

    /// Set or clear `pin` in the output cache. Does not touch the bus; call
    /// [`flush_output`](Self::flush_output) to apply.
    pub fn set_output_bit_for_pin(&self, pin: u8, on: bool) {
        self.output
            .set(set_bit(self.output.get(), valid_pin(pin), on));
    }

    /// The state of `pin` in the output cache. Pins above 15 read as off.
    pub fn get_output_bit_for_pin(&self, pin: u8) -> bool {
        is_bit_set(self.output.get(), pin)
    }

    /// Write the output cache to the port register.
    pub fn flush_output(&self) -> Result<(), EI::Error> {
        self.write_pair(Register::Port, self.output.get())
    }

    /// Create an [`Input`] adapter reporting the cached level of `pin`.
    pub fn input(&self, pin: u8) -> Input<'_, EI> {
        Input::new(self, pin)
    }

    /// Create a [`LatchingOutput`] adapter pulsing `off_pin` or `on_pin` of a dual-coil latching
    /// relay.
    pub fn latching_output(&self, off_pin: u8, on_pin: u8) -> LatchingOutput<'_, EI> {
        LatchingOutput::new(self, off_pin, on_pin)
    }

    fn write_pair(&self, reg: Register, value: u16) -> Result<(), EI::Error> {
        trace!("write {} {=u16:#x}", u8::from(reg.address(Bank::A)), value);
        self.iface.write_registers(reg.into(), &value.to_le_bytes())
    }

    fn read_pair(&self, reg: Register) -> Result<u16, EI::Error> {
        let mut buf = [0u8; 2];
        self.iface.read_registers(reg.into(), &mut buf)?;
        let value = u16::from_le_bytes(buf);
        trace!("read {} {=u16:#x}", u8::from(reg.address(Bank::A)), value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_mock::{self, MockBus, MockInterface};
    use embedded_hal_mock::i2c::Transaction;
    use embedded_hal_mock::MockError;
    use std::io::ErrorKind;

    fn expander(bus: &MockBus) -> Mcp23017<MockInterface<'_>> {
        Mcp23017::new(test_mock::interface(bus))
    }

    fn io_error() -> MockError {
        MockError::Io(ErrorKind::Other)
    }

    #[test]
    fn new_is_silent() {
        let bus = test_mock::bus(&[]);
        let ex = expander(&bus);
        assert_eq!(ex.address(), 0x20);
        assert_eq!(ex.get_input_pin_values(), 0);
        assert!(!ex.get_output_bit_for_pin(0));
        test_mock::done(&bus);
    }

    #[test]
    fn configure_mirror() {
        let bus = test_mock::bus(&[
            Transaction::write(0x20, vec![0x0A, 0x40]),
            Transaction::write(0x20, vec![0x0B, 0x40]),
        ]);
        assert!(expander(&bus).configure(true, false).is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn configure_polarity() {
        let bus = test_mock::bus(&[
            Transaction::write(0x20, vec![0x0A, 0x02]),
            Transaction::write(0x20, vec![0x0B, 0x02]),
        ]);
        assert!(expander(&bus).configure(false, true).is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn configure_bank_a_failure_skips_bank_b() {
        let bus = test_mock::bus(&[
            Transaction::write(0x20, vec![0x0A, 0x40]).with_error(io_error()),
        ]);
        assert!(expander(&bus).configure(true, false).is_err());
        test_mock::done(&bus);
    }

    #[test]
    fn configure_bank_b_failure() {
        let bus = test_mock::bus(&[
            Transaction::write(0x20, vec![0x0A, 0x00]),
            Transaction::write(0x20, vec![0x0B, 0x00]).with_error(io_error()),
        ]);
        assert!(expander(&bus).configure(false, false).is_err());
        test_mock::done(&bus);
    }

    #[test]
    fn set_io_direction_input() {
        let bus = test_mock::bus(&[Transaction::write(0x20, vec![0x00, 0xFF, 0xFF])]);
        assert!(expander(&bus).set_io_direction(0xFFFF).is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn set_io_direction_mixed() {
        let bus = test_mock::bus(&[Transaction::write(0x20, vec![0x00, 0x0F, 0xF0])]);
        assert!(expander(&bus).set_io_direction(0xF00F).is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn set_pullup_all() {
        let bus = test_mock::bus(&[Transaction::write(0x20, vec![0x0C, 0xFF, 0xFF])]);
        assert!(expander(&bus).set_pullup(0xFFFF).is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn set_interrupt_compare_mode_previous() {
        let bus = test_mock::bus(&[Transaction::write(0x20, vec![0x08, 0x00, 0x00])]);
        assert!(expander(&bus).set_interrupt_compare_mode(0x0000).is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn set_interrupt_default_values_writes_defval() {
        let bus = test_mock::bus(&[Transaction::write(0x20, vec![0x06, 0x01, 0x80])]);
        assert!(expander(&bus).set_interrupt_default_values(0x8001).is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn set_interrupt_enable_all() {
        let bus = test_mock::bus(&[Transaction::write(0x20, vec![0x04, 0xFF, 0xFF])]);
        assert!(expander(&bus).set_interrupt_enable(0xFFFF).is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn write_failure_propagates() {
        let bus = test_mock::bus(&[
            Transaction::write(0x20, vec![0x0C, 0x00, 0x00]).with_error(io_error()),
        ]);
        assert!(expander(&bus).set_pullup(0x0000).is_err());
        test_mock::done(&bus);
    }

    #[test]
    fn update_input_values_bank_a() {
        let bus = test_mock::bus(&[Transaction::write_read(
            0x20,
            vec![0x12],
            vec![0b00000010, 0b00000000],
        )]);
        let ex = expander(&bus);
        assert!(ex.update_input_values().is_ok());
        assert!(ex.get_input_pin_value(1));
        assert!(!ex.get_input_pin_value(0));
        assert_eq!(ex.get_input_pin_values(), 0x0002);
        test_mock::done(&bus);
    }

    #[test]
    fn update_input_values_bank_b() {
        let bus = test_mock::bus(&[Transaction::write_read(
            0x20,
            vec![0x12],
            vec![0b00000000, 0b00001000],
        )]);
        let ex = expander(&bus);
        assert!(ex.update_input_values().is_ok());
        assert!(ex.get_input_pin_value(11));
        assert!(!ex.get_input_pin_value(0));
        test_mock::done(&bus);
    }

    #[test]
    fn update_input_values_failure_keeps_cache() {
        let bus = test_mock::bus(&[
            Transaction::write_read(0x20, vec![0x12], vec![0xA5, 0x5A]),
            Transaction::write_read(0x20, vec![0x12], vec![0x00, 0x00]).with_error(io_error()),
        ]);
        let ex = expander(&bus);
        assert!(ex.update_input_values().is_ok());
        assert!(ex.update_input_values().is_err());
        assert_eq!(ex.get_input_pin_values(), 0x5AA5);
        test_mock::done(&bus);
    }

    #[test]
    fn last_interrupt_pin_none() {
        let bus = test_mock::bus(&[Transaction::write_read(0x20, vec![0x0E], vec![0, 0])]);
        assert_eq!(expander(&bus).get_last_interrupt_pin(), Ok(None));
        test_mock::done(&bus);
    }

    #[test]
    fn last_interrupt_pin_bank_a() {
        let bus = test_mock::bus(&[Transaction::write_read(
            0x20,
            vec![0x0E],
            vec![0b00010000, 0b00000000],
        )]);
        assert_eq!(expander(&bus).get_last_interrupt_pin(), Ok(Some(4)));
        test_mock::done(&bus);
    }

    #[test]
    fn last_interrupt_pin_bank_b() {
        let bus = test_mock::bus(&[Transaction::write_read(
            0x20,
            vec![0x0E],
            vec![0b00000000, 0b00000001],
        )]);
        assert_eq!(expander(&bus).get_last_interrupt_pin(), Ok(Some(8)));
        test_mock::done(&bus);
    }

    #[test]
    fn last_interrupt_pin_lowest_wins() {
        let bus = test_mock::bus(&[Transaction::write_read(
            0x20,
            vec![0x0E],
            vec![0b01000100, 0b10000000],
        )]);
        assert_eq!(expander(&bus).get_last_interrupt_pin(), Ok(Some(2)));
        test_mock::done(&bus);
    }

    #[test]
    fn last_interrupt_pin_read_failure() {
        let bus = test_mock::bus(&[
            Transaction::write_read(0x20, vec![0x0E], vec![0, 0]).with_error(io_error()),
        ]);
        assert!(expander(&bus).get_last_interrupt_pin().is_err());
        test_mock::done(&bus);
    }

    #[test]
    fn last_interrupt_pin_then_capture() {
        let bus = test_mock::bus(&[
            Transaction::write_read(0x20, vec![0x0E], vec![0b00000000, 0b00000001]),
            Transaction::write_read(0x20, vec![0x10], vec![0b00000001, 0b00000000]),
        ]);
        let ex = expander(&bus);
        assert_eq!(ex.get_last_interrupt_pin(), Ok(Some(8)));
        assert_eq!(ex.get_interrupt_values(), Ok(1));
        test_mock::done(&bus);
    }

    #[test]
    fn interrupt_values_read_failure() {
        let bus = test_mock::bus(&[
            Transaction::write_read(0x20, vec![0x10], vec![0, 0]).with_error(io_error()),
        ]);
        assert!(expander(&bus).get_interrupt_values().is_err());
        test_mock::done(&bus);
    }

    #[test]
    fn interrupt_values_zero_capture() {
        let bus = test_mock::bus(&[Transaction::write_read(0x20, vec![0x10], vec![0x00, 0x00])]);
        assert_eq!(expander(&bus).get_interrupt_values(), Ok(0));
        test_mock::done(&bus);
    }

    #[test]
    fn interrupt_values_both_banks() {
        let bus = test_mock::bus(&[Transaction::write_read(0x20, vec![0x10], vec![0x34, 0x12])]);
        assert_eq!(expander(&bus).get_interrupt_values(), Ok(0x1234));
        test_mock::done(&bus);
    }

    #[test]
    fn set_all_output_bits_alternate() {
        let bus = test_mock::bus(&[Transaction::write(0x20, vec![0x12, 0xAA, 0xAA])]);
        let ex = expander(&bus);
        assert!(ex.set_all_output_bits(0xAAAA).is_ok());
        assert!(ex.get_output_bit_for_pin(1));
        assert!(!ex.get_output_bit_for_pin(0));
        test_mock::done(&bus);
    }

    #[test]
    fn set_all_output_bits_failure_keeps_cache() {
        let bus = test_mock::bus(&[
            Transaction::write(0x20, vec![0x12, 0x00, 0x80]).with_error(io_error()),
            Transaction::write(0x20, vec![0x12, 0x00, 0x80]),
        ]);
        let ex = expander(&bus);
        assert!(ex.set_all_output_bits(0x8000).is_err());
        assert!(ex.get_output_bit_for_pin(15));
        assert!(ex.flush_output().is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn set_output_bit_then_flush() {
        let bus = test_mock::bus(&[Transaction::write(0x20, vec![0x12, 0b00100000, 0x00])]);
        let ex = expander(&bus);
        ex.set_output_bit_for_pin(5, true);
        assert!(ex.flush_output().is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn set_output_bit_is_cache_only() {
        let bus = test_mock::bus(&[]);
        let ex = expander(&bus);
        ex.set_output_bit_for_pin(9, true);
        ex.set_output_bit_for_pin(3, true);
        ex.set_output_bit_for_pin(9, false);
        assert!(ex.get_output_bit_for_pin(3));
        assert!(!ex.get_output_bit_for_pin(9));
        test_mock::done(&bus);
    }

    #[test]
    fn flush_output_repeats() {
        let bus = test_mock::bus(&[
            Transaction::write(0x20, vec![0x12, 0x00, 0x01]),
            Transaction::write(0x20, vec![0x12, 0x00, 0x01]),
        ]);
        let ex = expander(&bus);
        ex.set_output_bit_for_pin(8, true);
        assert!(ex.flush_output().is_ok());
        assert!(ex.flush_output().is_ok());
        test_mock::done(&bus);
    }

    #[test]
    fn set_output_bit_every_pin() {
        let bus = test_mock::bus(&[]);
        let ex = expander(&bus);
        for &prior in [0x0000u16, 0xFFFF, 0xA5C3].iter() {
            for pin in 0..16 {
                ex.output.set(prior);
                ex.set_output_bit_for_pin(pin, true);
                assert_eq!(ex.output.get(), prior | 1 << pin);
                ex.set_output_bit_for_pin(pin, false);
                assert_eq!(ex.output.get(), prior & !(1 << pin));
            }
        }
        test_mock::done(&bus);
    }

    #[test]
    fn out_of_range_getters_read_false() {
        let bus = test_mock::bus(&[
            Transaction::write_read(0x20, vec![0x12], vec![0xFF, 0xFF]),
            Transaction::write(0x20, vec![0x12, 0xFF, 0xFF]),
        ]);
        let ex = expander(&bus);
        assert!(ex.update_input_values().is_ok());
        assert!(ex.set_all_output_bits(0xFFFF).is_ok());
        assert!(!ex.get_input_pin_value(16));
        assert!(!ex.get_output_bit_for_pin(16));
        assert!(!ex.get_output_bit_for_pin(255));
        test_mock::done(&bus);
    }

    #[test]
    #[should_panic]
    fn invalid_pin_panics() {
        let bus = test_mock::bus(&[]);
        expander(&bus).set_output_bit_for_pin(16, true);
    }

    #[test]
    fn free_returns_interface() {
        let bus = test_mock::bus(&[]);
        let ei = expander(&bus).free();
        assert_eq!(ExpanderInterface::address(&ei), 0x20);
        test_mock::done(&bus);
    }
}
