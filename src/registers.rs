//! The register map of the MCP23017, and bit manipulation helpers for 16-bit pin masks.
//!
//! The driver always operates the chip with `IOCON.BANK = 0`, in which each logical register is
//! a pair of 8-bit registers at consecutive addresses: bank A (pins 0-7) at the even address and
//! bank B (pins 8-15) at the following odd address. With sequential operation enabled the
//! address pointer auto-increments, so both halves are accessed in a single bus transaction.

/// A register address within the MCP23017. These are created by conversion from `Register`. It
/// is a newtype around `u8` that prevents arbitrary addresses from being forged and passed to
/// `ExpanderInterface` methods.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RegisterAddress(pub(crate) u8);

impl From<RegisterAddress> for u8 {
    /// Convert a `RegisterAddress` into a `u8` corresponding to the hardware address.
    fn from(addr: RegisterAddress) -> u8 {
        addr.0
    }
}

/// One of the two 8-bit halves of a logical register.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Bank {
    /// Pins 0-7 (GPA0-GPA7).
    A,
    /// Pins 8-15 (GPB0-GPB7).
    B,
}

/// The logical 16-bit registers used by the driver.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Register {
    /// I/O direction (IODIR). A set bit makes the pin an input, a clear bit an output.
    Direction,

    /// Interrupt-on-change enable (GPINTEN).
    InterruptEnable,

    /// Default compare values for interrupt-on-change (DEFVAL). Only consulted for pins whose
    /// `InterruptControl` bit is set.
    DefaultValue,

    /// Interrupt-on-change control (INTCON). A set bit compares the pin against `DefaultValue`,
    /// a clear bit against the previously sampled pin value.
    InterruptControl,

    /// Device configuration (IOCON). Both halves address the same physical register, so the
    /// driver writes them individually.
    Configuration,

    /// Weak 100k pull-up enable (GPPU).
    Pullup,

    /// Interrupt flags (INTF). A set bit marks a pin that caused the pending interrupt.
    InterruptFlag,

    /// Interrupt capture (INTCAP). Port levels latched at the time the interrupt occurred.
    InterruptCapture,

    /// Port value (GPIO). Reading returns the pin levels; writing modifies the output latch.
    Port,
}

impl Register {
    fn bank_a(self) -> u8 {
        use self::Register::*;
        match self {
            Direction => 0x00,
            InterruptEnable => 0x04,
            DefaultValue => 0x06,
            InterruptControl => 0x08,
            Configuration => 0x0A,
            Pullup => 0x0C,
            InterruptFlag => 0x0E,
            InterruptCapture => 0x10,
            Port => 0x12,
        }
    }

    /// The address of one half of this register.
    pub fn address(self, bank: Bank) -> RegisterAddress {
        match bank {
            Bank::A => RegisterAddress(self.bank_a()),
            Bank::B => RegisterAddress(self.bank_a() + 1),
        }
    }
}

impl From<Register> for RegisterAddress {
    /// Convert a `Register` into the address of its bank A half, where paired transfers start.
    fn from(reg: Register) -> RegisterAddress {
        reg.address(Bank::A)
    }
}

/// Bit positions within the IOCON register.
pub mod iocon {
    /// Register address layout. Clear selects paired (A/B interleaved) addressing.
    pub const BANK: u8 = 7;
    /// Internally connect the INTA and INTB pins.
    pub const MIRROR: u8 = 6;
    /// Sequential operation. Clear enables address pointer auto-increment.
    pub const SEQOP: u8 = 5;
    /// Slew rate control on SDA. Clear keeps slew rate control enabled.
    pub const DISSLW: u8 = 4;
    /// Hardware address enable (MCP23S17 only).
    pub const HAEN: u8 = 3;
    /// Open-drain interrupt output, overriding `INTPOL`.
    pub const ODR: u8 = 2;
    /// Interrupt output polarity. Set is active-high.
    pub const INTPOL: u8 = 1;
}

/// The highest pin index on the MCP23017.
pub const MAX_PIN: u8 = 15;

pub(crate) fn valid_pin(pin: u8) -> u8 {
    match pin {
        0..=MAX_PIN => pin,
        _ => panic!("MCP23017 does not have pin {}", pin),
    }
}

/// Return `value` with bit `bit` set to `set`. Bits outside `0..=15` leave `value` unchanged.
pub fn set_bit(value: u16, bit: u8, set: bool) -> u16 {
    match bit {
        0..=MAX_PIN if set => value | 1 << bit,
        0..=MAX_PIN => value & !(1 << bit),
        _ => value,
    }
}

/// Test bit `bit` of `value`. Bits outside `0..=15` always read as unset.
pub fn is_bit_set(value: u16, bit: u8) -> bool {
    match bit {
        0..=MAX_PIN => value >> bit & 0x1 == 1,
        _ => false,
    }
}
