//! This module provides shims for the `embedded-hal` hardware corresponding to the MCP23017's
//! supported bus interface. It is a shim between `embedded-hal` implementations and the
//! expander's registers.

use crate::registers::RegisterAddress;

/// The address of an MCP23017 with all three hardware address pins tied low.
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Compute the 7-bit bus address of an MCP23017 from the levels of its `A0`, `A1` and `A2`
/// hardware address pins.
pub const fn address_from_pins(a0: bool, a1: bool, a2: bool) -> u8 {
    DEFAULT_ADDRESS | (a2 as u8) << 2 | (a1 as u8) << 1 | a0 as u8
}

/// An interface for the MCP23017 implements this trait, which provides the basic operations for
/// sending pre-encoded register accesses to the chip via the bus.
///
/// Multi-byte transfers start at `addr` and rely on the chip's address pointer auto-increment,
/// so `values[k]` / `buffer[k]` correspond to the register at `addr + k`. Each call is one bus
/// transaction which either completes fully or fails.
pub trait ExpanderInterface {
    /// The type of error that register reads and writes may return.
    type Error;
    /// The 7-bit bus address of the expander this interface talks to.
    fn address(&self) -> u8;
    /// Issue a write of `values` into consecutive registers starting at `addr`.
    fn write_registers(&self, addr: RegisterAddress, values: &[u8]) -> Result<(), Self::Error>;
    /// Issue a read filling `buffer` from consecutive registers starting at `addr`.
    fn read_registers(&self, addr: RegisterAddress, buffer: &mut [u8])
        -> Result<(), Self::Error>;
}

// This is here (and has to be pub) for doctests only. It's useless otherwise.
#[doc(hidden)]
pub mod noop {
    use super::{ExpanderInterface, DEFAULT_ADDRESS};
    use crate::registers::RegisterAddress;
    pub struct NoopInterface;
    impl ExpanderInterface for NoopInterface {
        type Error = core::convert::Infallible;
        fn address(&self) -> u8 {
            DEFAULT_ADDRESS
        }
        fn write_registers(
            &self,
            _addr: RegisterAddress,
            _values: &[u8],
        ) -> Result<(), Self::Error> {
            Ok(())
        }
        fn read_registers(
            &self,
            _addr: RegisterAddress,
            buffer: &mut [u8],
        ) -> Result<(), Self::Error> {
            buffer.iter_mut().for_each(|b| *b = 0);
            Ok(())
        }
    }
}

pub mod i2c {
    //! The I2C interface controls an MCP23017 via a 2-wire bus (SCL, SDA) shared with other
    //! devices.

    use core::marker::PhantomData;

    use hal::blocking::i2c::{Write, WriteRead};

    use super::{ExpanderInterface, RegisterAddress};
    use crate::mutex::IOMutex;

    /// The longest register burst the driver issues in one transaction.
    const MAX_BURST: usize = 2;

    /// The union of all errors that may occur on the I2C interface, one variant for each of the
    /// bus operations used.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum I2cInterfaceError<WE, RE> {
        /// An error occurred during an I2C write.
        WriteError(WE),
        /// An error occurred during an I2C write-read.
        ReadError(RE),
    }

    impl<WE, RE> I2cInterfaceError<WE, RE> {
        fn from_write(e: WE) -> Self {
            Self::WriteError(e)
        }
        fn from_read(e: RE) -> Self {
            Self::ReadError(e)
        }
    }

    /// A configured `ExpanderInterface` for controlling an MCP23017 via I2C.
    ///
    /// The bus itself is owned by the caller inside an [`IOMutex`] and only borrowed here, so
    /// any number of interfaces may share one bus. Every register access locks the bus for the
    /// duration of a single transaction.
    pub struct I2cInterface<'b, M, I2C> {
        /// The shared I2C master device the MCP23017 is attached to.
        bus: &'b M,
        /// The 7-bit address of the MCP23017 on the bus.
        address: u8,
        _i2c: PhantomData<I2C>,
    }

    impl<'b, M, I2C> I2cInterface<'b, M, I2C>
    where
        M: IOMutex<I2C>,
        I2C: Write + WriteRead,
    {
        /// Create a new I2C interface to communicate with the port expander. `bus` is the shared
        /// I2C master device, and `address` is the 7-bit bus address of the MCP23017 (see
        /// [`address_from_pins`](super::address_from_pins)).
        pub fn new(bus: &'b M, address: u8) -> Self {
            Self {
                bus,
                address: valid_address(address),
                _i2c: PhantomData,
            }
        }
    }

    fn valid_address(address: u8) -> u8 {
        match address {
            0x00..=0x7F => address,
            _ => panic!("{:#x} is not a 7-bit I2C address", address),
        }
    }

    impl<'b, M, I2C> ExpanderInterface for I2cInterface<'b, M, I2C>
    where
        M: IOMutex<I2C>,
        I2C: Write + WriteRead,
    {
        type Error = I2cInterfaceError<<I2C as Write>::Error, <I2C as WriteRead>::Error>;

        fn address(&self) -> u8 {
            self.address
        }

        fn write_registers(&self, addr: RegisterAddress, values: &[u8]) -> Result<(), Self::Error> {
            assert!(values.len() <= MAX_BURST, "register burst too long");

            // Register address byte first, then the data for each consecutive register.
            let mut buf = [0u8; 1 + MAX_BURST];
            buf[0] = u8::from(addr);
            buf[1..=values.len()].copy_from_slice(values);
            let command = &buf[..=values.len()];

            let address = self.address;
            self.bus
                .lock(|i2c| i2c.write(address, command))
                .map_err(Self::Error::from_write)
        }

        fn read_registers(
            &self,
            addr: RegisterAddress,
            buffer: &mut [u8],
        ) -> Result<(), Self::Error> {
            // Point the expander at the register, then repeated-start into the read so no other
            // master can move the address pointer in between.
            let address = self.address;
            self.bus
                .lock(|i2c| i2c.write_read(address, &[u8::from(addr)], buffer))
                .map_err(Self::Error::from_read)
        }
    }

}
