//! Driver library for the Microchip MCP23017 I2C I/O expander.
//!
//! The MCP23017 provides 16 GPIO pins in two 8-bit banks (GPA0-GPA7 and GPB0-GPB7), each
//! software-configurable as an output or as an input with optional weak pull-up, and each able to
//! raise an interrupt on change. The state of the pins is read and written through a two-wire
//! I2C bus.
//!
//! This driver is intended to work on embedded platforms using any implementation of the
//! `embedded-hal` trait library. Throughout the API the 16 pins are numbered 0-15, with bank A in
//! the low byte of every 16-bit value and bank B in the high byte.
//!
//! # Construction
//!
//! To set up the driver:
//!
//! - Use your platform's `embedded-hal` implementation to obtain an I2C master device for the bus
//!   your MCP23017 is attached to, and initialize the bus.
//! - Put the bus in an [`IOMutex`] that you keep ownership of. A `core::cell::RefCell` is enough
//!   in a single-threaded program; [`DefaultMutex`] picks a real mutex for `std` and Cortex-M
//!   targets. Other devices on the same bus can share it.
//! - Construct an [`I2cInterface`], borrowing the bus and naming the expander's bus address.
//! - Construct an [`Mcp23017`], which will take ownership of the interface.
//!
//! ```ignore
//! let i2c = /* construct something implementing embedded_hal::blocking::i2c::{Write,WriteRead} */
//!
//! let bus = core::cell::RefCell::new(i2c);
//! let ei = mcp23017::I2cInterface::new(&bus, mcp23017::address_from_pins(false, false, false));
//! let expander = mcp23017::Mcp23017::new(ei);
//! ```
//!
//! # Device configuration
//!
//! Pin configuration is written as whole 16-bit masks, one bus transaction per register:
//!
//! ```
//! # fn main() -> Result<(), core::convert::Infallible> {
//! # let ei = mcp23017::interface::noop::NoopInterface;
//! # let expander = mcp23017::Mcp23017::new(ei);
//! // Mirrored, active-low interrupt outputs.
//! expander.configure(true, false)?;
//! // Bank A inputs with pull-ups and interrupt-on-change, bank B outputs.
//! expander.set_io_direction(0x00FF)?;
//! expander.set_pullup(0x00FF)?;
//! expander.set_interrupt_compare_mode(0x0000)?;
//! expander.set_interrupt_enable(0x00FF)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Inputs and outputs
//!
//! The driver keeps two caches. Inputs are read into the input cache in one transaction by
//! [`Mcp23017::update_input_values`], after which individual pins are queried without bus
//! traffic. Outputs are staged in the output cache with [`Mcp23017::set_output_bit_for_pin`]
//! and written in one transaction by [`Mcp23017::flush_output`].
//!
//! ```
//! # fn main() -> Result<(), core::convert::Infallible> {
//! # let ei = mcp23017::interface::noop::NoopInterface;
//! # let expander = mcp23017::Mcp23017::new(ei);
//! expander.update_input_values()?;
//! let lid_closed = expander.get_input_pin_value(3);
//!
//! expander.set_output_bit_for_pin(8, lid_closed);
//! expander.set_output_bit_for_pin(9, !lid_closed);
//! expander.flush_output()?;
//!
//! if let Some(pin) = expander.get_last_interrupt_pin()? {
//!     let captured = expander.get_interrupt_values()?;
//! #   let _ = (pin, captured);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Adapters
//!
//! *See [`Input`] and [`LatchingOutput`].*
//!
//! To hand single pins to other parts of an application, the driver produces adapters that
//! borrow it and implement the [`InputDetect`] and [`OutputSwitch`] capability traits.
//!
//! ```
//! # fn main() -> Result<(), core::convert::Infallible> {
//! # let ei = mcp23017::interface::noop::NoopInterface;
//! # let expander = mcp23017::Mcp23017::new(ei);
//! use mcp23017::{InputDetect, OutputSwitch};
//!
//! let float_switch = expander.input(0);
//! let relay = expander.latching_output(8, 9);
//!
//! expander.update_input_values()?;
//! relay.drive(float_switch.read_state())?;
//! // ... wait for the relay to latch ...
//! relay.release()?;
//! # Ok(())
//! # }
//! ```
//!
//! A `LatchingOutput` pulses one of two coils of a bistable relay: `drive` asserts the "on" or
//! "off" pin according to the desired state, and `release` deasserts both once the relay has
//! moved. The pulse length is left to the caller, for example a timer calling `release`.
//!
//! # Concurrency
//!
//! Every operation blocks until its bus transaction completes. The driver does no locking of its
//! own beyond locking the shared bus for the span of each transaction, and is `!Sync`: a driver
//! and its adapters belong to one thread.
//!
//! # Logging
//!
//! With the `defmt` Cargo feature enabled, register transfers are logged at trace level and
//! interrupt flag lookups at debug level.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(test)]
extern crate proptest;

extern crate embedded_hal as hal;

#[macro_use]
mod macros;

pub mod config;
pub mod expander;
pub mod interface;
pub mod mutex;
pub mod registers;

pub use config::IoConfig;
pub use expander::input::Input;
pub use expander::latching::LatchingOutput;
pub use expander::pin::{InputDetect, OutputSwitch};
pub use expander::Mcp23017;
pub use interface::i2c::{I2cInterface, I2cInterfaceError};
pub use interface::{address_from_pins, ExpanderInterface, DEFAULT_ADDRESS};
#[cfg(any(feature = "std", feature = "cortexm"))]
pub use mutex::DefaultMutex;
pub use mutex::IOMutex;
