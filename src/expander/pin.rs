//! Capability traits through which the adapters expose individual expander pins to the rest of
//! an application.

/// Something that reports a digital input state, such as a limit switch or a door contact.
pub trait InputDetect {
    /// The current state of the input. This must not block; implementations backed by a cache
    /// report whatever was last loaded into it.
    fn read_state(&self) -> bool;
}

/// An output switch that is pulsed into a new state and then released once the state has been
/// reached, such as a latching relay.
pub trait OutputSwitch {
    /// The type of error that driving the switch may return.
    type Error;

    /// Start moving the switch towards `desired_state`.
    fn drive(&self, desired_state: bool) -> Result<(), Self::Error>;

    /// Stop driving the switch, after it has had enough time to reach the desired state.
    fn release(&self) -> Result<(), Self::Error>;
}
