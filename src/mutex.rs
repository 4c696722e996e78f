//! Bus sharing primitives for `std`, Cortex-M and single-threaded targets.

/// A lock around a caller-owned resource, used to hand one I2C bus to several `I2cInterface`s
/// (one per expander, or other drivers on the same wires). The driver only takes the lock for
/// the span of a single bus transaction; it never holds it across calls.
///
/// Implementations:
///
/// - `core::cell::RefCell<T>`, always available. No locking, for single-threaded programs.
/// - `std::sync::Mutex<T>` with the `std` feature. A poisoned lock is recovered, not propagated.
/// - `cortex_m::interrupt::Mutex<RefCell<T>>` with the `cortexm` feature. Each transaction runs
///   inside a critical section.
///
/// [`DefaultMutex<T>`] names the `std` or Cortex-M choice, whichever feature is enabled.
pub trait IOMutex<T> {
    /// Construct a new instance of this mutex containing the value `v`.
    fn new(v: T) -> Self;

    /// Lock the mutex and call the closure `f` as a critical section, passing a mutable reference
    /// to the owned value. Returns the value returned by `f`.
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
}

#[cfg(feature = "std")]
pub type DefaultMutex<T> = std::sync::Mutex<T>;

#[cfg(all(feature = "cortexm", not(feature = "std")))]
pub type DefaultMutex<T> = cortex_m::interrupt::Mutex<core::cell::RefCell<T>>;

impl<T> IOMutex<T> for core::cell::RefCell<T> {
    fn new(v: T) -> Self {
        core::cell::RefCell::new(v)
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        f(&mut self.borrow_mut())
    }
}

#[cfg(feature = "std")]
impl<T> IOMutex<T> for std::sync::Mutex<T> {
    fn new(v: T) -> Self {
        std::sync::Mutex::new(v)
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        let mut v = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut v)
    }
}

#[cfg(feature = "cortexm")]
impl<T> IOMutex<T> for cortex_m::interrupt::Mutex<core::cell::RefCell<T>> {
    fn new(v: T) -> Self {
        cortex_m::interrupt::Mutex::new(core::cell::RefCell::new(v))
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        cortex_m::interrupt::free(|cs| {
            let mut v = self.borrow(cs).borrow_mut();
            f(&mut v)
        })
    }
}
