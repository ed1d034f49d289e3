use core::cell::Cell;

use critical_section::Mutex;

/// Slot holding the procedure called on every counter overflow.
///
/// Meant to live in a `static` shared by the code that configures the timer
/// and the interrupt vector.
pub struct Handler {
    callback: Mutex<Cell<fn()>>,
}

fn unused() {}

impl Handler {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            callback: Mutex::new(Cell::new(unused as fn())),
        }
    }

    /// Replace the stored procedure, returning the previous one.
    pub fn set(&self, callback: fn()) -> fn() {
        critical_section::with(|cs| self.callback.borrow(cs).replace(callback))
    }

    /// Run the stored procedure. Called from the interrupt vector.
    ///
    /// The slot is only locked while the pointer is fetched, so the callback
    /// itself runs with interrupts in whatever state the vector left them.
    pub fn call(&self) {
        let callback = critical_section::with(|cs| self.callback.borrow(cs).get());
        callback();
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}
