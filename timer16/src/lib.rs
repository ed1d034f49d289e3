#![cfg_attr(not(test), no_std)]

//! Interrupt and PWM control for a 16-bit timer/counter running in
//! phase and frequency correct PWM mode.
//!
//! The hardware is reached through the [`Registers`] and [`PwmPins`] traits,
//! so the same logic drives the real peripheral and an in-memory fake.

mod channel;
mod divider;
mod interrupt;
mod registers;
mod timer;

#[cfg(test)]
mod fake;

pub use channel::{Channel, Outputs};
pub use divider::{ClockDivider, Period, cycles_for, select_period};
pub use interrupt::Handler;
pub use registers::{PwmPins, Registers};
pub use timer::{DEFAULT_PERIOD_MICROS, DUTY_SHIFT, Timer};

/// Number of distinct counter values.
pub const RESOLUTION: u32 = 1 << 16;
