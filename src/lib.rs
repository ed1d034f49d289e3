#![no_std]
#![feature(abi_avr_interrupt)]

pub mod clock;
pub mod delay;
pub mod fixed;
pub mod led;
pub mod tc5;
pub mod usart;

pub use atmega_hal as hal;
