use nano_fmt::NanoWrite;

use crate::clock::BoardClock;
use crate::hal::port::{self, PE0, PE1};

/// Wrapper around USART0 that can be used for output formatting.
///
/// On the Arduino Mega this port is wired to the USB serial bridge.
pub struct Usart0 {
    p: atmega_hal::pac::USART0,
}

type Baudrate = avr_hal_generic::usart::Baudrate<BoardClock>;

impl Usart0 {
    /// Create new instance from raw hardware.
    #[must_use]
    pub fn new<IMODE: port::mode::InputMode>(
        p: atmega_hal::pac::USART0,
        _rx: port::Pin<port::mode::Input<IMODE>, PE0>,
        _tx: port::Pin<port::mode::Output, PE1>,
        baudrate: u32,
    ) -> Self {
        let baudrate = Baudrate::new(baudrate);
        p.ubrr0.write(|w| w.bits(baudrate.ubrr));
        p.ucsr0a.write(|w| w.u2x0().bit(baudrate.u2x));

        // Enable transmitter only, nothing is ever received.
        p.ucsr0b.write(|w| w.txen0().set_bit());

        Self { p }
    }
}

impl NanoWrite for Usart0 {
    fn write_byte(&mut self, b: u8) {
        while self.p.ucsr0a.read().udre0().bit_is_clear() {}

        self.p.udr0.write(|w| w.bits(b));
    }
}
