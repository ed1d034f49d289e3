//! Timer/Counter 5 of the ATmega2560.
//!
//! The counter runs in phase and frequency correct PWM mode (mode 8) with
//! TOP in `ICR5`. Compare outputs OC5A, OC5B and OC5C are on PL3, PL4 and PL5,
//! which are pins 46, 45 and 44 of the Arduino Mega.

use avr_hal_generic::port::PinOps;
use timer16::{Channel, ClockDivider, Handler, Outputs, Registers, Timer};

use crate::clock::{BoardClock, Clock};
use crate::hal::{
    pac::TC5,
    port::{
        PL3, PL4, PL5, Pin,
        mode::{Floating, Input, Output},
    },
};

pub use timer16::DEFAULT_PERIOD_MICROS;

/// WGM53:52 in `TCCR5B`. WGM51:50 in `TCCR5A` stay zero.
const WGM_HIGH: u8 = 0b10;

/// Procedure called by `TIMER5_OVF`.
static HANDLER: Handler = Handler::new();

/// The timer as used by the application.
pub type Timer5 = Timer<Tc5, Tc5Pins, { BoardClock::FREQ }>;

/// Take over the timer and its compare output pins. The period is set up by
/// [`Timer::initialize`].
///
/// Only one `TC5` exists, so there is only ever one `Timer5`. The pins stay
/// inputs until PWM is enabled on their channel.
#[must_use]
pub fn take(
    tc5: TC5,
    pin_a: Pin<Input<Floating>, PL3>,
    pin_b: Pin<Input<Floating>, PL4>,
    pin_c: Pin<Input<Floating>, PL5>,
) -> Timer5 {
    let pins = Tc5Pins {
        a: OcPin::Input(pin_a),
        b: OcPin::Input(pin_b),
        c: OcPin::Input(pin_c),
    };
    Timer::new(Tc5(tc5), pins, &HANDLER)
}

/// Channel driving Arduino Mega pin `pin`, if any.
#[must_use]
pub const fn channel_for_pin(pin: u8) -> Option<Channel> {
    match pin {
        46 => Some(Channel::A),
        45 => Some(Channel::B),
        44 => Some(Channel::C),
        _ => None,
    }
}

/// Register block of TC5.
pub struct Tc5(TC5);

impl Registers for Tc5 {
    fn write_control(&mut self, clock: Option<ClockDivider>) {
        self.0.tccr5b.write(|w| {
            let w = w.wgm5().bits(WGM_HIGH);
            match clock {
                None => w.cs5().no_clock(),
                Some(ClockDivider::Div1) => w.cs5().direct(),
                Some(ClockDivider::Div8) => w.cs5().prescale_8(),
                Some(ClockDivider::Div64) => w.cs5().prescale_64(),
                Some(ClockDivider::Div256) => w.cs5().prescale_256(),
                Some(ClockDivider::Div1024) => w.cs5().prescale_1024(),
            }
        });
    }

    fn write_top(&mut self, top: u16) {
        self.0.icr5.write(|w| w.bits(top));
    }

    fn write_counter(&mut self, value: u16) {
        self.0.tcnt5.write(|w| w.bits(value));
    }

    fn write_compare(&mut self, channel: Channel, value: u16) {
        match channel {
            Channel::A => {
                self.0.ocr5a.write(|w| w.bits(value));
            }
            Channel::B => {
                self.0.ocr5b.write(|w| w.bits(value));
            }
            Channel::C => {
                self.0.ocr5c.write(|w| w.bits(value));
            }
        }
    }

    fn write_outputs(&mut self, outputs: Outputs) {
        // Connected outputs clear on match counting up and set counting down.
        self.0.tccr5a.write(|w| {
            let w = if outputs.contains(Channel::A) {
                w.com5a().match_clear()
            } else {
                w.com5a().disconnected()
            };
            let w = if outputs.contains(Channel::B) {
                w.com5b().match_clear()
            } else {
                w.com5b().disconnected()
            };
            if outputs.contains(Channel::C) {
                w.com5c().match_clear()
            } else {
                w.com5c().disconnected()
            }
        });
    }

    fn write_interrupt_enable(&mut self, enable: bool) {
        self.0.timsk5.write(|w| w.toie5().bit(enable));
    }
}

/// A compare output pin, switched to output on first use.
enum OcPin<PIN> {
    Input(Pin<Input<Floating>, PIN>),
    // Only held so nothing else can reconfigure the pin.
    #[allow(dead_code)]
    Output(Pin<Output, PIN>),
    Switching,
}

impl<PIN: PinOps> OcPin<PIN> {
    fn set_output(&mut self) {
        *self = match core::mem::replace(self, OcPin::Switching) {
            OcPin::Input(pin) => OcPin::Output(pin.into_output()),
            other => other,
        };
    }
}

/// The OC5x pins on port L.
pub struct Tc5Pins {
    a: OcPin<PL3>,
    b: OcPin<PL4>,
    c: OcPin<PL5>,
}

impl timer16::PwmPins for Tc5Pins {
    fn set_output(&mut self, channel: Channel) {
        match channel {
            Channel::A => self.a.set_output(),
            Channel::B => self.b.set_output(),
            Channel::C => self.c.set_output(),
        }
    }
}

/// Timer/Counter 5 overflow interrupt.
/// Fires once per PWM period when the counter reaches BOTTOM.
#[avr_device::interrupt(atmega2560)]
fn TIMER5_OVF() {
    HANDLER.call();
}
