#![no_std]
#![no_main]

use avr_device::interrupt::{self, Mutex};
use core::cell::Cell;
use embedded_hal::delay::DelayNs;
use nano_fmt::{Hex, NanoDisplay, NanoWrite};
use panic_halt as _;
use progmem::P;
use timer16::Channel;

use timer5::{
    delay::Delay,
    fixed::Fixed2,
    hal,
    led::Led,
    tc5::{self, Timer5},
    usart::Usart0,
};

/// UART baud rate.
const BAUDRATE: u32 = 57600;

/// PWM and interrupt period (in microseconds), 50 Hz.
const PERIOD: u32 = 20_000;

/// Overflows between two reports, one second at [`PERIOD`].
const TICKS_PER_REPORT: u8 = 50;

/// Arduino pin with a fixed duty.
const FIXED_PIN: u8 = 46;

/// Arduino pin with a duty sweep.
const SWEEP_PIN: u8 = 45;

const FIXED: Channel = match tc5::channel_for_pin(FIXED_PIN) {
    Some(channel) => channel,
    None => panic!("FIXED_PIN is not a Timer5 output"),
};

const SWEEP: Channel = match tc5::channel_for_pin(SWEEP_PIN) {
    Some(channel) => channel,
    None => panic!("SWEEP_PIN is not a Timer5 output"),
};

/// Duty on [`FIXED_PIN`].
const FIXED_DUTY: u16 = 512;

/// Duty step of the sweep on [`SWEEP_PIN`].
const DUTY_STEP: u16 = 128;

/// Overflows counted by the interrupt, consumed by the main loop.
static TICKS: Mutex<Cell<u8>> = Mutex::new(Cell::new(0));

/// Called from `TIMER5_OVF`.
fn on_overflow() {
    interrupt::free(|cs| {
        let ticks = TICKS.borrow(cs);
        ticks.set(ticks.get().saturating_add(1));
    });
}

/// Log timer state over the serial port.
fn send_report<W>(w: &mut W, timer: &Timer5, duty: u16)
where
    W: NanoWrite,
{
    P!("period_us, ").fmt(w);
    timer.period_micros().fmt(w);
    P!(", top, ").fmt(w);
    Hex(timer.top()).fmt(w);
    P!(", div, ").fmt(w);
    timer.divider().ratio().fmt(w);
    P!(", duty, ").fmt(w);
    duty.fmt(w);
    P!(", cmp, ").fmt(w);
    timer.compare_value(duty).fmt(w);
    P!(", running, ").fmt(w);
    timer.is_running().fmt(w);
    P!(", freq_hz, ").fmt(w);
    Fixed2::hz_from_micros(timer.period_micros()).fmt(w);
    P!("\r\n").fmt(w);
}

#[hal::entry]
fn main() -> ! {
    let dp = hal::Peripherals::take().unwrap();
    let pins = hal::pins!(dp);

    let mut serial = Usart0::new(
        dp.USART0,
        pins.pe0.into_pull_up_input(),
        pins.pe1.into_output(),
        BAUDRATE,
    );

    P!("Timer5 PWM demo\r\n").fmt(&mut serial);

    // On-board LED on pin 13.
    let mut led = Led::new(pins.pb7.into_output());
    let mut delay = Delay::new();
    for _ in 0..3 {
        led.turn_on();
        delay.delay_ms(100);
        led.turn_off();
        delay.delay_ms(100);
    }

    let mut timer = tc5::take(dp.TC5, pins.pl3, pins.pl4, pins.pl5);
    timer.initialize(tc5::DEFAULT_PERIOD_MICROS);
    send_report(&mut serial, &timer, 0);

    timer.attach_interrupt_with_period(on_overflow, PERIOD);

    timer.pwm(FIXED, FIXED_DUTY);

    let mut duty = 0;
    timer.pwm(SWEEP, duty);

    // Idle sleep, any interrupt wakes the CPU up.
    dp.CPU.smcr.write(|w| w.sm().idle().se().set_bit());

    // Enable interrupts.
    unsafe {
        // SAFETY: Not inside a critical section and any non-atomic operations have been completed
        // at this point.
        avr_device::interrupt::enable();
    }

    loop {
        // Go to sleep until next interrupt.
        avr_device::asm::sleep();

        let report = interrupt::free(|cs| {
            let ticks = TICKS.borrow(cs);
            if ticks.get() >= TICKS_PER_REPORT {
                ticks.set(0);
                true
            } else {
                false
            }
        });

        if report {
            led.toggle();

            duty = if duty >= 1024 - DUTY_STEP {
                0
            } else {
                duty + DUTY_STEP
            };
            timer.set_pwm_duty(SWEEP, duty);

            send_report(&mut serial, &timer, duty);
        }
    }
}
