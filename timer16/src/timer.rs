use crate::{
    Channel, ClockDivider, Handler, Outputs, Period, PwmPins, Registers, cycles_for,
    select_period,
};

/// Period set up by a freshly initialized timer: one second.
pub const DEFAULT_PERIOD_MICROS: u32 = 1_000_000;

/// Duty values are fractions of `1 << DUTY_SHIFT`.
pub const DUTY_SHIFT: u32 = 10;

/// A 16-bit timer producing periodic interrupts and PWM on its compare
/// channels.
///
/// `CLOCK_HZ` is the frequency of the clock feeding the prescaler. All
/// channels share one period; each has its own duty.
pub struct Timer<R, P, const CLOCK_HZ: u32> {
    regs: R,
    pins: P,
    handler: &'static Handler,
    period: Period,
    outputs: Outputs,
    running: bool,
}

impl<R, P, const CLOCK_HZ: u32> Timer<R, P, CLOCK_HZ>
where
    R: Registers,
    P: PwmPins,
{
    /// Take over the timer registers.
    ///
    /// Nothing is written to the hardware until [`Timer::initialize`] is called.
    /// `CLOCK_HZ` below 2 MHz is rejected at compile time: no period would
    /// span a single cycle.
    pub fn new(regs: R, pins: P, handler: &'static Handler) -> Self {
        const { assert!(CLOCK_HZ >= 2_000_000, "clock too slow for microsecond periods") };

        Self {
            regs,
            pins,
            handler,
            period: Period {
                divider: ClockDivider::Div1,
                top: 0,
            },
            outputs: Outputs::NONE,
            running: false,
        }
    }

    /// Release the registers and pins.
    pub fn free(self) -> (R, P) {
        (self.regs, self.pins)
    }

    /// Stop the counter, disconnect all outputs and set up the period.
    ///
    /// The timer is running when this returns.
    pub fn initialize(&mut self, micros: u32) {
        self.stop();
        self.outputs = Outputs::NONE;
        self.regs.write_outputs(self.outputs);
        self.set_period(micros);
    }

    /// Change the period, choosing the finest prescaler that can count it.
    ///
    /// Periods longer than the counter can represent at the coarsest
    /// prescaler are clamped to that maximum. Duty registers are not
    /// rescaled. The clock is (re)connected with the new prescaler.
    pub fn set_period(&mut self, micros: u32) {
        self.period = select_period(cycles_for(CLOCK_HZ, micros));
        self.regs.write_top(self.period.top);
        self.resume();
    }

    /// Reset the counter to zero and run.
    pub fn start(&mut self) {
        self.stop();
        self.regs.write_counter(0);
        self.resume();
    }

    /// Disconnect the clock. The counter keeps its value.
    pub fn stop(&mut self) {
        self.regs.write_control(None);
        self.running = false;
    }

    /// Same as [`Timer::start`].
    pub fn restart(&mut self) {
        self.start();
    }

    /// Reconnect the clock without touching the counter.
    pub fn resume(&mut self) {
        self.regs.write_control(Some(self.period.divider));
        self.running = true;
    }

    /// Set the duty of `channel` as a fraction of 1024.
    ///
    /// `duty` is not checked: values above 1024 scale past TOP and the
    /// result is truncated to the register width.
    pub fn set_pwm_duty(&mut self, channel: Channel, duty: u16) {
        let value = self.compare_value(duty);
        self.regs.write_compare(channel, value);
    }

    /// Drive the pin of `channel` with a PWM signal.
    ///
    /// This always leaves the timer running, even if it was stopped before.
    pub fn pwm(&mut self, channel: Channel, duty: u16) {
        self.pins.set_output(channel);
        self.outputs = self.outputs.with(channel);
        self.regs.write_outputs(self.outputs);
        self.set_pwm_duty(channel, duty);
        self.resume();
    }

    /// Like [`Timer::pwm`], changing the period first unless `micros` is zero.
    pub fn pwm_with_period(&mut self, channel: Channel, duty: u16, micros: u32) {
        if micros > 0 {
            self.set_period(micros);
        }
        self.pwm(channel, duty);
    }

    /// Disconnect the compare output of `channel` from its pin.
    pub fn disable_pwm(&mut self, channel: Channel) {
        self.outputs = self.outputs.without(channel);
        self.regs.write_outputs(self.outputs);
    }

    /// Call `callback` on every counter overflow.
    pub fn attach_interrupt(&mut self, callback: fn()) {
        self.handler.set(callback);
        self.regs.write_interrupt_enable(true);
    }

    /// Like [`Timer::attach_interrupt`], changing the period first unless
    /// `micros` is zero.
    pub fn attach_interrupt_with_period(&mut self, callback: fn(), micros: u32) {
        if micros > 0 {
            self.set_period(micros);
        }
        self.attach_interrupt(callback);
    }

    /// Stop calling the attached callback.
    ///
    /// A call that is already in progress is not waited for.
    pub fn detach_interrupt(&mut self) {
        self.regs.write_interrupt_enable(false);
    }

    /// Compare register value for `duty`.
    #[must_use]
    pub fn compare_value(&self, duty: u16) -> u16 {
        ((u32::from(self.period.top) * u32::from(duty)) >> DUTY_SHIFT) as u16
    }

    #[must_use]
    pub fn top(&self) -> u16 {
        self.period.top
    }

    #[must_use]
    pub fn divider(&self) -> ClockDivider {
        self.period.divider
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Period actually produced by the hardware, in microseconds.
    #[must_use]
    pub fn period_micros(&self) -> u32 {
        let cycles = 2 * u64::from(self.period.divider.ratio()) * u64::from(self.period.top);
        (cycles * 1_000_000 / u64::from(CLOCK_HZ)) as u32
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::fake::{FakePins, FakeRegisters};

    type TestTimer = Timer<FakeRegisters, FakePins, 16_000_000>;

    fn timer(handler: &'static Handler) -> TestTimer {
        let mut t = TestTimer::new(FakeRegisters::new(handler), FakePins::default(), handler);
        t.initialize(DEFAULT_PERIOD_MICROS);
        t
    }

    #[test]
    fn initialize_defaults() {
        static HANDLER: Handler = Handler::new();
        let t = timer(&HANDLER);

        // 8_000_000 cycles: 65536 * 64 <= 8e6 < 65536 * 256
        assert_eq!(t.divider(), ClockDivider::Div256);
        assert_eq!(t.top(), 31_250);
        assert!(t.is_running());
        assert_eq!(t.period_micros(), 1_000_000);

        let (regs, _) = t.free();
        assert_eq!(regs.clock, Some(ClockDivider::Div256));
        assert_eq!(regs.top, 31_250);
        assert_eq!(regs.outputs, Outputs::NONE);
        assert!(!regs.interrupt_enabled);
    }

    #[test]
    fn initialize_clears_outputs() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);

        t.pwm(Channel::A, 100);
        t.initialize(500);

        let (regs, _) = t.free();
        assert_eq!(regs.outputs, Outputs::NONE);
        assert_eq!(regs.top, 4000);
    }

    #[test]
    fn one_millisecond_pwm() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);

        t.set_period(1000);
        assert_eq!(t.divider(), ClockDivider::Div1);
        assert_eq!(t.top(), 8000);

        t.set_pwm_duty(Channel::A, 512);
        let (regs, _) = t.free();
        assert_eq!(regs.compare(Channel::A), 4000);
        assert_eq!(regs.top, 8000);
        assert_eq!(regs.clock, Some(ClockDivider::Div1));
    }

    #[test]
    fn period_round_trip() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);

        for micros in (1..8_388_000).step_by(4999) {
            t.set_period(micros);
            // One count at the chosen prescaler, expressed in microseconds.
            let unit = 2 * t.divider().ratio() / 16;
            let actual = t.period_micros();
            assert!(actual <= micros, "{micros} us became {actual} us");
            assert!(micros - actual <= unit.max(1), "{micros} us became {actual} us");
        }
    }

    #[test]
    fn long_period_saturates() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);

        // 12_500_000 us at 8 cycles/us is 100_000_000 cycles.
        t.set_period(12_500_000);
        assert_eq!(t.divider(), ClockDivider::Div1024);
        assert_eq!(t.top(), 65_535);

        t.set_period(u32::MAX);
        assert_eq!(t.divider(), ClockDivider::Div1024);
        assert_eq!(t.top(), 65_535);
        assert_eq!(t.period_micros(), 8_388_480);
    }

    #[test]
    fn slowest_clock() {
        static HANDLER: Handler = Handler::new();
        let mut t = Timer::<_, _, 2_000_000>::new(
            FakeRegisters::new(&HANDLER),
            FakePins::default(),
            &HANDLER,
        );

        t.initialize(1000);
        assert_eq!(t.divider(), ClockDivider::Div1);
        assert_eq!(t.top(), 1000);
        assert_eq!(t.period_micros(), 1000);

        t.set_period(1);
        assert_eq!(t.top(), 1);
        assert_eq!(t.period_micros(), 1);
    }

    #[test]
    fn duty_limits() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.set_period(1000);

        assert_eq!(t.compare_value(0), 0);
        assert_eq!(t.compare_value(1023), ((8000u32 * 1023) >> 10) as u16);
        assert_eq!(t.compare_value(1024), 8000);

        for duty in 0..=1023 {
            assert!(t.compare_value(duty) <= t.top());
        }
    }

    #[test]
    fn duty_out_of_range_is_not_clamped() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.set_period(1000);

        assert_eq!(t.compare_value(2048), 16_000);
        // (8000 * 65535) >> 10 = 511_992, truncated to 16 bits.
        assert_eq!(t.compare_value(u16::MAX), (511_992u32 & 0xffff) as u16);
    }

    #[test]
    fn stop_resume_keeps_counter() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.set_period(1000);

        t.regs.tick(1234);
        t.stop();
        assert!(!t.is_running());
        assert_eq!(t.regs.clock, None);

        t.regs.tick(500);
        assert_eq!(t.regs.counter, 1234);

        t.resume();
        assert!(t.is_running());
        assert_eq!(t.regs.counter, 1234);
        assert_eq!(t.regs.clock, Some(ClockDivider::Div1));
        assert_eq!(t.top(), 8000);
    }

    #[test]
    fn start_resets_counter() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.set_period(1000);

        t.regs.tick(1234);
        t.start();
        assert_eq!(t.regs.counter, 0);
        assert!(t.is_running());

        t.regs.tick(10);
        t.stop();
        t.restart();
        assert_eq!(t.regs.counter, 0);
        assert!(t.is_running());
    }

    #[test]
    fn run_control_keeps_period_and_duty() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.pwm_with_period(Channel::A, 256, 1000);

        t.stop();
        t.start();
        t.stop();
        t.resume();

        assert_eq!(t.top(), 8000);
        assert_eq!(t.regs.top, 8000);
        assert_eq!(t.regs.compare(Channel::A), 2000);
        assert!(t.regs.outputs.contains(Channel::A));
    }

    #[test]
    fn set_period_while_stopped_runs() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);

        t.stop();
        t.set_period(1000);
        assert!(t.is_running());
        assert_eq!(t.regs.clock, Some(ClockDivider::Div1));
    }

    #[test]
    fn pwm_enables_output_and_resumes() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.set_period(1000);
        t.stop();

        t.pwm(Channel::A, 512);
        assert!(t.is_running());

        let (regs, pins) = t.free();
        assert_eq!(regs.clock, Some(ClockDivider::Div1));
        assert!(regs.outputs.contains(Channel::A));
        assert_eq!(regs.compare(Channel::A), 4000);
        assert!(pins.outputs.contains(Channel::A));
    }

    #[test]
    fn pwm_with_zero_period_keeps_period() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.set_period(1000);

        t.pwm_with_period(Channel::A, 512, 0);
        assert_eq!(t.top(), 8000);

        t.pwm_with_period(Channel::A, 512, 2000);
        assert_eq!(t.top(), 16_000);
        assert_eq!(t.regs.compare(Channel::A), 8000);
    }

    #[test]
    fn disable_pwm_leaves_duty() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.pwm_with_period(Channel::A, 512, 1000);

        t.disable_pwm(Channel::A);
        assert!(!t.regs.outputs.contains(Channel::A));
        assert_eq!(t.regs.compare(Channel::A), 4000);
        assert!(t.is_running());
    }

    #[cfg(all(feature = "channel-b", feature = "channel-c"))]
    #[test]
    fn channels_share_period() {
        static HANDLER: Handler = Handler::new();
        let mut t = timer(&HANDLER);
        t.set_period(1000);

        t.pwm(Channel::A, 256);
        t.pwm(Channel::B, 512);
        t.pwm(Channel::C, 768);
        assert_eq!(t.regs.compare(Channel::A), 2000);
        assert_eq!(t.regs.compare(Channel::B), 4000);
        assert_eq!(t.regs.compare(Channel::C), 6000);

        t.disable_pwm(Channel::B);
        assert!(t.regs.outputs.contains(Channel::A));
        assert!(!t.regs.outputs.contains(Channel::B));
        assert!(t.regs.outputs.contains(Channel::C));

        // A new period does not rescale existing duty registers.
        t.set_period(2000);
        assert_eq!(t.regs.compare(Channel::C), 6000);
        t.set_pwm_duty(Channel::C, 768);
        assert_eq!(t.regs.compare(Channel::C), 12_000);
    }

    #[test]
    fn interrupt_fires_on_overflow() {
        static HANDLER: Handler = Handler::new();
        static CALLS: AtomicU32 = AtomicU32::new(0);
        fn on_overflow() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let mut t = timer(&HANDLER);
        t.regs.overflow();
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);

        t.attach_interrupt(on_overflow);
        assert!(t.regs.interrupt_enabled);
        t.regs.overflow();
        t.regs.overflow();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn detached_interrupt_is_not_called() {
        static HANDLER: Handler = Handler::new();
        static CALLS: AtomicU32 = AtomicU32::new(0);
        fn on_overflow() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let mut t = timer(&HANDLER);
        t.attach_interrupt(on_overflow);
        t.detach_interrupt();
        assert!(!t.regs.interrupt_enabled);

        t.regs.overflow();
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn attach_replaces_callback() {
        static HANDLER: Handler = Handler::new();
        static FIRST: AtomicU32 = AtomicU32::new(0);
        static SECOND: AtomicU32 = AtomicU32::new(0);
        fn first() {
            FIRST.fetch_add(1, Ordering::SeqCst);
        }
        fn second() {
            SECOND.fetch_add(1, Ordering::SeqCst);
        }

        let mut t = timer(&HANDLER);
        t.attach_interrupt_with_period(first, 0);
        assert_eq!(t.top(), 31_250);
        t.regs.overflow();

        t.attach_interrupt_with_period(second, 1000);
        assert_eq!(t.top(), 8000);
        t.regs.overflow();

        assert_eq!(FIRST.load(Ordering::SeqCst), 1);
        assert_eq!(SECOND.load(Ordering::SeqCst), 1);
    }
}
