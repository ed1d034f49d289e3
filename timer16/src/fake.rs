//! In-memory timer used by the tests.

use crate::{Channel, ClockDivider, Handler, Outputs, PwmPins, Registers};

pub struct FakeRegisters {
    pub clock: Option<ClockDivider>,
    pub top: u16,
    pub counter: u16,
    pub outputs: Outputs,
    pub interrupt_enabled: bool,
    compares: [u16; 3],
    handler: &'static Handler,
}

impl FakeRegisters {
    pub fn new(handler: &'static Handler) -> Self {
        Self {
            clock: None,
            top: 0,
            counter: 0,
            outputs: Outputs::NONE,
            interrupt_enabled: false,
            compares: [0; 3],
            handler,
        }
    }

    pub fn compare(&self, channel: Channel) -> u16 {
        self.compares[channel as usize]
    }

    /// Advance the counter by `counts` if the clock is connected.
    pub fn tick(&mut self, counts: u32) {
        if self.clock.is_some() {
            let span = u32::from(self.top) + 1;
            self.counter = ((u32::from(self.counter) + counts) % span) as u16;
        }
    }

    /// What the interrupt vector does at the end of a cycle.
    pub fn overflow(&self) {
        if self.interrupt_enabled {
            self.handler.call();
        }
    }
}

impl Registers for FakeRegisters {
    fn write_control(&mut self, clock: Option<ClockDivider>) {
        self.clock = clock;
    }

    fn write_top(&mut self, top: u16) {
        self.top = top;
    }

    fn write_counter(&mut self, value: u16) {
        self.counter = value;
    }

    fn write_compare(&mut self, channel: Channel, value: u16) {
        self.compares[channel as usize] = value;
    }

    fn write_outputs(&mut self, outputs: Outputs) {
        self.outputs = outputs;
    }

    fn write_interrupt_enable(&mut self, enable: bool) {
        self.interrupt_enabled = enable;
    }
}

#[derive(Default)]
pub struct FakePins {
    pub outputs: Outputs,
}

impl PwmPins for FakePins {
    fn set_output(&mut self, channel: Channel) {
        self.outputs = self.outputs.with(channel);
    }
}
