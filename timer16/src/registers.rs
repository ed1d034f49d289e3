use crate::{Channel, ClockDivider, Outputs};

/// Write side of a 16-bit timer/counter.
///
/// The counting mode is fixed to phase and frequency correct PWM with TOP
/// taken from [`Registers::write_top`]. Registers are never read back.
pub trait Registers {
    /// Set the clock source. `None` disconnects the clock and stops the counter.
    fn write_control(&mut self, clock: Option<ClockDivider>);

    /// Set the TOP value.
    fn write_top(&mut self, top: u16);

    /// Overwrite the counter.
    fn write_counter(&mut self, value: u16);

    /// Set the output compare value of `channel`.
    fn write_compare(&mut self, channel: Channel, value: u16);

    /// Connect the compare outputs in `outputs` to their pins and disconnect
    /// the rest.
    fn write_outputs(&mut self, outputs: Outputs);

    /// Enable or disable the overflow interrupt.
    fn write_interrupt_enable(&mut self, enable: bool);
}

/// Direction control for the pins driven by the compare outputs.
pub trait PwmPins {
    /// Make the pin of `channel` an output.
    fn set_output(&mut self, channel: Channel);
}
