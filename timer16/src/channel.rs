/// Output compare channel.
///
/// Channels B and C only exist on timers that have them and are enabled by
/// the `channel-b` and `channel-c` features.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    A,
    #[cfg(feature = "channel-b")]
    B,
    #[cfg(feature = "channel-c")]
    C,
}

impl Channel {
    const fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// Set of channels whose compare output drives its pin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outputs(u8);

impl Outputs {
    /// No channel connected.
    pub const NONE: Outputs = Outputs(0);

    #[must_use]
    pub const fn with(self, channel: Channel) -> Self {
        Self(self.0 | channel.mask())
    }

    #[must_use]
    pub const fn without(self, channel: Channel) -> Self {
        Self(self.0 & !channel.mask())
    }

    #[must_use]
    pub const fn contains(self, channel: Channel) -> bool {
        self.0 & channel.mask() != 0
    }
}
