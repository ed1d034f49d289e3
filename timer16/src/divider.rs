use crate::RESOLUTION;

/// Clock prescaler applied to the system clock before it drives the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ClockDivider {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl ClockDivider {
    /// All dividers, from the finest resolution to the coarsest.
    pub const ALL: [ClockDivider; 5] = [
        ClockDivider::Div1,
        ClockDivider::Div8,
        ClockDivider::Div64,
        ClockDivider::Div256,
        ClockDivider::Div1024,
    ];

    /// The coarsest divider.
    pub const MAX: ClockDivider = ClockDivider::Div1024;

    /// Division ratio.
    #[must_use]
    pub const fn ratio(self) -> u32 {
        match self {
            ClockDivider::Div1 => 1,
            ClockDivider::Div8 => 8,
            ClockDivider::Div64 => 64,
            ClockDivider::Div256 => 256,
            ClockDivider::Div1024 => 1024,
        }
    }
}

/// A divider together with the TOP value that produces a period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub divider: ClockDivider,
    pub top: u16,
}

/// Number of undivided clock cycles spanning half of a period of
/// `micros` microseconds.
///
/// The counter runs up and down, so one period covers TOP twice. The product
/// saturates instead of wrapping, which keeps huge requests in the clamped
/// range of [`select_period`].
#[must_use]
pub const fn cycles_for(clock_hz: u32, micros: u32) -> u32 {
    (clock_hz / 2_000_000).saturating_mul(micros)
}

/// Pick the smallest divider under which `cycles` still fits in the counter.
///
/// When even the largest divider is not enough the result is clamped to the
/// longest representable period.
#[must_use]
pub const fn select_period(cycles: u32) -> Period {
    let mut i = 0;
    while i < ClockDivider::ALL.len() {
        let divider = ClockDivider::ALL[i];
        let top = cycles / divider.ratio();
        if top < RESOLUTION {
            return Period {
                divider,
                top: top as u16,
            };
        }
        i += 1;
    }

    Period {
        divider: ClockDivider::MAX,
        top: (RESOLUTION - 1) as u16,
    }
}
