use nano_fmt::{NanoDisplay, NanoWrite};

/// Fixed point value with 2 decimal digits.
#[derive(Clone, Copy)]
pub struct Fixed2(u32);

impl Fixed2 {
    /// Frequency in hertz of a signal with the given period.
    ///
    /// A zero period gives zero.
    #[must_use]
    pub const fn hz_from_micros(micros: u32) -> Self {
        match micros {
            0 => Self(0),
            _ => Self(100_000_000 / micros),
        }
    }
}

impl NanoDisplay for Fixed2 {
    fn fmt<F: NanoWrite>(self, f: &mut F) {
        let fract = (self.0 % 100) as u8;
        let integer = self.0 / 100;

        integer.fmt(f);

        f.write_byte(b'.');

        if fract < 10 {
            f.write_byte(b'0');
        }
        fract.fmt(f);
    }
}
