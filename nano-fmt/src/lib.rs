#![cfg_attr(not(test), no_std)]

/// Writer trait for resource constrained systems.
pub trait NanoWrite {
    /// Write a byte to the writer.
    fn write_byte(&mut self, b: u8);

    /// Write all bytes of `s`.
    fn write_bytes(&mut self, s: &[u8]) {
        for b in s {
            self.write_byte(*b);
        }
    }
}

/// Display trait for resource constrained systems.
pub trait NanoDisplay {
    /// Write formatted representation of `self` to `f`.
    fn fmt<F: NanoWrite>(self, f: &mut F);
}

impl NanoDisplay for bool {
    fn fmt<F: NanoWrite>(self, f: &mut F) {
        f.write_byte(if self { b'1' } else { b'0' });
    }
}

/// Implement NanoDisplay for an unsigned type.
macro_rules! display_unsigned {
    ($ty:ident) => {
        impl $crate::NanoDisplay for $ty {
            fn fmt<F: $crate::NanoWrite>(mut self, f: &mut F) {
                const MAX_POW10: $ty = <$ty>::pow(10, $ty::MAX.ilog10() as u32);

                let mut div = MAX_POW10;
                let mut print = false;

                while div > 0 {
                    let dig = (self / div) as u8;
                    self %= div;
                    div /= 10;

                    print |= dig > 0;

                    if print || (div == 0) {
                        f.write_byte(b'0' + dig);
                    }
                }
            }
        }

        impl $crate::NanoDisplay for $crate::Hex<$ty> {
            fn fmt<F: $crate::NanoWrite>(self, f: &mut F) {
                const DIGITS: u32 = <$ty>::BITS / 4;

                f.write_bytes(b"0x");
                for i in (0..DIGITS).rev() {
                    let nibble = ((self.0 >> (i * 4)) & 0xf) as u8;
                    f.write_byte(HEX_DIGITS[nibble as usize]);
                }
            }
        }
    };
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Zero padded hexadecimal representation of a register value.
#[derive(Clone, Copy)]
pub struct Hex<T>(pub T);

display_unsigned!(u8);
display_unsigned!(u16);
display_unsigned!(u32);
display_unsigned!(u64);
