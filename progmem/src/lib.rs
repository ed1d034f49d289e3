#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

//! Strings kept in program memory.
//!
//! RAM is scarce on AVR, so report labels stay in flash and are read back a
//! byte at a time with `lpm`. On other targets the same code reads ordinary
//! memory.

#[cfg(target_arch = "avr")]
use core::arch::asm;

use cfg_if::cfg_if;
use nano_fmt::{NanoDisplay, NanoWrite};

/// C-style string stored in program memory.
/// It is only suitable for formatted output.
#[derive(Clone, Copy)]
pub struct PStr(*const u8);

impl PStr {
    /// # Safety
    ///
    /// `ptr` must point to a NUL terminated string in program memory.
    pub const unsafe fn new(ptr: *const u8) -> Self {
        Self(ptr)
    }
}

/// Copy `s` into a NUL terminated array.
///
/// `N` must be `s.len() + 1`.
#[must_use]
pub const fn to_cstr<const N: usize>(s: &str) -> [u8; N] {
    let bytes = s.as_bytes();
    assert!(bytes.len() + 1 == N);

    let mut out = [0; N];
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i] != 0, "string contains NUL");
        out[i] = bytes[i];
        i += 1;
    }
    out
}

/// Place a string literal in program memory and return a [`PStr`] to it.
#[macro_export]
macro_rules! P {
    ($s:literal) => {{
        const SIZE: usize = $s.len() + 1;
        #[cfg_attr(target_arch = "avr", unsafe(link_section = ".progmem.data"))]
        static S: [u8; SIZE] = $crate::to_cstr::<SIZE>($s);
        unsafe { $crate::PStr::new(S.as_ptr()) }
    }};
}

impl NanoDisplay for PStr {
    fn fmt<F: NanoWrite>(self, f: &mut F) {
        let mut p = self.0;

        loop {
            let b: u8;

            unsafe {
                cfg_if! {
                    if #[cfg(target_arch = "avr")] {
                        asm! {
                            "lpm {b}, Z+",
                            b = out(reg) b,
                            inout("Z") p,
                            options(pure, nomem, preserves_flags, nostack),
                        };
                    } else {
                        b = *p;
                        p = p.add(1);
                    }
                }
            }

            if b == 0 {
                break;
            }

            f.write_byte(b);
        }
    }
}
