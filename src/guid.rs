//! Tray icon identifier: random 128-bit GUID

use std::fmt;

/// GUID addressing one tray icon entry
/// Stored as big-endian u128: top 32 bits = Data1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(u128);

impl Guid {
    /// Fresh random GUID from the OS-seeded CSPRNG
    /// Panics if the OS randomness source is unavailable
    pub fn new_random() -> Self {
        Self(rand::random())
    }

    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub const fn to_u128(self) -> u128 {
        self.0
    }
}

/// Registry format: XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX
impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:04X}-{:012X}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF
        )
    }
}
