//! Peer capability bitmaps

use std::fmt;

use super::SpeedMultiplier;

/// Which multipliers a peer supports, and which it certifies.
///
/// The wire encoding is four 7-bit bytes `M1 M2 C1 C2`: support bits in
/// `M1`/`M2`, certification bits in `C1`/`C2`. Bits 0..6 of the low bank
/// cover 2x through 10x; bits 0..2 of the high bank cover 13.3x through 20x.
/// 1x has no bit: it is always supported and always certified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeedCapabilities {
    support: [u8; 2],
    certified: [u8; 2],
}

/// Bank index and bit for a multiplier, `None` for 1x.
const fn bit_position(speed: SpeedMultiplier) -> Option<(usize, u8)> {
    match speed {
        SpeedMultiplier::X1 => None,
        SpeedMultiplier::X2 => Some((0, 1 << 0)),
        SpeedMultiplier::X3_3 => Some((0, 1 << 1)),
        SpeedMultiplier::X4 => Some((0, 1 << 2)),
        SpeedMultiplier::X5 => Some((0, 1 << 3)),
        SpeedMultiplier::X6_6 => Some((0, 1 << 4)),
        SpeedMultiplier::X8 => Some((0, 1 << 5)),
        SpeedMultiplier::X10 => Some((0, 1 << 6)),
        SpeedMultiplier::X13_3 => Some((1, 1 << 0)),
        SpeedMultiplier::X16 => Some((1, 1 << 1)),
        SpeedMultiplier::X20 => Some((1, 1 << 2)),
    }
}

impl SpeedCapabilities {
    /// Create an empty capability set (1x only).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            support: [0; 2],
            certified: [0; 2],
        }
    }

    /// Mark a multiplier as supported, and optionally certified.
    ///
    /// Certification implies support; adding 1x is a no-op.
    pub fn add(&mut self, speed: SpeedMultiplier, certified: bool) {
        if let Some((bank, bit)) = bit_position(speed) {
            self.support[bank] |= bit;
            if certified {
                self.certified[bank] |= bit;
            }
        }
    }

    /// Check whether a multiplier is supported. Always true for 1x.
    #[must_use]
    pub fn has(&self, speed: SpeedMultiplier) -> bool {
        match bit_position(speed) {
            Some((bank, bit)) => self.support[bank] & bit != 0,
            None => true,
        }
    }

    /// Check whether a multiplier is certified. Always true for 1x.
    #[must_use]
    pub fn is_certified(&self, speed: SpeedMultiplier) -> bool {
        match bit_position(speed) {
            Some((bank, bit)) => self.certified[bank] & bit != 0,
            None => true,
        }
    }

    /// Encode as the wire bytes `[M1, M2, C1, C2]`.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        [
            self.support[0],
            self.support[1],
            self.certified[0],
            self.certified[1],
        ]
    }

    /// Decode from the wire bytes `[M1, M2, C1, C2]`.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            support: [bytes[0], bytes[1]],
            certified: [bytes[2], bytes[3]],
        }
    }
}

impl fmt::Display for SpeedCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for speed in SpeedMultiplier::ALL {
            if !self.has(speed) {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{speed}")?;
            if self.is_certified(speed) {
                write!(f, "*")?;
            }
        }
        Ok(())
    }
}
