//! Speed multipliers and the baud-rate table

use std::fmt;

use super::MIDI_BASE_BAUD;

/// TurboMIDI speed multipliers over the 31,250 baud MIDI base rate.
///
/// Discriminants are the identifiers used on the wire (1 = 1x .. 11 = 20x).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SpeedMultiplier {
    /// 1x — standard MIDI rate, always supported
    X1 = 1,
    /// 2x
    X2 = 2,
    /// 3.3x
    X3_3 = 3,
    /// 4x
    X4 = 4,
    /// 5x
    X5 = 5,
    /// 6.6x
    X6_6 = 6,
    /// 8x
    X8 = 7,
    /// 10x
    X10 = 8,
    /// 13.3x
    X13_3 = 9,
    /// 16x
    X16 = 10,
    /// 20x
    X20 = 11,
}

impl SpeedMultiplier {
    /// Every multiplier, in wire-id order.
    pub const ALL: [Self; 11] = [
        Self::X1,
        Self::X2,
        Self::X3_3,
        Self::X4,
        Self::X5,
        Self::X6_6,
        Self::X8,
        Self::X10,
        Self::X13_3,
        Self::X16,
        Self::X20,
    ];

    /// Convert from a wire identifier
    #[must_use]
    pub fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::X1),
            2 => Some(Self::X2),
            3 => Some(Self::X3_3),
            4 => Some(Self::X4),
            5 => Some(Self::X5),
            6 => Some(Self::X6_6),
            7 => Some(Self::X8),
            8 => Some(Self::X10),
            9 => Some(Self::X13_3),
            10 => Some(Self::X16),
            11 => Some(Self::X20),
            _ => None,
        }
    }

    /// Convert to the wire identifier
    #[must_use]
    pub const fn wire_id(self) -> u8 {
        self as u8
    }

    /// Exact UART bit rate for this multiplier
    #[must_use]
    pub const fn baud_rate(self) -> u32 {
        match self {
            Self::X1 => MIDI_BASE_BAUD,
            Self::X2 => 62_500,
            Self::X3_3 => 103_125,
            Self::X4 => 125_000,
            Self::X5 => 156_250,
            Self::X6_6 => 206_250,
            Self::X8 => 250_000,
            Self::X10 => 312_500,
            Self::X13_3 => 415_625,
            Self::X16 => 500_000,
            Self::X20 => 625_000,
        }
    }

    /// Successor in enumeration order, `None` at 20x
    #[must_use]
    pub fn next_higher(self) -> Option<Self> {
        Self::from_wire_id(self.wire_id() + 1)
    }
}

impl fmt::Display for SpeedMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::X1 => "1x",
            Self::X2 => "2x",
            Self::X3_3 => "3.3x",
            Self::X4 => "4x",
            Self::X5 => "5x",
            Self::X6_6 => "6.6x",
            Self::X8 => "8x",
            Self::X10 => "10x",
            Self::X13_3 => "13.3x",
            Self::X16 => "16x",
            Self::X20 => "20x",
        };
        write!(f, "{label}")
    }
}
