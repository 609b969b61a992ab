//! TurboMIDI command identifiers and typed commands

use std::fmt;

use super::{SpeedCapabilities, SpeedMultiplier};

/// TurboMIDI command identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandId {
    /// Ask the peer for its capability bitmap
    SpeedRequest = 0x10,
    /// Capability bitmap reply
    SpeedAnswer = 0x11,
    /// Propose a probe speed and a target speed
    SpeedNegotiate = 0x12,
    /// Accept a proposal
    SpeedAck = 0x13,
    /// Probe pattern sent at the probe speed
    SpeedTest = 0x14,
    /// Probe pattern echoed back
    SpeedResult = 0x15,
    /// Second-round probe
    SpeedTest2 = 0x16,
    /// Second-round confirmation
    SpeedResult2 = 0x17,
    /// Unilateral speed change
    SpeedPush = 0x20,
}

impl CommandId {
    /// Convert from the wire command byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x10 => Some(Self::SpeedRequest),
            0x11 => Some(Self::SpeedAnswer),
            0x12 => Some(Self::SpeedNegotiate),
            0x13 => Some(Self::SpeedAck),
            0x14 => Some(Self::SpeedTest),
            0x15 => Some(Self::SpeedResult),
            0x16 => Some(Self::SpeedTest2),
            0x17 => Some(Self::SpeedResult2),
            0x20 => Some(Self::SpeedPush),
            _ => None,
        }
    }

    /// Convert to the wire command byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Fixed payload length for this command
    #[must_use]
    pub const fn payload_len(self) -> usize {
        match self {
            Self::SpeedRequest | Self::SpeedAck | Self::SpeedTest2 | Self::SpeedResult2 => 0,
            Self::SpeedPush => 1,
            Self::SpeedNegotiate => 2,
            Self::SpeedAnswer => 4,
            Self::SpeedTest | Self::SpeedResult => 8,
        }
    }

    /// Total frame length for this command, markers and prefix included
    #[must_use]
    pub const fn frame_len(self) -> usize {
        super::MIN_FRAME_LEN + self.payload_len()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SpeedRequest => "SpeedRequest",
            Self::SpeedAnswer => "SpeedAnswer",
            Self::SpeedNegotiate => "SpeedNegotiate",
            Self::SpeedAck => "SpeedAck",
            Self::SpeedTest => "SpeedTest",
            Self::SpeedResult => "SpeedResult",
            Self::SpeedTest2 => "SpeedTest2",
            Self::SpeedResult2 => "SpeedResult2",
            Self::SpeedPush => "SpeedPush",
        };
        write!(f, "{name}")
    }
}

/// A validated TurboMIDI command with its payload decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask the peer for its capability bitmap
    SpeedRequest,
    /// Capability bitmap reply
    SpeedAnswer(SpeedCapabilities),
    /// Propose a probe speed and a target speed
    SpeedNegotiate {
        /// Speed the live test runs at
        test: SpeedMultiplier,
        /// Speed the link settles on afterwards
        target: SpeedMultiplier,
    },
    /// Accept a proposal
    SpeedAck,
    /// Probe pattern sent at the probe speed
    SpeedTest([u8; 8]),
    /// Probe pattern echoed back
    SpeedResult([u8; 8]),
    /// Second-round probe
    SpeedTest2,
    /// Second-round confirmation
    SpeedResult2,
    /// Unilateral speed change
    SpeedPush(SpeedMultiplier),
}

impl Command {
    /// Wire identifier of this command
    #[must_use]
    pub const fn id(&self) -> CommandId {
        match self {
            Self::SpeedRequest => CommandId::SpeedRequest,
            Self::SpeedAnswer(_) => CommandId::SpeedAnswer,
            Self::SpeedNegotiate { .. } => CommandId::SpeedNegotiate,
            Self::SpeedAck => CommandId::SpeedAck,
            Self::SpeedTest(_) => CommandId::SpeedTest,
            Self::SpeedResult(_) => CommandId::SpeedResult,
            Self::SpeedTest2 => CommandId::SpeedTest2,
            Self::SpeedResult2 => CommandId::SpeedResult2,
            Self::SpeedPush(_) => CommandId::SpeedPush,
        }
    }

    /// Encode into a complete SysEx frame
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        super::encode(self)
    }

    /// Decode and validate a candidate frame
    pub fn decode(frame: &[u8]) -> super::Result<Self> {
        super::decode(frame)
    }
}
