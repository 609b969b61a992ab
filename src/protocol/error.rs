//! TurboMIDI frame rejection errors

use thiserror::Error;

/// Reasons a candidate SysEx frame fails validation.
///
/// The engine drops rejected frames silently; these variants exist so the
/// codec can be exercised and diagnosed on its own.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Frame shorter than the 8-byte minimum
    #[error("frame too short: {len} bytes (min {min})")]
    FrameTooShort {
        /// Candidate frame length
        len: usize,
        /// Minimum valid frame length
        min: usize,
    },

    /// First byte is not the SysEx start marker
    #[error("missing sysex start: first byte {found:#04x}")]
    MissingSysexStart {
        /// Byte found in place of 0xF0
        found: u8,
    },

    /// Last byte is not the SysEx terminator
    #[error("missing sysex terminator: last byte {found:#04x}")]
    MissingSysexEnd {
        /// Byte found in place of 0xF7
        found: u8,
    },

    /// Manufacturer prefix does not match the Elektron id
    #[error("wrong manufacturer id: byte {index} is {found:#04x}")]
    WrongManufacturer {
        /// Offset of the first mismatching prefix byte within the frame
        index: usize,
        /// Byte found at that offset
        found: u8,
    },

    /// Command byte is not a known TurboMIDI command
    #[error("unknown command id: {id:#04x}")]
    UnknownCommand {
        /// Unrecognized command byte
        id: u8,
    },

    /// Frame length does not match the command's fixed length
    #[error("bad frame length for {command:#04x}: {len} bytes (expected {expected})")]
    LengthMismatch {
        /// Command byte the frame carries
        command: u8,
        /// Candidate frame length
        len: usize,
        /// Length the command requires
        expected: usize,
    },

    /// A payload speed id maps to no defined multiplier
    #[error("unknown speed id: {id}")]
    UnknownSpeedId {
        /// Out-of-range wire id
        id: u8,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
