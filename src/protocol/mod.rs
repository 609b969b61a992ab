//! TurboMIDI protocol core
//!
//! This module provides the speed table, capability bitmaps, and the SysEx
//! frame codec for the TurboMIDI command set.

mod caps;
mod codec;
mod command;
mod error;
mod speed;

pub use caps::SpeedCapabilities;
pub use codec::{decode, encode};
pub use command::{Command, CommandId};
pub use error::{Error, Result};
pub use speed::SpeedMultiplier;

/// SysEx frame start marker
pub const SYSEX_START: u8 = 0xF0;

/// SysEx frame terminator
pub const SYSEX_END: u8 = 0xF7;

/// MIDI Active Sensing status byte
pub const ACTIVE_SENSING: u8 = 0xFE;

/// Elektron manufacturer id carried by every TurboMIDI frame
pub const MANUFACTURER_ID: [u8; 5] = [0x00, 0x20, 0x3C, 0x00, 0x00];

/// Smallest valid frame: markers, manufacturer id, command byte, no payload
pub const MIN_FRAME_LEN: usize = 8;

/// Largest defined frame (SpeedTest / SpeedResult)
pub const MAX_FRAME_LEN: usize = 16;

/// Probe payload carried by SpeedTest and echoed in SpeedResult
pub const TEST_PATTERN: [u8; 8] = [0x55, 0x55, 0x55, 0x55, 0x00, 0x00, 0x00, 0x00];

/// Standard MIDI bit rate, the floor both peers can always fall back to
pub const MIDI_BASE_BAUD: u32 = 31_250;
