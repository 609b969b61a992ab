//! TurboMIDI - Elektron's speed-negotiation extension for serial MIDI links
//!
//! This library provides a reference implementation of the TurboMIDI
//! protocol: two devices sharing a MIDI wire cooperatively raise the UART
//! bit rate to up to 20x the nominal 31,250 baud, falling back to the safe
//! base rate whenever the link goes silent.
//!
//! # Quick Start
//!
//! ```rust
//! use turbomidi::{Command, SpeedMultiplier};
//!
//! // Build a command frame
//! let frame = Command::SpeedPush(SpeedMultiplier::X8).encode();
//! assert_eq!(frame[0], 0xF0);
//!
//! // Validate and decode a candidate frame
//! let decoded = Command::decode(&frame)?;
//! assert_eq!(decoded, Command::SpeedPush(SpeedMultiplier::X8));
//! # Ok::<(), turbomidi::Error>(())
//! ```
//!
//! Running a link end requires a [`MidiTransport`] implementation wrapping
//! the platform's UART:
//!
//! ```rust,ignore
//! use turbomidi::{DeviceRole, SpeedMultiplier, TurboMidi};
//!
//! let mut engine = TurboMidi::new(my_uart, DeviceRole::Master);
//! engine.set_supported(SpeedMultiplier::X4, true);
//! engine.negotiate(SpeedMultiplier::X4, 30)?;
//! loop {
//!     engine.tick();
//!     // ... application traffic ...
//! }
//! ```
//!
//! # Features
//!
//! - **Typed command set** - Rust enums for the vendor SysEx commands
//! - **Validating codec** - fixed manufacturer prefix and per-command lengths
//! - **Symmetric engine** - master, slave, or either role from one type
//! - **Active Sensing watchdog** - silent accelerated links revert to 31,250

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod engine;
pub mod protocol;

pub use engine::{
    DeviceRole, EngineConfig, MidiTransport, NegotiationError, SysexReassembler, TurboMidi,
};
pub use protocol::{
    decode, encode, Command, CommandId, Error, Result, SpeedCapabilities, SpeedMultiplier,
    ACTIVE_SENSING, MANUFACTURER_ID, MIDI_BASE_BAUD, TEST_PATTERN,
};
