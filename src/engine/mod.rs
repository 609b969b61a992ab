//! TurboMIDI protocol engine
//!
//! This module provides the transport abstraction, the SysEx reassembler,
//! and the master/slave negotiation engine with its watchdog.

mod config;
#[allow(clippy::module_inception)]
mod engine;
mod reassembler;
mod transport;

pub use config::EngineConfig;
pub use engine::{DeviceRole, NegotiationError, TurboMidi};
pub use reassembler::{SysexReassembler, DEFAULT_FRAME_CAP};
pub use transport::MidiTransport;
