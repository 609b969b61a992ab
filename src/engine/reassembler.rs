//! SysEx frame reassembly from a raw byte stream

use tracing::trace;

use crate::protocol::{SYSEX_END, SYSEX_START};

/// Default cap on an in-progress frame; the largest defined frame is 16
/// bytes, so 256 leaves generous headroom for unknown vendor traffic.
pub const DEFAULT_FRAME_CAP: usize = 256;

/// Accumulates bytes into candidate SysEx frames.
///
/// An `F0` starts (or restarts) a frame, an `F7` completes it, and bytes
/// seen outside any frame are discarded. A frame that outgrows the cap is
/// dropped and the reassembler returns to the idle state.
#[derive(Debug)]
pub struct SysexReassembler {
    buf: Vec<u8>,
    in_frame: bool,
    cap: usize,
}

impl SysexReassembler {
    /// Create a reassembler bounding frames to `cap` bytes.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap.min(DEFAULT_FRAME_CAP)),
            in_frame: false,
            cap,
        }
    }

    /// Feed one byte; returns the completed frame when this byte ends one.
    ///
    /// The returned slice is valid until the next `push`.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        match byte {
            SYSEX_START => {
                self.buf.clear();
                self.buf.push(byte);
                self.in_frame = true;
                None
            }
            SYSEX_END if self.in_frame => {
                self.buf.push(byte);
                self.in_frame = false;
                Some(&self.buf)
            }
            _ if self.in_frame => {
                if self.buf.len() == self.cap {
                    trace!(cap = self.cap, "frame exceeded cap, dropping");
                    self.buf.clear();
                    self.in_frame = false;
                    return None;
                }
                self.buf.push(byte);
                None
            }
            _ => None,
        }
    }
}

impl Default for SysexReassembler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_CAP)
    }
}
