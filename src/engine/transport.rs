//! Transport abstraction the host supplies

/// Byte transport and platform services backing a [`TurboMidi`] engine.
///
/// Implementations wrap whatever moves MIDI bytes on the platform: a UART
/// peripheral, an OS serial port, or an in-memory pair in tests. The engine
/// is the sole caller of [`set_baud`] while a negotiation is in flight;
/// application traffic must not race it.
///
/// [`TurboMidi`]: crate::TurboMidi
/// [`set_baud`]: MidiTransport::set_baud
pub trait MidiTransport {
    /// Queue raw bytes for transmission. May buffer; must not reorder.
    fn send(&mut self, bytes: &[u8]);

    /// Read available bytes into `buf` without blocking.
    ///
    /// Returns the number of bytes written, 0 when nothing is pending.
    fn recv(&mut self, buf: &mut [u8]) -> usize;

    /// Monotonic millisecond counter. Wraparound is tolerated; the engine
    /// compares timestamps with wrapping subtraction.
    fn now_ms(&self) -> u32;

    /// Reconfigure the UART bit rate. May block briefly while the line
    /// drains or in-flight bytes are dropped.
    fn set_baud(&mut self, rate: u32);

    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}
