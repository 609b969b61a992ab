//! The TurboMIDI negotiation engine
//!
//! One `TurboMidi` instance drives one end of a MIDI link: it answers or
//! originates speed negotiations, commits bit-rate changes to the transport,
//! and supervises the accelerated link with the Active Sensing watchdog.

use std::fmt;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::engine::{EngineConfig, MidiTransport, SysexReassembler};
use crate::protocol::{self, Command, SpeedCapabilities, SpeedMultiplier, ACTIVE_SENSING,
    TEST_PATTERN};

/// Reply window for the in-band speed test rounds.
const TEST_REPLY_TIMEOUT_MS: u32 = 30;

/// Which commands this end of the link may originate and which it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    /// Originates negotiations and pushes; never answers them
    Master,
    /// Answers negotiations; never originates them
    Slave,
    /// Both originates and answers
    Either,
}

impl DeviceRole {
    /// Whether this role may start a negotiation or push a speed.
    #[must_use]
    pub const fn may_originate(self) -> bool {
        !matches!(self, Self::Slave)
    }

    /// Whether this role answers negotiation traffic from the peer.
    #[must_use]
    pub const fn may_answer(self) -> bool {
        !matches!(self, Self::Master)
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Master => "master",
            Self::Slave => "slave",
            Self::Either => "either",
        };
        write!(f, "{name}")
    }
}

/// Why a master-side speed change did not complete.
///
/// None of these are fatal: the engine stays usable and, where a tentative
/// bit-rate change was already made, has reverted to 1x.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationError {
    /// The engine's role may not originate speed changes
    #[error("role {role} cannot originate speed changes")]
    RoleForbidden {
        /// Role the engine was constructed with
        role: DeviceRole,
    },

    /// The peer never answered the capability request
    #[error("no speed answer within {timeout_ms} ms")]
    NoAnswer {
        /// Window the answer was awaited for
        timeout_ms: u32,
    },

    /// The peer does not support the requested speed
    #[error("remote does not support {target}")]
    UnsupportedByRemote {
        /// Requested target speed
        target: SpeedMultiplier,
    },

    /// The uncertified target has no higher speed to probe at
    #[error("no probe speed above {target}")]
    NoProbeSpeed {
        /// Requested target speed
        target: SpeedMultiplier,
    },

    /// The peer accepted no proposal
    #[error("no acknowledgment within {timeout_ms} ms")]
    NoAck {
        /// Window the acknowledgment was awaited for
        timeout_ms: u32,
    },

    /// The live test produced no valid echo in time
    #[error("live test at {probe} failed")]
    TestFailed {
        /// Speed the test ran at
        probe: SpeedMultiplier,
    },
}

/// Slave-side progress through the live speed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TestState {
    Idle,
    AwaitingTest,
    AwaitingTest2,
}

/// One end of a TurboMIDI link.
///
/// The engine is single-threaded and cooperative: the host calls [`tick`]
/// periodically to drain the transport and service the watchdog, and a
/// master additionally calls [`negotiate`] or [`push`]. All waiting happens
/// inside those calls by polling the transport.
///
/// [`tick`]: TurboMidi::tick
/// [`negotiate`]: TurboMidi::negotiate
/// [`push`]: TurboMidi::push
pub struct TurboMidi<T: MidiTransport> {
    transport: T,
    role: DeviceRole,
    config: EngineConfig,
    local_caps: SpeedCapabilities,
    current_speed: SpeedMultiplier,
    last_rx_ms: u32,
    last_sense_tx_ms: u32,
    test_state: TestState,
    pending_test_speed: SpeedMultiplier,
    pending_target_speed: SpeedMultiplier,
    reassembler: SysexReassembler,
    on_speed_changed: Option<Box<dyn FnMut(SpeedMultiplier)>>,
    on_speed_request: Option<Box<dyn FnMut()>>,
}

impl<T: MidiTransport> TurboMidi<T> {
    /// Create an engine at 1x with only 1x supported and certified.
    pub fn new(transport: T, role: DeviceRole) -> Self {
        Self::with_config(transport, role, EngineConfig::default())
    }

    /// Create an engine with explicit watchdog timings and buffer bounds.
    pub fn with_config(transport: T, role: DeviceRole, config: EngineConfig) -> Self {
        let now = transport.now_ms();
        Self {
            reassembler: SysexReassembler::new(config.frame_cap),
            transport,
            role,
            config,
            local_caps: SpeedCapabilities::new(),
            current_speed: SpeedMultiplier::X1,
            last_rx_ms: now,
            last_sense_tx_ms: now,
            test_state: TestState::Idle,
            pending_test_speed: SpeedMultiplier::X1,
            pending_target_speed: SpeedMultiplier::X1,
            on_speed_changed: None,
            on_speed_request: None,
        }
    }

    /// Mark a speed as locally supported, and optionally certified.
    ///
    /// Additive: bits are never cleared during normal operation.
    pub fn set_supported(&mut self, speed: SpeedMultiplier, certified: bool) {
        self.local_caps.add(speed, certified);
    }

    /// Register a handler invoked after every committed speed change.
    pub fn on_speed_changed(&mut self, handler: impl FnMut(SpeedMultiplier) + 'static) {
        self.on_speed_changed = Some(Box::new(handler));
    }

    /// Register a handler invoked when the peer requests our capabilities.
    pub fn on_speed_request(&mut self, handler: impl FnMut() + 'static) {
        self.on_speed_request = Some(Box::new(handler));
    }

    /// Speed the link currently runs at.
    #[must_use]
    pub fn current_speed(&self) -> SpeedMultiplier {
        self.current_speed
    }

    /// Role the engine was constructed with.
    #[must_use]
    pub fn role(&self) -> DeviceRole {
        self.role
    }

    /// Locally configured capability set.
    #[must_use]
    pub fn local_capabilities(&self) -> SpeedCapabilities {
        self.local_caps
    }

    /// Borrow the transport binding.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the transport binding mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Tear down the engine, releasing the transport binding.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Drain the transport, process complete frames, run the watchdog.
    pub fn tick(&mut self) {
        self.pump(|_| false);
        self.check_timeouts();
    }

    /// Negotiate the link up (or down) to `target`.
    ///
    /// Master/either roles only. Exchanges capabilities, proposes a probe
    /// and target speed, runs the live test when the peer has not certified
    /// the target, and commits the local bit rate on success. Each reply is
    /// awaited for `timeout_ms` by polling the transport; the test rounds
    /// use the protocol's fixed 30 ms window.
    ///
    /// # Errors
    ///
    /// Returns the step that failed. After a failed live test the engine
    /// has already reverted to 1x.
    pub fn negotiate(
        &mut self,
        target: SpeedMultiplier,
        timeout_ms: u32,
    ) -> Result<(), NegotiationError> {
        if !self.role.may_originate() {
            return Err(NegotiationError::RoleForbidden { role: self.role });
        }

        debug!(%target, timeout_ms, "negotiation started");
        self.send_command(&Command::SpeedRequest);

        let answer = self.wait_for(timeout_ms, |c| matches!(c, Command::SpeedAnswer(_)));
        let Some(Command::SpeedAnswer(remote)) = answer else {
            return Err(NegotiationError::NoAnswer { timeout_ms });
        };
        trace!(capabilities = %remote, "speed answer received");

        if !remote.has(target) {
            return Err(NegotiationError::UnsupportedByRemote { target });
        }

        // A certified target is committed sight unseen; an uncertified one
        // is probed one step above it to prove headroom.
        let probe = if target == SpeedMultiplier::X1 {
            SpeedMultiplier::X1
        } else if remote.is_certified(target) {
            target
        } else {
            target
                .next_higher()
                .ok_or(NegotiationError::NoProbeSpeed { target })?
        };

        self.send_command(&Command::SpeedNegotiate {
            test: probe,
            target,
        });
        if self
            .wait_for(timeout_ms, |c| matches!(c, Command::SpeedAck))
            .is_none()
        {
            return Err(NegotiationError::NoAck { timeout_ms });
        }

        if target != SpeedMultiplier::X1 && probe != target {
            self.run_speed_test(probe)?;
        }

        self.commit(target);
        debug!(%target, "negotiation complete");
        Ok(())
    }

    /// Push the link to `speed` without negotiation or acknowledgment.
    ///
    /// Master/either roles only. The local bit rate changes immediately;
    /// the peer changes when it processes the push.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::RoleForbidden`] for slave engines.
    pub fn push(&mut self, speed: SpeedMultiplier) -> Result<(), NegotiationError> {
        if !self.role.may_originate() {
            return Err(NegotiationError::RoleForbidden { role: self.role });
        }
        self.send_command(&Command::SpeedPush(speed));
        self.commit(speed);
        Ok(())
    }

    /// Emit one Active Sensing byte if the link runs above 1x.
    ///
    /// At 1x the link obeys standard MIDI semantics and nothing is sent.
    pub fn send_active_sense(&mut self) {
        if self.current_speed == SpeedMultiplier::X1 {
            return;
        }
        self.transport.send(&[ACTIVE_SENSING]);
        self.last_sense_tx_ms = self.transport.now_ms();
    }

    /// Run the two-round live test at `probe`, reverting to 1x on failure.
    fn run_speed_test(&mut self, probe: SpeedMultiplier) -> Result<(), NegotiationError> {
        // Breathing window: give the peer time to flush its pending
        // transmit and reconfigure before bytes arrive at the new rate.
        self.transport.send(&[0u8; 16]);
        self.transport.delay_ms(10);
        self.commit(probe);

        self.send_command(&Command::SpeedTest(TEST_PATTERN));
        let echoed = self.wait_for(
            TEST_REPLY_TIMEOUT_MS,
            |c| matches!(c, Command::SpeedResult(p) if *p == TEST_PATTERN),
        );
        if echoed.is_none() {
            warn!(%probe, "no speed result, reverting to 1x");
            self.commit(SpeedMultiplier::X1);
            return Err(NegotiationError::TestFailed { probe });
        }

        self.send_command(&Command::SpeedTest2);
        if self
            .wait_for(TEST_REPLY_TIMEOUT_MS, |c| matches!(c, Command::SpeedResult2))
            .is_none()
        {
            warn!(%probe, "no second speed result, reverting to 1x");
            self.commit(SpeedMultiplier::X1);
            return Err(NegotiationError::TestFailed { probe });
        }

        Ok(())
    }

    /// Poll the receive path until a wanted command arrives or the window
    /// closes. Unrelated frames are dispatched normally in the meantime.
    fn wait_for(
        &mut self,
        timeout_ms: u32,
        want: impl Fn(&Command) -> bool + Copy,
    ) -> Option<Command> {
        let start = self.transport.now_ms();
        loop {
            if let Some(command) = self.pump(want) {
                return Some(command);
            }
            self.check_timeouts();
            if self.transport.now_ms().wrapping_sub(start) >= timeout_ms {
                return None;
            }
            self.transport.delay_ms(1);
        }
    }

    /// Drain the transport, dispatching every complete valid frame except
    /// the first one matching `want`, which is returned instead.
    fn pump(&mut self, want: impl Fn(&Command) -> bool) -> Option<Command> {
        let mut captured = None;
        let mut chunk = [0u8; 256];
        loop {
            let n = self.transport.recv(&mut chunk);
            if n == 0 {
                break;
            }
            self.last_rx_ms = self.transport.now_ms();
            for &byte in &chunk[..n] {
                let Some(command) = self.ingest(byte) else {
                    continue;
                };
                if captured.is_none() && want(&command) {
                    captured = Some(command);
                } else {
                    self.dispatch(command);
                }
            }
        }
        captured
    }

    /// Feed one byte to the reassembler; decode a frame when one completes.
    fn ingest(&mut self, byte: u8) -> Option<Command> {
        let frame = self.reassembler.push(byte)?;
        match protocol::decode(frame) {
            Ok(command) => Some(command),
            Err(err) => {
                trace!(%err, "frame rejected");
                None
            }
        }
    }

    /// React to one validated command, honoring role and test state.
    fn dispatch(&mut self, command: Command) {
        match command {
            Command::SpeedRequest if self.role.may_answer() => {
                debug!(capabilities = %self.local_caps, "capability request answered");
                let answer = Command::SpeedAnswer(self.local_caps);
                self.send_command(&answer);
                if let Some(handler) = self.on_speed_request.as_mut() {
                    handler();
                }
            }
            Command::SpeedNegotiate { test, target } if self.role.may_answer() => {
                self.handle_negotiate(test, target);
            }
            Command::SpeedTest(pattern)
                if self.role.may_answer() && self.test_state == TestState::AwaitingTest =>
            {
                self.handle_speed_test(pattern);
            }
            Command::SpeedTest2
                if self.role.may_answer() && self.test_state == TestState::AwaitingTest2 =>
            {
                self.send_command(&Command::SpeedResult2);
                let target = self.pending_target_speed;
                self.test_state = TestState::Idle;
                self.commit(target);
            }
            // A push is honored in any role when locally supported.
            Command::SpeedPush(speed) => {
                if self.local_caps.has(speed) {
                    debug!(%speed, "speed pushed by peer");
                    self.commit(speed);
                } else {
                    debug!(%speed, "push for unsupported speed ignored");
                }
            }
            _ => {}
        }
    }

    /// Answer a SpeedNegotiate proposal.
    fn handle_negotiate(&mut self, test: SpeedMultiplier, target: SpeedMultiplier) {
        if !self.local_caps.has(target) {
            // No NACK exists in the protocol; the master times out instead.
            debug!(%target, "negotiation for unsupported speed ignored");
            return;
        }

        self.send_command(&Command::SpeedAck);

        if target == SpeedMultiplier::X1
            || (self.local_caps.is_certified(target) && test == target)
        {
            self.commit(target);
        } else {
            self.pending_test_speed = test;
            self.pending_target_speed = target;
            self.test_state = TestState::AwaitingTest;
            debug!(probe = %test, %target, "awaiting live speed test");
        }
    }

    /// Verify the probe pattern and echo it at the probe speed.
    fn handle_speed_test(&mut self, pattern: [u8; 8]) {
        if pattern == TEST_PATTERN {
            let probe = self.pending_test_speed;
            self.commit(probe);
            self.send_command(&Command::SpeedResult(TEST_PATTERN));
            self.test_state = TestState::AwaitingTest2;
        } else {
            warn!("speed test pattern corrupt, reverting to 1x");
            self.test_state = TestState::Idle;
            self.commit(SpeedMultiplier::X1);
        }
    }

    /// Encode and transmit one command frame.
    fn send_command(&mut self, command: &Command) {
        trace!(command = %command.id(), "frame sent");
        self.transport.send(&command.encode());
    }

    /// Record the new speed, reconfigure the transport, notify the host.
    fn commit(&mut self, speed: SpeedMultiplier) {
        self.current_speed = speed;
        let baud = speed.baud_rate();
        self.transport.set_baud(baud);
        debug!(%speed, baud, "link speed committed");
        if let Some(handler) = self.on_speed_changed.as_mut() {
            handler(speed);
        }
    }

    /// Active Sensing watchdog: both rules apply only above 1x.
    fn check_timeouts(&mut self) {
        if self.current_speed == SpeedMultiplier::X1 {
            return;
        }
        let now = self.transport.now_ms();
        let silent_ms = now.wrapping_sub(self.last_rx_ms);
        if silent_ms > self.config.link_timeout_ms {
            warn!(silent_ms, "link silent, reverting to 1x");
            self.test_state = TestState::Idle;
            self.commit(SpeedMultiplier::X1);
        } else if now.wrapping_sub(self.last_sense_tx_ms) > self.config.active_sense_interval_ms {
            self.send_active_sense();
        }
    }
}
