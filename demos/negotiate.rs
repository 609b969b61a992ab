//! Walkthrough of a complete TurboMIDI negotiation over an in-memory link.
//!
//! Run with `cargo run --example negotiate`. Set `RUST_LOG=turbomidi=debug`
//! to watch the engine's own view of the exchange.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use turbomidi::{Command, DeviceRole, MidiTransport, SpeedMultiplier, TurboMidi};

struct LinkState {
    clock_ms: u32,
    to_slave: VecDeque<u8>,
    to_master: VecDeque<u8>,
}

type SlaveCell = Rc<RefCell<Option<TurboMidi<Port>>>>;

/// One endpoint of the demo link. The master's delays tick the slave, so
/// both engines make progress inside a single thread.
struct Port {
    link: Rc<RefCell<LinkState>>,
    master_side: bool,
    peer: SlaveCell,
}

impl MidiTransport for Port {
    fn send(&mut self, bytes: &[u8]) {
        let mut link = self.link.borrow_mut();
        let queue = if self.master_side {
            &mut link.to_slave
        } else {
            &mut link.to_master
        };
        queue.extend(bytes);
    }

    fn recv(&mut self, buf: &mut [u8]) -> usize {
        let mut link = self.link.borrow_mut();
        let queue = if self.master_side {
            &mut link.to_master
        } else {
            &mut link.to_slave
        };
        let n = buf.len().min(queue.len());
        for slot in &mut buf[..n] {
            *slot = queue.pop_front().unwrap();
        }
        n
    }

    fn now_ms(&self) -> u32 {
        self.link.borrow().clock_ms
    }

    fn set_baud(&mut self, _rate: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.link.borrow_mut().clock_ms += 1;
            if let Some(peer) = self.peer.borrow_mut().as_mut() {
                peer.tick();
            }
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turbomidi=info".into()),
        )
        .init();

    println!("TurboMIDI Negotiation Example");
    println!("=============================\n");

    // The frames a capability exchange is made of
    let request = Command::SpeedRequest.encode();
    println!("SpeedRequest on the wire:  {}", hex(&request));
    let push = Command::SpeedPush(SpeedMultiplier::X8).encode();
    println!("SpeedPush(8x) on the wire: {}\n", hex(&push));

    // Wire up two engines over an in-memory link
    let link = Rc::new(RefCell::new(LinkState {
        clock_ms: 0,
        to_slave: VecDeque::new(),
        to_master: VecDeque::new(),
    }));
    let slave_cell: SlaveCell = Rc::new(RefCell::new(None));

    let mut slave = TurboMidi::new(
        Port {
            link: Rc::clone(&link),
            master_side: false,
            peer: Rc::new(RefCell::new(None)),
        },
        DeviceRole::Slave,
    );
    // 4x works but has never been certified, so the master must prove it
    slave.set_supported(SpeedMultiplier::X4, false);
    slave.on_speed_changed(|speed| println!("  slave now at {speed}"));
    *slave_cell.borrow_mut() = Some(slave);

    let mut master = TurboMidi::new(
        Port {
            link: Rc::clone(&link),
            master_side: true,
            peer: slave_cell,
        },
        DeviceRole::Master,
    );
    master.on_speed_changed(|speed| println!("  master now at {speed}"));

    println!("Negotiating up to 4x (uncertified, probes at 5x):");
    match master.negotiate(SpeedMultiplier::X4, 30) {
        Ok(()) => println!(
            "Done: link at {} ({} baud)\n",
            master.current_speed(),
            master.current_speed().baud_rate()
        ),
        Err(err) => println!("Negotiation failed: {err}\n"),
    }

    println!("Dropping back to the base rate:");
    match master.negotiate(SpeedMultiplier::X1, 30) {
        Ok(()) => println!(
            "Done: link at {} ({} baud)",
            master.current_speed(),
            master.current_speed().baud_rate()
        ),
        Err(err) => println!("Negotiation failed: {err}"),
    }
}
