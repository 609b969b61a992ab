//! TurboMIDI frame codec (encode/decode)
//!
//! Builds and validates vendor SysEx frames of the form
//! `F0 <manufacturer:5> <command:1> <payload:n> F7`.

use super::{
    Command, CommandId, Error, MANUFACTURER_ID, MIN_FRAME_LEN, Result, SpeedCapabilities,
    SpeedMultiplier, SYSEX_END, SYSEX_START,
};

/// Encode a command into a complete SysEx frame
///
/// Every frame is the fixed manufacturer prefix, the command byte, the
/// command's fixed-length payload, and the terminator.
#[must_use]
pub fn encode(command: &Command) -> Vec<u8> {
    let id = command.id();
    let mut frame = Vec::with_capacity(id.frame_len());

    frame.push(SYSEX_START);
    frame.extend_from_slice(&MANUFACTURER_ID);
    frame.push(id.as_u8());

    match command {
        Command::SpeedRequest
        | Command::SpeedAck
        | Command::SpeedTest2
        | Command::SpeedResult2 => {}
        Command::SpeedAnswer(caps) => frame.extend_from_slice(&caps.to_bytes()),
        Command::SpeedNegotiate { test, target } => {
            frame.push(test.wire_id());
            frame.push(target.wire_id());
        }
        Command::SpeedTest(pattern) | Command::SpeedResult(pattern) => {
            frame.extend_from_slice(pattern);
        }
        Command::SpeedPush(speed) => frame.push(speed.wire_id()),
    }

    frame.push(SYSEX_END);
    frame
}

/// Decode and validate a candidate SysEx frame
///
/// # Errors
///
/// Returns an error if:
/// - The frame is shorter than the 8-byte minimum
/// - The SysEx start or end marker is missing
/// - The manufacturer prefix is not the Elektron id
/// - The command byte is unknown
/// - The total length does not equal the command's fixed frame length
/// - A payload speed id maps to no defined multiplier
pub fn decode(frame: &[u8]) -> Result<Command> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(Error::FrameTooShort {
            len: frame.len(),
            min: MIN_FRAME_LEN,
        });
    }

    if frame[0] != SYSEX_START {
        return Err(Error::MissingSysexStart { found: frame[0] });
    }
    let last = frame[frame.len() - 1];
    if last != SYSEX_END {
        return Err(Error::MissingSysexEnd { found: last });
    }

    for (i, &expected) in MANUFACTURER_ID.iter().enumerate() {
        let found = frame[i + 1];
        if found != expected {
            return Err(Error::WrongManufacturer {
                index: i + 1,
                found,
            });
        }
    }

    let command_byte = frame[6];
    let id = CommandId::from_u8(command_byte).ok_or(Error::UnknownCommand { id: command_byte })?;

    if frame.len() != id.frame_len() {
        return Err(Error::LengthMismatch {
            command: command_byte,
            len: frame.len(),
            expected: id.frame_len(),
        });
    }

    let payload = &frame[7..frame.len() - 1];
    let command = match id {
        CommandId::SpeedRequest => Command::SpeedRequest,
        CommandId::SpeedAck => Command::SpeedAck,
        CommandId::SpeedTest2 => Command::SpeedTest2,
        CommandId::SpeedResult2 => Command::SpeedResult2,
        CommandId::SpeedAnswer => Command::SpeedAnswer(SpeedCapabilities::from_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ])),
        CommandId::SpeedNegotiate => Command::SpeedNegotiate {
            test: speed_from_wire(payload[0])?,
            target: speed_from_wire(payload[1])?,
        },
        CommandId::SpeedTest => Command::SpeedTest(payload.try_into().expect("length checked")),
        CommandId::SpeedResult => Command::SpeedResult(payload.try_into().expect("length checked")),
        CommandId::SpeedPush => Command::SpeedPush(speed_from_wire(payload[0])?),
    };

    Ok(command)
}

fn speed_from_wire(id: u8) -> Result<SpeedMultiplier> {
    SpeedMultiplier::from_wire_id(id).ok_or(Error::UnknownSpeedId { id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TEST_PATTERN;

    #[test]
    fn test_encode_speed_request() {
        let frame = encode(&Command::SpeedRequest);
        assert_eq!(frame, [0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x10, 0xF7]);
    }

    #[test]
    fn test_encode_speed_answer() {
        let mut caps = SpeedCapabilities::new();
        caps.add(SpeedMultiplier::X2, true);
        caps.add(SpeedMultiplier::X4, true);

        let frame = encode(&Command::SpeedAnswer(caps));
        assert_eq!(
            frame,
            [0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x11, 0x05, 0x00, 0x05, 0x00, 0xF7]
        );
    }

    #[test]
    fn test_encode_speed_negotiate() {
        let frame = encode(&Command::SpeedNegotiate {
            test: SpeedMultiplier::X4,
            target: SpeedMultiplier::X2,
        });
        assert_eq!(
            frame,
            [0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x12, 0x04, 0x02, 0xF7]
        );
    }

    #[test]
    fn test_encode_speed_test() {
        let frame = encode(&Command::SpeedTest(TEST_PATTERN));
        assert_eq!(
            frame,
            [
                0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x14, 0x55, 0x55, 0x55, 0x55, 0x00, 0x00,
                0x00, 0x00, 0xF7
            ]
        );
    }

    #[test]
    fn test_encode_speed_push() {
        let frame = encode(&Command::SpeedPush(SpeedMultiplier::X8));
        assert_eq!(frame, [0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x20, 0x07, 0xF7]);
    }

    #[test]
    fn test_decode_wrong_manufacturer() {
        let frame = [0xF0, 0x00, 0x20, 0x3D, 0x00, 0x00, 0x20, 0x02, 0xF7];
        let result = decode(&frame);
        assert!(matches!(
            result,
            Err(Error::WrongManufacturer { index: 3, .. })
        ));
    }

    #[test]
    fn test_decode_too_short() {
        let frame = [0xF0, 0x00, 0x20, 0x3C, 0xF7];
        assert!(matches!(decode(&frame), Err(Error::FrameTooShort { .. })));
    }

    #[test]
    fn test_decode_missing_terminator() {
        let frame = [0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x20, 0x02];
        assert!(matches!(
            decode(&frame),
            Err(Error::MissingSysexEnd { found: 0x02 })
        ));
    }

    #[test]
    fn test_decode_unknown_command() {
        let frame = [0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x42, 0xF7];
        assert!(matches!(
            decode(&frame),
            Err(Error::UnknownCommand { id: 0x42 })
        ));
    }

    #[test]
    fn test_decode_length_mismatch() {
        // SpeedNegotiate with an extra payload byte
        let frame = [0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x12, 0x04, 0x02, 0x00, 0xF7];
        assert!(matches!(
            decode(&frame),
            Err(Error::LengthMismatch {
                command: 0x12,
                len: 11,
                expected: 10,
            })
        ));
    }

    #[test]
    fn test_decode_unknown_speed_id() {
        let frame = [0xF0, 0x00, 0x20, 0x3C, 0x00, 0x00, 0x20, 0x0C, 0xF7];
        assert!(matches!(
            decode(&frame),
            Err(Error::UnknownSpeedId { id: 0x0C })
        ));
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn speed_strategy() -> impl Strategy<Value = SpeedMultiplier> {
            prop::sample::select(SpeedMultiplier::ALL.to_vec())
        }

        fn caps_strategy() -> impl Strategy<Value = SpeedCapabilities> {
            prop::collection::vec((speed_strategy(), any::<bool>()), 0..8).prop_map(|entries| {
                let mut caps = SpeedCapabilities::new();
                for (speed, certified) in entries {
                    caps.add(speed, certified);
                }
                caps
            })
        }

        fn command_strategy() -> impl Strategy<Value = Command> {
            prop_oneof![
                Just(Command::SpeedRequest),
                caps_strategy().prop_map(Command::SpeedAnswer),
                (speed_strategy(), speed_strategy())
                    .prop_map(|(test, target)| Command::SpeedNegotiate { test, target }),
                Just(Command::SpeedAck),
                any::<[u8; 8]>().prop_map(|p| Command::SpeedTest(p.map(|b| b & 0x7F))),
                any::<[u8; 8]>().prop_map(|p| Command::SpeedResult(p.map(|b| b & 0x7F))),
                Just(Command::SpeedTest2),
                Just(Command::SpeedResult2),
                speed_strategy().prop_map(Command::SpeedPush),
            ]
        }

        proptest! {
            /// Every command survives an encode/decode round trip.
            #[test]
            fn prop_roundtrip_preserves_command(command in command_strategy()) {
                let frame = encode(&command);
                let decoded = decode(&frame).unwrap();
                prop_assert_eq!(decoded, command);
            }

            /// Every encoded frame has the shape required by the wire format.
            #[test]
            fn prop_frame_shape(command in command_strategy()) {
                let frame = encode(&command);
                prop_assert_eq!(frame[0], SYSEX_START);
                prop_assert_eq!(&frame[1..6], &MANUFACTURER_ID[..]);
                prop_assert_eq!(frame[6], command.id().as_u8());
                prop_assert_eq!(frame[frame.len() - 1], SYSEX_END);
                prop_assert_eq!(frame.len(), command.id().frame_len());
            }

            /// Truncating a frame always rejects it.
            #[test]
            fn prop_truncation_rejected(command in command_strategy(), cut in 1usize..8) {
                let frame = encode(&command);
                let cut = cut.min(frame.len() - 1);
                prop_assert!(decode(&frame[..frame.len() - cut]).is_err());
            }
        }
    }
}
