//! Integration tests: exercise complete protocol exchanges against a
//! recording transport and assert the exact write sequences the device
//! would observe.

#[cfg(test)]
mod tests {
    use crate::color::Color;
    use crate::error::Error;
    use crate::mode::{Direction, LightingMode};
    use crate::session::{apply, factory_reset, LightingRequest};
    use crate::transport::mock::{RecordingTransport, Write};

    /// Writes per complete session: 8 frames and 6 blocks.
    const SESSION_WRITES: usize = 14;

    fn opcodes(writes: &[Write]) -> Vec<u8> {
        writes
            .iter()
            .filter_map(|w| w.frame_bytes().map(|b| b[0]))
            .collect()
    }

    /// Test: factory reset followed by breathe, the full recovery-and-apply
    /// story a caller runs after a failed session.
    #[test]
    fn reset_then_breathe_sequence() {
        let mock = RecordingTransport::new();

        factory_reset(&mock).unwrap();
        apply(
            &mock,
            &LightingRequest {
                mode: LightingMode::Breathe,
                color: Color::new(0, 51, 0),
            },
        )
        .unwrap();

        let writes = mock.writes();
        assert_eq!(writes.len(), 2 * SESSION_WRITES);

        // Both sessions open with the same three-frame/one-block/one-frame
        // channel prologue.
        for session in writes.chunks(SESSION_WRITES) {
            assert_eq!(opcodes(session), [0x03, 0x01, 0x11, 0x0B, 0x0C, 0x0D, 0x10, 0x12]);
            assert_eq!(session[3].block_bytes().unwrap()[..2], [0x01, 0x02]);
            assert_eq!(session[6].block_bytes().unwrap()[..2], [0xFF, 0xFF]);
        }

        // The reset flow announces itself in the select frame; the apply
        // flow uses the regular code.
        assert_eq!(writes[5].frame_bytes().unwrap()[1], 0x02);
        assert_eq!(writes[SESSION_WRITES + 5].frame_bytes().unwrap()[1], 0x01);

        // Breathe selects mode 0x02 in the parameter table.
        let breathe_params = writes[SESSION_WRITES + 7].block_bytes().unwrap();
        assert_eq!(breathe_params[7], 0x02);

        // Breathe color table: four user triples, then the decorative
        // palette starting with its cyan entry.
        let table = writes[SESSION_WRITES + 10].block_bytes().unwrap();
        assert_eq!(&table[..12], &[0, 51, 0, 0, 51, 0, 0, 51, 0, 0, 51, 0]);
        assert_eq!(&table[12..15], &[0, 51, 51]);
    }

    /// Test: two solid applies differ only in the color table's user triples.
    #[test]
    fn solid_sessions_differ_only_in_color() {
        let black = RecordingTransport::new();
        apply(
            &black,
            &LightingRequest {
                mode: LightingMode::Solid,
                color: Color::BLACK,
            },
        )
        .unwrap();

        let white = RecordingTransport::new();
        apply(
            &white,
            &LightingRequest {
                mode: LightingMode::Solid,
                color: Color::new(51, 51, 51),
            },
        )
        .unwrap();

        let black = black.writes();
        let white = white.writes();
        for (i, (b, w)) in black.iter().zip(&white).enumerate() {
            if i == 10 {
                let b = b.block_bytes().unwrap();
                let w = w.block_bytes().unwrap();
                assert_eq!(&b[..6], &[0, 0, 0, 0, 0, 0]);
                assert_eq!(&w[..6], &[51, 51, 51, 51, 51, 51]);
                assert_eq!(b[6..], w[6..]);
            } else {
                assert_eq!(b, w);
            }
        }
    }

    /// Test: a write failure aborts the session where it happened and the
    /// next session starts again from the channel prologue.
    #[test]
    fn failed_session_restarts_from_scratch() {
        let flaky = RecordingTransport::failing_at(9);
        let err = apply(
            &flaky,
            &LightingRequest {
                mode: LightingMode::Floating {
                    speed: 5,
                    direction: Direction::Up,
                },
                color: Color::new(17, 17, 17),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(flaky.writes().len(), 9);

        // Recovery: a fresh transport and a factory reset run to completion.
        let recovered = RecordingTransport::new();
        factory_reset(&recovered).unwrap();
        assert_eq!(recovered.writes().len(), SESSION_WRITES);
    }
}
