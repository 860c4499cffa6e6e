//! Property tests for apply/undo and the legality filter.
//!
//! Each case walks a random line of legal moves from one of a few seed
//! positions, choosing moves by index so shrinking stays meaningful.

use proptest::prelude::*;
use tern_core::{CastleSide, MoveKind, PositionRecord};
use tern_engine::{castle_path_is_safe, legal_moves, pseudo_legal_moves, Engine, Position};

const SEEDS: [&str; 4] = [
    tern_core::STARTPOS,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
];

fn line() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (0..SEEDS.len(), prop::collection::vec(any::<usize>(), 0..40))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn undo_restores_every_step((seed, choices) in line()) {
        let engine = Engine::new();
        let mut position = Position::from_fen(&engine, SEEDS[seed]).unwrap();
        let mut records: Vec<(PositionRecord, u64)> = Vec::new();

        for choice in choices {
            let moves = legal_moves(&mut position);
            if moves.is_empty() {
                break;
            }
            records.push((position.to_record(), position.hash()));
            position.apply(moves[choice % moves.len()]);
            prop_assert_eq!(position.hash(), position.hash_board());
            prop_assert!(position.to_record().validate().is_ok());
        }

        while let Some((record, hash)) = records.pop() {
            prop_assert!(position.undo().is_some());
            prop_assert_eq!(position.to_record(), record);
            prop_assert_eq!(position.hash(), hash);
        }
        prop_assert_eq!(position.to_fen(), SEEDS[seed]);
        prop_assert_eq!(position.undo(), None);
    }

    #[test]
    fn legal_filter_is_exact((seed, choices) in line()) {
        let engine = Engine::new();
        let mut position = Position::from_fen(&engine, SEEDS[seed]).unwrap();

        for choice in choices {
            let legal = legal_moves(&mut position);
            for &mv in pseudo_legal_moves(&position).iter() {
                let expected = if mv.kind() == MoveKind::Castle {
                    let side = CastleSide::from_king_target(mv.to()).unwrap();
                    castle_path_is_safe(&position, side)
                } else {
                    let guard = position.make(mv);
                    !guard.king_capturable()
                };
                prop_assert_eq!(legal.contains(mv), expected, "{} in {}", mv, position.to_fen());
            }
            if legal.is_empty() {
                break;
            }
            position.apply(legal[choice % legal.len()]);
            prop_assert!(!position.king_capturable());
        }
    }

    #[test]
    fn fen_survives_random_play((seed, choices) in line()) {
        let engine = Engine::new();
        let mut position = Position::from_fen(&engine, SEEDS[seed]).unwrap();

        for choice in choices {
            let moves = legal_moves(&mut position);
            if moves.is_empty() {
                break;
            }
            position.apply(moves[choice % moves.len()]);
        }

        let reparsed = Position::from_fen(&engine, &position.to_fen()).unwrap();
        prop_assert_eq!(reparsed.to_record(), position.to_record());
        prop_assert_eq!(reparsed.hash(), position.hash());
    }
}
