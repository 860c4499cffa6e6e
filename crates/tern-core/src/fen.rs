//! FEN (Forsyth-Edwards Notation) reading and writing for position records.
//!
//! The clock fields are optional on input: four-field FEN as printed by many
//! tools is accepted and gets a halfmove clock of 0 and fullmove number 1.

use crate::{CastlingRights, Color, File, Piece, PositionRecord, Rank, RecordError, Square};
use thiserror::Error;

/// The standard starting position.
pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 or 6 fields, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl PositionRecord {
    /// Parses and validates a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 4 && parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let mut record = PositionRecord::empty();
        parse_placement(parts[0], &mut record)?;

        record.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        record.castling = CastlingRights::from_fen(parts[2])
            .ok_or_else(|| FenError::InvalidCastlingRights(parts[2].to_string()))?;

        record.en_passant = parse_en_passant(parts[3], record.side_to_move)?;

        if parts.len() == 6 {
            record.halfmove_clock = parts[4]
                .parse::<u8>()
                .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
            record.fullmove_number = parts[5]
                .parse::<u16>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;
        }

        record.validate()?;
        Ok(record)
    }

    /// Writes the record as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in Rank::ALL.into_iter().rev() {
            let mut empty = 0;
            for file in File::ALL {
                match self.get(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank != Rank::R1 {
                fen.push('/');
            }
        }

        let en_passant = match self.en_passant {
            // Target square sits behind the pawn that just pushed.
            Some(file) => {
                let rank = match self.side_to_move {
                    Color::White => Rank::R6,
                    Color::Black => Rank::R3,
                };
                Square::new(file, rank).to_algebraic()
            }
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            fen,
            self.side_to_move.fen_char(),
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn parse_placement(placement: &str, record: &mut PositionRecord) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (rank, row) in Rank::ALL.into_iter().rev().zip(ranks) {
        let mut file = 0u8;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += skip as u8;
            } else if let Some(piece) = Piece::from_fen_char(c) {
                if let Some(f) = File::from_index(file) {
                    record.set(Square::new(f, rank), Some(piece));
                }
                file += 1;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{}' in rank {}",
                    c, rank
                )));
            }
            if file > 8 {
                break;
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {} has {} squares, expected 8",
                rank, file
            )));
        }
    }

    Ok(())
}

fn parse_en_passant(field: &str, side_to_move: Color) -> Result<Option<File>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let target_rank = match side_to_move {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    };
    match Square::from_algebraic(field) {
        Some(sq) if sq.rank() == target_rank => Ok(Some(sq.file())),
        _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceKind;

    #[test]
    fn parse_startpos() {
        let record = PositionRecord::from_fen(STARTPOS).unwrap();
        assert_eq!(record, PositionRecord::startpos());
    }

    #[test]
    fn roundtrip() {
        for fen in [
            STARTPOS,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        ] {
            assert_eq!(PositionRecord::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn four_field_fen_gets_default_clocks() {
        let record =
            PositionRecord::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -")
                .unwrap();
        assert_eq!(record.halfmove_clock, 0);
        assert_eq!(record.fullmove_number, 1);
        assert_eq!(record.to_fen(), STARTPOS);
    }

    #[test]
    fn en_passant_field_becomes_file() {
        let record = PositionRecord::from_fen(
            "rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3",
        )
        .unwrap();
        assert_eq!(record.en_passant, Some(File::E));
    }

    #[test]
    fn halfmove_clock_must_fit_a_byte() {
        let record = PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 255 200").unwrap();
        assert_eq!(record.halfmove_clock, u8::MAX);
        assert_eq!(record.fullmove_number, 200);

        assert_eq!(
            PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 300 200"),
            Err(FenError::InvalidHalfmoveClock("300".to_string()))
        );
    }

    #[test]
    fn placement_errors() {
        assert!(matches!(
            PositionRecord::from_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            PositionRecord::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            PositionRecord::from_fen("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            PositionRecord::from_fen("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn field_errors() {
        assert!(matches!(
            PositionRecord::from_fen("invalid"),
            Err(FenError::InvalidPartCount(1))
        ));
        assert!(matches!(
            PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1"),
            Err(FenError::InvalidActiveColor(_))
        ));
        assert!(matches!(
            PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 w XYZ - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
        assert!(matches!(
            PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 w - e4 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(matches!(
            PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 w - e3 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(matches!(
            PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 w - - abc 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 0"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn record_validation_runs_at_the_boundary() {
        assert!(matches!(
            PositionRecord::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::Record(RecordError::KingCount { .. }))
        ));
        assert!(matches!(
            PositionRecord::from_fen("4k3/8/8/8/8/8/8/4K3 w K - 0 1"),
            Err(FenError::Record(RecordError::CastlingWithoutPieces { .. }))
        ));
    }

    #[test]
    fn pieces_land_on_expected_squares() {
        let record = PositionRecord::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(
            record.get(Square::from_algebraic("e5").unwrap()),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );
        assert_eq!(
            record.get(Square::from_algebraic("h3").unwrap()),
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );
        assert_eq!(record.get(Square::from_algebraic("b1").unwrap()), None);
    }

    #[test]
    fn error_display() {
        let err = FenError::InvalidPartCount(3);
        assert!(format!("{}", err).contains("3"));
        let err = FenError::InvalidEnPassantSquare("z9".to_string());
        assert!(format!("{}", err).contains("z9"));
    }
}
