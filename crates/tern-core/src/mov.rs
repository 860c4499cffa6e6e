//! Packed moves.
//!
//! A move is 16 bits: bits 0-5 hold the start square, bits 6-11 the
//! destination and bits 12-15 the [`MoveKind`]. Capture kinds carry the
//! victim's type code in their low three bits so move ordering can rank
//! captures by victim without touching the board.

use crate::{PieceKind, Square};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What a move does besides relocating the moving piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Non-capturing move with no side effects.
    Quiet = 0,
    /// King move of two files; the rook jumps over it.
    Castle = 1,
    /// Pawn capture of a pawn that just double-pushed past it.
    EnPassant = 2,
    /// Pawn advance of two ranks from its home rank.
    DoublePush = 3,
    PromoteBishop = 4,
    PromoteKnight = 5,
    PromoteRook = 6,
    PromoteQueen = 7,
    CaptureKing = 9,
    CapturePawn = 10,
    CaptureKnight = 11,
    CaptureBishop = 13,
    CaptureRook = 14,
    CaptureQueen = 15,
}

impl MoveKind {
    const CAPTURE_BIT: u8 = 0b1000;

    /// Decodes a 4-bit kind. Codes 8 and 12 are unused.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MoveKind::Quiet),
            1 => Some(MoveKind::Castle),
            2 => Some(MoveKind::EnPassant),
            3 => Some(MoveKind::DoublePush),
            4 => Some(MoveKind::PromoteBishop),
            5 => Some(MoveKind::PromoteKnight),
            6 => Some(MoveKind::PromoteRook),
            7 => Some(MoveKind::PromoteQueen),
            9 => Some(MoveKind::CaptureKing),
            10 => Some(MoveKind::CapturePawn),
            11 => Some(MoveKind::CaptureKnight),
            13 => Some(MoveKind::CaptureBishop),
            14 => Some(MoveKind::CaptureRook),
            15 => Some(MoveKind::CaptureQueen),
            _ => None,
        }
    }

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The capture kind for taking a piece of type `victim`.
    #[inline]
    pub const fn capture(victim: PieceKind) -> Self {
        match victim {
            PieceKind::King => MoveKind::CaptureKing,
            PieceKind::Pawn => MoveKind::CapturePawn,
            PieceKind::Knight => MoveKind::CaptureKnight,
            PieceKind::Bishop => MoveKind::CaptureBishop,
            PieceKind::Rook => MoveKind::CaptureRook,
            PieceKind::Queen => MoveKind::CaptureQueen,
        }
    }

    /// The promotion kind for `piece`; `None` for pawns and kings.
    #[inline]
    pub const fn promotion(piece: PieceKind) -> Option<Self> {
        match piece {
            PieceKind::Bishop => Some(MoveKind::PromoteBishop),
            PieceKind::Knight => Some(MoveKind::PromoteKnight),
            PieceKind::Rook => Some(MoveKind::PromoteRook),
            PieceKind::Queen => Some(MoveKind::PromoteQueen),
            PieceKind::Pawn | PieceKind::King => None,
        }
    }

    /// True for the victim-tagged capture kinds. En passant and capturing
    /// promotions are encoded by their own kinds.
    #[inline]
    pub const fn is_capture(self) -> bool {
        self.code() & Self::CAPTURE_BIT != 0
    }

    /// Victim type of a capture kind.
    #[inline]
    pub const fn captured(self) -> Option<PieceKind> {
        if self.is_capture() {
            PieceKind::from_code(self.code() & 0b111)
        } else {
            None
        }
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.code() & 0b1100 == 0b0100
    }

    #[inline]
    pub const fn promotion_piece(self) -> Option<PieceKind> {
        match self {
            MoveKind::PromoteBishop => Some(PieceKind::Bishop),
            MoveKind::PromoteKnight => Some(PieceKind::Knight),
            MoveKind::PromoteRook => Some(PieceKind::Rook),
            MoveKind::PromoteQueen => Some(PieceKind::Queen),
            _ => None,
        }
    }

    /// Promotion to rook or bishop, which a queen promotion always dominates.
    #[inline]
    pub const fn is_underpromotion(self) -> bool {
        matches!(self, MoveKind::PromoteBishop | MoveKind::PromoteRook)
    }

    /// Ordering priority, higher first: captures by victim value, then
    /// promotions, en passant, castling, double pushes and quiet moves.
    pub const fn priority(self) -> u8 {
        match self {
            MoveKind::CaptureKing => 13,
            MoveKind::CaptureQueen => 12,
            MoveKind::CaptureRook => 11,
            MoveKind::CaptureBishop => 10,
            MoveKind::CaptureKnight => 9,
            MoveKind::CapturePawn => 8,
            MoveKind::PromoteQueen => 7,
            MoveKind::PromoteKnight => 6,
            MoveKind::PromoteRook => 5,
            MoveKind::PromoteBishop => 4,
            MoveKind::EnPassant => 3,
            MoveKind::Castle => 2,
            MoveKind::DoublePush => 1,
            MoveKind::Quiet => 0,
        }
    }
}

/// A packed move. There is no null value; absence is `Option<Move>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Move((from.index() as u16) | ((to.index() as u16) << 6) | ((kind.code() as u16) << 12))
    }

    /// Decodes a raw 16-bit value, rejecting unused kind codes.
    #[inline]
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match MoveKind::from_code((raw >> 12) as u8) {
            Some(_) => Some(Move(raw)),
            None => None,
        }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square::from_bits(self.0 as u32)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square::from_bits((self.0 >> 6) as u32)
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        match MoveKind::from_code((self.0 >> 12) as u8) {
            Some(kind) => kind,
            None => unreachable!(),
        }
    }

    /// Returns UCI notation, e.g. "e2e4" or "e7e8q".
    pub fn to_uci(self) -> String {
        match self.kind().promotion_piece() {
            Some(piece) => format!("{}{}{}", self.from(), self.to(), piece.to_char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {:?})", self.to_uci(), self.kind())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("invalid move '{0}': expected 4 or 5 characters")]
    InvalidLength(String),

    #[error("invalid square in move '{0}'")]
    InvalidSquare(String),

    #[error("invalid promotion piece '{0}'")]
    InvalidPromotion(char),
}

/// A move as written in UCI notation. It names squares and an optional
/// promotion but not the kind; a position resolves it to a [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl UciMove {
    /// True if `mv` is the move this notation describes.
    pub fn matches(&self, mv: Move) -> bool {
        mv.from() == self.from && mv.to() == self.to && mv.kind().promotion_piece() == self.promotion
    }
}

impl FromStr for UciMove {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return Err(MoveParseError::InvalidLength(s.to_string()));
        }
        let from = Square::from_algebraic(&s[0..2])
            .ok_or_else(|| MoveParseError::InvalidSquare(s.to_string()))?;
        let to = Square::from_algebraic(&s[2..4])
            .ok_or_else(|| MoveParseError::InvalidSquare(s.to_string()))?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_char(c) {
                Some(kind) if MoveKind::promotion(kind).is_some() => Some(kind),
                _ => return Err(MoveParseError::InvalidPromotion(c)),
            },
        };
        Ok(UciMove {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}
