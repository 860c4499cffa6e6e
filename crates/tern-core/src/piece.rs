//! Piece codes.
//!
//! A piece is a 5-bit value: two color bits above a 3-bit type tag. The type
//! tags are chosen so that sliding behavior can be read straight off the bits:
//! bit `0b100` marks a slider, `0b110` a straight slider and `0b101` a
//! diagonal one. Code 0 is an empty square.

use crate::Color;

/// The six piece types, tagged with their 3-bit type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    King = 0b001,
    Pawn = 0b010,
    Knight = 0b011,
    Bishop = 0b101,
    Rook = 0b110,
    Queen = 0b111,
}

impl PieceKind {
    /// All piece types in dense index order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    const SLIDER: u8 = 0b100;
    const STRAIGHT: u8 = 0b110;
    const DIAGONAL: u8 = 0b101;

    /// Returns the 3-bit type code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a 3-bit type code. Returns `None` for 0 and the unused 0b100.
    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b001 => Some(PieceKind::King),
            0b010 => Some(PieceKind::Pawn),
            0b011 => Some(PieceKind::Knight),
            0b101 => Some(PieceKind::Bishop),
            0b110 => Some(PieceKind::Rook),
            0b111 => Some(PieceKind::Queen),
            _ => None,
        }
    }

    /// Dense index (0-5) for per-type tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    #[inline]
    pub const fn is_slider(self) -> bool {
        self.code() & Self::SLIDER != 0
    }

    /// True for rooks and queens.
    #[inline]
    pub const fn slides_straight(self) -> bool {
        self.code() & Self::STRAIGHT == Self::STRAIGHT
    }

    /// True for bishops and queens.
    #[inline]
    pub const fn slides_diagonally(self) -> bool {
        self.code() & Self::DIAGONAL == Self::DIAGONAL
    }

    /// Lowercase FEN letter.
    pub const fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Parses a FEN letter of either case.
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// A colored piece, packed as `color bit | type code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece(u8);

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece(color.code() | kind.code())
    }

    /// Decodes a packed 5-bit code. Code 0 (an empty square) and codes with
    /// no or both color bits yield `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        let color_bits = code & (Color::WHITE_BIT | Color::BLACK_BIT);
        if color_bits != Color::WHITE_BIT && color_bits != Color::BLACK_BIT {
            return None;
        }
        if code & !(Color::WHITE_BIT | Color::BLACK_BIT | 0b111) != 0 {
            return None;
        }
        match PieceKind::from_code(code & 0b111) {
            Some(_) => Some(Piece(code)),
            None => None,
        }
    }

    /// Returns the packed 5-bit code.
    #[inline]
    pub const fn code(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn color(self) -> Color {
        if self.0 & Color::WHITE_BIT != 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline]
    pub const fn kind(self) -> PieceKind {
        match PieceKind::from_code(self.0 & 0b111) {
            Some(kind) => kind,
            None => unreachable!(),
        }
    }

    #[inline]
    pub const fn is(self, color: Color, kind: PieceKind) -> bool {
        self.0 == color.code() | kind.code()
    }

    /// FEN letter, uppercase for white.
    pub const fn to_fen_char(self) -> char {
        let c = self.kind().to_char();
        match self.color() {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match PieceKind::from_char(c) {
            Some(kind) => Some(Piece::new(color, kind)),
            None => None,
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_fen_char())
    }
}
