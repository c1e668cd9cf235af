//! Position book: the engine's only mutable trading state.
//!
//! Holding both legs inside one `BothOpen` variant keeps the hedge pair
//! from drifting apart; every transition is spelled out below.
//!
//! | from       | open long  | open short | close long | close short |
//! |------------|------------|------------|------------|-------------|
//! | Flat       | LongOpen   | ShortOpen  | -          | -           |
//! | LongOpen   | error      | BothOpen   | Flat       | -           |
//! | ShortOpen  | BothOpen   | error      | -          | Flat        |
//! | BothOpen   | error      | error      | ShortOpen  | LongOpen    |

use std::mem;

use serde::Serialize;

use crate::domain::{Direction, Position};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookError {
    #[error("a {0} position is already open")]
    SideOccupied(Direction),
}

/// Open positions, at most one per side.
#[derive(Debug, Clone, Default, Serialize)]
pub enum PositionBook {
    #[default]
    Flat,
    LongOpen(Position),
    ShortOpen(Position),
    BothOpen {
        long: Position,
        short: Position,
    },
}

impl PositionBook {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionBook::Flat)
    }

    pub fn is_hedged(&self) -> bool {
        matches!(self, PositionBook::BothOpen { .. })
    }

    /// The only open position, when exactly one is open.
    pub fn single(&self) -> Option<&Position> {
        match self {
            PositionBook::LongOpen(p) | PositionBook::ShortOpen(p) => Some(p),
            _ => None,
        }
    }

    pub fn single_mut(&mut self) -> Option<&mut Position> {
        match self {
            PositionBook::LongOpen(p) | PositionBook::ShortOpen(p) => Some(p),
            _ => None,
        }
    }

    pub fn get(&self, side: Direction) -> Option<&Position> {
        match (self, side) {
            (PositionBook::LongOpen(p), Direction::Long)
            | (PositionBook::ShortOpen(p), Direction::Short)
            | (PositionBook::BothOpen { long: p, .. }, Direction::Long)
            | (PositionBook::BothOpen { short: p, .. }, Direction::Short) => Some(p),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, side: Direction) -> Option<&mut Position> {
        match (self, side) {
            (PositionBook::LongOpen(p), Direction::Long)
            | (PositionBook::ShortOpen(p), Direction::Short)
            | (PositionBook::BothOpen { long: p, .. }, Direction::Long)
            | (PositionBook::BothOpen { short: p, .. }, Direction::Short) => Some(p),
            _ => None,
        }
    }

    pub fn has(&self, side: Direction) -> bool {
        self.get(side).is_some()
    }

    pub fn open_count(&self) -> usize {
        match self {
            PositionBook::Flat => 0,
            PositionBook::LongOpen(_) | PositionBook::ShortOpen(_) => 1,
            PositionBook::BothOpen { .. } => 2,
        }
    }

    /// Add a position on its side. Fails, leaving the book unchanged, when
    /// that side is already occupied.
    pub fn open(&mut self, position: Position) -> Result<(), BookError> {
        let side = position.direction;
        if self.has(side) {
            return Err(BookError::SideOccupied(side));
        }
        *self = match (mem::take(self), side) {
            (PositionBook::Flat, Direction::Long) => PositionBook::LongOpen(position),
            (PositionBook::Flat, Direction::Short) => PositionBook::ShortOpen(position),
            (PositionBook::LongOpen(long), Direction::Short) => PositionBook::BothOpen {
                long,
                short: position,
            },
            (PositionBook::ShortOpen(short), Direction::Long) => PositionBook::BothOpen {
                long: position,
                short,
            },
            // occupied sides were rejected above
            (book, _) => book,
        };
        Ok(())
    }

    /// Remove and return the position on `side`, if any.
    pub fn close_side(&mut self, side: Direction) -> Option<Position> {
        let (book, closed) = match (mem::take(self), side) {
            (PositionBook::LongOpen(p), Direction::Long) => (PositionBook::Flat, Some(p)),
            (PositionBook::ShortOpen(p), Direction::Short) => (PositionBook::Flat, Some(p)),
            (PositionBook::BothOpen { long, short }, Direction::Long) => {
                (PositionBook::ShortOpen(short), Some(long))
            }
            (PositionBook::BothOpen { long, short }, Direction::Short) => {
                (PositionBook::LongOpen(long), Some(short))
            }
            (book, _) => (book, None),
        };
        *self = book;
        closed
    }

    /// Remove every open position, long first.
    pub fn close_all(&mut self) -> Vec<Position> {
        match mem::take(self) {
            PositionBook::Flat => Vec::new(),
            PositionBook::LongOpen(p) | PositionBook::ShortOpen(p) => vec![p],
            PositionBook::BothOpen { long, short } => vec![long, short],
        }
    }

    /// Open positions, long first.
    pub fn positions(&self) -> Vec<&Position> {
        match self {
            PositionBook::Flat => Vec::new(),
            PositionBook::LongOpen(p) | PositionBook::ShortOpen(p) => vec![p],
            PositionBook::BothOpen { long, short } => vec![long, short],
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            PositionBook::Flat => "Flat",
            PositionBook::LongOpen(_) => "LongOpen",
            PositionBook::ShortOpen(_) => "ShortOpen",
            PositionBook::BothOpen { .. } => "BothOpen",
        }
    }
}
