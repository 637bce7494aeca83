//! Per-snake metadata and head-position history.
use std::collections::VecDeque;

use crate::types::{Direction, Position};

/// A single snake's tracked metadata. Mutated only by the Observer (from
/// external snapshots) and by [`crate::transition::advance_game`] (during
/// search); never deleted once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    /// whether this snake is currently alive
    pub alive: bool,
    /// position of this snake's head cell
    pub head_pos: Position,
    /// position of this snake's tail cell
    pub tail_pos: Position,
    /// color, 1..=7
    pub color: u8,
    /// number of cells of kinds {Head, Body, Tail} with this color, recomputed each tick
    pub length: i32,
    /// accumulated score
    pub score: i64,
    /// definite remaining growth ticks, always >= 0
    pub grow: i32,
    /// true when knowledge of `grow` is incomplete
    pub grow_uncertain: bool,
    /// previous head positions, most-recent first, not including the current head.
    /// May be shorter than `length - 1` under incomplete knowledge.
    pub head_history: VecDeque<Position>,
}

impl Snake {
    /// builds a freshly observed snake. `grow_uncertain` starts true until
    /// the Observer can establish a full head history.
    pub fn new(alive: bool, head_pos: Position, tail_pos: Position, color: u8) -> Self {
        Snake {
            alive,
            head_pos,
            tail_pos,
            color,
            length: 0,
            score: 0,
            grow: 0,
            grow_uncertain: true,
            head_history: VecDeque::new(),
        }
    }

    /// the direction this snake is currently moving, inferred from the most
    /// recent entry in `head_history`. `None` if no history is known.
    pub fn direction(&self) -> Option<Direction> {
        let prev = *self.head_history.front()?;
        Direction::from_vector(self.head_pos.sub(prev))
    }
}
