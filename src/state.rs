//! Full game model: grid plus per-color snake records and frame counter.
use std::collections::HashMap;

use crate::grid::Grid;
use crate::snake::Snake;

/// The game is declared over at this frame, per `spec.md` §6.
pub const GAME_OVER_FRAME: u64 = 8192;

/// Grid + mapping color -> Snake + distinguished `my_snake`/`enemy_snake`
/// pointers + a monotonic frame counter. Produced once per tick by
/// [`crate::observer::observe`] and repeatedly cloned by
/// [`crate::transition::advance_game`] during search.
#[derive(Debug, Clone)]
pub struct GameState {
    /// the grid
    pub grid: Grid,
    /// snake records, keyed by color
    pub snakes: HashMap<u8, Snake>,
    /// this agent's color
    pub my_color: u8,
    /// the first non-`my_color` snake observed, if any
    pub enemy_color: Option<u8>,
    /// monotonic tick counter, 0 on the first observed frame
    pub frame_no: u64,
}

impl GameState {
    /// this agent's snake record
    pub fn my_snake(&self) -> Option<&Snake> {
        self.snakes.get(&self.my_color)
    }

    /// this agent's snake record, mutably
    pub fn my_snake_mut(&mut self) -> Option<&mut Snake> {
        self.snakes.get_mut(&self.my_color)
    }

    /// the bound enemy's snake record, if one has been bound
    pub fn enemy_snake(&self) -> Option<&Snake> {
        self.enemy_color.and_then(|c| self.snakes.get(&c))
    }

    /// whether this agent's snake is alive
    pub fn i_am_alive(&self) -> bool {
        self.my_snake().map(|s| s.alive).unwrap_or(false)
    }

    /// whether the bound enemy is alive
    pub fn enemy_is_alive(&self) -> bool {
        self.enemy_snake().map(|s| s.alive).unwrap_or(false)
    }

    /// checks the invariants of `spec.md` §3 that must hold after every
    /// Observer or Transition step. Intended for tests and debug assertions,
    /// not the search hot path.
    pub fn assert_consistent(&self) -> bool {
        for (&color, snake) in self.snakes.iter() {
            if !snake.alive {
                continue;
            }
            let head = self.grid.get(snake.head_pos);
            if head.color != color || head.kind != crate::types::CellKind::Head {
                return false;
            }
            let tail = self.grid.get(snake.tail_pos);
            if tail.color != color || tail.kind != crate::types::CellKind::Tail {
                return false;
            }
            let counted = self
                .grid
                .iter()
                .filter(|(_, _, c)| c.color == color && c.kind.is_live_segment())
                .count() as i32;
            if counted != snake.length {
                return false;
            }
            if snake.grow < 0 {
                return false;
            }
        }
        true
    }
}
