//! Turns a grid snapshot into a full [`GameState`] by differencing against
//! the previous tick.
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::grid::Grid;
use crate::snake::Snake;
use crate::state::GameState;
use crate::types::{CellKind, Position};

/// Observes what changed since the last tick and produces a new
/// [`GameState`]. `old_state` is `None` on the very first tick of a game.
/// `snapshot` must already be a decoded [`Grid`] (see [`crate::wire`] for
/// turning external input into one).
///
/// Implements `spec.md` §4.3 verbatim, including the re-tracing fallback for
/// snakes whose head moved in a way that cannot be explained by a single
/// step (a new snake, or a snake whose history we have lost track of).
pub fn observe(old_state: Option<&GameState>, snapshot: Grid, my_color: u8) -> GameState {
    let mut snakes: HashMap<u8, Snake> = old_state
        .map(|s| s.snakes.clone())
        .unwrap_or_default();
    let frame_no = old_state.map(|s| s.frame_no + 1).unwrap_or(0);

    // Step 1: elapse one tick of grow debt.
    for snake in snakes.values_mut() {
        snake.grow = (snake.grow - 1).max(0);
    }

    // Step 2: scan the new grid once.
    let mut heads_by_color: HashMap<u8, Position> = HashMap::new();
    let mut tails_by_color: HashMap<u8, Position> = HashMap::new();
    let mut lengths_by_color: HashMap<u8, i32> = HashMap::new();
    for (x, y, cell) in snapshot.iter() {
        let pos = Position::new(x, y);
        match cell.kind {
            CellKind::Head => {
                heads_by_color.insert(cell.color, pos);
            }
            CellKind::Tail => {
                tails_by_color.insert(cell.color, pos);
            }
            _ => {}
        }
        if cell.kind.is_live_segment() {
            *lengths_by_color.entry(cell.color).or_insert(0) += 1;
        }
    }

    let mut old_tails_by_color: HashMap<u8, Position> = HashMap::new();
    if let Some(old) = old_state {
        for (x, y, cell) in old.grid.iter() {
            if cell.kind == CellKind::Tail {
                old_tails_by_color.insert(cell.color, Position::new(x, y));
            }
        }
    }

    // Step 3: reconcile each observed head.
    for (&color, &head_pos) in heads_by_color.iter() {
        let mut needs_trace = false;
        let is_known = snakes.contains_key(&color);
        if is_known {
            let snake = snakes.get_mut(&color).unwrap();
            if head_pos.neighbors().contains(&snake.head_pos) {
                snake.head_history.push_front(snake.head_pos);
                if let Some(old) = old_state {
                    let old_cell = old.grid.get(head_pos);
                    if let Some(value) = old_cell.kind.food_value() {
                        snake.grow += value;
                        snake.score += value as i64;
                    }
                }
            } else {
                needs_trace = true;
            }
            snake.head_pos = head_pos;
            snake.tail_pos = tails_by_color[&color];
        } else {
            snakes.insert(
                color,
                Snake::new(true, head_pos, tails_by_color[&color], color),
            );
            needs_trace = true;
        }

        let snake = snakes.get_mut(&color).unwrap();
        if let Some(&old_tail) = old_tails_by_color.get(&color) {
            if old_tail != snake.tail_pos {
                if snake.head_history.back() == Some(&old_tail) {
                    snake.head_history.pop_back();
                }
                if snake.grow_uncertain {
                    snake.grow_uncertain = false;
                }
            }
        }

        snake.length = lengths_by_color.get(&color).copied().unwrap_or(0);

        if needs_trace {
            debug!(color, "re-tracing snake path, history lost or ambiguous");
            let mut path = trace_snake_path(&snapshot, snake.head_pos);
            path.remove(0);
            snake.head_history = path.into_iter().collect();
            snake.grow = 0;
            snake.grow_uncertain = true;
        }
    }

    // Step 4: any previously-known snake with no tail this tick has died.
    for (&color, snake) in snakes.iter_mut() {
        if !tails_by_color.contains_key(&color) {
            snake.alive = false;
            trace!(color, "snake has no tail this tick, marking dead");
        }
    }

    // Step 5: bind my_snake / enemy_snake.
    let enemy_color = old_state
        .and_then(|s| s.enemy_color)
        .or_else(|| snakes.keys().find(|&&c| c != my_color).copied());

    GameState {
        grid: snapshot,
        snakes,
        my_color,
        enemy_color,
        frame_no,
    }
}

/// Starting at a Head or Tail of some color, walks to neighboring cells of
/// the same color whose kind is in `{Head, Body, Tail}`, excluding the
/// previous step. Stops when zero or more than one such neighbor exists.
/// Returns the traced sequence including `start`. A snake touching itself
/// causes this to give up early; the caller represents that uncertainty via
/// `grow_uncertain = true` and a possibly-short `head_history`.
pub fn trace_snake_path(grid: &Grid, start: Position) -> Vec<Position> {
    let color = grid.get(start).color;
    let mut segments = vec![start];
    loop {
        let current = *segments.last().unwrap();
        let prev = if segments.len() > 1 {
            Some(segments[segments.len() - 2])
        } else {
            None
        };
        let candidates: Vec<Position> = current
            .neighbors()
            .into_iter()
            .filter(|&cand| Some(cand) != prev)
            .filter(|&cand| {
                let cell = grid.get(cand);
                cell.kind.is_live_segment() && cell.color == color
            })
            .collect();
        if candidates.len() != 1 {
            break;
        }
        segments.push(candidates[0]);
    }
    segments
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Cell, CellKind};
    use crate::wire::parse_grid;

    #[test]
    fn first_tick_creates_snake_and_traces_history() {
        let grid = parse_grid(&["__$1*1@1", "________", "________", "________"]).unwrap();
        let state = observe(None, grid, 1);
        let snake = state.snakes.get(&1).unwrap();
        assert_eq!(snake.length, 3);
        assert_eq!(snake.head_pos, Position::new(3, 0));
        assert_eq!(snake.tail_pos, Position::new(1, 0));
        assert_eq!(
            snake.head_history.iter().copied().collect::<Vec<_>>(),
            vec![Position::new(2, 0), Position::new(1, 0)]
        );
        assert_eq!(state.frame_no, 0);
    }

    #[test]
    fn second_tick_moves_tail_and_drops_oldest_history_entry() {
        let first = parse_grid(&["__$1*1@1", "________", "________", "________"]).unwrap();
        let state0 = observe(None, first, 1);
        let second = parse_grid(&["________", "__$1*1@1", "________", "________"]).unwrap();
        let state1 = observe(Some(&state0), second, 1);
        let snake = state1.snakes.get(&1).unwrap();
        assert_eq!(state1.frame_no, 1);
        // the whole snake moved down a row: the tail vacated (1,0) for (1,1),
        // so that oldest history entry is popped rather than retained.
        assert_eq!(
            snake.head_history.iter().copied().collect::<Vec<_>>(),
            vec![Position::new(3, 0), Position::new(2, 0)]
        );
    }

    #[test]
    fn tail_disappearing_marks_snake_dead() {
        let first = parse_grid(&["$1*1@1__"]).unwrap();
        let state0 = observe(None, first, 1);
        let mut dead = state0.grid.clone();
        dead.set(Position::new(0, 0), Cell::new(CellKind::DeadTail, 0));
        dead.set(Position::new(1, 0), Cell::new(CellKind::DeadBody, 0));
        dead.set(Position::new(2, 0), Cell::new(CellKind::DeadHead, 0));
        let state1 = observe(Some(&state0), dead, 1);
        assert!(!state1.snakes[&1].alive);
    }
}
