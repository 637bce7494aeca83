//! Per-tick entry point: Observer, BFS, iterative-deepening Search, fallback.
//! Grounded in `asnake.py::MyRobotSnake.next_direction`.
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use crate::bfs::bfs_food_and_partitions;
use crate::deadline::Deadline;
use crate::observer::observe;
use crate::search::{fallback_direction, iterative_search};
use crate::state::GameState;
use crate::types::Direction;
use crate::wire::encode_snapshot;

/// Owns the persistent `old_state` between ticks and exposes the one call a
/// surrounding harness needs per frame. Analogous to the original bot's
/// `MyRobotSnake`.
#[derive(Debug, Clone)]
pub struct Agent {
    /// this agent's fixed color for the game
    pub my_color: u8,
    /// the previous tick's reconstructed state, `None` before the first tick
    pub old_state: Option<GameState>,
    /// ticks observed so far
    pub frame_no: u64,
}

impl Agent {
    /// builds a fresh agent bound to the given color, with no prior state
    pub fn new(my_color: u8) -> Self {
        Agent {
            my_color,
            old_state: None,
            frame_no: 0,
        }
    }

    /// Runs one tick: decodes `snapshot`, reconstructs the state, runs BFS
    /// and the iterative-deepening search within `tick_budget`, and returns a
    /// direction. Never panics on malformed input; on any error the tick
    /// returns [`Direction::NoChange`] and `old_state` is left untouched, per
    /// the "detect before installing" propagation policy.
    #[instrument(level = "trace", skip(self, snapshot))]
    pub fn tick(
        &mut self,
        snapshot: &[Vec<(char, u8)>],
        width: usize,
        height: usize,
        tick_budget: Duration,
    ) -> Direction {
        let tick_start = Instant::now();
        self.frame_no += 1;

        let grid = match encode_snapshot(snapshot, width, height) {
            Ok(grid) => grid,
            Err(err) => {
                error!(?err, "malformed snapshot, leaving old_state untouched");
                return Direction::NoChange;
            }
        };

        let state = observe(self.old_state.as_ref(), grid, self.my_color);

        let tick_deadline = Deadline::after(tick_budget);
        let bfs_deadline = Deadline::quarter_from(tick_start, tick_budget);
        let bfs = bfs_food_and_partitions(&state, bfs_deadline);
        info!(
            fully_explored_distance = bfs.fully_explored_distance,
            "bfs complete"
        );

        let direction = match iterative_search(&state, tick_deadline, &bfs) {
            Some((_, mv)) => mv,
            None => {
                error!("search found no move at any depth, using fallback policy");
                fallback_direction(&state, &bfs)
            }
        };

        self.old_state = Some(state);
        direction
    }
}
