//! Deadline-bounded iterative-deepening minimax over (me, enemy) moves, backed
//! by the BFS reachability/food heuristic. Grounded in
//! `asnake.py::iterative_search_move_space` / `search_move_space`.
use std::collections::HashMap;

use tracing::{info, trace};

use crate::bfs::{BfsPosition, BfsResult};
use crate::deadline::Deadline;
use crate::state::{GameState, GAME_OVER_FRAME};
use crate::transition::advance_game;
use crate::types::Direction;

/// A lexicographically-ordered score: larger is better for me. Field order
/// matters and mirrors `asnake.py::heuristic`'s returned tuple exactly.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Score {
    /// +1 if I won on the game-over condition, -1 if I lost, 0 otherwise
    pub game_result: i8,
    /// +1 iff only I am alive, -1 iff only the enemy is, 0 if both/neither
    pub liveness: i8,
    /// -1 iff BFS is still authoritative and my chosen partition is smaller
    /// than my own length (entering a trap)
    pub entering_small_partition: i8,
    /// my score minus the enemy's
    pub score_delta: i64,
    /// distance-weighted food reachable from the chosen initial direction
    pub food_score: f64,
    /// reachable node count of the chosen initial direction's partition
    pub partition_size: usize,
    /// depth tie-breaker: prefer delaying bad outcomes, hastening good ones
    pub depth_signed: i32,
}

/// raised internally when the deadline trips mid-search; absorbed by
/// [`iterative_search`], never surfaced to callers.
struct SearchTimedOut;

fn heuristic(
    state: &GameState,
    bfs: &BfsResult,
    branch: Option<BfsPosition>,
    depth: u32,
) -> Score {
    let branch = branch.unwrap_or(BfsPosition {
        position: crate::types::Position::new(0, 0),
        partition_size: 0,
        food_score: 0.0,
    });

    let mut i_live = state.i_am_alive();
    let mut enemy_lives = state.enemy_is_alive();
    if state.frame_no > GAME_OVER_FRAME {
        i_live = false;
        enemy_lives = false;
    }

    let my_score = state.my_snake().map(|s| s.score).unwrap_or(0);
    let enemy_score = state.enemy_snake().map(|s| s.score).unwrap_or(0);

    let (liveness, game_result) = if i_live && enemy_lives {
        (0, 0)
    } else if i_live {
        (1, if my_score > enemy_score { 1 } else { 0 })
    } else if enemy_lives {
        (-1, if my_score < enemy_score { -1 } else { 0 })
    } else {
        let result = match my_score.cmp(&enemy_score) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
        };
        (0, result)
    };

    let my_length = state.my_snake().map(|s| s.length).unwrap_or(0);
    let entering_small_partition =
        if bfs.fully_explored_distance >= depth && branch.partition_size < my_length as usize {
            -1
        } else {
            0
        };

    let depth_signed = if game_result < 0 || liveness < 0 {
        depth as i32
    } else {
        -(depth as i32)
    };

    Score {
        game_result,
        liveness,
        entering_small_partition,
        score_delta: my_score - enemy_score,
        food_score: branch.food_score,
        partition_size: branch.partition_size,
        depth_signed,
    }
}

fn branch_for_move(
    state: &GameState,
    bfs: &BfsResult,
    parent_branch: Option<BfsPosition>,
    my_move: Direction,
) -> Option<BfsPosition> {
    if parent_branch.is_some() {
        return parent_branch;
    }
    let head = state.my_snake()?.head_pos.add(my_move);
    Some(bfs.branch_for(head).unwrap_or(BfsPosition {
        position: head,
        partition_size: 0,
        food_score: 0.0,
    }))
}

#[allow(clippy::too_many_arguments)]
fn search_move_space(
    depth: u32,
    max_depth: u32,
    state: &GameState,
    deadline: Deadline,
    bfs_branch: Option<BfsPosition>,
    bfs: &BfsResult,
) -> Result<(Score, Option<Direction>), SearchTimedOut> {
    let my_snake = match state.my_snake() {
        Some(s) if s.alive => s,
        _ => return Ok((heuristic(state, bfs, bfs_branch, depth), None)),
    };
    if depth == max_depth {
        return Ok((heuristic(state, bfs, bfs_branch, depth), None));
    }

    let my_direction = my_snake.direction();
    let mut best: Option<(Score, Direction)> = None;

    for my_move in Direction::all() {
        if let Some(d) = my_direction {
            if !my_move.is_not_reverse_of(d) {
                continue;
            }
        }
        let move_branch = branch_for_move(state, bfs, bfs_branch, my_move);

        let score = match state.enemy_snake() {
            Some(enemy) if enemy.alive => {
                let enemy_direction = enemy.direction();
                let mut worst: Option<Score> = None;
                for enemy_move in Direction::all() {
                    if let Some(d) = enemy_direction {
                        if !enemy_move.is_not_reverse_of(d) {
                            continue;
                        }
                    }
                    if deadline.expired() {
                        return Err(SearchTimedOut);
                    }
                    let mut moves = HashMap::new();
                    moves.insert(state.my_color, my_move);
                    moves.insert(enemy.color, enemy_move);
                    let (new_state, uncertainty) = advance_game(state, &moves);
                    let score = if uncertainty {
                        trace!(depth, "uncertain branch, using heuristic directly");
                        heuristic(&new_state, bfs, move_branch, depth)
                    } else {
                        search_move_space(depth + 1, max_depth, &new_state, deadline, move_branch, bfs)?.0
                    };
                    if worst.is_none() || score < worst.unwrap() {
                        worst = Some(score);
                    }
                }
                match worst {
                    Some(s) => s,
                    None => heuristic(state, bfs, move_branch, depth),
                }
            }
            _ => {
                if deadline.expired() {
                    return Err(SearchTimedOut);
                }
                let mut moves = HashMap::new();
                moves.insert(state.my_color, my_move);
                let (new_state, uncertainty) = advance_game(state, &moves);
                if uncertainty {
                    heuristic(&new_state, bfs, move_branch, depth)
                } else {
                    search_move_space(depth + 1, max_depth, &new_state, deadline, move_branch, bfs)?.0
                }
            }
        };

        if best.is_none() || score > best.unwrap().0 {
            best = Some((score, my_move));
        }
    }

    Ok(match best {
        Some((score, mv)) => (score, Some(mv)),
        None => (heuristic(state, bfs, bfs_branch, depth), None),
    })
}

/// Repeatedly deepens `search_move_space` until `deadline` trips, returning
/// the deepest fully-completed `(score, move)`. `None` only if depth 1 itself
/// could not complete before the deadline.
pub fn iterative_search(
    state: &GameState,
    deadline: Deadline,
    bfs: &BfsResult,
) -> Option<(Score, Direction)> {
    let mut best: Option<(Score, Direction)> = None;
    let mut depth = 1;
    loop {
        match search_move_space(0, depth, state, deadline, None, bfs) {
            Ok((score, Some(mv))) => {
                best = Some((score, mv));
                depth += 1;
            }
            Ok((_, None)) => break,
            Err(SearchTimedOut) => {
                info!(depth, "search timed out");
                break;
            }
        }
    }
    best
}

/// Last-resort move selection for when [`iterative_search`] returns nothing
/// at all (depth 1 itself failed to complete). Grounded in
/// `asnake.py::next_direction`'s fallback ladder.
pub fn fallback_direction(state: &GameState, bfs: &BfsResult) -> Direction {
    let Some(my_snake) = state.my_snake() else {
        return Direction::NoChange;
    };
    let my_direction = my_snake.direction();
    let my_length = my_snake.length;

    if !bfs.position_stats.is_empty() {
        let best = bfs
            .position_stats
            .iter()
            .max_by(|a, b| {
                let key = |b: &BfsPosition| {
                    let small = if b.partition_size < my_length as usize { -1 } else { 0 };
                    (small, b.food_score, b.partition_size)
                };
                key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("checked non-empty above");
        for direction in Direction::all() {
            if my_snake.head_pos.add(direction) == best.position {
                return direction;
            }
        }
    }

    for direction in Direction::all() {
        if let Some(d) = my_direction {
            if !direction.is_not_reverse_of(d) {
                continue;
            }
        }
        if state.grid.get(my_snake.head_pos.add(direction)).kind == crate::types::CellKind::Tail {
            return direction;
        }
    }

    Direction::NoChange
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bfs::bfs_food_and_partitions;
    use crate::snake::Snake;
    use crate::wire::parse_grid;
    use std::collections::HashMap as StdHashMap;
    use std::time::Duration;

    fn lone_snake_state(rows: &[&str], head: crate::types::Position) -> GameState {
        let grid = parse_grid(rows).unwrap();
        let mut snakes = StdHashMap::new();
        let mut snake = Snake::new(true, head, head, 1);
        snake.length = 1;
        snakes.insert(1, snake);
        GameState {
            grid,
            snakes,
            my_color: 1,
            enemy_color: None,
            frame_no: 0,
        }
    }

    #[test]
    fn search_avoids_the_wall_when_alone() {
        let state = lone_snake_state(
            &["            ", "@1          ", "            "],
            crate::types::Position::new(0, 1),
        );
        let bfs = bfs_food_and_partitions(&state, Deadline::after(Duration::from_secs(1)));
        let result = iterative_search(&state, Deadline::after(Duration::from_millis(200)), &bfs);
        let (_, mv) = result.expect("depth 1 should always complete for a lone snake");
        assert_ne!(mv, Direction::Left);
    }

    #[test]
    fn fallback_prefers_the_larger_open_partition() {
        let state = lone_snake_state(&["##  ", "#@1 ", "##  "], crate::types::Position::new(1, 1));
        let bfs = bfs_food_and_partitions(&state, Deadline::after(Duration::from_secs(1)));
        let direction = fallback_direction(&state, &bfs);
        assert_eq!(direction, Direction::Right);
    }

    #[test]
    fn fallback_with_no_bfs_branches_returns_no_change() {
        let state = lone_snake_state(&["###", "#@1", "###"], crate::types::Position::new(1, 1));
        let bfs = bfs_food_and_partitions(&state, Deadline::after(Duration::from_secs(1)));
        assert_eq!(fallback_direction(&state, &bfs), Direction::NoChange);
    }
}
