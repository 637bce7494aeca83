//! Pure one-tick transition function ("advance_game"): applies a direction
//! for each acting snake and resolves movement, growth, food, tail-cycles,
//! collisions, kill credit, and death repainting.
use std::collections::HashMap;

use tracing::trace;

use crate::state::GameState;
use crate::types::{Cell, CellKind, Direction, Position};

/// Advances `state` by one tick given a direction for each acting snake
/// (a subset of alive colors is fine; snakes not present in `moves` do not
/// act this tick). Returns the new state plus a bit that is true iff any
/// involved snake's growth debt had to be guessed rather than known — the
/// search driver uses this to fall back to the static heuristic rather than
/// recurse further, per `spec.md` §4.4 and §4.9.
pub fn advance_game(state: &GameState, moves: &HashMap<u8, Direction>) -> (GameState, bool) {
    let mut new_state = state.clone();
    new_state.frame_no += 1;
    let mut uncertainty = false;

    let next_head: HashMap<u8, Position> = moves
        .iter()
        .map(|(&color, &dir)| (color, state.snakes[&color].head_pos.add(dir)))
        .collect();

    let tails: HashMap<Position, u8> = state
        .snakes
        .values()
        .map(|s| (s.tail_pos, s.color))
        .collect();

    let mut next_head_inv: HashMap<Position, Vec<u8>> = HashMap::new();
    for (&color, &pos) in next_head.iter() {
        next_head_inv.entry(pos).or_default().push(color);
    }

    let dependencies: HashMap<u8, u8> = next_head
        .iter()
        .filter_map(|(&color, pos)| tails.get(pos).map(|&dep| (color, dep)))
        .collect();

    let should_grow = |uncertainty: &mut bool, snake: &crate::snake::Snake| -> bool {
        if snake.head_history.len() as i32 != snake.length - 1 {
            *uncertainty = true;
            trace!(color = snake.color, "uncertain: incomplete head history");
            return true;
        }
        if snake.grow_uncertain {
            *uncertainty = true;
            trace!(color = snake.color, "uncertain: grow_uncertain flag set");
            return true;
        }
        snake.grow > 0
    };

    let mut kills: HashMap<u8, Vec<u8>> = HashMap::new();
    let mut dies: std::collections::HashSet<u8> = std::collections::HashSet::new();
    let mut moves_ok: std::collections::HashSet<u8> = std::collections::HashSet::new();

    let colors: Vec<u8> = next_head.keys().copied().collect();

    if colors.len() == 2
        && dependencies.get(&colors[0]) == Some(&colors[1])
        && dependencies.get(&colors[1]) == Some(&colors[0])
    {
        let grows_0 = should_grow(&mut uncertainty, &state.snakes[&colors[0]]);
        let grows_1 = should_grow(&mut uncertainty, &state.snakes[&colors[1]]);
        if grows_0 || grows_1 {
            dies.insert(colors[0]);
            dies.insert(colors[1]);
        } else {
            moves_ok.insert(colors[0]);
            moves_ok.insert(colors[1]);
        }
    } else {
        let mut tsorted = colors.clone();
        tsorted.sort_by_key(|c| dependencies.contains_key(c) as u8);

        for color in tsorted {
            if let Some(&dep) = dependencies.get(&color) {
                if color == dep {
                    moves_ok.insert(color);
                }
                let dep_snake = &state.snakes[&dep];
                if should_grow(&mut uncertainty, dep_snake) || !moves_ok.contains(&dep) {
                    if color == dep {
                        moves_ok.remove(&color);
                    } else {
                        kills.entry(dep).or_default().push(color);
                    }
                    dies.insert(color);
                    continue;
                }
                // fall through to collision checks below
            }

            let dest = next_head[&color];
            let dest_cell = state.grid.get(dest);
            if dest_cell.kind.is_dead_segment() || dest_cell.kind == CellKind::Stone {
                dies.insert(color);
                continue;
            }
            if matches!(dest_cell.kind, CellKind::Body | CellKind::Head) {
                dies.insert(color);
                kills.entry(dest_cell.color).or_default().push(color);
                continue;
            }
            if next_head_inv.get(&dest).map(|v| v.len()).unwrap_or(0) > 1 {
                dies.insert(color);
                moves_ok.insert(color);
                continue;
            }
            if let Some(value) = dest_cell.kind.food_value() {
                let new_snake = new_state.snakes.get_mut(&color).unwrap();
                new_snake.grow += value;
                new_snake.score += value as i64;
            }
            moves_ok.insert(color);
        }
    }

    // Apply movements.
    let mut needs_void: std::collections::HashSet<Position> = std::collections::HashSet::new();
    let mut avoids_void: std::collections::HashSet<Position> = std::collections::HashSet::new();
    for &color in moves_ok.iter() {
        let old_snake = &state.snakes[&color];
        let grows = should_grow(&mut uncertainty, old_snake);
        let new_head = next_head[&color];
        let old_head = old_snake.head_pos;
        {
            let new_snake = new_state.snakes.get_mut(&color).unwrap();
            if grows {
                new_snake.length += 1;
                new_snake.grow = (new_snake.grow - 1).max(0);
            } else if let Some(old_tail) = new_snake.head_history.pop_back() {
                needs_void.insert(old_tail);
                let new_tail = *new_snake.head_history.back().unwrap_or(&old_head);
                new_snake.tail_pos = new_tail;
            }
            new_snake.head_history.push_front(old_head);
            new_snake.head_pos = new_head;
        }
        new_state
            .grid
            .set(old_head, Cell::new(CellKind::Body, color));
        new_state.grid.set(new_head, Cell::new(CellKind::Head, color));
        if !moves_ok.is_empty() {
            let new_snake = new_state.snakes.get(&color).unwrap();
            new_state
                .grid
                .set(new_snake.tail_pos, Cell::new(CellKind::Tail, color));
        }
        avoids_void.insert(new_head);
    }
    for pos in needs_void.difference(&avoids_void) {
        new_state.grid.set(*pos, Cell::void());
    }

    // Mark deaths.
    for &color in dies.iter() {
        new_state.grid.repaint_dead(color);
        new_state.snakes.get_mut(&color).unwrap().alive = false;
    }

    // Award kills; mutual kills score nothing.
    for color in dies.iter() {
        kills.remove(color);
    }
    for (killer, victims) in kills.iter() {
        if let Some(snake) = new_state.snakes.get_mut(killer) {
            snake.score += 1000 * victims.len() as i64;
        }
    }

    (new_state, uncertainty)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::Grid;
    use crate::snake::Snake;
    use crate::wire::parse_grid;
    use std::collections::VecDeque;

    fn moves_for(pairs: &[(u8, Direction)]) -> HashMap<u8, Direction> {
        pairs.iter().copied().collect()
    }

    /// Builds a [`Snake`] with every field pinned explicitly, the way a fixture
    /// for `advance_game` needs to be built: going through the Observer would
    /// leave `grow_uncertain` set on any freshly-traced snake, which makes
    /// `should_grow` always answer "uncertain" regardless of the `grow` value
    /// a test is trying to pin down.
    #[allow(clippy::too_many_arguments)]
    fn make_snake(
        color: u8,
        head: Position,
        tail: Position,
        length: i32,
        grow: i32,
        grow_uncertain: bool,
        score: i64,
        history: &[Position],
    ) -> Snake {
        let mut snake = Snake::new(true, head, tail, color);
        snake.length = length;
        snake.grow = grow;
        snake.grow_uncertain = grow_uncertain;
        snake.score = score;
        snake.head_history = history.iter().copied().collect::<VecDeque<_>>();
        snake
    }

    fn make_state(grid: Grid, snakes: Vec<Snake>, my_color: u8) -> GameState {
        let mut map = HashMap::new();
        let mut enemy_color = None;
        for snake in snakes {
            if snake.color != my_color {
                enemy_color = Some(snake.color);
            }
            map.insert(snake.color, snake);
        }
        GameState {
            grid,
            snakes: map,
            my_color,
            enemy_color,
            frame_no: 0,
        }
    }

    #[test]
    fn simple_move_down() {
        let grid = parse_grid(&["__$1*1@1", "________", "________", "________"]).unwrap();
        let snake = make_snake(
            1,
            Position::new(3, 0),
            Position::new(1, 0),
            3,
            0,
            false,
            0,
            &[Position::new(2, 0), Position::new(1, 0)],
        );
        let state = make_state(grid, vec![snake], 1);
        let (new_state, uncertainty) = advance_game(&state, &moves_for(&[(1, Direction::Down)]));
        assert!(!uncertainty);
        let expected = parse_grid(&["____$1*1", "______@1", "________", "________"]).unwrap();
        assert_eq!(new_state.grid, expected);
        let snake = &new_state.snakes[&1];
        assert_eq!(snake.length, 3);
        assert_eq!(snake.grow, 0);
        assert_eq!(
            snake.head_history.iter().copied().collect::<Vec<_>>(),
            vec![Position::new(3, 0), Position::new(2, 0)]
        );
    }

    #[test]
    fn eating_food_grows_on_a_later_tick() {
        let grid = parse_grid(&["__$1*1@1", "______2_", "________", "________"]).unwrap();
        let snake = make_snake(
            1,
            Position::new(3, 0),
            Position::new(1, 0),
            3,
            0,
            false,
            0,
            &[Position::new(2, 0), Position::new(1, 0)],
        );
        let state = make_state(grid, vec![snake], 1);
        let (new_state, uncertainty) = advance_game(&state, &moves_for(&[(1, Direction::Down)]));
        assert!(!uncertainty);
        let snake = &new_state.snakes[&1];
        assert_eq!(snake.head_pos, Position::new(3, 1));
        // the food eaten this tick sets up growth for the following ticks;
        // this tick itself still moves normally since `grow` was 0 going in.
        assert_eq!(snake.grow, 2);
        assert_eq!(snake.score, 2);
        assert_eq!(snake.length, 3);
    }

    #[test]
    fn already_growing_snake_does_not_retract_its_tail() {
        let grid = parse_grid(&["__$1*1@1", "________", "________", "________"]).unwrap();
        let snake = make_snake(
            1,
            Position::new(3, 0),
            Position::new(1, 0),
            3,
            1,
            false,
            0,
            &[Position::new(2, 0), Position::new(1, 0)],
        );
        let state = make_state(grid, vec![snake], 1);
        let (new_state, uncertainty) = advance_game(&state, &moves_for(&[(1, Direction::Down)]));
        assert!(!uncertainty);
        let snake = &new_state.snakes[&1];
        assert_eq!(snake.length, 4);
        assert_eq!(snake.grow, 0);
        assert_eq!(snake.tail_pos, Position::new(1, 0));
    }

    #[test]
    fn wall_crash_kills_and_repaints() {
        let grid = parse_grid(&["______$1*1@1"]).unwrap();
        let snake = make_snake(
            1,
            Position::new(5, 0),
            Position::new(3, 0),
            3,
            0,
            false,
            0,
            &[Position::new(4, 0), Position::new(3, 0)],
        );
        let state = make_state(grid, vec![snake], 1);
        let (new_state, _) = advance_game(&state, &moves_for(&[(1, Direction::Right)]));
        let snake = &new_state.snakes[&1];
        assert!(!snake.alive);
        assert_eq!(snake.score, 0);
        for (_, _, cell) in new_state.grid.iter() {
            assert_ne!(cell.kind, CellKind::Head);
            assert_ne!(cell.kind, CellKind::Body);
            assert_ne!(cell.kind, CellKind::Tail);
        }
    }

    #[test]
    fn mutual_frontal_collision() {
        // two length-3 snakes, head-to-head with one empty cell between them,
        // both moving into the same destination cell.
        let grid = parse_grid(&["$1*1@1__@2*2$2"]).unwrap();
        let snake1 = make_snake(
            1,
            Position::new(2, 0),
            Position::new(0, 0),
            3,
            0,
            false,
            0,
            &[Position::new(1, 0), Position::new(0, 0)],
        );
        let snake2 = make_snake(
            2,
            Position::new(4, 0),
            Position::new(6, 0),
            3,
            0,
            false,
            0,
            &[Position::new(5, 0), Position::new(6, 0)],
        );
        let state = make_state(grid, vec![snake1, snake2], 1);
        let (new_state, _) = advance_game(
            &state,
            &moves_for(&[(1, Direction::Right), (2, Direction::Left)]),
        );
        assert!(!new_state.snakes[&1].alive);
        assert!(!new_state.snakes[&2].alive);
        assert_eq!(new_state.snakes[&1].score, 0);
        assert_eq!(new_state.snakes[&2].score, 0);
    }

    #[test]
    fn non_growing_tail_cycle_both_survive() {
        // two length-2 snakes chasing each other's tail in a 2x2 ring; since
        // neither is growing they simply rotate and both stay alive.
        let grid = parse_grid(&["$1@1", "@2$2"]).unwrap();
        let snake1 = make_snake(
            1,
            Position::new(1, 0),
            Position::new(0, 0),
            2,
            0,
            false,
            0,
            &[Position::new(0, 0)],
        );
        let snake2 = make_snake(
            2,
            Position::new(0, 1),
            Position::new(1, 1),
            2,
            0,
            false,
            0,
            &[Position::new(1, 1)],
        );
        let state = make_state(grid, vec![snake1, snake2], 1);
        let (new_state, uncertainty) = advance_game(
            &state,
            &moves_for(&[(1, Direction::Down), (2, Direction::Up)]),
        );
        assert!(!uncertainty);
        assert!(new_state.snakes[&1].alive);
        assert!(new_state.snakes[&2].alive);
        let expected = parse_grid(&["@2$1", "$2@1"]).unwrap();
        assert_eq!(new_state.grid, expected);
    }

    #[test]
    fn growing_tail_cycle_kills_both() {
        // same ring, but snake 1 is due to grow: the tail-cycle special case
        // requires both sides to die if either would grow.
        let grid = parse_grid(&["$1@1", "@2$2"]).unwrap();
        let snake1 = make_snake(
            1,
            Position::new(1, 0),
            Position::new(0, 0),
            2,
            1,
            false,
            0,
            &[Position::new(0, 0)],
        );
        let snake2 = make_snake(
            2,
            Position::new(0, 1),
            Position::new(1, 1),
            2,
            0,
            false,
            0,
            &[Position::new(1, 1)],
        );
        let state = make_state(grid, vec![snake1, snake2], 1);
        let (new_state, _) = advance_game(
            &state,
            &moves_for(&[(1, Direction::Down), (2, Direction::Up)]),
        );
        assert!(!new_state.snakes[&1].alive);
        assert!(!new_state.snakes[&2].alive);
    }

    #[test]
    fn body_kill_awards_credit() {
        let grid = parse_grid(&["    @1  ", "$2*2*2@2"]).unwrap();
        let snake1 = make_snake(1, Position::new(2, 0), Position::new(2, 0), 1, 0, false, 0, &[]);
        let snake2 = make_snake(
            2,
            Position::new(3, 1),
            Position::new(0, 1),
            4,
            0,
            false,
            0,
            &[
                Position::new(2, 1),
                Position::new(1, 1),
                Position::new(0, 1),
            ],
        );
        let state = make_state(grid, vec![snake1, snake2], 1);
        let (new_state, _) = advance_game(&state, &moves_for(&[(1, Direction::Down)]));
        assert!(!new_state.snakes[&1].alive);
        assert_eq!(new_state.snakes[&2].score, 1000);
        assert!(new_state.snakes[&2].alive);
    }

    #[test]
    fn self_tail_chase_dies_only_if_growing() {
        // an L-shaped snake whose head move lands exactly on its own tail:
        // this is only safe if it is not growing this tick.
        let grid = parse_grid(&["@1$1", "*1*1"]).unwrap();
        let history = [
            Position::new(0, 1),
            Position::new(1, 1),
            Position::new(1, 0),
        ];

        let growing = make_snake(1, Position::new(0, 0), Position::new(1, 0), 4, 1, false, 0, &history);
        let state = make_state(grid.clone(), vec![growing], 1);
        let (new_state, _) = advance_game(&state, &moves_for(&[(1, Direction::Right)]));
        assert!(!new_state.snakes[&1].alive);

        let not_growing = make_snake(1, Position::new(0, 0), Position::new(1, 0), 4, 0, false, 0, &history);
        let state = make_state(grid, vec![not_growing], 1);
        let (new_state, uncertainty) = advance_game(&state, &moves_for(&[(1, Direction::Right)]));
        assert!(!uncertainty);
        assert!(new_state.snakes[&1].alive);
    }
}
