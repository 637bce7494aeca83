//! Reachability and food analyzer: a multi-source BFS seeded at the up-to-four
//! unoccupied neighbors of my snake's head, merging partitions with
//! union-find when two fronts meet. Grounded in `asnake.py::bfs_food_and_partitions`.
use std::collections::VecDeque;

use fxhash::FxHashMap;
use tracing::instrument;

use crate::deadline::Deadline;
use crate::state::GameState;
use crate::types::Position;

/// Per-initial-direction statistics: the neighbor cell itself, the combined
/// size of the (possibly union-merged) partition it belongs to, and the
/// distance-weighted sum of food reachable from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BfsPosition {
    /// the unoccupied neighbor of my head that seeded this partition
    pub position: Position,
    /// reachable node count, summed across every index this one was merged with
    pub partition_size: usize,
    /// sum of `food_value / distance` over every food cell reachable from here
    pub food_score: f64,
}

/// Full BFS output: one [`BfsPosition`] per initial direction that had an
/// open neighbor, plus how far the search got before the deadline or
/// exhaustion, used by the heuristic to decide whether the partition sizes
/// are still authoritative at a given search depth.
#[derive(Debug, Clone)]
pub struct BfsResult {
    /// one entry per open initial neighbor of my head
    pub position_stats: Vec<BfsPosition>,
    /// the greatest distance fully dequeued before the BFS stopped
    pub fully_explored_distance: u32,
}

impl BfsResult {
    /// looks up the branch whose seed neighbor is `position`, if any
    pub fn branch_for(&self, position: Position) -> Option<BfsPosition> {
        self.position_stats
            .iter()
            .copied()
            .find(|b| b.position == position)
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, index: usize) -> usize {
        let mut cur = index;
        while self.parent[cur] != cur {
            cur = self.parent[cur];
        }
        self.parent[index] = cur;
        cur
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent[root_b] = root_a;
        }
    }
}

/// one BFS queue entry: the cell, its distance from the seeding neighbor, the
/// food value found there (0 for plain void), and which initial direction it
/// was reached from.
struct QueueEntry {
    position: Position,
    distance: u32,
    food_value: i32,
    initial_index: usize,
}

/// Explores the board from my snake's head and reports, per reachable
/// initial direction, a partition size and food score. Bounded by `deadline`;
/// if the deadline trips mid-search, `fully_explored_distance` reports the
/// greatest distance that was fully accounted for.
#[instrument(level = "trace", skip_all)]
pub fn bfs_food_and_partitions(state: &GameState, deadline: Deadline) -> BfsResult {
    let Some(my_snake) = state.my_snake() else {
        return BfsResult {
            position_stats: Vec::new(),
            fully_explored_distance: 0,
        };
    };

    let mut initial_positions: Vec<Position> = Vec::new();
    let mut enqueued_positions: FxHashMap<Position, usize> = FxHashMap::default();
    let mut to_visit: VecDeque<QueueEntry> = VecDeque::new();

    for neighbor in my_snake.head_pos.neighbors() {
        let cell = state.grid.get(neighbor);
        if cell.kind.is_passable() {
            let index = initial_positions.len();
            to_visit.push_back(QueueEntry {
                position: neighbor,
                distance: 1,
                food_value: cell.kind.food_value().unwrap_or(0),
                initial_index: index,
            });
            enqueued_positions.insert(neighbor, index);
            initial_positions.push(neighbor);
        }
    }

    let n = initial_positions.len();
    let mut food_score = vec![0.0_f64; n];
    let mut reachable_node_count = vec![0usize; n];
    let mut union_find = UnionFind::new(n);
    let mut fully_explored_distance: u32 = 0;
    let mut visited: FxHashMap<Position, ()> = FxHashMap::default();

    while let Some(entry) = to_visit.pop_front() {
        if deadline.expired() {
            break;
        }
        if visited.contains_key(&entry.position) {
            continue;
        }

        fully_explored_distance = entry.distance.saturating_sub(1);
        reachable_node_count[entry.initial_index] += 1;
        food_score[entry.initial_index] += entry.food_value as f64 / entry.distance as f64;

        for neighbor in entry.position.neighbors() {
            if let Some(&other_index) = enqueued_positions.get(&neighbor) {
                union_find.union(entry.initial_index, other_index);
                continue;
            }
            let cell = state.grid.get(neighbor);
            if cell.kind.is_passable() {
                to_visit.push_back(QueueEntry {
                    position: neighbor,
                    distance: entry.distance + 1,
                    food_value: cell.kind.food_value().unwrap_or(0),
                    initial_index: entry.initial_index,
                });
                enqueued_positions.insert(neighbor, entry.initial_index);
            }
        }

        visited.insert(entry.position, ());
    }

    let mut merged_reachable_node_count = vec![0usize; n];
    for index in 0..n {
        let root = union_find.find(index);
        merged_reachable_node_count[root] += reachable_node_count[index];
    }

    let position_stats = (0..n)
        .map(|index| {
            let root = union_find.find(index);
            BfsPosition {
                position: initial_positions[index],
                partition_size: merged_reachable_node_count[root],
                food_score: food_score[index],
            }
        })
        .collect();

    BfsResult {
        position_stats,
        fully_explored_distance,
    }
}
