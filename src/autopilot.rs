use std::collections::{HashMap, HashSet, VecDeque};

use crate::engine::GameSession;
use crate::grid::Grid;
use crate::motion::MotionState;
use crate::types::{Cell, Direction, GridPos, InputCommand};

const FIRE_RANGE_TILES: i32 = 8;
const FIRE_COOLDOWN_TICKS: u32 = 12;

/// Computer player for headless runs: walks to the closest pickup and
/// shoots enemies lined up in front of it.
#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    fire_cooldown: u32,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decide(&mut self, session: &GameSession) -> Vec<InputCommand> {
        let mut out = Vec::new();
        if !session.is_running() {
            return out;
        }
        let player = &session.player().body;

        if player.state() == MotionState::AtCenter {
            let threats: HashSet<GridPos> = session
                .enemies()
                .iter()
                .filter(|enemy| !enemy.scared)
                .map(|enemy| enemy.body.cell)
                .collect();
            if let Some(dir) = first_step_to_pickup(session.grid(), player.cell, &threats) {
                out.push(InputCommand::SetDirection { dir });
            }
        }

        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);
        if self.fire_cooldown == 0 {
            let lined_up = session.enemies().iter().any(|enemy| {
                is_in_line_of_fire(session.grid(), player.cell, player.dir, enemy.body.cell)
            });
            if lined_up {
                out.push(InputCommand::Fire);
                self.fire_cooldown = FIRE_COOLDOWN_TICKS;
            }
        }
        out
    }
}

/// Breadth-first search over open cells; returns the first move of a
/// shortest path to any pickup. Cells in `blocked` are never entered.
pub fn first_step_to_pickup(
    grid: &Grid,
    start: GridPos,
    blocked: &HashSet<GridPos>,
) -> Option<Direction> {
    let mut first_step: HashMap<GridPos, Direction> = HashMap::new();
    let mut queue = VecDeque::new();
    let mut seen = HashSet::new();
    seen.insert(start);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if cell != start
            && matches!(
                grid.cell(cell.col, cell.row),
                Cell::Pickup | Cell::PowerPickup
            )
        {
            return first_step.get(&cell).copied();
        }
        for dir in Direction::ALL {
            let next = cell.step(dir);
            if grid.is_wall_at_grid(next.col, next.row) || blocked.contains(&next) {
                continue;
            }
            if !seen.insert(next) {
                continue;
            }
            let step = if cell == start {
                dir
            } else {
                first_step.get(&cell).copied().unwrap_or(dir)
            };
            first_step.insert(next, step);
            queue.push_back(next);
        }
    }
    None
}

fn is_in_line_of_fire(grid: &Grid, from: GridPos, facing: Direction, target: GridPos) -> bool {
    let mut cell = from;
    for _ in 0..FIRE_RANGE_TILES {
        if cell == target {
            return true;
        }
        cell = cell.step(facing);
        if grid.is_wall_at_grid(cell.col, cell.row) {
            return false;
        }
    }
    cell == target
}
