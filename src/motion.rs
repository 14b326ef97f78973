use crate::grid::Grid;
use crate::types::{Direction, GridPos, Vec2};

/// Direction decision made at a tile centre. Player input and enemy AI are
/// the two implementations; the motion rules are shared.
pub trait Steering {
    /// `None` keeps the current facing.
    fn choose(&mut self, body: &MobileEntity, grid: &Grid) -> Option<Direction>;
}

/// Turns toward a buffered direction when the cell beyond it is open.
#[derive(Clone, Copy, Debug)]
pub struct QueuedTurn(pub Direction);

impl Steering for QueuedTurn {
    fn choose(&mut self, body: &MobileEntity, grid: &Grid) -> Option<Direction> {
        let target = body.cell.step(self.0);
        if grid.is_wall_at_grid(target.col, target.row) {
            None
        } else {
            Some(self.0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionState {
    AtCenter,
    InTransit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionOutcome {
    /// Sitting on a tile centre facing a wall.
    Idle,
    Departed,
    Moving,
    Arrived(GridPos),
}

/// Tile-to-tile mover. `cell` is authoritative for gameplay; the pixel
/// position is always derived from `cell`, `dir` and `progress`.
#[derive(Clone, Debug)]
pub struct MobileEntity {
    pub cell: GridPos,
    pub dir: Direction,
    pub progress: f32,
    pub speed: f32,
    pub size: f32,
}

impl MobileEntity {
    pub fn new(cell: GridPos, dir: Direction, speed: f32, size: f32) -> Self {
        Self {
            cell,
            dir,
            progress: 0.0,
            speed,
            size,
        }
    }

    pub fn state(&self) -> MotionState {
        if self.progress == 0.0 {
            MotionState::AtCenter
        } else {
            MotionState::InTransit
        }
    }

    pub fn destination(&self) -> GridPos {
        self.cell.step(self.dir)
    }

    pub fn position(&self, grid: &Grid) -> Vec2 {
        let from = grid.tile_center(self.cell);
        if self.progress <= 0.0 {
            return from;
        }
        let to = grid.tile_center(self.destination());
        Vec2::new(
            from.x + (to.x - from.x) * self.progress,
            from.y + (to.y - from.y) * self.progress,
        )
    }

    /// One tick of the tile state machine.
    pub fn advance<S: Steering + ?Sized>(
        &mut self,
        grid: &Grid,
        steering: &mut S,
    ) -> MotionOutcome {
        match self.state() {
            MotionState::AtCenter => {
                if let Some(dir) = steering.choose(self, grid) {
                    self.dir = dir;
                }
                let next = self.destination();
                if self.speed <= 0.0 || grid.is_wall_at_grid(next.col, next.row) {
                    return MotionOutcome::Idle;
                }
                self.progress = self.speed;
                if self.progress >= 1.0 {
                    return self.commit();
                }
                MotionOutcome::Departed
            }
            MotionState::InTransit => {
                self.progress += self.speed;
                if self.progress >= 1.0 {
                    return self.commit();
                }
                MotionOutcome::Moving
            }
        }
    }

    fn commit(&mut self) -> MotionOutcome {
        self.progress = 0.0;
        self.cell = self.destination();
        MotionOutcome::Arrived(self.cell)
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{PLAYER_SPEED, TILE_SIZE};
    use crate::grid::Grid;
    use crate::rng::Rng;
    use crate::types::{Direction, GridPos};

    use super::{MobileEntity, MotionOutcome, MotionState, QueuedTurn, Steering};

    struct RandomSteering(Rng);

    impl Steering for RandomSteering {
        fn choose(&mut self, _body: &MobileEntity, _grid: &Grid) -> Option<Direction> {
            Some(self.0.direction())
        }
    }

    fn corridor() -> Grid {
        Grid::from_rows(
            &[
                "#######",
                "#     #",
                "# ### #",
                "#     #",
                "#######",
            ],
            TILE_SIZE,
        )
        .unwrap()
    }

    #[test]
    fn walks_one_tile_then_commits_cell() {
        let grid = corridor();
        let mut body = MobileEntity::new(GridPos::new(1, 1), Direction::Right, 0.25, 16.0);
        let mut steer = QueuedTurn(Direction::Right);

        assert_eq!(body.advance(&grid, &mut steer), MotionOutcome::Departed);
        assert_eq!(body.state(), MotionState::InTransit);
        assert_eq!(body.advance(&grid, &mut steer), MotionOutcome::Moving);
        assert_eq!(body.advance(&grid, &mut steer), MotionOutcome::Moving);
        assert_eq!(
            body.advance(&grid, &mut steer),
            MotionOutcome::Arrived(GridPos::new(2, 1))
        );
        assert_eq!(body.progress, 0.0);
        assert_eq!(body.position(&grid), grid.tile_center(GridPos::new(2, 1)));
    }

    #[test]
    fn wall_ahead_leaves_entity_idle() {
        let grid = corridor();
        let mut body = MobileEntity::new(GridPos::new(1, 1), Direction::Up, PLAYER_SPEED, 16.0);
        let mut steer = QueuedTurn(Direction::Up);
        for _ in 0..5 {
            assert_eq!(body.advance(&grid, &mut steer), MotionOutcome::Idle);
        }
        assert_eq!(body.cell, GridPos::new(1, 1));
        assert_eq!(body.dir, Direction::Up);
    }

    #[test]
    fn blocked_turn_keeps_current_facing() {
        let grid = corridor();
        let mut body = MobileEntity::new(GridPos::new(2, 1), Direction::Right, PLAYER_SPEED, 16.0);
        let mut steer = QueuedTurn(Direction::Down);
        assert_eq!(body.advance(&grid, &mut steer), MotionOutcome::Departed);
        assert_eq!(body.dir, Direction::Right);
    }

    #[test]
    fn position_interpolates_between_tile_centres() {
        let grid = corridor();
        let mut body = MobileEntity::new(GridPos::new(1, 3), Direction::Right, 0.25, 16.0);
        let mut steer = QueuedTurn(Direction::Right);
        body.advance(&grid, &mut steer);
        body.advance(&grid, &mut steer);
        let pos = body.position(&grid);
        assert!((pos.x - (30.0 + 0.5 * TILE_SIZE)).abs() < 1e-4);
        assert!((pos.y - 70.0).abs() < 1e-4);
    }

    #[test]
    fn random_walk_never_enters_walls_or_leaves_unit_interval() {
        let grid = corridor();
        for seed in 0..50u32 {
            let mut body = MobileEntity::new(GridPos::new(1, 1), Direction::Right, 0.15, 16.0);
            let mut steer = RandomSteering(Rng::new(seed));
            for _ in 0..400 {
                body.advance(&grid, &mut steer);
                assert!((0.0..1.0).contains(&body.progress));
                assert!(!grid.is_wall_at_grid(body.cell.col, body.cell.row));
                if body.state() == MotionState::InTransit {
                    let next = body.destination();
                    assert!(!grid.is_wall_at_grid(next.col, next.row));
                }
            }
        }
    }

    #[test]
    fn full_tile_speed_commits_on_departure() {
        let grid = corridor();
        let mut body = MobileEntity::new(GridPos::new(1, 1), Direction::Right, 1.0, 16.0);
        let mut steer = QueuedTurn(Direction::Right);
        assert_eq!(
            body.advance(&grid, &mut steer),
            MotionOutcome::Arrived(GridPos::new(2, 1))
        );
        assert_eq!(body.progress, 0.0);
    }
}
