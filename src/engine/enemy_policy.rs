use crate::constants::ENEMY_CHASE_BIAS;
use crate::motion::Steering;

use super::*;

/// Enemy decision at a tile centre: chase the player, or flee while scared.
pub(super) struct EnemySteering<'a> {
    pub rng: &'a mut Rng,
    pub target: GridPos,
    pub scared: bool,
}

impl Steering for EnemySteering<'_> {
    fn choose(&mut self, body: &MobileEntity, grid: &Grid) -> Option<Direction> {
        choose_enemy_direction(grid, body.cell, body.dir, self.target, self.scared, self.rng)
    }
}

pub(super) fn open_directions(grid: &Grid, cell: GridPos) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|dir| {
            let next = cell.step(*dir);
            !grid.is_wall_at_grid(next.col, next.row)
        })
        .collect()
}

/// Dominant-axis heading toward `target`, or away from it when fleeing.
/// Equal deltas fall to the vertical axis.
pub(super) fn preferred_direction(from: GridPos, target: GridPos, flee: bool) -> Direction {
    let (mut dx, mut dy) = (target.col - from.col, target.row - from.row);
    if flee {
        dx = -dx;
        dy = -dy;
    }
    if dx.abs() > dy.abs() {
        if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

pub(super) fn choose_enemy_direction(
    grid: &Grid,
    cell: GridPos,
    facing: Direction,
    target: GridPos,
    scared: bool,
    rng: &mut Rng,
) -> Option<Direction> {
    let open = open_directions(grid, cell);
    if open.is_empty() {
        return None;
    }
    let forward: Vec<Direction> = open
        .iter()
        .copied()
        .filter(|dir| *dir != facing.opposite())
        .collect();
    // Reversing is only allowed out of a dead end.
    let candidates = if forward.is_empty() { open } else { forward };

    let preferred = preferred_direction(cell, target, scared);
    if candidates.contains(&preferred) && rng.bool(ENEMY_CHASE_BIAS) {
        return Some(preferred);
    }
    Some(candidates[rng.pick_index(candidates.len())])
}

#[cfg(test)]
mod tests {
    use crate::constants::TILE_SIZE;
    use crate::grid::Grid;
    use crate::rng::Rng;
    use crate::types::{Direction, GridPos};

    use super::{choose_enemy_direction, open_directions, preferred_direction};

    fn plus() -> Grid {
        Grid::from_rows(
            &[
                "#######",
                "###  ##",
                "### ###",
                "#     #",
                "### ###",
                "### ###",
                "#######",
            ],
            TILE_SIZE,
        )
        .unwrap()
    }

    #[test]
    fn chase_prefers_dominant_axis() {
        let at = GridPos::new(5, 5);
        assert_eq!(preferred_direction(at, GridPos::new(9, 6), false), Direction::Right);
        assert_eq!(preferred_direction(at, GridPos::new(1, 6), false), Direction::Left);
        assert_eq!(preferred_direction(at, GridPos::new(6, 9), false), Direction::Down);
        assert_eq!(preferred_direction(at, GridPos::new(6, 1), false), Direction::Up);
    }

    #[test]
    fn flee_reverses_the_chase_heading() {
        let at = GridPos::new(5, 5);
        assert_eq!(preferred_direction(at, GridPos::new(9, 6), true), Direction::Left);
        assert_eq!(preferred_direction(at, GridPos::new(6, 1), true), Direction::Down);
    }

    #[test]
    fn equal_deltas_resolve_vertically() {
        let at = GridPos::new(5, 5);
        assert_eq!(preferred_direction(at, GridPos::new(8, 8), false), Direction::Down);
        assert_eq!(preferred_direction(at, GridPos::new(2, 2), false), Direction::Up);
        assert_eq!(preferred_direction(at, GridPos::new(8, 8), true), Direction::Up);
    }

    #[test]
    fn open_directions_skip_walls() {
        let grid = plus();
        let dirs = open_directions(&grid, GridPos::new(3, 3));
        assert_eq!(
            dirs,
            vec![Direction::Left, Direction::Right, Direction::Up, Direction::Down]
        );
        let dirs = open_directions(&grid, GridPos::new(4, 1));
        assert_eq!(dirs, vec![Direction::Left]);
    }

    #[test]
    fn never_reverses_while_another_exit_exists() {
        let grid = plus();
        for seed in 0..500u32 {
            let mut rng = Rng::new(seed);
            for facing in Direction::ALL {
                let choice = choose_enemy_direction(
                    &grid,
                    GridPos::new(3, 3),
                    facing,
                    GridPos::new(1, 3),
                    seed % 2 == 0,
                    &mut rng,
                );
                assert_ne!(choice, Some(facing.opposite()), "seed={seed}");
            }
        }
    }

    #[test]
    fn dead_end_allows_reversal() {
        let grid = plus();
        let mut rng = Rng::new(1);
        let choice = choose_enemy_direction(
            &grid,
            GridPos::new(4, 1),
            Direction::Right,
            GridPos::new(1, 3),
            false,
            &mut rng,
        );
        assert_eq!(choice, Some(Direction::Left));
    }

    #[test]
    fn enclosed_cell_keeps_facing() {
        let grid = Grid::from_rows(&["###", "# #", "###"], TILE_SIZE).unwrap();
        let mut rng = Rng::new(1);
        let choice = choose_enemy_direction(
            &grid,
            GridPos::new(1, 1),
            Direction::Up,
            GridPos::new(5, 5),
            false,
            &mut rng,
        );
        assert_eq!(choice, None);
    }

    #[test]
    fn preferred_heading_wins_most_of_the_time() {
        let grid = plus();
        let mut chase = 0;
        let mut flee = 0;
        let trials = 2_000u32;
        for seed in 0..trials {
            let mut rng = Rng::new(seed);
            let pick = choose_enemy_direction(
                &grid,
                GridPos::new(3, 3),
                Direction::Up,
                GridPos::new(5, 3),
                false,
                &mut rng,
            );
            if pick == Some(Direction::Right) {
                chase += 1;
            }
            let mut rng = Rng::new(seed);
            let pick = choose_enemy_direction(
                &grid,
                GridPos::new(3, 3),
                Direction::Up,
                GridPos::new(5, 3),
                true,
                &mut rng,
            );
            if pick == Some(Direction::Left) {
                flee += 1;
            }
        }
        // 0.7 + 0.3 / 3 of the time in expectation.
        let low = trials * 70 / 100;
        let high = trials * 88 / 100;
        assert!((low..high).contains(&chase), "chase={chase}");
        assert!((low..high).contains(&flee), "flee={flee}");
    }
}
