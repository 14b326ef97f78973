use crate::constants::{enemy_count_for_level, ENEMY_COLORS, ENEMY_SPAWN_EXCLUSION_PX};

use super::*;

const RANDOM_SPAWN_ATTEMPTS: usize = 64;

impl GameSession {
    /// Replaces the whole roster with fresh enemies for the current level.
    pub(super) fn spawn_enemy_roster(&mut self) {
        self.enemies.clear();
        let speed = enemy_speed_for_level(self.level);
        for slot in 0..enemy_count_for_level(self.level) {
            let Some(cell) = self.pick_enemy_spawn_cell() else {
                continue;
            };
            let id = self.make_enemy_id();
            let dir = self.rng.direction();
            self.enemies.push(Enemy {
                id,
                body: MobileEntity::new(cell, dir, speed, ENTITY_SIZE),
                scared: false,
                color: ENEMY_COLORS[slot % ENEMY_COLORS.len()],
            });
        }
    }

    fn is_enemy_spawn_cell(&self, cell: GridPos) -> bool {
        if self.grid.is_wall_at_grid(cell.col, cell.row) {
            return false;
        }
        let player = self.player.body.position(&self.grid);
        let center = self.grid.tile_center(cell);
        let near_player = (center.x - player.x).abs() < ENEMY_SPAWN_EXCLUSION_PX
            && (center.y - player.y).abs() < ENEMY_SPAWN_EXCLUSION_PX;
        !near_player
    }

    fn pick_enemy_spawn_cell(&mut self) -> Option<GridPos> {
        let max_col = self.grid.cols() - 2;
        let max_row = self.grid.rows() - 2;
        if max_col < 1 || max_row < 1 {
            return None;
        }

        for _ in 0..RANDOM_SPAWN_ATTEMPTS {
            let cell = GridPos::new(self.rng.int(1, max_col), self.rng.int(1, max_row));
            if self.is_enemy_spawn_cell(cell) {
                return Some(cell);
            }
        }

        let candidates: Vec<GridPos> = (1..=max_row)
            .flat_map(|row| (1..=max_col).map(move |col| GridPos::new(col, row)))
            .filter(|cell| self.is_enemy_spawn_cell(*cell))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.pick_index(candidates.len())])
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{enemy_count_for_level, ENEMY_COLORS, TILE_SIZE};
    use crate::engine::{GameSession, GameSessionOptions, Player};
    use crate::grid::Grid;
    use crate::types::GridPos;

    #[test]
    fn roster_avoids_walls_and_player_surroundings() {
        for seed in 0..100u32 {
            let session = GameSession::new(seed, GameSessionOptions::default());
            let spawn = session.player().body.cell;
            assert_eq!(session.enemies().len(), enemy_count_for_level(1), "seed={seed}");
            for (slot, enemy) in session.enemies().iter().enumerate() {
                let cell = enemy.body.cell;
                assert!(!session.grid().is_wall_at_grid(cell.col, cell.row));
                let near = (cell.col - spawn.col).abs() < 5 && (cell.row - spawn.row).abs() < 5;
                assert!(!near, "seed={seed} enemy too close: {cell:?}");
                assert_eq!(enemy.color, ENEMY_COLORS[slot % ENEMY_COLORS.len()]);
                assert_eq!(enemy.body.progress, 0.0);
            }
        }
    }

    #[test]
    fn roster_ids_are_never_reused() {
        let mut session = GameSession::new(12, GameSessionOptions::default());
        let before: Vec<u32> = session.enemies().iter().map(|enemy| enemy.id).collect();
        session.spawn_enemy_roster();
        for enemy in session.enemies() {
            assert!(!before.contains(&enemy.id));
        }
    }

    #[test]
    fn cramped_board_falls_back_to_scan_or_skips() {
        let mut session = GameSession::new(2, GameSessionOptions::default());
        session.grid = Grid::from_rows(
            &[
                "################",
                "#              #",
                "################",
            ],
            TILE_SIZE,
        )
        .unwrap();
        session.player = Player::spawn(GridPos::new(1, 1));
        session.spawn_enemy_roster();
        assert_eq!(session.enemies().len(), enemy_count_for_level(1));
        for enemy in session.enemies() {
            assert!(enemy.body.cell.col >= 6);
            assert_eq!(enemy.body.cell.row, 1);
        }

        session.grid = Grid::from_rows(&["#####", "#   #", "#####"], TILE_SIZE).unwrap();
        session.spawn_enemy_roster();
        assert!(session.enemies().is_empty());
    }
}
