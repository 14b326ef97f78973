use std::cmp::Ordering;

use crate::constants::PROJECTILE_SPEED;

use super::*;

/// Axis-aligned shot. Lives until it hits a wall, an enemy or runs out of ticks.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub life: u32,
    pub radius: f32,
}

impl Projectile {
    pub fn spawn(origin: Vec2, dir: Direction, life: u32) -> Self {
        let (dx, dy) = dir.offset();
        Self {
            pos: origin,
            velocity: Vec2::new(dx as f32 * PROJECTILE_SPEED, dy as f32 * PROJECTILE_SPEED),
            life,
            radius: PROJECTILE_RADIUS,
        }
    }
}

pub(super) enum Contact {
    None,
    EnemyEaten,
    PlayerHit,
}

impl GameSession {
    pub(super) fn fire_projectile(&mut self) {
        let origin = self.player.body.position(&self.grid);
        let dir = self.player.body.dir;
        self.projectiles.push(Projectile::spawn(
            origin,
            dir,
            self.config.projectile_life_ticks,
        ));
        self.stats.shots_fired += 1;
        self.events.push(RuntimeEvent::ProjectileFired { dir });
    }

    pub(super) fn update_projectiles(&mut self) {
        let mut idx = 0;
        while idx < self.projectiles.len() {
            let projectile = &mut self.projectiles[idx];
            projectile.pos.x += projectile.velocity.x;
            projectile.pos.y += projectile.velocity.y;
            projectile.life = projectile.life.saturating_sub(1);

            if projectile.life == 0 || self.grid.is_wall(projectile.pos.x, projectile.pos.y) {
                self.projectiles.remove(idx);
                continue;
            }

            let Some(enemy_idx) = self.find_projectile_hit(idx) else {
                idx += 1;
                continue;
            };
            self.projectiles.remove(idx);
            let enemy = self.enemies.remove(enemy_idx);
            let points = if enemy.scared {
                SCORE_SCARED_ENEMY_SHOT
            } else {
                SCORE_ENEMY_SHOT
            };
            self.score += points;
            self.stats.enemies_shot += 1;
            self.events.push(RuntimeEvent::EnemyShot {
                enemy_id: enemy.id,
                scared: enemy.scared,
                points,
            });
        }
    }

    /// Nearest enemy inside the hit radius; ties go to the earlier roster slot.
    fn find_projectile_hit(&self, projectile_idx: usize) -> Option<usize> {
        let projectile = &self.projectiles[projectile_idx];
        self.enemies
            .iter()
            .enumerate()
            .filter_map(|(idx, enemy)| {
                let distance = projectile.pos.distance(enemy.body.position(&self.grid));
                (distance < enemy.body.size / 2.0 + projectile.radius).then_some((idx, distance))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(idx, _)| idx)
    }

    pub(super) fn consume_pickup_at(&mut self, cell: GridPos) {
        let Some(kind) = self.grid.consume_cell_if_pickup(cell.col, cell.row) else {
            return;
        };
        match kind {
            PickupKind::Pickup => {
                self.score += SCORE_PICKUP;
                self.dots_collected += 1;
                self.stats.pickups += 1;
            }
            PickupKind::PowerPickup => {
                self.score += SCORE_POWER_PICKUP;
                self.stats.power_pickups += 1;
                self.activate_power_mode();
            }
        }
        self.events.push(RuntimeEvent::PickupTaken {
            col: cell.col,
            row: cell.row,
            kind,
        });
    }

    fn activate_power_mode(&mut self) {
        self.power_active = true;
        self.power_ticks_left = self.config.power_duration_ticks;
        for enemy in &mut self.enemies {
            enemy.scared = true;
        }
        self.events.push(RuntimeEvent::PowerModeStarted {
            ticks: self.power_ticks_left,
        });
    }

    pub(super) fn tick_power_timer(&mut self) {
        if !self.power_active {
            return;
        }
        self.power_ticks_left = self.power_ticks_left.saturating_sub(1);
        if self.power_ticks_left > 0 {
            return;
        }
        self.power_active = false;
        for enemy in &mut self.enemies {
            enemy.scared = false;
        }
        self.events.push(RuntimeEvent::PowerModeEnded);
    }

    /// Same-cell check between one enemy and the player.
    pub(super) fn resolve_enemy_contact(&mut self, enemy_idx: usize) -> Contact {
        if self.enemies[enemy_idx].body.cell != self.player.body.cell {
            return Contact::None;
        }
        if self.enemies[enemy_idx].scared {
            let enemy = self.enemies.remove(enemy_idx);
            self.score += SCORE_SCARED_ENEMY_EATEN;
            self.stats.enemies_eaten += 1;
            self.events.push(RuntimeEvent::EnemyEaten {
                enemy_id: enemy.id,
                points: SCORE_SCARED_ENEMY_EATEN,
            });
            return Contact::EnemyEaten;
        }
        self.lose_life();
        Contact::PlayerHit
    }
}
