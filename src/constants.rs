use crate::types::EnemyColor;

pub const TILE_SIZE: f32 = 20.0;
pub const BOARD_WIDTH_PX: i32 = 800;
pub const BOARD_HEIGHT_PX: i32 = 600;
pub const COLS: i32 = BOARD_WIDTH_PX / TILE_SIZE as i32;
pub const ROWS: i32 = BOARD_HEIGHT_PX / TILE_SIZE as i32;
/// Per-axis bounds for board overrides, in tiles.
pub const MIN_BOARD_TILES: i32 = 3;
pub const MAX_BOARD_TILES: i32 = 1024;

pub const INITIAL_LIVES: i32 = 3;
pub const ENTITY_SIZE: f32 = TILE_SIZE - 4.0;

pub const PLAYER_SPEED: f32 = 0.15;
pub const MOUTH_STEP: f32 = 0.1;
pub const MOUTH_MAX: f32 = 0.5;

pub const ENEMY_BASE_SPEED: f32 = 0.08;
pub const ENEMY_SPEED_PER_LEVEL: f32 = 0.01;
pub const ENEMY_BASE_COUNT: usize = 4;
pub const ENEMY_COUNT_PER_LEVEL: usize = 3;
/// Enemies never spawn closer than this to the player on both axes.
pub const ENEMY_SPAWN_EXCLUSION_PX: f32 = 100.0;
pub const ENEMY_CHASE_BIAS: f32 = 0.7;
pub const ENEMY_COLORS: [EnemyColor; 6] = [
    EnemyColor::Red,
    EnemyColor::Cyan,
    EnemyColor::Orange,
    EnemyColor::Pink,
    EnemyColor::Green,
    EnemyColor::Magenta,
];

pub const WALL_CHANCE: f32 = 0.15;
pub const POWER_PICKUP_CHANCE: f32 = 0.05;
pub const LATTICE_ROW_PERIOD: i32 = 4;
pub const LATTICE_COL_PERIOD: i32 = 6;

pub const PROJECTILE_SPEED: f32 = 5.0;
pub const PROJECTILE_LIFE_TICKS: u32 = 100;
pub const PROJECTILE_RADIUS: f32 = 6.0;

/// Five seconds at 60 ticks per second.
pub const POWER_DURATION_TICKS: u32 = 300;

pub const SCORE_PICKUP: u32 = 10;
pub const SCORE_POWER_PICKUP: u32 = 50;
pub const SCORE_ENEMY_SHOT: u32 = 100;
pub const SCORE_SCARED_ENEMY_SHOT: u32 = 200;
pub const SCORE_SCARED_ENEMY_EATEN: u32 = 200;

pub fn enemy_count_for_level(level: u32) -> usize {
    ENEMY_BASE_COUNT + level as usize * ENEMY_COUNT_PER_LEVEL
}

pub fn enemy_speed_for_level(level: u32) -> f32 {
    ENEMY_BASE_SPEED + level as f32 * ENEMY_SPEED_PER_LEVEL
}
