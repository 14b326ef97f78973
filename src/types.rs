use serde::{Deserialize, Serialize};

use crate::constants::{
    COLS, INITIAL_LIVES, POWER_DURATION_TICKS, PROJECTILE_LIFE_TICKS, ROWS, TILE_SIZE,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbour scan order used wherever directions are enumerated.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit step in grid space; rows grow downward.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        Self {
            col: self.col + dx,
            row: self.row + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Wall,
    Pickup,
    PowerPickup,
}

impl Cell {
    pub fn glyph(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Wall => '#',
            Self::Pickup => '.',
            Self::PowerPickup => 'o',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            ' ' => Some(Self::Empty),
            '#' => Some(Self::Wall),
            '.' => Some(Self::Pickup),
            'o' => Some(Self::PowerPickup),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    Pickup,
    PowerPickup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyColor {
    Red,
    Cyan,
    Orange,
    Pink,
    Green,
    Magenta,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    LevelComplete,
    GameOver,
}

/// Input delivered by the outside world between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputCommand {
    SetDirection { dir: Direction },
    Fire,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    pub cols: i32,
    pub rows: i32,
    #[serde(rename = "tileSize")]
    pub tile_size: f32,
    #[serde(rename = "initialLives")]
    pub initial_lives: i32,
    #[serde(rename = "powerDurationTicks")]
    pub power_duration_ticks: u32,
    #[serde(rename = "projectileLifeTicks")]
    pub projectile_life_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: COLS,
            rows: ROWS,
            tile_size: TILE_SIZE,
            initial_lives: INITIAL_LIVES,
            power_duration_ticks: POWER_DURATION_TICKS,
            projectile_life_ticks: PROJECTILE_LIFE_TICKS,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GridInit {
    pub cols: i32,
    pub rows: i32,
    #[serde(rename = "tileSize")]
    pub tile_size: f32,
    pub tiles: Vec<String>,
    #[serde(rename = "totalPickups")]
    pub total_pickups: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub col: i32,
    pub row: i32,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    #[serde(rename = "queuedDir")]
    pub queued_dir: Direction,
    pub progress: f32,
    pub size: f32,
    #[serde(rename = "mouthOpen")]
    pub mouth_open: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub col: i32,
    pub row: i32,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub progress: f32,
    pub size: f32,
    pub scared: bool,
    pub color: EnemyColor,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectileView {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub life: u32,
    pub radius: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    LevelStarted {
        level: u32,
        enemies: usize,
    },
    PickupTaken {
        col: i32,
        row: i32,
        kind: PickupKind,
    },
    PowerModeStarted {
        ticks: u32,
    },
    PowerModeEnded,
    ProjectileFired {
        dir: Direction,
    },
    EnemyShot {
        #[serde(rename = "enemyId")]
        enemy_id: u32,
        scared: bool,
        points: u32,
    },
    EnemyEaten {
        #[serde(rename = "enemyId")]
        enemy_id: u32,
        points: u32,
    },
    LifeLost {
        #[serde(rename = "livesLeft")]
        lives_left: i32,
    },
    LevelComplete {
        level: u32,
        score: u32,
    },
    GameOver {
        #[serde(rename = "finalScore")]
        final_score: u32,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub status: SessionStatus,
    pub score: u32,
    pub lives: i32,
    pub level: u32,
    #[serde(rename = "dotsCollected")]
    pub dots_collected: u32,
    #[serde(rename = "totalDots")]
    pub total_dots: u32,
    #[serde(rename = "powerActive")]
    pub power_active: bool,
    #[serde(rename = "powerTicksLeft")]
    pub power_ticks_left: u32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub pickups: u32,
    #[serde(rename = "powerPickups")]
    pub power_pickups: u32,
    #[serde(rename = "shotsFired")]
    pub shots_fired: u32,
    #[serde(rename = "enemiesShot")]
    pub enemies_shot: u32,
    #[serde(rename = "enemiesEaten")]
    pub enemies_eaten: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
    #[serde(rename = "levelsCleared")]
    pub levels_cleared: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub status: SessionStatus,
    #[serde(rename = "finalScore")]
    pub final_score: u32,
    pub level: u32,
    pub ticks: u64,
    pub stats: SessionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::ALL {
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.offset();
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn input_command_uses_tagged_wire_format() {
        let parsed: InputCommand =
            serde_json::from_str(r#"{"type":"set_direction","dir":"left"}"#).unwrap();
        assert_eq!(
            parsed,
            InputCommand::SetDirection {
                dir: Direction::Left
            }
        );
        let fire: InputCommand = serde_json::from_str(r#"{"type":"fire"}"#).unwrap();
        assert_eq!(fire, InputCommand::Fire);
    }

    #[test]
    fn glyphs_round_trip_for_every_cell() {
        for cell in [Cell::Empty, Cell::Wall, Cell::Pickup, Cell::PowerPickup] {
            assert_eq!(Cell::from_glyph(cell.glyph()), Some(cell));
        }
        assert_eq!(Cell::from_glyph('x'), None);
    }
}
