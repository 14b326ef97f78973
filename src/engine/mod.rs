use crate::constants::{
    enemy_speed_for_level, ENTITY_SIZE, MAX_BOARD_TILES, MIN_BOARD_TILES, MOUTH_MAX, MOUTH_STEP,
    PLAYER_SPEED, PROJECTILE_RADIUS, SCORE_ENEMY_SHOT, SCORE_PICKUP, SCORE_POWER_PICKUP,
    SCORE_SCARED_ENEMY_EATEN, SCORE_SCARED_ENEMY_SHOT,
};
use crate::grid::{generate_grid, Grid};
use crate::motion::{MobileEntity, MotionOutcome, QueuedTurn};
use crate::rng::Rng;
use crate::types::{
    Direction, EnemyColor, EnemyView, GameConfig, GameSummary, GridInit, GridPos, InputCommand,
    PickupKind, PlayerView, ProjectileView, RuntimeEvent, SessionStats, SessionStatus, Snapshot,
    Vec2,
};

mod combat;
mod enemy_policy;
mod spawn_system;

pub use self::combat::Projectile;

use self::combat::Contact;
use self::enemy_policy::EnemySteering;

/// Oscillates between closed and `MOUTH_MAX`, one step per player update.
#[derive(Clone, Debug)]
pub struct MouthAnimation {
    open: f32,
    opening: bool,
}

impl MouthAnimation {
    fn new() -> Self {
        Self {
            open: 0.0,
            opening: true,
        }
    }

    fn advance(&mut self) {
        if self.opening {
            self.open += MOUTH_STEP;
            if self.open >= MOUTH_MAX {
                self.opening = false;
            }
        } else {
            self.open -= MOUTH_STEP;
            if self.open <= 0.0 {
                self.opening = true;
            }
        }
    }

    pub fn open(&self) -> f32 {
        self.open
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: MobileEntity,
    pub queued_dir: Direction,
    pub mouth: MouthAnimation,
}

impl Player {
    fn spawn(cell: GridPos) -> Self {
        Self {
            body: MobileEntity::new(cell, Direction::Right, PLAYER_SPEED, ENTITY_SIZE),
            queued_dir: Direction::Right,
            mouth: MouthAnimation::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: u32,
    pub body: MobileEntity,
    pub scared: bool,
    pub color: EnemyColor,
}

#[derive(Clone, Debug, Default)]
pub struct GameSessionOptions {
    pub initial_lives_override: Option<i32>,
    /// Board size in tiles as `(cols, rows)`, clamped per axis to
    /// `MIN_BOARD_TILES..=MAX_BOARD_TILES`.
    pub board_override: Option<(i32, i32)>,
}

/// Owns all mutable game state and advances it one tick at a time.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub config: GameConfig,

    grid: Grid,
    rng: Rng,
    player: Player,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    events: Vec<RuntimeEvent>,
    stats: SessionStats,

    status: SessionStatus,
    score: u32,
    lives: i32,
    level: u32,
    dots_collected: u32,
    power_active: bool,
    power_ticks_left: u32,

    pending_dir: Option<Direction>,
    pending_shots: u32,
    tick_counter: u64,
    next_enemy_id: u32,
}

impl GameSession {
    pub fn new(seed: u32, options: GameSessionOptions) -> Self {
        let mut config = GameConfig::default();
        if let Some(lives) = options.initial_lives_override {
            config.initial_lives = lives.max(1);
        }
        if let Some((cols, rows)) = options.board_override {
            config.cols = cols.clamp(MIN_BOARD_TILES, MAX_BOARD_TILES);
            config.rows = rows.clamp(MIN_BOARD_TILES, MAX_BOARD_TILES);
        }

        let mut rng = Rng::new(seed);
        let spawn = GridPos::new(config.cols / 2, config.rows / 2);
        let grid = generate_grid(
            config.cols,
            config.rows,
            spawn.col,
            spawn.row,
            config.tile_size,
            &mut rng,
        );

        let mut session = Self {
            grid,
            rng,
            player: Player::spawn(spawn),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            events: Vec::new(),
            stats: SessionStats::default(),
            status: SessionStatus::Running,
            score: 0,
            lives: config.initial_lives,
            level: 1,
            dots_collected: 0,
            power_active: false,
            power_ticks_left: 0,
            pending_dir: None,
            pending_shots: 0,
            tick_counter: 0,
            next_enemy_id: 1,
            config,
        };
        session.spawn_enemy_roster();
        session.events.push(RuntimeEvent::LevelStarted {
            level: session.level,
            enemies: session.enemies.len(),
        });
        session
    }

    /// Back to level 1 with full lives, zero score and a fresh maze.
    pub fn restart(&mut self) {
        self.score = 0;
        self.lives = self.config.initial_lives;
        self.level = 1;
        self.stats = SessionStats::default();
        self.tick_counter = 0;
        self.start_level();
    }

    /// Only valid while the session waits on a completed level.
    pub fn advance_to_next_level(&mut self) -> bool {
        if self.status != SessionStatus::LevelComplete {
            return false;
        }
        self.level += 1;
        self.start_level();
        true
    }

    /// Buffers input for the next tick. Last direction wins; shots queue up.
    pub fn push_input(&mut self, command: InputCommand) {
        if self.status != SessionStatus::Running {
            return;
        }
        match command {
            InputCommand::SetDirection { dir } => self.pending_dir = Some(dir),
            InputCommand::Fire => self.pending_shots = self.pending_shots.saturating_add(1),
        }
    }

    pub fn step(&mut self) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.tick_counter += 1;

        self.apply_pending_input();
        self.update_player();
        if self.status != SessionStatus::Running {
            return;
        }
        self.update_projectiles();
        self.update_enemies();
        if self.status == SessionStatus::Running {
            self.tick_power_timer();
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn dots_collected(&self) -> u32 {
        self.dots_collected
    }

    pub fn is_power_active(&self) -> bool {
        self.power_active
    }

    pub fn power_ticks_left(&self) -> u32 {
        self.power_ticks_left
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn get_grid_init(&self) -> GridInit {
        self.grid.to_grid_init()
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let player_pos = self.player.body.position(&self.grid);
        let snapshot = Snapshot {
            tick: self.tick_counter,
            status: self.status,
            score: self.score,
            lives: self.lives,
            level: self.level,
            dots_collected: self.dots_collected,
            total_dots: self.grid.total_pickups(),
            power_active: self.power_active,
            power_ticks_left: self.power_ticks_left,
            player: PlayerView {
                col: self.player.body.cell.col,
                row: self.player.body.cell.row,
                x: player_pos.x,
                y: player_pos.y,
                dir: self.player.body.dir,
                queued_dir: self.player.queued_dir,
                progress: self.player.body.progress,
                size: self.player.body.size,
                mouth_open: self.player.mouth.open(),
            },
            enemies: self
                .enemies
                .iter()
                .map(|enemy| {
                    let pos = enemy.body.position(&self.grid);
                    EnemyView {
                        id: enemy.id,
                        col: enemy.body.cell.col,
                        row: enemy.body.cell.row,
                        x: pos.x,
                        y: pos.y,
                        dir: enemy.body.dir,
                        progress: enemy.body.progress,
                        size: enemy.body.size,
                        scared: enemy.scared,
                        color: enemy.color,
                    }
                })
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|projectile| ProjectileView {
                    x: projectile.pos.x,
                    y: projectile.pos.y,
                    dx: projectile.velocity.x,
                    dy: projectile.velocity.y,
                    life: projectile.life,
                    radius: projectile.radius,
                })
                .collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            status: self.status,
            final_score: self.score,
            level: self.level,
            ticks: self.tick_counter,
            stats: self.stats.clone(),
        }
    }

    fn start_level(&mut self) {
        let spawn = self.spawn_cell();
        self.grid = generate_grid(
            self.config.cols,
            self.config.rows,
            spawn.col,
            spawn.row,
            self.config.tile_size,
            &mut self.rng,
        );
        self.dots_collected = 0;
        self.projectiles.clear();
        self.pending_dir = None;
        self.pending_shots = 0;
        self.power_active = false;
        self.power_ticks_left = 0;
        self.player = Player::spawn(spawn);
        self.spawn_enemy_roster();
        self.status = SessionStatus::Running;
        self.events.push(RuntimeEvent::LevelStarted {
            level: self.level,
            enemies: self.enemies.len(),
        });
    }

    fn spawn_cell(&self) -> GridPos {
        GridPos::new(self.config.cols / 2, self.config.rows / 2)
    }

    fn apply_pending_input(&mut self) {
        if let Some(dir) = self.pending_dir.take() {
            self.player.queued_dir = dir;
        }
        for _ in 0..std::mem::take(&mut self.pending_shots) {
            self.fire_projectile();
        }
    }

    fn update_player(&mut self) {
        let mut steering = QueuedTurn(self.player.queued_dir);
        if let MotionOutcome::Arrived(cell) = self.player.body.advance(&self.grid, &mut steering) {
            self.consume_pickup_at(cell);
        }
        self.player.mouth.advance();

        if self.dots_collected >= self.grid.total_pickups() {
            self.status = SessionStatus::LevelComplete;
            self.stats.levels_cleared += 1;
            self.events.push(RuntimeEvent::LevelComplete {
                level: self.level,
                score: self.score,
            });
        }
    }

    fn update_enemies(&mut self) {
        let target = self.player.body.cell;
        let mut idx = 0;
        while idx < self.enemies.len() {
            let enemy = &mut self.enemies[idx];
            let mut steering = EnemySteering {
                rng: &mut self.rng,
                target,
                scared: enemy.scared,
            };
            enemy.body.advance(&self.grid, &mut steering);

            match self.resolve_enemy_contact(idx) {
                Contact::None => idx += 1,
                Contact::EnemyEaten => {}
                // Roster was rebuilt or the game ended.
                Contact::PlayerHit => return,
            }
        }
    }

    /// Unshielded contact. A surviving player restarts from the spawn cell
    /// against a fresh, unscared roster, and power mode is cancelled with it
    /// rather than left running over enemies that never saw the pickup.
    fn lose_life(&mut self) {
        self.lives -= 1;
        self.stats.lives_lost += 1;
        self.events.push(RuntimeEvent::LifeLost {
            lives_left: self.lives.max(0),
        });
        if self.lives <= 0 {
            self.lives = 0;
            self.status = SessionStatus::GameOver;
            self.events.push(RuntimeEvent::GameOver {
                final_score: self.score,
            });
            return;
        }

        self.player = Player::spawn(self.spawn_cell());
        self.power_active = false;
        self.power_ticks_left = 0;
        self.spawn_enemy_roster();
    }

    fn make_enemy_id(&mut self) -> u32 {
        let id = self.next_enemy_id;
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }
}
