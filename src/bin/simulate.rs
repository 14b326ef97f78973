use chrono::{SecondsFormat, Utc};
use clap::Parser;
use pac_shooter::autopilot::Autopilot;
use pac_shooter::engine::{GameSession, GameSessionOptions};
use pac_shooter::types::{Direction, SessionStatus, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SEED_ENV: &str = "PAC_SHOOTER_SEED";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    max_ticks: Option<u64>,
    #[arg(long)]
    levels: Option<u32>,
    #[arg(long)]
    lives: Option<i32>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    lives: i32,
    #[serde(rename = "maxTicks")]
    max_ticks: u64,
    levels: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RunOutcome {
    GameOver,
    LevelsCleared,
    TickLimit,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    outcome: RunOutcome,
    #[serde(rename = "finalScore")]
    final_score: u32,
    level: u32,
    ticks: u64,
    pickups: u32,
    #[serde(rename = "powerPickups")]
    power_pickups: u32,
    #[serde(rename = "shotsFired")]
    shots_fired: u32,
    #[serde(rename = "enemiesShot")]
    enemies_shot: u32,
    #[serde(rename = "enemiesEaten")]
    enemies_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let started_at = iso_now();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, now_ms()));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "lives": scenario.lives,
                "maxTicks": scenario.max_ticks,
                "levels": scenario.levels,
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }
        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.result.ticks),
            json!({
                "outcome": scenario_run.result.outcome,
                "finalScore": scenario_run.result.final_score,
                "level": scenario_run.result.level,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at,
        iso_now(),
        scenario_results,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut session = GameSession::new(
        scenario.seed,
        GameSessionOptions {
            initial_lives_override: Some(scenario.lives),
            board_override: None,
        },
    );
    let mut pilot = Autopilot::new();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_score = 0u32;
    let mut levels_cleared = 0u32;

    let outcome = loop {
        match session.status() {
            SessionStatus::GameOver => break RunOutcome::GameOver,
            SessionStatus::LevelComplete => {
                levels_cleared += 1;
                if levels_cleared >= scenario.levels {
                    break RunOutcome::LevelsCleared;
                }
                session.advance_to_next_level();
                last_score = session.score();
                continue;
            }
            SessionStatus::Running => {}
        }
        if session.tick() >= scenario.max_ticks {
            break RunOutcome::TickLimit;
        }

        for command in pilot.decide(&session) {
            session.push_input(command);
        }
        session.step();

        let snapshot = session.build_snapshot(true);
        let tile_size = session.config.tile_size;
        for message in collect_snapshot_anomalies(&snapshot, last_score, tile_size) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        for message in collect_grid_anomalies(&session) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_score = last_score.max(snapshot.score);
    };

    let summary = session.build_summary();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            outcome,
            final_score: summary.final_score,
            level: summary.level,
            ticks: summary.ticks,
            pickups: summary.stats.pickups,
            power_pickups: summary.stats.power_pickups,
            shots_fired: summary.stats.shots_fired,
            enemies_shot: summary.stats.enemies_shot,
            enemies_eaten: summary.stats.enemies_eaten,
            lives_lost: summary.stats.lives_lost,
            levels_cleared: summary.stats.levels_cleared,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, last_score: u32, tile_size: f32) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.score < last_score {
        anomalies.push(format!(
            "score decreased: {last_score} -> {}",
            snapshot.score
        ));
    }
    if snapshot.lives < 0 {
        anomalies.push(format!("negative lives: {}", snapshot.lives));
    }
    if snapshot.dots_collected > snapshot.total_dots {
        anomalies.push(format!(
            "collected more pickups than placed: {}/{}",
            snapshot.dots_collected, snapshot.total_dots
        ));
    }

    let player = &snapshot.player;
    let mut bodies = vec![(
        "player".to_string(),
        player.col,
        player.row,
        player.x,
        player.y,
        player.dir,
        player.progress,
    )];
    for enemy in &snapshot.enemies {
        bodies.push((
            format!("enemy {}", enemy.id),
            enemy.col,
            enemy.row,
            enemy.x,
            enemy.y,
            enemy.dir,
            enemy.progress,
        ));
    }
    for (label, col, row, x, y, dir, progress) in bodies {
        if !(0.0..1.0).contains(&progress) {
            anomalies.push(format!("{label} progress out of range: {progress}"));
        }
        let (expected_x, expected_y) = interpolated_position(col, row, dir, progress, tile_size);
        if (x - expected_x).abs() > 1e-3 || (y - expected_y).abs() > 1e-3 {
            anomalies.push(format!("{label} position drift at ({col},{row})"));
        }
    }
    anomalies
}

fn collect_grid_anomalies(session: &GameSession) -> Vec<String> {
    let grid = session.grid();
    let mut anomalies = Vec::new();
    let player = session.player().body.cell;
    if grid.is_wall_at_grid(player.col, player.row) {
        anomalies.push(format!("player inside wall at ({},{})", player.col, player.row));
    }
    for enemy in session.enemies() {
        let cell = enemy.body.cell;
        if grid.is_wall_at_grid(cell.col, cell.row) {
            anomalies.push(format!(
                "enemy {} inside wall at ({},{})",
                enemy.id, cell.col, cell.row
            ));
        }
    }
    anomalies
}

fn interpolated_position(
    col: i32,
    row: i32,
    dir: Direction,
    progress: f32,
    tile_size: f32,
) -> (f32, f32) {
    let (dx, dy) = dir.offset();
    let cx = col as f32 * tile_size + tile_size / 2.0;
    let cy = row as f32 * tile_size + tile_size / 2.0;
    (
        cx + dx as f32 * tile_size * progress,
        cy + dy as f32 * tile_size * progress,
    )
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(
        cli.seed
            .or_else(|| seed_from_env(std::env::var(SEED_ENV).ok().as_deref()))
            .unwrap_or_else(|| rand::random::<u32>() as u64),
    );
    let lives = cli.lives.unwrap_or(3).clamp(1, 99);

    if cli.single || cli.max_ticks.is_some() || cli.levels.is_some() {
        return vec![Scenario {
            name: "custom".to_string(),
            seed,
            lives,
            max_ticks: cli.max_ticks.unwrap_or(20_000).clamp(1, 1_000_000),
            levels: cli.levels.unwrap_or(1).clamp(1, 50),
        }];
    }

    vec![
        Scenario {
            name: "quick-check".to_string(),
            seed,
            lives,
            max_ticks: 5_000,
            levels: 1,
        },
        Scenario {
            name: "marathon".to_string(),
            seed: normalize_seed(seed as u64 + 1),
            lives,
            max_ticks: 60_000,
            levels: 5,
        },
    ]
}

fn seed_from_env(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    scenarios: Vec<ScenarioResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_score = if scenario_count == 0 {
        0
    } else {
        scenarios.iter().map(|s| s.final_score as u64).sum::<u64>() as u32 / scenario_count as u32
    };
    let mut outcome_counts = BTreeMap::new();
    for scenario in &scenarios {
        *outcome_counts
            .entry(run_outcome_key(scenario.outcome))
            .or_insert(0) += 1;
    }
    RunSummary {
        match_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count,
        average_score,
        outcome_counts,
        scenarios,
    }
}

fn run_outcome_key(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::GameOver => "game_over",
        RunOutcome::LevelsCleared => "levels_cleared",
        RunOutcome::TickLimit => "tick_limit",
    }
    .to_string()
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}
