//! ward: a small hospital ward served by two carts and a porter.
//!
//! Loads the day's tasks from an embedded task file, runs one compressed day
//! on a walled grid floor, and writes CSV output to `output/ward`.  Midway
//! through the morning the doorway into bay C is blocked for a minute of
//! wall time to exercise rerouting.
//!
//! ```text
//! cargo run -p ward                 # built-in settings
//! cargo run -p ward -- ward.json    # override SimConfig / RouterConfig
//! RUST_LOG=debug cargo run -p ward  # per-tick dispatch detail
//! ```

mod layout;

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fleet_agent::AgentKind;
use fleet_core::{DowntimeId, Point, SimConfig, TimeOfDay};
use fleet_output::{CsvWriter, SimOutputObserver};
use fleet_routing::RouterConfig;
use fleet_sim::{AgentSpec, SimBuilder};
use fleet_tasks::{Downtime, DowntimeKind, TaskCatalog, load_tasks_reader};

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR:          &str = "output/ward";
const DOOR_BLOCKED_AT_TICK: u64 = 120; // 10:00
const DOOR_BLOCK_SECS:      f64 = 60.0;

// ── Task file ─────────────────────────────────────────────────────────────────

const TASKS: &str = "\
#fleet-tasks
ward
entryTime,origin,destination,id,description,priority,estimatedDuration,loadingTime
00:10,3;3,20;5,T-001,\"Linen, bay B\",1,10,3
00:10,5;15,35;15,T-002,Specimen run,,,
00:30,36;4,2;18,T-003,Meals,2,,5
02:00,20;18,6;6,T-004,Pharmacy,,,
05:00,34;10,10;2,T-005,Waste collection,0,,
09:55,2;10,38;18,T-006,Returns,,,
10:00,8;17,33;3,T-007,Equipment swap,3,20,6
14:30,30;5,4;4,T-008,Linen return,,,
";

// ── Settings ──────────────────────────────────────────────────────────────────

/// Optional JSON settings file; missing fields keep the built-in values.
#[derive(Deserialize)]
#[serde(default)]
struct Settings {
    sim:      SimConfig,
    router:   RouterConfig,
    strategy: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sim: SimConfig {
                map_name:                "ward".into(),
                snapshot_interval_ticks: 12, // hourly
                ..SimConfig::default()
            },
            router:   RouterConfig::default(),
            strategy: "earliest-arrival".into(),
        }
    }
}

fn load_settings() -> Result<Settings> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
        }
        None => Ok(Settings::default()),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings()?;

    // 1. Floor plan.
    let floor = layout::build_floor()?;
    let waypoints = layout::waypoints();
    info!(width = layout::WIDTH, height = layout::HEIGHT, waypoints = waypoints.len(), "floor ready");

    // 2. Tasks.
    let file = load_tasks_reader(Cursor::new(TASKS), Some(settings.sim.map_name.as_str()))?;
    let catalog = TaskCatalog::new(file.tasks);

    // 3. Fleet.
    let charge_at = TimeOfDay::new(6, 0)?;
    let lunch_at = TimeOfDay::new(12, 0)?;
    let fleet = [
        AgentSpec::new(AgentKind::Cart, Point::new(2.0, 2.0))
            .named("cart-1")
            .with_downtime(Downtime::new(DowntimeId(0), DowntimeKind::Charging, charge_at, 20.0)),
        AgentSpec::new(AgentKind::Cart, Point::new(38.0, 2.0)).named("cart-2"),
        AgentSpec::new(AgentKind::Porter, Point::new(20.0, 10.0))
            .named("porter-1")
            .with_downtime(Downtime::new(DowntimeId(1), DowntimeKind::Break, lunch_at, 15.0)),
    ];

    // 4. Sim.
    let mut sim = SimBuilder::new(settings.sim, catalog)
        .navigator(Box::new(floor))
        .waypoints(waypoints)
        .router_config(settings.router)
        .strategy_name(settings.strategy)
        .agents(fleet)
        .build()?;

    // 5. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = SimOutputObserver::new(writer);

    // 6. Run the morning, block a doorway, run the rest of the day.
    let t0 = Instant::now();
    sim.run_ticks(DOOR_BLOCKED_AT_TICK, &mut obs);
    info!(time = %sim.time(), "blocking door-b");
    sim.mark_area_blocked(layout::DOOR_B, Some(DOOR_BLOCK_SECS));
    let report = sim.run(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    println!();
    println!("Simulation complete in {:.3} s (output in {OUTPUT_DIR})", elapsed.as_secs_f64());
    print!("{report}");
    Ok(())
}
