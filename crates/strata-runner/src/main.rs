//! Layered broad-phase workload runner
//!
//! This binary:
//! 1. Loads a coordinator configuration (JSON from `STRATA_CONFIG`, or defaults)
//! 2. Spawns terrain, players, projectiles and triggers on their own layers
//! 3. Moves them every tick and counts broad-phase candidates per kind
//!
//! Environment:
//! - `STRATA_CONFIG` - path to a JSON `CoordinatorConfig`
//! - `STRATA_OBJECTS` - number of objects (default 1000)
//! - `STRATA_TICKS` - number of ticks (default 20)

use std::path::PathBuf;
use std::time::Instant;

use eyre::WrapErr;
use strata_broad::{BroadPhaseQuery, CoordinatorConfig, LayerCoordinator, LayerMask};
use strata_index::{Aabb, GridConfig, GridIndex, ObjectId};
use tracing::{debug, info};

const WORLD_SIZE: f64 = 512.0;

/// What an object is; decides its layer and what it collides with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Terrain,
    Player,
    Projectile,
    Trigger,
}

impl Kind {
    const fn of(id: u64) -> Self {
        match id % 8 {
            0 | 1 => Self::Terrain,
            2..=4 => Self::Player,
            5 | 6 => Self::Projectile,
            _ => Self::Trigger,
        }
    }

    const fn layers(self) -> LayerMask {
        match self {
            Self::Terrain => LayerMask::L0,
            Self::Player => LayerMask::L1,
            Self::Projectile => LayerMask::L2,
            Self::Trigger => LayerMask::L3,
        }
    }

    /// Layers this kind queries against.
    const fn collides_with(self) -> LayerMask {
        match self {
            Self::Terrain => LayerMask::empty(),
            Self::Player => LayerMask::L0.union(LayerMask::L1).union(LayerMask::L3),
            Self::Projectile => LayerMask::L0.union(LayerMask::L1),
            Self::Trigger => LayerMask::L1,
        }
    }

    const fn half_extent(self) -> f64 {
        match self {
            Self::Terrain => 12.0,
            Self::Player => 1.0,
            Self::Projectile => 0.25,
            Self::Trigger => 4.0,
        }
    }
}

/// Deterministic scatter so runs are reproducible without an RNG.
fn scatter(id: u64, salt: u64) -> f64 {
    let mut z = id.wrapping_add(salt).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

fn position(id: u64, kind: Kind, tick: u64) -> [f64; 2] {
    let start = [scatter(id, 1) * WORLD_SIZE, scatter(id, 2) * WORLD_SIZE];
    let speed = match kind {
        Kind::Terrain | Kind::Trigger => 0.0,
        Kind::Player => 1.5,
        Kind::Projectile => 6.0,
    };
    let heading = scatter(id, 3) * std::f64::consts::TAU;
    let t = tick as f64;
    [
        heading.cos().mul_add(speed * t, start[0]).rem_euclid(WORLD_SIZE),
        heading.sin().mul_add(speed * t, start[1]).rem_euclid(WORLD_SIZE),
    ]
}

fn bounds(id: u64, kind: Kind, tick: u64) -> eyre::Result<Aabb> {
    let half = kind.half_extent();
    Ok(Aabb::from_center(position(id, kind, tick), half, half)?)
}

/// Candidate count per querying kind.
fn count_candidates<Q>(broad: &Q, objects: &[(u64, Kind)], tick: u64) -> eyre::Result<[usize; 4]>
where
    Q: BroadPhaseQuery<Bounds = Aabb>,
{
    let mut counts = [0; 4];
    for &(id, kind) in objects {
        let mask = kind.collides_with();
        if mask.is_empty() {
            continue;
        }
        let hits = broad.broad_phase(mask, &bounds(id, kind, tick)?);
        counts[kind as usize] += hits.iter().filter(|hit| hit.get() != id).count();
    }
    Ok(counts)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn load_config() -> eyre::Result<CoordinatorConfig<GridConfig>> {
    let Ok(path) = std::env::var("STRATA_CONFIG").map(PathBuf::from) else {
        return Ok(CoordinatorConfig::default());
    };
    let raw = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("parsing {}", path.display()))
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strata_runner=info".parse()?)
                .add_directive("strata_broad=warn".parse()?),
        )
        .init();

    let config = load_config()?;
    let object_count: u64 = env_or("STRATA_OBJECTS", 1000);
    let ticks: u64 = env_or("STRATA_TICKS", 20);

    info!(
        cell_size = config.index.cell_size(),
        worker_threads = ?config.worker_threads,
        object_count,
        ticks,
        "Starting layered broad-phase runner"
    );

    let broad = LayerCoordinator::<GridIndex>::new(&config)?;
    let mut objects: Vec<(u64, Kind)> = (0..object_count).map(|id| (id, Kind::of(id))).collect();

    for &(id, kind) in &objects {
        broad.insert(ObjectId(id), kind.layers(), &bounds(id, kind, 0)?)?;
    }
    info!(tracked = broad.len(), "Spawned objects");

    for tick in 1..=ticks {
        let start = Instant::now();

        for &(id, kind) in &objects {
            if kind != Kind::Terrain && kind != Kind::Trigger {
                broad.update(ObjectId(id), &bounds(id, kind, tick)?)?;
            }
        }

        // Every fifth tick one projectile lands and becomes a trigger.
        if tick.is_multiple_of(5) {
            if let Some(slot) = objects.iter_mut().find(|(_, k)| *k == Kind::Projectile) {
                let id = slot.0;
                broad.remove(ObjectId(id))?;
                broad.insert(
                    ObjectId(id),
                    Kind::Trigger.layers(),
                    &bounds(id, Kind::Trigger, tick)?,
                )?;
                slot.1 = Kind::Trigger;
                debug!(id, "Projectile converted to trigger");
            }
        }

        let [_, players, projectiles, triggers] = count_candidates(&broad, &objects, tick)?;
        info!(
            tick,
            players,
            projectiles,
            triggers,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Tick complete"
        );
    }

    info!(tracked = broad.len(), "Done");
    Ok(())
}
