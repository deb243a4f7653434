//! Round-based mobility simulation over the spatial grid
//!
//! This binary:
//! 1. Scatters nodes over the deployment area and indexes them
//! 2. Moves every node each round and re-files it with `update`
//! 3. Evaluates unit-disk links through grid candidates
//! 4. Lets nodes leave and rejoin the network
//! 5. Periodically cross-checks links against all-pairs evaluation
//!
//! Settings come from the environment:
//! - `NETSIM_NODES` - node count (default 500)
//! - `NETSIM_ROUNDS` - rounds to simulate (default 100)
//! - `NETSIM_WIDTH` / `NETSIM_HEIGHT` - area in metres (default 1000)
//! - `NETSIM_DEPTH` - makes the deployment volumetric when set
//! - `NETSIM_RANGE` - radio range, also the cell side (default 50)
//! - `NETSIM_SEED` - RNG seed (default 42)

mod mobility;

use std::str::FromStr;

use eyre::{WrapErr, bail};
use netsim_grid::{GridConfig, GridIndex, LinkStats, Links, NodeId, Position, UnitDiskGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::mobility::{Extent, Walker};

/// Rounds between all-pairs audits.
const AUDIT_EVERY: u64 = 10;

/// Chance per round that a random node leaves, and that an absent one rejoins.
const LEAVE_CHANCE: f64 = 0.2;
const REJOIN_CHANCE: f64 = 0.3;

#[derive(Debug)]
struct Settings {
    nodes: u32,
    rounds: u64,
    width: f64,
    height: f64,
    depth: Option<f64>,
    range: f64,
    seed: u64,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    fn from_env() -> Self {
        Self {
            nodes: env_or("NETSIM_NODES", 500),
            rounds: env_or("NETSIM_ROUNDS", 100),
            width: env_or("NETSIM_WIDTH", 1000.0),
            height: env_or("NETSIM_HEIGHT", 1000.0),
            depth: std::env::var("NETSIM_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok()),
            range: env_or("NETSIM_RANGE", 50.0),
            seed: env_or("NETSIM_SEED", 42),
        }
    }

    fn grid_config(&self) -> GridConfig {
        let config = match self.depth {
            Some(depth) => GridConfig::volumetric(self.width, self.height, depth),
            None => GridConfig::planar(self.width, self.height),
        };
        config.with_cell_side(self.range).with_keep_cell_tokens(true)
    }

    fn extent(&self) -> Extent {
        [self.width, self.height, self.depth.unwrap_or(0.0)]
    }
}

struct Simulation {
    grid: GridIndex,
    walkers: Vec<Walker>,
    away: Vec<NodeId>,
    links: Links<UnitDiskGraph>,
    extent: Extent,
    max_speed: f64,
    rng: StdRng,
}

impl Simulation {
    fn new(settings: &Settings) -> eyre::Result<Self> {
        let grid = GridIndex::new(&settings.grid_config()).wrap_err("invalid grid settings")?;
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let extent = settings.extent();
        let max_speed = settings.range / 4.0;

        let walkers: Vec<Walker> = (0..settings.nodes)
            .map(|i| Walker::spawn(NodeId(i), extent, max_speed, &mut rng))
            .collect();

        let mut sim = Self {
            grid,
            walkers,
            away: Vec::new(),
            links: Links::new(UnitDiskGraph::new(settings.range)),
            extent,
            max_speed,
            rng,
        };
        for walker in &sim.walkers {
            sim.grid.insert(&walker.node)?;
        }
        Ok(sim)
    }

    fn position_of(&self, id: NodeId) -> Option<Position> {
        self.walkers.get(id.get() as usize).map(|w| w.node.position)
    }

    /// Move everyone, then re-file the nodes the grid holds.
    fn move_nodes(&mut self) -> eyre::Result<usize> {
        let mut crossings = 0;
        for walker in &mut self.walkers {
            walker.step(self.extent, self.max_speed, &mut self.rng);
            if self.grid.contains(walker.node.id) && self.grid.update(&walker.node)? {
                crossings += 1;
            }
        }
        Ok(crossings)
    }

    /// At most one departure and one return per round.
    fn churn(&mut self) -> eyre::Result<()> {
        if self.rng.gen_bool(LEAVE_CHANCE) {
            if let Some(id) = self.grid.random_node(&mut self.rng) {
                self.grid.remove(id)?;
                self.away.push(id);
                debug!(node = %id, "node left");
            }
        }
        if !self.away.is_empty() && self.rng.gen_bool(REJOIN_CHANCE) {
            let id = self.away.swap_remove(self.rng.gen_range(0..self.away.len()));
            let Some(walker) = self.walkers.get(id.get() as usize) else {
                bail!("absent node {id} has no walker");
            };
            self.grid.insert(&walker.node)?;
            debug!(node = %id, "node rejoined");
        }
        Ok(())
    }

    fn evaluate_links(&mut self) -> eyre::Result<LinkStats> {
        let walkers = &self.walkers;
        let stats = self.links.for_each_link(
            &self.grid,
            |id| walkers.get(id.get() as usize).map(|w| w.node.position),
            |_, _| {},
        )?;
        Ok(stats)
    }

    /// Count links the slow way, over held nodes only.
    fn all_pairs_links(&self) -> usize {
        let held: Vec<Position> = self
            .grid
            .nodes()
            .filter_map(|id| self.position_of(id))
            .collect();
        let range = self.links.model().range;

        let mut links = 0;
        for (i, a) in held.iter().enumerate() {
            links += held[i + 1..]
                .iter()
                .filter(|b| a.distance_squared(b) <= range * range)
                .count();
        }
        links
    }

    fn audit(&self, round: u64, stats: LinkStats) -> eyre::Result<()> {
        self.grid
            .check_invariants()
            .wrap_err_with(|| format!("grid invariants broken in round {round}"))?;

        let expected = self.all_pairs_links();
        if expected != stats.links {
            bail!(
                "round {round}: grid found {} links, all-pairs found {expected}",
                stats.links
            );
        }
        debug!(round, links = expected, "audit passed");
        Ok(())
    }
}

fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("netsim_runner=info".parse()?)
                .add_directive("netsim_grid=info".parse()?),
        )
        .init();

    let settings = Settings::from_env();
    info!(?settings, "Starting netsim runner");

    let mut sim = Simulation::new(&settings)?;
    info!(
        dims = ?sim.grid.dims(),
        nodes = sim.grid.len(),
        "Deployment ready"
    );

    let mut total = LinkStats::default();
    for round in 1..=settings.rounds {
        let crossings = sim.move_nodes()?;
        sim.churn()?;
        let stats = sim.evaluate_links()?;
        total += stats;

        if round % AUDIT_EVERY == 0 {
            sim.audit(round, stats)?;
        }

        let pairs = sim.grid.len().saturating_sub(1) * sim.grid.len() / 2;
        info!(
            round,
            nodes = sim.grid.len(),
            crossings,
            links = stats.links,
            candidates = stats.candidates,
            pruned = pairs.saturating_sub(stats.candidates),
            "Round complete"
        );
    }

    if total.candidates == 0 {
        warn!("No candidate pairs evaluated; is the range too small for the area?");
    } else {
        info!(
            links = total.links,
            candidates = total.candidates,
            hit_ratio = total.links as f64 / total.candidates as f64,
            "Simulation finished"
        );
    }

    Ok(())
}
