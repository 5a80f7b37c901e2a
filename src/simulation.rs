use anyhow::Result;
use log::{debug, trace, warn};
use rand::prelude::*;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::time::Instant;
use swarm_common::{LoopMode, SimParams, SwarmConfig, SwarmError};

use crate::flyer::{Flyer, COLLISION_RADIUS};
use crate::neighbors::{find_first_neighbor, gather, neighbors_within, other_indices};
use crate::rules;
use crate::sink::SnapshotSink;
use crate::world::World;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Flyers whose settle pass hit the iteration cap (settle loop only).
    pub unconverged: usize,
    pub snapshot_emitted: bool,
}

/// Result of settling one flyer against its close neighbors and attractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOutcome {
    /// False when either phase stopped at `max_settle_iterations` with something still too close.
    pub converged: bool,
    /// Passes spent on neighbors and attractors combined.
    pub iterations: u32,
}

/// Manages the world and drives the configured tick loop.
pub struct Simulation<S: SnapshotSink> {
    config: SwarmConfig,
    params: SimParams,
    world: World,
    /// Seeded RNG for placement and settle-order shuffles.
    rng: StdRng,
    sink: S,
    current_tick: u64,
}

impl<S: SnapshotSink> Simulation<S> {
    /// Creates a new `Simulation`, placing the initial population from the config.
    pub fn new(config: SwarmConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.initial_conditions.seed);
        let world = World::new(&config, &mut rng)?;
        Ok(Self::with_world(config, world, rng, sink))
    }

    /// Creates a `Simulation` around an already-built world.
    pub fn with_world(config: SwarmConfig, world: World, rng: StdRng, sink: S) -> Self {
        let params = config.get_sim_params();
        Simulation { config, params, world, rng, sink, current_tick: 0 }
    }

    /// Advances the simulation by one tick of the configured loop.
    pub fn step(&mut self) -> Result<TickReport> {
        let tick = self.current_tick;
        let started = Instant::now();

        let unconverged = match self.params.mode {
            LoopMode::Flocking => {
                flocking_pass(&mut self.world, &self.params)?;
                if self.params.detect_collisions {
                    check_collisions(&self.world, &self.params)?;
                }
                0
            }
            LoopMode::Settle => settle_pass(&mut self.world, &mut self.rng, &self.params, tick)?,
        };

        if unconverged > 0 {
            warn!(
                "Tick {}: {} flyer(s) did not settle within {} iterations.",
                tick, unconverged, self.params.max_settle_iterations
            );
        }

        let snapshot_emitted = tick % self.params.snapshot_interval == 0;
        if snapshot_emitted {
            self.emit_snapshot()?;
        }

        trace!("Tick {} completed in {:.2} ms", tick, started.elapsed().as_secs_f64() * 1000.0);
        self.current_tick += 1;
        Ok(TickReport { tick, unconverged, snapshot_emitted })
    }

    /// Sends the current state to the sink, stamped with the current tick.
    pub fn emit_snapshot(&mut self) -> Result<()> {
        debug!("Emitting snapshot at tick {}...", self.current_tick);
        let snapshot = self.world.snapshot(self.current_tick, self.params.label_flyers_by_id);
        self.sink.emit(&snapshot)
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn flyer_count(&self) -> usize {
        self.world.flyers.len()
    }
}

/// One tick of the flocking loop. Each flyer in turn separates from neighbors
/// inside `target_distance_between_flyers`, coheres weakly with the whole flock,
/// approaches the attractors, then integrates. Later flyers see the updated
/// positions of earlier ones.
pub fn flocking_pass(world: &mut World, params: &SimParams) -> Result<(), SwarmError> {
    let n = world.flyers.len();
    for i in 0..n {
        // None of these rules read velocity, so all three can be computed before
        // steering; applying them in order keeps the per-rule velocity clamp.
        let (separation, cohesion, attraction) = {
            let flyers = &world.flyers;
            let flyer = &flyers[i];
            let others = other_indices(i, n);
            let nearby = neighbors_within(flyer, flyers, &others, params.target_distance_between_flyers);

            let separation = rules::separate(flyer, &gather(flyers, &nearby), params.separation_scale);
            let cohesion = approach_if_any(flyer, &gather(flyers, &others), params.flock_scale)?;
            let attraction = approach_if_any(flyer, &world.attractor_bodies(), params.attractor_scale)?;
            (separation, cohesion, attraction)
        };

        let flyer = &mut world.flyers[i];
        flyer.steer_opt(separation);
        flyer.steer_opt(cohesion);
        flyer.steer_opt(attraction);
        flyer.update();
    }
    Ok(())
}

/// Checks every flyer against its neighbors, nearest-to-primary-attractor first,
/// and reports the first collision in that order.
pub fn check_collisions(world: &World, params: &SimParams) -> Result<(), SwarmError> {
    let flyers = &world.flyers;
    let n = flyers.len();
    let mut order: Vec<usize> = (0..n).collect();
    if let Some(primary) = world.attractors.first() {
        let distances: Vec<f32> = flyers.par_iter().map(|f| f.distance_to(&primary.body)).collect();
        order.par_sort_by(|&a, &b| distances[a].partial_cmp(&distances[b]).unwrap_or(Ordering::Equal));
    }

    let radius = params.target_distance_between_flyers.max(COLLISION_RADIUS);
    let first = order.par_iter().find_map_first(|&i| {
        let flyer = &flyers[i];
        let nearby = neighbors_within(flyer, flyers, &other_indices(i, n), radius);
        flyer.check_collision(&gather(flyers, &nearby)).err()
    });
    match first {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// One tick of the settle loop: advances orbits, then settles every flyer in
/// random order. Returns how many flyers did not converge.
pub fn settle_pass(
    world: &mut World,
    rng: &mut StdRng,
    params: &SimParams,
    tick: u64,
) -> Result<usize, SwarmError> {
    if params.orbit_enabled {
        world.advance_orbits(tick, params);
    }

    let mut order: Vec<usize> = (0..world.flyers.len()).collect();
    order.shuffle(rng);

    let mut unconverged = 0;
    for i in order {
        let outcome = settle_flyer(world, rng, params, i)?;
        if !outcome.converged {
            debug!("Flyer {} stopped settling after {} iterations.", i, outcome.iterations);
            unconverged += 1;
        }
    }
    Ok(unconverged)
}

/// Settles one flyer: pushes it out of `near_distance` of every other flyer
/// (holding `target_distance_between_flyers` and matching velocity), then out of
/// `target_distance_from_attractors` of every attractor, then approaches the
/// attractors once. Each phase is capped at `max_settle_iterations` passes.
pub fn settle_flyer(
    world: &mut World,
    rng: &mut StdRng,
    params: &SimParams,
    index: usize,
) -> Result<SettleOutcome, SwarmError> {
    let World { flyers, attractors } = world;
    let cap = params.max_settle_iterations;

    let mut others = other_indices(index, flyers.len());
    others.shuffle(rng);

    let mut neighbor_passes = 0;
    let mut neighbors_clear = false;
    while neighbor_passes < cap {
        let mut nearby = neighbors_within(&flyers[index], &flyers[..], &others, params.near_distance);
        if nearby.is_empty() {
            neighbors_clear = true;
            break;
        }
        nearby.shuffle(rng);
        for j in nearby {
            let hold = rules::maintain_distance_from(
                &flyers[index],
                &flyers[j],
                params.target_distance_between_flyers,
                false,
            )?;
            flyers[index].steer_opt(hold);
            flyers[index].update();

            let align = rules::move_with(&flyers[index], &flyers[j]);
            flyers[index].steer(align);
            flyers[index].update();
        }
        neighbor_passes += 1;
    }
    if !neighbors_clear {
        neighbors_clear = find_first_neighbor(&flyers[index], &flyers[..], &others, params.near_distance).is_none();
    }

    let mut attractor_passes = 0;
    let mut attractors_clear = false;
    while attractor_passes < cap {
        let nearby: Vec<usize> = (0..attractors.len())
            .filter(|&a| flyers[index].distance_to(&attractors[a].body) < params.target_distance_from_attractors)
            .collect();
        if nearby.is_empty() {
            attractors_clear = true;
            break;
        }
        for a in nearby {
            let hold = rules::maintain_distance_from(
                &flyers[index],
                &attractors[a].body,
                params.target_distance_from_attractors,
                false,
            )?;
            flyers[index].steer_opt(hold);
            flyers[index].update();
        }
        attractor_passes += 1;
    }

    let bodies: Vec<&Flyer> = attractors.iter().map(|a| &a.body).collect();
    let pull = approach_if_any(&flyers[index], &bodies, 1.0)?;
    flyers[index].steer_opt(pull);
    flyers[index].update();

    Ok(SettleOutcome {
        converged: neighbors_clear && attractors_clear,
        iterations: neighbor_passes + attractor_passes,
    })
}

// An empty target set has no centroid; the loops treat it as "nothing to approach".
fn approach_if_any(flyer: &Flyer, targets: &[&Flyer], scale: f32) -> Result<Option<rules::Steering>, SwarmError> {
    if targets.is_empty() {
        return Ok(None);
    }
    rules::approach(flyer, targets, scale)
}
