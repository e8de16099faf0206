//! Simulation engine for epidemic spread.
//!
//! This module provides the daily step that moves nodes through
//! Susceptible -> Infected -> Recovered, and the run loop built on it.

use crate::errors::{Result, SimulationError};
use crate::graph::{AdjacencyGraph, ContactGraph, Coordinate, GraphBuilder, NodeId, Population};
use crate::metrics::{EpidemicMetrics, MetricsRecorder};
use crate::simulation::{
    RecoveryRule, SimulationParameters, SimulationState, Snapshot,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Accepting steps
    Active,
    /// Explicitly terminated; reads still work, steps fail
    Terminated,
}

/// Main simulation engine.
///
/// Owns the parameters, a shared handle on the immutable population, the
/// mutable per-run state, the append-only snapshot history, and its own
/// seeded generator.
#[derive(Debug)]
pub struct Simulation<G: ContactGraph = AdjacencyGraph> {
    /// Parameters with the seed resolved
    params: SimulationParameters,
    /// Graph, coordinates and seed nodes, shareable across runs
    population: Arc<Population<G>>,
    /// Coordinates shared into every snapshot in spatial mode
    coordinates: Option<Arc<[Coordinate]>>,
    state: SimulationState,
    history: Vec<Snapshot>,
    recorder: MetricsRecorder,
    /// Scratch marks for nodes exposed during the current step
    pending: Vec<bool>,
    status: RunStatus,
    rng: Xoshiro256PlusPlus,
}

impl Simulation<AdjacencyGraph> {
    /// Validate `params`, build the population graph and set up day 0.
    pub fn new(params: SimulationParameters) -> Result<Self> {
        let params = params.with_resolved_seed();
        params.validate()?;
        let seed = params.seed.unwrap_or_default();

        let mut graph_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let population = GraphBuilder::build_with_rng(&params, &mut graph_rng)?;
        Self::with_population(params, Arc::new(population))
    }
}

impl<G: ContactGraph> Simulation<G> {
    /// Start a run on an already built population.
    ///
    /// The population may be shared with other runs. Its seed nodes become
    /// the initially infected set. For a population made by
    /// [`GraphBuilder`], `params` must describe the same network (size,
    /// topology, weights, seed set and spatial settings); only the
    /// transmission, recovery and seed fields may differ. Without a seed the
    /// run reuses the population's, which makes it identical to
    /// `Simulation::new` on the population's parameters. Hand-assembled
    /// populations are checked for size and spatial mode only.
    pub fn with_population(
        mut params: SimulationParameters,
        population: Arc<Population<G>>,
    ) -> Result<Self> {
        if params.seed.is_none() {
            params.seed = population.seed();
        }
        let params = params.with_resolved_seed();
        params.validate()?;
        if population.size() != params.population_size {
            return Err(SimulationError::config(format!(
                "population has {} nodes but population_size is {}",
                population.size(),
                params.population_size
            )));
        }
        if let Some(built) = population.parameters() {
            check_same_network(built, &params)?;
        }
        if population.seeds().is_empty() {
            return Err(SimulationError::config("initial infected set is empty"));
        }
        if params.is_spatial() && population.spatial().is_none() {
            return Err(SimulationError::config(
                "spatial mode requires a population with coordinates",
            ));
        }

        // Transmission draws use a stream independent of graph generation.
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed.unwrap_or_default());
        rng.jump();

        let coordinates: Option<Arc<[Coordinate]>> = population
            .spatial()
            .filter(|_| params.is_spatial())
            .map(|index| Arc::from(index.coordinates()));

        let state = SimulationState::initial(population.size(), population.seeds());
        let initial = Snapshot::capture(&state, 0, coordinates.clone());
        let mut recorder = MetricsRecorder::new();
        recorder.record(&initial)?;

        info!(
            seed = params.seed.unwrap_or_default(),
            nodes = population.size(),
            topology = params.topology.name(),
            initial_infected = state.counts().infected,
            "created simulation"
        );

        Ok(Self {
            pending: vec![false; population.size()],
            params,
            population,
            coordinates,
            state,
            history: vec![initial],
            recorder,
            status: RunStatus::Active,
            rng,
        })
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// The seed actually used for this run.
    pub fn seed(&self) -> u64 {
        self.params.seed.unwrap_or_default()
    }

    pub fn population(&self) -> &Arc<Population<G>> {
        &self.population
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn day(&self) -> u32 {
        self.state.day()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// True once no node is Infected; further steps change nothing.
    pub fn is_extinct(&self) -> bool {
        self.state.frontier().is_empty()
    }

    /// Every snapshot so far, starting with day 0.
    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn latest(&self) -> &Snapshot {
        // History always holds the day-0 snapshot.
        &self.history[self.history.len() - 1]
    }

    pub fn recorder(&self) -> &MetricsRecorder {
        &self.recorder
    }

    pub fn metrics(&self) -> EpidemicMetrics {
        self.recorder.summary()
    }

    /// Stop accepting steps. Reads remain available.
    pub fn terminate(&mut self) {
        if self.status == RunStatus::Active {
            info!(day = self.day(), "terminated simulation");
        }
        self.status = RunStatus::Terminated;
    }

    /// Evaluate every contact of every Infected node against the
    /// start-of-day state and return the nodes to infect, in discovery order.
    fn collect_exposures(&mut self, spreaders: &[NodeId]) -> Vec<NodeId> {
        let population = Arc::clone(&self.population);
        let graph = population.graph();
        let spatial = population.spatial().filter(|_| self.params.is_spatial());
        let p = self.params.transmission_prob;
        let mut exposed = Vec::new();

        for &source in spreaders {
            for (target, weight) in graph.neighbors(source) {
                if self.pending[target] || !self.state.is_susceptible(target) {
                    continue;
                }
                let proximity = spatial.map_or(1.0, |index| index.proximity_factor(source, target));
                let prob = p * weight * proximity;
                if self.rng.random::<f64>() < prob {
                    self.pending[target] = true;
                    exposed.push(target);
                }
            }
        }

        for &node in &exposed {
            self.pending[node] = false;
        }
        exposed
    }

    /// Decide which of `spreaders` recover during the step that starts on `day`.
    fn collect_recoveries(&mut self, spreaders: &[NodeId], day: u32) -> Vec<NodeId> {
        match self.params.recovery {
            RecoveryRule::FixedDuration { days } => spreaders
                .iter()
                .copied()
                .filter(|&node| {
                    self.state
                        .infection_day(node)
                        .is_some_and(|infected_on| day - infected_on >= days)
                })
                .collect(),
            RecoveryRule::Probabilistic { prob } => spreaders
                .iter()
                .copied()
                .filter(|_| self.rng.random::<f64>() < prob)
                .collect(),
        }
    }

    /// Advance one day and return its snapshot.
    ///
    /// Transmission is evaluated against the start-of-day state, so a node
    /// infected today does not spread until tomorrow and the result does not
    /// depend on the order in which infected nodes are visited.
    pub fn step(&mut self) -> Result<Snapshot> {
        if self.status == RunStatus::Terminated {
            return Err(SimulationError::InvalidState(format!(
                "simulation was terminated on day {}",
                self.day()
            )));
        }

        let today = self.state.day();
        let spreaders = self.state.frontier().as_slice().to_vec();

        // 1-2. Evaluate exposures from the start-of-day frontier.
        let exposed = self.collect_exposures(&spreaders);

        // 3. Apply queued infections, labelled with the current day.
        let mut new_infections = 0;
        for node in exposed {
            if self.state.infect(node, today) {
                new_infections += 1;
            }
        }

        // 4. Recovery applies to the start-of-day frontier only, measured
        // against the day before it advances.
        let recovered = self.collect_recoveries(&spreaders, today);
        for &node in &recovered {
            self.state.recover(node);
        }

        // 5. Close the day.
        self.state.advance_day();
        debug_assert!(self.state.check_invariants().is_ok());

        let snapshot = Snapshot::capture(&self.state, new_infections, self.coordinates.clone());
        self.recorder.record(&snapshot)?;
        self.history.push(snapshot.clone());

        debug!(
            day = self.state.day(),
            new_infections,
            recovered = recovered.len(),
            infected = self.state.counts().infected,
            "step complete"
        );

        Ok(snapshot)
    }

    /// Step until no node is Infected or `max_steps` steps have run, then
    /// return the full history.
    pub fn run_to_completion(&mut self, max_steps: usize) -> Result<&[Snapshot]> {
        if max_steps == 0 {
            return Err(SimulationError::config("max_steps must be positive"));
        }
        if self.status == RunStatus::Terminated {
            return Err(SimulationError::InvalidState(
                "cannot run a terminated simulation".to_string(),
            ));
        }
        if self.is_extinct() {
            warn!(day = self.day(), "run requested but no node is infected");
        }

        let mut steps = 0;
        while steps < max_steps && !self.is_extinct() {
            self.step()?;
            steps += 1;
        }

        let counts = self.state.counts();
        info!(
            day = self.day(),
            steps,
            extinct = self.is_extinct(),
            susceptible = counts.susceptible,
            infected = counts.infected,
            recovered = counts.recovered,
            "run finished"
        );

        Ok(&self.history)
    }
}

/// Reject run parameters that describe a different network than the one
/// `built` generated.
fn check_same_network(built: &SimulationParameters, params: &SimulationParameters) -> Result<()> {
    let mismatch = if built.topology != params.topology {
        Some("topology")
    } else if built.contact_weights != params.contact_weights {
        Some("contact_weights")
    } else if built.initial_infected != params.initial_infected {
        Some("initial_infected")
    } else if built.spatial != params.spatial {
        Some("spatial")
    } else {
        None
    };
    match mismatch {
        Some(field) => Err(SimulationError::config(format!(
            "{field} differs from the parameters the population was built with"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ContactWeights, Layout, SpatialConfig, Topology};
    use crate::simulation::{Compartment, SeedSet, SimulationBuilder};

    fn ring_simulation(n: usize, p: f64, days: u32) -> Simulation {
        SimulationBuilder::new()
            .population_size(n)
            .transmission_prob(p)
            .ring(2)
            .fixed_recovery(days)
            .seed_nodes([0])
            .seed(7)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_simulation_day_zero() {
        let sim = ring_simulation(10, 0.5, 5);
        assert_eq!(sim.day(), 0);
        assert_eq!(sim.history().len(), 1);
        assert_eq!(sim.latest().counts.infected, 1);
        assert_eq!(sim.latest().new_infections, 0);
        assert_eq!(sim.status(), RunStatus::Active);
    }

    #[test]
    fn test_step_advances_day() {
        let mut sim = ring_simulation(10, 0.5, 5);
        let snapshot = sim.step().unwrap();
        assert_eq!(snapshot.day, 1);
        assert_eq!(sim.day(), 1);
        assert_eq!(sim.history().len(), 2);
        sim.state().check_invariants().unwrap();
    }

    #[test]
    fn test_ring_spreads_one_hop_per_day() {
        let mut sim = ring_simulation(20, 1.0, 1000);
        for t in 1..=12u32 {
            let snapshot = sim.step().unwrap();
            let expected = (2 * t as usize + 1).min(20);
            assert_eq!(snapshot.counts.infected, expected, "day {t}");
        }
    }

    #[test]
    fn test_new_infections_do_not_spread_same_day() {
        // With p = 1 only the direct ring neighbours 1 and 9 are reached on day 1.
        let mut sim = ring_simulation(10, 1.0, 1000);
        let snapshot = sim.step().unwrap();
        assert_eq!(snapshot.state_of(1), Some(Compartment::Infected));
        assert_eq!(snapshot.state_of(2), Some(Compartment::Susceptible));
        assert_eq!(snapshot.new_infections, 2);
    }

    #[test]
    fn test_fixed_duration_recovery_timing() {
        // Seed infected on day 0 with D = 3: still infected through day 3,
        // recovered in the day-4 snapshot.
        let mut sim = ring_simulation(10, 0.0, 3);
        for day in 1..=3 {
            let snapshot = sim.step().unwrap();
            assert_eq!(snapshot.state_of(0), Some(Compartment::Infected), "day {day}");
        }
        let snapshot = sim.step().unwrap();
        assert_eq!(snapshot.state_of(0), Some(Compartment::Recovered));
        assert!(sim.is_extinct());
    }

    #[test]
    fn test_seed_with_unit_duration_survives_first_step() {
        let mut sim = ring_simulation(10, 0.0, 1);
        let snapshot = sim.step().unwrap();
        assert_eq!(snapshot.state_of(0), Some(Compartment::Infected));
        assert_eq!(snapshot.counts.infected, 1);
        assert_eq!(sim.state().infection_day(0), Some(0));

        let snapshot = sim.step().unwrap();
        assert_eq!(snapshot.state_of(0), Some(Compartment::Recovered));
    }

    #[test]
    fn test_infection_day_is_day_of_transmission() {
        let mut sim = ring_simulation(10, 1.0, 1000);
        sim.step().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.state().infection_day(1), Some(0));
        assert_eq!(sim.state().infection_day(2), Some(1));
    }

    #[test]
    fn test_infected_snapshot_counts_per_node() {
        // Seeds appear in D + 1 snapshots (days 0..=D); nodes infected
        // during a step first appear the day after and stay for D snapshots.
        let days = 4;
        let mut sim = ring_simulation(30, 1.0, days);
        sim.run_to_completion(100).unwrap();

        for node in 0..30 {
            let infected_days = sim
                .history()
                .iter()
                .filter(|s| s.state_of(node) == Some(Compartment::Infected))
                .count();
            let expected = if node == 0 { days + 1 } else { days };
            assert_eq!(infected_days, expected as usize, "node {node}");
        }
    }

    #[test]
    fn test_probabilistic_recovery_one_recovers_immediately() {
        let mut sim = SimulationBuilder::new()
            .population_size(5)
            .transmission_prob(0.0)
            .complete()
            .recovery_prob(1.0)
            .seed_nodes([0, 1])
            .seed(1)
            .build()
            .unwrap();
        let snapshot = sim.step().unwrap();
        assert_eq!(snapshot.counts.recovered, 2);
        assert_eq!(snapshot.counts.infected, 0);
    }

    #[test]
    fn test_probabilistic_recovery_zero_never_recovers() {
        let mut sim = SimulationBuilder::new()
            .population_size(5)
            .transmission_prob(0.0)
            .complete()
            .recovery_prob(0.0)
            .seed(1)
            .build()
            .unwrap();
        sim.run_to_completion(50).unwrap();
        assert_eq!(sim.latest().counts.infected, 1);
        assert_eq!(sim.day(), 50);
    }

    #[test]
    fn test_step_after_extinction_is_noop() {
        let mut sim = ring_simulation(10, 0.0, 1);
        sim.step().unwrap();
        sim.step().unwrap();
        assert!(sim.is_extinct());
        let before = sim.latest().counts;
        let snapshot = sim.step().unwrap();
        assert_eq!(snapshot.counts, before);
        assert_eq!(snapshot.new_infections, 0);
        assert_eq!(snapshot.day, 3);
    }

    #[test]
    fn test_terminated_simulation_rejects_steps() {
        let mut sim = ring_simulation(10, 0.5, 5);
        sim.terminate();
        assert!(matches!(sim.step(), Err(SimulationError::InvalidState(_))));
        assert!(matches!(
            sim.run_to_completion(5),
            Err(SimulationError::InvalidState(_))
        ));
        assert_eq!(sim.metrics().series.len(), 1);
    }

    #[test]
    fn test_run_to_completion_rejects_zero_budget() {
        let mut sim = ring_simulation(10, 0.5, 5);
        assert!(matches!(
            sim.run_to_completion(0),
            Err(SimulationError::Configuration(_))
        ));
        assert_eq!(sim.day(), 0);
    }

    #[test]
    fn test_run_to_completion_respects_budget() {
        let mut sim = ring_simulation(100, 1.0, 1000);
        let history = sim.run_to_completion(7).unwrap();
        assert_eq!(history.len(), 8);
        assert_eq!(history[7].day, 7);
    }

    #[test]
    fn test_run_to_completion_stops_at_extinction() {
        let mut sim = ring_simulation(10, 0.0, 2);
        sim.run_to_completion(100).unwrap();
        assert_eq!(sim.day(), 3);
        assert!(sim.is_extinct());
    }

    #[test]
    fn test_spatial_snapshots_carry_coordinates() {
        let mut sim = SimulationBuilder::new()
            .population_size(25)
            .transmission_prob(0.5)
            .erdos_renyi(0.2)
            .spatial(SpatialConfig::default())
            .seed(3)
            .build()
            .unwrap();
        let snapshot = sim.step().unwrap();
        assert_eq!(snapshot.coordinates.as_ref().map(|c| c.len()), Some(25));
    }

    /// New infections on day 1 of a p = 1 complete-graph run seeded at node 0.
    fn complete_first_day(
        n: usize,
        seed: u64,
        configure: impl Fn(SimulationBuilder) -> SimulationBuilder,
    ) -> usize {
        let builder = SimulationBuilder::new()
            .population_size(n)
            .transmission_prob(1.0)
            .complete()
            .fixed_recovery(1000)
            .seed_nodes([0])
            .seed(seed);
        let mut sim = configure(builder).build().unwrap();
        sim.step().unwrap().new_infections
    }

    #[test]
    fn test_proximity_scales_transmission() {
        let n = 20;
        assert_eq!(complete_first_day(n, 5, |b| b), n - 1);

        // Circle neighbours are 0.31 apart; a tiny length scale leaves
        // almost no chance of transmission even with p = 1.
        let distant = complete_first_day(n, 5, |b| {
            b.spatial(SpatialConfig {
                layout: Layout::Circle,
                length_scale: 0.01,
            })
        });
        assert_eq!(distant, 0);
    }

    #[test]
    fn test_near_contacts_infected_more_often_than_far() {
        let n = 40;
        let (mut near, mut far) = (0, 0);
        for seed in 0..20 {
            let mut sim = SimulationBuilder::new()
                .population_size(n)
                .transmission_prob(1.0)
                .complete()
                .fixed_recovery(1000)
                .seed_nodes([0])
                .spatial(SpatialConfig {
                    layout: Layout::Circle,
                    length_scale: 0.3,
                })
                .seed(seed)
                .build()
                .unwrap();
            let snapshot = sim.step().unwrap();
            near += [1, 2, 38, 39]
                .iter()
                .filter(|&&v| snapshot.state_of(v) == Some(Compartment::Infected))
                .count();
            far += (15..=25)
                .filter(|&v| snapshot.state_of(v) == Some(Compartment::Infected))
                .count();
        }
        assert!(near > far, "near {near} far {far}");
        assert!(near > 10);
    }

    #[test]
    fn test_edge_weights_scale_transmission() {
        let n = 30;
        let runs = 20;
        let total: usize = (0..runs)
            .map(|seed| complete_first_day(n, seed, |b| b.random_weights(0.1, 0.2)))
            .sum();
        // Expected about 0.15 * 29 per run; unweighted p = 1 would give 29.
        assert!(total < (n - 1) * runs as usize / 2, "total {total}");
        assert!(total > 20, "total {total}");
    }

    #[test]
    fn test_shared_population_runs_independently() {
        let mut params = SimulationParameters::new(60, 0.3);
        params.topology = Topology::SmallWorld {
            degree: 4,
            rewire_prob: 0.1,
        };
        params.contact_weights = ContactWeights::Random { min: 0.5, max: 1.0 };
        params.initial_infected = SeedSet::Random { count: 2 };
        params.seed = Some(11);
        let population = Arc::new(GraphBuilder::build(&params).unwrap());

        let mut a = Simulation::with_population(params.clone(), Arc::clone(&population)).unwrap();
        let mut b = Simulation::with_population(params.clone(), Arc::clone(&population)).unwrap();
        a.run_to_completion(30).unwrap();
        b.run_to_completion(30).unwrap();
        assert_eq!(a.history(), b.history());
        assert_eq!(Arc::strong_count(&population), 3);
    }

    #[test]
    fn test_with_population_rejects_size_mismatch() {
        let params = SimulationParameters::new(10, 0.1);
        let population = Arc::new(GraphBuilder::build(&params).unwrap());
        let other = SimulationParameters::new(12, 0.1);
        assert!(Simulation::with_population(other, population).is_err());
    }

    #[test]
    fn test_with_population_rejects_different_network() {
        let mut params = SimulationParameters::new(20, 0.2);
        params.seed = Some(4);
        let population = Arc::new(GraphBuilder::build(&params).unwrap());

        let mut other = params.clone();
        other.topology = Topology::Complete;
        let err = Simulation::with_population(other, Arc::clone(&population)).unwrap_err();
        assert!(err.to_string().contains("topology"));

        let mut other = params.clone();
        other.initial_infected = SeedSet::Nodes(vec![5]);
        assert!(Simulation::with_population(other, Arc::clone(&population)).is_err());

        let mut other = params.clone();
        other.spatial = Some(SpatialConfig::default());
        assert!(Simulation::with_population(other, Arc::clone(&population)).is_err());

        // Transmission, recovery and seed may vary between runs.
        let mut other = params;
        other.transmission_prob = 0.9;
        other.recovery = crate::simulation::RecoveryRule::Probabilistic { prob: 0.3 };
        other.seed = Some(77);
        assert!(Simulation::with_population(other, population).is_ok());
    }

    #[test]
    fn test_unseeded_run_on_population_replays_from_its_parameters() {
        let mut params = SimulationParameters::new(50, 0.4);
        params.initial_infected = SeedSet::Random { count: 2 };
        let population = Arc::new(GraphBuilder::build(&params).unwrap());

        let mut shared = Simulation::with_population(params, Arc::clone(&population)).unwrap();
        assert_eq!(Some(shared.seed()), population.seed());

        let mut fresh = Simulation::new(population.parameters().unwrap().clone()).unwrap();
        shared.run_to_completion(40).unwrap();
        fresh.run_to_completion(40).unwrap();
        assert_eq!(shared.history(), fresh.history());
    }

    #[test]
    fn test_resolved_seed_is_recorded() {
        let sim = SimulationBuilder::new()
            .population_size(10)
            .transmission_prob(0.1)
            .build()
            .unwrap();
        assert_eq!(sim.params().seed, Some(sim.seed()));
    }
}
