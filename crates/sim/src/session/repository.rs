use super::SimulationId;
use crate::errors::{Result, SimulationError};
use crate::graph::Population;
use crate::metrics::EpidemicMetrics;
use crate::simulation::{Simulation, SimulationParameters, SimulationState, Snapshot};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Owns every live simulation and routes operations to it by id.
///
/// Each entry holds its own graph handle, state and generator, so distinct
/// simulations never interact. Callers that drive simulations from several
/// threads wrap the repository, or individual simulations, in their own lock.
#[derive(Debug, Default)]
pub struct SimulationRepository {
    simulations: BTreeMap<SimulationId, Simulation>,
    next_id: u64,
}

impl SimulationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `params`, build the population and register a new simulation.
    pub fn create(&mut self, params: SimulationParameters) -> Result<SimulationId> {
        let simulation = Simulation::new(params)?;
        Ok(self.insert(simulation))
    }

    /// Register a simulation on a shared, already built population.
    ///
    /// `params` must describe the population's network; see
    /// [`Simulation::with_population`].
    pub fn create_from_population(
        &mut self,
        params: SimulationParameters,
        population: Arc<Population>,
    ) -> Result<SimulationId> {
        let simulation = Simulation::with_population(params, population)?;
        Ok(self.insert(simulation))
    }

    fn insert(&mut self, simulation: Simulation) -> SimulationId {
        let id = SimulationId::new(self.next_id);
        self.next_id += 1;
        info!(%id, seed = simulation.seed(), "registered simulation");
        self.simulations.insert(id, simulation);
        id
    }

    pub fn get(&self, id: SimulationId) -> Result<&Simulation> {
        self.simulations
            .get(&id)
            .ok_or(SimulationError::NotFound(id))
    }

    pub fn get_mut(&mut self, id: SimulationId) -> Result<&mut Simulation> {
        self.simulations
            .get_mut(&id)
            .ok_or(SimulationError::NotFound(id))
    }

    /// Advance simulation `id` by one day.
    pub fn step(&mut self, id: SimulationId) -> Result<Snapshot> {
        self.get_mut(id)?.step()
    }

    /// Current full state of simulation `id`.
    pub fn get_state(&self, id: SimulationId) -> Result<&SimulationState> {
        Ok(self.get(id)?.state())
    }

    /// Most recent snapshot of simulation `id`.
    pub fn latest_snapshot(&self, id: SimulationId) -> Result<&Snapshot> {
        Ok(self.get(id)?.latest())
    }

    pub fn run_to_completion(&mut self, id: SimulationId, max_steps: usize) -> Result<&[Snapshot]> {
        self.get_mut(id)?.run_to_completion(max_steps)
    }

    pub fn metrics(&self, id: SimulationId) -> Result<EpidemicMetrics> {
        Ok(self.get(id)?.metrics())
    }

    /// Stop simulation `id` from accepting further steps. Its state and
    /// metrics stay readable until it is discarded.
    pub fn terminate(&mut self, id: SimulationId) -> Result<()> {
        self.get_mut(id)?.terminate();
        Ok(())
    }

    /// Drop simulation `id` and everything it owns.
    pub fn discard(&mut self, id: SimulationId) -> Result<()> {
        self.simulations
            .remove(&id)
            .map(|_| info!(%id, "discarded simulation"))
            .ok_or(SimulationError::NotFound(id))
    }

    /// Identifiers of live simulations in creation order.
    pub fn ids(&self) -> impl Iterator<Item = SimulationId> + '_ {
        self.simulations.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphBuilder, Topology};

    fn params() -> SimulationParameters {
        let mut params = SimulationParameters::new(20, 0.5);
        params.seed = Some(3);
        params
    }

    #[test]
    fn test_create_assigns_distinct_ids() {
        let mut repo = SimulationRepository::new();
        let a = repo.create(params()).unwrap();
        let b = repo.create(params()).unwrap();
        assert_ne!(a, b);
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_invalid_parameters_register_nothing() {
        let mut repo = SimulationRepository::new();
        let mut bad = params();
        bad.transmission_prob = 2.0;
        assert!(matches!(
            repo.create(bad),
            Err(SimulationError::Configuration(_))
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_step_and_get_state() {
        let mut repo = SimulationRepository::new();
        let id = repo.create(params()).unwrap();
        let snapshot = repo.step(id).unwrap();
        assert_eq!(snapshot.day, 1);
        assert_eq!(repo.get_state(id).unwrap().day(), 1);
        assert_eq!(repo.latest_snapshot(id).unwrap(), &snapshot);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut repo = SimulationRepository::new();
        let id = SimulationId::new(42);
        assert_eq!(repo.step(id).unwrap_err(), SimulationError::NotFound(id));
        assert!(matches!(repo.get_state(id), Err(SimulationError::NotFound(_))));
        assert!(matches!(repo.metrics(id), Err(SimulationError::NotFound(_))));
        assert!(matches!(repo.discard(id), Err(SimulationError::NotFound(_))));
    }

    #[test]
    fn test_discard_releases_simulation() {
        let mut repo = SimulationRepository::new();
        let id = repo.create(params()).unwrap();
        repo.discard(id).unwrap();
        assert!(repo.is_empty());
        assert_eq!(repo.step(id).unwrap_err(), SimulationError::NotFound(id));
        assert!(matches!(
            repo.run_to_completion(id, 10),
            Err(SimulationError::NotFound(_))
        ));
    }

    #[test]
    fn test_terminate_keeps_reads() {
        let mut repo = SimulationRepository::new();
        let id = repo.create(params()).unwrap();
        repo.step(id).unwrap();
        repo.terminate(id).unwrap();
        assert!(matches!(repo.step(id), Err(SimulationError::InvalidState(_))));
        assert_eq!(repo.metrics(id).unwrap().days, 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut repo = SimulationRepository::new();
        let a = repo.create(params()).unwrap();
        repo.discard(a).unwrap();
        let b = repo.create(params()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_population_mismatch_registers_nothing() {
        let p = params();
        let population = Arc::new(GraphBuilder::build(&p).unwrap());
        let mut other = p;
        other.topology = Topology::Complete;

        let mut repo = SimulationRepository::new();
        assert!(matches!(
            repo.create_from_population(other, population),
            Err(SimulationError::Configuration(_))
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_shared_population_template() {
        let mut p = params();
        p.topology = Topology::Complete;
        let population = Arc::new(GraphBuilder::build(&p).unwrap());

        let mut repo = SimulationRepository::new();
        let a = repo.create_from_population(p.clone(), Arc::clone(&population)).unwrap();
        let b = repo.create_from_population(p, Arc::clone(&population)).unwrap();
        repo.run_to_completion(a, 20).unwrap();
        assert_eq!(repo.get_state(b).unwrap().day(), 0);
        assert!(Arc::ptr_eq(
            repo.get(a).unwrap().population(),
            repo.get(b).unwrap().population()
        ));
    }

    #[test]
    fn test_metrics_are_idempotent() {
        let mut repo = SimulationRepository::new();
        let id = repo.create(params()).unwrap();
        repo.run_to_completion(id, 50).unwrap();
        assert_eq!(repo.metrics(id).unwrap(), repo.metrics(id).unwrap());
    }
}
