//! Generation-level evaluation loop.
//!
//! The harness owns one [`Agent`] per genome under evaluation and steps them
//! all in lock-step over a shared, read-only [`TrackModel`]:
//! - Phase 1: every alive agent gains one fitness point
//! - Phase 2: crashed agents leave the active set, keeping their fitness
//! - Phase 3: each controller reads its vehicle's sensors and picks a decision
//! - Phase 4: every vehicle runs its update
//!
//! Phases 3 and 4 run in parallel with rayon. Each agent only touches its own
//! state, so no synchronisation is needed.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::controller::Controller;
use super::track::TrackModel;
use super::vehicle::Vehicle;

/// Stable identity of an agent: its index in the population handed to the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub usize);

/// One vehicle with its controller and fitness for a single generation.
pub struct Agent {
    /// Stable identity within the generation.
    pub id: AgentId,
    /// Simulated vehicle.
    pub vehicle: Vehicle,
    /// Policy steering the vehicle.
    pub controller: Box<dyn Controller>,
    /// Ticks survived so far.
    pub fitness: u64,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("vehicle", &self.vehicle)
            .field("fitness", &self.fitness)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    /// Agents remain and the tick budget is not exhausted.
    Running,
    /// Every agent crashed or the tick budget was reached.
    Finished,
}

/// Outcome of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Index of the evaluated generation.
    pub generation: u32,
    /// Ticks simulated.
    pub ticks: u64,
    /// Final fitness per agent, indexed by [`AgentId`].
    pub fitness: Vec<u64>,
}

impl GenerationReport {
    /// Highest fitness of the generation.
    pub fn best(&self) -> u64 {
        self.fitness.iter().copied().max().unwrap_or(0)
    }

    /// Mean fitness of the generation.
    pub fn mean(&self) -> f64 {
        if self.fitness.is_empty() {
            return 0.0;
        }
        self.fitness.iter().sum::<u64>() as f64 / self.fitness.len() as f64
    }
}

/// Steps a population of agents until every vehicle crashed or the budget runs out.
pub struct EvaluationHarness<'a> {
    track: &'a TrackModel,
    agents: Vec<Agent>,
    /// Last known fitness of every agent, alive or removed.
    fitness: Vec<u64>,
    tick: u64,
    generation: u32,
    max_ticks: Option<u64>,
}

impl<'a> EvaluationHarness<'a> {
    /// Creates a harness for one generation.
    ///
    /// # Arguments
    ///
    /// * `track` - Shared occupancy grid
    /// * `population` - One vehicle and controller per agent; the position is the [`AgentId`]
    /// * `generation` - Generation index, used for reporting only
    /// * `max_ticks` - Optional tick budget
    pub fn new(
        track: &'a TrackModel,
        population: Vec<(Vehicle, Box<dyn Controller>)>,
        generation: u32,
        max_ticks: Option<u64>,
    ) -> Self {
        let agents: Vec<Agent> = population
            .into_iter()
            .enumerate()
            .map(|(i, (vehicle, controller))| Agent {
                id: AgentId(i),
                vehicle,
                controller,
                fitness: 0,
            })
            .collect();

        Self {
            track,
            fitness: vec![0; agents.len()],
            agents,
            tick: 0,
            generation,
            max_ticks,
        }
    }

    /// Agents still in the active set.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Generation index this harness evaluates.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Current fitness of `id`, whether it is still active or not.
    pub fn fitness_of(&self, id: AgentId) -> Option<u64> {
        self.fitness.get(id.0).copied()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HarnessState {
        let budget_spent = self.max_ticks.is_some_and(|max| self.tick >= max);
        if self.agents.is_empty() || budget_spent {
            HarnessState::Finished
        } else {
            HarnessState::Running
        }
    }

    /// Simulates one tick and returns the resulting state.
    ///
    /// Calling `step` on a finished harness does nothing.
    pub fn step(&mut self) -> HarnessState {
        if self.state() == HarnessState::Finished {
            return HarnessState::Finished;
        }
        self.tick += 1;

        for agent in &mut self.agents {
            if agent.vehicle.is_alive() {
                agent.fitness += 1;
                self.fitness[agent.id.0] = agent.fitness;
            }
        }

        self.agents.retain(|agent| agent.vehicle.is_alive());

        self.agents.par_iter_mut().for_each(|agent| {
            let readings = agent.vehicle.sensor_vector();
            let decision = agent.controller.decide(&readings);
            agent.vehicle.set_decision(decision);
        });

        let track = self.track;
        self.agents
            .par_iter_mut()
            .for_each(|agent| agent.vehicle.update(track));

        self.state()
    }

    /// Steps until the generation is finished and returns the fitness table.
    pub fn run(mut self) -> GenerationReport {
        while self.step() == HarnessState::Running {}

        GenerationReport {
            generation: self.generation,
            ticks: self.tick,
            fitness: self.fitness,
        }
    }
}
