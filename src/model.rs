use std::collections::HashMap;

use crate::{
    config::{CostWeights, ObjectiveType},
    error::PlanError,
    feasibility::{FeasibilityGraph, Node},
    problem::{Problem, VenueId},
    solvers::{BinaryProgram, EqConstraint, Sense},
};

/// The arc-selection program for one run. Variable `i` selects `graph.arcs[i]`.
#[derive(Debug)]
pub struct NetworkModel<'a> {
    pub graph: &'a FeasibilityGraph,
    pub objective: ObjectiveType,
    pub weights: CostWeights,
    pub program: BinaryProgram,
}

#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Totals {
    pub time: f64,
    pub distance: f64,
    pub cost: f64,
}

impl<'a> NetworkModel<'a> {
    pub fn build(
        problem: &Problem,
        graph: &'a FeasibilityGraph,
        objective: ObjectiveType,
        weights: CostWeights,
    ) -> Result<NetworkModel<'a>, PlanError> {
        let _p = hprof::enter("network model");

        let mut node_idx: HashMap<Node, usize> = HashMap::new();
        node_idx.insert(Node::Source, 0);
        node_idx.insert(Node::Sink, 1);
        for g in graph.games.iter() {
            let idx = node_idx.len();
            node_idx.insert(Node::Game(*g), idx);
        }

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_idx.len()];
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_idx.len()];
        let mut into_venue: Vec<Vec<usize>> = vec![Vec::new(); problem.venues.len()];
        for (arc_idx, arc) in graph.arcs.iter().enumerate() {
            let (from, to) = match (node_idx.get(&arc.from), node_idx.get(&arc.to)) {
                (Some(f), Some(t)) => (*f, *t),
                _ => {
                    return Err(PlanError::Internal(format!(
                        "arc {:?} -> {:?} leaves the window",
                        arc.from, arc.to
                    )))
                }
            };
            outgoing[from].push(arc_idx);
            incoming[to].push(arc_idx);
            if let Node::Game(g) = arc.to {
                into_venue[usize::from(problem.games[g].venue)].push(arc_idx);
            }
        }

        // A venue nobody can arrive at makes the visit-once row `0 == 1`.
        if let Some(venue) = into_venue.iter().position(|arcs| arcs.is_empty()) {
            log::info!(
                "No game at {} between {} and {}",
                problem.venues[VenueId::from(venue)].name,
                graph.window.start,
                graph.window.end
            );
            return Err(PlanError::Infeasible {
                start: graph.window.start,
                end: graph.window.end,
                games: graph.games.len(),
                venues: problem.venues.len(),
            });
        }

        let mut constraints = Vec::with_capacity(node_idx.len() + problem.venues.len());

        // CONSTRAINT 1: flow balance
        let mut nodes = node_idx.iter().map(|(n, i)| (*i, *n)).collect::<Vec<_>>();
        nodes.sort_by_key(|(i, _)| *i);
        for (idx, node) in nodes {
            let supply = match node {
                Node::Source => 1.0,
                Node::Sink => -1.0,
                Node::Game(_) => 0.0,
            };
            let terms = outgoing[idx]
                .iter()
                .map(|a| (*a, 1.0))
                .chain(incoming[idx].iter().map(|a| (*a, -1.0)))
                .collect();
            constraints.push(EqConstraint {
                name: format!("balance_{:?}", node),
                terms,
                rhs: supply,
            });
        }

        // CONSTRAINT 2: visit every venue once
        for (venue, arcs) in into_venue.iter().enumerate() {
            constraints.push(EqConstraint {
                name: format!("visit_once_{}", problem.venues[VenueId::from(venue)].name),
                terms: arcs.iter().map(|a| (*a, 1.0)).collect(),
                rhs: 1.0,
            });
        }

        let objective_coefs = graph
            .arcs
            .iter()
            .map(|arc| match objective {
                ObjectiveType::TotalTime => arc.time,
                ObjectiveType::TotalCost => {
                    weights.time_per_day * arc.time + weights.distance_per_mile * arc.distance
                }
            })
            .collect();

        Ok(NetworkModel {
            graph,
            objective,
            weights,
            program: BinaryProgram {
                sense: Sense::Minimize,
                objective: objective_coefs,
                constraints,
            },
        })
    }

    pub fn n_vars(&self) -> usize {
        self.program.n_vars()
    }

    pub fn n_constraints(&self) -> usize {
        self.program.constraints.len()
    }

    /// Total time, distance and monetized cost of a set of selected arcs.
    pub fn totals(&self, selected: &[usize]) -> Totals {
        let time = selected.iter().map(|a| self.graph.arcs[*a].time).sum::<f64>();
        let distance = selected
            .iter()
            .map(|a| self.graph.arcs[*a].distance)
            .sum::<f64>();
        Totals {
            time,
            distance,
            cost: self.weights.time_per_day * time + self.weights.distance_per_mile * distance,
        }
    }
}
