//! Turning a solved arc selection back into an itinerary.

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;

use crate::{
    error::PlanError,
    feasibility::{FeasibilityGraph, Node},
    problem::{GameId, Problem},
};

/// Values at or below this are unselected, values at or above `1 - ROUNDING_TOLERANCE` are
/// selected, and anything between is ambiguous.
pub const ROUNDING_TOLERANCE: f64 = 1e-3;

#[derive(Debug)]
pub struct Extracted {
    /// Indices into `graph.arcs`.
    pub selected: Vec<usize>,
    pub route: Vec<GameId>,
    pub ambiguous: usize,
}

/// Reads the selected arcs, checks that they form a single source-to-sink chain, and
/// orders its games by start time.
pub fn extract(
    problem: &Problem,
    graph: &FeasibilityGraph,
    values: &[f64],
) -> Result<Extracted, PlanError> {
    let _p = hprof::enter("extract schedule");
    if values.len() != graph.arcs.len() {
        return Err(PlanError::Internal(format!(
            "solver returned {} values for {} arcs",
            values.len(),
            graph.arcs.len()
        )));
    }

    let mut selected = Vec::new();
    let mut ambiguous = 0;
    for (arc_idx, value) in values.iter().copied().enumerate() {
        if value >= 1.0 - ROUNDING_TOLERANCE {
            selected.push(arc_idx);
        } else if value > ROUNDING_TOLERANCE {
            let arc = &graph.arcs[arc_idx];
            warn!(
                "Arc {:?} -> {:?} has fractional value {:.4}, treating as unused",
                arc.from, arc.to, value
            );
            ambiguous += 1;
        }
    }

    let mut next: HashMap<Node, Node> = HashMap::new();
    for arc_idx in selected.iter() {
        let arc = &graph.arcs[*arc_idx];
        if next.insert(arc.from, arc.to).is_some() {
            return Err(PlanError::Internal(format!(
                "{:?} has more than one selected successor",
                arc.from
            )));
        }
    }

    let mut chain = Vec::new();
    let mut node = Node::Source;
    while let Some(succ) = next.get(&node).copied() {
        if chain.len() > selected.len() {
            return Err(PlanError::Internal("selected arcs contain a cycle".to_string()));
        }
        chain.push(node);
        node = succ;
    }
    if node != Node::Sink {
        return Err(PlanError::Internal(format!(
            "selected chain stops at {:?} instead of the sink",
            node
        )));
    }
    if chain.len() != selected.len() {
        return Err(PlanError::Internal(format!(
            "{} selected arcs are not on the source-sink chain",
            selected.len() - chain.len()
        )));
    }

    let in_chain_order = chain.iter().filter_map(|n| n.game()).collect::<Vec<_>>();
    let mut route = in_chain_order.clone();
    route.sort_by_key(|g| (problem.games[*g].start, *g));
    if route != in_chain_order {
        return Err(PlanError::Internal(
            "selected chain is not in start-time order".to_string(),
        ));
    }

    problem
        .verify_route(&route)
        .map_err(|v| PlanError::Internal(format!("route violates {:?}", v)))?;

    Ok(Extracted {
        selected,
        route,
        ambiguous,
    })
}

/// A measured transition between route positions `from` and `to` (1-based).
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Transition {
    pub value: f64,
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct RouteStatistics {
    /// Miles.
    pub shortest_distance: Transition,
    pub longest_distance: Transition,
    /// Minutes between the end of one game and the start of the next.
    pub shortest_idle: Transition,
    pub longest_idle: Transition,
    /// Idle minutes minus driving minutes, smallest first.
    pub most_critical: Transition,
}

impl RouteStatistics {
    /// `None` for routes with fewer than two games.
    pub fn compute(problem: &Problem, route: &[GameId]) -> Option<RouteStatistics> {
        let mut legs = route.windows(2).enumerate().map(|(i, pair)| {
            let (g1, g2) = (&problem.games[pair[0]], &problem.games[pair[1]]);
            let idle = (g2.start - g1.end).num_seconds() as f64 / 60.0;
            let driving = problem.travel.minutes(g1.venue, g2.venue);
            let distance = problem.travel.miles(g1.venue, g2.venue);
            let at = |value| Transition {
                value,
                from: i + 1,
                to: i + 2,
            };
            (at(distance), at(idle), at(idle - driving))
        });

        let (distance, idle, slack) = legs.next()?;
        let mut stats = RouteStatistics {
            shortest_distance: distance,
            longest_distance: distance,
            shortest_idle: idle,
            longest_idle: idle,
            most_critical: slack,
        };
        // Strict comparisons keep the first occurrence on ties.
        for (distance, idle, slack) in legs {
            if distance.value < stats.shortest_distance.value {
                stats.shortest_distance = distance;
            }
            if distance.value > stats.longest_distance.value {
                stats.longest_distance = distance;
            }
            if idle.value < stats.shortest_idle.value {
                stats.shortest_idle = idle;
            }
            if idle.value > stats.longest_idle.value {
                stats.longest_idle = idle;
            }
            if slack.value < stats.most_critical.value {
                stats.most_critical = slack;
            }
        }
        debug!("Route statistics {:?}", stats);
        Some(stats)
    }
}
