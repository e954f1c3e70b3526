use rayon::prelude::*;

use crate::problem::{DateWindow, GameId, Problem};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Node {
    Source,
    Sink,
    Game(GameId),
}

impl Node {
    pub fn game(self) -> Option<GameId> {
        match self {
            Node::Game(g) => Some(g),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Arc {
    pub from: Node,
    pub to: Node,
    /// Days charged for taking the arc.
    pub time: f64,
    /// Miles driven along the arc.
    pub distance: f64,
}

/// Candidate transitions for one run window.
#[derive(Debug)]
pub struct FeasibilityGraph {
    pub window: DateWindow,
    /// Window games in start-time order.
    pub games: Vec<GameId>,
    pub arcs: Vec<Arc>,
}

fn days(d: chrono::Duration) -> f64 {
    d.num_milliseconds() as f64 / 86_400_000.0
}

impl FeasibilityGraph {
    /// Links every game to the earliest reachable game at each other venue, plus the
    /// source and sink arcs. A later game at the same venue can always be reached by
    /// waiting there, so only the first candidate is kept.
    pub fn build(problem: &Problem, window: DateWindow) -> FeasibilityGraph {
        let _p = hprof::enter("feasibility graph");
        let games = problem.games_in(&window);
        let n_venues = problem.venues.len();

        let transitions = games
            .par_iter()
            .flat_map_iter(|&g1| {
                let mut earliest: Vec<Option<GameId>> = vec![None; n_venues];
                let venue1 = problem.games[g1].venue;
                for &g2 in games.iter() {
                    let venue2 = problem.games[g2].venue;
                    if venue1 == venue2 || !problem.can_reach(g1, g2) {
                        continue;
                    }
                    let slot = &mut earliest[usize::from(venue2)];
                    // `games` is in (start, id) order, so the first hit is the earliest.
                    if slot.is_none() {
                        *slot = Some(g2);
                    }
                }
                earliest.into_iter().flatten().map(move |g2| {
                    let (a, b) = (&problem.games[g1], &problem.games[g2]);
                    Arc {
                        from: Node::Game(g1),
                        to: Node::Game(g2),
                        time: days(b.end - a.end),
                        distance: problem.travel.miles(a.venue, b.venue),
                    }
                })
            })
            .collect::<Vec<_>>();

        let mut arcs = transitions;
        arcs.extend(games.iter().map(|&g| {
            let game = &problem.games[g];
            Arc {
                from: Node::Source,
                to: Node::Game(g),
                time: days(game.end - game.start),
                distance: 0.0,
            }
        }));
        arcs.extend(games.iter().map(|&g| Arc {
            from: Node::Game(g),
            to: Node::Sink,
            time: 0.0,
            distance: 0.0,
        }));

        log::info!(
            "Feasibility graph for {} to {}: {} games, {} arcs",
            window.start,
            window.end,
            games.len(),
            arcs.len()
        );

        FeasibilityGraph {
            window,
            games,
            arcs,
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.games.len() + 2
    }
}
