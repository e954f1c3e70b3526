pub mod config;
pub mod error;
pub mod feasibility;
pub mod model;
pub mod output;
pub mod parser;
pub mod problem;
pub mod schedule;
pub mod solvers;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod testdata;

use std::time::Instant;

use config::RunParameters;
use error::PlanError;
use feasibility::FeasibilityGraph;
use model::NetworkModel;
use output::{RouteEntry, RunRecord, SolveMetrics};
use problem::Problem;
use schedule::RouteStatistics;
use solvers::MilpSolver;

/// Runs one window/objective combination: graph, model, solve, extract.
///
/// Everything built here is owned by this call, so runs on the same `problem` are independent.
pub fn plan(
    problem: &Problem,
    params: &RunParameters,
    solver: &dyn MilpSolver,
) -> Result<RunRecord, PlanError> {
    let _p = hprof::enter("plan");
    params.validate()?;
    let window = params.window();
    log::info!(
        "Planning {} to {} with objective {:?}",
        window.start,
        window.end,
        params.objective
    );

    let t0 = Instant::now();
    let graph = FeasibilityGraph::build(problem, window);
    let data_time = t0.elapsed();

    let t1 = Instant::now();
    let model = NetworkModel::build(problem, &graph, params.objective, params.weights)?;
    let prep_time = t1.elapsed();
    log::info!(
        "Model has {} variables and {} constraints",
        model.n_vars(),
        model.n_constraints()
    );

    let t2 = Instant::now();
    let solution = solver.solve(&model.program, params.timeout).map_err(|e| {
        PlanError::from_solver(
            e,
            &window,
            graph.games.len(),
            problem.venues.len(),
            params.timeout,
        )
    })?;
    let solve_time = t2.elapsed();
    log::info!(
        "{} finished in {:.3}s with objective {:.4}",
        solver.name(),
        solve_time.as_secs_f64(),
        solution.objective
    );

    let extracted = schedule::extract(problem, &graph, &solution.values)?;
    let totals = model.totals(&extracted.selected);
    let statistics = RouteStatistics::compute(problem, &extracted.route);

    let route = extracted
        .route
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let game = &problem.games[*g];
            let venue = problem.venue_of(*g);
            RouteEntry {
                seq: i + 1,
                venue: venue.name.clone(),
                away: game.away.clone(),
                home: game.home.clone(),
                city: game.city.clone(),
                start: game.start,
                lat: venue.lat,
                lon: venue.lon,
            }
        })
        .collect::<Vec<_>>();
    for e in route.iter() {
        log::debug!(
            "{:3} {:<30} {:<12} {:<12} {:<20} {}",
            e.seq,
            e.venue,
            e.away,
            e.home,
            e.city,
            e.start
        );
    }

    Ok(RunRecord {
        objective: params.objective.mode(),
        start_date: window.start,
        end_date: window.end,
        months: window.months(),
        objective_value: solution.objective,
        total_time: totals.time,
        total_distance: totals.distance,
        total_cost: totals.cost,
        metrics: SolveMetrics {
            solver: solver.name().to_string(),
            games: graph.games.len(),
            arcs: graph.arcs.len(),
            variables: model.n_vars(),
            constraints: model.n_constraints(),
            ambiguous_arcs: extracted.ambiguous,
            data_time: data_time.as_secs_f64(),
            prep_time: prep_time.as_secs_f64(),
            solve_time: solve_time.as_secs_f64(),
        },
        statistics,
        route,
    })
}
