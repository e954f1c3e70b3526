use typed_index_collections::TiVec;

use crate::{
    config::{CostWeights, ObjectiveType, RunParameters},
    error::PlanError,
    output::RunRecord,
    plan,
    problem::{DateWindow, Game, GameId, Problem},
    solvers::{stub::FixedSolver, MicroLpSolver, SolverError},
    testdata::{self, at},
};

fn params(window: DateWindow, objective: ObjectiveType) -> RunParameters {
    let mut params = RunParameters::new(window.start, window.end, objective);
    params.timeout = 60.0;
    params
}

fn run(problem: &Problem, params: &RunParameters) -> Result<RunRecord, PlanError> {
    plan(problem, params, &MicroLpSolver)
}

fn homes(record: &RunRecord) -> Vec<String> {
    record.route.iter().map(|e| e.venue.clone()).collect()
}

fn check_route(problem: &Problem, record: &RunRecord) {
    let ids = record
        .route
        .iter()
        .map(|e| {
            problem
                .games
                .iter_enumerated()
                .find(|(_, g)| g.start == e.start && problem.venues[g.venue].name == e.venue)
                .map(|(id, _)| id)
                .unwrap()
        })
        .collect::<Vec<_>>();
    assert_eq!(problem.verify_route(&ids), Ok(()));
}

#[test]
pub fn three_venues_in_start_order() {
    let problem = testdata::three_venues();
    let record = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime)).unwrap();
    assert_eq!(homes(&record), vec!["A Park", "B Park", "C Park"]);
    check_route(&problem, &record);

    // April 1 19:00 to April 3 22:00
    assert!((record.total_time - 2.125).abs() < 1e-6);
    assert!((record.objective_value - 2.125).abs() < 1e-6);
    assert!((record.total_distance - 110.0).abs() < 1e-6);
    assert!((record.total_cost - (130.0 * 2.125 + 0.25 * 110.0)).abs() < 1e-6);

    assert_eq!(record.metrics.games, 3);
    assert_eq!(record.metrics.variables, record.metrics.arcs);
    assert_eq!(record.metrics.constraints, 5 + 3);
    assert_eq!(record.route[0].seq, 1);
    assert!(record.statistics.is_some());
}

#[test]
pub fn unreachable_venue_is_infeasible() {
    let problem = testdata::too_far();
    let result = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime));
    assert!(matches!(
        result,
        Err(PlanError::Infeasible {
            games: 2,
            venues: 2,
            ..
        })
    ));
}

#[test]
pub fn drive_past_the_calendar_is_infeasible() {
    let problem = testdata::off_the_calendar();
    let result = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime));
    assert!(matches!(
        result,
        Err(PlanError::Infeasible { venues: 2, .. })
    ));
}

#[test]
pub fn cost_with_time_weight_one_matches_time() {
    let problem = testdata::time_versus_distance();
    let by_time = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime)).unwrap();

    let mut cost_params = params(testdata::april(), ObjectiveType::TotalCost);
    cost_params.weights = CostWeights {
        time_per_day: 1.0,
        distance_per_mile: 0.0,
    };
    let by_cost = run(&problem, &cost_params).unwrap();

    assert!((by_time.objective_value - by_cost.objective_value).abs() < 1e-6);
    assert_eq!(homes(&by_time), homes(&by_cost));
    assert_eq!(homes(&by_time), vec!["A Park", "B Park", "C Park", "D Park"]);
    // April 1 19:00 to April 4 22:00
    assert!((by_time.objective_value - 3.125).abs() < 1e-6);
    assert!((by_time.total_distance - 900.0).abs() < 1e-6);
}

#[test]
pub fn distance_weight_changes_route() {
    let problem = testdata::time_versus_distance();
    let mut cost_params = params(testdata::april(), ObjectiveType::TotalCost);
    cost_params.weights = CostWeights {
        time_per_day: 1.0,
        distance_per_mile: 1.0,
    };
    let record = run(&problem, &cost_params).unwrap();
    check_route(&problem, &record);
    assert_eq!(homes(&record), vec!["C Park", "B Park", "D Park", "A Park"]);
    assert!((record.total_distance - 300.0).abs() < 1e-6);
    assert!((record.objective_value - (5.125 + 300.0)).abs() < 1e-6);
}

#[test]
pub fn rerun_gives_same_objective() {
    let problem = testdata::with_later_candidates();
    let p = params(testdata::april(), ObjectiveType::TotalCost);
    let first = run(&problem, &p).unwrap();
    let second = run(&problem, &p).unwrap();
    assert!((first.objective_value - second.objective_value).abs() < 1e-9);
}

#[test]
pub fn wider_window_is_never_worse() {
    let problem = testdata::with_later_candidates();
    let wide = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime)).unwrap();
    let narrow_window = DateWindow {
        start: at(2018, 4, 2, 0, 0).date(),
        end: testdata::april().end,
    };
    let narrow = run(&problem, &params(narrow_window, ObjectiveType::TotalTime)).unwrap();
    check_route(&problem, &narrow);
    assert!(wide.objective_value <= narrow.objective_value + 1e-9);
    // without the April 1 game at A Park the trip has to end there on April 7
    assert!(narrow.objective_value > wide.objective_value);
    assert_eq!(homes(&narrow), vec!["B Park", "C Park", "A Park"]);
}

#[test]
pub fn later_candidates_do_not_matter() {
    let problem = testdata::with_later_candidates();
    let full = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime)).unwrap();

    // Drop the games at B and C that game 0 could reach, but only after an earlier one.
    let games: TiVec<GameId, Game> = problem
        .games
        .iter()
        .filter(|g| g.id != 4 && g.id != 5)
        .cloned()
        .collect();
    let pruned = Problem::new(problem.venues.clone(), games, problem.travel.clone()).unwrap();
    let reduced = run(&pruned, &params(testdata::april(), ObjectiveType::TotalTime)).unwrap();

    assert!((full.objective_value - reduced.objective_value).abs() < 1e-9);
    assert_eq!(homes(&full), homes(&reduced));
    assert_eq!(homes(&full), vec!["A Park", "B Park", "C Park"]);
}

#[test]
pub fn solver_timeout_is_reported_with_context() {
    let problem = testdata::three_venues();
    let result = plan(
        &problem,
        &params(testdata::april(), ObjectiveType::TotalTime),
        &FixedSolver(Err(SolverError::Timeout)),
    );
    assert!(matches!(
        result,
        Err(PlanError::TimedOut { games: 3, .. })
    ));
}

#[test]
pub fn unbounded_is_internal() {
    let problem = testdata::three_venues();
    let result = plan(
        &problem,
        &params(testdata::april(), ObjectiveType::TotalTime),
        &FixedSolver(Err(SolverError::Unbounded)),
    );
    assert!(matches!(result, Err(PlanError::Internal(_))));
}

#[test]
pub fn broken_solver_answer_is_not_repaired() {
    let problem = testdata::three_venues();
    // every arc selected
    let n_arcs = crate::feasibility::FeasibilityGraph::build(&problem, testdata::april())
        .arcs
        .len();
    let result = plan(
        &problem,
        &params(testdata::april(), ObjectiveType::TotalTime),
        &FixedSolver(Ok(vec![1.0; n_arcs])),
    );
    assert!(matches!(result, Err(PlanError::Internal(_))));
}

#[test]
pub fn record_report_layout() {
    let problem = testdata::three_venues();
    let record = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime)).unwrap();
    let txt = record.to_string();
    assert!(txt.starts_with("objt: 0\nsdat: 2018-04-01\nedat: 2018-04-30\n"));
    assert!(txt.contains("sdis: 50 1-2\n"));
    assert!(txt.contains("1,A Park,Visitors0,Home0,City0,2018-04-01 19:00:00,30,-100\n"));
    assert!(txt.ends_with("]"));

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["objective"], 0);
    assert_eq!(json["route"][2]["venue"], "C Park");
    assert_eq!(json["statistics"]["most_critical"]["from"], 1);
}

#[test]
pub fn record_json_round_trips_through_a_file() {
    let problem = testdata::three_venues();
    let record = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime)).unwrap();
    let path = std::env::temp_dir().join(format!("tbf-record-{}.json", std::process::id()));
    record.write_json(&path).unwrap();
    let txt = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&txt).unwrap();
    assert_eq!(json["route"][0]["venue"], "A Park");
}

#[cfg(target_os = "linux")]
#[test]
pub fn failed_flush_is_reported() {
    let problem = testdata::three_venues();
    let record = run(&problem, &params(testdata::april(), ObjectiveType::TotalTime)).unwrap();
    // the report fits in the write buffer, so the error only shows up on flush
    assert!(matches!(
        record.write_json("/dev/full"),
        Err(crate::error::InputError::Io { .. })
    ));
}
