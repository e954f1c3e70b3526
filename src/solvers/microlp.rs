use std::time::Duration;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolutionStatus, SolverModel, WithTimeLimit,
};
use log::debug;

use super::{BinaryProgram, MilpSolution, MilpSolver, Sense, SolverError};

/// Branch-and-bound through `good_lp`'s pure Rust `microlp` backend.
///
/// Each call builds its own `good_lp` model and solves it on the calling thread. The time
/// limit is handed to microlp, which stops at its deadline; stopping early fails closed even
/// when an incumbent exists.
#[derive(Default, Clone, Copy, Debug)]
pub struct MicroLpSolver;

impl MilpSolver for MicroLpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, program: &BinaryProgram, timeout: f64) -> Result<MilpSolution, SolverError> {
        let _p = hprof::enter("microlp solve");
        let limit = match Duration::try_from_secs_f64(timeout) {
            Ok(limit) => Some(limit),
            Err(_) if timeout == f64::INFINITY => None,
            Err(_) => return Err(SolverError::Backend(format!("invalid time limit {}", timeout))),
        };

        let mut vars = ProblemVariables::new();
        let x = (0..program.n_vars())
            .map(|_| vars.add(variable().binary()))
            .collect::<Vec<_>>();

        let objective = program
            .objective
            .iter()
            .zip(x.iter())
            .filter(|(c, _)| **c != 0.0)
            .fold(Expression::from(0.0), |acc, (c, v)| acc + *c * *v);

        let mut model = match program.sense {
            Sense::Minimize => vars.minimise(objective),
            Sense::Maximize => vars.maximise(objective),
        }
        .using(default_solver);
        if let Some(limit) = limit {
            model = model.with_time_limit(limit.as_secs_f64());
        }

        for row in program.constraints.iter() {
            let lhs = row
                .terms
                .iter()
                .fold(Expression::from(0.0), |acc, (var, c)| acc + *c * x[*var]);
            let rhs = row.rhs;
            model = model.with(constraint!(lhs == rhs));
        }

        debug!(
            "microlp: {} binary variables, {} rows, limit {:?}",
            program.n_vars(),
            program.constraints.len(),
            limit
        );

        let solution = model.solve().map_err(|e| match e {
            ResolutionError::Infeasible => SolverError::Infeasible,
            ResolutionError::Unbounded => SolverError::Unbounded,
            // microlp's only `Other` is a deadline hit before the first incumbent
            ResolutionError::Other(msg) if limit.is_some() => {
                debug!("microlp stopped: {}", msg);
                SolverError::Timeout
            }
            other => SolverError::Backend(other.to_string()),
        })?;

        if matches!(solution.status(), SolutionStatus::TimeLimit) {
            debug!("microlp reached its time limit with an unproven incumbent");
            return Err(SolverError::Timeout);
        }

        let values = x.iter().map(|v| solution.value(*v)).collect::<Vec<_>>();
        Ok(MilpSolution {
            objective: program.evaluate(&values),
            values,
        })
    }
}
