pub mod microlp;

use thiserror::Error;

pub use self::microlp::MicroLpSolver;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("problem is infeasible")]
    Infeasible,
    #[error("problem is unbounded")]
    Unbounded,
    #[error("time limit reached")]
    Timeout,
    #[error("{0}")]
    Backend(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// `sum(coef * x[var]) == rhs`
#[derive(Clone, Debug)]
pub struct EqConstraint {
    pub name: String,
    pub terms: Vec<(usize, f64)>,
    pub rhs: f64,
}

/// A linear program over binary variables `0..n_vars` with equality rows only.
#[derive(Clone, Debug)]
pub struct BinaryProgram {
    pub sense: Sense,
    pub objective: Vec<f64>,
    pub constraints: Vec<EqConstraint>,
}

impl BinaryProgram {
    pub fn n_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }
}

#[derive(Clone, Debug)]
pub struct MilpSolution {
    pub values: Vec<f64>,
    pub objective: f64,
}

/// A mixed-integer backend. Implementations must not share state between calls, so
/// independent runs can never see each other's variables or rows.
pub trait MilpSolver {
    fn name(&self) -> &str;

    /// Solves to optimality within `timeout` seconds. An infinite timeout means no limit.
    fn solve(&self, program: &BinaryProgram, timeout: f64) -> Result<MilpSolution, SolverError>;
}
