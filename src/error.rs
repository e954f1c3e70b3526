use chrono::NaiveDate;
use thiserror::Error;

use crate::solvers::SolverError;

/// Problems with the season data or its files.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown venue '{0}'")]
    UnknownVenue(String),

    #[error("duplicate venue '{0}'")]
    DuplicateVenue(String),

    #[error("duplicate game id {0}")]
    DuplicateGame(u64),

    #[error("invalid timestamp '{value}': expected {expected}")]
    Timestamp { value: String, expected: &'static str },

    #[error("invalid game {id}: {reason}")]
    InvalidGame { id: u64, reason: String },

    #[error("invalid travel entry {origin} -> {destination}: {reason}")]
    InvalidTravel {
        origin: String,
        destination: String,
        reason: String,
    },

    #[error("{0}")]
    Schema(String),
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("no itinerary visits all {venues} venues between {start} and {end} ({games} games)")]
    Infeasible {
        start: NaiveDate,
        end: NaiveDate,
        games: usize,
        venues: usize,
    },

    #[error("solver exceeded {timeout:.1}s between {start} and {end} ({games} games)")]
    TimedOut {
        start: NaiveDate,
        end: NaiveDate,
        games: usize,
        timeout: f64,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl PlanError {
    pub(crate) fn from_solver(
        err: SolverError,
        window: &crate::problem::DateWindow,
        games: usize,
        venues: usize,
        timeout: f64,
    ) -> PlanError {
        match err {
            SolverError::Infeasible => PlanError::Infeasible {
                start: window.start,
                end: window.end,
                games,
                venues,
            },
            SolverError::Timeout => PlanError::TimedOut {
                start: window.start,
                end: window.end,
                games,
                timeout,
            },
            SolverError::Unbounded => {
                PlanError::Internal("unit-capacity arc model reported unbounded".to_string())
            }
            SolverError::Backend(msg) => PlanError::Internal(format!("solver failure: {}", msg)),
        }
    }
}
