use std::{fmt, io::Write, path::Path};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{error::InputError, schedule::RouteStatistics};

#[derive(Clone, Debug, Serialize)]
pub struct SolveMetrics {
    pub solver: String,
    pub games: usize,
    pub arcs: usize,
    pub variables: usize,
    pub constraints: usize,
    pub ambiguous_arcs: usize,
    /// Seconds spent building the feasibility graph.
    pub data_time: f64,
    /// Seconds spent building the model.
    pub prep_time: f64,
    /// Seconds spent in the solver.
    pub solve_time: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RouteEntry {
    pub seq: usize,
    pub venue: String,
    pub away: String,
    pub home: String,
    pub city: String,
    pub start: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
}

/// Everything a run produces; the only thing handed to reporting or map rendering.
#[derive(Clone, Debug, Serialize)]
pub struct RunRecord {
    pub objective: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub months: f64,
    pub objective_value: f64,
    /// Days.
    pub total_time: f64,
    /// Miles.
    pub total_distance: f64,
    pub total_cost: f64,
    pub metrics: SolveMetrics,
    pub statistics: Option<RouteStatistics>,
    pub route: Vec<RouteEntry>,
}

impl RunRecord {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), InputError> {
        let path = path.as_ref();
        let io_err = |source| InputError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = std::fs::File::create(path).map_err(io_err)?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "objt: {}", self.objective)?;
        writeln!(f, "sdat: {}", self.start_date)?;
        writeln!(f, "edat: {}", self.end_date)?;
        writeln!(f, "mont: {:.1}", self.months)?;
        writeln!(f, "time: {:.3} days", self.total_time)?;
        writeln!(f, "dist: {:.3} miles", self.total_distance)?;
        writeln!(f, "cost: {:.3} USD", self.total_cost)?;
        writeln!(f, "gams: {}", self.metrics.games)?;
        writeln!(f, "vars: {}", self.metrics.variables)?;
        writeln!(f, "cons: {}", self.metrics.constraints)?;
        writeln!(f, "data: {:.3} secs", self.metrics.data_time)?;
        writeln!(f, "prep: {:.3} secs", self.metrics.prep_time)?;
        writeln!(f, "solv: {:.3} secs", self.metrics.solve_time)?;
        match &self.statistics {
            Some(s) => {
                for (key, t) in [
                    ("sdis", s.shortest_distance),
                    ("ldis", s.longest_distance),
                    ("stim", s.shortest_idle),
                    ("ltim", s.longest_idle),
                    ("mcri", s.most_critical),
                ] {
                    writeln!(f, "{}: {} {}-{}", key, t.value, t.from, t.to)?;
                }
            }
            None => {
                for key in ["sdis", "ldis", "stim", "ltim", "mcri"] {
                    writeln!(f, "{}: -", key)?;
                }
            }
        }
        writeln!(f, "schd: [")?;
        for e in self.route.iter() {
            writeln!(
                f,
                "{},{},{},{},{},{},{},{}",
                e.seq,
                e.venue,
                e.away,
                e.home,
                e.city,
                e.start.format("%Y-%m-%d %H:%M:%S"),
                e.lat,
                e.lon
            )?;
        }
        write!(f, "]")
    }
}
