use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{error::InputError, problem::DateWindow};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ObjectiveType {
    /// Mode 0: days from the first game's start to the last game's end.
    TotalTime,
    /// Mode 1: time and mileage priced with [`CostWeights`].
    TotalCost,
}

impl ObjectiveType {
    pub fn mode(self) -> u8 {
        self.into()
    }
}

impl TryFrom<u8> for ObjectiveType {
    type Error = String;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(ObjectiveType::TotalTime),
            1 => Ok(ObjectiveType::TotalCost),
            x => Err(format!("unknown objective mode {} (expected 0 or 1)", x)),
        }
    }
}

impl From<ObjectiveType> for u8 {
    fn from(o: ObjectiveType) -> u8 {
        match o {
            ObjectiveType::TotalTime => 0,
            ObjectiveType::TotalCost => 1,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    pub time_per_day: f64,
    pub distance_per_mile: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        CostWeights {
            time_per_day: 130.0,
            distance_per_mile: 0.25,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunParameters {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_objective")]
    pub objective: ObjectiveType,
    #[serde(default)]
    pub weights: CostWeights,
    /// Seconds the solver may run.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
}

fn default_objective() -> ObjectiveType {
    ObjectiveType::TotalTime
}

fn default_timeout() -> f64 {
    600.0
}

impl RunParameters {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, objective: ObjectiveType) -> Self {
        RunParameters {
            start_date,
            end_date,
            objective,
            weights: CostWeights::default(),
            timeout: default_timeout(),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let params: RunParameters = serde_json::from_str(&txt)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.end_date < self.start_date {
            return Err(InputError::Schema(format!(
                "window ends ({}) before it starts ({})",
                self.end_date, self.start_date
            )));
        }
        if !(self.timeout > 0.0) {
            return Err(InputError::Schema(format!(
                "solver timeout must be positive, got {}",
                self.timeout
            )));
        }
        Ok(())
    }

    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.start_date,
            end: self.end_date,
        }
    }
}
