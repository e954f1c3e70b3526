use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::Deserialize;
use typed_index_collections::TiVec;

use crate::{
    error::InputError,
    problem::{Game, GameId, Problem, TravelTable, Venue, VenueId},
};

/// Old names found in published stadium distance tables, and the names used by the schedules.
pub const DEFAULT_VENUE_ALIASES: &[(&str, &str)] = &[
    ("OAC Coliseum", "Oakland Coliseum"),
    ("PETCO Park", "Petco Park"),
    ("Angels Stadium of Anaheim", "Angel Stadium of Anaheim"),
    ("ATT Park", "AT&T Park"),
];

const TEAM_ALIASES: &[(&str, &str)] = &[("D-backs", "Diamondbacks")];

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Resolves venue names, after aliasing, to ids.
#[derive(Debug)]
pub struct VenueIndex {
    ids: HashMap<String, VenueId>,
    aliases: HashMap<String, String>,
}

impl VenueIndex {
    pub fn new(venues: &TiVec<VenueId, Venue>, aliases: &[(&str, &str)]) -> VenueIndex {
        VenueIndex {
            ids: venues
                .iter_enumerated()
                .map(|(id, v)| (v.name.clone(), id))
                .collect(),
            aliases: aliases
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Result<VenueId, InputError> {
        let name = clean_name(name);
        let name = self.aliases.get(&name).cloned().unwrap_or(name);
        self.ids
            .get(&name)
            .copied()
            .ok_or(InputError::UnknownVenue(name))
    }
}

fn clean_name(name: &str) -> String {
    name.trim().replace('\'', "")
}

fn open(path: &Path) -> Result<File, InputError> {
    File::open(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[derive(Deserialize)]
struct VenueRow {
    venue: String,
    lat: f64,
    lon: f64,
}

pub fn read_venues(rdr: impl Read) -> Result<TiVec<VenueId, Venue>, InputError> {
    let mut venues: TiVec<VenueId, Venue> = TiVec::new();
    for row in csv::Reader::from_reader(rdr).deserialize() {
        let row: VenueRow = row?;
        let name = clean_name(&row.venue);
        if venues.iter().any(|v| v.name == name) {
            return Err(InputError::DuplicateVenue(name));
        }
        if !(-90.0..=90.0).contains(&row.lat) || !(-180.0..=180.0).contains(&row.lon) {
            return Err(InputError::Schema(format!(
                "venue '{}' has coordinates ({}, {}) off the globe",
                name, row.lat, row.lon
            )));
        }
        venues.push(Venue {
            name,
            lat: row.lat,
            lon: row.lon,
        });
    }
    if venues.is_empty() {
        return Err(InputError::Schema("venue table is empty".to_string()));
    }
    Ok(venues)
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, InputError> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value.trim(), f).ok())
        .ok_or_else(|| InputError::Timestamp {
            value: value.to_string(),
            expected: "YYYY-MM-DD HH:MM[:SS]",
        })
}

#[derive(Deserialize)]
struct GameRow {
    id: u64,
    venue: String,
    away: String,
    home: String,
    city: String,
    start: String,
    end: String,
}

/// Reads games in the normalized `id,venue,away,home,city,start,end` layout.
pub fn read_games(rdr: impl Read, venues: &VenueIndex) -> Result<TiVec<GameId, Game>, InputError> {
    let mut games: TiVec<GameId, Game> = TiVec::new();
    let mut ids = HashSet::new();
    for row in csv::Reader::from_reader(rdr).deserialize() {
        let row: GameRow = row?;
        if !ids.insert(row.id) {
            return Err(InputError::DuplicateGame(row.id));
        }
        games.push(Game {
            id: row.id,
            venue: venues.get(&row.venue)?,
            away: row.away.trim().to_string(),
            home: row.home.trim().to_string(),
            city: row.city.trim().to_string(),
            start: parse_timestamp(&row.start)?,
            end: parse_timestamp(&row.end)?,
        });
    }
    Ok(games)
}

#[derive(Deserialize)]
struct MlbRow {
    #[serde(rename = "START DATE")]
    start_date: String,
    #[serde(rename = "START TIME ET")]
    start_time: Option<String>,
    #[serde(rename = "END DATE ET")]
    end_date: String,
    #[serde(rename = "END TIME ET")]
    end_time: Option<String>,
    #[serde(rename = "SUBJECT")]
    subject: String,
    #[serde(rename = "LOCATION")]
    location: String,
}

struct RawGame {
    subject: String,
    venue: VenueId,
    away: String,
    home: String,
    city: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

fn team_name(name: &str) -> String {
    let name = name.trim();
    TEAM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| name.to_string())
}

fn mlb_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, InputError> {
    let value = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&value, "%m/%d/%y %I:%M %p").map_err(|_| InputError::Timestamp {
        value,
        expected: "MM/DD/YY HH:MM AM",
    })
}

/// Reads one or more MLB.com home-schedule exports.
///
/// Rows without a start time (postponed or to-be-announced games) and games at venues not in
/// the venue table (neutral sites) are skipped, as are games before `season_start`. Games are
/// numbered in (start, subject) order.
pub fn read_mlb_schedules<R: Read>(
    readers: impl IntoIterator<Item = R>,
    venues: &VenueIndex,
    season_start: Option<NaiveDate>,
) -> Result<TiVec<GameId, Game>, InputError> {
    let mut raw = Vec::new();
    let mut skipped = 0;
    for rdr in readers {
        for row in csv::Reader::from_reader(rdr).deserialize() {
            let row: MlbRow = row?;
            let (start_time, end_time) = match (row.start_time, row.end_time) {
                (Some(s), Some(e)) if !s.trim().is_empty() => (s, e),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let (away, home) = row.subject.split_once(" at ").ok_or_else(|| {
                InputError::Schema(format!("SUBJECT '{}' is not '<away> at <home>'", row.subject))
            })?;
            let (venue_name, city) = row.location.split_once(" - ").ok_or_else(|| {
                InputError::Schema(format!("LOCATION '{}' is not '<venue> - <city>'", row.location))
            })?;

            let venue = match venues.get(venue_name) {
                Ok(v) => v,
                Err(InputError::UnknownVenue(name)) => {
                    debug!("Skipping {} at unlisted venue {}", row.subject, name);
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let start = mlb_timestamp(&row.start_date, &start_time)?;
            if season_start.map(|d| start.date() < d).unwrap_or(false) {
                skipped += 1;
                continue;
            }

            raw.push(RawGame {
                subject: row.subject.clone(),
                venue,
                away: team_name(away),
                home: team_name(home),
                city: city.trim().to_string(),
                start,
                end: mlb_timestamp(&row.end_date, &end_time)?,
            });
        }
    }

    raw.sort_by(|a, b| (a.start, &a.subject).cmp(&(b.start, &b.subject)));
    if skipped > 0 {
        warn!("Skipped {} schedule rows", skipped);
    }

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, g)| Game {
            id: i as u64,
            venue: g.venue,
            away: g.away,
            home: g.home,
            city: g.city,
            start: g.start,
            end: g.end,
        })
        .collect())
}

#[derive(Deserialize)]
struct DurationRow {
    origin: String,
    destination: String,
    minutes: f64,
}

#[derive(Deserialize)]
struct DistanceRow {
    origin: String,
    destination: String,
    miles: f64,
}

/// Joins the duration and distance tables on (origin, destination).
pub fn read_travel(
    durations: impl Read,
    distances: impl Read,
    venues: &TiVec<VenueId, Venue>,
    index: &VenueIndex,
) -> Result<TravelTable, InputError> {
    let durations = csv::Reader::from_reader(durations)
        .deserialize()
        .map(|row| -> Result<(VenueId, VenueId, f64), InputError> {
            let row: DurationRow = row?;
            Ok((index.get(&row.origin)?, index.get(&row.destination)?, row.minutes))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let distances = csv::Reader::from_reader(distances)
        .deserialize()
        .map(|row| -> Result<(VenueId, VenueId, f64), InputError> {
            let row: DistanceRow = row?;
            Ok((index.get(&row.origin)?, index.get(&row.destination)?, row.miles))
        })
        .collect::<Result<Vec<_>, _>>()?;
    TravelTable::from_entries(venues, durations, distances)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScheduleFormat {
    /// `id,venue,away,home,city,start,end`
    Normalized,
    /// MLB.com ticketing export
    Mlb,
}

#[derive(Clone, Debug)]
pub struct DataFiles {
    pub venues: PathBuf,
    pub schedules: Vec<PathBuf>,
    pub format: ScheduleFormat,
    pub durations: PathBuf,
    pub distances: PathBuf,
    pub season_start: Option<NaiveDate>,
}

pub fn load(files: &DataFiles) -> Result<Problem, InputError> {
    let _p = hprof::enter("load");
    let venues = read_venues(open(&files.venues)?)?;
    let index = VenueIndex::new(&venues, DEFAULT_VENUE_ALIASES);
    let travel = read_travel(
        open(&files.durations)?,
        open(&files.distances)?,
        &venues,
        &index,
    )?;

    let games = match files.format {
        ScheduleFormat::Mlb => {
            let readers = files
                .schedules
                .iter()
                .map(|p| open(p))
                .collect::<Result<Vec<_>, _>>()?;
            read_mlb_schedules(readers, &index, files.season_start)?
        }
        ScheduleFormat::Normalized => {
            let mut games: TiVec<GameId, Game> = TiVec::new();
            for path in files.schedules.iter() {
                games.extend(read_games(open(path)?, &index)?);
            }
            games
        }
    };

    info!(
        "Loaded {} venues and {} games",
        venues.len(),
        games.len()
    );
    Problem::new(venues, games, travel)
}
