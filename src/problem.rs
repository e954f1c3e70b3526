use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use derive_more::{From, Into};
use typed_index_collections::TiVec;

use crate::error::InputError;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, Into)]
pub struct VenueId(usize);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, Into)]
pub struct GameId(usize);

#[derive(Clone, Debug)]
pub struct Venue {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug)]
pub struct Game {
    pub id: u64,
    pub venue: VenueId,
    pub away: String,
    pub home: String,
    pub city: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Dense driving-duration (minutes) and distance (miles) matrices over venue pairs.
#[derive(Clone, Debug)]
pub struct TravelTable {
    n_venues: usize,
    minutes: Vec<f64>,
    miles: Vec<f64>,
}

impl TravelTable {
    /// Builds the table from keyed entries. Every ordered pair of distinct venues needs both a
    /// duration and a distance; a missing diagonal is taken as zero.
    pub fn from_entries(
        venues: &TiVec<VenueId, Venue>,
        durations: impl IntoIterator<Item = (VenueId, VenueId, f64)>,
        distances: impl IntoIterator<Item = (VenueId, VenueId, f64)>,
    ) -> Result<TravelTable, InputError> {
        let n = venues.len();
        let mut minutes = vec![None; n * n];
        let mut miles = vec![None; n * n];

        for (table, entries, what) in [
            (&mut minutes, durations.into_iter().collect::<Vec<_>>(), "duration"),
            (&mut miles, distances.into_iter().collect::<Vec<_>>(), "distance"),
        ] {
            for (a, b, value) in entries {
                if !value.is_finite() || value < 0.0 {
                    return Err(InputError::InvalidTravel {
                        origin: venues[a].name.clone(),
                        destination: venues[b].name.clone(),
                        reason: format!("{} {} is not a non-negative number", what, value),
                    });
                }
                table[usize::from(a) * n + usize::from(b)] = Some(value);
            }
        }

        let mut table = TravelTable {
            n_venues: n,
            minutes: vec![0.0; n * n],
            miles: vec![0.0; n * n],
        };

        for a in 0..n {
            for b in 0..n {
                let idx = a * n + b;
                match (minutes[idx], miles[idx]) {
                    (Some(t), Some(d)) => {
                        table.minutes[idx] = t;
                        table.miles[idx] = d;
                    }
                    _ if a == b => {}
                    (t, _) => {
                        return Err(InputError::InvalidTravel {
                            origin: venues[VenueId(a)].name.clone(),
                            destination: venues[VenueId(b)].name.clone(),
                            reason: if t.is_none() {
                                "missing driving duration".to_string()
                            } else {
                                "missing distance".to_string()
                            },
                        });
                    }
                }
            }
        }

        Ok(table)
    }

    pub fn n_venues(&self) -> usize {
        self.n_venues
    }

    pub fn minutes(&self, from: VenueId, to: VenueId) -> f64 {
        self.minutes[usize::from(from) * self.n_venues + usize::from(to)]
    }

    pub fn miles(&self, from: VenueId, to: VenueId) -> f64 {
        self.miles[usize::from(from) * self.n_venues + usize::from(to)]
    }

    /// `None` when the duration does not fit a `chrono::Duration`.
    pub fn driving_time(&self, from: VenueId, to: VenueId) -> Option<Duration> {
        let millis = (self.minutes(from, to) * 60_000.0).round();
        if millis >= i64::MAX as f64 {
            return None;
        }
        Duration::try_milliseconds(millis as i64)
    }
}

/// Inclusive range of calendar days a run may use.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, game: &Game) -> bool {
        let opens = self.start.and_hms_opt(0, 0, 0);
        let closes = self.end.succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0));
        match (opens, closes) {
            (Some(opens), Some(closes)) => game.start >= opens && game.end < closes,
            (Some(opens), None) => game.start >= opens,
            _ => false,
        }
    }

    pub fn months(&self) -> f64 {
        (self.end - self.start).num_days() as f64 / 30.0
    }
}

/// Everything loaded for a season. Read-only once built; every run borrows it.
#[derive(Debug)]
pub struct Problem {
    pub venues: TiVec<VenueId, Venue>,
    pub games: TiVec<GameId, Game>,
    pub travel: TravelTable,
}

#[derive(Debug, PartialEq)]
pub enum RouteViolation {
    VenueMissing(VenueId),
    VenueRepeated(VenueId),
    TravelTime(GameId, GameId),
}

impl Problem {
    pub fn new(
        venues: TiVec<VenueId, Venue>,
        games: TiVec<GameId, Game>,
        travel: TravelTable,
    ) -> Result<Problem, InputError> {
        if travel.n_venues() != venues.len() {
            return Err(InputError::Schema(format!(
                "travel table covers {} venues, venue table has {}",
                travel.n_venues(),
                venues.len()
            )));
        }
        let mut ids = HashSet::new();
        for game in games.iter() {
            if !ids.insert(game.id) {
                return Err(InputError::DuplicateGame(game.id));
            }
            if usize::from(game.venue) >= venues.len() {
                return Err(InputError::Schema(format!(
                    "game {} refers to venue index {}",
                    game.id,
                    usize::from(game.venue)
                )));
            }
            if game.end <= game.start {
                return Err(InputError::InvalidGame {
                    id: game.id,
                    reason: format!("ends at {} before it starts at {}", game.end, game.start),
                });
            }
        }
        Ok(Problem {
            venues,
            games,
            travel,
        })
    }

    pub fn venue_of(&self, game: GameId) -> &Venue {
        &self.venues[self.games[game].venue]
    }

    /// Games inside the window, in start-time order.
    pub fn games_in(&self, window: &DateWindow) -> Vec<GameId> {
        let mut games = self
            .games
            .iter_enumerated()
            .filter(|(_, g)| window.contains(g))
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        games.sort_by_key(|id| (self.games[*id].start, *id));
        games
    }

    /// Can a traveler leaving the end of `from` make the start of `to`?
    ///
    /// An arrival past the end of the calendar is never in time.
    pub fn can_reach(&self, from: GameId, to: GameId) -> bool {
        let (g1, g2) = (&self.games[from], &self.games[to]);
        self.travel
            .driving_time(g1.venue, g2.venue)
            .and_then(|drive| g1.end.checked_add_signed(drive))
            .map(|arrival| arrival <= g2.start)
            .unwrap_or(false)
    }

    /// Checks that the route visits every venue once and that each leg can be driven.
    pub fn verify_route(&self, route: &[GameId]) -> Result<(), RouteViolation> {
        let mut seen = vec![false; self.venues.len()];
        for game in route {
            let venue = self.games[*game].venue;
            if std::mem::replace(&mut seen[usize::from(venue)], true) {
                return Err(RouteViolation::VenueRepeated(venue));
            }
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(RouteViolation::VenueMissing(VenueId(missing)));
        }

        for pair in route.windows(2) {
            if !self.can_reach(pair[0], pair[1]) {
                return Err(RouteViolation::TravelTime(pair[0], pair[1]));
            }
        }
        Ok(())
    }
}
