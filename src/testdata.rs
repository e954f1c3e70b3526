//! Small hand-made seasons for tests.

use chrono::{NaiveDate, NaiveDateTime};
use typed_index_collections::TiVec;

use crate::problem::{DateWindow, Game, GameId, Problem, TravelTable, Venue, VenueId};

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(h, min, 0))
        .unwrap()
}

pub fn april() -> DateWindow {
    DateWindow {
        start: NaiveDate::from_ymd_opt(2018, 4, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2018, 4, 30).unwrap(),
    }
}

pub fn venues(names: &[&str]) -> TiVec<VenueId, Venue> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| Venue {
            name: n.to_string(),
            lat: 30.0 + i as f64,
            lon: -100.0 - i as f64,
        })
        .collect()
}

/// Symmetric travel with `minutes` of driving between every pair and the given miles.
pub fn travel(venues: &TiVec<VenueId, Venue>, minutes: f64, miles: &[&[f64]]) -> TravelTable {
    let n = venues.len();
    let pairs = (0..n).flat_map(move |a| (0..n).map(move |b| (VenueId::from(a), VenueId::from(b))));
    TravelTable::from_entries(
        venues,
        pairs
            .clone()
            .map(|(a, b)| (a, b, if a == b { 0.0 } else { minutes })),
        pairs.map(|(a, b)| (a, b, miles[usize::from(a)][usize::from(b)])),
    )
    .unwrap()
}

/// A 19:00-22:00 game at `venue` on April `day`.
pub fn game(id: u64, venue: usize, day: u32) -> Game {
    Game {
        id,
        venue: VenueId::from(venue),
        away: format!("Visitors{}", id),
        home: format!("Home{}", venue),
        city: format!("City{}", venue),
        start: at(2018, 4, day, 19, 0),
        end: at(2018, 4, day, 22, 0),
    }
}

fn problem(names: &[&str], minutes: f64, miles: &[&[f64]], games: Vec<Game>) -> Problem {
    let venues = venues(names);
    let travel = travel(&venues, minutes, miles);
    let games: TiVec<GameId, Game> = games.into_iter().collect();
    Problem::new(venues, games, travel).unwrap()
}

const MILES3: &[&[f64]] = &[&[0.0, 50.0, 80.0], &[50.0, 0.0, 60.0], &[80.0, 60.0, 0.0]];

/// One game per venue on April 1, 2 and 3, an hour's drive apart.
pub fn three_venues() -> Problem {
    problem(
        &["A Park", "B Park", "C Park"],
        60.0,
        MILES3,
        vec![game(0, 0, 1), game(1, 1, 2), game(2, 2, 3)],
    )
}

/// Several games per venue, so the feasibility graph has something to prune.
pub fn with_later_candidates() -> Problem {
    problem(
        &["A Park", "B Park", "C Park"],
        60.0,
        MILES3,
        vec![
            game(0, 0, 1),
            // same evening as game 0, cannot be reached from it
            game(1, 1, 1),
            game(2, 1, 2),
            game(3, 2, 3),
            game(4, 1, 4),
            game(5, 2, 5),
            game(6, 0, 7),
        ],
    )
}

/// Two venues ten hours apart with only a seven hour gap between their games.
pub fn too_far() -> Problem {
    problem(
        &["A Park", "B Park"],
        600.0,
        &[&[0.0, 700.0], &[700.0, 0.0]],
        vec![
            game(0, 0, 1),
            Game {
                start: at(2018, 4, 2, 5, 0),
                end: at(2018, 4, 2, 8, 0),
                ..game(1, 1, 2)
            },
        ],
    )
}

/// Two venues so far apart that the drive does not end before the calendar does.
pub fn off_the_calendar() -> Problem {
    problem(
        &["A Park", "B Park"],
        1e15,
        &[&[0.0, 1.0], &[1.0, 0.0]],
        vec![game(0, 0, 1), game(1, 1, 20)],
    )
}

/// Four venues where the cheapest route in time is not the cheapest in miles.
pub fn time_versus_distance() -> Problem {
    problem(
        &["A Park", "B Park", "C Park", "D Park"],
        120.0,
        &[
            &[0.0, 400.0, 100.0, 100.0],
            &[400.0, 0.0, 100.0, 100.0],
            &[100.0, 100.0, 0.0, 400.0],
            &[100.0, 100.0, 400.0, 0.0],
        ],
        vec![
            game(0, 0, 1),
            game(1, 1, 2),
            game(2, 2, 3),
            game(3, 3, 4),
            game(4, 1, 6),
            game(5, 3, 7),
            game(6, 0, 8),
        ],
    )
}
