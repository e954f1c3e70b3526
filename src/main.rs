use std::path::PathBuf;

use chrono::NaiveDate;
use structopt::StructOpt;
use tbf::{
    config::{ObjectiveType, RunParameters},
    parser::{self, DataFiles, ScheduleFormat},
    solvers::MicroLpSolver,
};

#[derive(StructOpt, Debug)]
#[structopt(name = "tbf", about = "Plan a trip to one home game at every venue")]
struct Opt {
    /// Venue table: venue,lat,lon
    #[structopt(long, parse(from_os_str))]
    venues: PathBuf,

    /// Driving durations: origin,destination,minutes
    #[structopt(long, parse(from_os_str))]
    durations: PathBuf,

    /// Distances: origin,destination,miles
    #[structopt(long, parse(from_os_str))]
    distances: PathBuf,

    /// Schedules are MLB.com ticketing exports instead of id,venue,away,home,city,start,end
    #[structopt(long)]
    mlb: bool,

    /// Drop exported games before this date (spring training)
    #[structopt(long)]
    season_start: Option<NaiveDate>,

    /// JSON file with run parameters; flags below override it
    #[structopt(long, parse(from_os_str))]
    params: Option<PathBuf>,

    #[structopt(long)]
    start_date: Option<NaiveDate>,

    #[structopt(long)]
    end_date: Option<NaiveDate>,

    /// 0: minimize total time, 1: minimize total cost
    #[structopt(long)]
    objective: Option<u8>,

    /// Currency units per day
    #[structopt(long)]
    time_weight: Option<f64>,

    /// Currency units per mile
    #[structopt(long)]
    distance_weight: Option<f64>,

    /// Solver time limit in seconds
    #[structopt(long)]
    timeout: Option<f64>,

    /// Write the run record as JSON here
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Schedule files
    #[structopt(name = "SCHEDULE", parse(from_os_str))]
    schedules: Vec<PathBuf>,
}

fn parameters(opt: &Opt) -> Result<RunParameters, String> {
    let mut params = match &opt.params {
        Some(path) => RunParameters::from_json_file(path).map_err(|e| e.to_string())?,
        None => {
            let (start, end) = match (opt.start_date, opt.end_date) {
                (Some(s), Some(e)) => (s, e),
                _ => return Err("--start-date and --end-date are required without --params".into()),
            };
            RunParameters::new(start, end, ObjectiveType::TotalTime)
        }
    };
    if let Some(d) = opt.start_date {
        params.start_date = d;
    }
    if let Some(d) = opt.end_date {
        params.end_date = d;
    }
    if let Some(mode) = opt.objective {
        params.objective = ObjectiveType::try_from(mode)?;
    }
    if let Some(w) = opt.time_weight {
        params.weights.time_per_day = w;
    }
    if let Some(w) = opt.distance_weight {
        params.weights.distance_per_mile = w;
    }
    if let Some(t) = opt.timeout {
        params.timeout = t;
    }
    params.validate().map_err(|e| e.to_string())?;
    Ok(params)
}

pub fn main() {
    pretty_env_logger::init();
    let opt = Opt::from_args();
    log::debug!("{:#?}", opt);

    if opt.schedules.is_empty() {
        eprintln!("No schedule files specified");
        std::process::exit(2);
    }

    let params = match parameters(&opt) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    hprof::start_frame();
    let files = DataFiles {
        venues: opt.venues.clone(),
        schedules: opt.schedules.clone(),
        format: if opt.mlb {
            ScheduleFormat::Mlb
        } else {
            ScheduleFormat::Normalized
        },
        durations: opt.durations.clone(),
        distances: opt.distances.clone(),
        season_start: opt.season_start,
    };

    let result = parser::load(&files)
        .map_err(tbf::error::PlanError::from)
        .and_then(|problem| tbf::plan(&problem, &params, &MicroLpSolver));
    hprof::end_frame();

    match result {
        Ok(record) => {
            println!("{}", record);
            if let Some(path) = &opt.output {
                if let Err(e) = record.write_json(path) {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
            hprof::profiler().print_timing();
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
