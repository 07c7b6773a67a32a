//! CLI tool to fly a route file with a simulated aircraft.
//!
//! Every sample is fed to the active leg tracker and the resulting leg and
//! distances are printed.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use route_cli::sim::{apply_cross_track_jitter, knots_to_mps, FlightPath, RoutePath};
use route_cli::{init_tracing, Config, RouteFile, TrackSample};
use route_core::PosCourse;
use std::path::PathBuf;

/// Replay a simulated flight along a route file
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Route file (JSON)
    #[arg(long)]
    route: PathBuf,

    /// Samples per simulated second
    #[arg(long, default_value_t = 0.1)]
    rate: f64,

    /// Ground speed in knots
    #[arg(long, default_value_t = 250.0)]
    speed_kts: f64,

    /// Random cross-track offset of up to this many meters
    #[arg(long, default_value_t = 0.0)]
    jitter_m: f64,

    /// Fly and track the missed approach
    #[arg(long)]
    show_missed: bool,

    /// Print one JSON object per sample
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;

    anyhow::ensure!(args.rate > 0.0, "Rate must be positive");
    anyhow::ensure!(args.speed_kts > 0.0, "Speed must be positive");

    let config = Config::from_env();
    let mut options = config.route_options();
    if args.show_missed {
        options.show_missed_approach = true;
    }

    let mut route = RouteFile::load(&args.route)?
        .into_route(options)
        .with_context(|| format!("Cannot build route from {}", args.route.display()))?;
    config.apply_magvar(&mut route);

    let path = RoutePath::from_route(&route, knots_to_mps(args.speed_kts));
    tracing::info!(
        legs = route.len(),
        total_distance_nm = route.total_distance_nm(),
        path_nm = path.length_nm(),
        duration_s = path.duration_s(),
        "Starting replay"
    );

    let start = Utc::now();
    let step_s = 1.0 / args.rate;
    let mut last_active = None;
    let mut sample_count = 0u32;
    let mut t = 0.0;

    while t <= path.duration_s() + step_s / 2.0 {
        let course = path.course(t);
        let pos = apply_cross_track_jitter(path.position(t), course, args.jitter_m);
        let (active, _) = route.update_active_leg(PosCourse::new(pos, course), false);

        if active != last_active {
            tracing::info!(
                from = ?last_active,
                to = ?active,
                ident = route.active_leg().map(|leg| leg.ident.as_str()).unwrap_or("-"),
                "Active leg changed"
            );
            last_active = active;
        }

        let timestamp = start + chrono::Duration::milliseconds((t * 1000.0) as i64);
        let sample = TrackSample::from_route(&route, timestamp, pos, course);
        if args.json {
            println!("{}", serde_json::to_string(&sample)?);
        } else {
            println!("[{:4}] {}", sample_count, sample.summary());
        }

        sample_count += 1;
        t += step_s;
    }

    tracing::info!(
        samples = sample_count,
        passed_last_leg = route.is_passed_last_leg(),
        "Replay complete"
    );
    Ok(())
}
