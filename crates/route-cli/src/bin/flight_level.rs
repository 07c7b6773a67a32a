//! CLI tool to round a minimum altitude to a valid cruise altitude for the
//! direction of a route.

use anyhow::Context;
use clap::Parser;
use route_cli::{init_tracing, Config, RouteFile};
use route_core::AltitudeRule;
use std::path::PathBuf;

/// Cruise altitude for a route and minimum altitude
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Route file (JSON)
    #[arg(long)]
    route: PathBuf,

    /// Minimum altitude in feet
    #[arg(long)]
    min_altitude: i32,

    /// Altitude rule: east-west, north-south or south-north
    #[arg(long)]
    rule: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let config = Config::from_env();
    let mut options = config.route_options();
    if let Some(rule) = &args.rule {
        options.altitude_rule =
            AltitudeRule::parse(rule).with_context(|| format!("Unknown altitude rule {rule}"))?;
    }

    let mut route = RouteFile::load(&args.route)?.into_route(options)?;
    config.apply_magvar(&mut route);
    let altitude_ft = route.adjust_altitude(args.min_altitude);

    println!(
        "{} -> {} ({:?}, {:?}): minimum {} ft, cruise {} ft",
        route.flight_plan().departure_name,
        route.flight_plan().destination_name,
        route.flight_plan().flight_rules,
        route.options().altitude_rule,
        args.min_altitude,
        altitude_ft
    );
    Ok(())
}
