//! Route CLI - command line tools for flight plan route tracking.
//!
//! This crate provides the binaries:
//! - replay_track: flies a route file and feeds the samples to the tracker
//! - flight_level: rounds a minimum altitude for the route direction

pub mod config;
pub mod report;
pub mod route_file;
pub mod sim;

pub use config::Config;
pub use report::TrackSample;
pub use route_file::RouteFile;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber. `RUST_LOG` adds to the default directive.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("route_cli=debug".parse()?)
            .add_directive("route_core=info".parse()?))
        .init();
    Ok(())
}
