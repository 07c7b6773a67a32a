//! Simulated aircraft flying a route.

pub mod paths;

pub use paths::{apply_cross_track_jitter, FlightPath, RoutePath};

/// Knots to meters per second.
pub fn knots_to_mps(knots: f64) -> f64 {
    route_core::nm_to_meter(knots) / 3600.0
}
