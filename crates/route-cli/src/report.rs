//! Per-sample tracking report.

use chrono::{DateTime, Utc};
use route_core::{LineStatus, Pos, Route, RouteDistances};
use serde::Serialize;

/// Tracker state after feeding one position sample.
#[derive(Debug, Clone, Serialize)]
pub struct TrackSample {
    pub timestamp: DateTime<Utc>,
    pub pos: Pos,
    pub course: f64,
    pub active_leg: Option<usize>,
    pub active_ident: Option<String>,
    pub status: LineStatus,
    pub missed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distances: Option<RouteDistances>,
}

impl TrackSample {
    pub fn from_route(route: &Route, timestamp: DateTime<Utc>, pos: Pos, course: f64) -> Self {
        Self {
            timestamp,
            pos,
            course,
            active_leg: route.active_leg_index(),
            active_ident: route.active_leg().map(|leg| leg.ident.clone()),
            status: route.active_leg_result().status,
            missed: route.is_active_missed(),
            distances: route.route_distances(),
        }
    }

    /// One line summary for terminal output.
    pub fn summary(&self) -> String {
        let leg = match (self.active_leg, self.active_ident.as_deref()) {
            (Some(index), Some(ident)) => format!("{index:3} {ident:<8}"),
            _ => format!("{:3} {:<8}", "-", "-"),
        };
        match &self.distances {
            Some(d) => format!(
                "{} ({:.5}, {:.5}) crs {:5.1} from {:7.1} nm to {:7.1} nm next {:6.1} nm xtk {}",
                leg,
                self.pos.lat,
                self.pos.lon,
                self.course,
                d.from_start_nm,
                d.to_destination_nm,
                d.next_leg_nm,
                d.cross_track_nm
                    .map(|x| format!("{x:+.2} nm"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            None => format!("{} ({:.5}, {:.5}) not tracking", leg, self.pos.lat, self.pos.lon),
        }
    }
}
