//! JSON route files: resolved legs plus the procedures to splice in.

use anyhow::Context;
use route_core::{
    FlightPlan, FlightPlanEntry, FlightRules, ProcedureLegs, Route, RouteError, RouteLeg,
    RouteOptions,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteFile {
    #[serde(default)]
    pub flight_rules: FlightRules,
    #[serde(default)]
    pub cruise_altitude_ft: f64,
    /// Departure first, destination last
    pub legs: Vec<RouteLeg>,
    #[serde(default)]
    pub departure: Option<ProcedureLegs>,
    #[serde(default)]
    pub star: Option<ProcedureLegs>,
    #[serde(default)]
    pub arrival: Option<ProcedureLegs>,
}

impl RouteFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read route file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid route file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the route and splice in all procedures.
    pub fn into_route(self, options: RouteOptions) -> anyhow::Result<Route> {
        if self.legs.is_empty() {
            return Err(RouteError::EmptyRoute.into());
        }

        let flightplan = FlightPlan {
            entries: self.legs.iter().map(FlightPlanEntry::from_leg).collect(),
            cruise_altitude_ft: self.cruise_altitude_ft,
            flight_rules: self.flight_rules,
            ..FlightPlan::default()
        };
        let mut route = Route::with_flight_plan(flightplan, self.legs, options)?;

        for procedure in [self.departure, self.star, self.arrival].into_iter().flatten() {
            let ident = procedure.ident.clone();
            route
                .set_procedure(procedure)
                .with_context(|| format!("Cannot attach procedure {ident}"))?;
        }
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE: &str = r#"{
        "cruise_altitude_ft": 9000,
        "legs": [
            {"ident": "LFPG", "position": {"lon": 2.55, "lat": 49.01}, "map_object_type": "airport",
             "navaid": {"id": 1, "ident": "LFPG", "region": "LF", "kind": "airport"}},
            {"ident": "WP1", "position": {"lon": 3.5, "lat": 48.0}, "map_object_type": "user_waypoint"},
            {"ident": "LFLL", "position": {"lon": 5.08, "lat": 45.73}, "map_object_type": "airport",
             "navaid": {"id": 2, "ident": "LFLL", "region": "LF", "kind": "airport"}}
        ]
    }"#;

    #[test]
    fn test_route_from_file() {
        let route = RouteFile::parse(ROUTE)
            .unwrap()
            .into_route(RouteOptions::default())
            .unwrap();
        assert_eq!(route.len(), 3);
        assert!(route.has_valid_departure());
        assert_eq!(route.flight_plan().departure_name, "LFPG");
        assert!((route.flight_plan().cruise_altitude_ft - 9_000.0).abs() < f64::EPSILON);
        assert!(route.total_distance_nm() > 200.0);
    }

    #[test]
    fn test_empty_route_rejected() {
        let file = RouteFile::parse(r#"{"legs": []}"#).unwrap();
        assert!(file.into_route(RouteOptions::default()).is_err());
    }

    #[test]
    fn test_star_without_legs_rejected() {
        let text = ROUTE.replacen(
            "\"legs\"",
            "\"star\": {\"kind\": \"star\", \"ident\": \"EMPTY\"}, \"legs\"",
            1,
        );
        let file = RouteFile::parse(&text).unwrap();
        let err = file.into_route(RouteOptions::default()).unwrap_err();
        assert!(err.to_string().contains("EMPTY"));
    }
}
