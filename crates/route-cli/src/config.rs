//! Route options from environment.

use route_core::{AltitudeRule, Pos, Route, RouteOptions};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub altitude_rule: AltitudeRule,
    pub show_missed_approach: bool,
    pub climb_rate_ft_per_nm: f64,
    pub descent_rate_ft_per_nm: f64,
    /// Uniform magnetic variation for legs without a database value
    pub magvar_deg: Option<f64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing or unparsable values use the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = RouteOptions::default();
        Self {
            altitude_rule: lookup("ROUTE_ALTITUDE_RULE")
                .and_then(|s| AltitudeRule::parse(&s))
                .unwrap_or(defaults.altitude_rule),
            show_missed_approach: lookup("ROUTE_SHOW_MISSED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.show_missed_approach),
            climb_rate_ft_per_nm: lookup("ROUTE_CLIMB_RATE_FT_PER_NM")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.climb_rate_ft_per_nm),
            descent_rate_ft_per_nm: lookup("ROUTE_DESCENT_RATE_FT_PER_NM")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.descent_rate_ft_per_nm),
            magvar_deg: lookup("ROUTE_MAGVAR_DEG").and_then(|s| s.parse().ok()),
        }
    }

    pub fn route_options(&self) -> RouteOptions {
        RouteOptions {
            altitude_rule: self.altitude_rule,
            show_missed_approach: self.show_missed_approach,
            climb_rate_ft_per_nm: self.climb_rate_ft_per_nm,
            descent_rate_ft_per_nm: self.descent_rate_ft_per_nm,
            ..RouteOptions::default()
        }
    }

    pub fn apply_magvar(&self, route: &mut Route) {
        if let Some(magvar) = self.magvar_deg {
            route.set_magvar_source(move |_: &Pos| Some(magvar));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_variables() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.altitude_rule, AltitudeRule::EastWest);
        assert!(config.show_missed_approach);
        assert!((config.climb_rate_ft_per_nm - 333.0).abs() < f64::EPSILON);
        assert_eq!(config.magvar_deg, None);
    }

    #[test]
    fn test_values_from_variables() {
        let vars: HashMap<&str, &str> = [
            ("ROUTE_ALTITUDE_RULE", "north-south"),
            ("ROUTE_SHOW_MISSED", "false"),
            ("ROUTE_DESCENT_RATE_FT_PER_NM", "300"),
            ("ROUTE_CLIMB_RATE_FT_PER_NM", "fast"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        let options = config.route_options();
        assert_eq!(options.altitude_rule, AltitudeRule::NorthSouth);
        assert!(!options.show_missed_approach);
        assert!((options.descent_rate_ft_per_nm - 300.0).abs() < f64::EPSILON);
        // Unparsable values fall back to the default
        assert!((options.climb_rate_ft_per_nm - 333.0).abs() < f64::EPSILON);
        assert!(options.apply_altitude_rule);
    }

    #[test]
    fn test_magvar_applied_to_legs_without_value() {
        let config = Config::from_lookup(|key| (key == "ROUTE_MAGVAR_DEG").then(|| "-4.5".to_string()));
        let mut route = Route::new(
            vec![
                route_core::RouteLeg::user_waypoint("WP1", Pos::new(0.0, 0.0)),
                route_core::RouteLeg::user_waypoint("WP2", Pos::new(1.0, 0.0)).with_magvar(2.0),
            ],
            config.route_options(),
        );
        config.apply_magvar(&mut route);

        assert!((route.legs()[0].calculated_magvar + 4.5).abs() < f64::EPSILON);
        assert!((route.legs()[1].calculated_magvar - 2.0).abs() < f64::EPSILON);
    }
}
