//! Route options and the flight level rounding rule.

use serde::{Deserialize, Serialize};

/// Which cruise altitude convention applies to the route direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeRule {
    /// Odd thousands eastbound, even thousands westbound
    #[default]
    EastWest,
    /// Odd thousands southbound, even thousands northbound
    NorthSouth,
    /// Odd thousands northbound, even thousands southbound
    SouthNorth,
}

impl AltitudeRule {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "east-west" | "eastwest" | "ew" => Some(Self::EastWest),
            "north-south" | "northsouth" | "ns" => Some(Self::NorthSouth),
            "south-north" | "southnorth" | "sn" => Some(Self::SouthNorth),
            _ => None,
        }
    }

    /// True when a magnetic route direction requires odd thousands.
    pub fn is_odd(self, direction_deg: f64) -> bool {
        let southbound = (90.0..=270.0).contains(&direction_deg);
        match self {
            Self::EastWest => (0.0..=180.0).contains(&direction_deg),
            Self::NorthSouth => southbound,
            Self::SouthNorth => !southbound,
        }
    }
}

/// Configuration for route tracking and altitude calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Rule used to round the cruise altitude
    pub altitude_rule: AltitudeRule,
    /// Apply the altitude rule when airways raise the cruise altitude
    pub apply_altitude_rule: bool,
    /// Missed approach legs are displayed and can become active
    pub show_missed_approach: bool,
    /// Climb rate used by the altitude profile
    pub climb_rate_ft_per_nm: f64,
    /// Descent rate used by the altitude profile
    pub descent_rate_ft_per_nm: f64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            altitude_rule: AltitudeRule::EastWest,
            apply_altitude_rule: true,
            show_missed_approach: true,
            climb_rate_ft_per_nm: 333.0,
            descent_rate_ft_per_nm: 333.0,
        }
    }
}
