//! Airway minimum altitudes, cruise altitude rounding and route type.

use crate::geo::normalize_course;
use crate::models::{FlightRules, RouteType};
use crate::route::Route;

/// Routes with airways cruising at or above this use high altitude airways.
const HIGH_ALTITUDE_FT: f64 = 20_000.0;

/// Resolves airway minimum altitudes from a navigation database.
pub trait AirwayLookup {
    /// Minimum altitude in feet of `airway` between two waypoints or `None`
    /// if the airway segment is unknown.
    fn airway_min_altitude_ft(&self, airway: &str, from_ident: &str, to_ident: &str)
        -> Option<i32>;
}

impl<F> AirwayLookup for F
where
    F: Fn(&str, &str, &str) -> Option<i32>,
{
    fn airway_min_altitude_ft(&self, airway: &str, from_ident: &str, to_ident: &str) -> Option<i32> {
        self(airway, from_ident, to_ident)
    }
}

impl Route {
    /// Resolve airway minimum altitudes, optionally raise the cruise altitude
    /// above the highest one and derive the route type.
    pub fn update_airways_and_altitude(
        &mut self,
        lookup: &dyn AirwayLookup,
        adjust_route_altitude: bool,
        adjust_route_type: bool,
    ) {
        let mut min_altitude_ft = 0;
        for i in 1..self.legs.len() {
            let from_ident = self.legs[i - 1].ident.clone();
            let leg = &mut self.legs[i];

            leg.airway_min_altitude_ft = match leg.airway_name.as_deref() {
                Some(airway) if !airway.is_empty() => {
                    let altitude = lookup.airway_min_altitude_ft(airway, &from_ident, &leg.ident);
                    if altitude.is_none() {
                        tracing::warn!(airway, from = %from_ident, to = %leg.ident, "Airway segment not found");
                    }
                    altitude
                }
                _ => None,
            };
            min_altitude_ft = min_altitude_ft.max(leg.airway_min_altitude_ft.unwrap_or(0));
        }

        if adjust_route_altitude
            && min_altitude_ft > 0
            && f64::from(min_altitude_ft) > self.flightplan.cruise_altitude_ft
        {
            let altitude_ft = if self.options.apply_altitude_rule {
                self.adjust_altitude(min_altitude_ft)
            } else {
                min_altitude_ft
            };
            tracing::info!(
                min_altitude_ft,
                cruise_altitude_ft = altitude_ft,
                "Raising cruise altitude to airway minimum"
            );
            self.set_cruise_altitude_ft(f64::from(altitude_ft));
        }

        if adjust_route_type {
            self.flightplan.route_type = if !self.has_airways() {
                RouteType::Direct
            } else if self.flightplan.cruise_altitude_ft >= HIGH_ALTITUDE_FT {
                RouteType::HighAltitude
            } else {
                RouteType::LowAltitude
            };
        }
    }

    /// Round `min_altitude_ft` up to the next altitude valid for the route
    /// direction, flight rules and altitude rule. Odd thousands for IFR and
    /// odd thousands plus 500 ft for VFR in the odd direction.
    pub fn adjust_altitude(&self, min_altitude_ft: i32) -> i32 {
        let (Some(first), Some(last)) = (self.legs.first(), self.legs.last()) else {
            return min_altitude_ft;
        };
        if self.legs.len() < 2 || !first.position.is_valid() || !last.position.is_valid() {
            return min_altitude_ft;
        }

        let magvar = (first.calculated_magvar + last.calculated_magvar) / 2.0;
        let direction = normalize_course(first.position.angle_deg_to_rhumb(&last.position) - magvar);
        let odd = self.options.altitude_rule.is_odd(direction);

        let (odd_offset, even_offset) = match self.flightplan.flight_rules {
            FlightRules::Ifr => (1000, 0),
            FlightRules::Vfr => (1500, 500),
        };
        let offset = if odd { odd_offset } else { even_offset };
        round_up_to_thousands(min_altitude_ft, offset)
    }
}

/// Smallest `n * 2000 + offset` not below `altitude_ft`.
fn round_up_to_thousands(altitude_ft: i32, offset: i32) -> i32 {
    ((f64::from(altitude_ft - offset) / 2000.0).ceil() as i32) * 2000 + offset
}
