//! Vertical profile along the route: top of climb and top of descent.

use crate::geo::Pos;
use serde::{Deserialize, Serialize};

/// Climb/descent profile computed from cumulative leg distances.
///
/// Each route owns its own instance, so copying a route copies the profile
/// instead of sharing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteAltitude {
    pub cruise_altitude_ft: f64,
    pub climb_rate_ft_per_nm: f64,
    pub descent_rate_ft_per_nm: f64,
    pub departure_altitude_ft: f64,
    pub destination_altitude_ft: f64,
    pub calc_top_of_climb: bool,
    pub calc_top_of_descent: bool,

    total_distance_nm: f64,
    top_of_climb_nm: Option<f64>,
    top_of_descent_nm: Option<f64>,
    top_of_climb_leg_index: Option<usize>,
    top_of_descent_leg_index: Option<usize>,
    top_of_climb_pos: Option<Pos>,
    top_of_descent_pos: Option<Pos>,
    leg_altitudes_ft: Vec<f64>,
}

impl RouteAltitude {
    pub fn new(cruise_altitude_ft: f64, climb_rate_ft_per_nm: f64, descent_rate_ft_per_nm: f64) -> Self {
        Self {
            cruise_altitude_ft,
            climb_rate_ft_per_nm,
            descent_rate_ft_per_nm,
            calc_top_of_climb: true,
            calc_top_of_descent: true,
            ..Self::default()
        }
    }

    /// Recalculate the profile.
    ///
    /// `cumulative_nm[i]` is the distance from start at leg `i`; legs not
    /// counted towards the total distance (missed approach) are left out.
    /// `position_at` maps a distance from start to a coordinate.
    pub fn calculate(
        &mut self,
        cumulative_nm: &[f64],
        total_distance_nm: f64,
        position_at: impl Fn(f64) -> Option<Pos>,
    ) {
        self.total_distance_nm = total_distance_nm;
        self.top_of_climb_nm = None;
        self.top_of_descent_nm = None;
        self.top_of_climb_leg_index = None;
        self.top_of_descent_leg_index = None;
        self.top_of_climb_pos = None;
        self.top_of_descent_pos = None;
        self.leg_altitudes_ft.clear();

        if cumulative_nm.len() < 2
            || total_distance_nm <= 0.0
            || self.climb_rate_ft_per_nm <= 0.0
            || self.descent_rate_ft_per_nm <= 0.0
        {
            return;
        }

        let climb_nm =
            ((self.cruise_altitude_ft - self.departure_altitude_ft) / self.climb_rate_ft_per_nm).max(0.0);
        let descent_nm = ((self.cruise_altitude_ft - self.destination_altitude_ft)
            / self.descent_rate_ft_per_nm)
            .max(0.0);

        let mut toc = climb_nm;
        let mut tod = total_distance_nm - descent_nm;
        if toc > tod {
            // Cruise altitude cannot be reached - climb and descent lines meet
            let meet = (self.destination_altitude_ft - self.departure_altitude_ft
                + self.descent_rate_ft_per_nm * total_distance_nm)
                / (self.climb_rate_ft_per_nm + self.descent_rate_ft_per_nm);
            toc = meet.clamp(0.0, total_distance_nm);
            tod = toc;
        }

        if self.calc_top_of_climb {
            self.top_of_climb_nm = Some(toc);
            self.top_of_climb_leg_index = leg_index_for_distance(cumulative_nm, toc);
            self.top_of_climb_pos = position_at(toc);
        }

        if self.calc_top_of_descent {
            self.top_of_descent_nm = Some(tod);
            self.top_of_descent_leg_index = leg_index_for_distance(cumulative_nm, tod);
            self.top_of_descent_pos = position_at(tod);
        }

        self.leg_altitudes_ft = cumulative_nm
            .iter()
            .map(|d| self.altitude_for_distance(total_distance_nm - d))
            .collect();
    }

    /// Altitude in feet at the given distance to destination.
    pub fn altitude_for_distance(&self, distance_to_dest_nm: f64) -> f64 {
        let from_start = (self.total_distance_nm - distance_to_dest_nm).clamp(0.0, self.total_distance_nm);
        let climb = self.departure_altitude_ft + self.climb_rate_ft_per_nm * from_start;
        let descent = self.destination_altitude_ft
            + self.descent_rate_ft_per_nm * (self.total_distance_nm - from_start);
        self.cruise_altitude_ft.min(climb).min(descent)
    }

    pub fn top_of_climb_distance(&self) -> Option<f64> {
        self.top_of_climb_nm
    }

    pub fn top_of_descent_distance(&self) -> Option<f64> {
        self.top_of_descent_nm
    }

    /// Distance of the top of descent measured back from the destination.
    pub fn top_of_descent_from_destination(&self) -> Option<f64> {
        self.top_of_descent_nm.map(|d| self.total_distance_nm - d)
    }

    pub fn top_of_climb_leg_index(&self) -> Option<usize> {
        self.top_of_climb_leg_index
    }

    pub fn top_of_descent_leg_index(&self) -> Option<usize> {
        self.top_of_descent_leg_index
    }

    pub fn top_of_climb_pos(&self) -> Option<Pos> {
        self.top_of_climb_pos
    }

    pub fn top_of_descent_pos(&self) -> Option<Pos> {
        self.top_of_descent_pos
    }

    pub fn leg_altitudes_ft(&self) -> &[f64] {
        &self.leg_altitudes_ft
    }
}

/// Index of the leg ending at or after `distance_nm`.
fn leg_index_for_distance(cumulative_nm: &[f64], distance_nm: f64) -> Option<usize> {
    cumulative_nm
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, d)| **d >= distance_nm)
        .map(|(i, _)| i)
        .or(Some(cumulative_nm.len() - 1))
}
