//! Splicing of departure, STAR and arrival procedures into the leg sequence.

use crate::error::{Result, RouteError};
use crate::geo::Pos;
use crate::models::{
    FlightPlanEntry, MapObjectType, ProcedureKind, ProcedureLeg, ProcedureLegs, ProcedureMask,
    RouteLeg,
};
use crate::route::Route;

/// Longest user waypoint name accepted by flight plan exports.
const MAX_USER_WAYPOINT_NAME: usize = 10;

impl Route {
    /// Attach or replace a procedure and rebuild the leg sequence.
    ///
    /// The route is only changed if the procedure can be spliced in.
    pub fn set_procedure(&mut self, procedure: ProcedureLegs) -> Result<()> {
        if procedure.is_empty() {
            return Err(RouteError::EmptyProcedure {
                ident: procedure.ident,
            });
        }
        if self.legs.len() < 2 {
            return Err(RouteError::MissingAirport(procedure.kind));
        }

        let mut route = self.clone();
        match procedure.kind {
            ProcedureKind::Departure => route.departure_legs = procedure,
            ProcedureKind::Star => route.star_legs = procedure,
            ProcedureKind::Arrival => route.arrival_legs = procedure,
        }
        route.rebuild();
        *self = route;
        Ok(())
    }

    /// Detach the procedure parts selected by `mask` and remove their legs.
    pub fn remove_procedure_legs(&mut self, mask: ProcedureMask) {
        self.departure_legs.clear_by_mask(mask);
        self.star_legs.clear_by_mask(mask);
        self.arrival_legs.clear_by_mask(mask);
        self.clear_procedure_legs(mask);
        self.update_all();
    }

    /// Splice all attached procedures again, drop duplicate fixes at the
    /// procedure boundaries and recompute derived state.
    pub fn rebuild(&mut self) {
        let mut route = self.clone();
        route.update_procedure_legs();
        route.remove_duplicate_route_legs();
        route.update_all();

        tracing::info!(
            legs = route.legs.len(),
            total_distance_nm = route.total_distance_nm,
            departure = %route.departure_legs.ident,
            star = %route.star_legs.ident,
            arrival = %route.arrival_legs.ident,
            "Route rebuilt"
        );
        *self = route;
    }

    /// Replace all procedure legs with the legs of the attached procedures.
    pub(crate) fn update_procedure_legs(&mut self) {
        self.clear_procedure_legs(ProcedureMask::ALL);

        let has_procedures = !self.departure_legs.is_empty()
            || !self.star_legs.is_empty()
            || !self.arrival_legs.is_empty();
        if self.legs.len() < 2 {
            if has_procedures {
                tracing::warn!(legs = self.legs.len(), "No airports to attach procedures to");
            }
            self.update_indices_and_offsets();
            return;
        }

        // Departure procedure follows the departure airport
        let departure: Vec<ProcedureLeg> = self.departure_legs.legs().cloned().collect();
        for (i, leg) in departure.into_iter().enumerate() {
            self.insert_procedure_leg(1 + i, leg);
        }

        // STAR and approach precede the destination airport
        let arrival: Vec<ProcedureLeg> = self
            .star_legs
            .legs()
            .chain(self.arrival_legs.legs())
            .cloned()
            .collect();
        for leg in arrival {
            let index = self.legs.len() - 1;
            self.insert_procedure_leg(index, leg);
        }

        self.update_indices_and_offsets();
    }

    fn insert_procedure_leg(&mut self, index: usize, mut leg: ProcedureLeg) {
        // Connect legs without a start position to the previous leg
        if !leg.line.pos1.is_valid() && index > 0 {
            leg.line.pos1 = self.legs[index - 1].position;
            if leg.geometry.len() <= 2 {
                leg.geometry = crate::geo::LineString::new(vec![leg.line.pos1, leg.line.pos2]);
            }
        }
        self.insert_leg(index, RouteLeg::from_procedure_leg(leg));
    }

    fn insert_leg(&mut self, index: usize, leg: RouteLeg) {
        self.flightplan.entries.insert(index, FlightPlanEntry::from_leg(&leg));
        self.legs.insert(index, leg);
    }

    fn remove_leg(&mut self, index: usize) {
        self.flightplan.entries.remove(index);
        self.legs.remove(index);
    }

    /// Remove legs and entries of the procedure types in `mask`.
    pub(crate) fn clear_procedure_legs(&mut self, mask: ProcedureMask) {
        for i in (0..self.legs.len()).rev() {
            if self.legs[i].procedure_type().is_some_and(|t| mask.contains(t)) {
                self.remove_leg(i);
            }
        }
        self.update_indices_and_offsets();
    }

    /// Remove route legs repeating the fix of an adjacent procedure leg and
    /// consecutive route legs for the same navaid. Running this twice gives
    /// the same result as running it once.
    pub fn remove_duplicate_route_legs(&mut self) {
        self.update_indices_and_offsets();

        // Route fix before an arrival starting at the same navaid
        if let Some(mut offset) = self.star_range.or(self.arrival_range).map(|r| r.offset) {
            while offset >= 2 {
                let route_leg = &self.legs[offset - 1];
                let arrival_leg = &self.legs[offset];
                let duplicate = arrival_leg
                    .procedure_leg_type()
                    .is_some_and(|t| t.is_entry_type())
                    && route_leg.is_route()
                    && arrival_leg.is_navaid_equal_to(route_leg);
                if !duplicate {
                    break;
                }

                tracing::debug!(index = offset - 1, ident = %route_leg.ident, "Removing duplicate before arrival");
                self.remove_leg(offset - 1);
                offset -= 1;
            }
            self.update_indices_and_offsets();
        }

        // Route fix after a departure ending at the same navaid
        if let Some(range) = self.departure_range {
            let offset = range.end() - 1;
            while offset + 2 < self.legs.len() {
                let departure_leg = &self.legs[offset];
                let route_leg = &self.legs[offset + 1];
                let duplicate = departure_leg
                    .procedure_leg_type()
                    .is_some_and(|t| t.is_exit_type())
                    && route_leg.is_route()
                    && departure_leg.is_navaid_equal_to(route_leg);
                if !duplicate {
                    break;
                }

                tracing::debug!(index = offset + 1, ident = %route_leg.ident, "Removing duplicate after departure");
                self.remove_leg(offset + 1);

                // The leg now following the departure cannot start an airway
                self.legs[offset + 1].airway_name = None;
                self.flightplan.entries[offset + 1].airway = None;
            }
            self.update_indices_and_offsets();
        }

        // Consecutive route legs for the same navaid
        let mut i = self.legs.len();
        while i > 1 {
            i -= 1;
            let prev = &self.legs[i - 1];
            let leg = &self.legs[i];
            if prev.is_route() && leg.is_route() && prev.is_navaid_equal_to(leg) {
                tracing::debug!(index = i, ident = %leg.ident, "Removing consecutive duplicate");
                self.remove_leg(i);
            }
        }
        self.update_indices_and_offsets();
    }

    /// Copy of this route with procedure legs turned into plain waypoints.
    ///
    /// `save_approach_waypoints` converts transition and approach legs and
    /// drops the missed approach; `save_sid_star_waypoints` converts SID and
    /// STAR legs. Converted procedures are detached from the copy.
    pub fn adjusted_to_procedure_options(
        &self,
        save_approach_waypoints: bool,
        save_sid_star_waypoints: bool,
    ) -> Route {
        let mut route = self.clone();
        if !save_approach_waypoints && !save_sid_star_waypoints {
            return route;
        }

        let mut convert = ProcedureMask::NONE;
        if save_approach_waypoints {
            route.clear_procedure_legs(ProcedureMask::MISSED);
            convert = convert | ProcedureMask::TRANSITION | ProcedureMask::APPROACH;
        }
        if save_sid_star_waypoints {
            convert = convert | ProcedureMask::SID_STAR_ALL;
        }

        let mut next_number = route.next_user_waypoint_number();
        for i in 0..route.legs.len() {
            if !route.legs[i].procedure_type().is_some_and(|t| convert.contains(t)) {
                continue;
            }
            let leg = plain_waypoint_from(&route.legs[i], &mut next_number);
            route.flightplan.entries[i] = FlightPlanEntry::from_leg(&leg);
            route.legs[i] = leg;
        }

        // Unconverted procedure legs are created again from the procedures
        for i in (0..route.legs.len()).rev() {
            if route.flightplan.entries[i].no_save {
                route.remove_leg(i);
            }
        }

        // Converted legs often repeat the neighbouring fix
        for i in (1..route.legs.len()).rev() {
            if is_same_entry(&route.flightplan.entries[i - 1], &route.flightplan.entries[i]) {
                route.remove_leg(i);
            }
        }

        if save_approach_waypoints {
            route.arrival_legs.clear_by_mask(ProcedureMask::ARRIVAL);
        }
        if save_sid_star_waypoints {
            route.departure_legs.clear_by_mask(ProcedureMask::DEPARTURE);
            route.star_legs.clear_by_mask(ProcedureMask::STAR_ALL);
        }

        route.rebuild();
        route
    }
}

/// Plain leg for a procedure fix: the navaid if there is one, otherwise a
/// user waypoint named after the runway or the leg remarks.
fn plain_waypoint_from(leg: &RouteLeg, next_number: &mut u32) -> RouteLeg {
    let position = leg.position;
    let navaid = leg.navaid.clone().filter(|n| {
        matches!(
            n.kind,
            MapObjectType::Waypoint | MapObjectType::Vor | MapObjectType::Ndb
        )
    });

    let mut plain = match navaid {
        Some(navaid) => RouteLeg::from_navaid(navaid, position),
        None => {
            let procedure_leg = leg.procedure_leg.as_ref();
            let name = procedure_leg
                .and_then(|p| p.runway.as_deref())
                .map(|runway| format!("RW{runway}"))
                .or_else(|| procedure_leg.map(|p| user_waypoint_name(&p.display_text.join(" "))))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| {
                    let name = format!("WP{next_number}");
                    *next_number += 1;
                    name
                });
            RouteLeg::user_waypoint(name, position)
        }
    };
    plain.magvar = leg.magvar;
    plain
}

/// Upper case alphanumeric name short enough for flight plan exports.
fn user_waypoint_name(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(MAX_USER_WAYPOINT_NAME)
        .collect()
}

fn is_same_entry(entry1: &FlightPlanEntry, entry2: &FlightPlanEntry) -> bool {
    entry1.waypoint_id == entry2.waypoint_id
        && entry1.icao_ident == entry2.icao_ident
        && entry1.icao_region == entry2.icao_region
        && entry1.position.almost_equal(&entry2.position, Pos::POS_EPSILON_100M)
}
