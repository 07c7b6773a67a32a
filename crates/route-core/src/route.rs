//! The leg sequence: ordered route legs, procedure ranges and derived values.

use crate::altitude::RouteAltitude;
use crate::error::{Result, RouteError};
use crate::geo::{LineDistance, Pos, Rect};
use crate::magvar::{MagVarSource, SharedMagVar};
use crate::models::{
    FlightPlan, FlightPlanEntry, FlightRules, MapObjectType, PosCourse, ProcedureKind,
    ProcedureLeg, ProcedureLegs, RouteLeg,
};
use crate::rules::RouteOptions;
use serde::{Deserialize, Serialize};

/// Contiguous range of legs belonging to one procedure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegRange {
    pub offset: usize,
    pub size: usize,
}

impl LegRange {
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.offset && index < self.end()
    }
}

/// Ordered leg sequence of a flight plan plus tracking state.
///
/// Index 0 is the departure and the last index the destination when the plan
/// has airports at its ends. Leg `i` is always paired with flight plan entry
/// `i`. The whole structure is a value: cloning it yields an independent copy
/// including the altitude profile.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) legs: Vec<RouteLeg>,
    pub(crate) flightplan: FlightPlan,
    pub(crate) options: RouteOptions,

    pub(crate) departure_legs: ProcedureLegs,
    pub(crate) star_legs: ProcedureLegs,
    pub(crate) arrival_legs: ProcedureLegs,

    pub(crate) departure_range: Option<LegRange>,
    pub(crate) star_range: Option<LegRange>,
    pub(crate) arrival_range: Option<LegRange>,

    pub(crate) total_distance_nm: f64,
    pub(crate) bounding_rect: Option<Rect>,

    pub(crate) active_leg_index: Option<usize>,
    pub(crate) active_leg_result: LineDistance,
    pub(crate) active_pos: Option<PosCourse>,

    pub(crate) altitude: RouteAltitude,

    pub(crate) magvar_source: Option<SharedMagVar>,
}

impl Default for Route {
    fn default() -> Self {
        Self::new(Vec::new(), RouteOptions::default())
    }
}

impl Route {
    /// Build a route from resolved legs. Flight plan entries are derived from the legs.
    pub fn new(legs: Vec<RouteLeg>, options: RouteOptions) -> Self {
        let flightplan = FlightPlan {
            entries: legs.iter().map(FlightPlanEntry::from_leg).collect(),
            departure_name: legs.first().map(|l| l.ident.clone()).unwrap_or_default(),
            destination_name: legs.last().map(|l| l.ident.clone()).unwrap_or_default(),
            ..FlightPlan::default()
        };
        Self::build(flightplan, legs, options)
    }

    /// Build a route from a flight plan and its resolved legs.
    pub fn with_flight_plan(
        flightplan: FlightPlan,
        legs: Vec<RouteLeg>,
        options: RouteOptions,
    ) -> Result<Self> {
        if flightplan.entries.len() != legs.len() {
            return Err(RouteError::EntryMismatch {
                entries: flightplan.entries.len(),
                legs: legs.len(),
            });
        }
        Ok(Self::build(flightplan, legs, options))
    }

    fn build(mut flightplan: FlightPlan, legs: Vec<RouteLeg>, options: RouteOptions) -> Self {
        for (i, leg) in legs.iter().enumerate() {
            if leg.map_object_type == MapObjectType::Invalid {
                tracing::warn!(index = i, ident = %leg.ident, "Route leg not found in database");
            }
        }

        if let (Some(first), Some(last)) = (legs.first(), legs.last()) {
            // Fill in missing departure and destination names
            if flightplan.departure_name.is_empty() {
                flightplan.departure_name = first.ident.clone();
            }
            if flightplan.destination_name.is_empty() {
                flightplan.destination_name = last.ident.clone();
            }
        }

        let altitude = RouteAltitude::new(
            flightplan.cruise_altitude_ft,
            options.climb_rate_ft_per_nm,
            options.descent_rate_ft_per_nm,
        );

        let mut route = Self {
            legs,
            flightplan,
            options,
            departure_legs: ProcedureLegs::new(ProcedureKind::Departure, ""),
            star_legs: ProcedureLegs::new(ProcedureKind::Star, ""),
            arrival_legs: ProcedureLegs::new(ProcedureKind::Arrival, ""),
            departure_range: None,
            star_range: None,
            arrival_range: None,
            total_distance_nm: 0.0,
            bounding_rect: None,
            active_leg_index: None,
            active_leg_result: LineDistance::default(),
            active_pos: None,
            altitude,
            magvar_source: None,
        };
        route.update_all();
        route
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    pub fn leg(&self, index: usize) -> Option<&RouteLeg> {
        self.legs.get(index)
    }

    pub fn first(&self) -> Option<&RouteLeg> {
        self.legs.first()
    }

    pub fn last(&self) -> Option<&RouteLeg> {
        self.legs.last()
    }

    /// Position of leg `index` or an invalid position if out of range.
    pub fn position_at(&self, index: usize) -> Pos {
        self.legs
            .get(index)
            .map(|leg| leg.position)
            .unwrap_or(Pos::INVALID)
    }

    pub fn flight_plan(&self) -> &FlightPlan {
        &self.flightplan
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// Replace the options and recalculate the altitude profile.
    pub fn set_options(&mut self, options: RouteOptions) {
        self.options = options;
        self.update_leg_altitudes();
    }

    pub fn set_cruise_altitude_ft(&mut self, altitude_ft: f64) {
        self.flightplan.cruise_altitude_ft = altitude_ft;
        self.update_leg_altitudes();
    }

    /// Use `source` for legs without a database magnetic variation. Kept by
    /// copies and rebuilds of this route.
    pub fn set_magvar_source(&mut self, source: impl MagVarSource + 'static) {
        self.magvar_source = Some(SharedMagVar::new(source));
        self.update_magvar();
    }

    pub fn set_flight_rules(&mut self, flight_rules: FlightRules) {
        self.flightplan.flight_rules = flight_rules;
    }

    pub fn departure_legs(&self) -> &ProcedureLegs {
        &self.departure_legs
    }

    pub fn star_legs(&self) -> &ProcedureLegs {
        &self.star_legs
    }

    pub fn arrival_legs(&self) -> &ProcedureLegs {
        &self.arrival_legs
    }

    pub fn departure_range(&self) -> Option<LegRange> {
        self.departure_range
    }

    pub fn star_range(&self) -> Option<LegRange> {
        self.star_range
    }

    pub fn arrival_range(&self) -> Option<LegRange> {
        self.arrival_range
    }

    pub fn has_any_departure_procedure(&self) -> bool {
        self.departure_range.is_some()
    }

    pub fn has_any_star_procedure(&self) -> bool {
        self.star_range.is_some()
    }

    pub fn has_any_arrival_procedure(&self) -> bool {
        self.arrival_range.is_some()
    }

    /// Sum of all leg distances excluding missed approach legs.
    pub fn total_distance_nm(&self) -> f64 {
        self.total_distance_nm
    }

    pub fn bounding_rect(&self) -> Option<Rect> {
        self.bounding_rect
    }

    pub fn altitude(&self) -> &RouteAltitude {
        &self.altitude
    }

    pub fn top_of_climb_distance(&self) -> Option<f64> {
        self.altitude.top_of_climb_distance()
    }

    pub fn top_of_descent_distance(&self) -> Option<f64> {
        self.altitude.top_of_descent_distance()
    }

    pub fn top_of_climb_leg_index(&self) -> Option<usize> {
        self.altitude.top_of_climb_leg_index()
    }

    pub fn top_of_descent_leg_index(&self) -> Option<usize> {
        self.altitude.top_of_descent_leg_index()
    }

    pub fn top_of_climb_pos(&self) -> Option<Pos> {
        self.altitude.top_of_climb_pos()
    }

    pub fn top_of_descent_pos(&self) -> Option<Pos> {
        self.altitude.top_of_descent_pos()
    }

    pub fn altitude_for_distance(&self, distance_to_dest_nm: f64) -> f64 {
        self.altitude.altitude_for_distance(distance_to_dest_nm)
    }

    // ==== Active leg state ====

    /// Forget the active leg, e.g. after loading a new flight plan.
    pub fn reset_active(&mut self) {
        self.active_leg_result = LineDistance::default();
        self.active_pos = None;
        self.active_leg_index = None;
    }

    pub fn active_leg_index(&self) -> Option<usize> {
        self.active_leg_index
    }

    pub fn active_leg_result(&self) -> &LineDistance {
        &self.active_leg_result
    }

    pub fn active_pos(&self) -> Option<&PosCourse> {
        self.active_pos.as_ref()
    }

    pub fn active_leg(&self) -> Option<&RouteLeg> {
        self.active_leg_index.and_then(|i| self.legs.get(i))
    }

    /// Active index clamped into the current leg range.
    pub fn adjusted_active_leg(&self) -> Option<usize> {
        self.active_leg_index
            .map(|i| i.min(self.legs.len().saturating_sub(1)))
    }

    pub fn is_active_missed(&self) -> bool {
        self.active_leg().is_some_and(RouteLeg::is_missed)
    }

    /// Aircraft has left the last leg or the last leg before the missed approach.
    pub fn is_passed_last_leg(&self) -> bool {
        let Some(active) = self.active_leg_index else {
            return false;
        };
        let at_end = active + 1 >= self.legs.len()
            || self.legs.get(active + 1).is_some_and(RouteLeg::is_missed);
        at_end && self.active_leg_result.status == crate::geo::LineStatus::AfterEnd
    }

    /// Force the active leg. Invalid values fall back to the first leg.
    pub fn set_active_leg(&mut self, index: usize) -> Result<()> {
        if self.legs.len() < 2 {
            return Err(RouteError::IndexOutOfRange {
                index,
                size: self.legs.len(),
            });
        }

        let index = if index > 0 && index < self.legs.len() {
            index
        } else {
            1
        };
        self.active_leg_index = Some(index);
        self.active_leg_result = match self.active_pos {
            Some(pos) => pos
                .pos
                .distance_meter_to_line(&self.legs[index - 1].position, &self.legs[index].position),
            None => LineDistance::default(),
        };
        Ok(())
    }

    // ==== Derived state ====

    /// Recompute offsets, magnetic variation, distances, bounding rect and altitude profile.
    pub fn update_all(&mut self) {
        self.update_indices_and_offsets();
        self.update_magvar();
        self.update_distances_and_course();
        self.update_bounding_rect();
        self.update_leg_altitudes();
    }

    pub(crate) fn update_indices_and_offsets(&mut self) {
        self.active_leg_index = self.adjusted_active_leg();
        if self.legs.is_empty() {
            self.active_leg_index = None;
        }

        for (i, leg) in self.legs.iter_mut().enumerate() {
            leg.entry_index = i;
        }

        self.departure_range = self.find_range(ProcedureLeg::is_any_departure);
        self.star_range = self.find_range(ProcedureLeg::is_any_star);
        self.arrival_range = self.find_range(ProcedureLeg::is_arrival);
    }

    fn find_range(&self, predicate: impl Fn(&ProcedureLeg) -> bool) -> Option<LegRange> {
        let matches = |leg: &RouteLeg| leg.procedure_leg.as_ref().is_some_and(&predicate);
        let offset = self.legs.iter().position(&matches)?;
        let size = self.legs[offset..]
            .iter()
            .take_while(|leg| matches(*leg))
            .count();
        Some(LegRange { offset, size })
    }

    /// Database variation first, then the magnetic variation source at the
    /// leg position. Legs still unknown take the value of the nearest leg
    /// that has one, preferring earlier legs.
    pub(crate) fn update_magvar(&mut self) {
        let source = self.magvar_source.as_ref();
        let mut known: Vec<Option<f64>> = self
            .legs
            .iter()
            .map(|leg| {
                leg.magvar
                    .or_else(|| source.and_then(|s| s.magvar_deg(&leg.position)))
            })
            .collect();

        let mut last = None;
        for value in known.iter_mut() {
            match value {
                Some(v) => last = Some(*v),
                None => *value = last,
            }
        }
        let mut next = None;
        for value in known.iter_mut().rev() {
            match value {
                Some(v) => next = Some(*v),
                None => *value = next,
            }
        }

        for (leg, magvar) in self.legs.iter_mut().zip(known) {
            leg.calculated_magvar = magvar.unwrap_or(0.0);
        }
    }

    /// Airport after an approach carries no distance and is never sequenced.
    pub(crate) fn is_airport_after_arrival(&self, index: usize) -> bool {
        self.has_any_arrival_procedure()
            && index + 1 == self.legs.len()
            && self.legs[index].map_object_type == MapObjectType::Airport
    }

    /// Destination airport directly after a STAR or approach.
    pub(crate) fn is_airport_after_procedure(&self, index: usize) -> bool {
        (self.has_any_arrival_procedure() || self.has_any_star_procedure())
            && index + 1 == self.legs.len()
            && self.legs[index].map_object_type == MapObjectType::Airport
    }

    pub(crate) fn update_distances_and_course(&mut self) {
        self.total_distance_nm = 0.0;
        for i in 0..self.legs.len() {
            if self.is_airport_after_arrival(i) {
                self.legs[i].distance_to_here_nm = 0.0;
                self.legs[i].course_to_here_true = None;
                break;
            }

            let (before, rest) = self.legs.split_at_mut(i);
            let leg = &mut rest[0];
            leg.update_distance_and_course(before.last());

            if !leg.is_missed() {
                self.total_distance_nm += leg.distance_to_here_nm;
            }
        }
    }

    pub(crate) fn update_bounding_rect(&mut self) {
        self.bounding_rect = Rect::from_positions(self.legs.iter().map(|leg| &leg.position));
    }

    /// Distance from start at each leg, stopping before missed approach legs.
    pub fn cumulative_distances_nm(&self) -> Vec<f64> {
        let mut total = 0.0;
        self.legs
            .iter()
            .enumerate()
            .take_while(|(i, leg)| !leg.is_missed() && !self.is_airport_after_arrival(*i))
            .map(|(_, leg)| {
                total += leg.distance_to_here_nm;
                total
            })
            .collect()
    }

    pub(crate) fn update_leg_altitudes(&mut self) {
        let mut altitude = std::mem::take(&mut self.altitude);
        altitude.cruise_altitude_ft = self.flightplan.cruise_altitude_ft;
        altitude.climb_rate_ft_per_nm = self.options.climb_rate_ft_per_nm;
        altitude.descent_rate_ft_per_nm = self.options.descent_rate_ft_per_nm;
        altitude.calc_top_of_climb = true;
        altitude.calc_top_of_descent = true;

        let cumulative = self.cumulative_distances_nm();
        altitude.calculate(&cumulative, self.total_distance_nm, |d| {
            self.position_at_distance(d)
        });
        self.altitude = altitude;
    }

    // ==== Structure queries ====

    /// Index of the departure leg: the runway after the airport for SIDs.
    pub fn departure_leg_index(&self) -> Option<usize> {
        if self.legs.is_empty() {
            None
        } else if self.has_any_departure_procedure() {
            Some(1)
        } else {
            Some(0)
        }
    }

    /// Index of the destination leg: the last leg before a missed approach.
    pub fn destination_leg_index(&self) -> Option<usize> {
        if self.legs.is_empty() {
            return None;
        }

        if let Some(range) = self.arrival_range {
            if let Some(missed) = self.legs[range.offset..].iter().position(RouteLeg::is_missed) {
                return Some((range.offset + missed).saturating_sub(1));
            }
        }
        Some(self.legs.len() - 1)
    }

    /// Last leg of the departure procedure or the departure airport.
    pub fn start_index_after_procedure(&self) -> usize {
        self.departure_range
            .map(|r| r.end().saturating_sub(1))
            .unwrap_or(0)
    }

    /// First leg of the STAR or approach or the destination airport.
    pub fn destination_index_before_procedure(&self) -> usize {
        self.star_range
            .or(self.arrival_range)
            .map(|r| r.offset)
            .unwrap_or(self.legs.len().saturating_sub(1))
    }

    /// Legs between procedures can be edited, procedure legs cannot.
    pub fn can_edit_leg(&self, index: usize) -> bool {
        if self.departure_range.is_some_and(|r| index < r.end()) {
            return false;
        }
        if self.star_range.is_some_and(|r| index > r.offset) {
            return false;
        }
        if self.arrival_range.is_some_and(|r| index > r.offset) {
            return false;
        }
        true
    }

    pub fn can_edit_point(&self, index: usize) -> bool {
        self.legs.get(index).is_some_and(RouteLeg::is_route)
    }

    pub fn has_airways(&self) -> bool {
        self.legs
            .iter()
            .any(|leg| leg.airway_name.as_deref().is_some_and(|a| !a.is_empty()))
    }

    pub fn has_user_waypoints(&self) -> bool {
        self.legs
            .iter()
            .any(|leg| leg.map_object_type == MapObjectType::UserWaypoint)
    }

    pub fn has_valid_departure(&self) -> bool {
        self.flightplan
            .entries
            .first()
            .is_some_and(|e| e.waypoint_type == MapObjectType::Airport)
            && self.legs.first().is_some_and(RouteLeg::is_valid)
    }

    pub fn has_valid_destination(&self) -> bool {
        self.flightplan
            .entries
            .last()
            .is_some_and(|e| e.waypoint_type == MapObjectType::Airport)
            && self.legs.last().is_some_and(RouteLeg::is_valid)
    }

    /// More than departure and destination.
    pub fn has_entries(&self) -> bool {
        self.flightplan.entries.len() > 2
    }

    pub fn can_calc_route(&self) -> bool {
        self.flightplan.entries.len() >= 2
    }

    pub fn is_airport_departure(&self, ident: &str) -> bool {
        self.legs
            .first()
            .is_some_and(|leg| leg.map_object_type == MapObjectType::Airport && leg.ident == ident)
    }

    pub fn is_airport_destination(&self, ident: &str) -> bool {
        self.legs
            .last()
            .is_some_and(|leg| leg.map_object_type == MapObjectType::Airport && leg.ident == ident)
    }

    /// Number for the next generated user waypoint name `WP<n>`.
    pub fn next_user_waypoint_number(&self) -> u32 {
        self.flightplan
            .entries
            .iter()
            .filter(|e| e.waypoint_type == MapObjectType::UserWaypoint)
            .filter_map(|e| e.waypoint_id.strip_prefix("WP"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Line, Pos};
    use crate::models::{NavaidRef, ProcedureLegType, ProcedureType};

    fn airport(ident: &str, lon: f64, lat: f64) -> RouteLeg {
        RouteLeg::from_navaid(
            NavaidRef {
                id: 1,
                ident: ident.to_string(),
                region: "K1".to_string(),
                kind: MapObjectType::Airport,
            },
            Pos::new(lon, lat),
        )
    }

    fn approach_leg(ident: &str, from: Pos, to: Pos, procedure_type: ProcedureType) -> RouteLeg {
        RouteLeg::from_procedure_leg(ProcedureLeg::new(
            ProcedureLegType::TrackToFix,
            procedure_type,
            ident,
            Line::new(from, to),
        ))
    }

    #[test]
    fn test_total_distance_and_bounding_rect() {
        let route = Route::new(
            vec![
                airport("KAAA", 0.0, 0.0),
                RouteLeg::user_waypoint("WP1", Pos::new(1.0, 0.0)),
                airport("KBBB", 2.0, 0.0),
            ],
            RouteOptions::default(),
        );
        assert!((route.total_distance_nm() - 120.0).abs() < 0.5);
        let rect = route.bounding_rect().unwrap();
        assert_eq!(rect.west, 0.0);
        assert_eq!(rect.east, 2.0);
        assert_eq!(route.next_user_waypoint_number(), 2);
        assert!(route.has_valid_departure());
        assert!(route.has_valid_destination());
        assert!(route.has_user_waypoints());
    }

    #[test]
    fn test_missed_legs_excluded_from_total() {
        let faf = Pos::new(1.0, 0.0);
        let rwy = Pos::new(1.5, 0.0);
        let missed = Pos::new(2.0, 0.0);
        let route = Route::new(
            vec![
                airport("KAAA", 0.0, 0.0),
                approach_leg("FAF", Pos::new(0.0, 0.0), faf, ProcedureType::Approach),
                approach_leg("RW09", faf, rwy, ProcedureType::Approach),
                approach_leg("MAP", rwy, missed, ProcedureType::Missed),
                airport("KBBB", 1.5, 0.0),
            ],
            RouteOptions::default(),
        );

        assert!((route.total_distance_nm() - 90.0).abs() < 0.5);
        assert_eq!(route.arrival_range(), Some(LegRange { offset: 1, size: 3 }));
        assert_eq!(route.destination_leg_index(), Some(2));
        assert!(route.is_airport_after_arrival(4));
        assert_eq!(route.legs()[4].distance_to_here_nm, 0.0);
        assert_eq!(route.cumulative_distances_nm().len(), 3);
    }

    #[test]
    fn test_flight_plan_mismatch_is_an_error() {
        let plan = FlightPlan::default();
        let result = Route::with_flight_plan(
            plan,
            vec![airport("KAAA", 0.0, 0.0)],
            RouteOptions::default(),
        );
        assert!(matches!(
            result,
            Err(RouteError::EntryMismatch { entries: 0, legs: 1 })
        ));
    }

    #[test]
    fn test_magvar_filled_from_neighbours() {
        let route = Route::new(
            vec![
                airport("KAAA", 0.0, 0.0).with_magvar(5.0),
                RouteLeg::user_waypoint("WP1", Pos::new(1.0, 0.0)),
                airport("KBBB", 2.0, 0.0).with_magvar(7.0),
            ],
            RouteOptions::default(),
        );
        assert_eq!(route.legs()[1].magvar, None);
        assert!((route.legs()[1].calculated_magvar - 5.0).abs() < f64::EPSILON);
        assert!((route.legs()[2].calculated_magvar - 7.0).abs() < f64::EPSILON);
        let course = route.legs()[1].course_to_here_mag().unwrap();
        assert!((course - 85.0).abs() < 0.1);
    }

    #[test]
    fn test_magvar_from_source() {
        let mut route = Route::new(
            vec![
                airport("KAAA", 0.0, 0.0).with_magvar(5.0),
                RouteLeg::user_waypoint("WP1", Pos::new(1.0, 0.0)),
                airport("KBBB", 2.0, 0.0),
            ],
            RouteOptions::default(),
        );
        route.set_magvar_source(|pos: &Pos| if pos.lon > 0.5 { Some(-3.0) } else { None });

        // Database value wins over the source
        assert!((route.legs()[0].calculated_magvar - 5.0).abs() < f64::EPSILON);
        assert!((route.legs()[1].calculated_magvar + 3.0).abs() < f64::EPSILON);
        assert!((route.legs()[2].calculated_magvar + 3.0).abs() < f64::EPSILON);
        let course = route.legs()[1].course_to_here_mag().unwrap();
        assert!((course - 93.0).abs() < 0.1);

        // Source survives rebuilds and copies
        route.rebuild();
        let copy = route.clone();
        assert!((copy.legs()[1].calculated_magvar + 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_structure_queries() {
        let route = Route::new(
            vec![
                airport("KAAA", 0.0, 0.0),
                RouteLeg::user_waypoint("WP1", Pos::new(0.5, 0.0)),
                approach_leg("RW09", Pos::new(0.5, 0.0), Pos::new(1.0, 0.0), ProcedureType::Approach),
                airport("KBBB", 1.0, 0.0),
            ],
            RouteOptions::default(),
        );
        assert!(route.has_entries());
        assert!(route.can_calc_route());
        assert!(route.is_airport_departure("KAAA"));
        assert!(!route.is_airport_departure("KBBB"));
        assert!(route.is_airport_destination("KBBB"));
        assert!(!route.is_airport_destination("KAAA"));
        assert!(route.can_edit_point(1));
        assert!(!route.can_edit_point(2));
        assert!(!route.can_edit_point(10));
        assert!(!route.flight_plan().is_empty());

        let point = Route::new(vec![airport("KAAA", 0.0, 0.0)], RouteOptions::default());
        assert!(!point.has_entries());
        assert!(!point.can_calc_route());
        assert!(Route::default().flight_plan().is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut route = Route::new(
            vec![airport("KAAA", 0.0, 0.0), airport("KBBB", 1.0, 0.0)],
            RouteOptions::default(),
        );
        route.set_cruise_altitude_ft(9_000.0);
        let copy = route.clone();
        route.set_cruise_altitude_ft(5_000.0);
        assert!((copy.altitude().cruise_altitude_ft - 9_000.0).abs() < f64::EPSILON);
        assert!((route.altitude().cruise_altitude_ft - 5_000.0).abs() < f64::EPSILON);
    }
}
