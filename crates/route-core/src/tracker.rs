//! Active leg tracking.
//!
//! Maps a stream of position and course samples onto a forward moving leg
//! index. The leg at index `i` is the segment from leg `i - 1` to leg `i`.
//! Holds, procedure turns and missed approach legs get their own
//! sequencing rules; everything else advances when the aircraft passes the
//! end of the active segment or is closer to the next one and roughly on
//! its course.

use crate::geo::{course_difference, nm_to_meter, LineDistance, LineStatus, Pos};
use crate::models::{PosCourse, ProcedureLegType, TurnDirection};
use crate::route::Route;

/// Positions further than this from every segment do not start tracking.
const MAX_SEED_CROSS_TRACK_NM: f64 = 100.0;

/// Leaving a hold onto a leg starting at the holding fix
const HOLD_EXIT_MAX_CROSS_TRACK_NM: f64 = 0.5;
const HOLD_EXIT_MIN_PROGRESS_NM: f64 = 0.75;
const HOLD_EXIT_MAX_COURSE_DIFF_DEG: f64 = 25.0;

/// Leaving a hold using its exit line
const HOLD_EXIT_LINE_NM: f64 = 0.5;

/// Entering a hold
const HOLD_ENTRY_DISTANCE_NM: f64 = 0.5;

const PROCEDURE_TURN_EPSILON_M: f64 = 100.0;
const PROCEDURE_TURN_MAX_COURSE_DIFF_DEG: f64 = 45.0;

const LEG_EPSILON_M: f64 = 10.0;
const LEG_MAX_COURSE_DIFF_DEG: f64 = 90.0;

/// Fuzzy cross-track comparison: `|d1| < |d2| + epsilon`.
///
/// Only the second distance is relaxed which keeps the tracker from
/// switching back and forth when both distances are nearly equal.
pub fn is_smaller(dist1: &LineDistance, dist2: &LineDistance, epsilon: f64) -> bool {
    dist1.distance.abs() < dist2.distance.abs() + epsilon
}

impl Route {
    /// Feed a new position sample and return the active leg and its
    /// classification. `force_reset` discards the active leg and seeds it
    /// again from the nearest segment.
    pub fn update_active_leg(
        &mut self,
        pos: PosCourse,
        force_reset: bool,
    ) -> (Option<usize>, LineDistance) {
        if force_reset {
            self.active_leg_result = LineDistance::default();
            self.active_leg_index = None;
        }
        self.update_active_leg_and_pos(pos);
        (self.active_leg_index, self.active_leg_result)
    }

    /// Re-evaluate the active leg with the last sample, e.g. after a rebuild.
    pub fn refresh_active_leg(&mut self, force_reset: bool) {
        match self.active_pos {
            Some(pos) => {
                self.update_active_leg(pos, force_reset);
            }
            None => self.reset_active(),
        }
    }

    fn update_active_leg_and_pos(&mut self, pos: PosCourse) {
        if self.legs.is_empty() || !pos.is_valid() {
            self.reset_active();
            return;
        }

        self.active_pos = Some(pos);

        if self.legs.len() == 1 {
            // Point route, only the distance to the single point is known
            let point = self.legs[0].position;
            self.active_leg_index = Some(0);
            self.active_leg_result = pos.pos.distance_meter_to_line(&point, &point);
            return;
        }

        let active = match self.active_leg_index {
            Some(index) => index,
            None => match self.nearest_all_leg_index(&pos.pos) {
                Some((index, cross_track_m)) => {
                    tracing::debug!(index, cross_track_m, "Starting with nearest leg");
                    index
                }
                None => {
                    self.active_leg_result = LineDistance::default();
                    return;
                }
            },
        };

        // Clamp into range and leave the point route state
        let active = active.clamp(1, self.legs.len() - 1);
        self.active_leg_index = Some(active);
        self.active_leg_result = self.segment_result(&pos.pos, active);

        let Some(next) = self.next_leg_candidate(active) else {
            return;
        };

        let pos1 = self.legs[next - 1].position;
        let pos2 = self.legs[next].position;
        let course_diff = course_difference(pos.course, pos1.angle_deg_to(&pos2));
        let next_result = pos.pos.distance_meter_to_line(&pos1, &pos2);

        let mut switch_to_next = self.is_leg_done(active, next, &pos, &next_result, course_diff);

        if self.is_airport_after_procedure(next) {
            // Destination after an arrival carries no distance
            switch_to_next = false;
        }

        if switch_to_next && !self.options.show_missed_approach && self.legs[next].is_missed() {
            // Do not track on missed if legs are not displayed
            switch_to_next = false;
        }

        if switch_to_next {
            tracing::debug!(
                from = active,
                to = next,
                ident = %self.legs[next].ident,
                course_diff,
                "Sequencing to next leg"
            );
            self.active_leg_index = Some(next);
            self.active_leg_result = self.segment_result(&pos.pos, next);
        }
    }

    fn segment_result(&self, pos: &Pos, index: usize) -> LineDistance {
        pos.distance_meter_to_line(&self.legs[index - 1].position, &self.legs[index].position)
    }

    /// Next leg to sequence to, skipping initial fixes and other point-like
    /// legs which provide no course. Stays at least two legs from the end.
    fn next_leg_candidate(&self, active: usize) -> Option<usize> {
        let len = self.legs.len();
        let mut next = active + 1;
        if next >= len {
            return None;
        }

        // Lines after a hold can not overlap, so initial fixes are skipped there
        // without checking for the same position
        let active_is_hold = self.legs[active].is_hold();
        while self.legs[next]
            .procedure_leg_type()
            .is_some_and(ProcedureLegType::is_initial_fix)
            && (active_is_hold || self.legs[next - 1].position.same_fix(&self.legs[next].position))
            && next + 2 < len
        {
            next += 1;
        }
        Some(next)
    }

    fn is_leg_done(
        &self,
        active: usize,
        next: usize,
        pos: &PosCourse,
        next_result: &LineDistance,
        course_diff: f64,
    ) -> bool {
        let active_leg = &self.legs[active];
        let next_leg = &self.legs[next];

        if let Some(hold) = active_leg.procedure_leg.as_ref().filter(|p| p.is_hold()) {
            let next_starts_at_hold = next_leg
                .procedure_leg
                .as_ref()
                .is_some_and(|p| p.line.pos1.same_fix(&active_leg.position));

            if next_starts_at_hold {
                next_result.status == LineStatus::AlongTrack
                    && next_result.distance.abs() < nm_to_meter(HOLD_EXIT_MAX_CROSS_TRACK_NM)
                    && next_result.distance_from1 > nm_to_meter(HOLD_EXIT_MIN_PROGRESS_NM)
                    && course_diff < HOLD_EXIT_MAX_COURSE_DIFF_DEG
            } else {
                // Hold point differs from next leg start - use the exit line
                let Some(hold_line) = hold.hold_line else {
                    return false;
                };
                let result = hold_line.distance_meter_to_line(&pos.pos);
                if result.status != LineStatus::AlongTrack {
                    return false;
                }
                match hold.turn_direction {
                    TurnDirection::Right => result.distance < -nm_to_meter(HOLD_EXIT_LINE_NM),
                    TurnDirection::Left | TurnDirection::None => {
                        result.distance > nm_to_meter(HOLD_EXIT_LINE_NM)
                    }
                }
            }
        } else if next_leg.is_hold() {
            // Only the distance to the holding fix counts
            next_result.distance.abs() < nm_to_meter(HOLD_ENTRY_DISTANCE_NM)
        } else if active_leg.is_procedure_leg_type(ProcedureLegType::ProcedureTurn) {
            // The turn can start before the end of the leg
            is_smaller(next_result, &self.active_leg_result, PROCEDURE_TURN_EPSILON_M)
                && course_diff < PROCEDURE_TURN_MAX_COURSE_DIFF_DEG
        } else {
            self.active_leg_result.status == LineStatus::AfterEnd
                || (is_smaller(next_result, &self.active_leg_result, LEG_EPSILON_M)
                    && course_diff < LEG_MAX_COURSE_DIFF_DEG)
        }
    }

    /// Segment with the smallest cross-track distance. Returns the leg index
    /// and signed cross-track distance in meters.
    pub(crate) fn nearest_all_leg_index(&self, pos: &Pos) -> Option<(usize, f64)> {
        if !pos.is_valid() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for i in 1..self.legs.len() {
            let result = self.segment_result(pos, i);
            let replace = best
                .map(|(_, distance)| result.distance.abs() < distance.abs())
                .unwrap_or(true);
            if result.is_valid() && replace {
                best = Some((i, result.distance));
            }
        }

        // Too far away from any segment or point
        best.filter(|(_, distance)| distance.abs() <= nm_to_meter(MAX_SEED_CROSS_TRACK_NM))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Line, Pos};
    use crate::models::{NavaidRef, MapObjectType, ProcedureLeg, ProcedureType, RouteLeg};
    use crate::rules::RouteOptions;

    fn wp(ident: &str, lon: f64, lat: f64) -> RouteLeg {
        RouteLeg::from_navaid(
            NavaidRef {
                id: 0,
                ident: ident.to_string(),
                region: "XX".to_string(),
                kind: MapObjectType::Waypoint,
            },
            Pos::new(lon, lat),
        )
    }

    fn straight_route() -> Route {
        Route::new(
            vec![
                wp("A", 0.0, 0.0),
                wp("B", 1.0, 0.0),
                wp("C", 2.0, 0.0),
                wp("D", 3.0, 0.0),
            ],
            RouteOptions::default(),
        )
    }

    #[test]
    fn test_is_smaller_is_asymmetric() {
        let a = LineDistance {
            distance: 105.0,
            ..LineDistance::default()
        };
        let b = LineDistance {
            distance: -100.0,
            ..LineDistance::default()
        };
        assert!(is_smaller(&a, &b, 10.0));
        assert!(!is_smaller(&a, &b, 5.0));
        assert!(is_smaller(&b, &a, 0.0));
    }

    #[test]
    fn test_empty_route_resets() {
        let mut route = Route::new(Vec::new(), RouteOptions::default());
        let (index, result) = route.update_active_leg(PosCourse::new(Pos::new(0.0, 0.0), 90.0), false);
        assert_eq!(index, None);
        assert_eq!(result.status, LineStatus::Invalid);
    }

    #[test]
    fn test_invalid_position_resets() {
        let mut route = straight_route();
        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);
        assert!(route.active_leg_index().is_some());
        route.update_active_leg(PosCourse::new(Pos::INVALID, 90.0), false);
        assert_eq!(route.active_leg_index(), None);
    }

    #[test]
    fn test_seeds_nearest_segment() {
        let mut route = straight_route();
        let (index, result) =
            route.update_active_leg(PosCourse::new(Pos::new(1.5, 0.01), 90.0), false);
        assert_eq!(index, Some(2));
        assert_eq!(result.status, LineStatus::AlongTrack);
    }

    #[test]
    fn test_too_far_stays_unset() {
        let mut route = straight_route();
        let (index, _) = route.update_active_leg(PosCourse::new(Pos::new(1.5, 3.0), 90.0), false);
        assert_eq!(index, None);
    }

    #[test]
    fn test_single_point_route() {
        let mut route = Route::new(vec![wp("A", 0.0, 0.0)], RouteOptions::default());
        let (index, result) =
            route.update_active_leg(PosCourse::new(Pos::new(0.0, 1.0), 0.0), false);
        assert_eq!(index, Some(0));
        assert!((result.distance - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_advances_after_end() {
        let mut route = straight_route();
        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        // Past B flying east: closer to B-C and on course
        route.update_active_leg(PosCourse::new(Pos::new(1.05, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(2));
    }

    #[test]
    fn test_does_not_advance_against_course() {
        let mut route = Route::new(
            vec![wp("A", 0.0, 0.0), wp("B", 1.0, 0.0), wp("C", 1.0, 1.0)],
            RouteOptions::default(),
        );
        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);

        // Equally close to both legs but flying south, away from the northbound leg B-C
        route.update_active_leg(PosCourse::new(Pos::new(0.9995, 0.0005), 180.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        route.update_active_leg(PosCourse::new(Pos::new(0.9995, 0.0005), 0.0), false);
        assert_eq!(route.active_leg_index(), Some(2));
    }

    #[test]
    fn test_skips_coincident_initial_fix() {
        let b = Pos::new(1.0, 0.0);
        let initial_fix = RouteLeg::from_procedure_leg(ProcedureLeg::new(
            ProcedureLegType::InitialFix,
            ProcedureType::Star,
            "B",
            Line::new(b, b),
        ));
        let star_leg = RouteLeg::from_procedure_leg(ProcedureLeg::new(
            ProcedureLegType::TrackToFix,
            ProcedureType::Star,
            "C",
            Line::new(b, Pos::new(2.0, 0.0)),
        ));
        let mut route = Route::new(
            vec![
                wp("A", 0.0, 0.0),
                wp("B", 1.0, 0.0),
                initial_fix,
                star_leg,
                wp("D", 3.0, 0.0),
                wp("E", 4.0, 0.0),
            ],
            RouteOptions::default(),
        );

        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);
        route.update_active_leg(PosCourse::new(Pos::new(1.05, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(3));
    }

    #[test]
    fn test_hidden_missed_legs_are_not_sequenced() {
        let rwy = Pos::new(1.0, 0.0);
        let approach = RouteLeg::from_procedure_leg(ProcedureLeg::new(
            ProcedureLegType::TrackToFix,
            ProcedureType::Approach,
            "RW09",
            Line::new(Pos::new(0.0, 0.0), rwy),
        ));
        let missed = RouteLeg::from_procedure_leg(ProcedureLeg::new(
            ProcedureLegType::CourseToFix,
            ProcedureType::Missed,
            "MA",
            Line::new(rwy, Pos::new(2.0, 0.0)),
        ));
        let missed_end = RouteLeg::from_procedure_leg(ProcedureLeg::new(
            ProcedureLegType::TrackToFix,
            ProcedureType::Missed,
            "MB",
            Line::new(Pos::new(2.0, 0.0), Pos::new(3.0, 0.0)),
        ));
        let options = RouteOptions {
            show_missed_approach: false,
            ..RouteOptions::default()
        };
        let mut route = Route::new(
            vec![wp("A", 0.0, 0.0), approach, missed, missed_end, wp("Z", 0.0, 0.0)],
            options,
        );

        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);
        route.update_active_leg(PosCourse::new(Pos::new(1.2, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        let mut options = route.options().clone();
        options.show_missed_approach = true;
        route.set_options(options);
        route.update_active_leg(PosCourse::new(Pos::new(1.2, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(2));
        assert!(route.is_active_missed());
    }

    fn star_leg(leg_type: ProcedureLegType, ident: &str, from: Pos, to: Pos) -> RouteLeg {
        RouteLeg::from_procedure_leg(ProcedureLeg::new(
            leg_type,
            ProcedureType::Star,
            ident,
            Line::new(from, to),
        ))
    }

    #[test]
    fn test_enters_hold_near_fix() {
        let fix = Pos::new(1.0, 0.0);
        let mut route = Route::new(
            vec![
                wp("A", 0.0, 0.0),
                wp("B", 1.0, 0.0),
                star_leg(ProcedureLegType::HoldToFix, "B", fix, fix),
                wp("D", 2.0, 0.0),
            ],
            RouteOptions::default(),
        );
        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        let pos = fix.endpoint(nm_to_meter(0.6), 270.0);
        route.update_active_leg(PosCourse::new(pos, 90.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        let pos = fix.endpoint(nm_to_meter(0.4), 270.0);
        route.update_active_leg(PosCourse::new(pos, 90.0), false);
        assert_eq!(route.active_leg_index(), Some(2));
    }

    #[test]
    fn test_leaves_hold_on_leg_from_holding_fix() {
        let a = Pos::new(0.0, 0.0);
        let fix = Pos::new(1.0, 0.0);
        let mut route = Route::new(
            vec![
                wp("A", 0.0, 0.0),
                star_leg(ProcedureLegType::HoldToFix, "H", a, fix),
                star_leg(ProcedureLegType::TrackToFix, "C", fix, Pos::new(2.0, 0.0)),
                wp("D", 3.0, 0.0),
            ],
            RouteOptions::default(),
        );
        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        // Not far enough along the outbound leg
        let pos = fix.endpoint(nm_to_meter(0.5), 90.0);
        route.update_active_leg(PosCourse::new(pos, 90.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        // Far enough but still turning
        let pos = fix.endpoint(nm_to_meter(0.8), 90.0);
        route.update_active_leg(PosCourse::new(pos, 120.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        route.update_active_leg(PosCourse::new(pos, 90.0), false);
        assert_eq!(route.active_leg_index(), Some(2));
    }

    #[test]
    fn test_procedure_turn_sequences_before_end() {
        let a = Pos::new(0.0, 0.0);
        let turn = Pos::new(1.0, 0.0);
        let inbound = Pos::new(0.3, -0.3);
        let mut route = Route::new(
            vec![
                wp("A", 0.0, 0.0),
                star_leg(ProcedureLegType::ProcedureTurn, "PT", a, turn),
                star_leg(ProcedureLegType::TrackToFix, "F", turn, inbound),
                wp("D", 0.3, -1.0),
            ],
            RouteOptions::default(),
        );
        route.update_active_leg(PosCourse::new(Pos::new(0.2, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        // Abeam the start of the inbound leg while still on the procedure turn leg
        let pos = turn.interpolate(&inbound, 0.03);
        route.update_active_leg(PosCourse::new(pos, 90.0), false);
        assert_eq!(route.active_leg_index(), Some(1));

        route.update_active_leg(PosCourse::new(pos, 240.0), false);
        assert_eq!(route.active_leg_index(), Some(2));
    }

    #[test]
    fn test_refresh_active_leg() {
        let mut route = straight_route();
        route.refresh_active_leg(false);
        assert_eq!(route.active_leg_index(), None);

        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);
        route.set_active_leg(3).unwrap();
        route.refresh_active_leg(true);
        assert_eq!(route.active_leg_index(), Some(1));

        // Without reset the tracker does not go back
        route.set_active_leg(2).unwrap();
        route.refresh_active_leg(false);
        assert_eq!(route.active_leg_index(), Some(2));
        assert_eq!(route.active_leg_result().status, LineStatus::BeforeStart);
    }

    #[test]
    fn test_set_active_leg() {
        let mut route = straight_route();
        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);

        route.set_active_leg(3).unwrap();
        assert_eq!(route.active_leg_index(), Some(3));
        assert_eq!(route.active_leg_result().status, LineStatus::BeforeStart);

        // Out of range falls back to the first leg
        route.set_active_leg(10).unwrap();
        assert_eq!(route.active_leg_index(), Some(1));

        let mut point = Route::new(vec![wp("A", 0.0, 0.0)], RouteOptions::default());
        assert!(point.set_active_leg(1).is_err());
    }
}
