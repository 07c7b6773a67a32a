//! Distances along the route for the tracked position and positions for
//! distances along the route.

use crate::geo::{meter_to_nm, nm_to_meter, LineDistance, LineStatus, Pos};
use crate::route::Route;
use serde::Serialize;

/// Progress of the tracked position along the route. All values in nautical miles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteDistances {
    /// Flown distance from the departure
    pub from_start_nm: f64,
    /// Remaining distance to the destination or to the end of the missed approach
    pub to_destination_nm: f64,
    /// Distance to the end of the active leg
    pub next_leg_nm: f64,
    /// Signed cross-track distance, positive right of course. Only set when
    /// the position is abeam the active leg.
    pub cross_track_nm: Option<f64>,
    /// Position projected onto the route, measured from the departure
    pub projection_nm: f64,
}

impl Route {
    /// Distances for the last tracked position or `None` if no leg is active.
    pub fn route_distances(&self) -> Option<RouteDistances> {
        let active = self.adjusted_active_leg()?;
        let pos = self.active_pos?.pos;

        if self.legs.len() == 1 {
            let distance = meter_to_nm(self.legs[0].position.distance_meter_to(&pos));
            return Some(RouteDistances {
                from_start_nm: 0.0,
                to_destination_nm: distance,
                next_leg_nm: distance,
                cross_track_nm: None,
                projection_nm: 0.0,
            });
        }

        let active_leg = &self.legs[active];
        let active_is_missed = active_leg.is_missed();

        let geometry_result = active_leg
            .curved_geometry()
            .map(|geometry| geometry.distance_meter_to_line_string(&pos));

        let leg_result: &LineDistance = geometry_result.as_ref().unwrap_or(&self.active_leg_result);
        let cross_track_nm =
            (leg_result.status == LineStatus::AlongTrack).then(|| meter_to_nm(leg_result.distance));

        // Remaining distance on the active leg
        let to_current_nm = match &geometry_result {
            Some(result) => meter_to_nm(result.distance_from2),
            None => meter_to_nm(active_leg.position.distance_meter_to(&pos)),
        };

        // Summed leg distances up to the end of the active leg. Missed legs
        // only count when flying the missed approach.
        let legs_to_active_nm: f64 = self.legs[..=active]
            .iter()
            .take_while(|leg| !leg.is_missed() || active_is_missed)
            .map(|leg| leg.distance_to_here_nm)
            .sum();

        let from_start_nm = (legs_to_active_nm - to_current_nm).abs();

        let projection_nm = if self.is_passed_last_leg() || active_is_missed {
            self.total_distance_nm
        } else if self.active_leg_result.status == LineStatus::AlongTrack {
            legs_to_active_nm - meter_to_nm(self.active_leg_result.distance_from2)
        } else {
            legs_to_active_nm - active_leg.distance_to_here_nm
        };
        let projection_nm = projection_nm.clamp(0.0, self.total_distance_nm);

        let to_destination_nm = if active_is_missed {
            // Remaining missed legs
            let remaining: f64 = self.legs[active + 1..]
                .iter()
                .take_while(|leg| leg.is_missed())
                .map(|leg| leg.distance_to_here_nm)
                .sum();
            (remaining + to_current_nm).abs()
        } else {
            (self.total_distance_nm - from_start_nm).max(0.0)
        };

        Some(RouteDistances {
            from_start_nm,
            to_destination_nm,
            next_leg_nm: to_current_nm,
            cross_track_nm,
            projection_nm,
        })
    }

    pub fn distance_from_start(&self) -> Option<f64> {
        self.route_distances().map(|d| d.from_start_nm)
    }

    pub fn distance_to_destination(&self) -> Option<f64> {
        self.route_distances().map(|d| d.to_destination_nm)
    }

    pub fn next_leg_distance(&self) -> Option<f64> {
        self.route_distances().map(|d| d.next_leg_nm)
    }

    pub fn cross_track_distance(&self) -> Option<f64> {
        self.route_distances().and_then(|d| d.cross_track_nm)
    }

    pub fn projection_distance(&self) -> Option<f64> {
        self.route_distances().map(|d| d.projection_nm)
    }

    /// Position at `distance_nm` from the departure, following curved
    /// procedure geometry where present.
    ///
    /// Returns `None` for distances outside `[0, total]`.
    pub fn position_at_distance(&self, distance_nm: f64) -> Option<Pos> {
        if self.legs.len() < 2 || distance_nm < 0.0 || distance_nm > self.total_distance_nm {
            return None;
        }

        let mut travelled = 0.0;
        let mut found = None;
        for i in 1..self.legs.len() {
            if self.legs[i].is_missed() {
                break;
            }
            travelled += self.legs[i].distance_to_here_nm;
            if travelled >= distance_nm && self.legs[i].distance_to_here_nm > 0.0 {
                found = Some(i);
                break;
            }
        }

        let Some(index) = found else {
            // Only zero length legs left
            return Some(self.position_at(0)).filter(Pos::is_valid);
        };

        let leg = &self.legs[index];
        let fraction = (distance_nm - (travelled - leg.distance_to_here_nm)) / leg.distance_to_here_nm;
        let pos = match leg.curved_geometry() {
            Some(geometry) => geometry.interpolate(fraction),
            None => self.position_at(index - 1).interpolate(&leg.position, fraction),
        };
        Some(pos).filter(Pos::is_valid)
    }

    /// Leg with the smallest cross-track distance to `pos` and its
    /// classification. `ignore_not_editable` skips procedure legs.
    pub fn nearest_route_leg_result(
        &self,
        pos: &Pos,
        ignore_not_editable: bool,
    ) -> Option<(usize, LineDistance)> {
        if !pos.is_valid() {
            return None;
        }

        if self.legs.len() == 1 {
            let point = self.legs[0].position;
            let result = pos.distance_meter_to_line(&point, &point);
            return result.is_valid().then_some((0, result));
        }

        let mut best: Option<(usize, LineDistance)> = None;
        for i in 1..self.legs.len() {
            if ignore_not_editable && !self.can_edit_leg(i) {
                continue;
            }

            let result = pos.distance_meter_to_line(&self.legs[i - 1].position, &self.legs[i].position);
            let replace = best
                .as_ref()
                .map(|(_, b)| result.distance.abs() < b.distance.abs())
                .unwrap_or(true);
            if result.is_valid() && replace {
                best = Some((i, result));
            }
        }
        best
    }

    /// Distance from the departure to the projection of `pos` onto the
    /// nearest leg. `None` if the position is not abeam any leg.
    pub fn distance_from_start_at(&self, pos: &Pos) -> Option<f64> {
        let (index, result) = self.nearest_route_leg_result(pos, false)?;
        if result.status != LineStatus::AlongTrack {
            return None;
        }

        let legs_before_m: f64 = self.legs[..index]
            .iter()
            .take_while(|leg| !leg.is_missed())
            .map(|leg| nm_to_meter(leg.distance_to_here_nm))
            .sum();
        Some(meter_to_nm(legs_before_m + result.distance_from1))
    }
}

#[cfg(test)]
mod tests {
    use crate::geo::{Line, LineStatus, LineString, Pos};
    use crate::models::{
        MapObjectType, NavaidRef, PosCourse, ProcedureLeg, ProcedureLegType, ProcedureType,
        RouteLeg,
    };
    use crate::route::Route;
    use crate::rules::RouteOptions;

    fn route() -> Route {
        Route::new(
            vec![
                RouteLeg::user_waypoint("WP1", Pos::new(0.0, 0.0)),
                RouteLeg::user_waypoint("WP2", Pos::new(1.0, 0.0)),
                RouteLeg::user_waypoint("WP3", Pos::new(2.0, 0.0)),
            ],
            RouteOptions::default(),
        )
    }

    #[test]
    fn test_no_distances_without_active_leg() {
        let route = route();
        assert!(route.route_distances().is_none());
        assert!(route.distance_from_start().is_none());
    }

    #[test]
    fn test_distances_sum_to_total() {
        let mut route = route();
        route.update_active_leg(PosCourse::new(Pos::new(1.5, 0.01), 90.0), false);
        let distances = route.route_distances().unwrap();

        assert!((distances.from_start_nm + distances.to_destination_nm - route.total_distance_nm()).abs() < 0.01);
        assert!((distances.from_start_nm - 90.0).abs() < 0.5);
        assert!((distances.next_leg_nm - 30.0).abs() < 0.5);
        // North of an eastbound leg is left of course
        assert!(distances.cross_track_nm.unwrap() < 0.0);
        assert!((distances.projection_nm - 90.0).abs() < 0.5);
    }

    #[test]
    fn test_position_at_distance() {
        let route = route();
        let pos = route.position_at_distance(90.0).unwrap();
        assert!((pos.lon - 1.5).abs() < 0.01);
        assert!(pos.lat.abs() < 0.001);

        let end = route.position_at_distance(route.total_distance_nm()).unwrap();
        assert!((end.lon - 2.0).abs() < 1e-6);

        assert!(route.position_at_distance(-1.0).is_none());
        assert!(route.position_at_distance(route.total_distance_nm() + 1.0).is_none());
    }

    #[test]
    fn test_distance_from_start_at_position() {
        let route = route();
        let distance = route.distance_from_start_at(&Pos::new(1.25, -0.05)).unwrap();
        assert!((distance - 75.0).abs() < 0.5);
        assert!(route.distance_from_start_at(&Pos::new(-1.0, 0.0)).is_none());
    }

    #[test]
    fn test_nearest_leg() {
        let route = route();
        let (index, result) = route.nearest_route_leg_result(&Pos::new(0.5, 0.1), false).unwrap();
        assert_eq!(index, 1);
        assert!(result.is_along_track());
    }

    fn procedure_leg(
        leg_type: ProcedureLegType,
        procedure_type: ProcedureType,
        ident: &str,
        from: Pos,
        to: Pos,
    ) -> ProcedureLeg {
        ProcedureLeg::new(leg_type, procedure_type, ident, Line::new(from, to))
    }

    fn airport(ident: &str, lon: f64, lat: f64) -> RouteLeg {
        RouteLeg::from_navaid(
            NavaidRef {
                id: 1,
                ident: ident.to_string(),
                region: "XX".to_string(),
                kind: MapObjectType::Airport,
            },
            Pos::new(lon, lat),
        )
    }

    #[test]
    fn test_nearest_leg_skips_procedures() {
        let star = |ident: &str, from: Pos, to: Pos| {
            RouteLeg::from_procedure_leg(procedure_leg(
                ProcedureLegType::TrackToFix,
                ProcedureType::Star,
                ident,
                from,
                to,
            ))
        };
        let route = Route::new(
            vec![
                RouteLeg::user_waypoint("WP1", Pos::new(0.0, 0.0)),
                RouteLeg::user_waypoint("WP2", Pos::new(1.0, 0.0)),
                star("S1", Pos::new(1.0, 0.0), Pos::new(2.0, 0.0)),
                star("S2", Pos::new(2.0, 0.0), Pos::new(3.0, 0.0)),
                RouteLeg::user_waypoint("WP3", Pos::new(3.0, 0.0)),
            ],
            RouteOptions::default(),
        );
        let pos = Pos::new(2.5, 0.1);

        let (index, result) = route.nearest_route_leg_result(&pos, false).unwrap();
        assert_eq!(index, 3);
        assert!(result.is_along_track());

        // Legs inside the STAR are locked
        let (index, result) = route.nearest_route_leg_result(&pos, true).unwrap();
        assert_eq!(index, 2);
        assert_eq!(result.status, LineStatus::AfterEnd);
    }

    fn arc_route() -> Route {
        let arc = procedure_leg(
            ProcedureLegType::ArcToFix,
            ProcedureType::Star,
            "ARC",
            Pos::new(0.0, 0.0),
            Pos::new(1.0, 0.0),
        )
        .with_geometry(LineString::new(vec![
            Pos::new(0.0, 0.0),
            Pos::new(0.5, 0.5),
            Pos::new(1.0, 0.0),
        ]));
        Route::new(
            vec![
                RouteLeg::user_waypoint("WP1", Pos::new(0.0, 0.0)),
                RouteLeg::from_procedure_leg(arc),
                RouteLeg::user_waypoint("WP2", Pos::new(2.0, 0.0)),
            ],
            RouteOptions::default(),
        )
    }

    #[test]
    fn test_position_along_curved_leg() {
        let route = arc_route();
        let arc_nm = route.legs()[1].distance_to_here_nm;
        assert!((arc_nm - 84.9).abs() < 0.5);
        assert!((route.total_distance_nm() - arc_nm - 60.0).abs() < 0.5);

        let pos = route.position_at_distance(arc_nm / 2.0).unwrap();
        assert!((pos.lon - 0.5).abs() < 1e-3);
        assert!((pos.lat - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_cross_track_against_curved_geometry() {
        let mut route = arc_route();
        // Slightly north-west of the first arc segment, far north of the straight line
        let (index, _) = route.update_active_leg(PosCourse::new(Pos::new(0.25, 0.27), 45.0), false);
        assert_eq!(index, Some(1));

        let distances = route.route_distances().unwrap();
        let cross_track = distances.cross_track_nm.unwrap();
        assert!(cross_track < 0.0);
        assert!(cross_track.abs() < 1.0);
        assert!((distances.from_start_nm - 22.0).abs() < 0.5);
        assert!((distances.from_start_nm + distances.to_destination_nm - route.total_distance_nm()).abs() < 0.01);
    }

    #[test]
    fn test_distance_to_destination_on_missed_approach() {
        let route_legs = vec![
            RouteLeg::user_waypoint("WP1", Pos::new(0.0, 0.0)),
            RouteLeg::from_procedure_leg(procedure_leg(
                ProcedureLegType::TrackToFix,
                ProcedureType::Approach,
                "RW09",
                Pos::new(0.0, 0.0),
                Pos::new(1.0, 0.0),
            )),
            RouteLeg::from_procedure_leg(procedure_leg(
                ProcedureLegType::CourseToFix,
                ProcedureType::Missed,
                "MA",
                Pos::new(1.0, 0.0),
                Pos::new(1.5, 0.0),
            )),
            RouteLeg::from_procedure_leg(procedure_leg(
                ProcedureLegType::TrackToFix,
                ProcedureType::Missed,
                "MB",
                Pos::new(1.5, 0.0),
                Pos::new(2.0, 0.0),
            )),
            airport("ZZZZ", 1.0, 0.0),
        ];
        let mut route = Route::new(route_legs, RouteOptions::default());

        route.update_active_leg(PosCourse::new(Pos::new(0.5, 0.0), 90.0), false);
        route.update_active_leg(PosCourse::new(Pos::new(1.2, 0.0), 90.0), false);
        assert_eq!(route.active_leg_index(), Some(2));
        assert!(route.is_active_missed());

        // Rest of the first missed leg plus the second one
        let distances = route.route_distances().unwrap();
        assert!((distances.to_destination_nm - 48.0).abs() < 0.5);
        assert!((distances.next_leg_nm - 18.0).abs() < 0.5);
        assert_eq!(distances.projection_nm, route.total_distance_nm());
    }
}
