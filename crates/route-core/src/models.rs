//! Core data models for route legs, procedures and the flight plan.

use crate::geo::{Line, LineString, Pos};
use serde::{Deserialize, Serialize};

/// What a route leg resolved to in the navigation database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapObjectType {
    Airport,
    Vor,
    Ndb,
    Waypoint,
    UserWaypoint,
    /// Not found in the database but kept to preserve the flight plan
    #[default]
    Invalid,
}

/// ARINC 424 path terminators plus the start-of-procedure marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureLegType {
    ArcToFix,
    CourseToAltitude,
    CourseToDmeDistance,
    CourseToFix,
    CourseToIntercept,
    CourseToRadialTermination,
    DirectToFix,
    FixToAltitude,
    TrackFromFixFromDistance,
    TrackFromFixToDmeDistance,
    FromFixToManualTermination,
    HoldToAltitude,
    HoldToFix,
    HoldToManualTermination,
    InitialFix,
    ProcedureTurn,
    ConstantRadiusArc,
    TrackToFix,
    HeadingToAltitude,
    HeadingToDmeDistance,
    HeadingToIntercept,
    HeadingToManualTermination,
    HeadingToRadialTermination,
    StartOfProcedure,
    #[default]
    Invalid,
}

impl ProcedureLegType {
    pub fn is_hold(self) -> bool {
        matches!(
            self,
            Self::HoldToAltitude | Self::HoldToFix | Self::HoldToManualTermination
        )
    }

    /// Point-like legs which provide no course of their own.
    pub fn is_initial_fix(self) -> bool {
        matches!(self, Self::InitialFix | Self::StartOfProcedure)
    }

    /// Legs that start at their navaid. A STAR or approach beginning with one
    /// of these duplicates a route waypoint at the same navaid.
    pub fn is_entry_type(self) -> bool {
        matches!(
            self,
            Self::InitialFix
                | Self::StartOfProcedure
                | Self::TrackFromFixFromDistance
                | Self::TrackFromFixToDmeDistance
                | Self::FromFixToManualTermination
        )
    }

    /// Legs that end at their navaid. A SID ending with one of these
    /// duplicates a following route waypoint at the same navaid.
    pub fn is_exit_type(self) -> bool {
        matches!(
            self,
            Self::TrackToFix | Self::CourseToFix | Self::ArcToFix | Self::DirectToFix
        )
    }
}

/// Which published procedure a leg belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureType {
    Sid,
    SidTransition,
    Star,
    StarTransition,
    Transition,
    Approach,
    Missed,
}

impl ProcedureType {
    pub fn is_departure(self) -> bool {
        matches!(self, Self::Sid | Self::SidTransition)
    }

    pub fn is_star(self) -> bool {
        matches!(self, Self::Star | Self::StarTransition)
    }

    pub fn is_arrival(self) -> bool {
        matches!(self, Self::Transition | Self::Approach | Self::Missed)
    }

    pub fn is_missed(self) -> bool {
        self == Self::Missed
    }

    /// Bit used by [`ProcedureMask`].
    pub fn mask(self) -> ProcedureMask {
        ProcedureMask(match self {
            Self::Sid => 1,
            Self::SidTransition => 1 << 1,
            Self::Star => 1 << 2,
            Self::StarTransition => 1 << 3,
            Self::Transition => 1 << 4,
            Self::Approach => 1 << 5,
            Self::Missed => 1 << 6,
        })
    }
}

/// Set of procedure types, used to select what to remove from a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcedureMask(u8);

impl ProcedureMask {
    pub const NONE: Self = Self(0);
    pub const SID: Self = Self(1);
    pub const SID_TRANSITION: Self = Self(1 << 1);
    pub const STAR: Self = Self(1 << 2);
    pub const STAR_TRANSITION: Self = Self(1 << 3);
    pub const TRANSITION: Self = Self(1 << 4);
    pub const APPROACH: Self = Self(1 << 5);
    pub const MISSED: Self = Self(1 << 6);

    pub const DEPARTURE: Self = Self(Self::SID.0 | Self::SID_TRANSITION.0);
    pub const STAR_ALL: Self = Self(Self::STAR.0 | Self::STAR_TRANSITION.0);
    pub const SID_STAR_ALL: Self = Self(Self::DEPARTURE.0 | Self::STAR_ALL.0);
    /// Approach, its transition and the missed approach
    pub const ARRIVAL: Self = Self(Self::TRANSITION.0 | Self::APPROACH.0 | Self::MISSED.0);
    pub const ALL: Self = Self(Self::SID_STAR_ALL.0 | Self::ARRIVAL.0);

    pub fn contains(self, procedure_type: ProcedureType) -> bool {
        self.intersects(procedure_type.mask())
    }

    pub fn intersects(self, other: ProcedureMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for ProcedureMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[default]
    #[serde(rename = "")]
    None,
}

/// Database identity of a navaid, airport or waypoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavaidRef {
    pub id: i64,
    pub ident: String,
    #[serde(default)]
    pub region: String,
    pub kind: MapObjectType,
}

impl NavaidRef {
    pub fn is_valid(&self) -> bool {
        self.kind != MapObjectType::Invalid && !self.ident.is_empty()
    }
}

/// Geometry and classification of a leg belonging to a published procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureLeg {
    pub leg_type: ProcedureLegType,
    pub procedure_type: ProcedureType,
    #[serde(default)]
    pub fix_ident: String,
    #[serde(default)]
    pub navaid: Option<NavaidRef>,
    /// Main line of the leg, `pos2` is the terminating fix
    pub line: Line,
    /// Arc or intercept geometry; two points for straight legs
    #[serde(default)]
    pub geometry: LineString,
    /// Helper line used to detect leaving a hold
    #[serde(default)]
    pub hold_line: Option<Line>,
    #[serde(default)]
    pub turn_direction: TurnDirection,
    #[serde(default)]
    pub calculated_distance_nm: f64,
    #[serde(default)]
    pub display_text: Vec<String>,
    #[serde(default)]
    pub runway: Option<String>,
}

impl ProcedureLeg {
    pub fn new(
        leg_type: ProcedureLegType,
        procedure_type: ProcedureType,
        fix_ident: impl Into<String>,
        line: Line,
    ) -> Self {
        let calculated_distance_nm = if line.is_valid() {
            crate::geo::meter_to_nm(line.length_meter())
        } else {
            0.0
        };

        Self {
            leg_type,
            procedure_type,
            fix_ident: fix_ident.into(),
            navaid: None,
            geometry: LineString::new(vec![line.pos1, line.pos2]),
            line,
            hold_line: None,
            turn_direction: TurnDirection::None,
            calculated_distance_nm,
            display_text: Vec::new(),
            runway: None,
        }
    }

    pub fn with_navaid(mut self, navaid: NavaidRef) -> Self {
        self.navaid = Some(navaid);
        self
    }

    /// Replace the straight geometry with an arc or intercept path and take
    /// the leg distance from it.
    pub fn with_geometry(mut self, geometry: LineString) -> Self {
        self.calculated_distance_nm = crate::geo::meter_to_nm(geometry.length_meter());
        self.geometry = geometry;
        self
    }

    pub fn with_hold(mut self, hold_line: Line, turn_direction: TurnDirection) -> Self {
        self.hold_line = Some(hold_line);
        self.turn_direction = turn_direction;
        self
    }

    pub fn is_hold(&self) -> bool {
        self.leg_type.is_hold()
    }

    pub fn is_missed(&self) -> bool {
        self.procedure_type.is_missed()
    }

    pub fn is_any_departure(&self) -> bool {
        self.procedure_type.is_departure()
    }

    pub fn is_any_star(&self) -> bool {
        self.procedure_type.is_star()
    }

    pub fn is_arrival(&self) -> bool {
        self.procedure_type.is_arrival()
    }

    /// Fix position the leg terminates at.
    pub fn fix_pos(&self) -> Pos {
        self.line.pos2
    }
}

/// Kind of a procedure container attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureKind {
    Departure,
    Star,
    Arrival,
}

/// A procedure and its optional transition as attached to a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureLegs {
    pub kind: ProcedureKind,
    #[serde(default)]
    pub ident: String,
    #[serde(default)]
    pub transition_ident: String,
    #[serde(default)]
    pub runway: Option<String>,
    #[serde(default)]
    pub procedure_legs: Vec<ProcedureLeg>,
    #[serde(default)]
    pub transition_legs: Vec<ProcedureLeg>,
}

impl ProcedureLegs {
    pub fn new(kind: ProcedureKind, ident: impl Into<String>) -> Self {
        Self {
            kind,
            ident: ident.into(),
            transition_ident: String::new(),
            runway: None,
            procedure_legs: Vec::new(),
            transition_legs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.procedure_legs.is_empty() && self.transition_legs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.procedure_legs.len() + self.transition_legs.len()
    }

    /// Legs in flying order: departures fly the procedure before the
    /// transition, arrivals the transition before the procedure.
    pub fn legs(&self) -> impl Iterator<Item = &ProcedureLeg> {
        let (first, second) = match self.kind {
            ProcedureKind::Departure => (&self.procedure_legs, &self.transition_legs),
            ProcedureKind::Star | ProcedureKind::Arrival => {
                (&self.transition_legs, &self.procedure_legs)
            }
        };
        first.iter().chain(second.iter())
    }

    pub fn clear_procedure(&mut self) {
        self.procedure_legs.clear();
        self.ident.clear();
        self.runway = None;
        // A transition is meaningless without its procedure
        self.clear_transition();
    }

    pub fn clear_transition(&mut self) {
        self.transition_legs.clear();
        self.transition_ident.clear();
    }

    /// Remove the parts selected by `mask`.
    pub fn clear_by_mask(&mut self, mask: ProcedureMask) {
        let (procedure, transition) = match self.kind {
            ProcedureKind::Departure => (ProcedureMask::SID, ProcedureMask::SID_TRANSITION),
            ProcedureKind::Star => (ProcedureMask::STAR, ProcedureMask::STAR_TRANSITION),
            ProcedureKind::Arrival => (ProcedureMask::APPROACH, ProcedureMask::TRANSITION),
        };

        if mask.intersects(procedure) {
            self.clear_procedure();
        } else if mask.intersects(transition) {
            self.clear_transition();
        }

        if self.kind == ProcedureKind::Arrival && mask.intersects(ProcedureMask::MISSED) {
            self.procedure_legs.retain(|leg| !leg.is_missed());
        }
    }
}

/// One element of the leg sequence: the leg from the previous point to this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub ident: String,
    #[serde(default)]
    pub position: Pos,
    #[serde(default)]
    pub map_object_type: MapObjectType,
    #[serde(default)]
    pub navaid: Option<NavaidRef>,
    #[serde(default)]
    pub procedure_leg: Option<ProcedureLeg>,
    #[serde(default)]
    pub airway_name: Option<String>,
    /// Airway minimum altitude in feet as resolved by the airway lookup
    #[serde(default)]
    pub airway_min_altitude_ft: Option<i32>,
    /// Magnetic variation from the database, east positive
    #[serde(default)]
    pub magvar: Option<f64>,
    /// Variation applied to courses, filled from neighbours when unknown
    #[serde(default)]
    pub calculated_magvar: f64,
    /// Computed leg length in nautical miles
    #[serde(default)]
    pub distance_to_here_nm: f64,
    /// Computed true course from the previous leg
    #[serde(default)]
    pub course_to_here_true: Option<f64>,
    /// Index of the companion flight plan entry
    #[serde(default)]
    pub entry_index: usize,
}

impl RouteLeg {
    /// A plain route leg at a resolved navaid.
    pub fn from_navaid(navaid: NavaidRef, position: Pos) -> Self {
        Self {
            ident: navaid.ident.clone(),
            position,
            map_object_type: navaid.kind,
            navaid: Some(navaid),
            procedure_leg: None,
            airway_name: None,
            airway_min_altitude_ft: None,
            magvar: None,
            calculated_magvar: 0.0,
            distance_to_here_nm: 0.0,
            course_to_here_true: None,
            entry_index: 0,
        }
    }

    /// A user defined waypoint without database identity.
    pub fn user_waypoint(ident: impl Into<String>, position: Pos) -> Self {
        Self {
            ident: ident.into(),
            position,
            map_object_type: MapObjectType::UserWaypoint,
            navaid: None,
            procedure_leg: None,
            airway_name: None,
            airway_min_altitude_ft: None,
            magvar: None,
            calculated_magvar: 0.0,
            distance_to_here_nm: 0.0,
            course_to_here_true: None,
            entry_index: 0,
        }
    }

    /// A leg whose navaid could not be resolved.
    pub fn unresolved(ident: impl Into<String>, position: Pos) -> Self {
        Self {
            map_object_type: MapObjectType::Invalid,
            ..Self::user_waypoint(ident, position)
        }
    }

    /// Route leg created from a procedure leg. Position is the terminating fix.
    pub fn from_procedure_leg(leg: ProcedureLeg) -> Self {
        let navaid = leg.navaid.clone().filter(NavaidRef::is_valid);
        let map_object_type = navaid
            .as_ref()
            .map(|n| n.kind)
            .unwrap_or(MapObjectType::Waypoint);
        Self {
            ident: leg.fix_ident.clone(),
            position: leg.fix_pos(),
            map_object_type,
            navaid,
            procedure_leg: Some(leg),
            airway_name: None,
            airway_min_altitude_ft: None,
            magvar: None,
            calculated_magvar: 0.0,
            distance_to_here_nm: 0.0,
            course_to_here_true: None,
            entry_index: 0,
        }
    }

    pub fn with_airway(mut self, airway_name: impl Into<String>) -> Self {
        self.airway_name = Some(airway_name.into());
        self
    }

    pub fn with_magvar(mut self, magvar: f64) -> Self {
        self.magvar = Some(magvar);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.map_object_type != MapObjectType::Invalid && self.position.is_valid()
    }

    /// Plain route leg, not part of any procedure.
    pub fn is_route(&self) -> bool {
        self.procedure_leg.is_none()
    }

    pub fn is_any_procedure(&self) -> bool {
        self.procedure_leg.is_some()
    }

    pub fn procedure_leg_type(&self) -> Option<ProcedureLegType> {
        self.procedure_leg.as_ref().map(|p| p.leg_type)
    }

    pub fn procedure_type(&self) -> Option<ProcedureType> {
        self.procedure_leg.as_ref().map(|p| p.procedure_type)
    }

    pub fn is_hold(&self) -> bool {
        self.procedure_leg.as_ref().is_some_and(ProcedureLeg::is_hold)
    }

    pub fn is_missed(&self) -> bool {
        self.procedure_leg.as_ref().is_some_and(ProcedureLeg::is_missed)
    }

    pub fn is_procedure_leg_type(&self, leg_type: ProcedureLegType) -> bool {
        self.procedure_leg_type() == Some(leg_type)
    }

    /// Multi-point geometry for procedure legs, empty for plain legs.
    pub fn geometry(&self) -> Option<&LineString> {
        self.procedure_leg.as_ref().map(|p| &p.geometry)
    }

    /// Procedure geometry with more than two points, i.e. an arc or intercept.
    pub fn curved_geometry(&self) -> Option<&LineString> {
        self.geometry().filter(|g| g.len() > 2)
    }

    /// Both legs resolve to the same database navaid.
    pub fn is_navaid_equal_to(&self, other: &RouteLeg) -> bool {
        match (&self.navaid, &other.navaid) {
            (Some(a), Some(b)) => a.is_valid() && a == b,
            _ => false,
        }
    }

    /// Magnetic course from the previous leg.
    pub fn course_to_here_mag(&self) -> Option<f64> {
        self.course_to_here_true
            .map(|c| crate::geo::normalize_course(c - self.calculated_magvar))
    }

    /// Recompute length and course from the previous leg.
    pub(crate) fn update_distance_and_course(&mut self, prev: Option<&RouteLeg>) {
        let Some(prev) = prev else {
            self.distance_to_here_nm = 0.0;
            self.course_to_here_true = None;
            return;
        };

        let curved = self.curved_geometry().map(|geometry| {
            match (geometry.first(), geometry.last()) {
                (Some(first), Some(last)) if first.is_valid() && last.is_valid() => {
                    Some(first.angle_deg_to(last))
                }
                _ => None,
            }
        });

        if let Some(course) = curved {
            self.distance_to_here_nm = self
                .procedure_leg
                .as_ref()
                .map(|p| p.calculated_distance_nm)
                .unwrap_or(0.0);
            self.course_to_here_true = course;
        } else if prev.position.is_valid() && self.position.is_valid() {
            self.distance_to_here_nm = prev.position.distance_nm_to(&self.position);
            self.course_to_here_true = if prev.position.same_fix(&self.position) {
                None
            } else {
                Some(prev.position.angle_deg_to(&self.position))
            };
        } else {
            self.distance_to_here_nm = 0.0;
            self.course_to_here_true = None;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightRules {
    #[default]
    Ifr,
    Vfr,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    #[default]
    Direct,
    LowAltitude,
    HighAltitude,
}

/// Flight plan entry kept in step with the leg at the same index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanEntry {
    pub waypoint_id: String,
    #[serde(default)]
    pub icao_ident: String,
    #[serde(default)]
    pub icao_region: String,
    pub waypoint_type: MapObjectType,
    pub position: Pos,
    #[serde(default)]
    pub airway: Option<String>,
    /// Procedure entries are rebuilt from the procedures and never saved
    #[serde(default)]
    pub no_save: bool,
}

impl FlightPlanEntry {
    pub fn from_leg(leg: &RouteLeg) -> Self {
        let (icao_ident, icao_region) = leg
            .navaid
            .as_ref()
            .map(|n| (n.ident.clone(), n.region.clone()))
            .unwrap_or_default();
        Self {
            waypoint_id: leg.ident.clone(),
            icao_ident,
            icao_region,
            waypoint_type: leg.map_object_type,
            position: leg.position,
            airway: leg.airway_name.clone(),
            no_save: leg.is_any_procedure(),
        }
    }
}

/// Flight plan companion of the leg sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    #[serde(default)]
    pub entries: Vec<FlightPlanEntry>,
    #[serde(default)]
    pub cruise_altitude_ft: f64,
    #[serde(default)]
    pub flight_rules: FlightRules,
    #[serde(default)]
    pub route_type: RouteType,
    #[serde(default)]
    pub departure_name: String,
    #[serde(default)]
    pub destination_name: String,
}

impl FlightPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Aircraft position and true course sample fed to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PosCourse {
    pub pos: Pos,
    pub course: f64,
}

impl PosCourse {
    pub fn new(pos: Pos, course: f64) -> Self {
        Self { pos, course }
    }

    pub fn is_valid(&self) -> bool {
        self.pos.is_valid() && self.course.is_finite()
    }
}
