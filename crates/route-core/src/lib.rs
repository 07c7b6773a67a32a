pub mod airway;
pub mod altitude;
pub mod error;
pub mod geo;
pub mod magvar;
pub mod models;
pub mod procedures;
pub mod projection;
pub mod route;
pub mod rules;
pub mod tracker;

pub use airway::AirwayLookup;
pub use altitude::RouteAltitude;
pub use error::{Result, RouteError};
pub use geo::{
    course_difference, meter_to_nm, nm_to_meter, Line, LineDistance, LineStatus, LineString, Pos,
    Rect,
};
pub use magvar::{MagVarSource, SharedMagVar};
pub use models::{
    FlightPlan, FlightPlanEntry, FlightRules, MapObjectType, NavaidRef, PosCourse, ProcedureKind,
    ProcedureLeg, ProcedureLegType, ProcedureLegs, ProcedureMask, ProcedureType, RouteLeg,
    RouteType, TurnDirection,
};
pub use projection::RouteDistances;
pub use route::{LegRange, Route};
pub use rules::{AltitudeRule, RouteOptions};
pub use tracker::is_smaller;
