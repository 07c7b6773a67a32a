//! Errors for route building and procedure splicing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Route is empty")]
    EmptyRoute,

    #[error("Flight plan has {entries} entries but route has {legs} legs")]
    EntryMismatch { entries: usize, legs: usize },

    #[error("Leg index {index} out of range for route with {size} legs")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("{0:?} procedure needs a departure and destination leg")]
    MissingAirport(crate::models::ProcedureKind),

    #[error("Procedure {ident} has no legs")]
    EmptyProcedure { ident: String },
}

pub type Result<T> = std::result::Result<T, RouteError>;
