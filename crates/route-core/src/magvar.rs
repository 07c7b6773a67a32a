//! Magnetic variation for legs without a database value.

use crate::geo::Pos;
use std::fmt;
use std::sync::Arc;

/// Magnetic declination model, e.g. a world magnetic model grid.
/// East variation is positive.
pub trait MagVarSource: Send + Sync {
    /// Variation in degrees at `pos` or `None` outside the model.
    fn magvar_deg(&self, pos: &Pos) -> Option<f64>;
}

impl<F> MagVarSource for F
where
    F: Fn(&Pos) -> Option<f64> + Send + Sync,
{
    fn magvar_deg(&self, pos: &Pos) -> Option<f64> {
        self(pos)
    }
}

/// Cloneable handle to a source, shared by all copies of a route.
#[derive(Clone)]
pub struct SharedMagVar(Arc<dyn MagVarSource>);

impl SharedMagVar {
    pub fn new(source: impl MagVarSource + 'static) -> Self {
        Self(Arc::new(source))
    }

    pub fn magvar_deg(&self, pos: &Pos) -> Option<f64> {
        self.0.magvar_deg(pos)
    }
}

impl fmt::Debug for SharedMagVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedMagVar")
    }
}
