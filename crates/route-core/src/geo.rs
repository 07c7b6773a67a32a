//! Spherical geometry for route tracking.
//!
//! Positions are degrees, distances are meters unless a function name says
//! otherwise. Cross-track distances are signed: positive right of course.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const METERS_PER_NM: f64 = 1852.0;

/// Segments shorter than this are treated as a single point.
const DEGENERATE_SEGMENT_M: f64 = 0.01;

pub fn nm_to_meter(nm: f64) -> f64 {
    nm * METERS_PER_NM
}

pub fn meter_to_nm(meter: f64) -> f64 {
    meter / METERS_PER_NM
}

/// Normalize a course into `[0, 360)`.
pub fn normalize_course(course_deg: f64) -> f64 {
    course_deg.rem_euclid(360.0)
}

/// Absolute difference between two courses, folded into `[0, 180]`.
pub fn course_difference(course1_deg: f64, course2_deg: f64) -> f64 {
    let diff = (course1_deg - course2_deg + 360.0).rem_euclid(360.0);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub lon: f64,
    pub lat: f64,
}

impl Default for Pos {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Pos {
    /// Placeholder for unresolved legs and out-of-range queries.
    pub const INVALID: Pos = Pos {
        lon: f64::NAN,
        lat: f64::NAN,
    };

    /// Roughly one meter at the equator.
    pub const POS_EPSILON: f64 = 0.00001;

    /// Roughly 100 meters at the equator.
    pub const POS_EPSILON_100M: f64 = 0.001;

    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }

    pub fn almost_equal(&self, other: &Pos, epsilon: f64) -> bool {
        self.is_valid()
            && other.is_valid()
            && (self.lat - other.lat).abs() < epsilon
            && (self.lon - other.lon).abs() < epsilon
    }

    /// Coincidence test used when deciding whether two legs share a fix.
    pub fn same_fix(&self, other: &Pos) -> bool {
        self.almost_equal(other, Self::POS_EPSILON)
    }

    /// Great-circle distance in meters (Haversine formula).
    pub fn distance_meter_to(&self, other: &Pos) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dphi = (other.lat - self.lat).to_radians();
        let dlambda = (other.lon - self.lon).to_radians();
        let a =
            (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }

    pub fn distance_nm_to(&self, other: &Pos) -> f64 {
        meter_to_nm(self.distance_meter_to(other))
    }

    /// Initial great-circle bearing in degrees, `[0, 360)`.
    pub fn angle_deg_to(&self, other: &Pos) -> f64 {
        normalize_course(self.bearing_rad_to(other).to_degrees())
    }

    fn bearing_rad_to(&self, other: &Pos) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let delta_lambda = (other.lon - self.lon).to_radians();

        let x = delta_lambda.sin() * phi2.cos();
        let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

        x.atan2(y)
    }

    /// Constant-heading (loxodrome) bearing in degrees, `[0, 360)`.
    pub fn angle_deg_to_rhumb(&self, other: &Pos) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let mut delta_lambda = (other.lon - self.lon).to_radians();

        // Take the shorter way around the antimeridian
        if delta_lambda.abs() > PI {
            delta_lambda = if delta_lambda > 0.0 {
                -(2.0 * PI - delta_lambda)
            } else {
                2.0 * PI + delta_lambda
            };
        }

        let delta_psi = ((phi2 / 2.0 + PI / 4.0).tan() / (phi1 / 2.0 + PI / 4.0).tan()).ln();
        normalize_course(delta_lambda.atan2(delta_psi).to_degrees())
    }

    /// Point on the great circle between `self` and `other` at `fraction` (0 = self).
    pub fn interpolate(&self, other: &Pos, fraction: f64) -> Pos {
        let distance = self.distance_meter_to(other);
        if distance <= DEGENERATE_SEGMENT_M {
            return *self;
        }

        let delta = distance / EARTH_RADIUS_M;
        let a = ((1.0 - fraction) * delta).sin() / delta.sin();
        let b = (fraction * delta).sin() / delta.sin();

        let (phi1, lambda1) = (self.lat.to_radians(), self.lon.to_radians());
        let (phi2, lambda2) = (other.lat.to_radians(), other.lon.to_radians());

        let x = a * phi1.cos() * lambda1.cos() + b * phi2.cos() * lambda2.cos();
        let y = a * phi1.cos() * lambda1.sin() + b * phi2.cos() * lambda2.sin();
        let z = a * phi1.sin() + b * phi2.sin();

        Pos::new(
            y.atan2(x).to_degrees(),
            z.atan2((x * x + y * y).sqrt()).to_degrees(),
        )
    }

    /// Offset this position by distance and bearing.
    pub fn endpoint(&self, distance_m: f64, bearing_deg: f64) -> Pos {
        if distance_m.abs() <= f64::EPSILON {
            return *self;
        }

        let bearing_rad = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();
        let angular_distance = distance_m / EARTH_RADIUS_M;

        let sin_lat1 = lat1.sin();
        let cos_lat1 = lat1.cos();
        let sin_ad = angular_distance.sin();
        let cos_ad = angular_distance.cos();

        let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
        let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

        let y = bearing_rad.sin() * sin_ad * cos_lat1;
        let x = cos_ad - sin_lat1 * sin_lat2;
        let lon2 = (lon1 + y.atan2(x) + PI).rem_euclid(2.0 * PI) - PI;

        Pos::new(lon2.to_degrees(), lat2.to_degrees())
    }

    /// Classify this position against the segment `pos1 -> pos2`.
    pub fn distance_meter_to_line(&self, pos1: &Pos, pos2: &Pos) -> LineDistance {
        if !self.is_valid() || !pos1.is_valid() || !pos2.is_valid() {
            return LineDistance::default();
        }

        let projection = project_on_segment(self, pos1, pos2);
        let distance_from1 = pos1.distance_meter_to(self);
        let distance_from2 = pos2.distance_meter_to(self);

        let (status, distance) = if projection.length <= DEGENERATE_SEGMENT_M {
            // Segment is essentially a point
            (LineStatus::AlongTrack, distance_from1)
        } else if projection.along < 0.0 {
            (
                LineStatus::BeforeStart,
                distance_from1.copysign(projection.cross),
            )
        } else if projection.along > projection.length {
            (
                LineStatus::AfterEnd,
                distance_from2.copysign(projection.cross),
            )
        } else {
            (LineStatus::AlongTrack, projection.cross)
        };

        LineDistance {
            status,
            distance,
            distance_from1,
            distance_from2,
        }
    }
}

struct SegmentProjection {
    /// Signed cross-track distance, positive right of course
    cross: f64,
    /// Signed along-track distance from the segment start
    along: f64,
    length: f64,
}

fn project_on_segment(pos: &Pos, pos1: &Pos, pos2: &Pos) -> SegmentProjection {
    let length = pos1.distance_meter_to(pos2);
    let d13 = pos1.distance_meter_to(pos) / EARTH_RADIUS_M;
    if length <= DEGENERATE_SEGMENT_M || d13 <= f64::EPSILON {
        return SegmentProjection {
            cross: 0.0,
            along: 0.0,
            length,
        };
    }

    let theta13 = pos1.bearing_rad_to(pos);
    let theta12 = pos1.bearing_rad_to(pos2);
    let delta = theta13 - theta12;

    let cross = (d13.sin() * delta.sin()).clamp(-1.0, 1.0).asin();
    let along = (d13.cos() / cross.cos()).clamp(-1.0, 1.0).acos();
    let along = if delta.cos() < 0.0 { -along } else { along };

    SegmentProjection {
        cross: cross * EARTH_RADIUS_M,
        along: along * EARTH_RADIUS_M,
        length,
    }
}

/// Where a projected position falls relative to a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    BeforeStart,
    AlongTrack,
    AfterEnd,
    #[default]
    Invalid,
}

/// Result of measuring a position against a segment or line string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineDistance {
    pub status: LineStatus,
    /// Signed cross-track distance in meters when along track, otherwise the
    /// distance to the nearest endpoint carrying the cross-track sign
    pub distance: f64,
    pub distance_from1: f64,
    pub distance_from2: f64,
}

impl Default for LineDistance {
    fn default() -> Self {
        Self {
            status: LineStatus::Invalid,
            distance: f64::MAX,
            distance_from1: f64::MAX,
            distance_from2: f64::MAX,
        }
    }
}

impl LineDistance {
    pub fn is_valid(&self) -> bool {
        self.status != LineStatus::Invalid
    }

    pub fn is_along_track(&self) -> bool {
        self.status == LineStatus::AlongTrack
    }
}

/// A straight segment between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    pub pos1: Pos,
    pub pos2: Pos,
}

impl Line {
    pub fn new(pos1: Pos, pos2: Pos) -> Self {
        Self { pos1, pos2 }
    }

    pub fn is_valid(&self) -> bool {
        self.pos1.is_valid() && self.pos2.is_valid()
    }

    pub fn length_meter(&self) -> f64 {
        self.pos1.distance_meter_to(&self.pos2)
    }

    pub fn angle_deg(&self) -> f64 {
        self.pos1.angle_deg_to(&self.pos2)
    }

    pub fn distance_meter_to_line(&self, pos: &Pos) -> LineDistance {
        pos.distance_meter_to_line(&self.pos1, &self.pos2)
    }
}

/// Multi-point geometry for arcs, intercepts and other curved legs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineString(pub Vec<Pos>);

impl LineString {
    pub fn new(points: Vec<Pos>) -> Self {
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[Pos] {
        &self.0
    }

    pub fn first(&self) -> Option<&Pos> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Pos> {
        self.0.last()
    }

    pub fn length_meter(&self) -> f64 {
        self.0
            .windows(2)
            .map(|w| w[0].distance_meter_to(&w[1]))
            .sum()
    }

    /// Position at `fraction` of the along-path length. Fractions outside
    /// `[0, 1]` are clamped to the ends.
    pub fn interpolate(&self, fraction: f64) -> Pos {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Pos::INVALID;
        };
        if fraction <= 0.0 || self.len() == 1 {
            return *first;
        }
        if fraction >= 1.0 {
            return *last;
        }

        let target = self.length_meter() * fraction;
        let mut travelled = 0.0;
        for w in self.0.windows(2) {
            let segment = w[0].distance_meter_to(&w[1]);
            if travelled + segment >= target {
                if segment <= DEGENERATE_SEGMENT_M {
                    return w[0];
                }
                return w[0].interpolate(&w[1], (target - travelled) / segment);
            }
            travelled += segment;
        }
        *last
    }

    /// Measure `pos` against the nearest segment. `distance_from1` and
    /// `distance_from2` are along-path distances to the start and end of the
    /// whole line string.
    pub fn distance_meter_to_line_string(&self, pos: &Pos) -> LineDistance {
        match self.0.as_slice() {
            [] => LineDistance::default(),
            [single] => pos.distance_meter_to_line(single, single),
            points => {
                let total = self.length_meter();
                let last_segment = points.len() - 2;
                let mut best: Option<(LineDistance, f64)> = None;
                let mut travelled = 0.0;

                for (i, w) in points.windows(2).enumerate() {
                    let mut result = pos.distance_meter_to_line(&w[0], &w[1]);
                    if !result.is_valid() {
                        continue;
                    }
                    let projection = project_on_segment(pos, &w[0], &w[1]);
                    let along = travelled + projection.along.clamp(0.0, projection.length);

                    // Only the ends of the whole path can be before start or after end
                    if (result.status == LineStatus::BeforeStart && i > 0)
                        || (result.status == LineStatus::AfterEnd && i < last_segment)
                    {
                        result.status = LineStatus::AlongTrack;
                    }

                    let replace = best
                        .as_ref()
                        .map(|(b, _)| result.distance.abs() < b.distance.abs())
                        .unwrap_or(true);
                    if replace {
                        best = Some((result, along));
                    }
                    travelled += projection.length;
                }

                match best {
                    Some((result, along)) => LineDistance {
                        distance_from1: along,
                        distance_from2: (total - along).max(0.0),
                        ..result
                    },
                    None => LineDistance::default(),
                }
            }
        }
    }
}

/// Geographic bounding rectangle. `west > east` when crossing the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

impl Rect {
    /// Smallest rectangle covering all valid positions. The longitude span
    /// leaves out the largest gap between points, which wraps the box over
    /// the antimeridian when that is shorter.
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a Pos>) -> Option<Rect> {
        let valid: Vec<&Pos> = positions.into_iter().filter(|p| p.is_valid()).collect();
        if valid.is_empty() {
            return None;
        }

        let north = valid.iter().map(|p| p.lat).fold(f64::MIN, f64::max);
        let south = valid.iter().map(|p| p.lat).fold(f64::MAX, f64::min);

        let mut lons: Vec<f64> = valid.iter().map(|p| p.lon).collect();
        lons.sort_by(|a, b| a.total_cmp(b));

        let min_lon = lons[0];
        let max_lon = lons[lons.len() - 1];
        let wrap_gap = 360.0 - (max_lon - min_lon);

        let (gap_index, inner_gap) = lons
            .windows(2)
            .enumerate()
            .map(|(i, w)| (i, w[1] - w[0]))
            .fold((0, 0.0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

        let (west, east) = if inner_gap > wrap_gap {
            (lons[gap_index + 1], lons[gap_index])
        } else {
            (min_lon, max_lon)
        };

        Some(Rect {
            west,
            north,
            east,
            south,
        })
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    pub fn contains(&self, pos: &Pos) -> bool {
        if pos.lat > self.north || pos.lat < self.south {
            return false;
        }
        if self.crosses_antimeridian() {
            pos.lon >= self.west || pos.lon <= self.east
        } else {
            pos.lon >= self.west && pos.lon <= self.east
        }
    }
}
