//! Flight path implementations.

use rand::Rng;
use route_core::{meter_to_nm, Pos, Route};

/// Trait for flight path implementations.
pub trait FlightPath: Send + Sync {
    /// Position at time t seconds from start.
    fn position(&self, t: f64) -> Pos;

    /// True course at time t (degrees, 0 = North).
    fn course(&self, t: f64) -> f64 {
        // Default: estimate course from position delta
        let dt = 1.0;
        let pos1 = self.position(t);
        let pos2 = self.position(t + dt);
        if pos1.same_fix(&pos2) {
            return 0.0;
        }
        pos1.angle_deg_to(&pos2)
    }

    /// Ground speed in meters per second.
    fn speed_mps(&self) -> f64;

    /// Time to fly the whole path in seconds.
    fn duration_s(&self) -> f64;
}

/// Straight legs between the fixes of a route.
pub struct RoutePath {
    points: Vec<Pos>,
    /// Distance from start at each point in meters
    cumulative_m: Vec<f64>,
    speed_mps: f64,
}

impl RoutePath {
    /// Follow the route fixes. Missed approach legs are only flown when the
    /// route shows them.
    pub fn from_route(route: &Route, speed_mps: f64) -> Self {
        let show_missed = route.options().show_missed_approach;
        let points: Vec<Pos> = route
            .legs()
            .iter()
            .take_while(|leg| show_missed || !leg.is_missed())
            .filter(|leg| leg.position.is_valid())
            .map(|leg| leg.position)
            .collect();
        Self::new(points, speed_mps)
    }

    pub fn new(points: Vec<Pos>, speed_mps: f64) -> Self {
        let mut total = 0.0;
        let cumulative_m = std::iter::once(0.0)
            .chain(points.windows(2).map(|w| {
                total += w[0].distance_meter_to(&w[1]);
                total
            }))
            .collect();

        Self {
            points,
            cumulative_m,
            speed_mps,
        }
    }

    pub fn length_nm(&self) -> f64 {
        meter_to_nm(self.cumulative_m.last().copied().unwrap_or(0.0))
    }
}

impl FlightPath for RoutePath {
    fn position(&self, t: f64) -> Pos {
        let Some(first) = self.points.first() else {
            return Pos::INVALID;
        };
        let distance = (t * self.speed_mps).max(0.0);

        // First point at or beyond the flown distance
        match self.cumulative_m.iter().position(|d| *d >= distance) {
            Some(0) => *first,
            Some(i) => {
                let segment = self.cumulative_m[i] - self.cumulative_m[i - 1];
                if segment <= 0.0 {
                    return self.points[i];
                }
                let fraction = (distance - self.cumulative_m[i - 1]) / segment;
                self.points[i - 1].interpolate(&self.points[i], fraction)
            }
            None => self.points.last().copied().unwrap_or(*first),
        }
    }

    fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    fn duration_s(&self) -> f64 {
        if self.speed_mps > 0.0 {
            self.cumulative_m.last().copied().unwrap_or(0.0) / self.speed_mps
        } else {
            0.0
        }
    }
}

/// Move `pos` sideways to `course` by a random distance of up to `jitter_m`.
pub fn apply_cross_track_jitter(pos: Pos, course: f64, jitter_m: f64) -> Pos {
    if jitter_m <= 0.0 || !pos.is_valid() {
        return pos;
    }
    let mut rng = rand::rng();
    let offset = rng.random_range(-jitter_m..=jitter_m);
    if offset >= 0.0 {
        pos.endpoint(offset, course + 90.0)
    } else {
        pos.endpoint(-offset, course - 90.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> RoutePath {
        RoutePath::new(
            vec![Pos::new(0.0, 0.0), Pos::new(1.0, 0.0), Pos::new(1.0, 1.0)],
            100.0,
        )
    }

    #[test]
    fn test_route_path_start_position() {
        let pos = path().position(0.0);
        assert!(pos.lon.abs() < 0.0001);
        assert!(pos.lat.abs() < 0.0001);
    }

    #[test]
    fn test_route_path_end_position() {
        let path = path();
        let pos = path.position(path.duration_s() + 100.0); // Past end
        assert!((pos.lon - 1.0).abs() < 0.0001);
        assert!((pos.lat - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_route_path_turns_at_fix() {
        let path = path();
        let first_leg_s = Pos::new(0.0, 0.0).distance_meter_to(&Pos::new(1.0, 0.0)) / 100.0;

        assert!((path.course(first_leg_s / 2.0) - 90.0).abs() < 0.1);
        assert!(path.course(first_leg_s + 10.0).abs() < 0.1);
        assert!((path.length_nm() - 120.0).abs() < 0.5);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let pos = Pos::new(10.0, 50.0);
        for _ in 0..20 {
            let jittered = apply_cross_track_jitter(pos, 45.0, 50.0);
            assert!(pos.distance_meter_to(&jittered) <= 50.0 + 1e-6);
        }
        assert_eq!(apply_cross_track_jitter(pos, 45.0, 0.0), pos);
    }
}
