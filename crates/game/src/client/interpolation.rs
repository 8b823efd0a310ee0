use std::time::{Duration, Instant};

use glam::IVec2;

use crate::net::TankState;
use crate::simulation::Tank;

pub const DEFAULT_INTERPOLATION_PERIOD: Duration = Duration::from_millis(50);
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(500);

/// Fraction of the remaining distance to cover after `elapsed` of a `period`.
pub fn interpolation_ratio(elapsed: Duration, period: Duration) -> f32 {
    if elapsed.is_zero() {
        return 0.0;
    }
    if period.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / period.as_secs_f32()).min(1.0)
}

/// Moves the remote tank toward the last snapshot received from the host.
#[derive(Debug, Clone)]
pub struct Interpolator {
    target: Option<TankState>,
    received_at: Option<Instant>,
    period: Duration,
    stale_after: Duration,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPOLATION_PERIOD, DEFAULT_STALE_AFTER)
    }
}

impl Interpolator {
    pub fn new(period: Duration, stale_after: Duration) -> Self {
        Self {
            target: None,
            received_at: None,
            period,
            stale_after,
        }
    }

    pub fn set_target(&mut self, target: TankState, now: Instant) {
        self.target = Some(target);
        self.received_at = Some(now);
    }

    pub fn target(&self) -> Option<&TankState> {
        self.target.as_ref()
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.received_at = None;
    }

    /// True when no snapshot has arrived yet or the last one is too old to chase.
    pub fn is_stale(&self, now: Instant) -> bool {
        match self.received_at {
            Some(at) => now.saturating_duration_since(at) >= self.stale_after,
            None => true,
        }
    }

    /// Applies one render step to `tank`. Facing snaps to the target;
    /// position moves by the truncated ratio of the remaining distance.
    /// Returns whether the tank changed.
    pub fn update(&self, tank: &mut Tank, now: Instant) -> bool {
        let (Some(target), Some(at)) = (self.target.as_ref(), self.received_at) else {
            return false;
        };
        if self.is_stale(now) {
            return false;
        }

        let mut changed = tank.direction != target.direction;
        tank.direction = target.direction;

        let ratio = interpolation_ratio(now.saturating_duration_since(at), self.period);
        let remaining = IVec2::from_array(target.position) - tank.position;
        let step = IVec2::new(
            (remaining.x as f32 * ratio) as i32,
            (remaining.y as f32 * ratio) as i32,
        );

        if step != IVec2::ZERO {
            tank.position += step;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Direction, Side};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_ratio_is_clamped() {
        assert_eq!(interpolation_ratio(Duration::ZERO, ms(50)), 0.0);
        assert_eq!(interpolation_ratio(ms(25), ms(50)), 0.5);
        assert_eq!(interpolation_ratio(ms(50), ms(50)), 1.0);
        assert_eq!(interpolation_ratio(ms(400), ms(50)), 1.0);
    }

    #[test]
    fn test_moves_toward_target() {
        let start = Instant::now();
        let mut interpolator = Interpolator::default();
        interpolator.set_target(
            TankState {
                position: [200, 100],
                direction: Direction::Right,
            },
            start,
        );

        let mut tank = Tank::new(Side::Host, IVec2::new(100, 100));
        assert!(interpolator.update(&mut tank, start + ms(25)));
        assert_eq!(tank.position, IVec2::new(150, 100));
        assert_eq!(tank.direction, Direction::Right);

        assert!(interpolator.update(&mut tank, start + ms(100)));
        assert_eq!(tank.position, IVec2::new(200, 100));
        assert!(!interpolator.update(&mut tank, start + ms(120)));
    }

    #[test]
    fn test_zero_elapsed_only_snaps_facing() {
        let start = Instant::now();
        let mut interpolator = Interpolator::default();
        interpolator.set_target(
            TankState {
                position: [300, 300],
                direction: Direction::Down,
            },
            start,
        );

        let mut tank = Tank::new(Side::Host, IVec2::new(100, 100));
        interpolator.update(&mut tank, start);
        assert_eq!(tank.position, IVec2::new(100, 100));
        assert_eq!(tank.direction, Direction::Down);
    }

    #[test]
    fn test_stale_snapshot_is_ignored() {
        let start = Instant::now();
        let mut interpolator = Interpolator::default();
        interpolator.set_target(
            TankState {
                position: [400, 100],
                direction: Direction::Left,
            },
            start,
        );

        let mut tank = Tank::new(Side::Host, IVec2::new(100, 100));
        assert!(interpolator.is_stale(start + ms(600)));
        assert!(!interpolator.update(&mut tank, start + ms(600)));
        assert_eq!(tank.position, IVec2::new(100, 100));
        assert_eq!(tank.direction, Direction::Up);
    }

    #[test]
    fn test_no_target_never_moves() {
        let interpolator = Interpolator::default();
        let mut tank = Tank::new(Side::Host, IVec2::new(100, 100));
        assert!(interpolator.is_stale(Instant::now()));
        assert!(!interpolator.update(&mut tank, Instant::now()));
    }
}
