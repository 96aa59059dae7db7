// Interpolation clock
//
// Between two server snapshots a cell is drawn at
//   f  = clamp((now - update_time) / 120, 0, 1)
//   f' = f * f * (3 - 2 f)
//   drawn = old + f' * (new - old)        (x, y and size)
// Fading cells use 1 - f' as their opacity.

use protocol::Position;

use crate::utils::lerp;

/// Length of one interpolation window.
pub const INTERPOLATION_DURATION_MS: f64 = 120.0;

/// Position and size of a cell at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub position: Position,
    pub size: f64,
}

impl Snapshot {
    pub const fn new(position: Position, size: f64) -> Self {
        Self { position, size }
    }

    /// Componentwise interpolation towards `to`.
    #[inline]
    pub fn lerp(self, to: Snapshot, t: f64) -> Snapshot {
        Snapshot {
            position: Position::new(
                lerp(self.position.x, to.position.x, t),
                lerp(self.position.y, to.position.y, t),
            ),
            size: lerp(self.size, to.size, t),
        }
    }
}

/// Raw time fraction, clamped to [0, 1].
#[inline]
pub fn linear_fraction(now: f64, update_time: f64) -> f64 {
    ((now - update_time) / INTERPOLATION_DURATION_MS).clamp(0.0, 1.0)
}

/// Cubic smoothstep.
#[inline]
pub fn ease(f: f64) -> f64 {
    f * f * (3.0 - 2.0 * f)
}

/// Eased time fraction.
#[inline]
pub fn fraction(now: f64, update_time: f64) -> f64 {
    ease(linear_fraction(now, update_time))
}

/// Drawn snapshot between `old` and `new` at `now`.
#[inline]
pub fn resolve(old: Snapshot, new: Snapshot, update_time: f64, now: f64) -> Snapshot {
    old.lerp(new, fraction(now, update_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_saturates_at_window() {
        assert_eq!(fraction(100.0, 100.0), 0.0);
        assert_eq!(fraction(220.0, 100.0), 1.0);
        assert_eq!(fraction(5000.0, 100.0), 1.0);
        // Clock skew before the update clamps to zero.
        assert_eq!(fraction(50.0, 100.0), 0.0);
    }

    #[test]
    fn test_fraction_is_monotonic() {
        let mut last = 0.0;
        for step in 0..=240 {
            let f = fraction(step as f64, 0.0);
            assert!(f >= last, "fraction decreased at {step}ms");
            last = f;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_ease_is_smoothstep_not_linear() {
        // A quarter of the window: linear 0.25, eased 0.15625.
        assert!((fraction(30.0, 0.0) - 0.15625).abs() < 1e-12);
        assert!((fraction(60.0, 0.0) - 0.5).abs() < 1e-12);
        assert!((fraction(90.0, 0.0) - 0.84375).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_componentwise() {
        let old = Snapshot::new(Position::new(0.0, 0.0), 10.0);
        let new = Snapshot::new(Position::new(10.0, -20.0), 12.0);
        assert_eq!(resolve(old, new, 0.0, 0.0), old);
        assert_eq!(resolve(old, new, 0.0, 120.0), new);
        let mid = resolve(old, new, 0.0, 60.0);
        assert!((mid.position.x - 5.0).abs() < 1e-12);
        assert!((mid.position.y + 10.0).abs() < 1e-12);
        assert!((mid.size - 11.0).abs() < 1e-12);
    }
}
