use na::{vector, Vector2};

use crate::types::Float;

/// Horizontal distance a wind source travels per tick.
pub const WIND_SPEED: Float = 10.0;

/// How far past the span bounds a source travels before wrapping around.
pub const WIND_MARGIN: Float = 50.0;

/// A translating circular force field. Joints whose resolved position lies
/// inside the circle receive an angular torque scaled by `strength`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSource {
    pub center: Vector2<Float>,
    pub radius: Float,
    pub strength: Float,
}

impl WindSource {
    pub fn new(x: Float, y: Float, radius: Float, strength: Float) -> Self {
        WindSource {
            center: vector![x, y],
            radius,
            strength,
        }
    }

    /// Containment test with cheap per-axis rejection and an inscribed
    /// diamond accept before the exact Euclidean check. The diamond
    /// short-circuit is part of the field's observable shape: borderline
    /// points inside the diamond count as contained without the exact test.
    pub fn contains(&self, point: &Vector2<Float>) -> bool {
        let dx = (point.x - self.center.x).abs();
        let dy = (point.y - self.center.y).abs();

        if dx > self.radius || dy > self.radius {
            return false;
        }
        if dx + dy <= self.radius {
            return true;
        }
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Translate horizontally by `speed`, wrapping from `right + margin`
    /// back to `left - margin`. The wrap, not the physics, is what makes
    /// wind intermittent for any given joint.
    pub fn translate(&mut self, speed: Float, left: Float, right: Float, margin: Float) {
        self.center.x += speed;
        if self.center.x >= right + margin {
            self.center.x = left - margin;
        }
    }

    pub fn is_finite(&self) -> bool {
        self.center.x.is_finite()
            && self.center.y.is_finite()
            && self.radius.is_finite()
            && self.strength.is_finite()
    }
}

#[cfg(test)]
mod wind_tests {
    use super::*;

    #[test]
    fn containment_three_tiers() {
        let wind = WindSource::new(0.0, 0.0, 10.0, 50.0);

        // Fails the diamond (15 > 10) and the exact check (113 > 100).
        assert!(!wind.contains(&vector![7.0, 8.0]));

        // Inside the inscribed diamond: accepted without the exact check.
        assert!(wind.contains(&vector![3.0, 3.0]));

        // On the Euclidean boundary: 10^2 + 0 <= 10^2.
        assert!(wind.contains(&vector![10.0, 0.0]));

        // Outside the diamond but inside the circle: exact check accepts.
        assert!(wind.contains(&vector![7.0, 7.0]));

        // Per-axis rejection.
        assert!(!wind.contains(&vector![11.0, 0.0]));
        assert!(!wind.contains(&vector![0.0, -11.0]));
    }

    #[test]
    fn containment_off_center() {
        let wind = WindSource::new(100.0, 50.0, 40.0, 50.0);
        assert!(wind.contains(&vector![100.0, 50.0]));
        assert!(wind.contains(&vector![130.0, 60.0]));
        assert!(!wind.contains(&vector![100.0, 95.0]));
    }

    #[test]
    fn translation_wraps_past_margin() {
        let mut wind = WindSource::new(195.0, 50.0, 40.0, 50.0);
        let (left, right) = (-200.0, 200.0);

        wind.translate(WIND_SPEED, left, right, WIND_MARGIN);
        assert_eq!(wind.center.x, 205.0);

        // Keep going until the wrap triggers at right + margin.
        for _ in 0..5 {
            wind.translate(WIND_SPEED, left, right, WIND_MARGIN);
        }
        assert_eq!(wind.center.x, left - WIND_MARGIN);
    }
}
