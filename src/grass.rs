//! A patch of grass: blades evenly spaced across a horizontal span.

use rand::Rng;

use crate::{blade::Blade, error::SimError, types::Float, util::evenly_space};

const BASE_HEIGHT: Float = 50.0;
const HEIGHT_JITTER: i32 = 25;

/// Owns every blade in the patch. Topology is fixed at construction; only
/// joint angles and positions change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Grass {
    pub left: Float,
    pub right: Float,
    pub blades: Vec<Blade>,
}

impl Grass {
    /// Place `num_blades` blades at evenly spaced x positions across
    /// [left, right), each with an independently randomized height of
    /// 50 ± 25 and the per-node jitter of [`Blade::new`].
    pub fn new(
        left: Float,
        right: Float,
        num_blades: usize,
        joints: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        if num_blades == 0 {
            return Err(SimError::InvalidConfiguration(
                "blade count must be positive".to_string(),
            ));
        }
        // `!(right > left)` also rejects NaN bounds.
        if !(right > left) {
            return Err(SimError::InvalidConfiguration(format!(
                "span must be non-empty, got [{left}, {right})"
            )));
        }

        let mut blades = Vec::with_capacity(num_blades);
        for x in evenly_space(left, right, num_blades) {
            let height = BASE_HEIGHT + rng.random_range(-HEIGHT_JITTER..=HEIGHT_JITTER) as Float;
            blades.push(Blade::new(height, x, 0.0, joints, rng)?);
        }

        Ok(Grass {
            left,
            right,
            blades,
        })
    }
}
