//! A blade of grass: a kinematic chain of torsional joints rooted at a
//! fixed ground point.

use na::{vector, Vector2};
use rand::Rng;

use crate::{
    error::SimError,
    integrators::{Dopri45, IntegrationError},
    oscillator::{OscillatorState, Physics, TorqueEnv},
    types::Float,
    wind::WindSource,
};

/// Rest angle of an unperturbed joint, straight up.
pub const REST_ANGLE_DEG: Float = 90.0;

/// Initial joint angle. Deliberately far from rest so a freshly built blade
/// visibly springs back upright.
pub const START_ANGLE_DEG: Float = 45.0;

const REST_JITTER_DEG: i32 = 5;
const SHADE_BASE: i32 = 200;
const SHADE_JITTER: i32 = 50;
const SHADE_RANGE: Float = 80.0;

/// One joint of a blade.
///
/// The root node is a static ground anchor: zero arm length, no oscillator.
/// Every other node extends a fixed-length arm from the resolved position of
/// the node directly beneath it, at the angle its oscillator carries.
#[derive(Debug, Clone, PartialEq)]
pub struct BladeNode {
    pub length: Float,
    pub rest_angle_deg: Float,
    pub mass: Float,
    /// Green-channel tint in [0, 255]; darker near the ground, lighter at
    /// the tip. Cosmetic only.
    pub shade: Float,
    /// `None` for the root anchor.
    pub state: Option<OscillatorState>,
    /// Resolved position, cached. For the root this is always the blade base.
    pub position: Vector2<Float>,
}

/// An ordered chain of joints from ground anchor to tip. The anchor
/// back-reference of node i is simply index i-1; the chain is a strict path
/// toward the root, so no cycles and no shared ownership.
#[derive(Debug, Clone, PartialEq)]
pub struct Blade {
    pub base: Vector2<Float>,
    pub height: Float,
    pub nodes: Vec<BladeNode>,
}

impl Blade {
    /// Build a blade of `joints` nodes (the ground anchor counts as one, so
    /// `joints >= 2` is required for any dynamics at all). Rest angles pick
    /// up a cumulative ±5° jitter along the chain; the shade interpolates
    /// from dark at the root to the blade's full tint at the tip.
    pub fn new(
        height: Float,
        base_x: Float,
        base_y: Float,
        joints: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        if joints < 2 {
            return Err(SimError::InvalidConfiguration(format!(
                "a blade needs at least 2 joints (1 anchor + 1 dynamic), got {joints}"
            )));
        }

        let length = (height - base_y) / joints as Float;
        let tint = (SHADE_BASE + rng.random_range(-SHADE_JITTER..=SHADE_JITTER)) as Float;
        let shade_step = SHADE_RANGE / (joints - 1) as Float;

        let base = vector![base_x, base_y];
        let mut rest_angle_deg = REST_ANGLE_DEG;
        let mut nodes = Vec::with_capacity(joints);

        nodes.push(BladeNode {
            length: 0.0,
            rest_angle_deg,
            mass: 1.0,
            shade: (tint - SHADE_RANGE).clamp(0.0, 255.0),
            state: None,
            position: base,
        });

        for i in 1..joints {
            rest_angle_deg += rng.random_range(-REST_JITTER_DEG..=REST_JITTER_DEG) as Float;
            nodes.push(BladeNode {
                length,
                rest_angle_deg,
                mass: 1.0,
                shade: (tint - SHADE_RANGE + i as Float * shade_step).clamp(0.0, 255.0),
                state: Some(OscillatorState::new(START_ANGLE_DEG.to_radians())),
                position: base, // resolved below
            });
        }

        let mut blade = Blade {
            base,
            height,
            nodes,
        };
        blade.reposition();
        Ok(blade)
    }

    /// Advance every joint to `t1` and re-resolve positions, in strict
    /// root-to-tip order: each joint integrates against the frozen wind set,
    /// then extends its arm from the already-updated node beneath it.
    /// Updating out of order would anchor downstream nodes to one-tick-stale
    /// positions.
    ///
    /// A joint whose integration fails holds its last good angle for this
    /// tick (its clock still advances) and is listed in the return value by
    /// joint index; the rest of the chain keeps animating.
    pub fn step(
        &mut self,
        t1: Float,
        winds: &[WindSource],
        physics: Physics,
        solver: &Dopri45,
    ) -> Vec<(usize, IntegrationError)> {
        let mut failures = vec![];

        for i in 1..self.nodes.len() {
            let anchor = self.nodes[i - 1].position;
            let node = &mut self.nodes[i];

            let env = TorqueEnv {
                rest_angle_deg: node.rest_angle_deg,
                mass: node.mass,
                position: node.position,
                winds,
                physics,
            };

            if let Some(state) = node.state.as_mut() {
                if let Err(err) = state.advance(t1, &env, solver) {
                    state.t = t1;
                    failures.push((i, err));
                }
                let theta = state.theta;
                node.position = anchor + node.length * vector![theta.cos(), theta.sin()];
            }
        }

        failures
    }

    /// Re-resolve every node position from the current angles, root to tip.
    fn reposition(&mut self) {
        let mut anchor = self.base;
        for node in &mut self.nodes {
            node.position = match &node.state {
                Some(state) => {
                    anchor + node.length * vector![state.theta.cos(), state.theta.sin()]
                }
                None => anchor,
            };
            anchor = node.position;
        }
    }

    /// Re-base every joint's last-integrated time.
    pub fn set_time(&mut self, t: Float) {
        for node in &mut self.nodes {
            if let Some(state) = node.state.as_mut() {
                state.t = t;
            }
        }
    }

    /// Line segments for the presentation layer: (anchor position, node
    /// position, node shade), one per dynamic node.
    pub fn segments(&self) -> impl Iterator<Item = (Vector2<Float>, Vector2<Float>, Float)> + '_ {
        self.nodes
            .windows(2)
            .map(|pair| (pair[0].position, pair[1].position, pair[1].shade))
    }
}
