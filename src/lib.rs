#![allow(non_snake_case)]

use types::Float;
pub extern crate nalgebra as na;

pub mod blade;
pub mod error;
pub mod grass;
pub mod integrators;
pub mod oscillator;
pub mod simulate;
pub mod types;
pub mod util;
pub mod wind;

/// Signed gravitational torque constant. Negative: gravity pulls blades down.
pub const GRAVITY: Float = -9.81;

pub const PI: Float = std::f64::consts::PI;
