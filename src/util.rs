use crate::types::Float;

/// `n` evenly spaced values across [start, end); the end itself is excluded,
/// so consecutive calls tile without overlap.
pub fn evenly_space(start: Float, end: Float, n: usize) -> Vec<Float> {
    let step = (end - start) / n as Float;
    (0..n).map(|i| start + i as Float * step).collect()
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        let diff = (left - right).abs();
        if diff > tol {
            panic!(
                "assertion failed: {} ~= {} \
                (tolerance: {}, difference: {})",
                left, right, tol, diff
            );
        }
    };
}

#[macro_export]
macro_rules! assert_vec_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        for (a, b) in left.iter().zip(right.iter()) {
            crate::assert_close!(a, b, tol);
        }
    };
}
