//! Procedural animation parameters derived from the theme color: ambient blobs and confetti bursts.

/// Ambient blob field.
pub mod blob;
/// Confetti burst lifecycle.
pub mod burst_machine;
/// Confetti particles and physics.
pub mod confetti;

use rand::Rng;

pub use self::blob::{BlobConfig, BlobField, BlobSet, generate_blob_set, generate_blob_set_with};
pub use self::burst_machine::{BurstEvent, BurstPhase, BurstStateMachine, InvalidTransition};
pub use self::confetti::{
    ConfettiConfig, ConfettiController, Layer, Particle, Rect, Viewport, create_confetti_burst,
};

/// Uniform sample in `[low, high]`; collapses to `low` when the range is empty or inverted.
pub(crate) fn sample_between<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low {
        rng.random_range(low..=high)
    } else {
        low
    }
}

/// Uniform sample in `[-magnitude, magnitude]`.
pub(crate) fn sample_symmetric<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> f32 {
    let magnitude = magnitude.abs();
    sample_between(rng, -magnitude, magnitude)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn degenerate_ranges_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample_between(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(sample_between(&mut rng, 5.0, 1.0), 5.0);
        assert_eq!(sample_symmetric(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn samples_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1_000 {
            let value = sample_symmetric(&mut rng, -30.0);
            assert!((-30.0..=30.0).contains(&value));
        }
    }
}
