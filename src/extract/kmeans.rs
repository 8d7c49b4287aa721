use std::collections::HashSet;

use rand::{Rng, seq::index};

use crate::color::HexColor;

/// Hard cap on assignment/update rounds.
pub const MAX_ROUNDS: usize = 8;
/// Convergence threshold: no centroid channel moved more than this.
pub const CONVERGENCE_DELTA: f32 = 0.5;
const MIN_CLUSTERS: usize = 2;
const MAX_CLUSTERS: usize = 5;
const SAMPLES_PER_CLUSTER: usize = 100;

/// A filtered pixel in RGB space, weighted towards vivid colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Channels on a 0..=255 scale.
    pub rgb: [f32; 3],
    /// Accumulation weight (`0.5 + saturation`, saturation in `[0, 1]`).
    pub weight: f32,
}

impl Sample {
    /// Build a sample from 8-bit channels and a saturation in `[0, 1]`.
    pub fn new(rgb: [u8; 3], saturation: f32) -> Self {
        Self {
            rgb: rgb.map(f32::from),
            weight: 0.5 + saturation,
        }
    }
}

/// `clamp(2, 5, floor(n / 100))`.
pub fn adaptive_k(sample_count: usize) -> usize {
    (sample_count / SAMPLES_PER_CLUSTER).clamp(MIN_CLUSTERS, MAX_CLUSTERS)
}

/// Weighted k-means over `samples`, returning the final centroids.
///
/// Initial centroids are `k` distinct sample colors; when fewer distinct colors exist than
/// requested clusters, `k` shrinks to match instead of searching for more.
pub fn cluster<R: Rng + ?Sized>(samples: &[Sample], k: usize, rng: &mut R) -> Vec<[f32; 3]> {
    let distinct = distinct_colors(samples);
    let k = k.min(distinct.len());
    if k == 0 {
        return Vec::new();
    }

    let mut centroids: Vec<[f32; 3]> = index::sample(rng, distinct.len(), k)
        .into_iter()
        .map(|i| distinct[i])
        .collect();

    for _ in 0..MAX_ROUNDS {
        let mut sums = vec![[0.0f32; 3]; k];
        let mut weights = vec![0.0f32; k];

        for sample in samples {
            let nearest = nearest_centroid(&centroids, sample.rgb);
            for (sum, channel) in sums[nearest].iter_mut().zip(sample.rgb) {
                *sum += channel * sample.weight;
            }
            weights[nearest] += sample.weight;
        }

        let mut max_shift = 0.0f32;
        for ((centroid, sum), weight) in centroids.iter_mut().zip(&sums).zip(&weights) {
            // Empty clusters keep their previous position.
            if *weight <= 0.0 {
                continue;
            }
            for (value, total) in centroid.iter_mut().zip(sum) {
                let next = total / weight;
                max_shift = max_shift.max((next - *value).abs());
                *value = next;
            }
        }

        if max_shift <= CONVERGENCE_DELTA {
            break;
        }
    }

    centroids
}

/// `0.7 * saturation + 0.3 * (1 - |lightness - 0.5|)` with both terms in `[0, 1]`.
pub fn score(centroid: [f32; 3]) -> f32 {
    let hsl = HexColor::from_channels_f32(centroid).to_hsl();
    let saturation = hsl.saturation / 100.0;
    let lightness = hsl.lightness / 100.0;
    0.7 * saturation + 0.3 * (1.0 - (lightness - 0.5).abs())
}

/// Highest scoring centroid.
pub fn best_centroid(centroids: &[[f32; 3]]) -> Option<[f32; 3]> {
    centroids
        .iter()
        .copied()
        .map(|centroid| (score(centroid), centroid))
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, centroid)| centroid)
}

fn nearest_centroid(centroids: &[[f32; 3]], rgb: [f32; 3]) -> usize {
    centroids
        .iter()
        .enumerate()
        .map(|(i, centroid)| (i, squared_distance(*centroid, rgb)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i)
}

fn squared_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn distinct_colors(samples: &[Sample]) -> Vec<[f32; 3]> {
    let mut seen = HashSet::new();
    samples
        .iter()
        .filter(|sample| seen.insert(sample.rgb.map(f32::to_bits)))
        .map(|sample| sample.rgb)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn samples_of(rgb: [u8; 3], saturation: f32, count: usize) -> Vec<Sample> {
        vec![Sample::new(rgb, saturation); count]
    }

    #[test]
    fn adaptive_k_is_clamped() {
        assert_eq!(adaptive_k(0), 2);
        assert_eq!(adaptive_k(250), 2);
        assert_eq!(adaptive_k(399), 3);
        assert_eq!(adaptive_k(10_000), 5);
    }

    #[test]
    fn single_distinct_color_does_not_loop() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = samples_of([200, 20, 20], 0.5, 500);
        let centroids = cluster(&samples, 5, &mut rng);
        assert_eq!(centroids, vec![[200.0, 20.0, 20.0]]);
    }

    #[test]
    fn separates_two_well_apart_groups() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut samples = samples_of([250, 10, 10], 0.9, 300);
        samples.extend(samples_of([10, 10, 240], 0.9, 300));
        samples.extend(samples_of([240, 20, 15], 0.9, 10));

        let mut centroids = cluster(&samples, 2, &mut rng);
        centroids.sort_by(|a, b| a[2].total_cmp(&b[2]));
        assert_eq!(centroids.len(), 2);
        assert!(centroids[0][0] > 240.0 && centroids[0][2] < 15.0);
        assert!(centroids[1][2] > 235.0 && centroids[1][0] < 15.0);
    }

    #[test]
    fn score_prefers_vivid_midtones() {
        let vivid = score([230.0, 40.0, 40.0]);
        let washed = score([200.0, 180.0, 180.0]);
        let dark = score([30.0, 5.0, 5.0]);
        assert!(vivid > washed);
        assert!(vivid > dark);
        assert_eq!(
            best_centroid(&[[200.0, 180.0, 180.0], [230.0, 40.0, 40.0]]),
            Some([230.0, 40.0, 40.0])
        );
        assert_eq!(best_centroid(&[]), None);
    }
}
