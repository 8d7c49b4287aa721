use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{HexColor, HslColor};

use super::{sample_between, sample_symmetric};

/// Tuning for the ambient blob field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    /// Number of blobs per set.
    pub count: usize,
    /// Width of the containing area.
    pub area_width: f32,
    /// Height of the containing area.
    pub area_height: f32,
    /// Inset kept clear on every side of the area.
    pub padding: f32,
    /// Edge length of a blob element.
    pub blob_size: f32,
    /// Waypoint offsets are sampled in `[-waypoint_range, waypoint_range]` on each axis.
    pub waypoint_range: f32,
    /// Shortest cycle, in seconds.
    pub min_duration_secs: f32,
    /// Longest cycle, in seconds.
    pub max_duration_secs: f32,
    /// Longest start delay, in seconds.
    pub max_delay_secs: f32,
    /// Hue perturbation in degrees.
    pub hue_jitter: f32,
    /// Saturation perturbation in percentage points.
    pub saturation_jitter: f32,
    /// Lightness perturbation in percentage points.
    pub lightness_jitter: f32,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            count: 9,
            area_width: 400.0,
            area_height: 300.0,
            padding: 16.0,
            blob_size: 120.0,
            waypoint_range: 30.0,
            min_duration_secs: 3.0,
            max_duration_secs: 6.0,
            max_delay_secs: 1.5,
            hue_jitter: 30.0,
            saturation_jitter: 30.0,
            lightness_jitter: 30.0,
        }
    }
}

/// A 2D coordinate or offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component, growing downwards.
    pub y: f32,
}

/// Motion of one blob: a start position followed by a loop through three offsets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobMotion {
    /// Top-left corner at the start of the cycle.
    pub start: Point,
    /// Offsets from `start`, visited in order.
    pub waypoints: [Point; 3],
    /// Length of one loop, in seconds.
    pub duration_secs: f32,
    /// Wait before the first loop, in seconds.
    pub delay_secs: f32,
}

/// One colored glow element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blob {
    /// Perturbed variant of the base color.
    pub color: HexColor,
    /// How the element drifts.
    pub motion: BlobMotion,
}

/// Blobs generated from one base color and shuffle seed. Never mutated after generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobSet {
    /// Color the set was derived from.
    pub base: HexColor,
    /// Shuffle seed the set was derived with.
    pub seed: u64,
    /// Blobs in render order.
    pub blobs: Vec<Blob>,
}

/// Generate a full blob set from a base color and shuffle seed.
///
/// The same `(base, seed, config)` always yields the same set.
pub fn generate_blob_set(base: HexColor, seed: u64, config: &BlobConfig) -> BlobSet {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_blob_set_with(base, seed, config, &mut rng)
}

/// Generate a blob set drawing randomness from `rng`. `seed` is recorded on the set as-is.
pub fn generate_blob_set_with<R: Rng + ?Sized>(
    base: HexColor,
    seed: u64,
    config: &BlobConfig,
    rng: &mut R,
) -> BlobSet {
    let base_hsl = base.to_hsl();
    let blobs = (0..config.count)
        .map(|_| Blob {
            color: perturb(base_hsl, config, rng),
            motion: motion(config, rng),
        })
        .collect();

    BlobSet { base, seed, blobs }
}

fn perturb<R: Rng + ?Sized>(base: HslColor, config: &BlobConfig, rng: &mut R) -> HexColor {
    let hue = base.hue + sample_symmetric(rng, config.hue_jitter);
    // Monochrome bases stay monochrome.
    let saturation = if base.saturation <= 0.0 {
        0.0
    } else {
        (base.saturation + sample_symmetric(rng, config.saturation_jitter)).clamp(0.0, 100.0)
    };
    let lightness =
        (base.lightness + sample_symmetric(rng, config.lightness_jitter)).clamp(0.0, 100.0);

    HexColor::from_hsl(HslColor {
        hue,
        saturation,
        lightness,
    })
}

fn motion<R: Rng + ?Sized>(config: &BlobConfig, rng: &mut R) -> BlobMotion {
    // Keep the whole element inside the padded area.
    let max_x = config.area_width - config.padding - config.blob_size;
    let max_y = config.area_height - config.padding - config.blob_size;
    let start = Point {
        x: sample_between(rng, config.padding, max_x),
        y: sample_between(rng, config.padding, max_y),
    };
    let waypoints = [(); 3].map(|_| Point {
        x: sample_symmetric(rng, config.waypoint_range),
        y: sample_symmetric(rng, config.waypoint_range),
    });

    BlobMotion {
        start,
        waypoints,
        duration_secs: sample_between(rng, config.min_duration_secs, config.max_duration_secs),
        delay_secs: sample_between(rng, 0.0, config.max_delay_secs),
    }
}

/// Current blob set for a view, regenerated wholesale when its inputs change.
#[derive(Debug, Clone)]
pub struct BlobField {
    config: BlobConfig,
    current: Option<BlobSet>,
}

impl BlobField {
    /// Empty field; the first [`BlobField::refresh`] generates a set.
    pub fn new(config: BlobConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    /// Make sure the field reflects `(base, seed)`. Returns `true` when a new set was generated.
    pub fn refresh(&mut self, base: HexColor, seed: u64) -> bool {
        if let Some(current) = &self.current {
            if current.base == base && current.seed == seed {
                return false;
            }
        }

        debug!(%base, seed, count = self.config.count, "regenerating blob set");
        self.current = Some(generate_blob_set(base, seed, &self.config));
        true
    }

    /// Set currently on display, if any.
    pub fn current(&self) -> Option<&BlobSet> {
        self.current.as_ref()
    }
}
