use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::HexColor;

use super::{
    burst_machine::{BurstEvent, BurstPhase, BurstStateMachine, InvalidTransition},
    sample_between, sample_symmetric,
};

/// Palette used when none is configured.
pub const DEFAULT_CONFETTI_PALETTE: [HexColor; 5] = [
    HexColor::from_rgb(0xf4, 0x3f, 0x5e),
    HexColor::from_rgb(0xf5, 0x9e, 0x0b),
    HexColor::from_rgb(0x10, 0xb9, 0x81),
    HexColor::from_rgb(0x3b, 0x82, 0xf6),
    HexColor::from_rgb(0xa8, 0x55, 0xf7),
];

/// Reference frame rate the per-frame friction factor is expressed against.
const REFERENCE_FPS: f32 = 60.0;

/// Tuning for a confetti burst. Speeds are in units per second, angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfettiConfig {
    /// Particles alive during a burst; constant until teardown.
    pub particle_count: usize,
    /// Slowest initial fall speed.
    pub min_speed: f32,
    /// Fastest initial fall speed.
    pub max_speed: f32,
    /// Horizontal velocity is sampled in `[-max_drift, max_drift]`.
    pub max_drift: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Smallest particle edge.
    pub min_size: f32,
    /// Largest particle edge.
    pub max_size: f32,
    /// Rotation speed is sampled in `[-max_rotation_speed, max_rotation_speed]`.
    pub max_rotation_speed: f32,
    /// Colors particles are drawn from.
    pub palette: Vec<HexColor>,
    /// Fraction of the box width, centered, on which particles can land.
    pub landing_band: f32,
    /// Horizontal momentum kept per reference frame while on the box.
    pub landing_friction: f32,
    /// Fraction of vertical speed kept (and reversed) when hitting the box.
    pub vertical_damping: f32,
    /// Bounces slower than this settle on the box.
    pub rest_speed: f32,
    /// Acceleration pushing resting particles towards the nearest edge of the box.
    pub gravity_assist: f32,
    /// Distance beyond the viewport after which a particle is recycled.
    pub exit_margin: f32,
    /// Blur radius for particles in front of the box.
    pub front_blur: f32,
    /// Blur radius for particles behind the box.
    pub back_blur: f32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            particle_count: 120,
            min_speed: 60.0,
            max_speed: 240.0,
            max_drift: 90.0,
            gravity: 600.0,
            min_size: 6.0,
            max_size: 12.0,
            max_rotation_speed: 360.0,
            palette: DEFAULT_CONFETTI_PALETTE.to_vec(),
            landing_band: 0.7,
            landing_friction: 0.98,
            vertical_damping: 0.1,
            rest_speed: 20.0,
            gravity_assist: 30.0,
            exit_margin: 50.0,
            front_blur: 0.0,
            back_blur: 2.0,
        }
    }
}

impl ConfettiConfig {
    /// Replace the particle palette, typically with [`crate::theme::ThemePalette::confetti_palette`].
    /// An empty palette keeps the current one.
    pub fn with_palette(mut self, palette: impl IntoIterator<Item = HexColor>) -> Self {
        let palette: Vec<HexColor> = palette.into_iter().collect();
        if !palette.is_empty() {
            self.palette = palette;
        }
        self
    }

    /// Blur radius for a rendering layer.
    pub fn blur(&self, layer: Layer) -> f32 {
        match layer {
            Layer::Front => self.front_blur,
            Layer::Back => self.back_blur,
        }
    }
}

/// Visible area particles live in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Visible width.
    pub width: f32,
    /// Visible height.
    pub height: f32,
}

/// Axis-aligned rectangle, used for the occluding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge; the only edge particles collide with.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Horizontal extent particles may land on.
    fn landing_span(&self, band: f32) -> (f32, f32) {
        let half = self.width * band.clamp(0.0, 1.0) / 2.0;
        (self.center_x() - half, self.center_x() + half)
    }

    fn spans(&self, x: f32) -> bool {
        (self.x..=self.right()).contains(&x)
    }
}

/// Rendering layer relative to the occluding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Drawn over the box.
    Front,
    /// Drawn behind the box, more blurred.
    Back,
}

/// One confetti piece. Position is the particle's center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position, growing downwards.
    pub y: f32,
    /// Horizontal velocity.
    pub vx: f32,
    /// Vertical velocity.
    pub vy: f32,
    /// Degrees.
    pub rotation: f32,
    /// Degrees per second.
    pub rotation_speed: f32,
    /// Edge length.
    pub size: f32,
    /// Fill color.
    pub color: HexColor,
    /// Layer the particle is drawn on this frame.
    pub layer: Layer,
    /// Settled on the top edge of the box.
    pub resting: bool,
}

/// Drives one confetti burst: lifecycle, spawning and per-frame physics.
pub struct ConfettiController<R = StdRng> {
    config: ConfettiConfig,
    viewport: Viewport,
    rng: R,
    machine: BurstStateMachine,
    particles: Vec<Particle>,
}

/// Create an idle burst controller. Call [`ConfettiController::spawn`] to start it.
pub fn create_confetti_burst<R: Rng>(
    config: ConfettiConfig,
    viewport: Viewport,
    rng: R,
) -> ConfettiController<R> {
    ConfettiController {
        config,
        viewport,
        rng,
        machine: BurstStateMachine::new(),
        particles: Vec::new(),
    }
}

impl ConfettiController<StdRng> {
    /// Controller with a reproducible random source.
    pub fn seeded(config: ConfettiConfig, viewport: Viewport, seed: u64) -> Self {
        create_confetti_burst(config, viewport, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ConfettiController<R> {
    /// Current lifecycle phase.
    pub fn phase(&self) -> BurstPhase {
        self.machine.phase()
    }

    /// Particles as of the last frame.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Tuning in use.
    pub fn config(&self) -> &ConfettiConfig {
        &self.config
    }

    /// Resize the visible area; existing particles are kept.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Start the burst, or restart it with a fresh set of particles.
    pub fn spawn(&mut self) -> Result<BurstPhase, InvalidTransition> {
        let phase = self.machine.apply(BurstEvent::Spawn)?;
        let count = self.config.particle_count;
        let particles: Vec<Particle> = (0..count)
            .map(|_| self.fresh_particle(true))
            .collect();
        self.particles = particles;
        debug!(count, "confetti burst spawned");
        Ok(phase)
    }

    /// Freeze the burst; particles keep their exact state.
    pub fn pause(&mut self) -> Result<BurstPhase, InvalidTransition> {
        self.machine.apply(BurstEvent::Pause)
    }

    /// Continue a paused burst from where it stopped.
    pub fn resume(&mut self) -> Result<BurstPhase, InvalidTransition> {
        self.machine.apply(BurstEvent::Resume)
    }

    /// Stop the burst and discard every particle.
    pub fn teardown(&mut self) -> Result<BurstPhase, InvalidTransition> {
        let phase = self.machine.apply(BurstEvent::Teardown)?;
        self.particles.clear();
        debug!("confetti burst torn down");
        Ok(phase)
    }

    /// Step the simulation by `dt` seconds against an optional occluding box.
    ///
    /// Does nothing unless the burst is running. Particles leaving the viewport are recycled in
    /// place, so the count never changes.
    pub fn advance(&mut self, dt: f32, occluder: Option<Rect>) {
        if self.machine.phase() != BurstPhase::Bursting || dt.is_nan() || dt <= 0.0 {
            return;
        }

        for index in 0..self.particles.len() {
            let mut particle = self.particles[index].clone();
            self.step(&mut particle, dt, occluder);
            if self.has_exited(&particle) {
                particle = self.fresh_particle(false);
            }
            self.particles[index] = particle;
        }
    }

    fn step(&self, particle: &mut Particle, dt: f32, occluder: Option<Rect>) {
        let config = &self.config;
        let half = particle.size / 2.0;

        if particle.resting {
            match occluder {
                Some(bounds) => {
                    let (band_left, band_right) = bounds.landing_span(config.landing_band);
                    let outward = if particle.x < bounds.center_x() { -1.0 } else { 1.0 };
                    particle.vx += outward * config.gravity_assist * dt;
                    particle.vx *= config.landing_friction.powf(dt * REFERENCE_FPS);
                    particle.x += particle.vx * dt;
                    particle.y = bounds.y - half;
                    particle.vy = 0.0;
                    if particle.x < band_left || particle.x > band_right {
                        particle.resting = false;
                    }
                }
                None => particle.resting = false,
            }
        } else {
            let previous_bottom = particle.y + half;
            particle.vy += config.gravity * dt;
            particle.x += particle.vx * dt;
            particle.y += particle.vy * dt;
            particle.rotation = (particle.rotation + particle.rotation_speed * dt).rem_euclid(360.0);

            // Only the top edge of the box collides, and only inside the landing band.
            if let Some(bounds) = occluder {
                let (band_left, band_right) = bounds.landing_span(config.landing_band);
                let crossed_top =
                    previous_bottom <= bounds.y && particle.y + half >= bounds.y;
                let over_band = (band_left..=band_right).contains(&particle.x);
                if particle.vy > 0.0 && crossed_top && over_band {
                    particle.y = bounds.y - half;
                    particle.vx *= config.landing_friction;
                    particle.vy = -particle.vy * config.vertical_damping;
                    if particle.vy.abs() < config.rest_speed {
                        particle.vy = 0.0;
                        particle.resting = true;
                    }
                }
            }
        }

        particle.layer = match occluder {
            Some(bounds) if bounds.spans(particle.x) && particle.y > bounds.y => Layer::Back,
            _ => Layer::Front,
        };
    }

    fn has_exited(&self, particle: &Particle) -> bool {
        let margin = self.config.exit_margin;
        particle.x < -margin
            || particle.x > self.viewport.width + margin
            || particle.y > self.viewport.height + margin
    }

    /// New particle above the viewport. Initial bursts are staggered over one viewport height.
    fn fresh_particle(&mut self, initial: bool) -> Particle {
        let config = &self.config;
        let rng = &mut self.rng;

        let size = sample_between(rng, config.min_size, config.max_size);
        let x = sample_between(rng, 0.0, self.viewport.width);
        let y = if initial {
            -size - sample_between(rng, 0.0, self.viewport.height)
        } else {
            -size - sample_between(rng, 0.0, config.exit_margin)
        };
        let color = if config.palette.is_empty() {
            DEFAULT_CONFETTI_PALETTE[rng.random_range(0..DEFAULT_CONFETTI_PALETTE.len())]
        } else {
            config.palette[rng.random_range(0..config.palette.len())]
        };

        Particle {
            x,
            y,
            vx: sample_symmetric(rng, config.max_drift),
            vy: sample_between(rng, config.min_speed, config.max_speed),
            rotation: sample_between(rng, 0.0, 360.0),
            rotation_speed: sample_symmetric(rng, config.max_rotation_speed),
            size,
            color,
            layer: Layer::Front,
            resting: false,
        }
    }
}
