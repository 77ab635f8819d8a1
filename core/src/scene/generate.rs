//! Random parameter generation for the animation scene.
//!
//! Deterministic-shape, non-deterministic-value generators: object counts
//! scale with container area, positions/delays/colors are drawn from the
//! supplied RNG. All functions are pure over `(Viewport, Rng)` state.

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use rand::Rng;

use super::{
    ConfettiPiece, FallenIcon, FireworkBurst, FireworkParticle, FloatingIcon, Scene, Viewport,
    CONFETTI_COLORS, FESTIVE_ICONS, FIREWORK_COLORS,
};

/// Base period of the throw animation cycle in milliseconds. Throw
/// durations and delays are derived fractions of it.
pub const THROW_CYCLE_MS: u32 = 10_000;

/// Container area per thrown icon.
const AREA_PER_ICON: f32 = 4_000.0;
/// Container area per confetti piece.
const AREA_PER_CONFETTI: f32 = 800.0;
/// Fallen icons per horizontal pixel.
const PILE_DENSITY: f32 = 1.5;

const FIREWORK_LIFETIME: Duration = Duration::from_millis(1_500);
const PARTICLE_LIFETIME: Duration = Duration::from_millis(2_000);

fn random_glyph(rng: &mut impl Rng) -> &'static str {
    FESTIVE_ICONS[rng.gen_range(0..FESTIVE_ICONS.len())]
}

fn random_color(palette: &[&'static str], rng: &mut impl Rng) -> &'static str {
    palette[rng.gen_range(0..palette.len())]
}

impl Scene {
    /// Replace the floating icons with a fresh burst thrown in from the
    /// four container corners.
    pub fn spawn_thrown_icons(&mut self, viewport: Viewport, rng: &mut impl Rng) {
        let base_secs = THROW_CYCLE_MS as f32 / 1_000.0;
        let count = (viewport.area() / AREA_PER_ICON) as usize;
        let mut icons = Vec::with_capacity(count);

        for _ in 0..count {
            let (start_x, start_y) = match rng.gen_range(0..4) {
                0 => (-50.0, -50.0),
                1 => (viewport.width, -50.0),
                2 => (-50.0, viewport.height),
                _ => (viewport.width, viewport.height),
            };
            let end_x = rng.gen_range(0.0..1.0) * (viewport.width - 40.0) + 20.0;
            let end_y = rng.gen_range(0.0..1.0) * (viewport.height - 100.0) + 50.0;

            icons.push(FloatingIcon {
                id: self.next_icon_id(),
                glyph: random_glyph(rng),
                start_x,
                start_y,
                end_x,
                end_y,
                duration_secs: base_secs * 0.6 + rng.gen_range(0.0..1.0) * base_secs * 0.4,
                delay_secs: rng.gen_range(0.0..1.0) * base_secs * 0.4,
            });
        }

        self.floating = icons;
    }

    /// Replace the confetti with a dense burst across the full width.
    pub fn spawn_confetti_burst(&mut self, viewport: Viewport, rng: &mut impl Rng) {
        let count = (viewport.area() / AREA_PER_CONFETTI) as usize;
        let mut pieces = Vec::with_capacity(count);

        for _ in 0..count {
            pieces.push(ConfettiPiece {
                id: self.next_confetti_id(),
                x: rng.gen_range(0.0..1.0) * viewport.width,
                color: random_color(CONFETTI_COLORS, rng),
                fall_secs: 2.0 + rng.gen_range(0.0..2.0),
                delay_secs: rng.gen_range(0.0..1.0),
                round: rng.gen_bool(0.5),
            });
        }

        self.confetti = pieces;
    }

    /// Append one firework burst and its particle spray.
    pub fn spawn_firework(&mut self, viewport: Viewport, rng: &mut impl Rng, now: Instant) {
        let x = rng.gen_range(0.0..1.0) * (viewport.width - 100.0) + 50.0;
        let y = rng.gen_range(0.0..1.0) * (viewport.height - 200.0) + 100.0;
        let near = rng.gen_bool(0.4);
        let size = if near { 60.0 } else { 30.0 };
        let particle_count = if near { 40 } else { 25 };

        let id = self.next_firework_id();
        self.fireworks.push(FireworkBurst {
            id,
            x,
            y,
            size,
            color: random_color(FIREWORK_COLORS, rng),
            near,
            expires_at: now + FIREWORK_LIFETIME,
        });

        for _ in 0..particle_count {
            let angle = rng.gen_range(0.0..TAU);
            let distance = size * rng.gen_range(0.5..2.0);
            let id = self.next_particle_id();
            self.particles.push(FireworkParticle {
                id,
                x,
                y,
                size: size * 0.2,
                color: random_color(FIREWORK_COLORS, rng),
                offset_x: angle.cos() * distance,
                offset_y: angle.sin() * distance,
                duration_secs: 1.0 + rng.gen_range(0.0..0.5),
                delay_secs: rng.gen_range(0.0..0.3),
                near,
                expires_at: now + PARTICLE_LIFETIME,
            });
        }
    }

    /// Replace the fallen icons with a naturally scattered pile along the
    /// container floor.
    pub fn spawn_leaf_pile(&mut self, viewport: Viewport, rng: &mut impl Rng) {
        let count = (viewport.width * PILE_DENSITY) as usize;
        let base_level = viewport.height - 25.0;
        let mut icons = Vec::with_capacity(count);

        for _ in 0..count {
            // Mostly near the base level, some buried, some on top
            let rest_y = if rng.gen_bool(0.3) {
                base_level - rng.gen_range(0.0..15.0)
            } else if rng.gen_bool(0.5) {
                base_level + rng.gen_range(-4.0..4.0)
            } else {
                base_level + rng.gen_range(0.0..10.0)
            };

            icons.push(FallenIcon {
                id: self.next_icon_id(),
                glyph: random_glyph(rng),
                x: rng.gen_range(0.0..1.0) * (viewport.width - 40.0) + 20.0,
                rest_y,
                mid_rotation_deg: rng.gen_range(-90.0..90.0),
                final_rotation_deg: rng.gen_range(-22.5..22.5),
                scale: 0.8 + rng.gen_range(0.0..0.4),
                opacity: 0.6 + rng.gen_range(0.0..0.4),
                delay_secs: rng.gen_range(0.0..0.8),
            });
        }

        self.fallen = icons;
    }
}
