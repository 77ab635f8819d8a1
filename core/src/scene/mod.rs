//! Animation scene: renderer-agnostic visual object descriptors.
//!
//! The scene is the ephemeral animation session: lists of generated
//! descriptors, each tagged with a numeric id so a renderer can key them
//! for removal. Geometry is in pixels, timing in seconds; a host renderer
//! maps them onto whatever animation primitives it has.

mod generate;

use std::time::Instant;

pub use generate::THROW_CYCLE_MS;

/// Container size the generators scale object counts and positions to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        // Fallback size until the host reports the real container
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Festive glyphs thrown around during the draw.
pub const FESTIVE_ICONS: &[&str] = &[
    "🌹", "🌸", "💐", "🌺", "🌻", "🌼", "🥀", "🌷", "🎉", "🎊", "🎁", "🎀", "🎈", "✨", "🌟", "⭐",
    "🎌", "🏳️", "🏴", "🏁", "🚩", "🎏", "🎆", "🎇", "🧨", "🪅", "🪩", "🎪", "🎭", "❤️", "💖", "💝",
    "💫", "🔥", "🌈", "☀️", "🎯", "🏆", "🥇", "🥈", "🥉", "👑", "💎", "💰", "🎨",
];

pub const FIREWORK_COLORS: &[&str] = &[
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F8C471", "#82E0AA", "#F1948A", "#85C1E9", "#D7BDE2",
];

pub const CONFETTI_COLORS: &[&str] = &[
    "#2196f3", "#03a9f4", "#00bcd4", "#4caf50", "#9c27b0", "#ff9800", "#e91e63",
];

/// Icon thrown in from a corner, drifting to a resting point.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingIcon {
    pub id: u64,
    pub glyph: &'static str,
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub duration_secs: f32,
    pub delay_secs: f32,
}

/// Icon settling into the pile after the draw completes.
#[derive(Debug, Clone, PartialEq)]
pub struct FallenIcon {
    pub id: u64,
    pub glyph: &'static str,
    pub x: f32,
    /// Final resting height, measured from the top of the container.
    pub rest_y: f32,
    pub mid_rotation_deg: f32,
    pub final_rotation_deg: f32,
    pub scale: f32,
    pub opacity: f32,
    pub delay_secs: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiPiece {
    pub id: u64,
    pub x: f32,
    pub color: &'static str,
    pub fall_secs: f32,
    pub delay_secs: f32,
    pub round: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FireworkBurst {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: &'static str,
    /// Near bursts are bigger, sharper and more opaque.
    pub near: bool,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FireworkParticle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: &'static str,
    pub offset_x: f32,
    pub offset_y: f32,
    pub duration_secs: f32,
    pub delay_secs: f32,
    pub near: bool,
    pub expires_at: Instant,
}

/// The ephemeral animation session's object lists.
///
/// Ids increase monotonically per kind and never reset, so a renderer can
/// treat them as stable keys across frames.
#[derive(Debug, Default)]
pub struct Scene {
    pub floating: Vec<FloatingIcon>,
    pub fallen: Vec<FallenIcon>,
    pub confetti: Vec<ConfettiPiece>,
    pub fireworks: Vec<FireworkBurst>,
    pub particles: Vec<FireworkParticle>,
    next_icon_id: u64,
    next_confetti_id: u64,
    next_firework_id: u64,
    next_particle_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.floating.is_empty()
            && self.fallen.is_empty()
            && self.confetti.is_empty()
            && self.fireworks.is_empty()
            && self.particles.is_empty()
    }

    /// Floating icons clear separately: they linger through the settle
    /// animation and are dropped a moment after the pile forms.
    pub fn clear_floating(&mut self) {
        self.floating.clear();
    }

    pub fn clear_all(&mut self) {
        self.floating.clear();
        self.fallen.clear();
        self.confetti.clear();
        self.fireworks.clear();
        self.particles.clear();
    }

    /// Drop bursts and particles whose declared lifetime has elapsed.
    pub fn prune(&mut self, now: Instant) {
        self.fireworks.retain(|f| f.expires_at > now);
        self.particles.retain(|p| p.expires_at > now);
    }

    fn next_icon_id(&mut self) -> u64 {
        let id = self.next_icon_id;
        self.next_icon_id += 1;
        id
    }

    fn next_confetti_id(&mut self) -> u64 {
        let id = self.next_confetti_id;
        self.next_confetti_id += 1;
        id
    }

    fn next_firework_id(&mut self) -> u64 {
        let id = self.next_firework_id;
        self.next_firework_id += 1;
        id
    }

    fn next_particle_id(&mut self) -> u64 {
        let id = self.next_particle_id;
        self.next_particle_id += 1;
        id
    }
}
