//! Animation state machine.
//!
//! The director owns the animation lifecycle: Idle until a draw starts,
//! Drawing while the suspense animation runs, Revealed once the winner is
//! shown, back to Idle on the next reset. Transitions are edge-triggered
//! on the reconciled status text, so a repeated poll of the same value can
//! never double-fire a side effect. The director mutates the scene itself
//! and emits [`StageSignal`]s telling the runtime which recurring timers
//! to start or stop; it never owns a timer.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::scene::{Scene, Viewport};
use crate::status::DrawStatus;

/// Period of the recurring firework spawner while Drawing.
pub const FIREWORK_PERIOD: Duration = Duration::from_millis(300);
/// Period of the recurring thrown-icon re-burst while Drawing.
pub const REBURST_PERIOD: Duration = Duration::from_millis(12_000);
/// Delay before floating icons are dropped once the pile has settled.
pub const SETTLE_CLEAR_DELAY: Duration = Duration::from_millis(2_000);

/// Animation lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Drawing,
    Revealed,
}

/// Operator-facing status label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusLabel {
    #[default]
    Waiting,
    Drawing,
    Revealed,
}

/// Visual treatment of the status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Plain,
    /// Heartbeat pulse while the draw runs.
    Pulse,
    /// Celebratory glow on reveal.
    Glow,
}

impl StatusLabel {
    pub fn style(&self) -> LabelStyle {
        match self {
            Self::Waiting => LabelStyle::Plain,
            Self::Drawing => LabelStyle::Pulse,
            Self::Revealed => LabelStyle::Glow,
        }
    }
}

/// Side effects a transition asks the runtime to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSignal {
    /// Draw animation began: start both recurring timers.
    DrawStarted,
    /// Draw stopped and the pile is settling: cancel the recurring timers
    /// and schedule the floating-icon clear.
    DrawRevealed,
    /// Everything was cleared: cancel all timers.
    SceneReset,
    ReadyShown,
    ReadyHidden,
}

/// State holder for the animation lifecycle.
///
/// All the mutable animation state (last-applied status, the in-flight
/// guard, the scene) lives here behind controlled mutation methods rather
/// than as ambient globals.
#[derive(Debug)]
pub struct AnimationDirector {
    phase: Phase,
    label: StatusLabel,
    show_ready: bool,
    viewport: Viewport,
    scene: Scene,
    rng: StdRng,
    /// Last status text a transition was attempted for (edge trigger).
    last_applied: String,
    /// The transition handler is not reentrant-safe; a transition arriving
    /// while one is being applied is dropped.
    in_flight: bool,
}

impl AnimationDirector {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_seed(viewport, rand::random())
    }

    /// Deterministic construction for tests.
    pub fn with_seed(viewport: Viewport, seed: u64) -> Self {
        Self {
            phase: Phase::Idle,
            label: StatusLabel::Waiting,
            show_ready: false,
            viewport,
            scene: Scene::new(),
            rng: StdRng::seed_from_u64(seed),
            last_applied: String::new(),
            in_flight: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn label(&self) -> StatusLabel {
        self.label
    }

    pub fn show_ready(&self) -> bool {
        self.show_ready
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Apply a newly reconciled status text.
    ///
    /// Edge-triggered: the same text twice in a row is a no-op, as is any
    /// unrecognized text. Returns the side effects the runtime must apply.
    pub fn apply_status(&mut self, status_text: &str) -> Vec<StageSignal> {
        if status_text.is_empty() || status_text == self.last_applied {
            return Vec::new();
        }
        // A transition refused by the guard stays pending: last_applied is
        // recorded only once the guard admits it, so the next poll of the
        // same text retries.
        if self.in_flight {
            return Vec::new();
        }
        self.in_flight = true;
        self.last_applied = status_text.to_string();

        let signals = match DrawStatus::parse(status_text) {
            Some(DrawStatus::NotStarted) => self.reset(),
            Some(DrawStatus::Preparing) => self.start_draw(false),
            Some(DrawStatus::Ready) => self.start_draw(true),
            Some(DrawStatus::Completed) => self.finish_draw(),
            None => Vec::new(),
        };

        self.in_flight = false;
        signals
    }

    /// Full reset: clear every object list, back to Idle.
    fn reset(&mut self) -> Vec<StageSignal> {
        let mut signals = Vec::new();
        if self.show_ready {
            self.show_ready = false;
            signals.push(StageSignal::ReadyHidden);
        }
        if self.phase != Phase::Idle || !self.scene.is_empty() {
            self.scene.clear_all();
            self.phase = Phase::Idle;
            signals.push(StageSignal::SceneReset);
        }
        self.label = StatusLabel::Waiting;
        signals
    }

    /// Start the draw animation unless it is already running.
    fn start_draw(&mut self, ready: bool) -> Vec<StageSignal> {
        let mut signals = Vec::new();
        if self.phase != Phase::Drawing {
            self.scene.spawn_thrown_icons(self.viewport, &mut self.rng);
            self.scene.spawn_confetti_burst(self.viewport, &mut self.rng);
            self.phase = Phase::Drawing;
            signals.push(StageSignal::DrawStarted);
        }
        self.label = StatusLabel::Drawing;
        if ready != self.show_ready {
            self.show_ready = ready;
            signals.push(if ready {
                StageSignal::ReadyShown
            } else {
                StageSignal::ReadyHidden
            });
        }
        signals
    }

    /// Stop the draw: settle the icons into a pile. Only meaningful from
    /// Drawing; from anywhere else only the ready indicator is cleared.
    fn finish_draw(&mut self) -> Vec<StageSignal> {
        let mut signals = Vec::new();
        if self.phase == Phase::Drawing {
            self.scene.spawn_leaf_pile(self.viewport, &mut self.rng);
            self.phase = Phase::Revealed;
            self.label = StatusLabel::Revealed;
            signals.push(StageSignal::DrawRevealed);
        }
        if self.show_ready {
            self.show_ready = false;
            signals.push(StageSignal::ReadyHidden);
        }
        signals
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recurring timer entry points (called by the runtime)
    // ─────────────────────────────────────────────────────────────────────────

    /// One firework tick. Also prunes expired bursts.
    pub fn spawn_firework(&mut self, now: Instant) {
        if self.phase == Phase::Drawing {
            self.scene.spawn_firework(self.viewport, &mut self.rng, now);
        }
        self.scene.prune(now);
    }

    /// One re-burst tick: replace the floating icons with a fresh throw.
    pub fn reburst_icons(&mut self) {
        if self.phase == Phase::Drawing {
            self.scene.spawn_thrown_icons(self.viewport, &mut self.rng);
        }
    }

    /// The settle delay elapsed: drop the floating icons, leaving the pile.
    pub fn finish_settling(&mut self) {
        if self.phase == Phase::Revealed {
            self.scene.clear_floating();
        }
    }
}
