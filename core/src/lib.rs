//! Tombola core: a status-driven draw-animation engine.
//!
//! The widget observes a host-provided table through [`host::TableProvider`],
//! reconciles the one confirmed record into a [`reconciler::DrawSnapshot`],
//! and drives an [`machine::AnimationDirector`] whose phase changes tell the
//! runtime which recurring animation timers to run. Rendering is out of
//! scope: the [`scene::Scene`] holds renderer-agnostic descriptors a host
//! renderer consumes.

pub mod host;
pub mod machine;
pub mod reconciler;
pub mod runtime;
pub mod scene;
pub mod status;


// Re-exports for convenience
pub use host::{ConfigChannel, HostError, TableProvider};
pub use machine::{AnimationDirector, Phase, StageSignal};
pub use reconciler::{AmbiguityPolicy, DrawSnapshot, PollResult, ReconcileError};
pub use runtime::{RuntimeCommand, WidgetHandle, WidgetRuntime};
pub use status::DrawStatus;
