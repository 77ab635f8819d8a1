//! Widget runtime.
//!
//! One task owns the whole widget: the poll loop, the animation timers and
//! the shared state live in a single `select!` loop, so poll cycles are
//! serialized and a slow host can never interleave two scans. Everything
//! the embedding surface needs goes through [`WidgetHandle`].

use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, RwLock};
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};
use tombola_types::{DashboardMode, DrawConfig, FieldRole};
use tracing::{debug, warn};

use crate::host::{
    validated_config, CellValue, ConfigChannel, FieldInfo, TableInfo, TableProvider,
};
use crate::machine::{
    AnimationDirector, StageSignal, FIREWORK_PERIOD, REBURST_PERIOD, SETTLE_CLEAR_DELAY,
};
use crate::reconciler::{scan_confirmed, DrawSnapshot};
use crate::scene::Viewport;
use crate::status::{poll_interval, SLOW_POLL};

/// Control messages from the embedding surface to the runtime task.
#[derive(Debug)]
pub enum RuntimeCommand {
    /// The saved configuration payload changed.
    ConfigChanged(CellValue),
    /// The widget container was resized.
    SetViewport(Viewport),
    Shutdown,
}

/// State shared between the runtime task and the embedding surface.
#[derive(Debug)]
pub struct SharedState {
    pub config: RwLock<DrawConfig>,
    pub snapshot: RwLock<DrawSnapshot>,
    pub director: RwLock<AnimationDirector>,
}

/// Cloneable handle to a running [`WidgetRuntime`].
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    cmd_tx: mpsc::Sender<RuntimeCommand>,
    shared: Arc<SharedState>,
}

impl WidgetHandle {
    pub async fn update_config(&self, payload: CellValue) -> Result<(), String> {
        self.cmd_tx
            .send(RuntimeCommand::ConfigChanged(payload))
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn set_viewport(&self, viewport: Viewport) -> Result<(), String> {
        self.cmd_tx
            .send(RuntimeCommand::SetViewport(viewport))
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn shutdown(&self) -> Result<(), String> {
        self.cmd_tx
            .send(RuntimeCommand::Shutdown)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn config(&self) -> DrawConfig {
        self.shared.config.read().await.clone()
    }

    pub async fn snapshot(&self) -> DrawSnapshot {
        self.shared.snapshot.read().await.clone()
    }

    /// Read access to the animation state, for render passes.
    pub async fn with_director<R>(&self, f: impl FnOnce(&AnimationDirector) -> R) -> R {
        let director = self.shared.director.read().await;
        f(&director)
    }
}

/// The widget's driving task. Construct, optionally attach a configuration
/// channel, then `tokio::spawn(runtime.run())`.
pub struct WidgetRuntime {
    provider: Arc<dyn TableProvider>,
    shared: Arc<SharedState>,
    cmd_rx: mpsc::Receiver<RuntimeCommand>,
    config_rx: Option<watch::Receiver<CellValue>>,
}

impl WidgetRuntime {
    pub fn new(provider: Arc<dyn TableProvider>, viewport: Viewport) -> (Self, WidgetHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let shared = Arc::new(SharedState {
            config: RwLock::new(DrawConfig::default()),
            snapshot: RwLock::new(DrawSnapshot::default()),
            director: RwLock::new(AnimationDirector::new(viewport)),
        });
        let handle = WidgetHandle {
            cmd_tx,
            shared: Arc::clone(&shared),
        };
        let runtime = Self {
            provider,
            shared,
            cmd_rx,
            config_rx: None,
        };
        (runtime, handle)
    }

    /// Follow the host's saved-configuration notifications.
    pub fn with_config_channel(mut self, channel: &dyn ConfigChannel) -> Self {
        self.config_rx = Some(channel.subscribe());
        self
    }

    pub async fn run(self) {
        let WidgetRuntime {
            provider,
            shared,
            mut cmd_rx,
            mut config_rx,
        } = self;

        // Cadence follows the reconciled status; nothing reconciled yet
        let mut poll_period = SLOW_POLL;
        let mut poll_tick = interval_at(Instant::now() + poll_period, poll_period);
        poll_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Recurring animation timers exist only while the draw runs
        let mut firework_tick: Option<Interval> = None;
        let mut reburst_tick: Option<Interval> = None;
        let mut settle: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(RuntimeCommand::ConfigChanged(payload)) => {
                        apply_config(&shared, payload).await;
                    }
                    Some(RuntimeCommand::SetViewport(viewport)) => {
                        shared.director.write().await.set_viewport(viewport);
                    }
                    Some(RuntimeCommand::Shutdown) | None => break,
                },

                changed = config_changed(config_rx.as_mut()) => {
                    if changed {
                        let payload = config_rx
                            .as_ref()
                            .map(|rx| rx.borrow().clone())
                            .unwrap_or(CellValue::Null);
                        apply_config(&shared, payload).await;
                    } else {
                        // Channel closed; keep running on the last config
                        config_rx = None;
                    }
                }

                _ = poll_tick.tick() => {
                    let signals = poll_cycle(provider.as_ref(), &shared).await;
                    for signal in signals {
                        match signal {
                            StageSignal::DrawStarted => {
                                firework_tick = Some(recurring(FIREWORK_PERIOD));
                                reburst_tick = Some(recurring(REBURST_PERIOD));
                                settle = None;
                            }
                            StageSignal::DrawRevealed => {
                                firework_tick = None;
                                reburst_tick = None;
                                settle = Some(Box::pin(sleep(SETTLE_CLEAR_DELAY)));
                            }
                            StageSignal::SceneReset => {
                                firework_tick = None;
                                reburst_tick = None;
                                settle = None;
                            }
                            StageSignal::ReadyShown | StageSignal::ReadyHidden => {}
                        }
                    }

                    let desired = poll_interval(&shared.snapshot.read().await.server_status);
                    if desired != poll_period {
                        debug!(period_ms = desired.as_millis() as u64, "poll cadence changed");
                        poll_period = desired;
                        poll_tick = interval_at(Instant::now() + desired, desired);
                        poll_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    }
                }

                _ = tick(firework_tick.as_mut()) => {
                    let now = Instant::now().into_std();
                    shared.director.write().await.spawn_firework(now);
                }

                _ = tick(reburst_tick.as_mut()) => {
                    shared.director.write().await.reburst_icons();
                }

                _ = elapse(settle.as_mut()) => {
                    shared.director.write().await.finish_settling();
                    settle = None;
                }
            }
        }
        debug!("widget runtime stopped");
    }
}

/// First tick fires one full period from now, never immediately; a freshly
/// swapped interval must not double-fire.
fn recurring(period: std::time::Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn elapse(sleep: Option<&mut Pin<Box<Sleep>>>) {
    match sleep {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn config_changed(rx: Option<&mut watch::Receiver<CellValue>>) -> bool {
    match rx {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

async fn apply_config(shared: &SharedState, payload: CellValue) {
    let config = validated_config(&payload);
    debug!(
        table = %config.table_id,
        complete = config.is_complete(),
        "configuration replaced"
    );
    *shared.config.write().await = config;
}

/// One poll cycle: scan, reconcile, drive the animation.
async fn poll_cycle(provider: &dyn TableProvider, shared: &SharedState) -> Vec<StageSignal> {
    let config = shared.config.read().await.clone();
    if !config.is_complete() {
        return Vec::new();
    }

    match scan_confirmed(provider, &config).await {
        Ok(result) => {
            let status = {
                let mut snapshot = shared.snapshot.write().await;
                snapshot.apply(&result);
                snapshot.server_status.clone()
            };
            shared.director.write().await.apply_status(&status)
        }
        Err(e) => {
            warn!(error = %e, "poll cycle failed, retrying on next tick");
            Vec::new()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration surface helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration to start the widget from. Create mode always starts blank;
/// the other modes load the saved payload.
pub async fn initial_config(mode: DashboardMode, channel: &dyn ConfigChannel) -> DrawConfig {
    if mode.starts_from_defaults() {
        return DrawConfig::default();
    }
    match channel.get_config().await {
        Ok(payload) => validated_config(&payload),
        Err(e) => {
            warn!(error = %e, "failed to load saved configuration");
            DrawConfig::default()
        }
    }
}

/// Tables for the configuration form's table picker. A host failure logs
/// and yields an empty list; the form simply shows no choices yet.
pub async fn load_table_list(provider: &dyn TableProvider) -> Vec<TableInfo> {
    match provider.list_tables().await {
        Ok(tables) => tables,
        Err(e) => {
            warn!(error = %e, "failed to list tables");
            Vec::new()
        }
    }
}

/// Fields of the chosen table for the form's field pickers.
pub async fn load_field_list(provider: &dyn TableProvider, table_id: &str) -> Vec<FieldInfo> {
    match provider.list_fields(table_id).await {
        Ok(fields) => fields,
        Err(e) => {
            warn!(error = %e, table = table_id, "failed to list fields");
            Vec::new()
        }
    }
}

/// Fields a given form role may be bound to.
pub fn selectable_fields(fields: &[FieldInfo], role: FieldRole) -> Vec<&FieldInfo> {
    fields
        .iter()
        .filter(|f| role.accepts(f.field_type))
        .collect()
}
