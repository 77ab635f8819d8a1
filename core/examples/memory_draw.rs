//! Walks a draw through its whole lifecycle against the in-memory host.
//!
//! Run with `cargo run -p tombola-core --example memory_draw`.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;
use tracing::info;

use tombola_core::host::{ConfigChannel, MemoryBase, MemoryConfigChannel};
use tombola_core::runtime::{initial_config, WidgetRuntime};
use tombola_core::scene::Viewport;
use tombola_types::{DashboardMode, FieldType};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tombola_core=debug".into()),
        )
        .init();

    let base = Arc::new(MemoryBase::new());
    base.add_table("T1", "Prizes");
    base.add_field("T1", "F_confirm", "Confirmed", FieldType::Checkbox);
    base.add_field("T1", "F_name", "Prize", FieldType::Text);
    base.add_field("T1", "F_award", "Award", FieldType::SingleSelect);
    base.add_field("T1", "F_status", "Status", FieldType::SingleSelect);
    base.add_record(
        "T1",
        "R1",
        vec![
            ("F_confirm", json!(true)),
            ("F_name", json!("Espresso Machine")),
            ("F_award", json!({"id": "opt1", "text": "一等奖"})),
            ("F_status", json!({"id": "opt2", "text": "待开始"})),
        ],
    );

    let channel = MemoryConfigChannel::default();
    channel
        .save_config(json!({
            "tableId": "T1",
            "prizeNameFieldId": "F_name",
            "awardFieldId": "F_award",
            "confirmFieldId": "F_confirm",
            "statusFieldId": "F_status",
        }))
        .await?;

    let config = initial_config(DashboardMode::View, &channel).await;
    info!(table = %config.table_id, "starting widget");

    let (runtime, handle) = WidgetRuntime::new(base.clone(), Viewport::new(1024.0, 768.0));
    let runtime = runtime.with_config_channel(&channel);
    let task = tokio::spawn(runtime.run());
    handle.update_config(channel.get_config().await?).await?;

    for status in ["准备中", "已就绪", "已完成", "待开始"] {
        base.set_cell("T1", "R1", "F_status", json!({"text": status}));
        sleep(Duration::from_secs(3)).await;

        let snapshot = handle.snapshot().await;
        let (phase, floating, fallen) = handle
            .with_director(|d| {
                (
                    d.phase(),
                    d.scene().floating.len(),
                    d.scene().fallen.len(),
                )
            })
            .await;
        info!(
            status,
            prize = %snapshot.current_prize,
            award = %snapshot.current_award,
            ?phase,
            floating,
            fallen,
            "draw state"
        );
    }

    handle.shutdown().await?;
    task.await?;
    Ok(())
}
