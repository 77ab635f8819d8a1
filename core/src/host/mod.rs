//! Host platform seam.
//!
//! The dashboard surface hands the widget two asynchronous collaborators:
//! a table API for reading records and a configuration channel for the
//! saved `customConfig` payload. Both are traits here so tests and demos
//! can run against the in-memory fakes in [`memory`]; a production adapter
//! wraps the real host binding.

pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tombola_types::{DrawConfig, FieldType};

pub use memory::{MemoryBase, MemoryConfigChannel};

/// Raw cell value as the host reports it: text, boolean, array or object.
pub type CellValue = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub id: String,
    pub name: String,
    pub field_type: FieldType,
}

/// One record's cells, keyed by field id. Unset cells are absent.
#[derive(Debug, Clone, Default)]
pub struct RecordData {
    pub id: String,
    pub cells: HashMap<String, CellValue>,
}

/// Errors surfaced by the host table API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("field not found: {0}")]
    FieldNotFound(String),
    #[error("record not found: {0}")]
    RecordNotFound(String),
    /// Transient host failure (network hiccup, SDK bridge not ready).
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the host's table store.
///
/// The widget never mutates the table; every method is an observation that
/// may fail transiently and is retried on the next poll tick.
#[async_trait]
pub trait TableProvider: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<TableInfo>, HostError>;

    async fn list_fields(&self, table_id: &str) -> Result<Vec<FieldInfo>, HostError>;

    /// Record ids in table order.
    async fn list_records(&self, table_id: &str) -> Result<Vec<String>, HostError>;

    /// A single cell's value. Unset cells read as `Value::Null`.
    async fn cell_value(
        &self,
        table_id: &str,
        record_id: &str,
        field_id: &str,
    ) -> Result<CellValue, HostError>;
}

/// The host's dashboard configuration API.
///
/// The payload is untrusted JSON: recover a [`DrawConfig`] from it with
/// [`validated_config`], never by deserializing it directly.
#[async_trait]
pub trait ConfigChannel: Send + Sync {
    async fn get_config(&self) -> Result<CellValue, HostError>;

    async fn save_config(&self, custom_config: CellValue) -> Result<(), HostError>;

    /// Change notifications. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> watch::Receiver<CellValue>;
}

/// Recover a configuration from an untrusted `customConfig` payload.
///
/// Per-field coercion: a key that is missing or not a string falls back to
/// the default empty id instead of failing the whole payload.
pub fn validated_config(payload: &CellValue) -> DrawConfig {
    fn string_field(payload: &CellValue, key: &str) -> String {
        match payload.get(key) {
            Some(CellValue::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    DrawConfig {
        table_id: string_field(payload, "tableId"),
        prize_name_field_id: string_field(payload, "prizeNameFieldId"),
        award_field_id: string_field(payload, "awardFieldId"),
        confirm_field_id: string_field(payload, "confirmFieldId"),
        status_field_id: string_field(payload, "statusFieldId"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validated_config_accepts_well_formed_payload() {
        let payload = json!({
            "tableId": "T1",
            "prizeNameFieldId": "F1",
            "awardFieldId": "F2",
            "confirmFieldId": "F3",
            "statusFieldId": "F4",
        });
        let config = validated_config(&payload);
        assert!(config.is_complete());
        assert_eq!(config.table_id, "T1");
    }

    #[test]
    fn test_validated_config_coerces_wrong_types_per_field() {
        // One bad field must not poison the others.
        let payload = json!({
            "tableId": "T1",
            "prizeNameFieldId": 42,
            "awardFieldId": null,
            "confirmFieldId": "F3",
            "statusFieldId": ["F4"],
        });
        let config = validated_config(&payload);
        assert_eq!(config.table_id, "T1");
        assert_eq!(config.confirm_field_id, "F3");
        assert_eq!(config.prize_name_field_id, "");
        assert_eq!(config.award_field_id, "");
        assert_eq!(config.status_field_id, "");
        assert!(!config.is_complete());
    }

    #[test]
    fn test_validated_config_of_non_object_payload_is_default() {
        assert_eq!(validated_config(&CellValue::Null), DrawConfig::default());
        assert_eq!(validated_config(&json!("garbage")), DrawConfig::default());
    }
}
