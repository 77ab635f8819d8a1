//! In-memory fakes for the host seam.
//!
//! `MemoryBase` backs tests and the demo with a tiny table store whose
//! cells can be flipped at runtime, simulating an operator editing the
//! base while the widget polls.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;
use tombola_types::FieldType;

use super::{CellValue, ConfigChannel, FieldInfo, HostError, RecordData, TableInfo, TableProvider};

#[derive(Debug)]
struct TableData {
    info: TableInfo,
    fields: Vec<FieldInfo>,
    records: Vec<RecordData>,
}

/// In-memory table store. Insertion order is table order.
#[derive(Debug, Default)]
pub struct MemoryBase {
    tables: Mutex<Vec<TableData>>,
}

impl MemoryBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&self, id: &str, name: &str) {
        self.tables.lock().unwrap().push(TableData {
            info: TableInfo {
                id: id.to_string(),
                name: name.to_string(),
            },
            fields: Vec::new(),
            records: Vec::new(),
        });
    }

    pub fn add_field(&self, table_id: &str, field_id: &str, name: &str, field_type: FieldType) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(table) = tables.iter_mut().find(|t| t.info.id == table_id) {
            table.fields.push(FieldInfo {
                id: field_id.to_string(),
                name: name.to_string(),
                field_type,
            });
        }
    }

    pub fn add_record(&self, table_id: &str, record_id: &str, cells: Vec<(&str, CellValue)>) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(table) = tables.iter_mut().find(|t| t.info.id == table_id) {
            table.records.push(RecordData {
                id: record_id.to_string(),
                cells: cells
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            });
        }
    }

    /// Overwrite one cell, as an operator edit would.
    pub fn set_cell(&self, table_id: &str, record_id: &str, field_id: &str, value: CellValue) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(table) = tables.iter_mut().find(|t| t.info.id == table_id)
            && let Some(record) = table.records.iter_mut().find(|r| r.id == record_id)
        {
            record.cells.insert(field_id.to_string(), value);
        }
    }
}

#[async_trait]
impl TableProvider for MemoryBase {
    async fn list_tables(&self) -> Result<Vec<TableInfo>, HostError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.info.clone())
            .collect())
    }

    async fn list_fields(&self, table_id: &str) -> Result<Vec<FieldInfo>, HostError> {
        let tables = self.tables.lock().unwrap();
        let table = tables
            .iter()
            .find(|t| t.info.id == table_id)
            .ok_or_else(|| HostError::TableNotFound(table_id.to_string()))?;
        Ok(table.fields.clone())
    }

    async fn list_records(&self, table_id: &str) -> Result<Vec<String>, HostError> {
        let tables = self.tables.lock().unwrap();
        let table = tables
            .iter()
            .find(|t| t.info.id == table_id)
            .ok_or_else(|| HostError::TableNotFound(table_id.to_string()))?;
        Ok(table.records.iter().map(|r| r.id.clone()).collect())
    }

    async fn cell_value(
        &self,
        table_id: &str,
        record_id: &str,
        field_id: &str,
    ) -> Result<CellValue, HostError> {
        let tables = self.tables.lock().unwrap();
        let table = tables
            .iter()
            .find(|t| t.info.id == table_id)
            .ok_or_else(|| HostError::TableNotFound(table_id.to_string()))?;
        if !table.fields.iter().any(|f| f.id == field_id) {
            return Err(HostError::FieldNotFound(field_id.to_string()));
        }
        let record = table
            .records
            .iter()
            .find(|r| r.id == record_id)
            .ok_or_else(|| HostError::RecordNotFound(record_id.to_string()))?;
        Ok(record.cells.get(field_id).cloned().unwrap_or(CellValue::Null))
    }
}

/// In-memory configuration channel backed by a watch channel.
#[derive(Debug)]
pub struct MemoryConfigChannel {
    tx: watch::Sender<CellValue>,
}

impl MemoryConfigChannel {
    pub fn new(initial: CellValue) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }
}

impl Default for MemoryConfigChannel {
    fn default() -> Self {
        Self::new(CellValue::Null)
    }
}

#[async_trait]
impl ConfigChannel for MemoryConfigChannel {
    async fn get_config(&self) -> Result<CellValue, HostError> {
        Ok(self.tx.borrow().clone())
    }

    async fn save_config(&self, custom_config: CellValue) -> Result<(), HostError> {
        // send_replace keeps working even with no live subscribers
        self.tx.send_replace(custom_config);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<CellValue> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded_base() -> MemoryBase {
        let base = MemoryBase::new();
        base.add_table("T1", "Prizes");
        base.add_field("T1", "F_confirm", "Confirmed", FieldType::Checkbox);
        base.add_field("T1", "F_name", "Prize", FieldType::Text);
        base.add_record(
            "T1",
            "R1",
            vec![("F_confirm", json!(true)), ("F_name", json!("Gift Card"))],
        );
        base
    }

    #[tokio::test]
    async fn test_cell_reads_and_unset_cells() {
        let base = seeded_base();
        base.add_record("T1", "R2", vec![]);

        let v = base.cell_value("T1", "R1", "F_name").await.unwrap();
        assert_eq!(v, json!("Gift Card"));

        // Unset cell reads as null, not an error
        let v = base.cell_value("T1", "R2", "F_name").await.unwrap();
        assert_eq!(v, CellValue::Null);
    }

    #[tokio::test]
    async fn test_missing_table_field_and_record_errors() {
        let base = seeded_base();
        assert!(matches!(
            base.list_records("nope").await,
            Err(HostError::TableNotFound(_))
        ));
        assert!(matches!(
            base.cell_value("T1", "R1", "nope").await,
            Err(HostError::FieldNotFound(_))
        ));
        assert!(matches!(
            base.cell_value("T1", "nope", "F_name").await,
            Err(HostError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_cell_is_visible_to_later_reads() {
        let base = seeded_base();
        base.set_cell("T1", "R1", "F_confirm", json!(false));
        let v = base.cell_value("T1", "R1", "F_confirm").await.unwrap();
        assert_eq!(v, json!(false));
    }

    #[tokio::test]
    async fn test_config_channel_notifies_subscribers() {
        let channel = MemoryConfigChannel::default();
        let mut rx = channel.subscribe();
        channel.save_config(json!({"tableId": "T1"})).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow()["tableId"], "T1");
        assert_eq!(channel.get_config().await.unwrap()["tableId"], "T1");
    }
}
