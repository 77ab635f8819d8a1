//! Status poller and reconciler.
//!
//! Each poll cycle scans every record of the configured table, counts the
//! records whose confirm checkbox is exactly `true`, and reduces the scan
//! to a [`PollResult`]. [`DrawSnapshot`] is the explicit state holder the
//! result is reconciled into; it owns the freeze-on-ambiguity rules so the
//! display never flickers on bad data.

use chrono::NaiveDateTime;
use thiserror::Error;
use tombola_types::DrawConfig;

use crate::host::{CellValue, HostError, TableProvider};

/// Outcome of one poll cycle over the configured table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollResult {
    /// Records with the confirm checkbox set to boolean `true`.
    pub match_count: usize,
    pub prize_text: String,
    pub award_text: String,
    pub status_text: String,
    pub record_id: String,
    pub polled_at: Option<NaiveDateTime>,
}

/// Reconciliation errors surfaced to the operator. Neither is fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("no confirmed record found")]
    NoConfirmedRecord,
    #[error("multiple confirmed records found ({count}); exactly one may be checked")]
    MultipleConfirmedRecords { count: usize },
}

/// What happens to the reconciled status while more than one record is
/// confirmed. Prize and award are always frozen during ambiguity; whether
/// the status keeps tracking is a policy choice, and freezing everything
/// is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Freeze prize, award and status until the ambiguity is resolved.
    #[default]
    FreezeAll,
    /// Freeze prize and award but keep tracking the status field.
    TrackStatus,
}

/// Last-good reconciled state. All mutation goes through [`apply`].
///
/// [`apply`]: DrawSnapshot::apply
#[derive(Debug, Clone, Default)]
pub struct DrawSnapshot {
    pub current_prize: String,
    pub current_award: String,
    pub server_status: String,
    pub record_id: String,
    pub error: Option<ReconcileError>,
    pub ambiguity_policy: AmbiguityPolicy,
}

impl DrawSnapshot {
    pub fn with_policy(policy: AmbiguityPolicy) -> Self {
        Self {
            ambiguity_policy: policy,
            ..Self::default()
        }
    }

    /// Reconcile one poll result into the snapshot.
    ///
    /// - zero matches: display values clear, error raised
    /// - one match: display values replaced, error cleared
    /// - more than one: previous display values are retained; which values
    ///   keep tracking is governed by [`AmbiguityPolicy`]
    pub fn apply(&mut self, result: &PollResult) {
        match result.match_count {
            0 => {
                self.current_prize.clear();
                self.current_award.clear();
                self.server_status.clear();
                self.record_id.clear();
                self.error = Some(ReconcileError::NoConfirmedRecord);
            }
            1 => {
                self.current_prize = result.prize_text.clone();
                self.current_award = result.award_text.clone();
                self.server_status = result.status_text.clone();
                self.record_id = result.record_id.clone();
                self.error = None;
            }
            count => {
                if self.ambiguity_policy == AmbiguityPolicy::TrackStatus
                    && !result.status_text.is_empty()
                    && result.status_text != self.server_status
                {
                    self.server_status = result.status_text.clone();
                }
                self.error = Some(ReconcileError::MultipleConfirmedRecords { count });
            }
        }
    }
}

/// Scan the configured table for confirmed records and read the display
/// cells of the first match. Purely observational; any host error aborts
/// the cycle and is retried on the next tick.
pub async fn scan_confirmed(
    provider: &dyn TableProvider,
    config: &DrawConfig,
) -> Result<PollResult, HostError> {
    let mut result = PollResult {
        polled_at: Some(chrono::Local::now().naive_local()),
        ..PollResult::default()
    };

    let record_ids = provider.list_records(&config.table_id).await?;
    for record_id in record_ids {
        let confirm = provider
            .cell_value(&config.table_id, &record_id, &config.confirm_field_id)
            .await?;
        if confirm != CellValue::Bool(true) {
            continue;
        }

        result.match_count += 1;
        if result.match_count > 1 {
            continue;
        }

        // First match populates the display cells
        result.record_id = record_id.clone();
        let prize = provider
            .cell_value(&config.table_id, &record_id, &config.prize_name_field_id)
            .await?;
        result.prize_text = display_text(&prize);

        let award = provider
            .cell_value(&config.table_id, &record_id, &config.award_field_id)
            .await?;
        result.award_text = option_label(&award);

        if !config.status_field_id.is_empty() {
            let status = provider
                .cell_value(&config.table_id, &record_id, &config.status_field_id)
                .await?;
            result.status_text = option_label(&status);
        }
    }

    Ok(result)
}

// ─────────────────────────────────────────────────────────────────────────────
// Cell value extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Best textual representation of a prize-name cell.
///
/// Handles the shapes the host emits for text-ish fields: plain string,
/// array of strings, array of objects with text/name/value, and a plain
/// object with text/name/value. First non-empty representation wins; the
/// fallback is the JSON-stringified value.
pub fn display_text(value: &CellValue) -> String {
    match value {
        CellValue::String(s) => s.clone(),
        CellValue::Array(items) => match items.first() {
            Some(CellValue::String(s)) => s.clone(),
            Some(obj @ CellValue::Object(_)) => object_text(obj),
            Some(other) => plain_text(other),
            None => String::new(),
        },
        obj @ CellValue::Object(_) => object_text(obj),
        other => plain_text(other),
    }
}

/// Label of a single-select cell: the `text` or `name` member of the
/// option object, default empty.
pub fn option_label(value: &CellValue) -> String {
    if let CellValue::Object(map) = value {
        for key in ["text", "name"] {
            if let Some(CellValue::String(s)) = map.get(key)
                && !s.is_empty()
            {
                return s.clone();
            }
        }
    }
    String::new()
}

/// text/name/value members of an object, then JSON stringify.
fn object_text(value: &CellValue) -> String {
    if let CellValue::Object(map) = value {
        for key in ["text", "name", "value"] {
            if let Some(CellValue::String(s)) = map.get(key)
                && !s.is_empty()
            {
                return s.clone();
            }
        }
    }
    serde_json::to_string(value).unwrap_or_default()
}

fn plain_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Bool(b) => {
            if *b {
                "true".to_string()
            } else {
                String::new()
            }
        }
        CellValue::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryBase;
    use serde_json::json;
    use tombola_types::FieldType;

    fn test_config() -> DrawConfig {
        DrawConfig {
            table_id: "T1".to_string(),
            prize_name_field_id: "F_name".to_string(),
            award_field_id: "F_award".to_string(),
            confirm_field_id: "F1".to_string(),
            status_field_id: "F_status".to_string(),
        }
    }

    fn seeded_base() -> MemoryBase {
        let base = MemoryBase::new();
        base.add_table("T1", "Prizes");
        base.add_field("T1", "F1", "Confirmed", FieldType::Checkbox);
        base.add_field("T1", "F_name", "Prize", FieldType::Text);
        base.add_field("T1", "F_award", "Award", FieldType::SingleSelect);
        base.add_field("T1", "F_status", "Status", FieldType::SingleSelect);
        base
    }

    fn add_prize_record(base: &MemoryBase, id: &str, confirmed: bool, prize: CellValue) {
        base.add_record(
            "T1",
            id,
            vec![
                ("F1", json!(confirmed)),
                ("F_name", prize),
                ("F_award", json!({"id": "opt1", "text": "一等奖"})),
                ("F_status", json!({"id": "opt2", "text": "准备中"})),
            ],
        );
    }

    // ── display_text shapes ──────────────────────────────────────────────────

    #[test]
    fn test_display_text_plain_string() {
        assert_eq!(display_text(&json!("Gift Card")), "Gift Card");
    }

    #[test]
    fn test_display_text_array_of_strings() {
        assert_eq!(display_text(&json!(["Gift Card", "ignored"])), "Gift Card");
    }

    #[test]
    fn test_display_text_array_of_objects() {
        assert_eq!(
            display_text(&json!([{"type": "text", "text": "Gift Card"}])),
            "Gift Card"
        );
        assert_eq!(display_text(&json!([{"name": "Gift Card"}])), "Gift Card");
    }

    #[test]
    fn test_display_text_plain_object_and_fallback() {
        assert_eq!(display_text(&json!({"value": "Gift Card"})), "Gift Card");
        // No known member: JSON-stringified representation
        assert_eq!(display_text(&json!({"weird": 1})), r#"{"weird":1}"#);
        assert_eq!(display_text(&CellValue::Null), "");
    }

    #[test]
    fn test_option_label() {
        assert_eq!(option_label(&json!({"id": "o", "text": "一等奖"})), "一等奖");
        assert_eq!(option_label(&json!({"name": "一等奖"})), "一等奖");
        assert_eq!(option_label(&json!("bare string")), "");
        assert_eq!(option_label(&CellValue::Null), "");
    }

    // ── scan + snapshot reconciliation ───────────────────────────────────────

    #[tokio::test]
    async fn test_single_confirmed_record_populates_result() {
        let base = seeded_base();
        add_prize_record(&base, "R1", false, json!("Plush Toy"));
        add_prize_record(&base, "R2", true, json!("Gift Card"));
        add_prize_record(&base, "R3", false, json!("Mug"));

        let result = scan_confirmed(&base, &test_config()).await.unwrap();
        assert_eq!(result.match_count, 1);
        assert_eq!(result.prize_text, "Gift Card");
        assert_eq!(result.award_text, "一等奖");
        assert_eq!(result.status_text, "准备中");
        assert_eq!(result.record_id, "R2");

        let mut snapshot = DrawSnapshot::default();
        snapshot.apply(&result);
        assert_eq!(snapshot.current_prize, "Gift Card");
        assert_eq!(snapshot.server_status, "准备中");
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_each_prize_value_shape_reconciles_to_same_text() {
        let shapes = [
            json!("Gift Card"),
            json!(["Gift Card"]),
            json!([{"type": "text", "text": "Gift Card"}]),
            json!({"text": "Gift Card"}),
        ];
        for shape in shapes {
            let base = seeded_base();
            add_prize_record(&base, "R1", true, shape);
            let result = scan_confirmed(&base, &test_config()).await.unwrap();
            assert_eq!(result.prize_text, "Gift Card");
        }
    }

    #[tokio::test]
    async fn test_zero_matches_clears_and_raises_error() {
        let base = seeded_base();
        add_prize_record(&base, "R1", false, json!("Gift Card"));

        let mut snapshot = DrawSnapshot::default();
        snapshot.current_prize = "Old Prize".to_string();
        snapshot.server_status = "准备中".to_string();

        let result = scan_confirmed(&base, &test_config()).await.unwrap();
        assert_eq!(result.match_count, 0);

        snapshot.apply(&result);
        assert_eq!(snapshot.current_prize, "");
        assert_eq!(snapshot.current_award, "");
        assert_eq!(snapshot.server_status, "");
        assert_eq!(snapshot.record_id, "");
        assert_eq!(snapshot.error, Some(ReconcileError::NoConfirmedRecord));
    }

    #[tokio::test]
    async fn test_multiple_matches_freeze_previous_values() {
        let base = seeded_base();
        add_prize_record(&base, "R1", true, json!("Gift Card"));

        let mut snapshot = DrawSnapshot::default();
        let result = scan_confirmed(&base, &test_config()).await.unwrap();
        snapshot.apply(&result);
        assert_eq!(snapshot.current_prize, "Gift Card");

        // Operator checks a second record; reconciled values must not move
        add_prize_record(&base, "R2", true, json!("Mug"));
        base.set_cell("T1", "R1", "F_status", json!({"text": "已就绪"}));

        let result = scan_confirmed(&base, &test_config()).await.unwrap();
        assert_eq!(result.match_count, 2);
        snapshot.apply(&result);
        assert_eq!(snapshot.current_prize, "Gift Card");
        assert_eq!(snapshot.current_award, "一等奖");
        assert_eq!(snapshot.server_status, "准备中");
        assert_eq!(
            snapshot.error,
            Some(ReconcileError::MultipleConfirmedRecords { count: 2 })
        );
    }

    #[tokio::test]
    async fn test_track_status_policy_advances_status_during_ambiguity() {
        let base = seeded_base();
        add_prize_record(&base, "R1", true, json!("Gift Card"));

        let mut snapshot = DrawSnapshot::with_policy(AmbiguityPolicy::TrackStatus);
        let result = scan_confirmed(&base, &test_config()).await.unwrap();
        snapshot.apply(&result);

        add_prize_record(&base, "R2", true, json!("Mug"));
        base.set_cell("T1", "R1", "F_status", json!({"text": "已就绪"}));

        let result = scan_confirmed(&base, &test_config()).await.unwrap();
        snapshot.apply(&result);
        assert_eq!(snapshot.current_prize, "Gift Card"); // still frozen
        assert_eq!(snapshot.server_status, "已就绪"); // but status tracks
        assert!(snapshot.error.is_some());
    }

    #[tokio::test]
    async fn test_unset_confirm_cells_do_not_match() {
        let base = seeded_base();
        // Record with no confirm cell at all
        base.add_record("T1", "R1", vec![("F_name", json!("Gift Card"))]);
        // Truthy-but-not-boolean confirm value must not match either
        base.add_record(
            "T1",
            "R2",
            vec![("F1", json!("true")), ("F_name", json!("Mug"))],
        );

        let result = scan_confirmed(&base, &test_config()).await.unwrap();
        assert_eq!(result.match_count, 0);
    }

    #[tokio::test]
    async fn test_missing_table_surfaces_host_error() {
        let base = MemoryBase::new();
        let err = scan_confirmed(&base, &test_config()).await.unwrap_err();
        assert!(matches!(err, HostError::TableNotFound(_)));
    }
}
