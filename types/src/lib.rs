//! Shared configuration types for the Tombola draw widget.
//!
//! These types cross the boundary between the widget core and the host
//! dashboard surface: the identifier bundle the operator configures, the
//! dashboard mode signal, and the host's field-type codes used to filter
//! which fields are selectable for each role.

use serde::{Deserialize, Serialize};

/// The operator-chosen identifiers the widget runs on.
///
/// All five are opaque ids handed out by the host table API. The bundle is
/// replaced wholesale on save or when the host pushes a configuration
/// change; it is never patched field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawConfig {
    /// Table holding the prize records.
    pub table_id: String,
    /// Plain-text field with the prize name.
    pub prize_name_field_id: String,
    /// Single-select field with the award tier.
    pub award_field_id: String,
    /// Checkbox field marking the one confirmed record.
    pub confirm_field_id: String,
    /// Single-select field driving the animation state.
    pub status_field_id: String,
}

impl DrawConfig {
    /// The poller only runs once every identifier has been configured.
    pub fn is_complete(&self) -> bool {
        !self.table_id.is_empty()
            && !self.prize_name_field_id.is_empty()
            && !self.award_field_id.is_empty()
            && !self.confirm_field_id.is_empty()
            && !self.status_field_id.is_empty()
    }
}

/// Host dashboard mode. Gates whether the configuration panel is shown
/// and whether the widget starts from defaults instead of saved config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardMode {
    /// Widget is being added to the dashboard for the first time.
    Create,
    /// Operator is editing an existing widget.
    Config,
    /// Read-only display.
    View,
}

impl DashboardMode {
    pub fn shows_config_panel(&self) -> bool {
        matches!(self, Self::Create | Self::Config)
    }

    /// In Create mode the widget starts from defaults rather than loading
    /// a saved configuration.
    pub fn starts_from_defaults(&self) -> bool {
        matches!(self, Self::Create)
    }
}

/// Field type codes as reported by the host table API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    SingleSelect,
    Checkbox,
    /// Any code we don't use for configuration.
    Unknown,
}

impl FieldType {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Text,
            3 => Self::SingleSelect,
            7 => Self::Checkbox,
            _ => Self::Unknown,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Text => Some(1),
            Self::SingleSelect => Some(3),
            Self::Checkbox => Some(7),
            Self::Unknown => None,
        }
    }
}

/// The role a field plays in the draw configuration. Each role restricts
/// which field types the configuration form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    PrizeName,
    Award,
    Confirm,
    Status,
}

impl FieldRole {
    pub fn accepts(&self, field_type: FieldType) -> bool {
        match self {
            Self::PrizeName => field_type == FieldType::Text,
            Self::Award | Self::Status => field_type == FieldType::SingleSelect,
            Self::Confirm => field_type == FieldType::Checkbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip_uses_host_key_names() {
        let json = r#"{
            "tableId": "T1",
            "prizeNameFieldId": "F_name",
            "awardFieldId": "F_award",
            "confirmFieldId": "F_confirm",
            "statusFieldId": "F_status"
        }"#;

        let config: DrawConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.table_id, "T1");
        assert_eq!(config.status_field_id, "F_status");
        assert!(config.is_complete());

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["confirmFieldId"], "F_confirm");
    }

    #[test]
    fn test_partial_config_is_incomplete() {
        let config: DrawConfig = serde_json::from_str(r#"{"tableId": "T1"}"#).unwrap();
        assert!(!config.is_complete());
        assert_eq!(config.award_field_id, "");
    }

    #[test]
    fn test_field_type_codes() {
        assert_eq!(FieldType::from_code(1), FieldType::Text);
        assert_eq!(FieldType::from_code(3), FieldType::SingleSelect);
        assert_eq!(FieldType::from_code(7), FieldType::Checkbox);
        assert_eq!(FieldType::from_code(42), FieldType::Unknown);
        assert_eq!(FieldType::Checkbox.code(), Some(7));
    }

    #[test]
    fn test_role_field_filtering() {
        assert!(FieldRole::PrizeName.accepts(FieldType::Text));
        assert!(!FieldRole::PrizeName.accepts(FieldType::SingleSelect));
        assert!(FieldRole::Award.accepts(FieldType::SingleSelect));
        assert!(FieldRole::Status.accepts(FieldType::SingleSelect));
        assert!(FieldRole::Confirm.accepts(FieldType::Checkbox));
        assert!(!FieldRole::Confirm.accepts(FieldType::Text));
    }

    #[test]
    fn test_dashboard_mode_gating() {
        assert!(DashboardMode::Create.shows_config_panel());
        assert!(DashboardMode::Config.shows_config_panel());
        assert!(!DashboardMode::View.shows_config_panel());
        assert!(DashboardMode::Create.starts_from_defaults());
        assert!(!DashboardMode::Config.starts_from_defaults());
    }
}
