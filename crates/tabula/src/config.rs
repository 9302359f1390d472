//! Model configuration.
//!
//! [`TableConfig`] carries the settings a consumer typically wants to fix up
//! front. It is `serde`-deserializable, so applications can keep it in their
//! own settings files; every field has a default.
//!
//! ```
//! use tabula::config::TableConfig;
//!
//! let config = TableConfig::default()
//!     .with_row_number_visible(true)
//!     .with_row_number_header("#");
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{DEFAULT_ROW_NUMBER_HEADER, validate_header};

/// Settings applied when a model is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Show the row-number column.
    pub row_number_visible: bool,
    /// Header text of the row-number column.
    pub row_number_header: String,
    /// Accumulate refresh requests until flushed.
    pub defer_refresh: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_number_visible: false,
            row_number_header: DEFAULT_ROW_NUMBER_HEADER.to_string(),
            defer_refresh: false,
        }
    }
}

impl TableConfig {
    /// Sets whether the row-number column is shown.
    pub fn with_row_number_visible(mut self, visible: bool) -> Self {
        self.row_number_visible = visible;
        self
    }

    /// Sets the row-number header text.
    pub fn with_row_number_header(mut self, header: impl Into<String>) -> Self {
        self.row_number_header = header.into();
        self
    }

    /// Sets whether refresh requests are batched.
    pub fn with_defer_refresh(mut self, defer: bool) -> Self {
        self.defer_refresh = defer;
        self
    }

    /// Checks the configuration for values the model cannot use.
    pub fn validate(&self) -> Result<()> {
        validate_header(&self.row_number_header)
            .map_err(|err| Error::config(format!("row_number_header: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert!(!config.row_number_visible);
        assert_eq!(config.row_number_header, DEFAULT_ROW_NUMBER_HEADER);
        assert!(!config.defer_refresh);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config: TableConfig = toml::from_str("row_number_visible = true").unwrap();
        assert!(config.row_number_visible);
        assert_eq!(config.row_number_header, DEFAULT_ROW_NUMBER_HEADER);
    }

    #[test]
    fn test_from_toml_full() {
        let config: TableConfig = toml::from_str(
            r##"
            row_number_visible = true
            row_number_header = "#"
            defer_refresh = true
            "##,
        )
        .unwrap();
        assert_eq!(
            config,
            TableConfig::default()
                .with_row_number_visible(true)
                .with_row_number_header("#")
                .with_defer_refresh(true)
        );
    }

    #[test]
    fn test_toml_roundtrip_preserves_fields() {
        let config = TableConfig::default().with_defer_refresh(true);
        let text = toml::to_string(&config).unwrap();
        let back: TableConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validate_rejects_blank_header() {
        let config = TableConfig::default().with_row_number_header("  ");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
