//! Config validation: per-schema table descriptions and route name uniqueness.

use crate::config::ApiConfig;
use crate::error::ConfigError;
use crate::routes::RESERVED_PATH_CHARS;
use std::collections::HashSet;

pub fn validate(config: &ApiConfig) -> Result<(), ConfigError> {
    if let Some(root) = &config.root {
        if root.contains(RESERVED_PATH_CHARS) {
            return Err(ConfigError::Validation(format!("root {} has reserved path characters", root)));
        }
    }
    let mut names = HashSet::new();
    for s in &config.schemas {
        let name = s.name.to_lowercase();
        if name.is_empty() {
            return Err(ConfigError::EmptySchemaName);
        }
        if name.contains(RESERVED_PATH_CHARS) {
            return Err(ConfigError::Validation(format!(
                "schema name {} has reserved path characters",
                s.name
            )));
        }
        if !names.insert(name) {
            return Err(ConfigError::Validation(format!(
                "duplicate schema name: {}",
                s.name
            )));
        }
        if s.table.is_empty() {
            return Err(ConfigError::Validation(format!("schema {}: table is required", s.name)));
        }
        if s.columns.is_empty() {
            return Err(ConfigError::Validation(format!(
                "schema {}: at least one column required",
                s.name
            )));
        }
        let mut columns = HashSet::new();
        for c in &s.columns {
            if !columns.insert(c.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "schema {}: duplicate column {}",
                    s.name, c.name
                )));
            }
        }
        if let Some(order_by) = &s.order_by {
            if !columns.contains(order_by.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "schema {}: order_by column {} is not declared",
                    s.name, order_by
                )));
            }
        }
    }
    Ok(())
}
