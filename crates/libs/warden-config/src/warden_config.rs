//! Top level configuration file.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    prelude::*,
    tables::{AuthorizableConfig, TableNames},
};

/// Configuration read once at startup by the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Permission, role and role pivot tables.
    pub tables: TableNames,
    /// Pivot tables per authorizable host entity, keyed by entity name.
    pub authorizables: BTreeMap<String, AuthorizableConfig>,
}

impl WardenConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        debug!("Loading warden config from {}", file_path.display());
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        let config: Self = toml::from_str(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every configured table name.
    pub fn validate(&self) -> Result<()> {
        self.tables.validate()?;
        for authorizable in self.authorizables.values() {
            authorizable.validate()?;
        }
        Ok(())
    }

    /// Pivot configuration for the host entity registered under `name`.
    pub fn authorizable(&self, name: &str) -> Option<&AuthorizableConfig> {
        self.authorizables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() -> Result<()> {
        let config = WardenConfig::from_toml("")?;
        assert_eq!(config.tables, TableNames::default());
        assert_eq!(config.tables.role_has_permissions, "role_has_permissions");
        assert!(config.authorizables.is_empty());
        Ok(())
    }

    #[test]
    fn deserialize() -> Result<()> {
        let content = r#"
            # Tables holding permission and role rows
            [tables]
            permissions = "acl.permissions"
            roles = "acl.roles"
            role_has_permissions = "acl.role_has_permissions"

            # Host entities
            [authorizables.user]
            permissions_pivot_table = "user_has_permissions"
            roles_pivot_table = "user_has_roles"

            [authorizables.team]
            roles_pivot_table = "team_has_roles"
        "#;
        let config = WardenConfig::from_toml(content)?;

        assert_eq!(config.tables.roles, "acl.roles");
        assert_eq!(
            config.authorizable("user"),
            Some(&AuthorizableConfig::new(
                "user_has_permissions",
                "user_has_roles"
            ))
        );
        let team = config.authorizable("team").expect("team config");
        assert_eq!(team.permissions_pivot_table, "model_has_permissions");
        assert_eq!(team.roles_pivot_table, "team_has_roles");
        assert!(config.authorizable("group").is_none());
        Ok(())
    }

    #[test]
    fn invalid_table_name_is_rejected() {
        let content = r#"
            [authorizables.user]
            roles_pivot_table = "user roles"
        "#;
        assert!(matches!(
            WardenConfig::from_toml(content),
            Err(Error::InvalidIdentifier(name)) if name == "user roles"
        ));
    }

    #[test]
    fn malformed_toml_is_a_deserialization_error() {
        assert!(matches!(
            WardenConfig::from_toml("[tables"),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            WardenConfig::from_file(Path::new("does/not/exist.toml")),
            Err(Error::IO(_))
        ));
    }
}
