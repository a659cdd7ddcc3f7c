//! Bot settings structures and loading.
//!
//! Settings are read from a YAML file, with environment variables taking
//! precedence. Environment variables use the `COGWHEEL_` prefix and `__` to
//! descend into nested sections.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Platform authentication token
//! token: "your-platform-token"
//!
//! # Gateway intents requested from the platform, passed through opaquely
//! intents:
//!   - "guild_messages"
//!   - "message_content"
//!
//! # Presence shown by the bot
//! activity:
//!   kind: "playing"
//!   name: "with cogs"
//!
//! # Users with elevated permissions
//! owners:
//!   root_id: "100000000000000001"
//!   ids:
//!     - "100000000000000002"
//!     - "100000000000000003"
//! ```
//!
//! # Environment Variable Overrides
//!
//! ```bash
//! export COGWHEEL_TOKEN="token-from-env"
//! export COGWHEEL_OWNERS__ROOT_ID="100000000000000001"
//! ```

use std::collections::HashSet;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Environment variable prefix for overrides.
const ENV_PREFIX: &str = "COGWHEEL_";

/// Root settings for a bot host.
///
/// The token, intents and activity are carried for the host's platform
/// connection and not interpreted by this crate. The owners section feeds
/// [`PermissionUtils`](crate::permissions::PermissionUtils).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Platform authentication token.
    pub token: String,

    /// Gateway intents requested from the platform.
    ///
    /// Carried as opaque strings; the host maps them onto its platform's
    /// intent flags.
    #[serde(default)]
    pub intents: HashSet<String>,

    /// Presence the bot advertises, if any.
    #[serde(default)]
    pub activity: Option<Activity>,

    /// Owner configuration. Required by
    /// [`PermissionUtils`](crate::permissions::PermissionUtils); optional
    /// for hosts without permission checks.
    #[serde(default)]
    pub owners: Option<Owners>,
}

impl Settings {
    /// Loads settings from a YAML file merged with environment overrides.
    ///
    /// Environment variables win over file values.
    ///
    /// # Errors
    ///
    /// Returns an error when the merged configuration is missing required
    /// fields or a value fails to deserialize.
    pub fn load(path: &str) -> Result<Self, anyhow::Error> {
        let settings = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(settings)
    }
}

/// Presence advertised by the bot.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Activity {
    /// Activity kind, e.g. `"playing"` or `"listening"`.
    pub kind: String,
    /// Activity text shown next to the kind.
    pub name: String,
}

/// Owner identities with elevated permissions.
///
/// The root owner is a single optional identifier with the highest
/// privilege. The id set holds the remaining owners. Owner features count
/// as enabled only when the id set is non-empty; a configured root alone
/// does not enable them.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Owners {
    /// The primary owner, if configured.
    #[serde(default)]
    pub root_id: Option<String>,
    /// Additional owners.
    #[serde(default)]
    pub ids: HashSet<String>,
}

impl Owners {
    /// Whether owner features are enabled.
    pub fn is_enabled(&self) -> bool {
        !self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_load_reads_yaml_file() {
        let file = write_config(
            r#"
token: "abc123"
intents:
  - "guild_messages"
owners:
  root_id: "1"
  ids:
    - "2"
    - "3"
"#,
        );

        let settings = Settings::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.token, "abc123");
        assert!(settings.intents.contains("guild_messages"));

        let owners = settings.owners.unwrap();
        assert_eq!(owners.root_id.as_deref(), Some("1"));
        assert_eq!(owners.ids.len(), 2);
        assert!(owners.is_enabled());
    }

    #[test]
    #[serial]
    fn test_load_defaults_optional_sections() {
        let file = write_config("token: \"abc123\"\n");

        let settings = Settings::load(file.path().to_str().unwrap()).unwrap();
        assert!(settings.intents.is_empty());
        assert!(settings.activity.is_none());
        assert!(settings.owners.is_none());
    }

    #[test]
    #[serial]
    fn test_load_without_token_fails() {
        let file = write_config("intents: []\n");
        assert!(Settings::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_values() {
        let file = write_config("token: \"from-file\"\n");

        unsafe {
            std::env::set_var("COGWHEEL_TOKEN", "from-env");
            std::env::set_var("COGWHEEL_OWNERS__ROOT_ID", "42");
        }
        let settings = Settings::load(file.path().to_str().unwrap());
        unsafe {
            std::env::remove_var("COGWHEEL_TOKEN");
            std::env::remove_var("COGWHEEL_OWNERS__ROOT_ID");
        }

        let settings = settings.unwrap();
        assert_eq!(settings.token, "from-env");
        assert_eq!(settings.owners.unwrap().root_id.as_deref(), Some("42"));
    }

    #[test]
    #[serial]
    fn test_activity_deserializes() {
        let file = write_config(
            r#"
token: "abc123"
activity:
  kind: "playing"
  name: "with cogs"
"#,
        );

        let settings = Settings::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            settings.activity,
            Some(Activity {
                kind: "playing".to_string(),
                name: "with cogs".to_string(),
            })
        );
    }
}
