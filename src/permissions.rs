//! Owner and root permission predicates.

use std::collections::HashSet;

use anyhow::{Result, anyhow};

use crate::config::{Owners, Settings};
use crate::modules::ModuleMeta;
use crate::platform::Actor;

/// Pure permission checks over a snapshot of the configured [`Owners`].
///
/// The utility holds its own copy of the owner set taken at construction;
/// later settings changes do not affect it.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use cogwheel::{Owners, PermissionUtils};
///
/// let owners = Owners {
///     root_id: Some("1".to_string()),
///     ids: HashSet::from(["2".to_string()]),
/// };
/// let permissions = PermissionUtils::from_owners(owners);
///
/// assert!(permissions.is_root("1"));
/// assert!(permissions.is_owner("1"));
/// assert!(permissions.is_owner("2"));
/// assert!(!permissions.is_owner("3"));
/// ```
pub struct PermissionUtils {
    owners: Owners,
}

impl PermissionUtils {
    /// Creates the utility from loaded settings.
    ///
    /// # Errors
    ///
    /// Settings without an owners section are a configuration error:
    /// permission checks cannot silently default to "nobody owns the bot".
    pub fn new(settings: &Settings) -> Result<Self> {
        let owners = settings
            .owners
            .clone()
            .ok_or_else(|| anyhow!("owners configuration is required for permission checks"))?;
        Ok(Self::from_owners(owners))
    }

    /// Creates the utility directly from an owner set.
    pub fn from_owners(owners: Owners) -> Self {
        PermissionUtils { owners }
    }

    /// Whether owner features are enabled.
    ///
    /// True only when the non-root id set is non-empty; a configured root
    /// alone does not enable them.
    pub fn is_enabled(&self) -> bool {
        self.owners.is_enabled()
    }

    /// Whether the given user is the configured root owner.
    pub fn is_root(&self, user_id: &str) -> bool {
        self.owners.root_id.as_deref() == Some(user_id)
    }

    /// Whether the given user is an owner, root included.
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owners.ids.contains(user_id) || self.is_root(user_id)
    }

    /// The root owner's identifier, if configured.
    pub fn root(&self) -> Option<&str> {
        self.owners.root_id.as_deref()
    }

    /// Read-only view of the non-root owner identifiers.
    pub fn owners(&self) -> &HashSet<String> {
        &self.owners.ids
    }

    /// Whether an actor passes a module's restriction flags.
    ///
    /// Owner-only modules require an owner; dev-only modules require the
    /// root user.
    pub fn may_use(&self, actor: &Actor, meta: &ModuleMeta) -> bool {
        if meta.bot_owner_only && !self.is_owner(&actor.id) {
            return false;
        }
        if meta.dev_only && !self.is_root(&actor.id) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(root: Option<&str>, ids: &[&str]) -> Owners {
        Owners {
            root_id: root.map(str::to_string),
            ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    fn settings_with(owners: Option<Owners>) -> Settings {
        Settings {
            token: "token".to_string(),
            intents: HashSet::new(),
            activity: None,
            owners,
        }
    }

    #[test]
    fn test_missing_owners_configuration_is_fatal() {
        assert!(PermissionUtils::new(&settings_with(None)).is_err());
    }

    #[test]
    fn test_new_takes_owner_snapshot_from_settings() {
        let permissions =
            PermissionUtils::new(&settings_with(Some(owners(Some("1"), &["2"])))).unwrap();
        assert!(permissions.is_root("1"));
        assert!(permissions.is_owner("2"));
    }

    #[test]
    fn test_root_is_owner_even_with_empty_id_set() {
        let permissions = PermissionUtils::from_owners(owners(Some("1"), &[]));

        assert!(permissions.is_owner("1"));
        assert!(!permissions.is_enabled());
    }

    #[test]
    fn test_is_root_with_no_root_configured() {
        let permissions = PermissionUtils::from_owners(owners(None, &["2"]));

        assert!(!permissions.is_root("2"));
        assert!(permissions.is_owner("2"));
        assert!(permissions.is_enabled());
    }

    #[test]
    fn test_non_owner_is_rejected() {
        let permissions = PermissionUtils::from_owners(owners(Some("1"), &["2"]));
        assert!(!permissions.is_owner("3"));
    }

    #[test]
    fn test_owners_view_is_read_only() {
        let permissions = PermissionUtils::from_owners(owners(None, &["2", "3"]));

        let view: &HashSet<String> = permissions.owners();
        assert_eq!(view.len(), 2);
        // A shared reference cannot mutate the backing set; a second call
        // observes the same contents.
        assert_eq!(permissions.owners().len(), 2);
    }

    #[test]
    fn test_may_use_gates_restricted_modules() {
        let permissions = PermissionUtils::from_owners(owners(Some("1"), &["2"]));
        let root = Actor::new("1", "Root");
        let owner = Actor::new("2", "Owner");
        let user = Actor::new("3", "User");

        let mut meta = ModuleMeta::new("admin", "administration");
        meta.bot_owner_only = true;
        assert!(permissions.may_use(&root, &meta));
        assert!(permissions.may_use(&owner, &meta));
        assert!(!permissions.may_use(&user, &meta));

        meta.dev_only = true;
        assert!(permissions.may_use(&root, &meta));
        assert!(!permissions.may_use(&owner, &meta));

        let open = ModuleMeta::new("ping", "ping pong");
        assert!(permissions.may_use(&user, &open));
    }
}
