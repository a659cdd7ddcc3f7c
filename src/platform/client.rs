//! Outbound action surface implemented by the host process.

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

use crate::platform::events::ResponseTarget;

/// An interactive control attached to a message.
///
/// Controls are plain data: the runtime decides identifiers and disabled
/// states, the host renders them with whatever widget the platform offers.
///
/// # Examples
///
/// ```
/// use cogwheel::Control;
///
/// let mut control = Control::new("abc-forward", "➡");
/// assert!(!control.disabled);
/// control.disabled = true;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// Unique identifier, matched against [`ComponentEvent::component_id`].
    ///
    /// [`ComponentEvent::component_id`]: crate::platform::ComponentEvent::component_id
    pub id: String,
    /// Label or emoji shown on the control.
    pub label: String,
    /// Whether the control is rendered greyed out and non-clickable.
    pub disabled: bool,
}

impl Control {
    /// Creates an enabled control with the given identifier and label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Control {
            id: id.into(),
            label: label.into(),
            disabled: false,
        }
    }
}

/// Declared metadata of a named command.
///
/// Pushed to the platform at registration so the platform can offer the
/// command to users. The option schema is carried opaquely; its shape is
/// between the host and the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    /// Command name, unique per bot.
    pub name: String,
    /// Short human-readable description.
    pub description: String,
    /// Opaque option/argument schema.
    pub options: Value,
}

impl CommandInfo {
    /// Creates command metadata with an empty option schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        CommandInfo {
            name: name.into(),
            description: description.into(),
            options: Value::Array(Vec::new()),
        }
    }
}

/// The narrow interface through which the runtime acts on the platform.
///
/// The host implements this once over its platform connection. All methods
/// are fire-and-forget from the runtime's perspective: an `Err` is logged by
/// the caller and never retried.
///
/// A [`MockPlatformClient`] is generated for tests.
#[automock]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Registers or updates a named command with its declared schema.
    async fn register_command(&self, info: &CommandInfo) -> Result<()>;

    /// Replies to an interaction with content and a control layout.
    ///
    /// An ephemeral reply is visible only to the interacting actor.
    async fn reply(
        &self,
        target: &ResponseTarget,
        content: &str,
        controls: &[Control],
        ephemeral: bool,
    ) -> Result<()>;

    /// Edits a previously sent message's content and control layout.
    async fn edit_message(
        &self,
        target: &ResponseTarget,
        content: &str,
        controls: &[Control],
    ) -> Result<()>;

    /// Enables or disables a single control in place.
    ///
    /// Menus in this crate carry control states inside
    /// [`edit_message`](Self::edit_message) layouts instead; this action
    /// exists for hosts toggling a control without re-rendering.
    async fn set_control_enabled(
        &self,
        target: &ResponseTarget,
        control_id: &str,
        enabled: bool,
    ) -> Result<()>;
}
