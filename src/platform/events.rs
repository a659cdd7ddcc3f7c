//! Inbound event types delivered by the platform connection.
//!
//! The host translates its transport-level events into these structs and
//! feeds them to [`crate::router::EventRouter::dispatch`]. The runtime only
//! cares about three kinds of interaction plus an opaque gateway stream, so
//! the types stay deliberately small.

use serde_json::Value;

/// The user behind an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Stable platform identifier, used for permission checks.
    pub id: String,
    /// Display name, used for logging only.
    pub display_name: String,
}

impl Actor {
    /// Creates an actor from its platform identifier and display name.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Actor {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Opaque handle to the message an interaction can respond to.
///
/// A target is handed to the runtime inside each inbound event and given
/// back verbatim on outbound [`reply`](crate::platform::PlatformClient::reply)
/// and [`edit_message`](crate::platform::PlatformClient::edit_message) calls.
/// The runtime never inspects it beyond cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTarget {
    /// Platform-specific token identifying the interaction response.
    pub id: String,
}

impl ResponseTarget {
    /// Wraps a platform response token.
    pub fn new(id: impl Into<String>) -> Self {
        ResponseTarget { id: id.into() }
    }
}

/// A named command invoked by an actor.
#[derive(Debug, Clone)]
pub struct CommandEvent {
    /// The actor who invoked the command.
    pub actor: Actor,
    /// The command name, matching a [`CommandInfo`](crate::platform::CommandInfo) name.
    pub name: String,
    /// Handle to respond to the invocation.
    pub target: ResponseTarget,
}

/// A click on an interactive control.
#[derive(Debug, Clone)]
pub struct ComponentEvent {
    /// Identifier of the clicked control.
    pub component_id: String,
    /// Handle to edit the message carrying the control.
    pub target: ResponseTarget,
}

/// An autocomplete request for a command argument being typed.
#[derive(Debug, Clone)]
pub struct AutocompleteEvent {
    /// The command the actor is completing.
    pub name: String,
    /// The partial input of the focused argument.
    pub focused: String,
    /// Handle to respond with suggestions.
    pub target: ResponseTarget,
}

/// Any other platform event, forwarded as-is to registered modules.
#[derive(Debug, Clone)]
pub struct GatewayEvent {
    /// Platform event kind, e.g. `"message_create"`.
    pub kind: String,
    /// Raw event payload. Modules decode what they understand.
    pub payload: Value,
}

impl GatewayEvent {
    /// Creates a gateway event from its kind and raw payload.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        GatewayEvent {
            kind: kind.into(),
            payload,
        }
    }
}

/// An inbound event, routed by kind.
#[derive(Debug, Clone)]
pub enum Event {
    /// Command invocation, dispatched through the worker pool.
    Command(CommandEvent),
    /// Autocomplete request, answered on the delivery task.
    Autocomplete(AutocompleteEvent),
    /// Control click, dispatched synchronously on the delivery task.
    Component(ComponentEvent),
    /// Opaque event, broadcast to all registered modules.
    Gateway(GatewayEvent),
}
