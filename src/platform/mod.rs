//! Platform abstraction: inbound events and outbound actions.
//!
//! The runtime never talks to a chat platform directly. The host process
//! implements [`PlatformClient`] on top of whatever transport it uses and
//! translates the platform's own event types into the inbound event structs
//! defined in [`events`]. Everything in this crate is written against these
//! two seams, which keeps the core testable with the generated
//! [`MockPlatformClient`].

pub mod client;
pub mod events;

pub use crate::platform::client::{CommandInfo, Control, MockPlatformClient, PlatformClient};
pub use crate::platform::events::{
    Actor, AutocompleteEvent, CommandEvent, ComponentEvent, Event, GatewayEvent, ResponseTarget,
};
