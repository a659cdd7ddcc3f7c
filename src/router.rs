//! Fan-out of inbound platform events.

use std::sync::Arc;

use log::debug;

use crate::buttons::ButtonRegistry;
use crate::commands::CommandBackend;
use crate::modules::ModuleManager;
use crate::platform::Event;

/// Routes each inbound event to the component that handles its kind.
///
/// The host's platform connection translates transport events into
/// [`Event`]s and calls [`dispatch`](Self::dispatch) from its delivery
/// task. Command invocations leave the delivery task through the command
/// backend's worker pool; component clicks and gateway broadcasts run on
/// the delivery task itself, so their handlers spawn any real work.
pub struct EventRouter {
    buttons: Arc<ButtonRegistry>,
    commands: Arc<CommandBackend>,
    modules: Arc<ModuleManager>,
}

impl EventRouter {
    /// Creates a router over the three event sinks.
    pub fn new(
        buttons: Arc<ButtonRegistry>,
        commands: Arc<CommandBackend>,
        modules: Arc<ModuleManager>,
    ) -> Self {
        EventRouter {
            buttons,
            commands,
            modules,
        }
    }

    /// Routes one inbound event by kind.
    pub async fn dispatch(&self, event: Event) {
        match event {
            Event::Command(event) => {
                debug!("dispatching command '{}'", event.name);
                self.commands.on_command(event).await;
            }
            Event::Autocomplete(event) => {
                self.commands.on_autocomplete(event).await;
            }
            Event::Component(event) => {
                self.buttons.dispatch(event);
            }
            Event::Gateway(event) => {
                self.modules.broadcast(&event);
            }
        }
    }
}
