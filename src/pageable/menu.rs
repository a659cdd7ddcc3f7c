//! Session state machine behind a paginated, button-driven message.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::Result;
use log::{debug, error};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;
use uuid::Uuid;

use crate::buttons::ButtonRegistry;
use crate::platform::{CommandEvent, ComponentEvent, Control, PlatformClient, ResponseTarget};

const BACKWARD_LABEL: &str = "⬅";
const FORWARD_LABEL: &str = "➡";

/// How long a presented menu keeps its controls registered.
const MENU_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// Supplies page content and bounds for a [`ButtonMenu`].
pub trait PageProvider: Send + Sync {
    /// Highest reachable page, starting at 1.
    fn max_page(&self) -> u32;

    /// Renders the content of a page. Pages are 1-based.
    fn create_page(&self, page: u32) -> String;
}

#[derive(Default)]
struct MenuState {
    backward: Option<Control>,
    forward: Option<Control>,
    origin: Option<ResponseTarget>,
    expiry: Option<JoinHandle<()>>,
}

/// One live paginated message with forward/backward navigation controls.
///
/// A menu is created per presented interaction and holds its page counter,
/// its two freshly-identified controls and the expiry task tearing the
/// controls down again. The counter always stays within `[1, max_page]`:
/// stepping past either bound is a no-op.
///
/// # Control Lifecycle
///
/// [`send_initial_message`](Self::send_initial_message) and
/// [`edit_initial_interaction`](Self::edit_initial_interaction) generate two
/// random control identifiers, register their click handlers in the shared
/// [`ButtonRegistry`] and arm the expiry. When the expiry fires, both
/// identifiers are unregistered; later clicks on the rendered controls are
/// dropped by the registry as stale traffic. Menus with a single page render
/// without controls and never arm the expiry.
///
/// # Concurrency
///
/// The page counter is stepped atomically, so racing clicks cannot push it
/// out of bounds. The step and the follow-up render are separate operations
/// though: two near-simultaneous clicks may each win a step and both
/// render, in which case the last edit to the message wins.
pub struct ButtonMenu {
    provider: Arc<dyn PageProvider>,
    platform: Arc<dyn PlatformClient>,
    registry: Arc<ButtonRegistry>,
    current_page: AtomicU32,
    max_page: u32,
    expiry_after: Duration,
    state: Mutex<MenuState>,
}

impl ButtonMenu {
    /// Creates a menu with the default one-hour control expiry.
    pub fn new(
        provider: Arc<dyn PageProvider>,
        platform: Arc<dyn PlatformClient>,
        registry: Arc<ButtonRegistry>,
    ) -> Arc<Self> {
        Self::with_expiry(provider, platform, registry, MENU_EXPIRY)
    }

    /// Creates a menu whose controls expire after the given duration.
    pub fn with_expiry(
        provider: Arc<dyn PageProvider>,
        platform: Arc<dyn PlatformClient>,
        registry: Arc<ButtonRegistry>,
        expiry_after: Duration,
    ) -> Arc<Self> {
        let max_page = provider.max_page().max(1);
        Arc::new(ButtonMenu {
            provider,
            platform,
            registry,
            current_page: AtomicU32::new(1),
            max_page,
            expiry_after,
            state: Mutex::new(MenuState::default()),
        })
    }

    /// The page currently shown.
    pub fn current_page(&self) -> u32 {
        self.current_page.load(Ordering::SeqCst)
    }

    /// The highest reachable page.
    pub fn max_page(&self) -> u32 {
        self.max_page
    }

    /// Replies to a command invocation with page 1 of the menu.
    ///
    /// Registers the navigation controls and arms the expiry when the menu
    /// has more than one page.
    pub async fn send_initial_message(
        self: Arc<Self>,
        event: &CommandEvent,
        ephemeral: bool,
    ) -> Result<()> {
        let controls = Self::bring_up(&self).await;
        let content = self.provider.create_page(self.current_page());
        self.platform
            .reply(&event.target, &content, &controls, ephemeral)
            .await?;
        self.state.lock().await.origin = Some(event.target.clone());
        if self.max_page > 1 {
            self.schedule_deletion().await;
        }
        Ok(())
    }

    /// Edits an already-sent response into page 1 of the menu.
    ///
    /// Equivalent to [`send_initial_message`](Self::send_initial_message)
    /// for interactions whose response message already exists.
    pub async fn edit_initial_interaction(
        self: Arc<Self>,
        target: &ResponseTarget,
    ) -> Result<()> {
        let controls = Self::bring_up(&self).await;
        let content = self.provider.create_page(self.current_page());
        self.platform
            .edit_message(target, &content, &controls)
            .await?;
        self.state.lock().await.origin = Some(target.clone());
        if self.max_page > 1 {
            self.schedule_deletion().await;
        }
        Ok(())
    }

    /// Steps to the next page and re-renders onto the clicked interaction.
    ///
    /// A no-op returning the unchanged page when already on the last page.
    pub async fn next_page(&self, event: ComponentEvent) -> u32 {
        let step = self
            .current_page
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |page| {
                (page < self.max_page).then_some(page + 1)
            });
        match step {
            Ok(previous) => {
                let page = previous + 1;
                if let Err(err) = self.render(page, &event.target).await {
                    error!("failed to render page {page}: {err:#}");
                }
                page
            }
            Err(current) => current,
        }
    }

    /// Steps to the previous page and re-renders onto the clicked
    /// interaction.
    ///
    /// A no-op returning the unchanged page when already on page 1.
    pub async fn previous_page(&self, event: ComponentEvent) -> u32 {
        let step = self
            .current_page
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |page| {
                (page > 1).then_some(page - 1)
            });
        match step {
            Ok(previous) => {
                let page = previous - 1;
                if let Err(err) = self.render(page, &event.target).await {
                    error!("failed to render page {page}: {err:#}");
                }
                page
            }
            Err(current) => current,
        }
    }

    /// Renders a page onto the given response target.
    ///
    /// Recomputes the control disabled states for the page and issues
    /// exactly one message edit. Pages beyond the menu's bounds are ignored,
    /// which swallows clicks raced against a shrunk page count.
    pub async fn render(&self, page: u32, target: &ResponseTarget) -> Result<()> {
        if page > self.max_page {
            return Ok(());
        }
        let content = self.provider.create_page(page);

        let mut state = self.state.lock().await;
        if self.max_page > 1 {
            Self::update_control_states(&mut state, page, self.max_page);
        }
        let controls: Vec<Control> = state
            .backward
            .iter()
            .chain(state.forward.iter())
            .cloned()
            .collect();
        self.platform.edit_message(target, &content, &controls).await
    }

    /// Renders a page onto the response the menu was first presented with.
    pub async fn render_original(&self, page: u32) -> Result<()> {
        let origin = self.state.lock().await.origin.clone();
        let Some(origin) = origin else {
            anyhow::bail!("menu has not been presented yet");
        };
        self.render(page, &origin).await
    }

    /// Arms the control expiry, replacing any previously armed one.
    ///
    /// The cancelled timer is not awaited; an expiry that already started
    /// firing finishes its unregistration. Safe to call repeatedly.
    pub async fn schedule_deletion(&self) {
        let mut state = self.state.lock().await;
        if let Some(expiry) = state.expiry.take() {
            expiry.abort();
        }
        let (Some(backward), Some(forward)) = (state.backward.as_ref(), state.forward.as_ref())
        else {
            return;
        };

        let ids = [backward.id.clone(), forward.id.clone()];
        let registry = Arc::clone(&self.registry);
        let expiry_after = self.expiry_after;
        state.expiry = Some(tokio::spawn(async move {
            time::sleep(expiry_after).await;
            registry.unregister_all(ids.iter().map(String::as_str));
            debug!("expired menu controls {} and {}", ids[0], ids[1]);
        }));
    }

    /// Creates and registers the navigation controls for a multi-page menu.
    ///
    /// Returns the control layout of the initial render: backward disabled,
    /// forward enabled. Single-page menus get no controls at all.
    async fn bring_up(menu: &Arc<Self>) -> Vec<Control> {
        if menu.max_page <= 1 {
            return Vec::new();
        }

        let mut backward = Control::new(
            format!("{}-previous", Uuid::new_v4()),
            BACKWARD_LABEL,
        );
        backward.disabled = true;
        let forward = Control::new(format!("{}-forward", Uuid::new_v4()), FORWARD_LABEL);

        let for_backward = Arc::clone(menu);
        menu.registry.register_control(&backward, move |event| {
            let menu = Arc::clone(&for_backward);
            tokio::spawn(async move {
                menu.previous_page(event).await;
            });
        });
        let for_forward = Arc::clone(menu);
        menu.registry.register_control(&forward, move |event| {
            let menu = Arc::clone(&for_forward);
            tokio::spawn(async move {
                menu.next_page(event).await;
            });
        });

        let mut state = menu.state.lock().await;
        state.backward = Some(backward.clone());
        state.forward = Some(forward.clone());
        vec![backward, forward]
    }

    fn update_control_states(state: &mut MenuState, page: u32, max_page: u32) {
        if let Some(backward) = state.backward.as_mut() {
            backward.disabled = page <= 1;
        }
        if let Some(forward) = state.forward.as_mut() {
            forward.disabled = page >= max_page;
        }
    }
}
