//! Paginated interactive messages.
//!
//! A [`ButtonMenu`] owns the live state of one presented, pageable message:
//! the current page, the two navigation controls and a time-boxed teardown
//! that unregisters the controls after an hour of existence. Page content
//! comes from a [`PageProvider`] implemented by the host; the menu decides
//! when to re-render and how the controls toggle at the page bounds.

mod menu;

pub use crate::pageable::menu::{ButtonMenu, PageProvider};
