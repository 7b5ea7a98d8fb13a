//! Collapsible primary navigation.
//!
//! On narrow viewports the menu hides behind a toggle and the user opens and
//! closes it. On wide viewports the toggle is not rendered and the menu is
//! always shown. Which of the two applies is read from the layout on every
//! reconcile; it is never remembered as controller state.

use serde::Serialize;
use tracing::debug;

/// Observable state of the navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NavState {
    /// Toggle visible; menu shown only when `open`
    Collapsed { open: bool },
    /// Toggle hidden; menu always shown
    Expanded,
}

/// Where a document-level click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Toggle,
    Nav,
    Outside,
}

/// Attribute-level state of the nav and its toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponsiveNavController {
    /// `is-open` on the menu
    menu_open: bool,
    /// `aria-expanded` on the toggle
    aria_expanded: bool,
    /// `is-active` on the toggle, set only by user activation
    toggle_active: bool,
    /// Toggle visibility at the last reconcile
    toggle_visible: bool,
}

impl ResponsiveNavController {
    /// Build the controller and reconcile it against the current breakpoint.
    pub fn new(toggle_visible: bool) -> Self {
        let mut controller = Self {
            menu_open: false,
            aria_expanded: false,
            toggle_active: false,
            toggle_visible,
        };
        controller.reconcile(toggle_visible);
        controller
    }

    pub fn state(&self) -> NavState {
        if self.toggle_visible {
            NavState::Collapsed {
                open: self.menu_open,
            }
        } else {
            NavState::Expanded
        }
    }

    /// User activated the toggle.
    pub fn toggle(&mut self) {
        if !self.toggle_visible {
            debug!("Nav toggle activated while hidden, ignoring");
            return;
        }
        let expanded = self.aria_expanded;
        self.aria_expanded = !expanded;
        self.toggle_active = !expanded;
        self.menu_open = !expanded;
    }

    /// Close the menu. Has no effect while the menu is expanded.
    pub fn close(&mut self) {
        if !self.toggle_visible {
            return;
        }
        self.aria_expanded = false;
        self.toggle_active = false;
        self.menu_open = false;
    }

    /// A click anywhere in the document; outside clicks close an open menu.
    pub fn document_click(&mut self, target: ClickTarget) {
        if self.menu_open && target == ClickTarget::Outside {
            self.close();
        }
    }

    /// Re-evaluate against the breakpoint after a resize or orientation change.
    pub fn reconcile(&mut self, toggle_visible: bool) {
        self.toggle_visible = toggle_visible;
        if !toggle_visible {
            self.menu_open = true;
            self.aria_expanded = true;
            self.toggle_active = false;
        } else if !self.toggle_active {
            self.menu_open = false;
            self.aria_expanded = false;
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn aria_expanded(&self) -> bool {
        self.aria_expanded
    }

    pub fn is_toggle_active(&self) -> bool {
        self.toggle_active
    }
}
