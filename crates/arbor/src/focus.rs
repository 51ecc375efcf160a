//! Keyboard focus traversal.
//!
//! Each [`TopLevelWindow`](crate::window::TopLevelWindow) owns one
//! [`FocusManager`]. Tab order is a depth-first pre-order walk of the view
//! tree, the same order containers paint in. Only visible views marked
//! focusable through [`ViewBase::set_focusable`](crate::view::ViewBase::set_focusable)
//! take part, and a hidden view hides its whole subtree.

use arbor_core::logging::{span_names, targets};

use crate::view::{ViewHandle, WeakViewHandle};

/// Tracks the focused view of one tree.
#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<WeakViewHandle>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The focused view, if it is still alive.
    pub fn focused_view(&self) -> Option<ViewHandle> {
        self.focused.as_ref().and_then(|weak| weak.upgrade())
    }

    pub fn has_focus(&self, view: &ViewHandle) -> bool {
        self.focused.as_ref().is_some_and(|weak| weak.ptr_eq(view))
    }

    /// Move focus to `view`.
    ///
    /// The previously focused view is told it lost focus before `view` is
    /// told it gained it. Returns `false` if `view` is hidden or not
    /// focusable.
    pub fn set_focus(&mut self, view: &ViewHandle) -> bool {
        if !view.is_visible() || !view.node().is_focusable() {
            return false;
        }
        if self.has_focus(view) {
            return true;
        }

        if let Some(old) = self.focused.take().and_then(|weak| weak.upgrade()) {
            old.focus_changed(false);
        }
        tracing::debug!(target: targets::FOCUS, view = %view.name(), "focus set");
        view.focus_changed(true);
        self.focused = Some(view.downgrade());
        true
    }

    /// Remove focus from the focused view, if any.
    pub fn clear_focus(&mut self) {
        if let Some(old) = self.focused.take().and_then(|weak| weak.upgrade()) {
            old.focus_changed(false);
        }
    }

    /// Move focus to the next (or, with `reverse`, previous) focusable view
    /// under `root`, wrapping around at either end.
    ///
    /// With nothing focused, forward traversal starts at the first view and
    /// reverse traversal at the last. Returns `false` if nothing under `root`
    /// can take focus.
    pub fn advance_focus(&mut self, root: &ViewHandle, reverse: bool) -> bool {
        let _span =
            tracing::debug_span!(target: targets::FOCUS, span_names::FOCUS, reverse).entered();
        let order = tab_order(root);
        if order.is_empty() {
            return false;
        }

        let current = self
            .focused
            .as_ref()
            .and_then(|focused| order.iter().position(|view| focused.ptr_eq(view)));
        let last = order.len() - 1;
        let next = match (current, reverse) {
            (Some(pos), false) => (pos + 1) % order.len(),
            (Some(0), true) => last,
            (Some(pos), true) => pos - 1,
            (None, false) => 0,
            (None, true) => last,
        };

        self.set_focus(&order[next])
    }
}

/// Focusable views under `root` in tab order.
pub fn tab_order(root: &ViewHandle) -> Vec<ViewHandle> {
    let mut order = Vec::new();
    collect_tab_order(root, &mut order);
    order
}

fn collect_tab_order(view: &ViewHandle, order: &mut Vec<ViewHandle>) {
    if !view.is_visible() {
        return;
    }
    if view.node().is_focusable() {
        order.push(view.clone());
    }
    view.for_each_child(&mut |child| {
        collect_tab_order(child, order);
        true
    });
}
