//! A view that composes child views.
//!
//! A [`Container`] never stores its children. It asks a
//! [`ContainerDelegate`] to enumerate them, test membership, lay them out
//! and paint container-level decoration, so the wrapper that owns the
//! container is free to keep its children however it likes.
//! [`Panel`](crate::panel::Panel) is the stock wrapper.
//!
//! # Routing
//!
//! Hit-testing scans children in delegate order and stops at the first
//! visible child whose clipped rect contains the point. Motion is sticky: the
//! container remembers the hovered child so it can pair every enter with
//! exactly one leave. Wheel and click are hit-tested fresh on every call.
//!
//! A hovered child that has since left the container is never sent a leave.

use std::rc::{Rc, Weak};

use arbor_core::PerfSpan;
use arbor_core::logging::{span_names, targets};
use arbor_render::{Painter, PainterScope, PixelPoint, PixelRect, Rect, scale_rect};

use crate::events::{MouseClickEvent, MouseMoveEvent, WheelEvent};
use crate::view::{View, ViewBase, ViewHandle, ViewNode, WeakViewHandle};
use crate::window::WindowHandle;

/// The child-owning side of a [`Container`].
pub trait ContainerDelegate {
    /// The container was given a new, non-empty size.
    fn layout(&self, base: &ViewBase);

    /// Call `f` for each child in order until it returns `false`.
    fn for_each(&self, f: &mut dyn FnMut(&ViewHandle) -> bool);

    /// Whether `view` is currently a child.
    fn has_child(&self, view: &ViewHandle) -> bool;

    /// Paint container-level decoration below the children.
    ///
    /// The painter is clipped to the container's bounds and `dirty` is in
    /// logical units.
    fn on_draw(&self, _painter: &mut dyn Painter, _dirty: Rect) {}

    /// Run work that was postponed because the container was busy.
    ///
    /// Called at the end of every container hook that forwards to children,
    /// once the child calls have returned.
    fn flush_deferred(&self, _base: &ViewBase) {}
}

pub struct Container {
    base: ViewBase,
    delegate: Weak<dyn ContainerDelegate>,
    hover_view: Option<WeakViewHandle>,
}

impl Container {
    /// A container whose children are supplied by `delegate`.
    ///
    /// The container holds the delegate weakly; once it is gone the
    /// container behaves as if it had no children.
    pub fn new(delegate: Weak<dyn ContainerDelegate>) -> Self {
        Self::with_base(ViewBase::new(), delegate)
    }

    pub fn with_base(base: ViewBase, delegate: Weak<dyn ContainerDelegate>) -> Self {
        Self {
            base,
            delegate,
            hover_view: None,
        }
    }

    /// The hovered child, if it is still alive.
    pub fn hover_view(&self) -> Option<ViewHandle> {
        self.hover_view.as_ref().and_then(|weak| weak.upgrade())
    }

    pub fn has_child(&self, view: &ViewHandle) -> bool {
        self.delegate
            .upgrade()
            .is_some_and(|delegate| delegate.has_child(view))
    }

    /// The first visible child whose clipped rect contains `point`
    /// (container-local pixels).
    pub fn find_child_from_point(&self, point: PixelPoint) -> Option<ViewHandle> {
        let delegate = self.delegate.upgrade()?;
        let mut found = None;
        delegate.for_each(&mut |child| {
            if child.is_visible() && child.clipped_rect().contains(point) {
                found = Some(child.clone());
                false
            } else {
                true
            }
        });
        found
    }

    fn each_child(&self, mut f: impl FnMut(&ViewHandle)) {
        if let Some(delegate) = self.delegate.upgrade() {
            delegate.for_each(&mut |child| {
                f(child);
                true
            });
        }
    }

    /// Point every current child back at this container.
    fn refresh_parent_tree(&self) {
        let node = self.base.node().clone();
        self.each_child(|child| child.set_parent(Some(&node)));
    }

    /// Send leave to `view` if it is still a child; otherwise just drop its
    /// hovered mark.
    fn leave_if_member(&self, view: &ViewHandle) {
        if self.has_child(view) {
            view.mouse_leave();
        } else {
            tracing::debug!(
                target: targets::CONTAINER,
                view = %view.name(),
                "hovered view is no longer a child; leave suppressed"
            );
            view.node().set_hovered(false);
        }
    }

    fn flush_deferred(&self) {
        if let Some(delegate) = self.delegate.upgrade() {
            delegate.flush_deferred(&self.base);
        }
    }
}

fn draw_child(painter: &mut dyn Painter, child: &ViewHandle, dirty: PixelRect) {
    if !child.is_visible() {
        return;
    }
    let Some(child_dirty) = child.clipped_rect().intersect(&dirty) else {
        tracing::trace!(
            target: targets::CONTAINER,
            view = %child.name(),
            "outside dirty rect; skipped"
        );
        return;
    };

    let origin = child.allocation().offset_from_origin();
    let mut scope = PainterScope::new(painter);
    scope.translate_pixel(origin);
    child.draw(&mut *scope, child_dirty - origin);
}

impl View for Container {
    fn view_base(&self) -> &ViewBase {
        &self.base
    }

    fn view_base_mut(&mut self) -> &mut ViewBase {
        &mut self.base
    }

    fn size_allocate(&mut self, allocation: PixelRect) {
        self.base.size_allocate(allocation);
        if allocation.size.is_empty() {
            tracing::trace!(
                target: targets::CONTAINER,
                view = %self.base.name(),
                "empty allocation; layout skipped"
            );
            return;
        }
        if let Some(delegate) = self.delegate.upgrade() {
            let _perf = PerfSpan::new(span_names::LAYOUT);
            delegate.layout(&self.base);
            delegate.flush_deferred(&self.base);
        }
    }

    fn set_parent(&mut self, parent: Option<&Rc<ViewNode>>) {
        self.base.set_parent(parent);
        self.refresh_parent_tree();
    }

    fn become_content_view(&mut self, window: &WindowHandle) {
        self.base.become_content_view(window);
        self.refresh_parent_tree();
    }

    fn set_visible(&mut self, visible: bool) {
        self.base.set_visible(visible);
        self.each_child(|child| child.set_visible(visible));
        self.flush_deferred();
    }

    fn draw(&mut self, painter: &mut dyn Painter, dirty: PixelRect) {
        self.base.draw(painter, dirty);
        let Some(delegate) = self.delegate.upgrade() else {
            return;
        };

        {
            let mut scope = PainterScope::new(&mut *painter);
            scope.clip_rect_pixel(PixelRect::from_size(self.base.size_allocation().size));
            let logical_dirty = scale_rect(dirty, 1.0 / self.base.scale_factor());
            delegate.on_draw(&mut *scope, logical_dirty);
        }

        delegate.for_each(&mut |child| {
            draw_child(&mut *painter, child, dirty);
            true
        });
        delegate.flush_deferred(&self.base);
    }

    fn on_mouse_move(&mut self, event: &MouseMoveEvent) {
        let hit = self.find_child_from_point(event.position);
        let changed = match (&self.hover_view, &hit) {
            (Some(old), Some(new)) => !old.ptr_eq(new),
            (None, None) => false,
            _ => true,
        };

        if changed {
            if let Some(old) = self.hover_view.take().and_then(|weak| weak.upgrade()) {
                self.leave_if_member(&old);
            }
            self.hover_view = hit.as_ref().map(ViewHandle::downgrade);
            if let Some(new) = &hit {
                tracing::trace!(target: targets::CONTAINER, view = %new.name(), "hover changed");
                new.mouse_enter();
            }
        }

        if let Some(hover) = self.hover_view() {
            hover.mouse_move(&event.offset_by(-hover.allocation().offset_from_origin()));
        }
        self.flush_deferred();
    }

    fn on_mouse_leave(&mut self) {
        if let Some(old) = self.hover_view.take().and_then(|weak| weak.upgrade()) {
            self.leave_if_member(&old);
        }
        self.flush_deferred();
    }

    fn on_mouse_wheel(&mut self, event: &WheelEvent) -> bool {
        let consumed = match self.find_child_from_point(event.position) {
            Some(child) => {
                child.mouse_wheel(&event.offset_by(-child.allocation().offset_from_origin()))
            }
            None => false,
        };
        self.flush_deferred();
        consumed
    }

    fn on_mouse_click(&mut self, event: &MouseClickEvent) -> bool {
        let consumed = match self.find_child_from_point(event.position) {
            Some(child) => {
                child.mouse_click(&event.offset_by(-child.allocation().offset_from_origin()))
            }
            None => false,
        };
        self.flush_deferred();
        consumed
    }

    fn for_each_child(&self, f: &mut dyn FnMut(&ViewHandle) -> bool) {
        if let Some(delegate) = self.delegate.upgrade() {
            delegate.for_each(f);
        }
    }
}
