//! The stock owning wrapper around a [`Container`].
//!
//! A [`Panel`] keeps an ordered list of child views, acts as its container's
//! [`ContainerDelegate`], and lays children out with a user callback or a
//! [`BoxLayout`].
//!
//! ```
//! use arbor::panel::{BoxLayout, Panel};
//! use arbor::view::{ViewBase, ViewHandle};
//! # use arbor::view::View;
//! # struct Label(ViewBase);
//! # impl View for Label {
//! #     fn view_base(&self) -> &ViewBase { &self.0 }
//! #     fn view_base_mut(&mut self) -> &mut ViewBase { &mut self.0 }
//! # }
//! use arbor_render::PixelRect;
//!
//! let toolbar = Panel::with_name("toolbar");
//! toolbar.set_box_layout(BoxLayout::horizontal(4));
//! let first = ViewHandle::new(Label(ViewBase::with_name("first")));
//! let second = ViewHandle::new(Label(ViewBase::with_name("second")));
//! toolbar.add_child_view(first.clone());
//! toolbar.add_child_view(second.clone());
//!
//! toolbar.view().size_allocate(PixelRect::new(0, 0, 104, 20));
//! assert_eq!(first.allocation(), PixelRect::new(0, 0, 50, 20));
//! assert_eq!(second.allocation(), PixelRect::new(54, 0, 50, 20));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use arbor_core::Signal;
use arbor_core::logging::targets;
use arbor_render::{Color, Painter, PixelRect, PixelSize, Rect};

use crate::container::{Container, ContainerDelegate};
use crate::view::{View, ViewBase, ViewHandle};

/// Layout callback: the container's pixel size and its children in order.
pub type LayoutFn = dyn Fn(PixelSize, &[ViewHandle]);

/// Custom-paint callback: a painter clipped to the panel and the logical
/// dirty rect.
pub type DrawHandler = dyn Fn(&mut dyn Painter, Rect);

/// Layout orientation for box layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Children are arranged left to right.
    #[default]
    Horizontal,
    /// Children are arranged top to bottom.
    Vertical,
}

/// Lays visible children out in a row or column with equal shares.
///
/// Integer remainder pixels go to the last child so the row always fills
/// the container exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxLayout {
    pub orientation: Orientation,
    /// Gap between neighbouring children, in pixels.
    pub spacing: i32,
}

impl BoxLayout {
    pub fn new(orientation: Orientation, spacing: i32) -> Self {
        Self {
            orientation,
            spacing,
        }
    }

    pub fn horizontal(spacing: i32) -> Self {
        Self::new(Orientation::Horizontal, spacing)
    }

    pub fn vertical(spacing: i32) -> Self {
        Self::new(Orientation::Vertical, spacing)
    }

    /// Allocate `children` inside a container of `size`.
    pub fn apply(&self, size: PixelSize, children: &[ViewHandle]) {
        let visible: Vec<&ViewHandle> =
            children.iter().filter(|child| child.is_visible()).collect();
        if visible.is_empty() {
            return;
        }

        let count = visible.len() as i32;
        let extent = match self.orientation {
            Orientation::Horizontal => size.width,
            Orientation::Vertical => size.height,
        };
        let available = (extent - self.spacing * (count - 1)).max(0);
        let share = available / count;

        let mut offset = 0;
        for (index, child) in visible.iter().enumerate() {
            let length = if index as i32 == count - 1 {
                available - share * (count - 1)
            } else {
                share
            };
            let rect = match self.orientation {
                Orientation::Horizontal => PixelRect::new(offset, 0, length, size.height),
                Orientation::Vertical => PixelRect::new(0, offset, size.width, length),
            };
            child.size_allocate(rect);
            offset += length + self.spacing;
        }
    }
}

/// An owning wrapper that stores children for its [`Container`].
pub struct Panel {
    container: Rc<RefCell<Container>>,
    handle: ViewHandle,
    children: RefCell<Vec<ViewHandle>>,
    layout_fn: RefCell<Option<Rc<LayoutFn>>>,
    draw_handler: RefCell<Option<Rc<DrawHandler>>>,
    bounds_changed: Signal<Rect>,
    pending_layout: Cell<bool>,
    pending_paint: Cell<bool>,
}

impl Panel {
    pub fn new() -> Rc<Self> {
        Self::with_name(String::new())
    }

    pub fn with_name(name: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|this: &Weak<Panel>| {
            let delegate: Weak<dyn ContainerDelegate> = this.clone();
            let container = Rc::new(RefCell::new(Container::with_base(
                ViewBase::with_name(name),
                delegate,
            )));
            let handle = ViewHandle::from_rc(container.clone());
            Self {
                container,
                handle,
                children: RefCell::new(Vec::new()),
                layout_fn: RefCell::new(None),
                draw_handler: RefCell::new(None),
                bounds_changed: Signal::new(),
                pending_layout: Cell::new(false),
                pending_paint: Cell::new(false),
            }
        })
    }

    /// The container view, for adding this panel to a parent or a window.
    pub fn view(&self) -> ViewHandle {
        self.handle.clone()
    }

    /// Emitted with the logical bounds after every layout pass.
    pub fn bounds_changed(&self) -> &Signal<Rect> {
        &self.bounds_changed
    }

    pub fn add_child_view(&self, view: ViewHandle) {
        let index = self.child_count();
        self.add_child_view_at(view, index);
    }

    /// Insert `view` at `index` (clamped to the child count).
    ///
    /// A view that is already a child is moved.
    pub fn add_child_view_at(&self, view: ViewHandle, index: usize) {
        {
            let mut children = self.children.borrow_mut();
            children.retain(|child| !child.ptr_eq(&view));
            let index = index.min(children.len());
            children.insert(index, view.clone());
        }
        view.set_parent(Some(self.handle.node()));
        tracing::debug!(
            target: targets::CONTAINER,
            panel = %self.handle.name(),
            child = %view.name(),
            "child added"
        );
        self.children_changed();
    }

    /// Remove `view`, clearing its parent link. Returns `false` if it was not
    /// a child.
    pub fn remove_child_view(&self, view: &ViewHandle) -> bool {
        let removed = {
            let mut children = self.children.borrow_mut();
            children
                .iter()
                .position(|child| child.ptr_eq(view))
                .map(|index| children.remove(index))
        };
        let Some(removed) = removed else {
            return false;
        };
        removed.set_parent(None);
        tracing::debug!(
            target: targets::CONTAINER,
            panel = %self.handle.name(),
            child = %removed.name(),
            "child removed"
        );
        self.children_changed();
        true
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn child_at(&self, index: usize) -> Option<ViewHandle> {
        self.children.borrow().get(index).cloned()
    }

    /// The child currently under the pointer, as tracked by the container.
    pub fn hovered_child(&self) -> Option<ViewHandle> {
        self.container
            .try_borrow()
            .ok()
            .and_then(|container| container.hover_view())
    }

    /// Set the layout callback and lay out again.
    pub fn set_layout(&self, layout: impl Fn(PixelSize, &[ViewHandle]) + 'static) {
        *self.layout_fn.borrow_mut() = Some(Rc::new(layout));
        self.layout_now();
    }

    pub fn set_box_layout(&self, layout: BoxLayout) {
        self.set_layout(move |size, children| layout.apply(size, children));
    }

    /// Set the callback that paints below the children.
    pub fn set_draw_handler(&self, handler: impl Fn(&mut dyn Painter, Rect) + 'static) {
        *self.draw_handler.borrow_mut() = Some(Rc::new(handler));
        self.schedule_paint();
    }

    pub fn set_background_color(&self, color: Option<Color>) {
        match self.container.try_borrow_mut() {
            Ok(mut container) => container.view_base_mut().set_background_color(color),
            Err(_) => tracing::warn!(
                target: targets::CONTAINER,
                panel = %self.handle.name(),
                "container busy; background unchanged"
            ),
        }
    }

    /// Run the layout callback against the current allocation.
    ///
    /// Skipped while the container has no size yet. While the container is
    /// busy (for example when a child changes membership from inside one of
    /// its hooks) the layout runs once the container's hook returns.
    pub fn layout_now(&self) {
        match self.container.try_borrow() {
            Ok(container) => {
                let base = container.view_base();
                if !base.size_allocation().size.is_empty() {
                    self.layout(base);
                }
            }
            Err(_) => {
                tracing::trace!(
                    target: targets::CONTAINER,
                    panel = %self.handle.name(),
                    "container busy; layout deferred"
                );
                self.pending_layout.set(true);
            }
        }
    }

    fn schedule_paint(&self) {
        match self.container.try_borrow() {
            Ok(container) => container.view_base().schedule_paint(),
            Err(_) => self.pending_paint.set(true),
        }
    }

    fn children_changed(&self) {
        self.layout_now();
        self.schedule_paint();
    }
}

impl ContainerDelegate for Panel {
    fn layout(&self, base: &ViewBase) {
        let children = self.children.borrow().clone();
        let layout = self.layout_fn.borrow().clone();
        if let Some(layout) = layout {
            layout(base.size_allocation().size, &children);
        }
        self.bounds_changed.emit(base.bounds());
    }

    fn for_each(&self, f: &mut dyn FnMut(&ViewHandle) -> bool) {
        let children = self.children.borrow().clone();
        for child in &children {
            if !f(child) {
                break;
            }
        }
    }

    fn has_child(&self, view: &ViewHandle) -> bool {
        self.children.borrow().iter().any(|child| child.ptr_eq(view))
    }

    fn on_draw(&self, painter: &mut dyn Painter, dirty: Rect) {
        let handler = self.draw_handler.borrow().clone();
        if let Some(handler) = handler {
            handler(painter, dirty);
        }
    }

    fn flush_deferred(&self, base: &ViewBase) {
        if self.pending_layout.replace(false) && !base.size_allocation().size.is_empty() {
            self.layout(base);
        }
        if self.pending_paint.replace(false) {
            base.schedule_paint();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use arbor_render::{PixelPoint, RecordingPainter};

    use super::*;
    use crate::events::{ClickKind, MouseButton, MouseClickEvent};

    struct Block(ViewBase);

    impl View for Block {
        fn view_base(&self) -> &ViewBase {
            &self.0
        }

        fn view_base_mut(&mut self) -> &mut ViewBase {
            &mut self.0
        }
    }

    fn block(name: &str) -> ViewHandle {
        ViewHandle::new(Block(ViewBase::with_name(name)))
    }

    #[test]
    fn test_add_sets_parent_and_order() {
        let panel = Panel::new();
        let a = block("a");
        let b = block("b");
        let c = block("c");
        panel.add_child_view(a.clone());
        panel.add_child_view(c.clone());
        panel.add_child_view_at(b.clone(), 1);

        assert_eq!(panel.child_count(), 3);
        assert_eq!(panel.child_at(1), Some(b.clone()));
        assert!(panel.has_child(&c));
        assert!(std::rc::Rc::ptr_eq(&a.node().parent().unwrap(), panel.view().node()));
    }

    #[test]
    fn test_readd_moves_child() {
        let panel = Panel::new();
        let a = block("a");
        let b = block("b");
        panel.add_child_view(a.clone());
        panel.add_child_view(b.clone());
        panel.add_child_view_at(b.clone(), 0);
        assert_eq!(panel.child_count(), 2);
        assert_eq!(panel.child_at(0), Some(b));
    }

    #[test]
    fn test_remove_clears_parent() {
        let panel = Panel::new();
        let a = block("a");
        panel.add_child_view(a.clone());
        assert!(panel.remove_child_view(&a));
        assert!(a.node().parent().is_none());
        assert!(!panel.has_child(&a));
        assert!(!panel.remove_child_view(&a));
    }

    #[test]
    fn test_box_layout_horizontal_remainder() {
        let panel = Panel::new();
        let children: Vec<ViewHandle> = ["a", "b", "c"].into_iter().map(block).collect();
        for child in &children {
            panel.add_child_view(child.clone());
        }
        panel.set_box_layout(BoxLayout::horizontal(0));
        panel.view().size_allocate(PixelRect::new(0, 0, 100, 30));

        assert_eq!(children[0].allocation(), PixelRect::new(0, 0, 33, 30));
        assert_eq!(children[1].allocation(), PixelRect::new(33, 0, 33, 30));
        assert_eq!(children[2].allocation(), PixelRect::new(66, 0, 34, 30));
    }

    #[test]
    fn test_box_layout_vertical_skips_hidden() {
        let panel = Panel::new();
        let a = block("a");
        let hidden = block("hidden");
        let b = block("b");
        for child in [&a, &hidden, &b] {
            panel.add_child_view(child.clone());
        }
        hidden.set_visible(false);
        panel.set_box_layout(BoxLayout::vertical(10));
        panel.view().size_allocate(PixelRect::new(0, 0, 40, 90));

        assert_eq!(a.allocation(), PixelRect::new(0, 0, 40, 40));
        assert_eq!(b.allocation(), PixelRect::new(0, 50, 40, 40));
        assert_eq!(hidden.allocation(), PixelRect::ZERO);
    }

    #[test]
    fn test_adding_child_relays_out() {
        let panel = Panel::new();
        panel.set_box_layout(BoxLayout::horizontal(0));
        panel.view().size_allocate(PixelRect::new(0, 0, 80, 10));

        let a = block("a");
        panel.add_child_view(a.clone());
        assert_eq!(a.allocation(), PixelRect::new(0, 0, 80, 10));

        let b = block("b");
        panel.add_child_view(b.clone());
        assert_eq!(a.allocation(), PixelRect::new(0, 0, 40, 10));
        assert_eq!(b.allocation(), PixelRect::new(40, 0, 40, 10));
    }

    #[test]
    fn test_bounds_changed_emitted_on_layout() {
        let panel = Panel::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        panel.bounds_changed().connect(move |bounds: &Rect| {
            assert_eq!(bounds.width(), 64.0);
            seen.fetch_add(1, Ordering::SeqCst);
        });
        panel.view().size_allocate(PixelRect::new(0, 0, 64, 64));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        panel.view().size_allocate(PixelRect::new(0, 0, 0, 0));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_draw_handler_runs_with_logical_dirty() {
        let panel = Panel::new();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        panel.set_draw_handler(move |painter, dirty| {
            assert_eq!(dirty, Rect::new(0.0, 0.0, 10.0, 10.0));
            painter.fill_rect(dirty, Color::RED);
            seen.set(seen.get() + 1);
        });
        panel.view().size_allocate(PixelRect::new(0, 0, 50, 50));

        let mut painter = RecordingPainter::new(1.0);
        panel.view().draw(&mut painter, PixelRect::new(0, 0, 10, 10));
        assert_eq!(calls.get(), 1);
        assert_eq!(painter.fills(), vec![(PixelRect::new(0, 0, 10, 10), Color::RED)]);
    }

    #[test]
    fn test_child_removing_itself_during_enumeration() {
        let panel = Panel::new();
        let a = block("a");
        let b = block("b");
        panel.add_child_view(a.clone());
        panel.add_child_view(b.clone());

        let mut visited = Vec::new();
        panel.for_each(&mut |child| {
            visited.push(child.name());
            panel.remove_child_view(child);
            true
        });
        assert_eq!(visited, ["a", "b"]);
        assert_eq!(panel.child_count(), 0);
    }

    #[test]
    fn test_add_during_layout_is_deferred() {
        let panel = Panel::new();
        let weak = Rc::downgrade(&panel);
        let late = block("late");
        let to_add = late.clone();
        panel.set_layout(move |size, children| {
            if children.is_empty() {
                if let Some(panel) = weak.upgrade() {
                    panel.add_child_view(to_add.clone());
                }
            }
            for child in children {
                child.size_allocate(PixelRect::from_size(size));
            }
        });
        panel.view().size_allocate(PixelRect::new(0, 0, 10, 10));
        assert!(panel.has_child(&late));
        // The second pass ran after the first one returned.
        assert_eq!(late.allocation(), PixelRect::new(0, 0, 10, 10));
    }

    /// Removes a named view from its panel when clicked.
    struct Remover {
        base: ViewBase,
        panel: Weak<Panel>,
        target: RefCell<Option<ViewHandle>>,
    }

    impl View for Remover {
        fn view_base(&self) -> &ViewBase {
            &self.base
        }

        fn view_base_mut(&mut self) -> &mut ViewBase {
            &mut self.base
        }

        fn on_mouse_click(&mut self, _event: &MouseClickEvent) -> bool {
            let target = self.target.borrow_mut().take();
            if let (Some(panel), Some(target)) = (self.panel.upgrade(), target) {
                panel.remove_child_view(&target);
            }
            true
        }
    }

    fn click_at(view: &ViewHandle, x: i32, y: i32) -> bool {
        view.mouse_click(&MouseClickEvent::new(
            ClickKind::Press,
            MouseButton::Left,
            PixelPoint::new(x, y),
        ))
    }

    #[test]
    fn test_child_removes_itself_from_click() {
        let panel = Panel::new();
        panel.set_box_layout(BoxLayout::horizontal(0));
        let remover = Rc::new(RefCell::new(Remover {
            base: ViewBase::with_name("remover"),
            panel: Rc::downgrade(&panel),
            target: RefCell::new(None),
        }));
        let a = ViewHandle::from_rc(remover.clone());
        *remover.borrow().target.borrow_mut() = Some(a.clone());
        let b = block("b");
        panel.add_child_view(a.clone());
        panel.add_child_view(b.clone());
        panel.view().size_allocate(PixelRect::new(0, 0, 100, 20));

        assert!(click_at(&panel.view(), 10, 10));
        assert!(!panel.has_child(&a));
        assert!(a.node().parent().is_none());
        assert!(!a.node().window().is_attached());
        // Layout postponed during the click ran once the click returned.
        assert_eq!(b.allocation(), PixelRect::new(0, 0, 100, 20));
    }

    #[test]
    fn test_child_removes_sibling_from_click() {
        let panel = Panel::new();
        panel.set_box_layout(BoxLayout::horizontal(0));
        let b = block("b");
        let a = ViewHandle::new(Remover {
            base: ViewBase::with_name("a"),
            panel: Rc::downgrade(&panel),
            target: RefCell::new(Some(b.clone())),
        });
        panel.add_child_view(a.clone());
        panel.add_child_view(b.clone());
        panel.view().size_allocate(PixelRect::new(0, 0, 100, 20));
        assert_eq!(a.allocation(), PixelRect::new(0, 0, 50, 20));

        click_at(&panel.view(), 10, 10);
        assert!(b.node().parent().is_none());
        assert_eq!(a.allocation(), PixelRect::new(0, 0, 100, 20));
    }
}
