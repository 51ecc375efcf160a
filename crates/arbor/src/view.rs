//! The view node: the base unit of the tree.
//!
//! A view is split in two halves:
//!
//! - [`ViewNode`] holds the geometric state (allocation, visibility, scale,
//!   parent link, window link) in `Cell`s behind an `Rc`. Geometric queries
//!   such as [`ViewNode::clipped_rect`] walk parent links without borrowing
//!   any view mutably, so they are safe to call in the middle of routing.
//! - The [`View`] trait object holds behavior. It lives in a `RefCell` and
//!   is borrowed mutably only while one of its hooks runs.
//!
//! [`ViewHandle`] pairs the two and is what containers enumerate and what
//! the window holds as its content view. Every back-reference (parent,
//! hover, capture, focus) is a `Weak`, so a view never keeps its parent or
//! the window alive.
//!
//! # Coordinate spaces
//!
//! A view's allocation is expressed in its parent's pixel space. Events and
//! dirty rectangles handed to a view are in its own local space, where
//! (0, 0) is the top-left corner of its allocation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use arbor_core::logging::targets;
use arbor_render::{Color, Painter, PixelPoint, PixelRect, Rect, scale_rect};
use static_assertions::assert_not_impl_any;

use crate::error::{ViewError, ViewResult};
use crate::events::{MouseClickEvent, MouseMoveEvent, WheelEvent};
use crate::window::WindowHandle;

/// The interior-mutable cell every view lives in.
pub type ViewCell = RefCell<dyn View>;

/// Shared geometric state of one view.
pub struct ViewNode {
    name: RefCell<String>,
    allocation: Cell<PixelRect>,
    visible: Cell<bool>,
    hovered: Cell<bool>,
    focused: Cell<bool>,
    focusable: Cell<bool>,
    scale_factor: Cell<f32>,
    parent: RefCell<Weak<ViewNode>>,
    window: RefCell<WindowHandle>,
    owner: RefCell<Option<Weak<ViewCell>>>,
}

impl ViewNode {
    fn new(name: String) -> Self {
        Self {
            name: RefCell::new(name),
            allocation: Cell::new(PixelRect::ZERO),
            visible: Cell::new(true),
            hovered: Cell::new(false),
            focused: Cell::new(false),
            focusable: Cell::new(false),
            scale_factor: Cell::new(1.0),
            parent: RefCell::new(Weak::new()),
            window: RefCell::new(WindowHandle::default()),
            owner: RefCell::new(None),
        }
    }

    /// Debug name of the view.
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Allocated bounds in the parent's pixel space.
    pub fn allocation(&self) -> PixelRect {
        self.allocation.get()
    }

    /// Allocated bounds in logical units.
    pub fn bounds(&self) -> Rect {
        scale_rect(self.allocation.get(), 1.0 / self.scale_factor())
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable.get()
    }

    /// Device pixels per logical unit.
    ///
    /// Read live from the window at the root of the tree, so a scale change
    /// reaches every view at once. A tree with no window keeps the last
    /// scale its root saw.
    pub fn scale_factor(&self) -> f32 {
        match self.parent() {
            Some(parent) => parent.scale_factor(),
            None => self
                .window
                .borrow()
                .scale_factor()
                .unwrap_or(self.scale_factor.get()),
        }
    }

    /// The parent node, if attached and still alive.
    pub fn parent(&self) -> Option<Rc<ViewNode>> {
        self.parent.borrow().upgrade()
    }

    /// The window at the root of this view's tree (possibly dead).
    ///
    /// Only the root stores a window link; every other view reaches it
    /// through its parent chain.
    pub fn window(&self) -> WindowHandle {
        match self.parent() {
            Some(parent) => parent.window(),
            None => self.window.borrow().clone(),
        }
    }

    /// The allocation intersected with every ancestor's visible area, in
    /// the parent's pixel space.
    ///
    /// A view scrolled or sized entirely outside its parent yields an empty
    /// rectangle located at its own origin.
    pub fn clipped_rect(&self) -> PixelRect {
        let rect = self.allocation.get();
        let Some(parent) = self.parent() else {
            return rect;
        };
        let parent_visible = parent.clipped_rect() - parent.allocation().offset_from_origin();
        rect.intersect(&parent_visible)
            .unwrap_or(PixelRect::new(rect.x(), rect.y(), 0, 0))
    }

    /// Origin of this view's local space in window client pixels.
    pub fn window_origin(&self) -> PixelPoint {
        let own = self.allocation.get().origin;
        match self.parent() {
            Some(parent) => own + parent.window_origin().offset_from_origin(),
            None => own,
        }
    }

    /// Convert a local point to window client pixels.
    pub fn to_window(&self, local: PixelPoint) -> PixelPoint {
        local + self.window_origin().offset_from_origin()
    }

    /// Convert a window client point to local pixels.
    pub fn from_window(&self, point: PixelPoint) -> PixelPoint {
        point - self.window_origin().offset_from_origin()
    }

    /// [`clipped_rect`](Self::clipped_rect) in window client pixels.
    pub fn window_clipped_rect(&self) -> PixelRect {
        let clipped = self.clipped_rect();
        match self.parent() {
            Some(parent) => clipped + parent.window_origin().offset_from_origin(),
            None => clipped,
        }
    }

    /// Point the parent link at `parent`, or detach.
    ///
    /// Touches only this node, so it is safe while the view is borrowed.
    pub(crate) fn link_parent(&self, parent: Option<&Rc<ViewNode>>) {
        match parent {
            Some(parent) => {
                self.scale_factor.set(parent.scale_factor());
                *self.parent.borrow_mut() = Rc::downgrade(parent);
                *self.window.borrow_mut() = WindowHandle::default();
            }
            None => {
                self.scale_factor.set(self.scale_factor());
                *self.parent.borrow_mut() = Weak::new();
                *self.window.borrow_mut() = WindowHandle::default();
            }
        }
    }

    /// Make this node the root of `window`'s tree.
    pub(crate) fn link_window(&self, window: &WindowHandle) {
        *self.parent.borrow_mut() = Weak::new();
        *self.window.borrow_mut() = window.clone();
        if let Some(scale) = window.scale_factor() {
            self.scale_factor.set(scale);
        }
    }

    pub(crate) fn set_allocation(&self, allocation: PixelRect) {
        self.allocation.set(allocation);
    }

    pub(crate) fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    pub(crate) fn set_hovered(&self, hovered: bool) {
        self.hovered.set(hovered);
    }

    pub(crate) fn set_focused(&self, focused: bool) {
        self.focused.set(focused);
    }

    fn weak_view(&self) -> Option<Weak<ViewCell>> {
        self.owner.borrow().clone()
    }
}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewNode")
            .field("name", &*self.name.borrow())
            .field("allocation", &self.allocation.get())
            .field("visible", &self.visible.get())
            .finish_non_exhaustive()
    }
}

/// State embedded in every view implementation.
pub struct ViewBase {
    node: Rc<ViewNode>,
    background_color: Option<Color>,
}

impl Default for ViewBase {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBase {
    pub fn new() -> Self {
        Self::with_name(String::new())
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            node: Rc::new(ViewNode::new(name.into())),
            background_color: None,
        }
    }

    pub fn node(&self) -> &Rc<ViewNode> {
        &self.node
    }

    pub fn name(&self) -> String {
        self.node.name()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        *self.node.name.borrow_mut() = name.into();
    }

    /// Store new bounds, in the parent's pixel space.
    pub fn size_allocate(&mut self, allocation: PixelRect) {
        tracing::trace!(
            target: targets::VIEW,
            view = %self.node.name(),
            ?allocation,
            "size allocate"
        );
        self.node.set_allocation(allocation);
    }

    pub fn size_allocation(&self) -> PixelRect {
        self.node.allocation()
    }

    pub fn bounds(&self) -> Rect {
        self.node.bounds()
    }

    /// Rewrite the parent back-reference.
    ///
    /// The window link and scale factor follow the new parent. Passing
    /// `None` detaches the view from any window.
    pub fn set_parent(&mut self, parent: Option<&Rc<ViewNode>>) {
        self.node.link_parent(parent);
    }

    pub fn parent(&self) -> Option<Rc<ViewNode>> {
        self.node.parent()
    }

    /// Become the root of `window`'s tree: no parent, the window's scale.
    pub fn become_content_view(&mut self, window: &WindowHandle) {
        self.node.link_window(window);
    }

    pub fn window(&self) -> WindowHandle {
        self.node.window()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.node.set_visible(visible);
    }

    pub fn is_visible(&self) -> bool {
        self.node.is_visible()
    }

    pub fn is_hovered(&self) -> bool {
        self.node.is_hovered()
    }

    pub fn is_focused(&self) -> bool {
        self.node.is_focused()
    }

    /// Whether tab traversal may stop on this view.
    pub fn set_focusable(&mut self, focusable: bool) {
        self.node.focusable.set(focusable);
    }

    pub fn is_focusable(&self) -> bool {
        self.node.is_focusable()
    }

    pub fn scale_factor(&self) -> f32 {
        self.node.scale_factor()
    }

    pub fn clipped_rect(&self) -> PixelRect {
        self.node.clipped_rect()
    }

    pub fn background_color(&self) -> Option<Color> {
        self.background_color
    }

    /// Set the color [`draw`](Self::draw) fills with, and repaint.
    pub fn set_background_color(&mut self, color: Option<Color>) {
        self.background_color = color;
        self.schedule_paint();
    }

    /// Paint the background color over `dirty` (local pixels).
    pub fn draw(&self, painter: &mut dyn Painter, dirty: PixelRect) {
        if let Some(color) = self.background_color {
            painter.fill_pixel_rect(dirty, color);
        }
    }

    /// A weak handle to the view this base belongs to.
    ///
    /// `None` until the view has been wrapped in a [`ViewHandle`].
    pub fn weak_handle(&self) -> Option<WeakViewHandle> {
        self.node.weak_view().map(|view| WeakViewHandle {
            node: Rc::downgrade(&self.node),
            view,
        })
    }

    /// Route all pointer input of the window to this view.
    pub fn set_capture(&self) -> ViewResult<()> {
        let detached = || ViewError::Detached {
            view: self.node.name(),
        };
        let handle = self.weak_handle().ok_or_else(detached)?;
        if self.window().set_capture_weak(handle) {
            Ok(())
        } else {
            Err(detached())
        }
    }

    /// Give up pointer capture if this window holds it.
    pub fn release_capture(&self) -> ViewResult<()> {
        if self.window().release_capture() {
            Ok(())
        } else {
            Err(ViewError::Detached {
                view: self.node.name(),
            })
        }
    }

    /// Whether this view is the window's capture target.
    pub fn has_capture(&self) -> bool {
        self.window()
            .capture_view()
            .is_some_and(|view| Rc::ptr_eq(view.node(), &self.node))
    }

    /// Invalidate the visible part of this view.
    pub fn schedule_paint(&self) {
        if self.node.is_visible() {
            self.window().invalidate(Some(self.node.window_clipped_rect()));
        }
    }
}

/// Behavior of a view.
///
/// Every hook has a permissive default, so a leaf overrides only what it
/// needs. Containers override the structural methods to fan out to their
/// children.
pub trait View: 'static {
    fn view_base(&self) -> &ViewBase;

    fn view_base_mut(&mut self) -> &mut ViewBase;

    /// Store new bounds (parent pixel space).
    fn size_allocate(&mut self, allocation: PixelRect) {
        self.view_base_mut().size_allocate(allocation);
    }

    /// Rewrite the parent back-reference.
    fn set_parent(&mut self, parent: Option<&Rc<ViewNode>>) {
        self.view_base_mut().set_parent(parent);
    }

    /// Become the root view of `window`.
    fn become_content_view(&mut self, window: &WindowHandle) {
        self.view_base_mut().become_content_view(window);
    }

    fn set_visible(&mut self, visible: bool) {
        self.view_base_mut().set_visible(visible);
    }

    /// Paint into `painter`, whose origin is this view's top-left corner.
    ///
    /// `dirty` is in local pixels and already clipped to the visible part
    /// of the view.
    fn draw(&mut self, painter: &mut dyn Painter, dirty: PixelRect) {
        self.view_base().draw(painter, dirty);
    }

    fn on_mouse_enter(&mut self) {}

    fn on_mouse_leave(&mut self) {}

    fn on_mouse_move(&mut self, _event: &MouseMoveEvent) {}

    /// Returns `true` if the wheel event was consumed.
    fn on_mouse_wheel(&mut self, _event: &WheelEvent) -> bool {
        false
    }

    /// Returns `true` if the click was consumed.
    fn on_mouse_click(&mut self, _event: &MouseClickEvent) -> bool {
        false
    }

    /// The window took pointer capture away from this view.
    fn on_capture_lost(&mut self) {}

    fn on_focus_changed(&mut self, _focused: bool) {}

    /// A command notification from the native child window backing this view.
    fn on_command(&mut self, _code: u32, _command: i32) {}

    /// Background color for the native child window backing this view.
    fn on_control_color(&mut self) -> Option<Color> {
        None
    }

    /// Enumerate direct children; return `false` from `f` to stop early.
    fn for_each_child(&self, _f: &mut dyn FnMut(&ViewHandle) -> bool) {}
}

/// A strong, cloneable reference to a view.
///
/// Equality is identity.
#[derive(Clone)]
pub struct ViewHandle {
    node: Rc<ViewNode>,
    view: Rc<ViewCell>,
}

assert_not_impl_any!(ViewHandle: Send, Sync);

impl ViewHandle {
    /// Wrap a view.
    pub fn new<V: View>(view: V) -> Self {
        Self::from_rc(Rc::new(RefCell::new(view)))
    }

    /// Wrap an already shared view, keeping the caller's typed `Rc` usable.
    pub fn from_rc<V: View>(view: Rc<RefCell<V>>) -> Self {
        let node = view.borrow().view_base().node().clone();
        let view: Rc<ViewCell> = view;
        *node.owner.borrow_mut() = Some(Rc::downgrade(&view));
        Self { node, view }
    }

    pub fn node(&self) -> &Rc<ViewNode> {
        &self.node
    }

    pub fn name(&self) -> String {
        self.node.name()
    }

    pub fn allocation(&self) -> PixelRect {
        self.node.allocation()
    }

    pub fn is_visible(&self) -> bool {
        self.node.is_visible()
    }

    pub fn clipped_rect(&self) -> PixelRect {
        self.node.clipped_rect()
    }

    pub fn downgrade(&self) -> WeakViewHandle {
        WeakViewHandle {
            node: Rc::downgrade(&self.node),
            view: Rc::downgrade(&self.view),
        }
    }

    pub fn ptr_eq(&self, other: &ViewHandle) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Borrow the view immutably.
    pub fn with_view<R>(&self, f: impl FnOnce(&dyn View) -> R) -> ViewResult<R> {
        let view = self.view.try_borrow().map_err(|_| ViewError::Busy {
            view: self.node.name(),
            operation: "inspect",
        })?;
        Ok(f(&*view))
    }

    /// Borrow the view mutably for one hook call.
    ///
    /// Fails with [`ViewError::Busy`] instead of panicking when the view is
    /// already borrowed further up the stack.
    pub fn dispatch<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut dyn View) -> R,
    ) -> ViewResult<R> {
        let mut view = self.view.try_borrow_mut().map_err(|_| ViewError::Busy {
            view: self.node.name(),
            operation,
        })?;
        Ok(f(&mut *view))
    }

    fn dispatch_or<R>(
        &self,
        operation: &'static str,
        default: R,
        f: impl FnOnce(&mut dyn View) -> R,
    ) -> R {
        match self.dispatch(operation, f) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(target: targets::VIEW, %err, "dispatch skipped");
                default
            }
        }
    }

    /// Run a structural hook after the node itself was already updated.
    ///
    /// A busy view only misses its own follow-up work (layout, fan-out to
    /// children); the node state the rest of the tree reads is current.
    fn dispatch_structural(&self, operation: &'static str, f: impl FnOnce(&mut dyn View)) {
        if let Err(err) = self.dispatch(operation, f) {
            tracing::debug!(target: targets::VIEW, %err, "structural hook skipped");
        }
    }

    pub fn size_allocate(&self, allocation: PixelRect) {
        self.node.set_allocation(allocation);
        self.dispatch_structural("size_allocate", |view| view.size_allocate(allocation));
    }

    /// Rewrite the parent link, then let the view update its own subtree.
    ///
    /// The link is written even when the view is busy, so a view may remove
    /// itself from inside one of its own hooks.
    pub fn set_parent(&self, parent: Option<&Rc<ViewNode>>) {
        self.node.link_parent(parent);
        self.dispatch_structural("set_parent", |view| view.set_parent(parent));
    }

    pub fn become_content_view(&self, window: &WindowHandle) {
        self.node.link_window(window);
        self.dispatch_structural("become_content_view", |view| {
            view.become_content_view(window)
        });
    }

    pub fn set_visible(&self, visible: bool) {
        self.node.set_visible(visible);
        self.dispatch_structural("set_visible", |view| view.set_visible(visible));
    }

    pub fn draw(&self, painter: &mut dyn Painter, dirty: PixelRect) {
        self.dispatch_or("draw", (), |view| view.draw(painter, dirty));
    }

    /// Mark the view hovered and run its enter hook.
    pub fn mouse_enter(&self) {
        self.node.set_hovered(true);
        self.dispatch_or("mouse_enter", (), |view| view.on_mouse_enter());
    }

    /// Clear the hovered mark and run the leave hook.
    pub fn mouse_leave(&self) {
        self.node.set_hovered(false);
        self.dispatch_or("mouse_leave", (), |view| view.on_mouse_leave());
    }

    pub fn mouse_move(&self, event: &MouseMoveEvent) {
        self.dispatch_or("mouse_move", (), |view| view.on_mouse_move(event));
    }

    pub fn mouse_wheel(&self, event: &WheelEvent) -> bool {
        self.dispatch_or("mouse_wheel", false, |view| view.on_mouse_wheel(event))
    }

    pub fn mouse_click(&self, event: &MouseClickEvent) -> bool {
        self.dispatch_or("mouse_click", false, |view| view.on_mouse_click(event))
    }

    pub fn capture_lost(&self) {
        self.dispatch_or("capture_lost", (), |view| view.on_capture_lost());
    }

    /// Update the focused mark and run the focus hook.
    pub fn focus_changed(&self, focused: bool) {
        self.node.set_focused(focused);
        self.dispatch_or("focus_changed", (), |view| view.on_focus_changed(focused));
    }

    pub fn command(&self, code: u32, command: i32) {
        self.dispatch_or("command", (), |view| view.on_command(code, command));
    }

    pub fn control_color(&self) -> Option<Color> {
        self.dispatch_or("control_color", None, |view| view.on_control_color())
    }

    pub fn for_each_child(&self, f: &mut dyn FnMut(&ViewHandle) -> bool) {
        if let Err(err) = self.with_view(|view| view.for_each_child(f)) {
            tracing::warn!(target: targets::VIEW, %err, "child enumeration skipped");
        }
    }
}

impl PartialEq for ViewHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ViewHandle {}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewHandle").field(&self.node).finish()
    }
}

/// A non-owning reference to a view.
#[derive(Clone)]
pub struct WeakViewHandle {
    node: Weak<ViewNode>,
    view: Weak<ViewCell>,
}

impl WeakViewHandle {
    /// The view, if it is still alive.
    pub fn upgrade(&self) -> Option<ViewHandle> {
        Some(ViewHandle {
            node: self.node.upgrade()?,
            view: self.view.upgrade()?,
        })
    }

    /// Whether this refers to `view`.
    pub fn ptr_eq(&self, view: &ViewHandle) -> bool {
        std::ptr::eq(self.node.as_ptr(), Rc::as_ptr(&view.node))
    }

    pub fn is_alive(&self) -> bool {
        self.view.strong_count() > 0
    }
}

impl fmt::Debug for WeakViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node.upgrade() {
            Some(node) => write!(f, "WeakViewHandle({:?})", node.name()),
            None => f.write_str("WeakViewHandle(<dropped>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_render::{PixelOffset, RecordingPainter};

    struct Leaf {
        base: ViewBase,
        enters: usize,
    }

    impl Leaf {
        fn new(name: &str) -> Self {
            Self {
                base: ViewBase::with_name(name),
                enters: 0,
            }
        }
    }

    impl View for Leaf {
        fn view_base(&self) -> &ViewBase {
            &self.base
        }

        fn view_base_mut(&mut self) -> &mut ViewBase {
            &mut self.base
        }

        fn on_mouse_enter(&mut self) {
            self.enters += 1;
        }
    }

    fn attach(child: &ViewHandle, parent: &ViewHandle, rect: PixelRect) {
        child.set_parent(Some(parent.node()));
        child.size_allocate(rect);
    }

    #[test]
    fn test_size_allocate_stores_bounds() {
        let view = ViewHandle::new(Leaf::new("leaf"));
        view.size_allocate(PixelRect::new(5, 6, 70, 80));
        assert_eq!(view.allocation(), PixelRect::new(5, 6, 70, 80));
        assert_eq!(view.node().bounds(), Rect::new(5.0, 6.0, 70.0, 80.0));
    }

    #[test]
    fn test_set_parent_rewrites_back_reference() {
        let a = ViewHandle::new(Leaf::new("a"));
        let b = ViewHandle::new(Leaf::new("b"));
        let child = ViewHandle::new(Leaf::new("child"));

        child.set_parent(Some(a.node()));
        assert!(Rc::ptr_eq(&child.node().parent().unwrap(), a.node()));

        child.set_parent(Some(b.node()));
        assert!(Rc::ptr_eq(&child.node().parent().unwrap(), b.node()));

        child.set_parent(None);
        assert!(child.node().parent().is_none());
    }

    #[test]
    fn test_parent_link_does_not_own_parent() {
        let child = ViewHandle::new(Leaf::new("child"));
        {
            let parent = ViewHandle::new(Leaf::new("parent"));
            child.set_parent(Some(parent.node()));
        }
        assert!(child.node().parent().is_none());
    }

    #[test]
    fn test_clipped_rect_intersects_ancestors() {
        let root = ViewHandle::new(Leaf::new("root"));
        root.size_allocate(PixelRect::new(0, 0, 100, 100));
        let middle = ViewHandle::new(Leaf::new("middle"));
        attach(&middle, &root, PixelRect::new(50, 50, 100, 100));
        let leaf = ViewHandle::new(Leaf::new("leaf"));
        attach(&leaf, &middle, PixelRect::new(10, 10, 80, 80));

        // middle is visible over [50,50]..[100,100] of root => [0,0,50,50] locally
        assert_eq!(middle.clipped_rect(), PixelRect::new(50, 50, 50, 50));
        assert_eq!(leaf.clipped_rect(), PixelRect::new(10, 10, 40, 40));
    }

    #[test]
    fn test_clipped_rect_outside_parent_is_empty() {
        let root = ViewHandle::new(Leaf::new("root"));
        root.size_allocate(PixelRect::new(0, 0, 100, 100));
        let leaf = ViewHandle::new(Leaf::new("leaf"));
        attach(&leaf, &root, PixelRect::new(150, 0, 20, 20));

        let clipped = leaf.clipped_rect();
        assert!(clipped.is_empty());
        assert!(!clipped.contains(PixelPoint::new(150, 0)));
    }

    #[test]
    fn test_window_coordinates_round_trip() {
        let root = ViewHandle::new(Leaf::new("root"));
        root.size_allocate(PixelRect::new(0, 0, 400, 400));
        let container = ViewHandle::new(Leaf::new("container"));
        attach(&container, &root, PixelRect::new(30, 40, 200, 200));
        let leaf = ViewHandle::new(Leaf::new("leaf"));
        attach(&leaf, &container, PixelRect::new(7, 9, 50, 50));

        assert_eq!(leaf.node().window_origin(), PixelPoint::new(37, 49));
        for (x, y) in [(0, 0), (3, 4), (-2, 60)] {
            let local = PixelPoint::new(x, y);
            let window = leaf.node().to_window(local);
            assert_eq!(window, PixelPoint::new(37 + x, 49 + y));
            assert_eq!(leaf.node().from_window(window), local);
        }
        assert_eq!(
            leaf.node().window_clipped_rect(),
            PixelRect::new(37, 49, 50, 50)
        );
    }

    #[test]
    fn test_scale_factor_inherited_from_parent() {
        let parent = Leaf::new("parent");
        parent.base.node().scale_factor.set(2.0);
        let parent = ViewHandle::new(parent);
        let child = ViewHandle::new(Leaf::new("child"));
        child.set_parent(Some(parent.node()));
        child.size_allocate(PixelRect::new(20, 20, 100, 50));

        assert_eq!(child.node().scale_factor(), 2.0);
        assert_eq!(child.node().bounds(), Rect::new(10.0, 10.0, 50.0, 25.0));
    }

    #[test]
    fn test_scale_factor_follows_root() {
        let root = Leaf::new("root");
        root.base.node().scale_factor.set(1.5);
        let root = ViewHandle::new(root);
        let middle = ViewHandle::new(Leaf::new("middle"));
        let leaf = ViewHandle::new(Leaf::new("leaf"));
        middle.set_parent(Some(root.node()));
        leaf.set_parent(Some(middle.node()));
        assert_eq!(leaf.node().scale_factor(), 1.5);

        root.node().scale_factor.set(3.0);
        assert_eq!(leaf.node().scale_factor(), 3.0);

        // Detaching keeps the last scale seen.
        leaf.set_parent(None);
        root.node().scale_factor.set(1.0);
        assert_eq!(leaf.node().scale_factor(), 3.0);
    }

    #[test]
    fn test_busy_view_still_relinks() {
        let parent = ViewHandle::new(Leaf::new("parent"));
        let child = ViewHandle::new(Leaf::new("child"));
        child.set_parent(Some(parent.node()));

        let inner = child.clone();
        child
            .dispatch("outer", |_| {
                inner.set_parent(None);
                inner.set_visible(false);
                inner.size_allocate(PixelRect::new(1, 2, 3, 4));
            })
            .unwrap();

        assert!(child.node().parent().is_none());
        assert!(!child.is_visible());
        assert_eq!(child.allocation(), PixelRect::new(1, 2, 3, 4));
    }

    #[test]
    fn test_enter_sets_hover_flag() {
        let leaf = Rc::new(RefCell::new(Leaf::new("leaf")));
        let handle = ViewHandle::from_rc(leaf.clone());
        handle.mouse_enter();
        assert!(handle.node().is_hovered());
        assert_eq!(leaf.borrow().enters, 1);
        handle.mouse_leave();
        assert!(!handle.node().is_hovered());
    }

    #[test]
    fn test_reentrant_dispatch_is_reported() {
        let handle = ViewHandle::new(Leaf::new("busy"));
        let inner = handle.clone();
        let result = handle.dispatch("outer", |_| inner.dispatch("inner", |_| ()));
        assert_eq!(
            result,
            Ok(Err(ViewError::Busy {
                view: "busy".into(),
                operation: "inner",
            }))
        );
    }

    #[test]
    fn test_weak_handle_identity() {
        let a = ViewHandle::new(Leaf::new("a"));
        let b = ViewHandle::new(Leaf::new("b"));
        let weak = a.downgrade();
        assert!(weak.ptr_eq(&a));
        assert!(!weak.ptr_eq(&b));
        assert_eq!(weak.upgrade(), Some(a.clone()));

        drop(a);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_base_weak_handle_points_at_owner() {
        let leaf = Rc::new(RefCell::new(Leaf::new("leaf")));
        assert!(leaf.borrow().base.weak_handle().is_none());
        let handle = ViewHandle::from_rc(leaf.clone());
        let weak = leaf.borrow().base.weak_handle().unwrap();
        assert!(weak.ptr_eq(&handle));
    }

    #[test]
    fn test_capture_requires_window() {
        let handle = ViewHandle::new(Leaf::new("orphan"));
        let result = handle.with_view(|view| view.view_base().set_capture()).unwrap();
        assert_eq!(
            result,
            Err(ViewError::Detached {
                view: "orphan".into()
            })
        );
    }

    #[test]
    fn test_default_draw_fills_background() {
        let mut leaf = Leaf::new("leaf");
        leaf.base.background_color = Some(Color::RED);
        let handle = ViewHandle::new(leaf);
        let mut painter = RecordingPainter::new(1.0);
        painter.translate_pixel(PixelOffset::new(10, 0));
        handle.draw(&mut painter, PixelRect::new(0, 0, 5, 5));
        assert_eq!(painter.fills(), vec![(PixelRect::new(10, 0, 5, 5), Color::RED)]);
    }
}
