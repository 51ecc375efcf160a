//! State a window shares with the views in its tree.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use arbor_core::logging::targets;
use arbor_render::PixelRect;

use crate::platform::PlatformWindow;
use crate::view::{ViewHandle, WeakViewHandle};

/// The part of a top-level window that views can reach while it is
/// dispatching into them: the native window and the capture target.
///
/// Borrows of either cell never span a call into a view.
pub(crate) struct WindowShared {
    platform: RefCell<Box<dyn PlatformWindow>>,
    capture: RefCell<Option<WeakViewHandle>>,
}

impl WindowShared {
    pub(crate) fn new(platform: Box<dyn PlatformWindow>) -> Self {
        Self {
            platform: RefCell::new(platform),
            capture: RefCell::new(None),
        }
    }

    pub(crate) fn with_platform<R>(&self, f: impl FnOnce(&dyn PlatformWindow) -> R) -> R {
        f(&**self.platform.borrow())
    }

    pub(crate) fn with_platform_mut<R>(
        &self,
        f: impl FnOnce(&mut dyn PlatformWindow) -> R,
    ) -> R {
        f(&mut **self.platform.borrow_mut())
    }

    pub(crate) fn scale_factor(&self) -> f32 {
        self.with_platform(|platform| platform.scale_factor())
    }

    pub(crate) fn set_scale_factor(&self, scale_factor: f32) {
        self.with_platform_mut(|platform| platform.set_scale_factor(scale_factor));
    }

    pub(crate) fn invalidate(&self, rect: Option<PixelRect>, all_children: bool) {
        self.with_platform_mut(|platform| platform.invalidate(rect, all_children));
    }

    /// Make `target` the capture target.
    ///
    /// A different view that held capture is told it lost it.
    pub(crate) fn set_capture(&self, target: WeakViewHandle) {
        self.with_platform_mut(|platform| platform.set_capture());
        let previous = self.capture.replace(Some(target.clone()));
        if let Some(previous) = previous.and_then(|weak| weak.upgrade()) {
            if !target.ptr_eq(&previous) {
                notify_capture_lost(&previous);
            }
        }
        tracing::debug!(target: targets::WINDOW, view = ?target, "capture set");
    }

    /// Release capture, but only if this window holds it.
    pub(crate) fn release_capture(&self) {
        if !self.with_platform(|platform| platform.has_capture()) {
            return;
        }
        self.with_platform_mut(|platform| platform.release_capture());
        self.capture_changed();
    }

    /// Forget the capture target and tell it capture is gone.
    pub(crate) fn capture_changed(&self) {
        let target = self.capture.borrow_mut().take();
        match target.and_then(|weak| weak.upgrade()) {
            Some(view) => {
                tracing::debug!(target: targets::WINDOW, view = %view.name(), "capture lost");
                notify_capture_lost(&view);
            }
            None => {
                tracing::trace!(target: targets::WINDOW, "capture changed without a live target")
            }
        }
    }

    /// The capture target.
    ///
    /// A target that was dropped is forgotten. A target that is no longer in
    /// this window's tree loses capture as if it had been released.
    pub(crate) fn capture_view(&self) -> Option<ViewHandle> {
        let view = {
            let mut capture = self.capture.borrow_mut();
            let view = capture.as_ref().and_then(|weak| weak.upgrade());
            if view.is_none() && capture.take().is_some() {
                tracing::debug!(target: targets::WINDOW, "dropped stale capture target");
            }
            view?
        };
        if view.node().window().refers_to(self) {
            return Some(view);
        }

        tracing::debug!(
            target: targets::WINDOW,
            view = %view.name(),
            "capture target left the window"
        );
        self.capture.borrow_mut().take();
        if self.with_platform(|platform| platform.has_capture()) {
            self.with_platform_mut(|platform| platform.release_capture());
        }
        notify_capture_lost(&view);
        None
    }
}

/// A view releasing its own capture from inside one of its hooks is still
/// borrowed; it already knows, so the notification is skipped.
fn notify_capture_lost(view: &ViewHandle) {
    if let Err(err) = view.dispatch("capture_lost", |view| view.on_capture_lost()) {
        tracing::trace!(target: targets::WINDOW, %err, "capture-lost notification skipped");
    }
}

/// A weak reference from a view to the window hosting its tree.
///
/// Every operation is a no-op (or reports failure) once the window is gone
/// or when the view was never attached.
#[derive(Clone, Default)]
pub struct WindowHandle(Weak<WindowShared>);

impl WindowHandle {
    pub(crate) fn new(shared: &Rc<WindowShared>) -> Self {
        Self(Rc::downgrade(shared))
    }

    /// Whether the handle refers to a live window.
    pub fn is_attached(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Whether both handles refer to the same window.
    pub fn ptr_eq(&self, other: &WindowHandle) -> bool {
        self.0.ptr_eq(&other.0)
    }

    pub(crate) fn refers_to(&self, shared: &WindowShared) -> bool {
        std::ptr::eq(self.0.as_ptr(), shared)
    }

    pub fn scale_factor(&self) -> Option<f32> {
        self.0.upgrade().map(|shared| shared.scale_factor())
    }

    /// Capture the pointer for `view`. Returns `false` if detached.
    pub fn set_capture(&self, view: &ViewHandle) -> bool {
        self.set_capture_weak(view.downgrade())
    }

    pub(crate) fn set_capture_weak(&self, view: WeakViewHandle) -> bool {
        match self.0.upgrade() {
            Some(shared) => {
                shared.set_capture(view);
                true
            }
            None => false,
        }
    }

    /// Release capture if the window holds it. Returns `false` if detached.
    pub fn release_capture(&self) -> bool {
        match self.0.upgrade() {
            Some(shared) => {
                shared.release_capture();
                true
            }
            None => false,
        }
    }

    pub fn capture_view(&self) -> Option<ViewHandle> {
        self.0.upgrade().and_then(|shared| shared.capture_view())
    }

    /// Mark `rect` (client pixels), or the whole window, for repaint.
    pub fn invalidate(&self, rect: Option<PixelRect>) {
        if let Some(shared) = self.0.upgrade() {
            shared.invalidate(rect, false);
        }
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}
