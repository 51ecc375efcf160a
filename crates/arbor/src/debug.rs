//! Text rendering of a view tree for debugging.
//!
//! ```
//! use arbor::debug::ViewTreeDebug;
//! use arbor::panel::Panel;
//! use arbor_core::TreeFormatOptions;
//!
//! let root = Panel::with_name("root");
//! root.add_child_view(Panel::with_name("sidebar").view());
//!
//! let text =
//!     ViewTreeDebug::with_options(TreeFormatOptions::minimal()).format_subtree(&root.view());
//! assert_eq!(text, "root\n\u{2514}\u{2500}\u{2500} sidebar\n");
//! ```

use std::fmt;

use arbor_core::logging::targets;
use arbor_core::{TreeFormatOptions, TreeStyle};

use crate::view::ViewHandle;

/// Formats a view subtree one node per line.
#[derive(Debug, Clone, Default)]
pub struct ViewTreeDebug {
    options: TreeFormatOptions,
}

impl ViewTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Render `root` and its descendants.
    pub fn format_subtree(&self, root: &ViewHandle) -> String {
        let mut output = String::new();
        self.format_into(root, 0, true, &mut output);
        output
    }

    /// Write the subtree to the log at debug level.
    pub fn log_subtree(&self, root: &ViewHandle) {
        tracing::debug!(target: targets::VIEW, tree = %self.format_subtree(root), "view tree");
    }

    fn format_into(&self, view: &ViewHandle, depth: usize, is_last: bool, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        output.push_str(&self.options.prefix(depth, is_last));
        output.push_str(&NodeLabel { view, options: &self.options }.to_string());
        output.push('\n');

        let mut children = Vec::new();
        view.for_each_child(&mut |child| {
            children.push(child.clone());
            true
        });
        let count = children.len();
        for (index, child) in children.iter().enumerate() {
            self.format_into(child, depth + 1, index + 1 == count, output);
        }
    }
}

/// One line of output, without the tree prefix.
struct NodeLabel<'a> {
    view: &'a ViewHandle,
    options: &'a TreeFormatOptions,
}

impl fmt::Display for NodeLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.view.node();
        let name = node.name();
        f.write_str(if name.is_empty() { "(unnamed)" } else { &name })?;

        if self.options.show_bounds {
            let rect = node.allocation();
            if self.options.style == TreeStyle::Compact {
                write!(f, " {}x{}", rect.width(), rect.height())?;
            } else {
                write!(f, " [{}, {}, {}x{}]", rect.x(), rect.y(), rect.width(), rect.height())?;
            }
        }

        if self.options.show_flags {
            let flags = [
                (!node.is_visible(), "hidden"),
                (node.is_hovered(), "hovered"),
                (node.is_focused(), "focused"),
            ];
            for (_, flag) in flags.iter().filter(|(set, _)| *set) {
                write!(f, " <{flag}>")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Panel;
    use arbor_render::PixelRect;

    #[test]
    fn test_bounds_and_flags() {
        let root = Panel::with_name("root");
        let child = Panel::with_name("child");
        root.add_child_view(child.view());
        root.view().size_allocate(PixelRect::new(0, 0, 100, 50));
        child.view().size_allocate(PixelRect::new(10, 5, 20, 20));
        child.view().set_visible(false);

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        let text = ViewTreeDebug::with_options(options).format_subtree(&root.view());
        assert_eq!(text, "root [0, 0, 100x50]\n`-- child [10, 5, 20x20] <hidden>\n");
    }

    #[test]
    fn test_max_depth() {
        let root = Panel::with_name("root");
        let middle = Panel::with_name("middle");
        let leaf = Panel::with_name("leaf");
        middle.add_child_view(leaf.view());
        root.add_child_view(middle.view());

        let options = TreeFormatOptions {
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        };
        let text = ViewTreeDebug::with_options(options).format_subtree(&root.view());
        assert_eq!(text.lines().count(), 2);
        assert!(!text.contains("leaf"));
    }

    #[test]
    fn test_unnamed_view() {
        let root = Panel::new();
        let text =
            ViewTreeDebug::with_options(TreeFormatOptions::minimal()).format_subtree(&root.view());
        assert_eq!(text, "(unnamed)\n");
    }
}
