//! Logging and debugging facilities for Arbor.
//!
//! Arbor uses the `tracing` crate for instrumentation. Nothing is printed
//! until the application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // ...
//! }
//! ```
//!
//! Every Arbor crate logs under one of the [`targets`], so a directive such
//! as `RUST_LOG=arbor::container=trace` isolates pointer routing.

use std::time::{Duration, Instant};

/// Span names used throughout Arbor for tracing.
pub mod span_names {
    /// Full window paint pass.
    pub const PAINT: &str = "arbor::paint";
    /// Layout pass triggered by a size allocation.
    pub const LAYOUT: &str = "arbor::layout";
    /// Focus traversal.
    pub const FOCUS: &str = "arbor::focus";
}

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "arbor::signal";
    /// View node target (allocation, parenting, dispatch).
    pub const VIEW: &str = "arbor::view";
    /// Container routing target (hit-testing, hover, child painting).
    pub const CONTAINER: &str = "arbor::container";
    /// Top-level window target.
    pub const WINDOW: &str = "arbor::window";
    /// Focus traversal target.
    pub const FOCUS: &str = "arbor::focus";
    /// Paint pipeline target.
    pub const PAINT: &str = "arbor::paint";
    /// Platform boundary target.
    pub const PLATFORM: &str = "arbor::platform";
    /// Performance spans.
    pub const PERF: &str = "arbor::perf";
}

/// Style options for view tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line-per-node representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show allocated bounds.
    pub show_bounds: bool,
    /// Whether to show state flags (hidden, hovered, focused).
    pub show_flags: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_bounds: true,
            show_flags: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options that print names only.
    pub fn minimal() -> Self {
        Self {
            show_bounds: false,
            show_flags: false,
            ..Default::default()
        }
    }

    /// Build the prefix string for a node at `depth`.
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered and reports its duration.
///
/// When dropped, the elapsed time is logged at debug level if it exceeds the
/// threshold (zero by default, which logs every span).
#[derive(Debug)]
pub struct PerfSpan {
    operation: &'static str,
    started: Instant,
    threshold: Duration,
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation);
        Self {
            operation,
            started: Instant::now(),
            threshold: Duration::ZERO,
            span: span.entered(),
        }
    }

    /// Only report the duration when it exceeds `threshold`.
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Time elapsed since the span was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        if elapsed >= self.threshold {
            tracing::debug!(
                target: targets::PERF,
                operation = self.operation,
                elapsed_us = elapsed.as_micros() as u64,
                "span finished"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_root_is_empty() {
        let options = TreeFormatOptions::default();
        assert_eq!(options.prefix(0, true), "");
    }

    #[test]
    fn test_prefix_ascii() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        assert_eq!(options.prefix(1, false), "+-- ");
        assert_eq!(options.prefix(1, true), "`-- ");
        assert_eq!(options.prefix(2, true), "|  `-- ");
    }

    #[test]
    fn test_prefix_unicode_nested() {
        let options = TreeFormatOptions::default();
        let prefix = options.prefix(2, false);
        assert!(prefix.starts_with('\u{2502}'));
        assert!(prefix.ends_with("\u{251c}\u{2500}\u{2500} "));
    }

    #[test]
    fn test_minimal_options() {
        let options = TreeFormatOptions::minimal();
        assert!(!options.show_bounds);
        assert!(!options.show_flags);
        assert_eq!(options.style, TreeStyle::Unicode);
    }

    #[test]
    fn test_perf_span_threshold() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let span = PerfSpan::new("test").with_threshold(Duration::from_secs(60));
        assert!(span.elapsed() < Duration::from_secs(60));
    }
}
