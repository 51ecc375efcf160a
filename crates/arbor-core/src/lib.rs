//! Core systems for Arbor.
//!
//! This crate provides the pieces of the Arbor view-tree runtime that do not
//! depend on geometry or painting:
//!
//! - **Signal/Slot System**: application-level notifications such as a
//!   window's close request or a panel's bounds change
//! - **Logging**: `tracing` targets, span names and a perf span guard shared
//!   by every Arbor crate
//!
//! # Signal/Slot Example
//!
//! ```
//! use arbor_core::Signal;
//!
//! let closed = Signal::<()>::new();
//! let id = closed.connect(|_| println!("window closed"));
//! closed.emit(());
//! closed.disconnect(id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
