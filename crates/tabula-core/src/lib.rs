//! Core systems for Tabula.
//!
//! This crate provides the notification plumbing shared by Tabula models:
//!
//! - **Signals**: Type-safe, synchronous change notification
//! - **Revisions**: Change-version counters for consumers that poll
//! - **Logging**: `tracing` targets for every subsystem
//!
//! # Signal Example
//!
//! ```
//! use tabula_core::{Revision, Signal};
//!
//! // A counter that notifies both ways
//! struct Counter {
//!     value: std::sync::atomic::AtomicI32,
//!     value_changed: Signal<i32>,
//!     revision: Revision,
//! }
//!
//! let counter = Counter {
//!     value: Default::default(),
//!     value_changed: Signal::new(),
//!     revision: Revision::new(),
//! };
//!
//! counter.value_changed.connect(|value| println!("Value changed to: {}", value));
//!
//! let new_value = counter.value.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
//! counter.value_changed.emit(new_value);
//! counter.revision.bump();
//! assert_eq!(counter.revision.get(), 1);
//! ```

pub mod logging;
pub mod revision;
pub mod signal;

pub use revision::Revision;
pub use signal::{ConnectionId, Signal};
