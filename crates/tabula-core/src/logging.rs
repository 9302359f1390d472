//! Logging facilities for Tabula.
//!
//! Tabula uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("tabula=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`] below, so a filter
//! directive such as `tabula::model::sort=debug` narrows output to a single
//! subsystem.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal emission target.
    pub const SIGNAL: &str = "tabula_core::signal";
    /// Aggregated table model target.
    pub const MODEL: &str = "tabula::model";
    /// Source registration (bindings) target.
    pub const BINDING: &str = "tabula::model::binding";
    /// Sort projection target.
    pub const SORT: &str = "tabula::model::sort";
    /// Refresh batching target.
    pub const REFRESH: &str = "tabula::model::refresh";
}
