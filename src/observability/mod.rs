//! Observability infrastructure: logging setup, phase context and crash reports.
//!
//! Install the panic hook and the subscriber at application startup:
//!
//! ```ignore
//! use aqimap::observability::{init_tracing, install_panic_hook};
//!
//! fn main() {
//!     install_panic_hook();
//!     init_tracing(0);
//! }
//! ```

pub mod context;
pub mod panic_hook;
pub mod tracing;

pub use context::{
    get_current_context, get_progress, increment_processed, reset_progress, set_current_image,
    set_phase, set_progress, ContextGuard, ProgressCounters, ScoringContext, ScoringPhase,
};
pub use panic_hook::install_panic_hook;
pub use self::tracing::init_tracing;
