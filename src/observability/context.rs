//! Thread-local context tracking for crash reports.
//!
//! Records which scoring phase is running and which image is being processed.
//! Uses thread-local storage for per-thread context (works with the rayon
//! workers of the extraction phase) and atomic counters for global progress.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

static PROGRESS: ProgressCounters = ProgressCounters::new();

thread_local! {
    static CURRENT_CONTEXT: RefCell<ScoringContext> = const { RefCell::new(ScoringContext::new()) };
}

/// Context snapshot for the current operation.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    /// Current phase
    pub phase: Option<ScoringPhase>,
    /// Image currently being processed
    pub current_image: Option<String>,
}

impl ScoringContext {
    /// Create a new empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_image: None,
        }
    }
}

/// Stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPhase {
    /// Decoding images and measuring raw metrics
    Extraction,
    /// Rejecting empty batches, non-finite values and duplicate ids
    Validation,
    /// Global reductions: bounds, quartiles, AQI and ambiguity thresholds
    Statistics,
    /// Per-image tags, ambiguity and flags
    Derivation,
    /// Writing CSV tables and reports
    Output,
    /// Cluster stability and distance outliers
    Interpretation,
}

impl std::fmt::Display for ScoringPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Extraction => "extraction",
            Self::Validation => "validation",
            Self::Statistics => "statistics",
            Self::Derivation => "derivation",
            Self::Output => "output",
            Self::Interpretation => "interpretation",
        })
    }
}

/// Processed and total image counts shared across threads.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressCounters {
    pub const fn new() -> Self {
        Self {
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, processed: usize, total: usize) {
        self.processed.store(processed, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn increment(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// (processed, total)
    pub fn get(&self) -> (usize, usize) {
        (
            self.processed.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    pub fn reset(&self) {
        self.set(0, 0);
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: ScoringContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

/// Set the current phase. The previous phase is restored when the guard drops.
///
/// ```ignore
/// let _phase = set_phase(ScoringPhase::Statistics);
/// ```
#[must_use]
pub fn set_phase(phase: ScoringPhase) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().phase = Some(phase);
        ContextGuard { previous }
    })
}

/// Set the image being processed on this thread.
#[must_use]
pub fn set_current_image(image: impl Into<String>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_image = Some(image.into());
        ContextGuard { previous }
    })
}

/// Set the progress counters (processed and total images).
pub fn set_progress(processed: usize, total: usize) {
    PROGRESS.set(processed, total);
}

/// Thread-safe; called from parallel iterators.
pub fn increment_processed() {
    PROGRESS.increment();
}

#[must_use]
pub fn get_current_context() -> ScoringContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Current progress as (processed, total).
#[must_use]
pub fn get_progress() -> (usize, usize) {
    PROGRESS.get()
}

pub fn reset_progress() {
    PROGRESS.reset();
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = ScoringContext::new();
    });
}
