use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics for tracking sanitization decisions.
///
/// Counters are cumulative over the lifetime of a [`crate::Sanitizer`] and
/// may be read while other threads sanitize with the same instance.
#[derive(Debug, Default)]
pub struct SanitizerMetrics {
    /// Elements purged together with their subtree
    pub elements_removed: AtomicUsize,
    /// Elements removed with their children spliced back in place
    pub elements_unwrapped: AtomicUsize,
    /// Attributes dropped by the allowlist or protocol policy
    pub attributes_removed: AtomicUsize,
    /// Comment nodes removed
    pub comments_removed: AtomicUsize,
    /// Doctype nodes removed or replaced
    pub doctypes_removed: AtomicUsize,
}

impl SanitizerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_elements_removed(&self) {
        self.elements_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_elements_unwrapped(&self) {
        self.elements_unwrapped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_attributes_removed(&self) {
        self.attributes_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_comments_removed(&self) {
        self.comments_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_doctypes_removed(&self) {
        self.doctypes_removed.fetch_add(1, Ordering::Relaxed);
    }
}
