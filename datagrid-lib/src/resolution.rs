//! Outcome of a routed state update

/// How a setter's update was resolved.
///
/// # Example
///
/// ```ignore
/// match table.set_page(3) {
///     Resolution::Cached => render(table.snapshot()),
///     Resolution::Fetching | Resolution::Scheduled => show_spinner(),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The result was restored from the cache synchronously; nothing was fetched.
    Cached,
    /// A fetch was issued.
    Fetching,
    /// A debounced fetch was scheduled.
    Scheduled,
}

impl Resolution {
    /// Returns `true` if the update was served from the cache.
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached)
    }

    /// Returns `true` if the update led to a fetch, now or after the debounce
    /// window.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetching | Self::Scheduled)
    }
}
