//! Resolution settings.

/// Options controlling how arrays are validated and resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Fetch the parts of an external array concurrently.
    pub parallel_parts: bool,
    /// Accept external parts whose windows overlap in the same dataset.
    pub allow_overlapping_parts: bool,
    /// Check declared totals of derived arrays against recomputed ones.
    pub verify_declared_counts: bool,
}

impl ResolveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable concurrent fetching of external parts.
    pub fn parallel_parts(mut self, on: bool) -> Self {
        self.parallel_parts = on;
        self
    }

    /// Accept or reject overlapping external parts.
    pub fn allow_overlapping_parts(mut self, on: bool) -> Self {
        self.allow_overlapping_parts = on;
        self
    }

    /// Enable or disable checking of declared totals.
    pub fn verify_declared_counts(mut self, on: bool) -> Self {
        self.verify_declared_counts = on;
        self
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            parallel_parts: true,
            allow_overlapping_parts: false,
            verify_declared_counts: true,
        }
    }
}
