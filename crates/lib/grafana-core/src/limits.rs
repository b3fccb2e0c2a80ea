/// Default and ceiling for a caller-supplied result limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub default: usize,
    pub max: Option<usize>,
}

impl LimitPolicy {
    #[must_use]
    pub const fn new(default: usize) -> Self {
        Self { default, max: None }
    }

    #[must_use]
    pub const fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Absent, zero, and negative requests take the default; larger requests
    /// are clamped to the ceiling when one is set.
    #[must_use]
    pub fn resolve(&self, requested: Option<i64>) -> usize {
        let requested = requested
            .filter(|value| *value > 0)
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(self.default);
        self.max.map_or(requested, |max| requested.min(max))
    }
}

#[cfg(test)]
mod tests {
    use super::LimitPolicy;

    #[test]
    fn resolves_defaults_and_clamps() {
        let policy = LimitPolicy::new(10).with_max(100);
        assert_eq!(policy.resolve(None), 10);
        assert_eq!(policy.resolve(Some(0)), 10);
        assert_eq!(policy.resolve(Some(-5)), 10);
        assert_eq!(policy.resolve(Some(42)), 42);
        assert_eq!(policy.resolve(Some(5_000)), 100);
    }

    #[test]
    fn unbounded_policy_passes_large_values() {
        assert_eq!(LimitPolicy::new(100).resolve(Some(5_000)), 5_000);
    }
}
