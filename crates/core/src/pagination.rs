//! Pagination defaults and clamping helpers shared by list endpoints.

/// Default number of rows per page.
pub const DEFAULT_LIMIT: i64 = 50;

/// Maximum number of rows per page.
pub const MAX_LIMIT: i64 = 200;

/// Clamp a client-supplied limit into `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    match limit {
        Some(l) if l < 1 => default,
        Some(l) => l.min(max),
        None => default,
    }
}

/// Clamp a client-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_clamping() {
        assert_eq!(clamp_limit(None, 50, 200), 50);
        assert_eq!(clamp_limit(Some(0), 50, 200), 50);
        assert_eq!(clamp_limit(Some(-3), 50, 200), 50);
        assert_eq!(clamp_limit(Some(75), 50, 200), 75);
        assert_eq!(clamp_limit(Some(5000), 50, 200), 200);
    }

    #[test]
    fn offset_clamping() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-1)), 0);
        assert_eq!(clamp_offset(Some(30)), 30);
    }
}
