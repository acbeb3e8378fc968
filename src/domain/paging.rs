pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp raw paging input to a 1-based page and a limit in `1..=100`.
pub fn normalize_paging(page: i64, limit: i64) -> (i64, i64) {
    (page.max(1), limit.clamp(1, MAX_PAGE_LIMIT))
}

/// Rows to skip before `page`. Saturates instead of overflowing, so an
/// absurd page number simply lands past the last row.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit.max(0))
}
