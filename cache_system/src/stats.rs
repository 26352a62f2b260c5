use serde::Serialize;

/// Snapshot of cache counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    /// `"xx.xx%"`
    pub hit_rate: String,
    pub expirations: u64,
    pub evictions: u64,
    pub size: usize,
    /// `"N KB"`
    pub memory_usage: String,
}

/// Formats `hits / (hits + misses)` as a percentage with two decimals.
/// No requests yields `"0.00%"`.
pub fn format_hit_rate(hits: u64, misses: u64) -> String {
    let total = hits + misses;
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", hits as f64 / total as f64 * 100.0)
}

pub fn format_kilobytes(bytes: usize) -> String {
    format!("{} KB", (bytes as f64 / 1024.0).round() as u64)
}
