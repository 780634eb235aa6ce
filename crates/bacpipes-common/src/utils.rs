//! BACpipes Utils - Storage Footprint Formatting
//!
//! Renders byte counts the way PostgreSQL's `pg_size_pretty` does, so a
//! backend that estimates its own footprint reports sizes in the same shape
//! as the database backend.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

// =============================================================================
// Footprint Formatting
// =============================================================================

/// Units above plain bytes, each 1024 times the previous.
const FOOTPRINT_UNITS: &[&str] = &["kB", "MB", "GB", "TB", "PB"];

/// Counts below this stay in bytes.
const BYTES_LIMIT: u64 = 10 * 1024;

/// Upper bound, in half units, before moving to the next unit.
const HALF_UNIT_LIMIT: u64 = 20 * 1024 - 1;

/// Format a byte count as `pg_size_pretty` would, e.g. `"977 kB"`.
pub fn format_footprint(bytes: u64) -> String {
    if bytes < BYTES_LIMIT {
        return format!("{bytes} bytes");
    }

    // One extra bit of precision so the final unit rounds half up.
    let mut halves = bytes >> 9;
    let mut unit = 0;
    while halves >= HALF_UNIT_LIMIT && unit + 1 < FOOTPRINT_UNITS.len() {
        halves >>= 10;
        unit += 1;
    }

    format!("{} {}", (halves + 1) / 2, FOOTPRINT_UNITS[unit])
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_counts_stay_in_bytes() {
        assert_eq!(format_footprint(0), "0 bytes");
        assert_eq!(format_footprint(10_239), "10239 bytes");
    }

    #[test]
    fn test_matches_pg_size_pretty() {
        assert_eq!(format_footprint(10_240), "10 kB");
        assert_eq!(format_footprint(1_000_000), "977 kB");
        assert_eq!(format_footprint(20 * 1024 * 1024), "20 MB");
        assert_eq!(format_footprint(8 * 1024 * 1024 * 1024), "8192 MB");
    }
}
