const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Format a raw byte count into a human-readable string: "500.00 GB"
pub fn fmt_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Format a percentage with one decimal: "84.5%"
pub fn fmt_pct(pct: f64) -> String {
    format!("{:.1}%", pct)
}
