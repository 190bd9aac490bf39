//! Human-readable rendering of benchmark figures.

/// Render a MiB/s throughput with the largest unit that keeps it ≥ 1.
pub fn format_speed(mbps: f64) -> String {
    if mbps >= 1024.0 {
        format!("{:.2} GB/s", mbps / 1024.0)
    } else if mbps >= 1.0 {
        format!("{mbps:.1} MB/s")
    } else if mbps >= 0.001 {
        format!("{:.1} KB/s", mbps * 1024.0)
    } else {
        format!("{:.0} B/s", mbps * 1024.0 * 1024.0)
    }
}

/// Render a latency in milliseconds; sub-millisecond values switch to µs.
pub fn format_latency(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.0} µs", ms * 1000.0)
    } else {
        format!("{ms:.2} ms")
    }
}
