use crate::stats::TrialSummary;
use std::fmt::Write;

/// Render the comparison table: a header, a rule, then one row per summary
/// in the order given. Rendering has no side effects, and identical input
/// always yields byte-identical output.
pub fn render_table(summaries: &[TrialSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} | {:>10} | {:>16} | {:>21} | {:>12}",
        "endpoint", "requests", "avg latency (ms)", "avg throughput (/min)", "avg failures"
    );
    let _ = writeln!(out, "{:-<11}+{:-<12}+{:-<18}+{:-<23}+{:-<13}", "", "", "", "", "");
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<10} | {:>10} | {:>16.2} | {:>21.2} | {:>12.2}",
            summary.endpoint.label(),
            summary.requests,
            summary.mean_latency.as_secs_f64() * 1e3,
            summary.throughput_per_min,
            summary.mean_failures,
        );
    }
    out
}
