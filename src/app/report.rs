//! Text report of a reconciliation run

use std::fmt::Write as _;

use crossterm::style::Stylize;

use crate::app::models::GroupSummary;
use crate::app::reconcile::Reconciliation;

const SIZE_PREFIXES: [&str; 5] = [" ", "k", "m", "g", "T"];

/// Format a byte count in decimal units, e.g. `   1.5 mb`
pub fn format_size(bytes: u64) -> String {
    let mut exponent = 0;
    let mut scale = 1u64;
    while exponent + 1 < SIZE_PREFIXES.len() && bytes >= scale * 1000 {
        scale *= 1000;
        exponent += 1;
    }
    format!(
        "{:>6.1} {}b",
        bytes as f64 / scale as f64,
        SIZE_PREFIXES[exponent]
    )
}

/// Renders reconciliation results as tab-separated lines
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportRenderer {
    /// Highlight groups needing attention with ANSI colours
    pub color: bool,
}

impl ReportRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, reconciliation: &Reconciliation) -> String {
        let mut out = String::new();

        out.push_str("local\tpartial\tmissing\t\tsize\tid\n");
        for group in reconciliation.groups.values() {
            let _ = writeln!(
                out,
                "{:>5}\t{:>7}\t{:>7}\t{}\t{}",
                group.matches,
                group.partial,
                group.misses,
                format_size(group.total_size),
                self.group_label(group)
            );
        }

        let totals = reconciliation.totals();
        out.push('\n');
        let _ = writeln!(
            out,
            "Total missing:   {:>4} files, {}",
            totals.missing_files,
            format_size(totals.missing_size)
        );
        let _ = writeln!(
            out,
            "Partial matches: {:>4} files, {} (e.g. different versions)",
            totals.partial_files,
            format_size(totals.partial_size)
        );

        if reconciliation.is_truncated() {
            let warning = format!(
                "Reached maximum file limit ({}), some matches may be missing",
                reconciliation.limit
            );
            if self.color {
                let _ = writeln!(out, "{}", warning.yellow().bold());
            } else {
                let _ = writeln!(out, "{}", warning);
            }
        }

        out
    }

    fn group_label(&self, group: &GroupSummary) -> String {
        let label = group.key().to_string();
        if !self.color {
            return label;
        }
        if group.misses > 0 {
            label.red().to_string()
        } else if group.partial > 0 {
            label.yellow().to_string()
        } else {
            label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn reconciliation(groups: Vec<GroupSummary>, processed: usize, limit: usize) -> Reconciliation {
        let groups: BTreeMap<_, _> = groups.into_iter().map(|g| (g.key(), g)).collect();
        Reconciliation {
            groups,
            processed,
            limit,
        }
    }

    fn group(dataset: &str, matches: u64, partial: u64, misses: u64, size: u64) -> GroupSummary {
        GroupSummary {
            dataset_id: dataset.to_string(),
            variable: "tas".to_string(),
            matches,
            partial,
            misses,
            total_size: size,
        }
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "   0.0  b");
        assert_eq!(format_size(999), " 999.0  b");
        assert_eq!(format_size(1_500_000), "   1.5 mb");
        assert_eq!(format_size(2_340_000_000_000), "   2.3 Tb");
    }

    #[test]
    fn test_format_size_switches_at_exact_boundary() {
        assert_eq!(format_size(1000), "   1.0 kb");
        assert_eq!(format_size(999_999), "1000.0 kb");
        assert_eq!(format_size(1_000_000), "   1.0 mb");
        assert_eq!(format_size(1_000_000_000), "   1.0 gb");
        assert_eq!(format_size(1_000_000_000_000), "   1.0 Tb");
    }

    #[test]
    fn test_format_size_caps_at_largest_unit() {
        assert_eq!(format_size(5_000_000_000_000_000), "5000.0 Tb");
    }

    #[test]
    fn test_plain_report() {
        let report = ReportRenderer::new(false).render(&reconciliation(
            vec![group("D1", 3, 1, 2, 1_500_000), group("D2", 4, 0, 0, 1000)],
            10,
            1000,
        ));

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "local\tpartial\tmissing\t\tsize\tid");
        assert_eq!(lines[1], "    3\t      1\t      2\t   1.5 mb\tD1 tas");
        assert_eq!(lines[2], "    4\t      0\t      0\t   1.0 kb\tD2 tas");
        assert!(report.contains("Total missing:      2 files,    1.5 mb"));
        assert!(report.contains("Partial matches:    1 files,    1.5 mb (e.g. different versions)"));
        assert!(!report.contains("maximum file limit"));
        assert!(!report.contains('\u{1b}'));
    }

    #[test]
    fn test_truncation_warning() {
        let report = ReportRenderer::new(false).render(&reconciliation(
            vec![group("D1", 5, 0, 0, 10)],
            5,
            5,
        ));
        assert!(report.contains("Reached maximum file limit (5), some matches may be missing"));
    }

    #[test]
    fn test_missing_emphasis_wins_over_partial() {
        let renderer = ReportRenderer::new(true);

        let both = group("D1", 0, 1, 1, 10);
        assert_eq!(renderer.group_label(&both), "D1 tas".red().to_string());

        let partial_only = group("D2", 0, 1, 0, 10);
        assert_eq!(renderer.group_label(&partial_only), "D2 tas".yellow().to_string());

        let complete = group("D3", 1, 0, 0, 10);
        assert_eq!(renderer.group_label(&complete), "D3 tas");
    }
}
