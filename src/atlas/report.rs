//! Markdown report generation for atlas results.

use crate::atlas::runner::Metrics;

/// Incremental markdown report builder.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    sections: Vec<String>,
}

impl ReportBuilder {
    /// Start a report with a top-level title.
    pub fn new(title: &str) -> Self {
        Self {
            sections: vec![format!("# {title}\n")],
        }
    }

    /// Append a header at the given level.
    pub fn add_header(&mut self, level: usize, text: &str) {
        self.sections.push(format!("{} {text}\n", "#".repeat(level)));
    }

    /// Append a paragraph.
    pub fn add_text(&mut self, text: &str) {
        self.sections.push(format!("{text}\n"));
    }

    /// Append a markdown table.
    pub fn add_table(&mut self, headers: &[&str], rows: &[Vec<String>]) {
        self.sections.push(format!("| {} |", headers.join(" | ")));
        self.sections
            .push(format!("|{}|", headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")));
        for row in rows {
            self.sections.push(format!("| {} |", row.join(" | ")));
        }
        self.sections.push(String::new());
    }

    /// Assemble the final document.
    pub fn build(&self) -> String {
        self.sections.join("\n")
    }
}

/// Render a scenario x method comparison table.
///
/// `results` rows are `(scenario, method, metrics)`; ordering is preserved.
pub fn comparison_report(title: &str, results: &[(String, String, Metrics)]) -> String {
    let mut report = ReportBuilder::new(title);
    report.add_text(
        "Anytime coverage counts a replicate only if the true parameter stayed \
         inside the interval at every observed step.",
    );
    let rows: Vec<Vec<String>> = results
        .iter()
        .map(|(scenario, method, m)| {
            vec![
                scenario.clone(),
                method.clone(),
                format!("{:.3}", m.coverage),
                format!("{:.3}", m.final_coverage),
                format!("{:.3}", m.type_i_error),
                format!("{:.3}", m.power),
                format!("{:.4}", m.avg_width),
                format!("{:.0}", m.median_stop_time),
            ]
        })
        .collect();
    report.add_table(
        &[
            "scenario",
            "method",
            "coverage",
            "final cov.",
            "type I",
            "power",
            "avg width",
            "median stop",
        ],
        &rows,
    );
    report.build()
}
