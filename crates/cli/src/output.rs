//! Console rendering of suite results

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use tapi_core::{SuiteSummary, TestCase, TestSuite};

/// Output format for the console summary
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for TestCase {
    fn headers() -> Vec<&'static str> {
        vec!["Test", "Status", "Code", "Seconds", "Messages"]
    }

    fn row(&self) -> Vec<String> {
        match &self.result {
            Some(result) => vec![
                self.name.clone(),
                if result.test_completion_status { "PASS" } else { "FAIL" }.to_string(),
                if result.return_code == 0 {
                    "-".to_string()
                } else {
                    format!("{} (expected {})", result.return_code, self.expects.return_code)
                },
                format!("{:.3} (max {})", result.elapsed_time, self.expects.max_seconds),
                result.error_message.join("\n"),
            ],
            None => vec![
                self.name.clone(),
                "NOT RUN".to_string(),
                "-".to_string(),
                "-".to_string(),
                String::new(),
            ],
        }
    }
}

impl TableDisplay for SuiteSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Suite", "Total", "Passed", "Failed", "Seconds", "Status"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.total.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            format!("{:.3}", self.elapsed_seconds),
            if self.passed_all { "PASS" } else { "FAIL" }.to_string(),
        ]
    }
}

/// Print the outcome of every suite that ran
pub fn print_report(suites: &[TestSuite], summaries: &[SuiteSummary], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            for (suite, summary) in suites.iter().zip(summaries) {
                println!("{}", render_table(suite));
                println!("{}", render_suite_line(summary, suite.description.as_str()));
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summaries).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(summaries).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (i, summary) in summaries.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                print!("{}", render_plain(summary));
            }
        }
    }
}

/// One row per test, in document order
pub fn render_table(suite: &TestSuite) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(TestCase::headers());
    for test in &suite.tests {
        table.add_row(test.row());
    }
    table
}

fn render_suite_line(summary: &SuiteSummary, description: &str) -> String {
    let status = if summary.passed_all {
        "PASSED".green().bold()
    } else {
        "FAILED".red().bold()
    };
    let mut line = format!(
        "{} {}: {} passed, {} failed, {:.3}s",
        status, summary.name, summary.passed, summary.failed, summary.elapsed_seconds
    );
    if !description.is_empty() {
        line.push_str(&format!(" ({})", description.dimmed()));
    }
    line
}

fn render_plain(summary: &SuiteSummary) -> String {
    SuiteSummary::headers()
        .iter()
        .zip(summary.row())
        .map(|(header, value)| format!("{}: {}\n", header, value))
        .collect()
}
