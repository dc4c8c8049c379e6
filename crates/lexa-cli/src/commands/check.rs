//! Implementation of the `lexa check` command.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use lexa::catalog::Format;
use lexa::interpreter::{IssueKind, Severity};
use lexa::{validate_catalog, CatalogIssue, Engine};
use miette::{miette, Report, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::debug;

use crate::output::ExpressionDiagnostic;

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Catalog files to check (.json, .yaml, .yml, .toml). The file stem is
    /// used as the locale name.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for a single problem.
#[derive(Debug, Serialize)]
struct ProblemJson {
    file: String,
    locale: Option<String>,
    key: Option<String>,
    severity: &'static str,
    message: String,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<i32> {
    let mut problems = Vec::new();
    let mut error_count = 0usize;
    let mut warning_count = 0usize;

    for path in &args.files {
        let file = path.display().to_string();
        let locale = locale_for(path)?;
        let engine = Engine::new();
        debug!(file = %file, locale = %locale, "checking catalog file");

        if let Err(e) = engine.load_catalog_file(&locale, path) {
            error_count += 1;
            if !args.json {
                eprintln!("{} {}: {}", "error:".red().bold(), file, e);
            }
            problems.push(ProblemJson {
                file,
                locale: Some(locale),
                key: None,
                severity: "error",
                message: e.to_string(),
            });
            continue;
        }

        for issue in validate_catalog(&engine.catalog()) {
            match issue.severity() {
                Severity::Error => error_count += 1,
                Severity::Warning => warning_count += 1,
            }
            if !args.json {
                print_issue(&file, &issue);
            }
            problems.push(ProblemJson {
                file: file.clone(),
                locale: Some(issue.locale.clone()),
                key: Some(issue.key.clone()),
                severity: severity_name(issue.severity()),
                message: issue.to_string(),
            });
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&problems)
            .map_err(|e| miette!("Failed to serialize output: {}", e))?;
        println!("{}", json);
    } else if problems.is_empty() {
        println!("{} {} file(s) checked", "ok:".green().bold(), args.files.len());
    } else {
        eprintln!(
            "{} error(s), {} warning(s) in {} file(s)",
            error_count,
            warning_count,
            args.files.len()
        );
    }

    if problems.is_empty() {
        Ok(exitcode::OK)
    } else {
        Ok(exitcode::DATAERR)
    }
}

/// Derive a locale name from a catalog file name (`de.yaml` -> `de`).
fn locale_for(path: &Path) -> Result<String> {
    if Format::from_path(path).is_none() {
        return Err(miette!(
            "Unsupported catalog format {}: expected .json, .yaml, .yml or .toml",
            path.display()
        ));
    }
    path.file_stem()
        .and_then(OsStr::to_str)
        .map(str::to_string)
        .ok_or_else(|| miette!("Cannot derive a locale from {}", path.display()))
}

fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

fn print_issue(file: &str, issue: &CatalogIssue) {
    if let IssueKind::ExpressionSyntax { arm, error } = &issue.kind {
        let origin = format!("{}:{} arm {}", file, issue.key, arm);
        let report = Report::new(ExpressionDiagnostic::from_syntax_error(&origin, error));
        eprintln!("{:?}", report);
        return;
    }
    match issue.severity() {
        Severity::Error => eprintln!("{} {}: {}", "error:".red().bold(), file, issue),
        Severity::Warning => eprintln!("{} {}: {}", "warning:".yellow().bold(), file, issue),
    }
}
