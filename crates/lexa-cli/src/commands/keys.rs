//! Implementation of the `lexa keys` command.

use std::path::PathBuf;

use lexa::catalog::Node;
use lexa::interpreter::resolve_path;
use lexa::parser::parse_template;
use lexa::Engine;
use miette::{miette, Result};
use tracing::debug;

use crate::output::table::{format_keys_table, KeyRow};

/// Arguments for the keys command.
#[derive(Debug, clap::Args)]
pub struct KeysArgs {
    /// Catalog file (.json, .yaml, .yml, .toml)
    #[arg(short, long)]
    pub catalog: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Locale name the catalog is loaded under; keys are locale-independent.
const LOCALE: &str = "catalog";

/// Run the keys command.
pub fn run_keys(args: KeysArgs) -> Result<i32> {
    let engine = Engine::new();
    let count = engine
        .load_catalog_file(LOCALE, &args.catalog)
        .map_err(|e| miette!("Failed to load catalog: {}", e))?;
    debug!(path = %args.catalog.display(), keys = count, "loaded catalog file");

    let catalog = engine.catalog();
    let root = catalog
        .root(LOCALE)
        .ok_or_else(|| miette!("Catalog {} is empty", args.catalog.display()))?;

    let mut rows = Vec::new();
    for key in catalog.keys(LOCALE) {
        let node = resolve_path(root, &key, LOCALE)
            .map_err(|e| miette!("Failed to inspect '{}': {}", key, e))?;
        let (kind, arms, templates): (_, _, Vec<&str>) = match node {
            Node::Leaf(template) => ("leaf", 0, vec![template.as_str()]),
            Node::Conditional(conditional) => (
                "conditional",
                conditional.arms.len(),
                conditional
                    .arms
                    .iter()
                    .map(|arm| arm.template.as_str())
                    .chain(conditional.default.as_deref())
                    .collect(),
            ),
            Node::Branch(_) => continue,
        };
        rows.push(KeyRow {
            key,
            kind,
            arms,
            placeholders: placeholders(&templates),
        });
    }

    if args.json {
        let json = serde_json::to_string_pretty(&rows)
            .map_err(|e| miette!("Failed to serialize output: {}", e))?;
        println!("{}", json);
    } else {
        println!("{}", format_keys_table(&rows));
    }
    Ok(exitcode::OK)
}

/// Distinct placeholder names across templates, in first-use order.
/// Malformed templates contribute nothing.
fn placeholders(templates: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for template in templates {
        let Ok(parsed) = parse_template(template) else {
            continue;
        };
        for name in parsed.placeholders() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}
