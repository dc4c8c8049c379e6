//! Implementation of the `lexa resolve` command.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::ValueEnum;
use lexa::{Engine, EngineConfig, EscapeSet, ResolveError, ResolveOptions, Value};
use miette::{miette, Result};
use serde::Serialize;
use tracing::debug;

use crate::output::ExpressionDiagnostic;

/// Arguments for the resolve command.
#[derive(Debug, clap::Args)]
pub struct ResolveArgs {
    /// Catalog files to load, as `path` (loaded into --locale) or
    /// `locale=path` (repeatable)
    #[arg(short, long = "catalog", required = true, value_parser = parse_catalog)]
    pub catalogs: Vec<CatalogArg>,

    /// Locale to resolve in (e.g., en, de, fr)
    #[arg(short, long, env = "LEXA_LOCALE", default_value = "en")]
    pub locale: String,

    /// Dotted translation key
    #[arg(short, long)]
    pub key: String,

    /// Parameters in name=value format (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Locale to retry in when the key has no answer in --locale
    #[arg(long)]
    pub fallback: Option<String>,

    /// Print the key itself instead of failing when it is missing
    #[arg(long)]
    pub lenient: bool,

    /// Escaping applied to string parameter values
    #[arg(long, value_enum, default_value_t = Escape::None)]
    pub escape: Escape,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// A catalog file, optionally bound to a locale.
#[derive(Debug, Clone)]
pub struct CatalogArg {
    pub locale: Option<String>,
    pub path: PathBuf,
}

/// Escape presets selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Escape {
    None,
    Html,
    Control,
}

impl Escape {
    fn to_set(self) -> EscapeSet {
        match self {
            Escape::None => EscapeSet::none(),
            Escape::Html => EscapeSet::html(),
            Escape::Control => EscapeSet::control(),
        }
    }
}

/// JSON output for resolve results.
#[derive(Serialize)]
pub struct ResolveResult {
    pub key: String,
    pub locale: String,
    pub result: String,
}

/// Parse a key=value parameter string.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid parameter format '{}': expected name=value", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Parse `path` or `locale=path`.
fn parse_catalog(s: &str) -> Result<CatalogArg, String> {
    match s.split_once('=') {
        Some((locale, path)) if !locale.is_empty() && !path.is_empty() => Ok(CatalogArg {
            locale: Some(locale.to_string()),
            path: PathBuf::from(path),
        }),
        Some(_) => Err(format!("invalid catalog '{}': expected locale=path", s)),
        None => Ok(CatalogArg {
            locale: None,
            path: PathBuf::from(s),
        }),
    }
}

/// Interpret a command-line parameter value: bool, then integer, then
/// float, else string.
pub fn parse_value(raw: &str) -> Value {
    if let Ok(b) = raw.parse::<bool>() {
        Value::from(b)
    } else if let Ok(n) = raw.parse::<i64>() {
        Value::from(n)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::from(f)
    } else {
        Value::from(raw)
    }
}

/// Run the resolve command.
pub fn run_resolve(args: ResolveArgs) -> Result<i32> {
    let config = EngineConfig::builder()
        .default_locale(args.locale.clone())
        .escape(args.escape.to_set())
        .build();
    let engine = Engine::with_config(config);

    for catalog in &args.catalogs {
        let locale = catalog.locale.as_deref().unwrap_or(&args.locale);
        let keys = engine
            .load_catalog_file(locale, &catalog.path)
            .map_err(|e| miette!("Failed to load catalog: {}", e))?;
        debug!(path = %catalog.path.display(), locale, keys, "loaded catalog file");
    }

    let params: HashMap<String, Value> = args
        .params
        .iter()
        .map(|(k, v)| (k.clone(), parse_value(v)))
        .collect();
    let options = ResolveOptions {
        strict: !args.lenient,
        fallback_locale: args.fallback.clone(),
    };

    match engine.resolve_with(&args.key, &args.locale, &params, &options) {
        Ok(result) => {
            if args.json {
                let output = ResolveResult {
                    key: args.key,
                    locale: args.locale,
                    result,
                };
                let json = serde_json::to_string_pretty(&output)
                    .map_err(|e| miette!("Failed to serialize output: {}", e))?;
                println!("{}", json);
            } else {
                println!("{}", result);
            }
            Ok(exitcode::OK)
        }
        Err(ResolveError::ExpressionSyntax(err)) if !args.json => {
            let origin = format!("{}:{}", args.locale, args.key);
            Err(ExpressionDiagnostic::from_syntax_error(&origin, &err).into())
        }
        Err(e) => {
            if args.json {
                let output = serde_json::json!({
                    "error": e.to_string()
                });
                let json = serde_json::to_string_pretty(&output)
                    .map_err(|e| miette!("Failed to serialize output: {}", e))?;
                eprintln!("{}", json);
            } else {
                eprintln!("Resolution error: {}", e);
            }
            Ok(exitcode::DATAERR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_typed_by_shape() {
        assert_eq!(parse_value("true"), Value::Boolean(true));
        assert_eq!(parse_value("-12"), Value::Integer(-12));
        assert_eq!(parse_value("2.5"), Value::Float(2.5));
        assert_eq!(parse_value("Alice"), Value::String("Alice".into()));
    }

    #[test]
    fn catalog_argument_forms() {
        let bare = parse_catalog("en.json").unwrap();
        assert_eq!(bare.locale, None);
        let bound = parse_catalog("de=de.yaml").unwrap();
        assert_eq!(bound.locale.as_deref(), Some("de"));
        assert_eq!(bound.path, PathBuf::from("de.yaml"));
        assert!(parse_catalog("=x.json").is_err());
    }
}
