//! Reading catalog files into [`NestedValue`] trees.

use std::fs;
use std::path::Path;

use super::nested::NestedValue;
use crate::interpreter::LoadError;

/// Source formats a catalog file can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

/// Parse catalog source text in the given format.
///
/// `origin` is only used to label errors.
pub fn parse_nested_str(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<NestedValue, LoadError> {
    let parsed = match format {
        Format::Json => serde_json::from_str::<NestedValue>(content).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::from_str::<NestedValue>(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str::<NestedValue>(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| LoadError::Parse {
        path: origin.to_path_buf(),
        message,
    })
}

/// Read and parse a catalog file, detecting the format from its extension.
pub fn load_nested_file(path: impl AsRef<Path>) -> Result<NestedValue, LoadError> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let content = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_nested_str(&content, format, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(Format::from_path(Path::new("en.JSON")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("en.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("en.toml")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("en.ini")), None);
        assert_eq!(Format::from_path(Path::new("en")), None);
    }

    #[test]
    fn yaml_and_toml_produce_the_same_tree() {
        let origin = PathBuf::from("<test>");
        let yaml = parse_nested_str(
            "messages:\n  success: Done!\n  count: 3\n",
            Format::Yaml,
            &origin,
        )
        .unwrap();
        let toml = parse_nested_str(
            "[messages]\nsuccess = \"Done!\"\ncount = 3\n",
            Format::Toml,
            &origin,
        )
        .unwrap();
        assert_eq!(yaml, toml);
    }

    #[test]
    fn parse_errors_name_the_origin() {
        let err = parse_nested_str("{ not json", Format::Json, Path::new("bad.json")).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
