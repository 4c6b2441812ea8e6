//! Analyzer configuration.
//!
//! Everything the report's noise filtering depends on lives here:
//! excluded namespace prefixes, the standard-library root sentinel, path
//! exclusion markers, and extra reference directories. A YAML file is
//! auto-discovered in the working directory; every field has a default
//! matching the stock C# setup, so running without a file just works.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["callscan.yaml", ".callscan.yaml"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    /// Calls into namespaces starting with any of these are omitted from
    /// the report.
    #[serde(default = "default_excluded_namespace_prefixes")]
    pub excluded_namespace_prefixes: Vec<String>,

    /// Namespace treated as the standard-library root; calls whose callee
    /// namespace equals it exactly are omitted.
    #[serde(default = "default_stdlib_root")]
    pub stdlib_root_namespace: String,

    /// Case-insensitive path fragments excluding files from collection
    /// (build output directories, generated-file suffixes).
    #[serde(default = "default_exclusion_markers")]
    pub exclusion_markers: Vec<String>,

    /// Glob patterns for paths to exclude from collection
    /// (e.g. "**/Migrations/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,

    /// Directories scanned for additional reference libraries besides the
    /// bin directory given on the command line.
    #[serde(default)]
    pub reference_dirs: Vec<PathBuf>,
}

fn default_excluded_namespace_prefixes() -> Vec<String> {
    vec![
        "System.".to_string(),
        "Microsoft.".to_string(),
        "<global namespace".to_string(),
    ]
}

fn default_stdlib_root() -> String {
    "System".to_string()
}

fn default_exclusion_markers() -> Vec<String> {
    vec!["/obj/".to_string(), ".designer.cs".to_string()]
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            excluded_namespace_prefixes: default_excluded_namespace_prefixes(),
            stdlib_root_namespace: default_stdlib_root(),
            exclusion_markers: default_exclusion_markers(),
            excluded_paths: Vec::new(),
            reference_dirs: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: AnalyzerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Discover a config file in the working directory; defaults apply
    /// when none exists.
    pub fn discover() -> anyhow::Result<Self> {
        for name in DEFAULT_CONFIG_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::parse_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Whether a callee namespace is filtered from the report.
    pub fn is_namespace_excluded(&self, namespace: &str) -> bool {
        namespace == self.stdlib_root_namespace
            || self
                .excluded_namespace_prefixes
                .iter()
                .any(|prefix| namespace.starts_with(prefix.as_str()))
    }

    /// Whether a path is excluded from source collection, either by a
    /// case-insensitive marker fragment or by a glob pattern.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/").to_lowercase();
        if self
            .exclusion_markers
            .iter()
            .any(|marker| normalized.contains(&marker.to_lowercase()))
        {
            return true;
        }

        let path_str = path.to_string_lossy();
        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                if glob.compile_matcher().is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdlib_root_is_excluded_exactly() {
        let config = AnalyzerConfig::default();
        assert!(config.is_namespace_excluded("System"));
        assert!(config.is_namespace_excluded("System.Text"));
        assert!(config.is_namespace_excluded("Microsoft.Win32"));
        // "Systematic" is not under the root and matches no prefix.
        assert!(!config.is_namespace_excluded("Systematic"));
        assert!(!config.is_namespace_excluded("MyApp.Services"));
    }

    #[test]
    fn custom_prefixes_apply() {
        let config = AnalyzerConfig {
            excluded_namespace_prefixes: vec!["Vendor.".to_string()],
            ..AnalyzerConfig::default()
        };
        assert!(config.is_namespace_excluded("Vendor.Sdk"));
        assert!(!config.is_namespace_excluded("Microsoft.Win32"));
    }

    #[test]
    fn markers_exclude_paths_case_insensitively() {
        let config = AnalyzerConfig::default();
        assert!(config.is_path_excluded(Path::new("src/obj/Debug/Gen.cs")));
        assert!(config.is_path_excluded(Path::new("src\\OBJ\\Debug\\Gen.cs")));
        assert!(config.is_path_excluded(Path::new("Forms/Main.Designer.cs")));
        assert!(!config.is_path_excluded(Path::new("src/Objects.cs")));
    }

    #[test]
    fn glob_patterns_exclude_paths() {
        let config = AnalyzerConfig {
            excluded_paths: vec!["**/Migrations/**".to_string()],
            ..AnalyzerConfig::default()
        };
        assert!(config.is_path_excluded(Path::new("src/Migrations/Init.cs")));
        assert!(!config.is_path_excluded(Path::new("src/Models/Init.cs")));
    }

    #[test]
    fn parses_yaml_with_partial_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("callscan.yaml");
        std::fs::write(
            &path,
            "excluded_namespace_prefixes:\n  - \"Legacy.\"\nstdlib_root_namespace: Sys\n",
        )
        .unwrap();

        let config = AnalyzerConfig::parse_file(&path).unwrap();
        assert_eq!(config.excluded_namespace_prefixes, vec!["Legacy."]);
        assert_eq!(config.stdlib_root_namespace, "Sys");
        // Unspecified fields keep their defaults.
        assert_eq!(config.exclusion_markers, vec!["/obj/", ".designer.cs"]);
    }
}
