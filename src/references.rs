//! Reference metadata loading.
//!
//! The resolver needs to know about code it cannot see as source: the
//! libraries deployed beside the analyzed application and the core
//! runtime. Library files are collected from the bin directory (plus any
//! configured extra directories); core-runtime knowledge ships as an
//! embedded table mapping well-known framework type names to their
//! namespaces, which is what lets `Console.WriteLine` be recognized as a
//! `System` call and filtered as noise.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors while loading reference metadata. These are fatal to the run.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("reference directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("failed to read reference directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Namespaces of well-known core-runtime types. Small on purpose: it
/// covers the types that show up constantly in call receivers, so that
/// framework calls are classified and filtered instead of reported as
/// unresolved noise.
static CORE_TYPE_NAMESPACES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "Console" => "System",
    "Convert" => "System",
    "Math" => "System",
    "String" => "System",
    "Object" => "System",
    "Enum" => "System",
    "Array" => "System",
    "Activator" => "System",
    "GC" => "System",
    "Environment" => "System",
    "DateTime" => "System",
    "TimeSpan" => "System",
    "Guid" => "System",
    "Random" => "System",
    "Tuple" => "System",
    "Nullable" => "System",
    "BitConverter" => "System",
    "StringBuilder" => "System.Text",
    "Encoding" => "System.Text",
    "Regex" => "System.Text.RegularExpressions",
    "List" => "System.Collections.Generic",
    "Dictionary" => "System.Collections.Generic",
    "HashSet" => "System.Collections.Generic",
    "Queue" => "System.Collections.Generic",
    "Stack" => "System.Collections.Generic",
    "KeyValuePair" => "System.Collections.Generic",
    "Enumerable" => "System.Linq",
    "Queryable" => "System.Linq",
    "File" => "System.IO",
    "Directory" => "System.IO",
    "Path" => "System.IO",
    "StreamReader" => "System.IO",
    "StreamWriter" => "System.IO",
    "StringReader" => "System.IO",
    "StringWriter" => "System.IO",
    "MemoryStream" => "System.IO",
    "Debug" => "System.Diagnostics",
    "Trace" => "System.Diagnostics",
    "Stopwatch" => "System.Diagnostics",
    "Process" => "System.Diagnostics",
    "Thread" => "System.Threading",
    "Monitor" => "System.Threading",
    "Interlocked" => "System.Threading",
    "Task" => "System.Threading.Tasks",
    "Assembly" => "System.Reflection",
    "Marshal" => "System.Runtime.InteropServices",
};

/// Library metadata seeding the resolver.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    libraries: Vec<PathBuf>,
}

impl ReferenceSet {
    /// An empty set; the embedded core table still applies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collect `.dll` / `.exe` files from the bin directory and every
    /// configured extra directory. Directories must exist and be readable.
    pub fn load(bin_dir: &Path, extra_dirs: &[PathBuf]) -> Result<Self, ReferenceError> {
        let mut libraries = Vec::new();
        collect_libraries(bin_dir, &mut libraries)?;
        for dir in extra_dirs {
            collect_libraries(dir, &mut libraries)?;
        }
        libraries.sort();
        Ok(Self { libraries })
    }

    pub fn libraries(&self) -> &[PathBuf] {
        &self.libraries
    }

    /// Namespace of a well-known core-runtime type, if the table knows it.
    pub fn core_namespace_of(&self, type_name: &str) -> Option<&'static str> {
        CORE_TYPE_NAMESPACES.get(type_name).copied()
    }
}

fn collect_libraries(dir: &Path, libraries: &mut Vec<PathBuf>) -> Result<(), ReferenceError> {
    if !dir.is_dir() {
        return Err(ReferenceError::DirectoryNotFound(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| ReferenceError::Unreadable {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReferenceError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_library = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("dll") || e.eq_ignore_ascii_case("exe"))
            .unwrap_or(false);
        if is_library {
            libraries.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_table_knows_console() {
        let refs = ReferenceSet::empty();
        assert_eq!(refs.core_namespace_of("Console"), Some("System"));
        assert_eq!(refs.core_namespace_of("StringBuilder"), Some("System.Text"));
        assert_eq!(refs.core_namespace_of("Widget"), None);
    }

    #[test]
    fn loads_libraries_from_bin_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("App.dll"), b"").unwrap();
        std::fs::write(dir.path().join("App.exe"), b"").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let refs = ReferenceSet::load(dir.path(), &[]).unwrap();
        assert_eq!(refs.libraries().len(), 2);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = ReferenceSet::load(&missing, &[]).unwrap_err();
        assert!(matches!(err, ReferenceError::DirectoryNotFound(_)));
    }

    #[test]
    fn extra_directories_contribute_libraries() {
        let bin = tempfile::TempDir::new().unwrap();
        let extra = tempfile::TempDir::new().unwrap();
        std::fs::write(bin.path().join("A.dll"), b"").unwrap();
        std::fs::write(extra.path().join("B.dll"), b"").unwrap();

        let refs =
            ReferenceSet::load(bin.path(), &[extra.path().to_path_buf()]).unwrap();
        assert_eq!(refs.libraries().len(), 2);
    }
}
