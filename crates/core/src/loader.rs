//! Loads suite documents from disk

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{TapiError, TapiResult};
use crate::suite::TestSuite;

/// File name suffixes picked up when a directory is given
pub const SUITE_SUFFIXES: &[&str] = &[".tapi.js", ".tapi.json", ".tapi.yaml", ".tapi.yml"];

/// Parse a suite document held in memory.
///
/// `path` only picks the format (YAML for `.yaml`/`.yml`, JSON otherwise)
/// and names the document in errors.
pub fn parse_suite(content: &str, path: &Path) -> TapiResult<TestSuite> {
    let parsed = if is_yaml(path) {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| TapiError::ConfigParse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Read and parse one suite document
pub fn load_suite(path: &Path) -> TapiResult<TestSuite> {
    let content = std::fs::read_to_string(path).map_err(|source| TapiError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let suite = parse_suite(&content, path)?;
    debug!("Loaded suite '{}' ({} tests) from {}", suite.name, suite.tests.len(), path.display());
    Ok(suite)
}

/// Load every suite named by `paths`.
///
/// Directories are walked recursively for suite documents, in path order.
/// The first document that fails to load aborts the whole load.
pub fn load_suites(paths: &[PathBuf]) -> TapiResult<Vec<TestSuite>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = discover_suite_files(path);
            if found.is_empty() {
                return Err(TapiError::ConfigRead {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no suite documents in directory",
                    ),
                });
            }
            files.append(&mut found);
        } else {
            files.push(path.clone());
        }
    }

    files.iter().map(|f| load_suite(f)).collect()
}

fn discover_suite_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_suite_file(p))
        .collect();
    files.sort();
    files
}

pub fn is_suite_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            SUITE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        })
        .unwrap_or(false)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
}
