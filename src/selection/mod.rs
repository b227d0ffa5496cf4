//! Spec selection
//!
//! Filters the requested spec identifiers down to those whose package name
//! appears in the release catalog, pairing each surviving spec with the lane
//! working directory.
//!
//! Selection is a pass-through filter: identifiers with no catalog match are
//! dropped without a diagnostic, and the output preserves request order.

use std::path::{Path, PathBuf};

/// The reference list of package names known to the release.
///
/// Built from the `packages` array in `.podlane.toml` and passed explicitly
/// into [`select_jobs`]; there is no process-wide catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    names: Vec<String>,
}

impl Catalog {
    /// Build a catalog from an ordered list of package names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the catalog holds no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The catalog entries in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// One unit of lint work: a spec file, its package name, and the directory
/// the linter runs in. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Spec file name as requested (e.g., "CoreSDK.podspec").
    pub spec_file: String,

    /// Package name: the spec file minus everything from the first `.`.
    pub name: String,

    /// Directory the lint command runs in.
    pub work_dir: PathBuf,
}

/// Derive the package name from a spec identifier.
///
/// Everything from the first `.` onward is stripped, so
/// `"CoreSDK.podspec"` and `"CoreSDK.beta.podspec"` both yield `"CoreSDK"`.
pub fn package_name(spec_file: &str) -> &str {
    spec_file.split('.').next().unwrap_or(spec_file)
}

/// Filter `requested` down to the specs present in `catalog`.
///
/// Output order follows `requested`. Identifiers whose package name has no
/// exact catalog match produce no job and no error.
pub fn select_jobs(requested: &[String], catalog: &Catalog, work_dir: &Path) -> Vec<JobSpec> {
    requested
        .iter()
        .filter_map(|spec_file| {
            let name = package_name(spec_file);
            catalog.contains(name).then(|| JobSpec {
                spec_file: spec_file.clone(),
                name: name.to_string(),
                work_dir: work_dir.to_path_buf(),
            })
        })
        .collect()
}
