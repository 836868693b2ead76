//! Workbook source resolution.
//!
//! A catalog directory holds one workbook per discipline bundle. The two well-known bundles are
//! always picked up when present; with auto-discovery enabled, any other `*material*.xlsx` file
//! in the directory (non-recursive, case-insensitive) is appended.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{CatalogError, CatalogResult};

/// Bundle file names that are always ingested first, in this order, when present.
pub const WELL_KNOWN_WORKBOOKS: [&str; 2] = ["BLE_MATERIALS.xlsx", "MEP_MATERIALS.xlsx"];

/// File name pattern used by auto-discovery (matched case-insensitively).
pub const DISCOVERY_PATTERN: &str = "*material*.xlsx";

/// Check that `dir` is a usable catalog directory.
pub fn check_source_directory(dir: &Path) -> CatalogResult<()> {
    if dir.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(CatalogError::configuration("data directory cannot be empty"));
    }
    if !dir.exists() {
        return Err(CatalogError::configuration(format!(
            "data directory not found: {}",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(CatalogError::configuration(format!(
            "data directory is not a directory: {}",
            dir.display()
        )));
    }
    Ok(())
}

/// Resolve the ordered, de-duplicated list of workbook files to ingest from `dir`.
///
/// Errors with [`CatalogError::Configuration`] when `dir` is blank or not an existing directory.
/// An empty result is not an error.
pub fn resolve_workbook_sources(
    dir: impl AsRef<Path>,
    auto_discover: bool,
) -> CatalogResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    check_source_directory(dir)?;

    let mut sources = Vec::new();
    let mut seen = HashSet::new();

    for name in WELL_KNOWN_WORKBOOKS {
        let path = dir.join(name);
        if path.is_file() && seen.insert(dedup_key(&path)) {
            tracing::debug!(file = %path.display(), "found well-known materials workbook");
            sources.push(path);
        }
    }

    if auto_discover {
        for path in discover_by_pattern(dir)? {
            if path.is_file() && seen.insert(dedup_key(&path)) {
                tracing::debug!(file = %path.display(), "auto-discovered materials workbook");
                sources.push(path);
            }
        }
    }

    Ok(sources)
}

/// Files directly inside `dir` whose name matches [`DISCOVERY_PATTERN`], sorted by name.
///
/// Only file names are matched, so the directory path itself may be any `OsStr`.
fn discover_by_pattern(dir: &Path) -> CatalogResult<Vec<PathBuf>> {
    let pattern = Pattern::new(DISCOVERY_PATTERN).map_err(|e| {
        CatalogError::configuration(format!("invalid discovery pattern '{DISCOVERY_PATTERN}': {e}"))
    })?;
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matched = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| pattern.matches_with(n, options));
        if matched && path.is_file() {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

fn dedup_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::resolve_workbook_sources;
    use crate::error::CatalogError;

    fn tmp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("material-catalog-discovery-{name}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(dir: &PathBuf, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn well_known_files_come_first() {
        let dir = tmp_dir("well-known");
        touch(&dir, "MEP_MATERIALS.xlsx");
        touch(&dir, "BLE_MATERIALS.xlsx");
        touch(&dir, "ARCH_MATERIALS.xlsx");

        let found = resolve_workbook_sources(&dir, true).unwrap();
        assert_eq!(
            names(&found),
            vec!["BLE_MATERIALS.xlsx", "MEP_MATERIALS.xlsx", "ARCH_MATERIALS.xlsx"]
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn auto_discovery_is_case_insensitive_and_non_recursive() {
        let dir = tmp_dir("case");
        touch(&dir, "fire_materials.xlsx");
        touch(&dir, "Finishes-Material-List.XLSX");
        touch(&dir, "notes.xlsx");
        touch(&dir, "materials.csv");
        fs::create_dir_all(dir.join("nested")).unwrap();
        touch(&dir.join("nested"), "NESTED_MATERIALS.xlsx");

        let found = resolve_workbook_sources(&dir, true).unwrap();
        let mut got = names(&found);
        got.sort();
        assert_eq!(got, vec!["Finishes-Material-List.XLSX", "fire_materials.xlsx"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn auto_discovery_disabled_only_takes_well_known_files() {
        let dir = tmp_dir("no-auto");
        touch(&dir, "BLE_MATERIALS.xlsx");
        touch(&dir, "EXTRA_MATERIALS.xlsx");

        let found = resolve_workbook_sources(&dir, false).unwrap();
        assert_eq!(names(&found), vec!["BLE_MATERIALS.xlsx"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn resolution_is_idempotent_and_picks_up_new_files_once() {
        let dir = tmp_dir("idempotent");
        touch(&dir, "BLE_MATERIALS.xlsx");
        touch(&dir, "MEP_MATERIALS.xlsx");

        let first = resolve_workbook_sources(&dir, true).unwrap();
        let second = resolve_workbook_sources(&dir, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);

        touch(&dir, "NEW_MATERIALS.xlsx");
        let third = resolve_workbook_sources(&dir, true).unwrap();
        assert_eq!(third.len(), 3);
        assert_eq!(&third[..2], &first[..]);
        assert_eq!(names(&third[2..]), vec!["NEW_MATERIALS.xlsx"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn case_variant_duplicates_are_not_re_added() {
        let dir = tmp_dir("case-dup");
        touch(&dir, "BLE_MATERIALS.xlsx");
        touch(&dir, "ble_materials.xlsx");

        let found = resolve_workbook_sources(&dir, true).unwrap();
        assert_eq!(names(&found), vec!["BLE_MATERIALS.xlsx"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_directory_name_still_discovers() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let parent = tmp_dir("non-utf8");
        let dir = parent.join(OsStr::from_bytes(b"cat\xffalog"));
        fs::create_dir_all(&dir).unwrap();
        touch(&dir, "BLE_MATERIALS.xlsx");
        touch(&dir, "Fire_Materials.xlsx");

        let found = resolve_workbook_sources(&dir, true).unwrap();
        assert_eq!(names(&found), vec!["BLE_MATERIALS.xlsx", "Fire_Materials.xlsx"]);

        let _ = fs::remove_dir_all(&parent);
    }

    #[test]
    fn empty_directory_resolves_to_nothing() {
        let dir = tmp_dir("empty");
        assert!(resolve_workbook_sources(&dir, true).unwrap().is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_or_blank_directory_is_a_configuration_error() {
        let err = resolve_workbook_sources("   ", true).unwrap_err();
        assert!(matches!(err, CatalogError::Configuration { .. }));

        let missing = std::env::temp_dir().join("material-catalog-definitely-missing-dir");
        let err = resolve_workbook_sources(&missing, true).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
