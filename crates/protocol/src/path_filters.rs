//! Helpers for `/`-separated corpus paths.

/// Lexically normalize a relative path: collapse `.`/`..`, drop empty
/// components, and return `.` when nothing is left.
///
/// Leading `..` that climb above the root are kept (`../x`), matching
/// POSIX `normpath` for relative inputs.
#[must_use]
pub fn normalize_relative(raw: &str) -> String {
    let raw = raw.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for component in raw.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return ".".to_string();
    }
    parts.join("/")
}

/// Directory part of a corpus path (`""` for files at the root).
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Resolve `reference` relative to the directory containing `from_file`.
#[must_use]
pub fn resolve_from(from_file: &str, reference: &str) -> String {
    let dir = parent_dir(from_file);
    if dir.is_empty() {
        normalize_relative(reference)
    } else {
        normalize_relative(&format!("{dir}/{reference}"))
    }
}

/// True when `path` equals `prefix` or lives underneath it as a whole
/// path segment (`network` matches `network/a.tf`, not `network-v2/a.tf`).
#[must_use]
pub fn path_prefix_matches(prefix: &str, path: &str) -> bool {
    if path == prefix {
        return true;
    }

    if !path.starts_with(prefix) {
        return false;
    }

    path.as_bytes().get(prefix.len()) == Some(&b'/')
}

/// Include/exclude prefix filter applied while scanning.
///
/// Filters are normalized like module sources; entries that normalize to
/// the root are ignored. Excludes win over includes.
#[must_use]
pub fn path_allowed(rel_path: &str, include_paths: &[String], exclude_paths: &[String]) -> bool {
    let rel_path = normalize_relative(rel_path);
    let under = |filter: &String| {
        filter_prefix(filter).is_some_and(|prefix| path_prefix_matches(&prefix, &rel_path))
    };

    let has_include = include_paths.iter().any(|f| filter_prefix(f).is_some());
    if has_include && !include_paths.iter().any(under) {
        return false;
    }
    !exclude_paths.iter().any(under)
}

fn filter_prefix(raw: &str) -> Option<String> {
    Some(normalize_relative(raw.trim())).filter(|prefix| prefix != ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize_relative("app/../network"), "network");
        assert_eq!(normalize_relative("./modules/vpc/"), "modules/vpc");
        assert_eq!(normalize_relative("app/../../shared"), "../shared");
        assert_eq!(normalize_relative("./"), ".");
        assert_eq!(normalize_relative("a\\b"), "a/b");
    }

    #[test]
    fn resolve_is_relative_to_declaring_directory() {
        assert_eq!(resolve_from("app/main.tf", "../network"), "network");
        assert_eq!(resolve_from("main.tf", "./modules/vpc"), "modules/vpc");
        assert_eq!(resolve_from("env/prod/main.tf", "../../modules/db"), "modules/db");
    }

    #[test]
    fn segment_prefix_does_not_match_sibling() {
        assert!(path_prefix_matches("network", "network/main.tf"));
        assert!(path_prefix_matches("network", "network"));
        assert!(!path_prefix_matches("network", "network-v2/main.tf"));
    }

    #[test]
    fn include_paths_is_prefix_match() {
        let include = vec!["modules".to_string()];
        let exclude: Vec<String> = Vec::new();
        assert!(path_allowed("modules/vpc/main.tf", &include, &exclude));
        assert!(!path_allowed("modules2/main.tf", &include, &exclude));
        assert!(!path_allowed("main.tf", &include, &exclude));
    }

    #[test]
    fn exclude_paths_wins() {
        let include = vec!["modules".to_string()];
        let exclude = vec!["./modules/legacy/".to_string()];
        assert!(path_allowed("modules/vpc/main.tf", &include, &exclude));
        assert!(!path_allowed("modules/legacy/main.tf", &include, &exclude));
    }

    #[test]
    fn root_only_entries_are_ignored() {
        let include = vec!["".to_string(), ".".to_string(), "./".to_string()];
        let exclude = vec!["////".to_string()];
        assert!(path_allowed("main.tf", &include, &exclude));
    }
}
