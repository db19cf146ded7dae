// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lexical normalization of repository-relative paths.

use std::path::{Component, Path, PathBuf};

/// Canonical repository-relative form of `raw`.
///
/// Purely lexical: `.` segments and trailing separators disappear, `..`
/// folds into its parent where one exists, and absolute paths under `root`
/// lose the root prefix. Symlinks are not followed.
pub fn normalize(raw: &str, root: &Path) -> PathBuf {
    let path = Path::new(raw);
    let path = if path.is_absolute() { path.strip_prefix(root).unwrap_or(path) } else { path };

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        plain          = { "a/b.java",           "a/b.java" },
        leading_dot    = { "./a/b.java",         "a/b.java" },
        inner_dot      = { "a/./b.java",         "a/b.java" },
        trailing_slash = { "a/b/",               "a/b" },
        double_slash   = { "a//b.java",          "a/b.java" },
        parent         = { "a/c/../b.java",      "a/b.java" },
        escaping       = { "../x/b.java",        "../x/b.java" },
        under_root     = { "/repo/a/b.java",     "a/b.java" },
        outside_root   = { "/elsewhere/b.java",  "/elsewhere/b.java" },
        root_parent    = { "/../a",              "/a" },
    )]
    fn normalizes(raw: &str, expected: &str) {
        assert_eq!(normalize(raw, Path::new("/repo")), PathBuf::from(expected));
    }
}
