use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::lexer;

/// Unique tokens gathered from every scanned file. Iteration order is
/// unspecified; sort before producing output.
pub type TokenSet = HashSet<String>;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("no include patterns configured")]
    NoPatterns,
}

impl ScanError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScanError::NotFound { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub roots: Vec<PathBuf>,
    pub include: Vec<String>,
    pub ignore: Vec<String>,
    /// Files never treated as candidates, such as the generated stylesheet.
    pub exclude_files: Vec<PathBuf>,
    /// Also skip what `.gitignore`, `.ignore` and git exclude files list.
    pub respect_gitignore: bool,
    pub include_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            include: vec!["*.html".to_string()],
            ignore: vec!["node_modules".to_string()],
            exclude_files: Vec::new(),
            respect_gitignore: false,
            include_hidden: false,
        }
    }
}

/// Compiled include/ignore rules, shared by discovery and watch filtering.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    include: GlobSet,
    ignore: GlobSet,
    ignore_names: Vec<String>,
    exclude_files: Vec<PathBuf>,
}

impl PathMatcher {
    pub fn new(options: &ScanOptions) -> Result<Self, ScanError> {
        if options.include.is_empty() {
            return Err(ScanError::NoPatterns);
        }
        Ok(Self {
            include: build_globset(&options.include)?,
            ignore: build_globset(&options.ignore)?,
            ignore_names: options.ignore.clone(),
            exclude_files: options
                .exclude_files
                .iter()
                .map(|path| fs::canonicalize(path).unwrap_or_else(|_| path.clone()))
                .collect(),
        })
    }

    /// True when `path` (relative to `root`) is covered by an ignore entry.
    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        if self.ignore.is_match(relative) || self.ignore.is_match(path) {
            return true;
        }
        relative.components().any(|component| {
            self.ignore_names
                .iter()
                .any(|name| component.as_os_str() == name.as_str())
        })
    }

    /// True when a file at `path` should be scanned.
    pub fn is_candidate(&self, path: &Path, root: &Path) -> bool {
        if self.is_ignored(path, root) || self.is_excluded(path) {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let name_matches = path
            .file_name()
            .is_some_and(|name| self.include.is_match(Path::new(name)));
        name_matches || self.include.is_match(relative)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude_files.is_empty() {
            return false;
        }
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.exclude_files.iter().any(|excluded| *excluded == resolved)
    }
}

/// Lists candidate files under every root, sorted and without duplicates.
///
/// Each entry keeps the full path produced by the walk, so files nested at any
/// depth are reported with their real location.
pub fn discover(options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    let matcher = PathMatcher::new(options)?;
    let mut paths = BTreeSet::new();

    for root in &options.roots {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(!options.include_hidden)
            .ignore(options.respect_gitignore)
            .parents(options.respect_gitignore)
            .git_ignore(options.respect_gitignore)
            .git_global(options.respect_gitignore)
            .git_exclude(options.respect_gitignore)
            .require_git(false);
        let prune = matcher.clone();
        let prune_root = root.clone();
        builder.filter_entry(move |entry| {
            let ignored = prune.is_ignored(entry.path(), &prune_root);
            if ignored {
                tracing::debug!("skipping ignored path {}", entry.path().display());
            }
            !ignored
        });

        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if entry_vanished(&err) => continue,
                Err(source) => {
                    return Err(ScanError::Walk {
                        root: root.clone(),
                        source,
                    });
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            if matcher.is_candidate(path, root) {
                paths.insert(path.to_path_buf());
            }
        }
    }

    Ok(paths.into_iter().collect())
}

/// Tokenizes every file into one set. Files that vanished since discovery are
/// skipped with a diagnostic; any other read failure aborts.
pub fn collect_tokens(
    paths: &[PathBuf],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<TokenSet, ScanError> {
    let mut tokens = TokenSet::new();
    for path in paths {
        match lexer::tokenize_file(path) {
            Ok(found) => tokens.extend(found),
            Err(ScanError::NotFound { path }) => {
                diagnostics.push(Diagnostic::VanishedFile { path }.emit());
            }
            Err(err) => return Err(err),
        }
    }
    Ok(tokens)
}

fn entry_vanished(err: &ignore::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ScanError::InvalidGlob {
        pattern: patterns.join(","),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{PathMatcher, ScanError, ScanOptions, collect_tokens, discover};
    use crate::diagnostic::Diagnostic;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn options_for(root: &Path) -> ScanOptions {
        ScanOptions {
            roots: vec![root.to_path_buf()],
            ..ScanOptions::default()
        }
    }

    #[test]
    fn discovers_deeply_nested_files_with_real_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let deep = dir.path().join("a/b/c");
        fs::create_dir_all(&deep).expect("mkdir");
        fs::write(dir.path().join("index.html"), "flex").expect("write");
        fs::write(deep.join("page.html"), "grid").expect("write");
        fs::write(deep.join("notes.txt"), "hidden").expect("write");

        let paths = discover(&options_for(dir.path())).expect("discover should succeed");
        assert_eq!(
            paths,
            vec![dir.path().join("a/b/c/page.html"), dir.path().join("index.html")]
        );
        assert!(paths.iter().all(|path| path.exists()));
    }

    #[test]
    fn ignore_entries_prune_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("node_modules/pkg")).expect("mkdir");
        fs::create_dir_all(dir.path().join("src/generated")).expect("mkdir");
        fs::write(dir.path().join("node_modules/pkg/index.html"), "x").expect("write");
        fs::write(dir.path().join("src/generated/out.html"), "x").expect("write");
        fs::write(dir.path().join("src/app.html"), "x").expect("write");

        let options = ScanOptions {
            ignore: vec!["node_modules".to_string(), "**/generated/**".to_string()],
            ..options_for(dir.path())
        };
        let paths = discover(&options).expect("discover should succeed");
        assert_eq!(paths, vec![dir.path().join("src/app.html")]);
    }

    #[test]
    fn gitignore_is_only_honored_when_enabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("templates")).expect("mkdir");
        fs::write(dir.path().join(".gitignore"), "templates/\n").expect("write");
        fs::write(dir.path().join("templates/index.html"), "flex").expect("write");

        let paths = discover(&options_for(dir.path())).expect("discover should succeed");
        assert_eq!(paths, vec![dir.path().join("templates/index.html")]);

        let options = ScanOptions {
            respect_gitignore: true,
            ..options_for(dir.path())
        };
        let paths = discover(&options).expect("discover should succeed");
        assert!(paths.is_empty());
    }

    #[test]
    fn any_include_pattern_selects_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.html"), "x").expect("write");
        fs::write(dir.path().join("b.tsx"), "x").expect("write");
        fs::write(dir.path().join("c.rs"), "x").expect("write");

        let options = ScanOptions {
            include: vec!["*.html".to_string(), "*.tsx".to_string()],
            ..options_for(dir.path())
        };
        let paths = discover(&options).expect("discover should succeed");
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn excluded_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("out.css"), "flex").expect("write");
        fs::write(dir.path().join("app.css"), "grid").expect("write");

        let options = ScanOptions {
            include: vec!["*.css".to_string()],
            exclude_files: vec![dir.path().join("out.css")],
            ..options_for(dir.path())
        };
        let paths = discover(&options).expect("discover should succeed");
        assert_eq!(paths, vec![dir.path().join("app.css")]);
    }

    #[test]
    fn empty_include_list_is_an_error() {
        let options = ScanOptions {
            include: Vec::new(),
            ..ScanOptions::default()
        };
        assert!(matches!(PathMatcher::new(&options), Err(ScanError::NoPatterns)));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let options = ScanOptions {
            include: vec!["src/[".to_string()],
            ..ScanOptions::default()
        };
        let err = PathMatcher::new(&options).expect_err("should fail");
        assert!(err.to_string().contains("src/["));
    }

    #[test]
    fn collects_unique_tokens_and_skips_vanished_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("one.html");
        let second = dir.path().join("two.html");
        fs::write(&first, "flex text-center").expect("write");
        fs::write(&second, "flex sm:text-center").expect("write");
        let gone = dir.path().join("gone.html");

        let mut diagnostics = Vec::new();
        let tokens = collect_tokens(&[first, gone.clone(), second], &mut diagnostics)
            .expect("collect should succeed");

        assert_eq!(tokens.len(), 3);
        assert!(tokens.contains("sm:text-center"));
        assert_eq!(diagnostics, vec![Diagnostic::VanishedFile { path: gone }]);
    }

    #[test]
    fn unreadable_file_aborts_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut diagnostics = Vec::new();
        let err = collect_tokens(&[PathBuf::from(dir.path())], &mut diagnostics)
            .expect_err("directory read should fail");
        assert!(matches!(err, ScanError::Read { .. }));
        assert!(diagnostics.is_empty());
    }
}
