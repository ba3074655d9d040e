use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::J2LintConfig;
use crate::J2LintError;
use crate::J2LintResult;

/// Which files a directory walk keeps.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
	/// Lower-case extensions without the leading dot.
	pub extensions: Vec<String>,
	/// Gitignore-style patterns, relative to each walked directory.
	pub exclude_patterns: Vec<String>,
	/// Glob patterns, relative to each walked directory, linted regardless of
	/// extension.
	pub include_patterns: Vec<String>,
}

impl Default for DiscoveryOptions {
	fn default() -> Self {
		Self::from_config(&J2LintConfig::default())
	}
}

impl DiscoveryOptions {
	pub fn from_config(config: &J2LintConfig) -> Self {
		Self {
			extensions: config
				.extensions
				.iter()
				.map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
				.collect(),
			exclude_patterns: config.exclude.patterns.clone(),
			include_patterns: config.include.patterns.clone(),
		}
	}

	/// Whether `path` has one of the template extensions, ignoring case.
	pub fn is_template_file(&self, path: &Path) -> bool {
		path.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| {
				let ext = ext.to_ascii_lowercase();
				self.extensions.iter().any(|known| *known == ext)
			})
	}
}

/// Expand files and directories into the list of templates to lint.
///
/// Files named directly are kept when they have a template extension.
/// Directories are walked recursively in sorted order. A path named twice is
/// returned once, at its first position.
pub fn collect_files(inputs: &[PathBuf], options: &DiscoveryOptions) -> J2LintResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut seen = HashSet::new();

	for input in inputs {
		let found = if input.is_dir() {
			collect_directory(input, options)?
		} else if options.is_template_file(input) {
			vec![input.clone()]
		} else {
			tracing::debug!(path = %input.display(), "skipping file with unsupported extension");
			Vec::new()
		};

		for file in found {
			if seen.insert(file.clone()) {
				files.push(file);
			}
		}
	}

	tracing::debug!(?inputs, count = files.len(), "collected files");
	Ok(files)
}

fn collect_directory(root: &Path, options: &DiscoveryOptions) -> J2LintResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut ancestors = Vec::new();
	let exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let include = build_glob_set(&options.include_patterns)?;

	walk_dir(
		root,
		root,
		options,
		&exclude,
		&include,
		&mut files,
		&mut ancestors,
	)?;
	// Sort for deterministic ordering.
	files.sort();
	Ok(files)
}

/// Build a `Gitignore` matcher from `[exclude]` patterns.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> J2LintResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder
			.add_line(None, pattern)
			.map_err(|e| {
				J2LintError::InvalidPattern {
					kind: "exclude",
					pattern: pattern.clone(),
					reason: e.to_string(),
				}
			})?;
	}
	builder.build().map_err(|e| {
		J2LintError::InvalidPattern {
			kind: "exclude",
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `GlobSet` from `[include]` patterns.
fn build_glob_set(patterns: &[String]) -> J2LintResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			J2LintError::InvalidPattern {
				kind: "include",
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}
	builder.build().map_err(|e| {
		J2LintError::InvalidPattern {
			kind: "include",
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Version control and dependency directories never hold templates to lint.
/// Other dot-directories such as `.github` are walked.
fn is_ignored_directory_name(name: &str) -> bool {
	matches!(name, ".git" | ".hg" | ".svn" | "node_modules" | "target")
}

fn walk_dir(
	root: &Path,
	dir: &Path,
	options: &DiscoveryOptions,
	exclude: &Gitignore,
	include: &GlobSet,
	files: &mut Vec<PathBuf>,
	ancestors: &mut Vec<PathBuf>,
) -> J2LintResult<()> {
	// A cycle only exists when a directory links back to one of the
	// directories currently being walked. Sibling links to a shared
	// directory are walked once per link.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if ancestors.contains(&canonical) {
		return Err(J2LintError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}
	ancestors.push(canonical);

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		// Skip version control and dependency directories.
		let is_dir = path.is_dir();
		if is_dir
			&& path
				.file_name()
				.and_then(|n| n.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		if exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(root, &path, options, exclude, include, files, ancestors)?;
			continue;
		}

		let included = path
			.strip_prefix(root)
			.is_ok_and(|relative| include.is_match(relative));
		if options.is_template_file(&path) || included {
			files.push(path);
		}
	}

	ancestors.pop();
	Ok(())
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}
