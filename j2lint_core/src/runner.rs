use std::path::Path;
use std::path::PathBuf;

use crate::FileReport;
use crate::LintIssue;
use crate::RuleCollection;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::files::normalize_line_endings;

/// Label used for text read from standard input.
pub const STDIN_LABEL: &str = "stdin";

/// Issues for every linted file, in the order the files were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
	pub files: Vec<FileReport>,
}

impl LintReport {
	pub fn errors(&self) -> impl Iterator<Item = &LintIssue> {
		self.files.iter().flat_map(|file| file.errors.iter())
	}

	pub fn warnings(&self) -> impl Iterator<Item = &LintIssue> {
		self.files.iter().flat_map(|file| file.warnings.iter())
	}

	pub fn error_count(&self) -> usize {
		self.files.iter().map(|file| file.errors.len()).sum()
	}

	pub fn warning_count(&self) -> usize {
		self.files.iter().map(|file| file.warnings.len()).sum()
	}

	pub fn has_errors(&self) -> bool {
		self.error_count() > 0
	}

	pub fn is_clean(&self) -> bool {
		self.files.iter().all(FileReport::is_clean)
	}
}

/// Reads files and runs a [`RuleCollection`] over each of them.
#[derive(Debug)]
pub struct Runner<'a> {
	collection: &'a RuleCollection,
	max_file_size: u64,
}

impl<'a> Runner<'a> {
	pub fn new(collection: &'a RuleCollection) -> Self {
		Self {
			collection,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}

	#[must_use]
	pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
		self.max_file_size = max_file_size;
		self
	}

	/// Lint in-memory text labelled as `label`.
	pub fn lint_text(&self, label: &str, text: &str) -> FileReport {
		self.collection.run(label, &normalize_line_endings(text))
	}

	/// Lint one file. A file that cannot be read, or is larger than the size
	/// limit, logs a warning and yields an empty report.
	pub fn lint_file(&self, path: &Path) -> FileReport {
		let label = path.display().to_string();

		if let Ok(metadata) = std::fs::metadata(path) {
			if metadata.len() > self.max_file_size {
				tracing::warn!(
					"Skipping {label} - file is {} bytes (limit: {} bytes)",
					metadata.len(),
					self.max_file_size
				);
				return FileReport::new(label);
			}
		}

		match std::fs::read_to_string(path) {
			Ok(text) => self.lint_text(&label, &text),
			Err(error) => {
				tracing::warn!("Could not open {label} - {error}");
				FileReport::new(label)
			}
		}
	}

	pub fn lint_files(&self, paths: &[PathBuf]) -> LintReport {
		LintReport {
			files: paths.iter().map(|path| self.lint_file(path)).collect(),
		}
	}
}
