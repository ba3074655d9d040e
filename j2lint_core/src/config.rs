use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::J2LintError;
use crate::J2LintResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["j2lint.toml", ".j2lint.toml", ".config/j2lint.toml"];

/// File extensions linted when a directory is walked.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["j2", "jinja", "jinja2"];

/// Configuration loaded from a `j2lint.toml` file.
///
/// ```toml
/// ignore = ["S1"]
/// warn = ["jinja-statements-indentation"]
/// extensions = ["j2", "jinja", "jinja2"]
/// max_file_size = 10485760
///
/// [exclude]
/// patterns = ["vendor/", "*.generated.j2"]
///
/// [include]
/// patterns = ["templates/**/*.txt"]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct J2LintConfig {
	/// Rules to skip, by id or short description.
	#[serde(default)]
	pub ignore: Vec<String>,
	/// Rules reported as warnings instead of errors.
	#[serde(default)]
	pub warn: Vec<String>,
	/// Extensions (without the dot) of the files to lint.
	#[serde(default = "default_extensions")]
	pub extensions: Vec<String>,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Inclusion configuration, extra glob patterns to lint whatever their
	/// extension.
	#[serde(default)]
	pub include: IncludeConfig,
	/// Files larger than this are skipped.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
}

impl Default for J2LintConfig {
	fn default() -> Self {
		Self {
			ignore: Vec::new(),
			warn: Vec::new(),
			extensions: default_extensions(),
			exclude: ExcludeConfig::default(),
			include: IncludeConfig::default(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct IncludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

fn default_extensions() -> Vec<String> {
	DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

impl J2LintConfig {
	/// Resolve the config file path at `root` using the supported candidate
	/// order.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> J2LintResult<Option<J2LintConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	pub fn parse(content: &str) -> J2LintResult<J2LintConfig> {
		toml::from_str(content).map_err(|e| J2LintError::ConfigParse(e.to_string()))
	}
}
