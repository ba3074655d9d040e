use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum J2LintError {
	#[error(transparent)]
	#[diagnostic(code(j2lint::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(j2lint::config_parse),
		help("check that j2lint.toml is valid TOML with `ignore`, `warn` and [exclude] entries")
	)]
	ConfigParse(String),

	#[error("invalid {kind} pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(j2lint::invalid_pattern),
		help("exclude patterns use gitignore syntax, include patterns use glob syntax")
	)]
	InvalidPattern {
		kind: &'static str,
		pattern: String,
		reason: String,
	},

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(j2lint::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },

	#[error("unknown rule: `{0}`")]
	#[diagnostic(
		code(j2lint::unknown_rule),
		help("run `j2lint --list` to see every rule id and short description")
	)]
	UnknownRule(String),
}

/// A violation of the begin / middle / end tag grammar found while building
/// the statement tree of a single file.
///
/// These never escape the indentation rule: the rule logs them and keeps
/// whatever indentation diagnostics were gathered before the failure.
#[derive(Debug, Clone, Diagnostic, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StructureError {
	#[error("Line {line} - Tag is out of order '{tag}'")]
	#[diagnostic(
		code(j2lint::tag_out_of_order),
		help("every `end<tag>` must close the innermost open block")
	)]
	TagOutOfOrder { line: usize, tag: String },

	#[error("Unsupported tag '{tag}' found")]
	#[diagnostic(
		code(j2lint::unsupported_tag),
		help("`elif` is only valid inside `if`, `else` inside `if` or `for`")
	)]
	UnsupportedTag { line: usize, tag: String },

	#[error("Line {line} - missing closing tag for '{tag}'")]
	#[diagnostic(
		code(j2lint::missing_closing_tag),
		help("add `{{% end{tag} %}}` to close this block")
	)]
	MissingClosingTag { line: usize, tag: String },

	#[error("Line {line} - blocks nested deeper than {limit} levels")]
	#[diagnostic(
		code(j2lint::nesting_too_deep),
		help("split the template with `include` or `macro` to reduce nesting")
	)]
	NestingTooDeep { line: usize, limit: usize },

	#[error("Line {line} - empty statement found")]
	#[diagnostic(code(j2lint::empty_statement))]
	EmptyStatement { line: usize },
}

impl StructureError {
	/// The 1-based line of the statement that triggered the failure.
	pub fn line(&self) -> usize {
		match self {
			Self::TagOutOfOrder { line, .. }
			| Self::UnsupportedTag { line, .. }
			| Self::MissingClosingTag { line, .. }
			| Self::NestingTooDeep { line, .. }
			| Self::EmptyStatement { line } => *line,
		}
	}
}

pub type J2LintResult<T> = Result<T, J2LintError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
