use std::fmt;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
	Low,
	Medium,
	High,
}

impl Severity {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "LOW",
			Self::Medium => "MEDIUM",
			Self::High => "HIGH",
		}
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Where a rule was defined. Only built-in rules exist today.
pub const BUILT_IN_ORIGIN: &str = "BUILT-IN";

/// A lint check run against the text of one template.
///
/// Line based rules only implement [`check_line`](Rule::check_line); rules
/// that need the whole file override [`check_text`](Rule::check_text).
pub trait Rule: Send + Sync {
	/// Short code such as `S3`.
	fn id(&self) -> &'static str;

	/// Kebab-case name such as `jinja-statements-indentation`.
	fn short_description(&self) -> &'static str;

	fn description(&self) -> &'static str;

	fn severity(&self) -> Severity;

	/// Older names still accepted in `--ignore`, `--warn` and disable
	/// comments.
	fn aliases(&self) -> &'static [&'static str] {
		&[]
	}

	fn origin(&self) -> &'static str {
		BUILT_IN_ORIGIN
	}

	/// Check a single physical line. Returns the message to report, if any.
	fn check_line(&self, _line: &str) -> Option<String> {
		None
	}

	/// Check a whole file. The default runs [`check_line`](Rule::check_line)
	/// on every line that does not start with `#`.
	fn check_text(&self, path: &str, text: &str) -> Vec<LintIssue> {
		let info = self.info();
		text.split('\n')
			.enumerate()
			.filter(|(_, line)| !line.trim_start().starts_with('#'))
			.filter_map(|(index, line)| {
				self.check_line(line)
					.map(|message| LintIssue::new(info, path, index + 1, line, message))
			})
			.collect()
	}

	/// Whether `name` refers to this rule by id, short description or alias.
	fn matches(&self, name: &str) -> bool {
		self.id() == name || self.short_description() == name || self.aliases().contains(&name)
	}

	fn info(&self) -> RuleInfo {
		RuleInfo {
			id: self.id(),
			short_description: self.short_description(),
			description: self.description(),
			severity: self.severity(),
			origin: self.origin(),
		}
	}
}

/// Owned snapshot of a rule's identity, attached to every issue it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RuleInfo {
	pub id: &'static str,
	pub short_description: &'static str,
	pub description: &'static str,
	pub severity: Severity,
	#[serde(skip)]
	pub origin: &'static str,
}

impl fmt::Display for RuleInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} {} ({})",
			self.id, self.description, self.short_description
		)
	}
}

/// A single problem found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
	pub rule: RuleInfo,
	pub file: String,
	/// 1-based.
	pub line_number: usize,
	/// The offending source text.
	pub line: String,
	pub message: String,
}

impl LintIssue {
	pub fn new(
		rule: RuleInfo,
		file: impl Into<String>,
		line_number: usize,
		line: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self {
			rule,
			file: file.into(),
			line_number,
			line: line.into(),
			message: message.into(),
		}
	}

	/// Multi-line form used with `--verbose`.
	pub fn verbose(&self) -> String {
		format!(
			"Linting rule: {}\nRule description: {}\nError line: {}:{} {}\nError message: {}\n",
			self.rule.id,
			self.rule.description,
			self.file,
			self.line_number,
			self.line,
			self.message
		)
	}

	pub fn to_json(&self) -> serde_json::Value {
		serde_json::json!({
			"id": self.rule.id,
			"message": self.message,
			"filename": self.file,
			"line_number": self.line_number,
			"line": self.line,
			"severity": self.rule.severity,
		})
	}

	/// Ordering used for reports: file, then line, then rule id.
	pub fn sort_key(&self) -> (&str, usize, &str) {
		(&self.file, self.line_number, self.rule.id)
	}
}

impl fmt::Display for LintIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}:{} {} ({})",
			self.file, self.line_number, self.message, self.rule.short_description
		)
	}
}
