use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::J2LintError;
use crate::J2LintResult;
use crate::LintIssue;
use crate::Rule;
use crate::RuleInfo;
use crate::extractor::extract_comments;
use crate::rules::builtin_rules;

static DISABLE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"j2lint\s*:\s*disable\s*=\s*([\w-]+)").expect("valid disable directive pattern")
});

/// Issues found in one file, split by whether their rule reports errors or
/// warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
	pub file: String,
	pub errors: Vec<LintIssue>,
	pub warnings: Vec<LintIssue>,
}

impl FileReport {
	pub fn new(file: impl Into<String>) -> Self {
		Self {
			file: file.into(),
			..Self::default()
		}
	}

	pub fn is_clean(&self) -> bool {
		self.errors.is_empty() && self.warnings.is_empty()
	}

	fn sort(&mut self) {
		self.errors.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
		self.warnings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
	}
}

/// The set of rules applied to every file, with the per-run `ignore` and
/// `warn` selections.
pub struct RuleCollection {
	rules: Vec<Box<dyn Rule>>,
	ignored: Vec<String>,
	warned: Vec<String>,
}

impl fmt::Debug for RuleCollection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RuleCollection")
			.field("rules", &self.rules.iter().map(|rule| rule.id()).collect::<Vec<_>>())
			.field("ignored", &self.ignored)
			.field("warned", &self.warned)
			.finish()
	}
}

impl Default for RuleCollection {
	fn default() -> Self {
		Self::builtin()
	}
}

impl RuleCollection {
	pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
		Self {
			rules,
			ignored: Vec::new(),
			warned: Vec::new(),
		}
	}

	pub fn builtin() -> Self {
		let collection = Self::new(builtin_rules());
		tracing::info!(rules = collection.len(), "created collection from built-in rules");
		collection
	}

	/// Skip the rules named by id or short description.
	pub fn ignore<I, S>(mut self, names: I) -> J2LintResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for name in names {
			let name = self.known_name(name.into())?;
			self.ignored.push(name);
		}

		Ok(self)
	}

	/// Report the issues of the rules named by id or short description as
	/// warnings instead of errors.
	pub fn warn<I, S>(mut self, names: I) -> J2LintResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for name in names {
			let name = self.known_name(name.into())?;
			self.warned.push(name);
		}

		Ok(self)
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
		self.rules.iter().map(|rule| &**rule)
	}

	pub fn is_ignored(&self, rule: &dyn Rule) -> bool {
		self.ignored.iter().any(|name| rule.matches(name))
	}

	pub fn is_warning(&self, rule: &dyn Rule) -> bool {
		self.warned.iter().any(|name| rule.matches(name))
	}

	/// Rule identities sorted by origin then id.
	pub fn infos(&self) -> Vec<RuleInfo> {
		let mut infos: Vec<RuleInfo> = self.rules().map(|rule| rule.info()).collect();
		infos.sort_by(|a, b| (a.origin, a.id).cmp(&(b.origin, b.id)));
		infos
	}

	pub fn to_json(&self) -> serde_json::Value {
		serde_json::Value::Array(
			self.infos()
				.into_iter()
				.map(|info| {
					serde_json::json!({
						"id": info.id,
						"short_description": info.short_description,
						"description": info.description,
						"severity": info.severity,
					})
				})
				.collect(),
		)
	}

	/// Run every active rule over `text`, labelled as `path` in the issues.
	pub fn run(&self, path: &str, text: &str) -> FileReport {
		let mut report = FileReport::new(path);

		for rule in self.rules() {
			if self.is_ignored(rule) {
				tracing::debug!(
					"Ignoring rule {}:{} for file {path}",
					rule.id(),
					rule.short_description()
				);
				continue;
			}

			if is_rule_disabled(text, rule) {
				tracing::debug!("Skipping linting rule {} on file {path}", rule.id());
				continue;
			}

			tracing::debug!("Running linting rule {} on file {path}", rule.id());
			let issues = rule.check_text(path, text);
			if self.is_warning(rule) {
				report.warnings.extend(issues);
			} else {
				report.errors.extend(issues);
			}
		}

		report.sort();
		for issue in &report.errors {
			tracing::error!("{issue}");
		}
		for issue in &report.warnings {
			tracing::warn!("{issue}");
		}

		report
	}

	fn known_name(&self, name: String) -> J2LintResult<String> {
		if self.rules.iter().any(|rule| rule.matches(&name)) {
			Ok(name)
		} else {
			Err(J2LintError::UnknownRule(name))
		}
	}
}

impl fmt::Display for RuleCollection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut origin = None;
		for info in self.infos() {
			if origin != Some(info.origin) {
				origin = Some(info.origin);
				writeln!(f, "Origin: {}", info.origin)?;
			}
			writeln!(f, "{info}")?;
		}

		Ok(())
	}
}

/// Whether a `{# j2lint: disable=<rule> #}` comment in `text` names `rule`.
pub fn is_rule_disabled(text: &str, rule: &dyn Rule) -> bool {
	extract_comments(text)
		.into_iter()
		.flat_map(|comment| DISABLE_DIRECTIVE.captures_iter(comment))
		.filter_map(|captures| captures.get(1))
		.any(|name| rule.matches(name.as_str()))
}
