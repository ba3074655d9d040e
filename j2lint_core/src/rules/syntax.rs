use minijinja::Environment;

use crate::LintIssue;
use crate::Rule;
use crate::Severity;

/// `S0`: the template must compile.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxErrorRule;

impl Rule for SyntaxErrorRule {
	fn id(&self) -> &'static str {
		"S0"
	}

	fn short_description(&self) -> &'static str {
		"jinja-syntax-error"
	}

	fn description(&self) -> &'static str {
		"Jinja syntax should be correct"
	}

	fn severity(&self) -> Severity {
		Severity::High
	}

	fn check_text(&self, path: &str, text: &str) -> Vec<LintIssue> {
		let env = Environment::new();
		let Err(error) = env.template_from_str(text) else {
			return Vec::new();
		};

		let line_number = error.line().unwrap_or(1).max(1);
		let line = text.split('\n').nth(line_number - 1).unwrap_or_default();
		let message = error
			.detail()
			.map_or_else(|| error.kind().to_string(), ToString::to_string);
		tracing::debug!(path, line = line_number, "template failed to compile: {message}");

		vec![LintIssue::new(self.info(), path, line_number, line, message)]
	}
}
