use crate::Rule;
use crate::Severity;
use crate::extractor::extract_statements;

/// `S6`: no whitespace-control delimiters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementDelimiterRule;

impl Rule for StatementDelimiterRule {
	fn id(&self) -> &'static str {
		"S6"
	}

	fn short_description(&self) -> &'static str {
		"jinja-statements-delimiter"
	}

	fn description(&self) -> &'static str {
		"Jinja statements should not have {%- or {%+ or -%} as delimiters"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn aliases(&self) -> &'static [&'static str] {
		&["jinja-statements-delimeter"]
	}

	fn check_line(&self, line: &str) -> Option<String> {
		extract_statements(line, false)
			.iter()
			.any(|statement| {
				statement.start_delimiter.is_whitespace_control()
					|| statement.end_delimiter.is_whitespace_control()
			})
			.then(|| self.description().to_string())
	}
}

/// `S7`: at most one statement per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleStatementRule;

impl Rule for SingleStatementRule {
	fn id(&self) -> &'static str {
		"S7"
	}

	fn short_description(&self) -> &'static str {
		"single-statement-per-line"
	}

	fn description(&self) -> &'static str {
		"Jinja statements should be on separate lines"
	}

	fn severity(&self) -> Severity {
		Severity::Medium
	}

	fn check_line(&self, line: &str) -> Option<String> {
		(extract_statements(line, false).len() > 1).then(|| self.description().to_string())
	}
}
