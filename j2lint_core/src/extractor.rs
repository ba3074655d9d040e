use once_cell::sync::Lazy;
use regex::Regex;

use crate::statement::EndDelimiter;
use crate::statement::StartDelimiter;
use crate::statement::Statement;

/// `{%`, `{%-` or `{%+`, then the shortest content (newlines included) up to
/// `%}` or `-%}`.
static STATEMENT_PATTERN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(\{%[-+]?)((?s:.)*?)(-?%\})").expect("valid statement pattern"));

static COMMENT_PATTERN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\{#((?s:.)*?)#\}").expect("valid comment pattern"));

static VARIABLE_PATTERN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\{\{((?s:.)*?)\}\}").expect("valid variable pattern"));

/// Extract every `{% ... %}` statement from `text` in source order.
///
/// With `line_filter` set, only statements whose physical line begins (after
/// leading whitespace) with an opening delimiter are kept. Inline statements
/// such as `foo {% set x = 1 %}` are not subject to block indentation.
pub fn extract_statements(text: &str, line_filter: bool) -> Vec<Statement> {
	let lines: Vec<&str> = text.split('\n').collect();
	let mut statements = Vec::new();

	for captures in STATEMENT_PATTERN.captures_iter(text) {
		let (Some(open), Some(content), Some(close)) =
			(captures.get(1), captures.get(2), captures.get(3))
		else {
			continue;
		};
		let (Some(start_delimiter), Some(end_delimiter)) = (
			StartDelimiter::parse(open.as_str()),
			EndDelimiter::parse(close.as_str()),
		) else {
			continue;
		};

		let start_line = line_number_at(text, content.start());
		let end_line = line_number_at(text, content.end());

		if line_filter && !starts_physical_line(&lines, start_line) {
			tracing::debug!(line = start_line, "skipping inline statement");
			continue;
		}

		statements.push(Statement::new(
			content.as_str(),
			start_line,
			end_line,
			start_delimiter,
			end_delimiter,
		));
	}

	tracing::debug!(count = statements.len(), line_filter, "extracted statements");
	statements
}

/// Contents of every `{# ... #}` comment.
pub fn extract_comments(text: &str) -> Vec<&str> {
	COMMENT_PATTERN
		.captures_iter(text)
		.filter_map(|captures| captures.get(1).map(|m| m.as_str()))
		.collect()
}

/// Contents of every `{{ ... }}` expression.
pub fn extract_variables(text: &str) -> Vec<&str> {
	VARIABLE_PATTERN
		.captures_iter(text)
		.filter_map(|captures| captures.get(1).map(|m| m.as_str()))
		.collect()
}

fn line_number_at(text: &str, offset: usize) -> usize {
	text.as_bytes()[..offset]
		.iter()
		.filter(|byte| **byte == b'\n')
		.count()
		+ 1
}

fn starts_physical_line(lines: &[&str], line_number: usize) -> bool {
	lines
		.get(line_number - 1)
		.is_some_and(|line| line.trim_start().starts_with("{%"))
}
