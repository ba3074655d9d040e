use once_cell::sync::Lazy;
use regex::Regex;

use crate::Rule;
use crate::Severity;

static VARIABLE_SPACING: Lazy<Regex> = Lazy::new(|| {
	Regex::new(
		r"\{\{[^ \-+\d]|\{\{[-+][^ ]|[^ \-+\d]\}\}|[^ {][-+\d]\}\}|\{\{ \s+[^ \-+]|[^ \-+] \s+\}\}",
	)
	.expect("valid variable spacing pattern")
});

static STATEMENT_SPACING: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"\{%[^ \-+]|\{%[\-+][^ ]|[^ \-+]%\}|[^ ][\-+]%\}")
		.expect("valid statement spacing pattern")
});

static SINGLE_QUOTED: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"'[^']*'").expect("valid single quote pattern"));

static DOUBLE_QUOTED: Lazy<Regex> =
	Lazy::new(|| Regex::new(r#""[^"]*""#).expect("valid double quote pattern"));

/// Operators that must be surrounded by exactly one space.
pub const SPACED_OPERATORS: [&str; 3] = ["|", "+", "=="];

/// `OP` is replaced by the escaped operator. The four branches catch a
/// missing space before, a missing space after, extra spaces before and
/// extra spaces after the operator, inside `{{ }}` or `{% %}`.
const OPERATOR_TEMPLATE: &str = r"(\{[{|%](.*?)([^ |^}]OP)(.*?)[}|%]\})|(\{[{|%](.*?)(OP[^ |^{])(.*?)[}|%]\})|(\{[{|%](.*?)([^ |^}] \s+OP)(.*?)[}|%]\})|(\{[{|%](.*?)(OP \s+[^ |^{])(.*?)[}|%]\})";

static OPERATOR_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
	SPACED_OPERATORS
		.iter()
		.map(|operator| {
			let pattern = OPERATOR_TEMPLATE.replace("OP", &regex::escape(operator));
			let regex = Regex::new(&pattern).expect("valid operator pattern");
			(*operator, regex)
		})
		.collect()
});

/// `S1`: `{{ name }}`, one space inside each pair of braces.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableSpacingRule;

impl Rule for VariableSpacingRule {
	fn id(&self) -> &'static str {
		"S1"
	}

	fn short_description(&self) -> &'static str {
		"single-space-decorator"
	}

	fn description(&self) -> &'static str {
		"A single space shall be added between Jinja2 curly brackets and a variable's name: '{{ \
		 ethernet_interface }}'"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_line(&self, line: &str) -> Option<String> {
		VARIABLE_SPACING
			.is_match(line)
			.then(|| self.description().to_string())
	}
}

/// `S2`: `{{ value | filter }}`, one space on each side of an operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorSpacingRule;

impl Rule for OperatorSpacingRule {
	fn id(&self) -> &'static str {
		"S2"
	}

	fn short_description(&self) -> &'static str {
		"operator-enclosed-by-spaces"
	}

	fn description(&self) -> &'static str {
		"When variables are used in combination with an operator, the operator shall be enclosed \
		 by space: '{{ my_value | to_json }}'"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_line(&self, line: &str) -> Option<String> {
		// Operators inside string literals are not operators.
		let line = SINGLE_QUOTED.replace_all(line, "''");
		let line = DOUBLE_QUOTED.replace_all(&line, "\"\"");

		let offending: Vec<&str> = OPERATOR_PATTERNS
			.iter()
			.filter(|(_, regex)| regex.is_match(&line))
			.map(|(operator, _)| *operator)
			.collect();

		match offending.as_slice() {
			[] => None,
			[operator] => {
				Some(format!(
					"The operator {operator} needs to be enclosed by a single space on each side"
				))
			}
			operators => {
				Some(format!(
					"The operators {} need to be enclosed by a single space on each side",
					operators.join(", ")
				))
			}
		}
	}
}

/// `S4`: `{% statement %}`, at least one space inside each delimiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementSpacingRule;

impl Rule for StatementSpacingRule {
	fn id(&self) -> &'static str {
		"S4"
	}

	fn short_description(&self) -> &'static str {
		"jinja-statements-single-space"
	}

	fn description(&self) -> &'static str {
		"Jinja statement should have a single space before and after: '{% statement %}'"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_line(&self, line: &str) -> Option<String> {
		STATEMENT_SPACING
			.is_match(line)
			.then(|| self.description().to_string())
	}
}

/// `S5`: indentation uses spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTabsRule;

impl Rule for NoTabsRule {
	fn id(&self) -> &'static str {
		"S5"
	}

	fn short_description(&self) -> &'static str {
		"jinja-statements-no-tabs"
	}

	fn description(&self) -> &'static str {
		"Indentation are 4 spaces and NOT tabulation"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_line(&self, line: &str) -> Option<String> {
		line.contains('\t')
			.then(|| self.description().to_string())
	}
}
