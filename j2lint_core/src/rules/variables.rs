use once_cell::sync::Lazy;
use regex::Regex;

use crate::Rule;
use crate::Severity;
use crate::extractor::extract_variables;

// Name characters: letters, digits, quotes and the `:` through `_` range,
// which takes in `:;<=>?@`, `[\]^` and `_` but not `-`. Subscripts such as
// `a[0]` are therefore part of a name.
static UPPER_CASE_NAME: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r#"[a-zA-Z0-9:-_"']*[A-Z][a-zA-Z0-9:-_"']*"#).expect("valid upper case pattern")
});

static HYPHENATED_NAME: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r#"[a-zA-Z0-9:-_"']+-[a-zA-Z0-9:-_"']+"#).expect("valid hyphenated name pattern")
});

const BOOLEAN_LITERALS: [&str; 2] = ["False", "True"];

fn is_quoted(word: &str) -> bool {
	word.contains('\'') || word.contains('"')
}

/// `V1`: variable names are lower case.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableCaseRule;

impl Rule for VariableCaseRule {
	fn id(&self) -> &'static str {
		"V1"
	}

	fn short_description(&self) -> &'static str {
		"jinja-variable-lower-case"
	}

	fn description(&self) -> &'static str {
		"All variables shall use lower case: '{{ variable }}'"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_line(&self, line: &str) -> Option<String> {
		extract_variables(line)
			.into_iter()
			.flat_map(|variable| UPPER_CASE_NAME.find_iter(variable))
			.map(|found| found.as_str())
			.any(|name| !BOOLEAN_LITERALS.contains(&name) && !is_quoted(name))
			.then(|| self.description().to_string())
	}
}

/// `V2`: multi-word variable names use `_`, not `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableFormatRule;

impl Rule for VariableFormatRule {
	fn id(&self) -> &'static str {
		"V2"
	}

	fn short_description(&self) -> &'static str {
		"jinja-variable-format"
	}

	fn description(&self) -> &'static str {
		"If variable is multi-words, underscore _ shall be used as a separator: '{{ \
		 my_variable_name }}'"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_line(&self, line: &str) -> Option<String> {
		extract_variables(line)
			.into_iter()
			.flat_map(|variable| HYPHENATED_NAME.find_iter(variable))
			.any(|found| !is_quoted(found.as_str()))
			.then(|| self.description().to_string())
	}
}
