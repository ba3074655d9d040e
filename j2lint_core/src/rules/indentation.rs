use crate::LintIssue;
use crate::Rule;
use crate::Severity;
use crate::extractor::extract_statements;
use crate::indenter::IndentationChecker;

/// `S3`: statements nested in a block are indented four columns deeper than
/// the block, and a block's end tag lines up with its begin tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentationRule;

impl Rule for IndentationRule {
	fn id(&self) -> &'static str {
		"S3"
	}

	fn short_description(&self) -> &'static str {
		"jinja-statements-indentation"
	}

	fn description(&self) -> &'static str {
		"All J2 statements must be indented by 4 more spaces within jinja delimiter. To close a \
		 control, end tag must have same indentation level."
	}

	fn severity(&self) -> Severity {
		Severity::High
	}

	fn check_text(&self, path: &str, text: &str) -> Vec<LintIssue> {
		let statements = extract_statements(text, true);
		let mut checker = IndentationChecker::new(&statements);

		if let Err(error) = checker.run() {
			tracing::error!("Indentation check failed for file {path}: Error: {error}");
		}

		let info = self.info();
		let (_, errors) = checker.into_parts();
		errors
			.into_iter()
			.map(|error| LintIssue::new(info, path, error.line, error.text, error.message))
			.collect()
	}
}
