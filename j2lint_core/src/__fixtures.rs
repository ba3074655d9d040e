use crate::FileReport;
use crate::LintIssue;
use crate::RuleCollection;
use crate::Runner;
use crate::StructureError;
use crate::extractor::extract_statements;
use crate::indenter::IndentationChecker;
use crate::indenter::IndentationError;

pub const CLEAN_NESTED_TEMPLATE: &str = "\
{% for item in items %}
{%     if item %}
{%         set value = item %}
{%     else %}
{%         set value = 0 %}
{%     endif %}
{% endfor %}
";

/// Indentation errors and the structural outcome for `text`.
pub fn check_indentation(text: &str) -> (Vec<IndentationError>, Result<(), StructureError>) {
	let statements = extract_statements(text, true);
	let mut checker = IndentationChecker::new(&statements);
	let outcome = checker.run();
	let (_, errors) = checker.into_parts();
	(errors, outcome)
}

/// `(line, message)` for every indentation error in `text`.
pub fn indentation_messages(text: &str) -> Vec<(usize, String)> {
	check_indentation(text)
		.0
		.into_iter()
		.map(|error| (error.line, error.message))
		.collect()
}

pub fn lint(text: &str) -> FileReport {
	let collection = RuleCollection::builtin();
	Runner::new(&collection).lint_text("template.j2", text)
}

/// `(rule id, line)` pairs, in report order.
pub fn issue_ids(issues: &[LintIssue]) -> Vec<(&'static str, usize)> {
	issues
		.iter()
		.map(|issue| (issue.rule.id, issue.line_number))
		.collect()
}
