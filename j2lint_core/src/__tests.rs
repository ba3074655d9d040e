use std::path::PathBuf;

use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::extractor::extract_comments;
use crate::extractor::extract_statements;
use crate::extractor::extract_variables;
use crate::indenter::IndentationChecker;
use crate::indenter::MAX_NESTING_DEPTH;
use crate::indenter::NodeId;
use crate::indenter::TagFamily;
use crate::indenter::TagKind;
use crate::rules::IndentationRule;
use crate::rules::NoTabsRule;
use crate::rules::OperatorSpacingRule;
use crate::rules::SingleStatementRule;
use crate::rules::StatementDelimiterRule;
use crate::rules::StatementSpacingRule;
use crate::rules::SyntaxErrorRule;
use crate::rules::VariableCaseRule;
use crate::rules::VariableFormatRule;
use crate::rules::VariableSpacingRule;

#[test]
fn extract_statements_in_source_order() {
	let text = "{% if x %}\n    {% set y = 1 %}\n{% endif %}\n";
	let statements = extract_statements(text, false);

	let found: Vec<(&str, usize, usize)> = statements
		.iter()
		.map(|statement| (statement.text.as_str(), statement.start_line, statement.end_line))
		.collect();
	assert_eq!(
		found,
		vec![(" if x ", 1, 1), (" set y = 1 ", 2, 2), (" endif ", 3, 3)]
	);
}

#[test]
fn extract_multiline_statement_spans_lines() {
	let text = "{% if a and\n   b %}\nfoo\n{% endif %}";
	let statements = extract_statements(text, true);

	assert_eq!(statements.len(), 2);
	assert_eq!(statements[0].start_line, 1);
	assert_eq!(statements[0].end_line, 2);
	assert_eq!(statements[0].words, vec!["if", "a", "and", "b"]);
	assert_eq!(statements[1].start_line, 4);
}

#[rstest]
#[case::plain("{% if x %}", StartDelimiter::Plain, EndDelimiter::Plain)]
#[case::trim_both("{%- if x -%}", StartDelimiter::Trim, EndDelimiter::Trim)]
#[case::preserve("{%+ if x %}", StartDelimiter::Preserve, EndDelimiter::Plain)]
#[case::trim_end("{% if x -%}", StartDelimiter::Plain, EndDelimiter::Trim)]
fn extract_statement_delimiters(
	#[case] input: &str,
	#[case] start: StartDelimiter,
	#[case] end: EndDelimiter,
) {
	let statements = extract_statements(input, false);

	assert_eq!(statements.len(), 1);
	assert_eq!(statements[0].text, " if x ");
	assert_eq!(statements[0].start_delimiter, start);
	assert_eq!(statements[0].end_delimiter, end);
	assert_eq!(statements[0].delimited(), input);
}

#[test]
fn line_filter_drops_inline_statements() {
	let text = "foo {% set x = 1 %}\n  {% set y = 2 %}\n";

	let filtered = extract_statements(text, true);
	assert_eq!(filtered.len(), 1);
	assert_eq!(filtered[0].tag(), Some("set"));
	assert_eq!(filtered[0].start_line, 2);

	assert_eq!(extract_statements(text, false).len(), 2);
}

#[rstest]
#[case::empty("")]
#[case::no_statements("hello {{ name }}\n")]
#[case::unterminated("{% if x\n")]
fn extract_nothing(#[case] input: &str) {
	assert!(extract_statements(input, true).is_empty());
	assert!(extract_statements(input, false).is_empty());
}

#[test]
fn extract_comments_and_variables() {
	let text = "{# first #}{{ a }}\n{#\nsecond\n#} {{b}}";

	assert_eq!(extract_comments(text), vec![" first ", "\nsecond\n"]);
	assert_eq!(extract_variables(text), vec![" a ", "b"]);
}

#[test]
fn statement_counts_leading_spaces_only() {
	let spaced = Statement::new("   if x ", 1, 1, StartDelimiter::Plain, EndDelimiter::Plain);
	assert_eq!(spaced.leading_whitespace, 3);
	assert_eq!(spaced.tag(), Some("if"));
	assert_eq!(spaced.words, vec!["if", "x"]);

	let tabbed = Statement::new("\t if x ", 1, 1, StartDelimiter::Plain, EndDelimiter::Plain);
	assert_eq!(tabbed.leading_whitespace, 0);
	assert_eq!(tabbed.tag(), Some("if"));

	let blank = Statement::new(" ", 1, 1, StartDelimiter::Plain, EndDelimiter::Plain);
	assert_eq!(blank.tag(), None);
	assert!(blank.words.is_empty());
}

#[rstest]
#[case::begin_for("for", TagKind::Begin(TagFamily::For))]
#[case::begin_if("if", TagKind::Begin(TagFamily::If))]
#[case::begin_macro("macro", TagKind::Begin(TagFamily::Macro))]
#[case::middle_else("else", TagKind::Middle)]
#[case::middle_elif("elif", TagKind::Middle)]
#[case::end_for("endfor", TagKind::End)]
#[case::end_macro("endmacro", TagKind::End)]
#[case::plain_set("set", TagKind::Plain)]
#[case::plain_block("block", TagKind::Plain)]
fn classify_tags(#[case] tag: &str, #[case] expected: TagKind) {
	assert_eq!(TagKind::classify(tag), expected);
}

#[rstest]
#[case::single_block("{% if x %}\n{%     set y = 1 %}\n{% endif %}\n")]
#[case::nested_with_else(CLEAN_NESTED_TEMPLATE)]
#[case::macro_block("{% macro greet(name) %}\n{%     set message = name %}\n{% endmacro %}\n")]
#[case::plain_text_body("{% if x %}\n    y\n{% endif %}\n")]
#[case::inline_statements_ignored("{% if x %}\nfoo {%set y = 1%}\n{% endif %}\n")]
#[case::elif_chain(
	"\
{% if a %}
{%     set v = 1 %}
{% elif b %}
{%     set v = 2 %}
{% else %}
{%     set v = 3 %}
{% endif %}
"
)]
#[case::for_else("{% for x in y %}\n{%     set v = x %}\n{% else %}\n{%     set v = 0 %}\n{% endfor %}\n")]
fn correctly_indented_templates_are_clean(#[case] input: &str) {
	let (errors, outcome) = check_indentation(input);

	assert_eq!(outcome, Ok(()));
	assert!(errors.is_empty());
}

#[test]
fn body_indented_too_little() {
	let input = "{% if x %}\n{%   set y = 1 %}\n{% endif %}\n";

	assert_eq!(
		indentation_messages(input),
		vec![(2, "Bad Indentation, expected 5, got 3".to_string())]
	);
}

#[test]
fn whitespace_control_body_indented_by_two() {
	let input = "{% if x %}\n{%-  set y = 1 %}\n{% endif %}\n";

	assert_eq!(
		indentation_messages(input),
		vec![(2, "Bad Indentation, expected 4, got 2".to_string())]
	);
}

#[test]
fn unindented_body_statement() {
	let input = "{% if x %}\n{%-set y = 1 %}\n{% endif %}\n";

	assert_eq!(
		indentation_messages(input),
		vec![(2, "Bad Indentation, expected 4, got 0".to_string())]
	);
}

#[test]
fn indentation_error_keeps_delimited_statement() {
	let (errors, _) = check_indentation("{% if x %}\n{%   set y = 1 -%}\n{% endif %}\n");

	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].text, "{%   set y = 1 -%}");
}

#[test]
fn middle_tags_are_siblings_of_their_block() {
	let statements = extract_statements("{% if x %}\n a \n{% else %}\n b \n{% endif %}", true);
	let mut checker = IndentationChecker::new(&statements);
	checker.run().unwrap();

	let tree = checker.tree();
	let root_tags: Vec<Option<&str>> = tree.children(NodeId::ROOT).map(|node| node.tag()).collect();
	assert_eq!(root_tags, vec![Some("if"), Some("else"), Some("endif")]);

	let begin = tree.find("if").unwrap();
	let middle = tree.find("else").unwrap();
	let end = tree.find("endif").unwrap();
	assert_eq!(middle.expected_indent, begin.expected_indent);
	assert_eq!(end.expected_indent, begin.expected_indent);
	assert_eq!(begin.node_start, 0);
	assert_eq!(begin.node_end, 2);
	assert_eq!(middle.node_start, 1);
	assert_eq!(end.node_start, 2);
	assert_eq!(middle.parent, Some(NodeId::ROOT));
	assert!(checker.errors().is_empty());
}

#[test]
fn nested_body_belongs_to_middle_node() {
	let statements = extract_statements(CLEAN_NESTED_TEMPLATE, true);
	let mut checker = IndentationChecker::new(&statements);
	checker.run().unwrap();

	let tree = checker.tree();
	assert_eq!(tree.len(), 8);

	let for_children: Vec<Option<&str>> = tree
		.nodes()
		.find(|(_, node)| node.tag() == Some("for"))
		.map(|(id, _)| tree.children(id).map(|node| node.tag()).collect())
		.unwrap_or_default();
	assert_eq!(for_children, vec![Some("if"), Some("else"), Some("endif")]);

	let else_node = tree.find("else").unwrap();
	assert_eq!(else_node.expected_indent, 4);
	assert_eq!(else_node.children.len(), 1);
	assert_eq!(tree.find("endfor").map(|node| node.expected_indent), Some(0));
}

#[test]
#[traced_test]
fn tag_out_of_order_is_contained() {
	let issues = IndentationRule.check_text("broken.j2", "{% endfor %}\n");

	assert_eq!(issues.len(), 1);
	assert_eq!(issues[0].line_number, 1);
	assert_eq!(issues[0].line, "{% endfor %}");
	assert_eq!(issues[0].message, "Line 1 - Tag is out of order 'endfor'");

	logs_assert(|lines: &[&str]| {
		let failures = lines
			.iter()
			.filter(|line| line.contains("Tag is out of order"))
			.count();
		if failures == 1 {
			Ok(())
		} else {
			Err(format!("expected one failure log line, found {failures}"))
		}
	});
	assert!(logs_contain(
		"Indentation check failed for file broken.j2: Error: Line 1 - Tag is out of order 'endfor'"
	));
}

#[test]
fn mismatched_end_tag_stops_the_walk() {
	let input = "{% for x in y %}\n{%     if x %}\n{%     endfor %}\n";
	let (errors, outcome) = check_indentation(input);

	assert_eq!(
		outcome,
		Err(StructureError::TagOutOfOrder {
			line: 3,
			tag: "endfor".to_string(),
		})
	);
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].text, "{%     endfor %}");
	assert_eq!(errors[0].message, "Line 3 - Tag is out of order 'endfor'");
}

#[test]
fn unterminated_block_is_reported() {
	let (errors, outcome) = check_indentation("{% if x %}\n{%     set y = 1 %}\n");

	assert_eq!(
		outcome,
		Err(StructureError::MissingClosingTag {
			line: 1,
			tag: "if".to_string(),
		})
	);
	assert!(errors.is_empty());
}

#[test]
fn unterminated_middle_block_names_its_begin_tag() {
	let (_, outcome) = check_indentation("{% for x in y %}\n{% else %}\n{%     set y = 1 %}\n");

	assert_eq!(
		outcome,
		Err(StructureError::MissingClosingTag {
			line: 1,
			tag: "for".to_string(),
		})
	);
}

#[test]
fn partial_results_survive_a_missing_end_tag() {
	let (errors, outcome) = check_indentation("{% if x %}\n{%  set y = 1 %}\n");

	assert!(matches!(
		outcome,
		Err(StructureError::MissingClosingTag { .. })
	));
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].message, "Bad Indentation, expected 5, got 2");
}

#[rstest]
#[case::elif_in_for(
	"{% for x in y %}\n{%     elif x %}\n{% endfor %}\n",
	StructureError::UnsupportedTag { line: 2, tag: "elif".to_string() }
)]
#[case::else_in_macro(
	"{% macro m() %}\n{% else %}\n{% endmacro %}\n",
	StructureError::UnsupportedTag { line: 2, tag: "else".to_string() }
)]
#[case::else_without_block(
	"{% else %}\n",
	StructureError::TagOutOfOrder { line: 1, tag: "else".to_string() }
)]
#[case::empty_statement("{% %}\n", StructureError::EmptyStatement { line: 1 })]
fn structural_errors(#[case] input: &str, #[case] expected: StructureError) {
	let (_, outcome) = check_indentation(input);
	assert_eq!(outcome, Err(expected));
}

#[test]
fn unsupported_tag_is_reported_as_an_issue() {
	let (errors, _) = check_indentation("{% for x in y %}\n{%     elif x %}\n{% endfor %}\n");

	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].line, 2);
	assert_eq!(errors[0].message, "Unsupported tag 'elif' found");
}

#[test]
fn whitespace_control_block_at_top_level() {
	let input = "{%- if x %}\n{%-     set y = 1 %}\n{%- endif %}\n";
	let statements = extract_statements(input, true);
	let mut checker = IndentationChecker::new(&statements);
	checker.run().unwrap();

	assert!(checker.errors().is_empty());
	let body = checker.tree().find("set").unwrap();
	assert_eq!(body.expected_indent, 4);
	assert_eq!(body.block_start_indent, 1);
	assert_eq!(checker.tree().find("if").map(|node| node.block_start_indent), Some(1));
}

#[test]
fn plain_end_tag_under_whitespace_control_block() {
	let input = "{%- if x %}\n{%-     set y = 1 %}\n{% endif %}\n";

	assert_eq!(
		indentation_messages(input),
		vec![(3, "Bad Indentation, expected 2, got 1".to_string())]
	);
}

#[test]
fn whitespace_control_inside_plain_block() {
	let input = "\
{% if a %}
{%-     for x in y %}
{%-         set z = x %}
{%-     endfor %}
{% endif %}
";

	assert_eq!(
		indentation_messages(input),
		vec![
			(3, "Bad Indentation, expected 8, got 9".to_string()),
			(4, "Bad Indentation, expected 4, got 5".to_string()),
			(2, "Bad Indentation, expected 4, got 5".to_string()),
		]
	);
}

#[test]
fn whitespace_control_inside_plain_block_clean() {
	let input = "\
{% if a %}
{%-    for x in y %}
{%-        set z = x %}
{%-    endfor %}
{% endif %}
";

	assert!(indentation_messages(input).is_empty());
}

#[test]
fn plain_block_inside_whitespace_control_block() {
	let input = "\
{%- if a %}
{%      for x in y %}
{%          set z = x %}
{%      endfor %}
{%- endif %}
";

	assert!(indentation_messages(input).is_empty());
}

#[test]
fn indentation_rule_is_repeatable() {
	let input = "{% if x %}\n{%   set y = 1 %}\n{% for z in y %}\n{% endif %}\n";

	let first = IndentationRule.check_text("a.j2", input);
	let second = IndentationRule.check_text("a.j2", input);
	assert_eq!(first, second);
	assert!(!first.is_empty());
}

#[test]
fn deep_nesting_is_reported_instead_of_overflowing() {
	let depth = 5000;
	let input = format!("{}{}", "{% if x %}\n".repeat(depth), "{% endif %}\n".repeat(depth));

	let (errors, outcome) = check_indentation(&input);
	let line = MAX_NESTING_DEPTH + 1;
	assert_eq!(
		outcome,
		Err(StructureError::NestingTooDeep {
			line,
			limit: MAX_NESTING_DEPTH,
		})
	);

	let issues = IndentationRule.check_text("deep.j2", &input);
	assert_eq!(issues.len(), errors.len());
	let last = issues.last().map(|issue| (issue.line_number, issue.message.as_str()));
	assert_eq!(
		last,
		Some((line, "Line 257 - blocks nested deeper than 256 levels"))
	);
}

#[test]
fn nesting_up_to_the_limit_is_walked() {
	let input = format!(
		"{}{}",
		"{% if x %}\n".repeat(MAX_NESTING_DEPTH),
		"{% endif %}\n".repeat(MAX_NESTING_DEPTH)
	);

	let (_, outcome) = check_indentation(&input);
	assert_eq!(outcome, Ok(()));
}

#[test]
fn broken_file_does_not_leak_into_the_next() {
	let broken = IndentationRule.check_text("broken.j2", "{% if x %}\n{% for y in x %}\n");
	assert!(broken.is_empty());

	let clean = IndentationRule.check_text("clean.j2", "{% if x %}\n{%     set y = 1 %}\n{% endif %}\n");
	assert!(clean.is_empty());
}

#[rstest]
#[case::spaced("{{ name }}", None)]
#[case::filter("{{ name | upper }}", None)]
#[case::negative_number("{{ -1 }}", None)]
#[case::no_spaces("{{name}}", Some(()))]
#[case::extra_space("{{  name }}", Some(()))]
#[case::trailing_extra_space("{{ name  }}", Some(()))]
fn variable_spacing(#[case] line: &str, #[case] expected: Option<()>) {
	assert_eq!(VariableSpacingRule.check_line(line).map(|_| ()), expected);
}

#[rstest]
#[case::spaced_filter("{{ value | to_json }}", None)]
#[case::spaced_plus("{{ a + b }}", None)]
#[case::quoted_operator("{{ 'a|b' }}", None)]
#[case::no_operator("{{ value }}", None)]
#[case::tight_filter(
	"{{ value|to_json }}",
	Some("The operator | needs to be enclosed by a single space on each side")
)]
#[case::tight_comparison(
	"{% if a==b %}",
	Some("The operator == needs to be enclosed by a single space on each side")
)]
#[case::two_operators(
	"{{ a+b|x }}",
	Some("The operators |, + need to be enclosed by a single space on each side")
)]
fn operator_spacing(#[case] line: &str, #[case] expected: Option<&str>) {
	assert_eq!(OperatorSpacingRule.check_line(line).as_deref(), expected);
}

#[rstest]
#[case::spaced("{% if x %}", false)]
#[case::trimmed("{%- if x -%}", false)]
#[case::missing_open_space("{%if x %}", true)]
#[case::missing_close_space("{% if x%}", true)]
#[case::missing_trim_space("{%-if x %}", true)]
fn statement_spacing(#[case] line: &str, #[case] expected: bool) {
	assert_eq!(StatementSpacingRule.check_line(line).is_some(), expected);
}

#[rstest]
#[case::spaces("    {% if x %}", false)]
#[case::tab("\t{% if x %}", true)]
fn no_tabs(#[case] line: &str, #[case] expected: bool) {
	assert_eq!(NoTabsRule.check_line(line).is_some(), expected);
}

#[rstest]
#[case::plain("{% if x %}", false)]
#[case::trim_start("{%- if x %}", true)]
#[case::preserve_start("{%+ if x %}", true)]
#[case::trim_end("{% if x -%}", true)]
fn statement_delimiter(#[case] line: &str, #[case] expected: bool) {
	assert_eq!(StatementDelimiterRule.check_line(line).is_some(), expected);
}

#[rstest]
#[case::one("{% if x %}", false)]
#[case::two("{% if x %}{% endif %}", true)]
#[case::none("plain text", false)]
fn single_statement(#[case] line: &str, #[case] expected: bool) {
	assert_eq!(SingleStatementRule.check_line(line).is_some(), expected);
}

#[rstest]
#[case::lower("{{ my_var }}", false)]
#[case::camel("{{ myVar }}", true)]
#[case::boolean("{{ x | default(False) }}", false)]
#[case::quoted("{{ 'Hello' }}", false)]
#[case::outside_braces("Hello {{ name }}", false)]
fn variable_case(#[case] line: &str, #[case] expected: bool) {
	assert_eq!(VariableCaseRule.check_line(line).is_some(), expected);
}

#[rstest]
#[case::underscore("{{ my_var }}", false)]
#[case::hyphen("{{ my-var }}", true)]
#[case::quoted("{{ 'a-b' }}", false)]
#[case::subscript("{{ a[0]-b }}", true)]
#[case::spaced_minus("{{ a - b }}", false)]
fn variable_format(#[case] line: &str, #[case] expected: bool) {
	assert_eq!(VariableFormatRule.check_line(line).is_some(), expected);
}

#[test]
fn line_rules_skip_hash_lines() {
	let issues = VariableCaseRule.check_text("t.j2", "  # {{ myVar }}\n{{ myVar }}\n");

	assert_eq!(issues.len(), 1);
	assert_eq!(issues[0].line_number, 2);
	assert_eq!(issues[0].line, "{{ myVar }}");
	assert_eq!(issues[0].message, VariableCaseRule.description());
}

#[test]
fn syntax_rule_reports_compile_errors() {
	assert!(SyntaxErrorRule.check_text("ok.j2", "{% if x %}y{% endif %}\n").is_empty());

	let issues = SyntaxErrorRule.check_text("bad.j2", "{% if x %}\ny\n");
	assert_eq!(issues.len(), 1);
	assert_eq!(issues[0].rule.id, "S0");
	assert!(!issues[0].message.is_empty());
}

#[test]
fn issue_formats() {
	let issue = LintIssue::new(
		IndentationRule.info(),
		"t.j2",
		2,
		"{%   set y = 1 %}",
		"Bad Indentation, expected 5, got 3",
	);

	insta::assert_snapshot!(issue.to_string(), @"t.j2:2 Bad Indentation, expected 5, got 3 (jinja-statements-indentation)");
	assert_eq!(
		issue.verbose(),
		"Linting rule: S3\nRule description: All J2 statements must be indented by 4 more spaces \
		 within jinja delimiter. To close a control, end tag must have same indentation \
		 level.\nError line: t.j2:2 {%   set y = 1 %}\nError message: Bad Indentation, expected \
		 5, got 3\n"
	);
	assert_eq!(
		issue.to_json(),
		serde_json::json!({
			"id": "S3",
			"message": "Bad Indentation, expected 5, got 3",
			"filename": "t.j2",
			"line_number": 2,
			"line": "{%   set y = 1 %}",
			"severity": "HIGH",
		})
	);
}

#[test]
fn builtin_collection_lists_every_rule() {
	let collection = RuleCollection::builtin();
	let ids: Vec<&str> = collection.infos().iter().map(|info| info.id).collect();

	assert_eq!(
		ids,
		vec!["S0", "S1", "S2", "S3", "S4", "S5", "S6", "S7", "V1", "V2"]
	);
	assert!(
		collection
			.to_string()
			.starts_with("Origin: BUILT-IN\nS0 Jinja syntax should be correct (jinja-syntax-error)\n")
	);

	let json = collection.to_json();
	assert_eq!(json.as_array().map(Vec::len), Some(10));
	assert_eq!(json[3]["short_description"], "jinja-statements-indentation");
	assert_eq!(json[3]["severity"], "HIGH");
}

#[test]
fn collection_sorts_issues() {
	let report = lint("{%if x%}\n{% endif %}\n");

	assert_eq!(issue_ids(&report.errors), vec![("S3", 1), ("S4", 1)]);
	assert!(report.warnings.is_empty());
}

#[test]
fn collection_ignores_rules() -> J2LintResult<()> {
	let collection = RuleCollection::builtin().ignore(["S1"])?;
	let report = Runner::new(&collection).lint_text("t.j2", "{{x}}\n");

	assert!(report.is_clean());
	assert_eq!(issue_ids(&lint("{{x}}\n").errors), vec![("S1", 1)]);

	Ok(())
}

#[test]
fn collection_downgrades_warned_rules() -> J2LintResult<()> {
	let collection = RuleCollection::builtin().warn(["single-space-decorator"])?;
	let report = Runner::new(&collection).lint_text("t.j2", "{{x}}\n");

	assert!(report.errors.is_empty());
	assert_eq!(issue_ids(&report.warnings), vec![("S1", 1)]);

	Ok(())
}

#[test]
fn collection_rejects_unknown_rules() {
	let result = RuleCollection::builtin().ignore(["S9"]);
	assert!(matches!(result, Err(J2LintError::UnknownRule(name)) if name == "S9"));
}

#[test]
fn collection_accepts_deprecated_alias() -> J2LintResult<()> {
	let collection = RuleCollection::builtin().ignore(["jinja-statements-delimeter"])?;
	let report = Runner::new(&collection).lint_text("t.j2", "{%- set x = 1 %}\n");

	assert!(report.errors.is_empty());

	Ok(())
}

#[rstest]
#[case::by_id("{# j2lint: disable=S1 #}\n{{x}}\n")]
#[case::by_name("{# j2lint:disable = single-space-decorator #}\n{{x}}\n")]
fn disable_directive_skips_rule(#[case] input: &str) {
	assert!(lint(input).errors.is_empty());
	assert!(is_rule_disabled(input, &VariableSpacingRule));
	assert!(!is_rule_disabled(input, &IndentationRule));
}

#[test]
fn runner_normalizes_line_endings() {
	let report = lint("{% if x %}\r\n{%   set y = 1 %}\r\n{% endif %}\r\n");

	assert_eq!(issue_ids(&report.errors), vec![("S3", 2)]);
	assert_eq!(report.errors[0].line, "{%   set y = 1 %}");
}

#[test]
#[traced_test]
fn runner_warns_on_unreadable_file() {
	let collection = RuleCollection::builtin();
	let report = Runner::new(&collection).lint_file(&PathBuf::from("/definitely/missing.j2"));

	assert!(report.is_clean());
	assert!(logs_contain("Could not open /definitely/missing.j2"));
}

#[test]
#[traced_test]
fn runner_skips_large_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("big.j2");
	std::fs::write(&path, "{%if x%}\n{% endif %}\n")?;

	let collection = RuleCollection::builtin();
	let report = Runner::new(&collection).with_max_file_size(4).lint_file(&path);
	assert!(report.is_clean());
	assert!(logs_contain("Skipping"));

	let report = Runner::new(&collection).lint_file(&path);
	assert_eq!(report.errors.len(), 2);

	Ok(())
}

#[test]
fn runner_aggregates_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let bad = tmp.path().join("bad.j2");
	let good = tmp.path().join("good.j2");
	std::fs::write(&bad, "{{x}}\n")?;
	std::fs::write(&good, "{{ x }}\n")?;

	let collection = RuleCollection::builtin().warn(["V1"])?;
	let report = Runner::new(&collection).lint_files(&[bad, good]);

	assert_eq!(report.files.len(), 2);
	assert_eq!(report.error_count(), 1);
	assert_eq!(report.warning_count(), 0);
	assert!(report.has_errors());
	assert_eq!(report.errors().map(|issue| issue.rule.id).collect::<Vec<_>>(), vec!["S1"]);

	Ok(())
}

#[test]
fn config_parses_all_fields() -> J2LintResult<()> {
	let config = J2LintConfig::parse(
		r#"
ignore = ["S1"]
warn = ["jinja-statements-indentation"]
extensions = ["j2", "tmpl"]
max_file_size = 2048

[exclude]
patterns = ["vendor/"]

[include]
patterns = ["**/*.txt"]
"#,
	)?;

	assert_eq!(config.ignore, vec!["S1"]);
	assert_eq!(config.warn, vec!["jinja-statements-indentation"]);
	assert_eq!(config.extensions, vec!["j2", "tmpl"]);
	assert_eq!(config.max_file_size, 2048);
	assert_eq!(config.exclude.patterns, vec!["vendor/"]);
	assert_eq!(config.include.patterns, vec!["**/*.txt"]);

	Ok(())
}

#[test]
fn config_defaults() -> J2LintResult<()> {
	let config = J2LintConfig::parse("")?;

	assert_eq!(config, J2LintConfig::default());
	assert_eq!(config.extensions, vec!["j2", "jinja", "jinja2"]);
	assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);

	Ok(())
}

#[test]
fn config_rejects_invalid_toml() {
	let result = J2LintConfig::parse("ignore = [");
	assert!(matches!(result, Err(J2LintError::ConfigParse(_))));
}

#[test]
fn config_is_discovered_in_candidate_order() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	assert_eq!(J2LintConfig::load(tmp.path())?, None);

	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(tmp.path().join(".config/j2lint.toml"), "ignore = [\"S5\"]\n")?;
	let config = J2LintConfig::load(tmp.path())?.unwrap_or_default();
	assert_eq!(config.ignore, vec!["S5"]);

	std::fs::write(tmp.path().join("j2lint.toml"), "ignore = [\"S6\"]\n")?;
	assert_eq!(
		J2LintConfig::resolve_path(tmp.path()),
		Some(tmp.path().join("j2lint.toml"))
	);
	let config = J2LintConfig::load(tmp.path())?.unwrap_or_default();
	assert_eq!(config.ignore, vec!["S6"]);

	Ok(())
}

#[test]
fn collect_files_walks_directories() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path();
	for dir in ["sub", ".github", ".git", "node_modules", "vendor"] {
		std::fs::create_dir_all(root.join(dir))?;
	}
	for file in [
		"a.j2",
		"b.jinja2",
		"c.txt",
		"sub/d.J2",
		".github/e.j2",
		".git/h.j2",
		"node_modules/f.j2",
		"vendor/g.j2",
	] {
		std::fs::write(root.join(file), "{{ x }}\n")?;
	}

	let config = J2LintConfig::parse("[exclude]\npatterns = [\"vendor/\"]\n")?;
	let options = DiscoveryOptions::from_config(&config);
	let files = collect_files(&[root.to_path_buf()], &options)?;
	assert_eq!(
		files,
		vec![
			root.join(".github/e.j2"),
			root.join("a.j2"),
			root.join("b.jinja2"),
			root.join("sub/d.J2"),
		]
	);

	let config = J2LintConfig::parse("[include]\npatterns = [\"*.txt\"]\n")?;
	let options = DiscoveryOptions::from_config(&config);
	let files = collect_files(&[root.to_path_buf()], &options)?;
	assert_eq!(files.len(), 6);
	assert!(files.contains(&root.join("c.txt")));
	assert!(files.contains(&root.join("vendor/g.j2")));

	Ok(())
}

#[test]
fn collect_files_keeps_named_templates_once() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let template = tmp.path().join("one.jinja");
	let other = tmp.path().join("notes.md");
	std::fs::write(&template, "{{ x }}\n")?;
	std::fs::write(&other, "# notes\n")?;

	let files = collect_files(
		&[template.clone(), other, template.clone()],
		&DiscoveryOptions::default(),
	)?;
	assert_eq!(files, vec![template]);

	Ok(())
}

#[test]
fn collect_files_rejects_invalid_patterns() {
	let config = J2LintConfig {
		include: config::IncludeConfig {
			patterns: vec!["[".to_string()],
		},
		..J2LintConfig::default()
	};
	let options = DiscoveryOptions::from_config(&config);
	let result = collect_files(&[std::env::temp_dir()], &options);

	assert!(matches!(
		result,
		Err(J2LintError::InvalidPattern { kind: "include", .. })
	));
}

#[cfg(unix)]
#[test]
fn collect_files_follows_sibling_links_to_one_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let templates = tmp.path().join("templates");
	let shared = tmp.path().join("shared");
	std::fs::create_dir_all(&templates)?;
	std::fs::create_dir_all(&shared)?;
	std::fs::write(templates.join("bad.j2"), "{{x}}\n")?;
	std::fs::write(shared.join("common.j2"), "{{ x }}\n")?;
	std::os::unix::fs::symlink(&shared, templates.join("one"))?;
	std::os::unix::fs::symlink(&shared, templates.join("two"))?;

	let files = collect_files(&[templates.clone()], &DiscoveryOptions::default())?;
	assert_eq!(
		files,
		vec![
			templates.join("bad.j2"),
			templates.join("one/common.j2"),
			templates.join("two/common.j2"),
		]
	);

	Ok(())
}

#[cfg(unix)]
#[test]
fn collect_files_rejects_links_to_an_ancestor() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let templates = tmp.path().join("templates");
	std::fs::create_dir_all(templates.join("nested"))?;
	std::fs::write(templates.join("a.j2"), "{{ x }}\n")?;
	std::os::unix::fs::symlink(&templates, templates.join("nested/loop"))?;

	let result = collect_files(&[templates], &DiscoveryOptions::default());
	assert!(matches!(result, Err(J2LintError::SymlinkCycle { .. })));

	Ok(())
}
