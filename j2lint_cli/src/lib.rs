use std::path::PathBuf;

use clap::Parser;

/// File the `--log` flag appends to.
pub const LOG_FILE: &str = "jinja2-linter.log";

#[derive(Parser)]
#[command(
	name = "j2lint",
	author,
	about = "Lint Jinja2 templates for indentation, spacing, and naming conventions.",
	long_about = "j2lint checks Jinja2 templates against a set of style rules.\n\nStatements \
	              nested inside `for`, `if` and `macro` blocks must be indented four columns \
	              deeper than the block, inside the `{%` delimiter. Further rules check the \
	              spacing around variables, operators and delimiters, tabs, one statement per \
	              line and variable naming.\n\nRun `j2lint --list` to see every rule."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct J2LintCli {
	/// Files or directories to lint.
	#[arg(value_name = "FILE")]
	pub files: Vec<PathBuf>,

	/// List the lint rules.
	#[arg(long, short, default_value_t = false)]
	pub list: bool,

	/// Print lint issues (or the rule list) as JSON.
	#[arg(long, short, default_value_t = false)]
	pub json: bool,

	/// Verbose output for lint issues.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Enable debug logs.
	#[arg(long, short, default_value_t = false)]
	pub debug: bool,

	/// Append logs to `jinja2-linter.log`.
	#[arg(long, default_value_t = false)]
	pub log: bool,

	/// Stream logs to the terminal.
	#[arg(long, short = 'o', default_value_t = false)]
	pub stdout: bool,

	/// Lint a template read from standard input.
	#[arg(long, short, default_value_t = false)]
	pub stdin: bool,

	/// Rules to ignore, by id or short description. Use `--` after this
	/// option to enter FILES.
	#[arg(long, short, value_name = "RULE", num_args = 0..)]
	pub ignore: Vec<String>,

	/// Rules to report as warnings, by id or short description. Use `--`
	/// after this option to enter FILES.
	#[arg(long, short, value_name = "RULE", num_args = 0..)]
	pub warn: Vec<String>,

	/// Directory to load `j2lint.toml` from. Defaults to the current
	/// directory.
	#[arg(long, short = 'c', value_name = "DIR")]
	pub path: Option<PathBuf>,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,

	/// Print the version of j2lint.
	#[arg(long, default_value_t = false)]
	pub version: bool,
}
