use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use clap::CommandFactory;
use clap::Parser;
use j2lint_cli::J2LintCli;
use j2lint_cli::LOG_FILE;
use j2lint_core::AnyResult;
use j2lint_core::DiscoveryOptions;
use j2lint_core::FileReport;
use j2lint_core::J2LintConfig;
use j2lint_core::J2LintError;
use j2lint_core::LintIssue;
use j2lint_core::LintReport;
use j2lint_core::RuleCollection;
use j2lint_core::Runner;
use j2lint_core::STDIN_LABEL;
use j2lint_core::collect_files;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,heading) => {
		if color_enabled() {
			format!("{}", $text.bold().red())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = J2LintCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	if let Err(e) = init_logging(&args) {
		eprintln!("{} could not start logging: {e}", colored!("error:", red));
	}
	tracing::debug!(
		files = ?args.files,
		ignore = ?args.ignore,
		warn = ?args.warn,
		json = args.json,
		verbose = args.verbose,
		"lint options selected"
	);

	match run(&args) {
		Ok(code) => process::exit(code),
		Err(e) => {
			// Try to render through miette for rich diagnostics with help text
			// and error codes.
			match e.downcast::<J2LintError>() {
				Ok(j2lint_err) => {
					let report: miette::Report = (*j2lint_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Logging stays off unless `--log` or `--stdout` asks for it.
fn init_logging(args: &J2LintCli) -> AnyResult<()> {
	if !args.log && !args.stdout {
		return Ok(());
	}

	let level = if args.debug { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	let file_layer = if args.log {
		let file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
		Some(
			tracing_subscriber::fmt::layer()
				.with_ansi(false)
				.with_writer(Mutex::new(file)),
		)
	} else {
		None
	};
	let stream_layer = args.stdout.then(|| {
		tracing_subscriber::fmt::layer()
			.with_ansi(color_enabled())
			.with_writer(std::io::stderr)
	});

	tracing_subscriber::registry()
		.with(filter)
		.with(file_layer)
		.with(stream_layer)
		.try_init()?;

	Ok(())
}

/// Run the linter and return the process exit code.
fn run(args: &J2LintCli) -> AnyResult<i32> {
	let root = resolve_root(args);
	let config = J2LintConfig::load(&root)?.unwrap_or_default();

	let collection = RuleCollection::builtin()
		.ignore(config.ignore.iter().chain(&args.ignore).cloned())?
		.warn(config.warn.iter().chain(&args.warn).cloned())?;

	if args.list {
		print_rules(&collection, args.json);
		return Ok(0);
	}

	if args.version {
		println!(
			"Jinja2-Linter Version {}",
			colored!(env!("CARGO_PKG_VERSION"), heading)
		);
		return Ok(0);
	}

	let stdin_text = if args.stdin && !std::io::stdin().is_terminal() {
		let mut text = String::new();
		std::io::stdin().read_to_string(&mut text)?;
		Some(text)
	} else {
		None
	};

	if args.files.is_empty() && stdin_text.is_none() {
		let mut command = J2LintCli::command();
		eprintln!("{}", command.render_help());
		return Ok(1);
	}

	let options = DiscoveryOptions::from_config(&config);
	let files = collect_files(&args.files, &options)?;
	let runner = Runner::new(&collection).with_max_file_size(config.max_file_size);

	let mut report = runner.lint_files(&files);
	if let Some(text) = stdin_text {
		report.files.push(runner.lint_text(STDIN_LABEL, &text));
	}

	if args.json {
		tracing::debug!("JSON output enabled");
		print_json_report(&report);
	} else {
		print_text_report(&report, args.verbose);
	}

	Ok(if report.has_errors() { 2 } else { 0 })
}

fn resolve_root(args: &J2LintCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn print_rules(collection: &RuleCollection, json: bool) {
	if json {
		println!("{:#}", collection.to_json());
	} else {
		println!("{}", colored!("Rules in the Collection", heading));
		print!("{collection}");
	}
}

fn print_json_report(report: &LintReport) {
	let errors: Vec<serde_json::Value> = report.errors().map(LintIssue::to_json).collect();
	let warnings: Vec<serde_json::Value> = report.warnings().map(LintIssue::to_json).collect();
	let output = serde_json::json!({
		"ERRORS": errors,
		"WARNINGS": warnings,
	});
	println!("{output:#}");
}

fn print_text_report(report: &LintReport, verbose: bool) {
	let error_count = report.error_count();
	let warning_count = report.warning_count();

	if error_count > 0 {
		print_issue_section("JINJA2 LINT ERRORS", &report.files, |file| &file.errors, verbose);
	}
	if warning_count > 0 {
		print_issue_section(
			"JINJA2 LINT WARNINGS",
			&report.files,
			|file| &file.warnings,
			verbose,
		);
	}

	if error_count == 0 && warning_count == 0 {
		if verbose {
			println!("{}", colored!("Linting complete. No problems found!", green));
		}
	} else {
		println!(
			"\nJinja2 linting finished with {error_count} error(s) and {warning_count} warning(s)"
		);
	}
}

/// One tree per file: the file label, then one branch per issue.
fn print_issue_section(
	title: &str,
	files: &[FileReport],
	issues: impl Fn(&FileReport) -> &Vec<LintIssue>,
	verbose: bool,
) {
	println!("{}", colored!(title, heading));

	for file in files {
		let issues = issues(file);
		if issues.is_empty() {
			continue;
		}

		println!("{}", file.file);
		for (index, issue) in issues.iter().enumerate() {
			let last = index + 1 == issues.len();
			let (branch, continuation) = if last {
				("└── ", "    ")
			} else {
				("├── ", "│   ")
			};
			let text = if verbose {
				issue.verbose()
			} else {
				issue.to_string()
			};

			for (line_index, line) in text.trim_end().lines().enumerate() {
				let prefix = if line_index == 0 { branch } else { continuation };
				println!("{prefix}{line}");
			}
		}
	}
}
