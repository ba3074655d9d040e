use assert_cmd::Command;

pub fn j2lint_cmd() -> Command {
	let mut cmd = Command::cargo_bin("j2lint").unwrap_or_else(|e| panic!("binary not built: {e}"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}
