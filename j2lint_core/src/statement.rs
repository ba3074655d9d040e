use std::fmt;

use serde::Serialize;

/// Opening delimiter of a `{% ... %}` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StartDelimiter {
	/// `{%`
	Plain,
	/// `{%-`
	Trim,
	/// `{%+`
	Preserve,
}

impl StartDelimiter {
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"{%" => Some(Self::Plain),
			"{%-" => Some(Self::Trim),
			"{%+" => Some(Self::Preserve),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plain => "{%",
			Self::Trim => "{%-",
			Self::Preserve => "{%+",
		}
	}

	/// `{%-` and `{%+` change how the renderer treats the whitespace in front
	/// of the statement, which shifts the expected column by one.
	pub fn is_whitespace_control(self) -> bool {
		matches!(self, Self::Trim | Self::Preserve)
	}
}

impl fmt::Display for StartDelimiter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Closing delimiter of a `{% ... %}` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EndDelimiter {
	/// `%}`
	Plain,
	/// `-%}`
	Trim,
}

impl EndDelimiter {
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"%}" => Some(Self::Plain),
			"-%}" => Some(Self::Trim),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plain => "%}",
			Self::Trim => "-%}",
		}
	}

	pub fn is_whitespace_control(self) -> bool {
		matches!(self, Self::Trim)
	}
}

impl fmt::Display for EndDelimiter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single `{% ... %}` statement pulled out of a template.
///
/// `text` is everything between the delimiters, so `{%- if x %}` has the text
/// `" if x "`. The derived fields are computed once on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
	pub text: String,
	/// 1-based line where the statement content starts.
	pub start_line: usize,
	/// 1-based line where the statement content ends.
	pub end_line: usize,
	pub start_delimiter: StartDelimiter,
	pub end_delimiter: EndDelimiter,
	/// Number of leading space characters in `text`. Tabs are not counted.
	pub leading_whitespace: usize,
	pub words: Vec<String>,
}

impl Statement {
	pub fn new(
		text: impl Into<String>,
		start_line: usize,
		end_line: usize,
		start_delimiter: StartDelimiter,
		end_delimiter: EndDelimiter,
	) -> Self {
		let text = text.into();
		let leading_whitespace = text.chars().take_while(|c| *c == ' ').count();
		let words = text.split_whitespace().map(ToString::to_string).collect();

		Self {
			text,
			start_line,
			end_line,
			start_delimiter,
			end_delimiter,
			leading_whitespace,
			words,
		}
	}

	/// The statement keyword, e.g. `if` or `endfor`. `None` for a blank
	/// statement such as `{% %}`.
	pub fn tag(&self) -> Option<&str> {
		self.words.first().map(String::as_str)
	}

	/// The statement with its original delimiters re-attached.
	pub fn delimited(&self) -> String {
		format!("{}{}{}", self.start_delimiter, self.text, self.end_delimiter)
	}
}

impl fmt::Display for Statement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.delimited())
	}
}
