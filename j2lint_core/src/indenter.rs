//! Rebuilds the nesting of `{% ... %}` statements as a tree and checks the
//! indentation of every statement against the depth it sits at.
//!
//! Only three block families are understood:
//!
//! ```text
//! for   / else        / endfor
//! if    / elif, else  / endif
//! macro /             / endmacro
//! ```
//!
//! Every other statement (`set`, `include`, `call`, ...) is treated as a plain
//! leaf. The expected column of a statement is measured inside its delimiter:
//! `{% if x %}` has one leading space, a statement nested one level deeper is
//! expected to have five.

use std::ops::Index;
use std::ops::IndexMut;

use serde::Serialize;

use crate::StructureError;
use crate::statement::Statement;

/// Columns added per nesting level.
pub const INDENT_SHIFT: usize = 4;

/// Spaces expected between a plain `{%` and the statement keyword.
pub const DEFAULT_WHITESPACES: usize = 1;

/// Deepest block nesting the checker walks before giving up on a file.
pub const MAX_NESTING_DEPTH: usize = 256;

/// A begin / middle / end tag family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFamily {
	For,
	If,
	Macro,
}

impl TagFamily {
	pub const ALL: [Self; 3] = [Self::For, Self::If, Self::Macro];

	pub fn begin(self) -> &'static str {
		match self {
			Self::For => "for",
			Self::If => "if",
			Self::Macro => "macro",
		}
	}

	pub fn middles(self) -> &'static [&'static str] {
		match self {
			Self::For => &["else"],
			Self::If => &["elif", "else"],
			Self::Macro => &[],
		}
	}

	pub fn end(self) -> &'static str {
		match self {
			Self::For => "endfor",
			Self::If => "endif",
			Self::Macro => "endmacro",
		}
	}

	/// The family opened by `tag`, if `tag` is a begin tag.
	pub fn from_begin(tag: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|family| family.begin() == tag)
	}

	pub fn has_middle(self, tag: &str) -> bool {
		self.middles().contains(&tag)
	}
}

/// Role of a statement keyword in the block grammar.
///
/// `else` is a middle tag of both `for` and `if`. Which block it belongs to is
/// decided by the innermost open block, not by the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
	Begin(TagFamily),
	Middle,
	End,
	Plain,
}

impl TagKind {
	pub fn classify(tag: &str) -> Self {
		if let Some(family) = TagFamily::from_begin(tag) {
			return Self::Begin(family);
		}

		if TagFamily::ALL.iter().any(|family| family.end() == tag) {
			return Self::End;
		}

		if TagFamily::ALL.iter().any(|family| family.has_middle(tag)) {
			return Self::Middle;
		}

		Self::Plain
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	pub const ROOT: Self = Self(0);
}

/// One statement's place in the nesting structure.
#[derive(Debug, Clone, Default)]
pub struct Node {
	/// `None` only for the synthetic root.
	pub statement: Option<Statement>,
	pub tag: Option<String>,
	pub parent: Option<NodeId>,
	pub children: Vec<NodeId>,
	/// Index of the first statement covered by this node.
	pub node_start: usize,
	/// Index of the last statement covered by this node. For a begin tag this
	/// is the index of its matching end tag once the block is closed.
	pub node_end: usize,
	pub expected_indent: usize,
	/// Correction applied the last time this node's indentation was checked.
	pub block_start_indent: usize,
}

impl Node {
	fn new(statement: &Statement, index: usize, expected_indent: usize, parent: Option<NodeId>) -> Self {
		Self {
			tag: statement.tag().map(ToString::to_string),
			statement: Some(statement.clone()),
			parent,
			children: Vec::new(),
			node_start: index,
			node_end: index,
			expected_indent,
			block_start_indent: 0,
		}
	}

	pub fn tag(&self) -> Option<&str> {
		self.tag.as_deref()
	}
}

/// Arena holding every node of one file's statement tree.
#[derive(Debug, Clone)]
pub struct NodeTree {
	nodes: Vec<Node>,
}

impl Default for NodeTree {
	fn default() -> Self {
		Self {
			nodes: vec![Node::default()],
		}
	}
}

impl NodeTree {
	pub fn root(&self) -> &Node {
		&self[NodeId::ROOT]
	}

	pub fn get(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(id.0)
	}

	/// Number of nodes, the root included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.len() <= 1
	}

	pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
		self.get(id)
			.into_iter()
			.flat_map(move |node| node.children.iter().filter_map(move |child| self.get(*child)))
	}

	/// Every statement-bearing node in creation order.
	pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
		self.nodes
			.iter()
			.enumerate()
			.skip(1)
			.map(|(index, node)| (NodeId(index), node))
	}

	/// The first node whose tag is `tag`.
	pub fn find(&self, tag: &str) -> Option<&Node> {
		self.nodes().map(|(_, node)| node).find(|node| node.tag() == Some(tag))
	}

	fn insert(&mut self, node: Node) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(node);
		id
	}

	fn attach(&mut self, parent: NodeId, child: NodeId) {
		self[parent].children.push(child);
	}
}

impl Index<NodeId> for NodeTree {
	type Output = Node;

	fn index(&self, id: NodeId) -> &Self::Output {
		&self.nodes[id.0]
	}
}

impl IndexMut<NodeId> for NodeTree {
	fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
		&mut self.nodes[id.0]
	}
}

/// A statement whose indentation does not match its depth, or the statement
/// that broke the tag grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndentationError {
	/// 1-based line of the statement.
	pub line: usize,
	/// The statement with its delimiters.
	pub text: String,
	pub message: String,
}

/// How a recursive frame handed control back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
	/// The frame's block was closed by the end tag at the previous index.
	Closed(usize),
	/// The statement at this index belongs to an ancestor frame.
	Deferred(usize),
	/// The statement list ran out.
	Exhausted,
}

/// Builds the statement tree of a single file and collects indentation
/// errors along the way.
///
/// The stack of open blocks lives on the checker, so each file gets a fresh
/// one by constructing a new checker.
#[derive(Debug)]
pub struct IndentationChecker<'a> {
	statements: &'a [Statement],
	tree: NodeTree,
	open_blocks: Vec<NodeId>,
	errors: Vec<IndentationError>,
}

impl<'a> IndentationChecker<'a> {
	pub fn new(statements: &'a [Statement]) -> Self {
		Self {
			statements,
			tree: NodeTree::default(),
			open_blocks: Vec::new(),
			errors: Vec::new(),
		}
	}

	/// Walk every statement from the root.
	///
	/// On a structural error the walk stops; [`errors`](Self::errors) keeps
	/// everything found until then, including a diagnostic for the offending
	/// statement when the grammar was broken by a misplaced tag.
	pub fn run(&mut self) -> Result<(), StructureError> {
		self.check(NodeId::ROOT, 0, 0).map(|_| ())
	}

	pub fn errors(&self) -> &[IndentationError] {
		&self.errors
	}

	pub fn tree(&self) -> &NodeTree {
		&self.tree
	}

	pub fn into_parts(self) -> (NodeTree, Vec<IndentationError>) {
		(self.tree, self.errors)
	}

	fn check(&mut self, frame: NodeId, mut index: usize, indent_level: usize) -> Result<Flow, StructureError> {
		let statements = self.statements;

		while let Some(statement) = statements.get(index) {
			let Some(tag) = statement.tag() else {
				return Err(StructureError::EmptyStatement {
					line: statement.start_line,
				});
			};

			match TagKind::classify(tag) {
				TagKind::Begin(_) => {
					index = self.open_block(frame, statement, index, indent_level)?;
				}
				TagKind::End => return self.close_block(frame, statement, index),
				TagKind::Middle => {
					match self.continue_block(frame, statement, index)? {
						Some(next) => index = next,
						None => return Ok(Flow::Deferred(index)),
					}
				}
				TagKind::Plain => {
					let node = self
						.tree
						.insert(Node::new(statement, index, indent_level, Some(frame)));
					self.tree.attach(frame, node);
					self.check_indent_level(node);
					index += 1;
				}
			}
		}

		Ok(Flow::Exhausted)
	}

	fn open_block(
		&mut self,
		frame: NodeId,
		statement: &Statement,
		index: usize,
		indent_level: usize,
	) -> Result<usize, StructureError> {
		if self.open_blocks.len() >= MAX_NESTING_DEPTH {
			let error = StructureError::NestingTooDeep {
				line: statement.start_line,
				limit: MAX_NESTING_DEPTH,
			};
			return Err(self.record(statement, error));
		}

		let node = self
			.tree
			.insert(Node::new(statement, index, indent_level, Some(frame)));
		self.open_blocks.push(node);
		self.tree.attach(frame, node);

		let next = match self.check(node, index + 1, indent_level + INDENT_SHIFT)? {
			Flow::Closed(next) | Flow::Deferred(next) => next,
			Flow::Exhausted => return Err(self.missing_closing_tag(node)),
		};

		self.check_indent_level(node);
		Ok(next)
	}

	fn close_block(&mut self, frame: NodeId, statement: &Statement, index: usize) -> Result<Flow, StructureError> {
		let Some(top) = self.open_blocks.last().copied() else {
			return Err(self.tag_out_of_order(statement));
		};

		let closes_top = self.tree[top]
			.tag()
			.is_some_and(|open| statement.tag() == Some(format!("end{open}").as_str()));
		if !closes_top {
			return Err(self.tag_out_of_order(statement));
		}

		if top != frame {
			return Ok(Flow::Deferred(index));
		}

		let expected_indent = self.tree[top].expected_indent;
		let parent = self.tree[top].parent;
		self.tree[top].node_end = index;

		let node = self
			.tree
			.insert(Node::new(statement, index, expected_indent, parent));
		if let Some(parent) = parent {
			self.tree.attach(parent, node);
		}

		self.check_indent_level(node);
		self.open_blocks.pop();

		Ok(Flow::Closed(index + 1))
	}

	/// Handles `elif` / `else`. Returns `None` when the innermost open block
	/// belongs to an ancestor frame.
	fn continue_block(
		&mut self,
		frame: NodeId,
		statement: &Statement,
		index: usize,
	) -> Result<Option<usize>, StructureError> {
		let Some(top) = self.open_blocks.last().copied() else {
			return Err(self.tag_out_of_order(statement));
		};

		let accepts = self.tree[top]
			.tag()
			.and_then(TagFamily::from_begin)
			.zip(statement.tag())
			.is_some_and(|(family, tag)| family.has_middle(tag));
		if !accepts {
			let error = StructureError::UnsupportedTag {
				line: statement.start_line,
				tag: statement.tag().unwrap_or_default().to_string(),
			};
			return Err(self.record(statement, error));
		}

		if top != frame {
			return Ok(None);
		}

		let expected_indent = self.tree[top].expected_indent;
		let parent = self.tree[top].parent;

		let node = self
			.tree
			.insert(Node::new(statement, index, expected_indent, parent));
		if let Some(parent) = parent {
			self.tree.attach(parent, node);
		}

		let next = match self.check(node, index + 1, expected_indent + INDENT_SHIFT)? {
			Flow::Closed(next) | Flow::Deferred(next) => next,
			Flow::Exhausted => return Err(self.missing_closing_tag(top)),
		};

		self.check_indent_level(node);
		Ok(Some(next))
	}

	fn check_indent_level(&mut self, id: NodeId) {
		let outer_block_trims = self
			.open_blocks
			.first()
			.and_then(|outer| self.tree[*outer].statement.as_ref())
			.is_some_and(|outer| outer.start_delimiter.is_whitespace_control());

		let node = &mut self.tree[id];
		let Some(statement) = node.statement.as_ref() else {
			return;
		};

		let trims = statement.start_delimiter.is_whitespace_control();
		let block_start_indent = usize::from(outer_block_trims || (node.expected_indent == 0 && trims));
		node.block_start_indent = block_start_indent;

		let expected = if trims {
			node.expected_indent + block_start_indent
		} else {
			node.expected_indent + DEFAULT_WHITESPACES + block_start_indent
		};
		let actual = statement.leading_whitespace;

		if actual != expected {
			let error = IndentationError {
				line: statement.start_line,
				text: statement.delimited(),
				message: format!("Bad Indentation, expected {expected}, got {actual}"),
			};
			tracing::debug!(line = error.line, text = %error.text, "{}", error.message);
			self.errors.push(error);
		}
	}

	fn tag_out_of_order(&mut self, statement: &Statement) -> StructureError {
		let error = StructureError::TagOutOfOrder {
			line: statement.start_line,
			tag: statement.tag().unwrap_or_default().to_string(),
		};
		self.record(statement, error)
	}

	fn missing_closing_tag(&self, block: NodeId) -> StructureError {
		let node = &self.tree[block];
		StructureError::MissingClosingTag {
			line: node.statement.as_ref().map_or(0, |statement| statement.start_line),
			tag: node.tag().unwrap_or_default().to_string(),
		}
	}

	/// Keep a diagnostic for the statement that broke the grammar before the
	/// walk is abandoned.
	fn record(&mut self, statement: &Statement, error: StructureError) -> StructureError {
		self.errors.push(IndentationError {
			line: statement.start_line,
			text: statement.delimited(),
			message: error.to_string(),
		});
		error
	}
}
