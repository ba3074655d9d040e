//! The built-in rule set.

pub use indentation::*;
pub use spacing::*;
pub use statements::*;
pub use syntax::*;
pub use variables::*;

mod indentation;
mod spacing;
mod statements;
mod syntax;
mod variables;

use crate::Rule;

/// Every rule shipped with j2lint, in id order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
	vec![
		Box::new(SyntaxErrorRule),
		Box::new(VariableSpacingRule),
		Box::new(OperatorSpacingRule),
		Box::new(IndentationRule),
		Box::new(StatementSpacingRule),
		Box::new(NoTabsRule),
		Box::new(StatementDelimiterRule),
		Box::new(SingleStatementRule),
		Box::new(VariableCaseRule),
		Box::new(VariableFormatRule),
	]
}
