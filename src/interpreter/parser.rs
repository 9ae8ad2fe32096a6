/// Parser entry point.
///
/// Defines the parser's result type and turns a framed token stream into the
/// program root.
pub mod core;

/// Singletons.
///
/// Parses the operands of value expressions: literals, identifiers, calls,
/// parenthesised groups, anonymous functions and unary alias applications.
pub mod unary;

/// Value expressions.
///
/// Chains singletons with operators and binary aliases, inserting each
/// operator by precedence as it is read.
pub mod binary;

/// Braced constructs.
///
/// Parses blocks, function definitions and `for` loops.
pub mod block;

/// Helpers shared by the parser: group matching, terminators and separated
/// lists.
pub mod utils;

/// Instructions.
///
/// Dispatches on the first token of each instruction and parses assignments,
/// `ext` assignments, discarded calls and returns.
pub mod statement;
