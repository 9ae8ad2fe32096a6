/// The evaluator module resolves scopes and computes the program result.
///
/// The evaluator walks the program's instructions in live scope frames,
/// registers and validates functions, unrolls loops and lowers value
/// expressions into operations. Its output is the final operation tree.
///
/// # Responsibilities
/// - Binds variables and resolves them along the scope chain.
/// - Calls functions by signature or alias and rejects recursion.
/// - Reports semantic errors such as unknown names or zero-step loops.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens:
/// numbers (including lowered string and character literals), operators,
/// identifiers, aliases, keywords and punctuation. It also splices `include`d
/// files into the stream. This is the first stage of interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with source locations.
/// - Resolves includes against the main file's directory and the standard
///   library directory.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// The parser module builds the program tree from tokens.
///
/// The parser processes the token stream produced by the lexer and constructs
/// instructions and value expressions, inserting operators by precedence as
/// it reads them.
///
/// # Responsibilities
/// - Converts tokens into instructions and expressions.
/// - Validates the grammar, reporting errors with location info.
pub mod parser;
/// Tokens and source locations.
pub mod token;
/// The value module defines the runtime data types for evaluation.
///
/// Numbers are exact integers or reals; operations are eagerly evaluated
/// binary nodes that remember how their result was obtained.
///
/// # Responsibilities
/// - Defines `Number`, `Operation` and the `Value` that holds either.
/// - Implements the four-function operator set with integer normalization.
pub mod value;
