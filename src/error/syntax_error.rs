use thiserror::Error;

use crate::interpreter::token::Location;

/// Every way a token stream can fail to form a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// An opening `(` or `{` with no matching closer.
    #[error("The enclosing element for this one is missing")]
    MissingClosing,
    #[error("Expected some value after this `{0}`")]
    ExpectedValue(String),
    #[error("A value is required after this `{after}`, found this instead `{found}`")]
    ValueRequired {
        /// The token that wanted a value.
        after: String,
        /// What was there instead.
        found: String,
    },
    #[error("What is this `{0}` doing here? Expected an operator or a binary alias")]
    UnexpectedInExpression(String),
    /// A `,`, `;` or `:` in a place that does not accept it.
    #[error("`{0}` can't be here")]
    MisplacedTerminator(String),
    #[error("This `{0}` cannot start a new instruction")]
    CannotStartInstruction(String),
    #[error("Expected something after this identifier")]
    DanglingIdentifier,
    #[error("Was not expecting this `{0}` after an identifier")]
    UnexpectedAfterIdentifier(String),
    #[error("Expected a variable's name after the `ext` keyword")]
    ExpectedExtName,
    #[error("Expected an `=` after this variable `{0}` to assign a value to it")]
    ExpectedAssign(String),
    #[error("There should be an identifier naming the function right after the `def` keyword")]
    ExpectedFunctionName,
    #[error("There should be an open parenthesis right after the function's name to define its parameters")]
    ExpectedParameterList,
    #[error("Expected a parameter's name, not this")]
    ExpectedParameter,
    #[error("Expected a parameter's name to start with, not a comma")]
    LeadingComma,
    #[error("Two consecutive commas. A parameter is missing")]
    ConsecutiveCommas,
    #[error("Two consecutive parameters. A comma is missing")]
    MissingComma,
    #[error("There is an extra comma before this closing parenthesis, remove it")]
    TrailingComma,
    #[error("Expected an open curly bracket `{{` to start the body of this {0}")]
    ExpectedBody(&'static str),
    #[error("This function definition is preceded by the alias `{alias}` yet it has {found} parameter(s) instead of {expected}")]
    AliasArity {
        alias:    String,
        expected: usize,
        found:    usize,
    },
    #[error("A function definition was expected after this alias. Outside a value expression aliases can only precede a function definition")]
    AliasWithoutDefinition,
    #[error("Expected an open parenthesis `(` after the `for` keyword to define the loop parameters")]
    ExpectedLoopParameters,
    #[error("Must specify at least the end index of this for loop")]
    MissingLoopEnd,
    #[error("You have {0} too many `:` in this for loop")]
    TooManyLoopParameters(usize),
    #[error("There should be a single identifier naming the variable of this for loop, first thing after the open parenthesis")]
    InvalidLoopVariable,
    /// A token stream handed to the parser without its beginning- and
    /// end-of-content sentinels.
    #[error("A program must start at the beginning of content and stop at its end")]
    Unframed,
}

/// A syntax error and the token it points at.
#[derive(Debug, Clone, Error)]
#[error("SYNTAX ERROR: {kind}\n{}\n{location}", .location.point_out())]
pub struct SyntaxError {
    pub kind:     SyntaxErrorKind,
    pub location: Location,
}
