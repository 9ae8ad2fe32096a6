use std::{fmt, mem, rc::Rc};

use crate::interpreter::{token::Token, value::operation::Operator};

/// A value expression.
///
/// Every variant produces a value when lowered. Tokens are kept whole so the
/// evaluator can point at them when something goes wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A numeric literal token.
    Number(Token),
    /// A variable reference.
    Identifier(Token),
    /// A binary operation built by precedence insertion.
    BinaryOp {
        /// The operator token, for diagnostics.
        operator: Token,
        /// The operator itself.
        op:       Operator,
        /// Left operand.
        left:     Box<Self>,
        /// Right operand.
        right:    Box<Self>,
    },
    /// A parenthesised group. Precedence insertion never sinks into it.
    Paren(Box<Self>),
    /// A call by name or through an alias.
    Call(FunctionCall),
    /// `{ body }` used as a value.
    AnonymousFunction(Block),
}

impl Expr {
    /// The token that best identifies this expression in an error message.
    #[must_use]
    pub fn token(&self) -> &Token {
        let mut expr = self;
        loop {
            match expr {
                Self::Number(token) | Self::Identifier(token) => return token,
                Self::BinaryOp { operator, .. } => return operator,
                Self::Paren(inner) => expr = inner,
                Self::Call(call) => return call.callee.token(),
                Self::AnonymousFunction(block) => return &block.starter,
            }
        }
    }

    /// Whether the expression is made only of numeric literals, operators
    /// and parentheses, and can therefore be computed before any scope
    /// exists.
    ///
    /// # Example
    /// ```
    /// use std::path::{Path, PathBuf};
    ///
    /// use malang::{
    ///     ast::Instruction,
    ///     interpreter::{lexer::tokenize_source, parser::core::parse_program},
    /// };
    ///
    /// let tokens = tokenize_source(PathBuf::from("a.mlg"),
    ///                              "a = (1 + 2) * 3\nb = a + 1".into(),
    ///                              Path::new("std_libs")).unwrap();
    /// let root = parse_program(&tokens).unwrap();
    /// let constant: Vec<bool> = root.content
    ///                               .iter()
    ///                               .map(|i| match i {
    ///                                   Instruction::Assign { value, .. } => value.is_constant(),
    ///                                   _ => false,
    ///                               })
    ///                               .collect();
    /// assert_eq!(constant, [true, false]);
    /// ```
    #[must_use]
    pub fn is_constant(&self) -> bool {
        let mut pending = vec![self];
        while let Some(expr) = pending.pop() {
            match expr {
                Self::Number(_) => {},
                Self::BinaryOp { left, right, .. } => {
                    pending.push(left);
                    pending.push(right);
                },
                Self::Paren(inner) => pending.push(inner),
                Self::Identifier(_) | Self::Call(_) | Self::AnonymousFunction(_) => return false,
            }
        }
        true
    }

    const fn is_leaf(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Identifier(_))
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        let mut teardown = Teardown::default();
        teardown.detach_children(self);
        teardown.run();
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(token) | Self::Identifier(token) => write!(f, "{token}"),
            Self::BinaryOp { op, left, right, .. } => write!(f, "{left}{}{right}", op.padded()),
            Self::Paren(inner) => write!(f, "({inner})"),
            Self::Call(call) => write!(f, "{call}"),
            Self::AnonymousFunction(block) => write!(f, "{block}"),
        }
    }
}

/// How a call names its function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// `name(args)`
    Name(Token),
    /// `$alias value` or `value @alias value`
    Alias(Token),
}

impl Callee {
    #[must_use]
    pub const fn token(&self) -> &Token {
        match self {
            Self::Name(token) | Self::Alias(token) => token,
        }
    }
}

/// A function call with its unevaluated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub callee:    Callee,
    pub arguments: Vec<Expr>,
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.callee, self.arguments.as_slice()) {
            (Callee::Alias(alias), [argument]) => write!(f, "{alias} {argument}"),
            (Callee::Alias(alias), [first, second]) => write!(f, "{first} {alias} {second}"),
            (callee, arguments) => {
                write!(f, "{}(", callee.token())?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(")")
            },
        }
    }
}

/// A braced body and the `{` that opened it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The opening brace; the scope's return variable is synthesized from it.
    pub starter: Token,
    pub body:    Vec<Instruction>,
}

impl Drop for Block {
    fn drop(&mut self) {
        let mut teardown = Teardown::default();
        teardown.instructions.append(&mut self.body);
        teardown.run();
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ {} instruction(s) }}", self.body.len())
    }
}

/// A user-defined function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    /// The name of the function.
    pub name:   Token,
    /// The unary or binary alias preceding `def`, if any.
    pub alias:  Option<Token>,
    /// Parameter names, bound positionally.
    pub params: Vec<Token>,
    pub body:   Vec<Instruction>,
}

impl FunctionDef {
    /// Whether both definitions could answer the same call: same name and
    /// parameter count, or the same alias.
    #[must_use]
    pub fn collides_with(&self, other: &Self) -> bool {
        let same_signature = self.name == other.name && self.params.len() == other.params.len();
        let same_alias = self.alias.is_some() && self.alias == other.alias;
        same_signature || same_alias
    }
}

/// A `for` loop, unrolled before or during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForLoop {
    /// The `for` keyword.
    pub keyword: Token,
    /// The loop variable, present with three or four parameters.
    pub var:     Option<Token>,
    pub begin:   Expr,
    pub end:     Expr,
    pub step:    Expr,
    /// The `{` opening the body.
    pub starter: Token,
    pub body:    Vec<Instruction>,
}

impl ForLoop {
    /// Whether the bounds and step are all constant expressions.
    #[must_use]
    pub fn has_constant_bounds(&self) -> bool {
        self.begin.is_constant() && self.end.is_constant() && self.step.is_constant()
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `name = value`, or `ext name = value` to rebind in an enclosing scope.
    Assign {
        /// Set for `ext` assignments.
        ext:   bool,
        /// The variable being bound.
        var:   Token,
        /// The value expression.
        value: Expr,
    },
    /// `def name(params) { body }`, optionally preceded by an alias.
    FunctionDef(Rc<FunctionDef>),
    /// A call whose result is discarded.
    Call(FunctionCall),
    /// A block evaluated for its side effects on enclosing scopes.
    AnonymousFunction(Block),
    /// `ret` or `ret value`.
    Return {
        /// The `ret` keyword.
        keyword: Token,
        /// The returned value; the scope's `res` when absent.
        value:   Option<Expr>,
    },
    /// `for(...) { body }`
    ForLoop(Box<ForLoop>),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign { ext, var, value } => {
                if *ext {
                    f.write_str("ext ")?;
                }
                write!(f, "{var} = {value}")
            },
            Self::FunctionDef(def) => {
                if let Some(alias) = &def.alias {
                    write!(f, "{alias} ")?;
                }
                write!(f, "def {}(", def.name)?;
                for (index, param) in def.params.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") {{ {} instruction(s) }}", def.body.len())
            },
            Self::Call(call) => write!(f, "{call}"),
            Self::AnonymousFunction(block) => write!(f, "{block}"),
            Self::Return { value: Some(value), .. } => write!(f, "ret {value}"),
            Self::Return { value: None, .. } => f.write_str("ret"),
            Self::ForLoop(for_loop) => {
                f.write_str("for(")?;
                if let Some(var) = &for_loop.var {
                    write!(f, "{var}: ")?;
                }
                write!(f,
                       "{} : {} : {}) {{ {} instruction(s) }}",
                       for_loop.begin,
                       for_loop.end,
                       for_loop.step,
                       for_loop.body.len())
            },
        }
    }
}

/// The whole program: the main file's content between its sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    /// Beginning-of-content sentinel; the main scope's return variable is
    /// synthesized from it.
    pub boc:     Token,
    pub content: Vec<Instruction>,
    /// End-of-content sentinel.
    pub eoc:     Token,
}

/// Work lists that take a tree apart one node at a time.
///
/// Long operator chains and deeply nested bodies would overflow the stack
/// with the default recursive drop. Every node reached here has its children
/// moved out before it is dropped, so its own `Drop` finds nothing left.
#[derive(Default)]
struct Teardown {
    exprs:        Vec<Expr>,
    instructions: Vec<Instruction>,
}

impl Teardown {
    fn run(mut self) {
        loop {
            if let Some(instruction) = self.instructions.pop() {
                self.split(instruction);
            } else if let Some(mut expr) = self.exprs.pop() {
                self.detach_children(&mut expr);
            } else {
                break;
            }
        }
    }

    /// Moves the sub-expressions and nested body of `expr` onto the work
    /// lists, leaving leaves in their place.
    fn detach_children(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Number(_) | Expr::Identifier(_) => {},
            Expr::BinaryOp { operator, left, right, .. } => {
                for child in [left, right] {
                    if !child.is_leaf() {
                        self.exprs.push(mem::replace(&mut **child, Expr::Identifier(operator.clone())));
                    }
                }
            },
            Expr::Paren(inner) => {
                if !inner.is_leaf() {
                    let placeholder = Expr::Identifier(inner.token().clone());
                    self.exprs.push(mem::replace(&mut **inner, placeholder));
                }
            },
            Expr::Call(call) => self.exprs.append(&mut call.arguments),
            Expr::AnonymousFunction(block) => self.instructions.append(&mut block.body),
        }
    }

    fn split(&mut self, instruction: Instruction) {
        match instruction {
            Instruction::Assign { value, .. } | Instruction::Return { value: Some(value), .. } => {
                self.exprs.push(value);
            },
            Instruction::Return { value: None, .. } => {},
            Instruction::FunctionDef(def) => {
                // Shared definitions are left to their last owner.
                if let Ok(def) = Rc::try_unwrap(def) {
                    self.instructions.extend(def.body);
                }
            },
            Instruction::Call(mut call) => self.exprs.append(&mut call.arguments),
            Instruction::AnonymousFunction(mut block) => self.instructions.append(&mut block.body),
            Instruction::ForLoop(for_loop) => {
                let ForLoop { begin, end, step, body, .. } = *for_loop;
                self.exprs.extend([begin, end, step]);
                self.instructions.extend(body);
            },
        }
    }
}
