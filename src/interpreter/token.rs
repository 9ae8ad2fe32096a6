use std::{
    fmt,
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::interpreter::value::{number::Number, operation::Operator};

/// The text of one source file, shared by every token lexed from it.
pub struct SourceFile {
    path: PathBuf,
    text: String,
}

impl SourceFile {
    #[must_use]
    pub const fn new(path: PathBuf, text: String) -> Self {
        Self { path, text }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the 1-based `line` without its terminator, or an empty string
    /// past the end of the file.
    #[must_use]
    pub fn line(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|index| self.text.lines().nth(index))
            .unwrap_or("")
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile").field("path", &self.path).finish_non_exhaustive()
    }
}

/// Where a token lives: file, 1-based line and column, and its width in
/// characters.
#[derive(Debug, Clone)]
pub struct Location {
    pub file:   Rc<SourceFile>,
    pub line:   usize,
    pub column: usize,
    pub span:   usize,
}

impl Location {
    /// A location in no file, for errors about a token stream that has no
    /// token to point at.
    #[must_use]
    pub fn nowhere() -> Self {
        Self { file:   Rc::new(SourceFile::new(PathBuf::new(), String::new())),
               line:   0,
               column: 0,
               span:   0, }
    }

    /// Renders the source line with the located text wrapped in `>>>` and
    /// `<<<`.
    ///
    /// # Example
    /// ```
    /// use std::{path::PathBuf, rc::Rc};
    ///
    /// use malang::interpreter::token::{Location, SourceFile};
    ///
    /// let file = Rc::new(SourceFile::new(PathBuf::from("a.mlg"), "x = y + 1".into()));
    /// let location = Location { file, line: 1, column: 5, span: 1 };
    /// assert_eq!(location.point_out(), "x = >>>y<<< + 1");
    /// ```
    #[must_use]
    pub fn point_out(&self) -> String {
        let line = self.file.line(self.line);
        let start = self.column.saturating_sub(1);
        let before: String = line.chars().take(start).collect();
        let marked: String = line.chars().skip(start).take(self.span).collect();
        let after: String = line.chars().skip(start + self.span).collect();

        format!("{before}>>>{marked}<<<{after}")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "File `{}`, line: {}, column: {}",
               self.file.path.display(),
               self.line,
               self.column)
    }
}

/// Every token kind of the language, together with its lexeme when the kind
/// does not fix it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Any numeric literal, including lowered string and char literals.
    Number(Number),
    /// One of `+ - * / // ^`.
    Operator(Operator),
    /// A variable or function name.
    Identifier(Rc<str>),
    /// `$name`
    UnaryAlias(Rc<str>),
    /// `@name`
    BinaryAlias(Rc<str>),
    /// `def`
    Def,
    /// `ext`
    Ext,
    /// `ret`
    Ret,
    /// `for`
    For,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `=`
    Assign,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// End of a source line.
    Eol,
    /// Beginning of the main file's content.
    Boc,
    /// End of the main file's content.
    Eoc,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Operator(op) => write!(f, "{op}"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::UnaryAlias(name) => write!(f, "${name}"),
            Self::BinaryAlias(name) => write!(f, "@{name}"),
            Self::Def => f.write_str("def"),
            Self::Ext => f.write_str("ext"),
            Self::Ret => f.write_str("ret"),
            Self::For => f.write_str("for"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::LBrace => f.write_str("{"),
            Self::RBrace => f.write_str("}"),
            Self::Assign => f.write_str("="),
            Self::Comma => f.write_str(","),
            Self::Semicolon => f.write_str(";"),
            Self::Colon => f.write_str(":"),
            Self::Eol => f.write_str("end of line"),
            Self::Boc => f.write_str("beginning of content"),
            Self::Eoc => f.write_str("end of content"),
        }
    }
}

/// A lexed token.
///
/// Two tokens are equal, and hash alike, when their kinds (and lexemes) are
/// equal; the location is ignored. This is what lets an identifier token
/// from one place in the program find a binding created by another.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind:        TokenKind,
    pub location:    Location,
    /// Set on tokens created by the compiler rather than read from source.
    pub synthesized: bool,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, location: Location) -> Self {
        Self { kind,
               location,
               synthesized: false }
    }

    /// Creates a compiler-generated token placed at `origin`.
    #[must_use]
    pub fn synthesize(kind: TokenKind, origin: &Self) -> Self {
        Self { kind,
               location: Location { span: 0,
                                    ..origin.location.clone() },
               synthesized: true }
    }

    #[must_use]
    pub fn synthesize_number(value: Number, origin: &Self) -> Self {
        Self::synthesize(TokenKind::Number(value), origin)
    }

    #[must_use]
    pub fn synthesize_identifier(name: &str, origin: &Self) -> Self {
        Self::synthesize(TokenKind::Identifier(Rc::from(name)), origin)
    }

    /// Returns the identifier name, if this is an identifier.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Whether the token has the same kind as `kind`, ignoring lexemes.
    #[must_use]
    pub fn is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(kind)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
