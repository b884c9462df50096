//! Token types for the grammar language.
//!
//! Tokens are the output of the lexer and input to the parser.

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
    /// True if whitespace or a comment came directly before this token.
    ///
    /// `foo(` opens an argument list only when the parenthesis touches the
    /// name.
    pub layout_before: bool,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span, layout_before: bool) -> Self {
        Self {
            kind,
            span,
            layout_before,
        }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    /// Returns true if this token can begin a term.
    #[must_use]
    pub const fn starts_term(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Name(_)
                | TokenKind::QuotedName(_)
                | TokenKind::Var(_)
                | TokenKind::Int(_)
                | TokenKind::Str(_)
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
        )
    }
}

/// Token types for the grammar language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `|`
    Bar,
    /// `.` followed by layout or end of input
    End,

    // Atoms and literals
    /// Unquoted atom: `noun`, `λόγος`, `:-`, `!`, `;`
    Name(String),
    /// Quoted atom: `'Hello'`
    QuotedName(String),
    /// Variable: `X`, `_Rest`, `_`
    Var(String),
    /// Non-negative integer literal
    Int(i64),
    /// Double-quoted text, read as an atom
    Str(String),

    // Special
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns the atom text for name-like tokens.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(s) | Self::QuotedName(s) => Some(s),
            _ => None,
        }
    }
}
