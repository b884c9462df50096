//! Lexer for the grammar language.
//!
//! The lexer converts source text into a stream of tokens. Layout
//! (whitespace, `%` line comments, and `/* */` block comments) is skipped,
//! but each token remembers whether layout preceded it.

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer for grammar source code.
///
/// The lexer iterates through source text and produces tokens.
#[derive(Clone)]
pub struct Lexer<'src> {
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub const fn new(source: &'src str) -> Self {
        Self {
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let layout = self.skip_layout();
        let preceded_by_layout = matches!(layout, Ok(true));

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let kind = match layout {
            Err(message) => TokenKind::Error(message),
            Ok(_) => match self.peek_char() {
                None => TokenKind::Eof,
                Some(c) => self.scan(c),
            },
        };

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
            preceded_by_layout,
        )
    }

    /// Tokenizes all source and returns a vector of tokens ending in `Eof`.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn scan(&mut self, c: char) -> TokenKind {
        match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            '|' => self.single(TokenKind::Bar),
            '!' => self.single(TokenKind::Name("!".to_string())),
            ';' => self.single(TokenKind::Name(";".to_string())),
            '\'' => match self.scan_quoted('\'') {
                Ok(text) => TokenKind::QuotedName(text),
                Err(message) => TokenKind::Error(message),
            },
            '"' => match self.scan_quoted('"') {
                Ok(text) => TokenKind::Str(text),
                Err(message) => TokenKind::Error(message),
            },
            '.' if self
                .peek_char_n(1)
                .is_none_or(|next| next.is_whitespace() || next == '%') =>
            {
                self.single(TokenKind::End)
            }
            c if c.is_ascii_digit() => self.scan_number(),
            c if c == '_' || c.is_uppercase() => TokenKind::Var(self.scan_while(is_name_char)),
            c if is_name_start(c) => TokenKind::Name(self.scan_while(is_name_char)),
            c if is_symbol_char(c) => TokenKind::Name(self.scan_while(is_symbol_char)),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peeks at the character `n` places ahead.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Skips whitespace and comments. Returns whether anything was skipped.
    fn skip_layout(&mut self) -> Result<bool, String> {
        let mut skipped = false;
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => self.advance(),
                Some('%') => {
                    while self.peek_char().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_char_n(1) == Some('*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek_char() {
                            None => return Err("unterminated block comment".to_string()),
                            Some('*') if self.peek_char_n(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => return Ok(skipped),
            }
            skipped = true;
        }
    }

    fn scan_while(&mut self, accept: fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if !accept(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        text
    }

    /// Scans quoted text. A doubled quote stands for itself.
    fn scan_quoted(&mut self, quote: char) -> Result<String, String> {
        self.advance();
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => return Err("unterminated quoted text".to_string()),
                Some(c) if c == quote => {
                    self.advance();
                    if self.peek_char() == Some(quote) {
                        text.push(quote);
                        self.advance();
                    } else {
                        return Ok(text);
                    }
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some('\\') => text.push('\\'),
                        Some('\'') => text.push('\''),
                        Some('"') => text.push('"'),
                        Some('`') => text.push('`'),
                        Some('\n') => {}
                        Some(c) => return Err(format!("unknown escape sequence: \\{c}")),
                        None => return Err("unterminated quoted text".to_string()),
                    }
                    self.advance();
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let digits = self.scan_while(|c| c.is_ascii_digit());
        match digits.parse() {
            Ok(n) => TokenKind::Int(n),
            Err(_) => TokenKind::Error(format!("integer literal too large: {digits}")),
        }
    }
}

/// Returns true if `c` can start an unquoted atom.
///
/// Any lowercase or caseless letter qualifies, so Greek words are atoms.
fn is_name_start(c: char) -> bool {
    c.is_alphabetic() && !c.is_uppercase()
}

/// Returns true if `c` can continue an atom or variable name.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || is_combining_mark(c)
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}' | '\u{1DC0}'..='\u{1DFF}' | '\u{20D0}'..='\u{20FF}')
}

/// Returns true if `c` belongs to a symbolic atom such as `:-` or `=<`.
fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '\\' | '^' | '<' | '>' | '=' | '~' | ':' | '.' | '?' | '@' | '#'
            | '&' | '$'
    )
}
