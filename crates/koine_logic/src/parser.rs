//! Parser for the grammar language.
//!
//! The parser converts a stream of tokens into [`Term`]s using a fixed
//! operator table. Each clause or goal is read into a [`ReadTerm`] that
//! records the names of its variables.
//!
//! # Operators
//!
//! | Priority | Type | Operators |
//! |----------|------|-----------|
//! | 1200 | xfx | `:-` `-->` |
//! | 1200 | fx  | `:-` `?-` |
//! | 1150 | fx  | `dynamic` `discontiguous` |
//! | 1100 | xfy | `;` `\|` |
//! | 1050 | xfy | `->` |
//! | 1000 | xfy | `,` |
//! | 900  | fy  | `\+` |
//! | 700  | xfx | `=` `\=` `==` `\==` `is` `<` `>` `=<` `>=` `=:=` `=\=` |
//! | 500  | yfx | `+` `-` |
//! | 400  | yfx | `*` `/` `//` `mod` `rem` |
//! | 200  | fy  | `-` |

use crate::error::SyntaxError;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::term::Term;
use crate::token::{Token, TokenKind};

/// Highest operator priority.
const MAX_PRIORITY: u32 = 1200;
/// Priority of a term used as an argument or list element.
const ARG_PRIORITY: u32 = 999;

/// A term as read from source, with its variable names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadTerm {
    /// The term. Variables are numbered from 0.
    pub term: Term,
    /// Named variables in order of first appearance. `_` is never named.
    pub var_names: Vec<(String, usize)>,
    /// Number of distinct variables, named or anonymous.
    pub var_count: usize,
    /// Location of the first token of the term.
    pub span: Span,
}

/// Parser for grammar source code.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Variables of the term being read.
    var_names: Vec<(String, usize)>,
    var_count: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            var_names: Vec::new(),
            var_count: 0,
        }
    }

    /// Reads the next `.`-terminated clause, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the clause is malformed.
    pub fn read_clause(&mut self) -> Result<Option<ReadTerm>, SyntaxError> {
        if self.current.kind.is_eof() {
            return Ok(None);
        }
        let read = self.read_term()?;
        self.expect(&TokenKind::End, "`.` at end of clause")?;
        Ok(Some(read))
    }

    /// Reads every clause in the source.
    ///
    /// # Errors
    ///
    /// Returns the first [`SyntaxError`] encountered.
    pub fn read_all(&mut self) -> Result<Vec<ReadTerm>, SyntaxError> {
        let mut clauses = Vec::new();
        while let Some(clause) = self.read_clause()? {
            clauses.push(clause);
        }
        Ok(clauses)
    }

    /// Reads a single goal. The terminating `.` is optional.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the goal is malformed or followed by
    /// anything else.
    pub fn read_goal(&mut self) -> Result<ReadTerm, SyntaxError> {
        if self.current.kind.is_eof() {
            return Err(self.error("empty goal"));
        }
        let read = self.read_term()?;
        if self.current.kind == TokenKind::End {
            self.advance();
        }
        if !self.current.kind.is_eof() {
            return Err(self.unexpected());
        }
        Ok(read)
    }

    fn read_term(&mut self) -> Result<ReadTerm, SyntaxError> {
        self.var_names.clear();
        self.var_count = 0;
        let span = self.current.span;
        let (term, _) = self.parse(MAX_PRIORITY)?;
        Ok(ReadTerm {
            term,
            var_names: std::mem::take(&mut self.var_names),
            var_count: self.var_count,
            span,
        })
    }

    /// Parses a term whose priority is at most `max`. Returns the term and
    /// its priority.
    fn parse(&mut self, max: u32) -> Result<(Term, u32), SyntaxError> {
        let (mut left, mut left_priority) = self.parse_primary(max)?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Comma => ",".to_string(),
                TokenKind::Bar => ";".to_string(),
                TokenKind::Name(name) if infix_op(name).is_some() => name.clone(),
                _ => break,
            };
            let Some((priority, left_max, right_max)) = infix_op(&op) else {
                break;
            };
            if priority > max || left_priority > left_max {
                break;
            }
            self.advance();
            let (right, _) = self.parse(right_max)?;
            left = Term::compound(&op, vec![left, right]);
            left_priority = priority;
        }

        Ok((left, left_priority))
    }

    fn parse_primary(&mut self, max: u32) -> Result<(Term, u32), SyntaxError> {
        let token = self.current.clone();
        match token.kind {
            TokenKind::Int(n) => {
                self.advance();
                Ok((Term::Int(n), 0))
            }
            TokenKind::Var(name) => {
                self.advance();
                Ok((self.variable(&name), 0))
            }
            TokenKind::Str(text) => {
                self.advance();
                Ok((Term::atom(&text), 0))
            }
            TokenKind::LParen => {
                self.advance();
                let (term, _) = self.parse(MAX_PRIORITY)?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok((term, 0))
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_curly(),
            TokenKind::Name(name) => self.parse_name(&name, max, true),
            TokenKind::QuotedName(name) => self.parse_name(&name, max, false),
            TokenKind::Error(message) => Err(SyntaxError::at(token.span, message)),
            TokenKind::Eof => Err(self.error("unexpected end of input")),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_name(&mut self, name: &str, max: u32, unquoted: bool) -> Result<(Term, u32), SyntaxError> {
        self.advance();

        if self.current.kind == TokenKind::LParen && !self.current.layout_before {
            self.advance();
            let args = self.parse_arguments()?;
            return Ok((Term::compound(name, args), 0));
        }

        if unquoted && name == "-" && !self.current.layout_before {
            if let TokenKind::Int(n) = self.current.kind {
                self.advance();
                return Ok((Term::Int(-n), 0));
            }
        }

        if unquoted {
            if let Some((priority, arg_max)) = prefix_op(name) {
                if priority <= max && self.current.starts_term() && !self.is_infix_here() {
                    let (arg, _) = self.parse(arg_max)?;
                    return Ok((Term::compound(name, vec![arg]), priority));
                }
            }
        }

        Ok((Term::atom(name), 0))
    }

    /// True if the current token is an infix operator that cannot also
    /// start an operand, so a preceding prefix operator is just an atom.
    fn is_infix_here(&self) -> bool {
        match &self.current.kind {
            TokenKind::Name(name) => {
                infix_op(name).is_some() && prefix_op(name).is_none() && !self.next_opens_args()
            }
            _ => false,
        }
    }

    fn next_opens_args(&self) -> bool {
        let next = self.lexer.clone().next_token();
        next.kind == TokenKind::LParen && !next.layout_before
    }

    fn parse_arguments(&mut self) -> Result<Vec<Term>, SyntaxError> {
        let mut args = Vec::new();
        loop {
            let (arg, _) = self.parse(ARG_PRIORITY)?;
            args.push(arg);
            match self.current.kind {
                TokenKind::Comma => self.advance(),
                TokenKind::RParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return Err(self.expected("`,` or `)` in arguments")),
            }
        }
    }

    fn parse_list(&mut self) -> Result<(Term, u32), SyntaxError> {
        self.advance();
        if self.current.kind == TokenKind::RBracket {
            self.advance();
            return Ok((Term::nil(), 0));
        }

        let mut items = Vec::new();
        loop {
            let (item, _) = self.parse(ARG_PRIORITY)?;
            items.push(item);
            match self.current.kind {
                TokenKind::Comma => self.advance(),
                TokenKind::Bar => {
                    self.advance();
                    let (tail, _) = self.parse(ARG_PRIORITY)?;
                    self.expect(&TokenKind::RBracket, "`]` after list tail")?;
                    return Ok((Term::list(items, tail), 0));
                }
                TokenKind::RBracket => {
                    self.advance();
                    return Ok((Term::list(items, Term::nil()), 0));
                }
                _ => return Err(self.expected("`,`, `|` or `]` in list")),
            }
        }
    }

    fn parse_curly(&mut self) -> Result<(Term, u32), SyntaxError> {
        self.advance();
        if self.current.kind == TokenKind::RBrace {
            self.advance();
            return Ok((Term::atom("{}"), 0));
        }
        let (inner, _) = self.parse(MAX_PRIORITY)?;
        self.expect(&TokenKind::RBrace, "`}`")?;
        Ok((Term::compound("{}", vec![inner]), 0))
    }

    fn variable(&mut self, name: &str) -> Term {
        if name != "_" {
            if let Some((_, id)) = self.var_names.iter().find(|(n, _)| n == name) {
                return Term::Var(*id);
            }
        }
        let id = self.var_count;
        self.var_count += 1;
        if name != "_" {
            self.var_names.push((name.to_string(), id));
        }
        Term::Var(id)
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), SyntaxError> {
        if &self.current.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    fn error(&self, message: &str) -> SyntaxError {
        SyntaxError::at(self.current.span, message)
    }

    fn expected(&self, what: &str) -> SyntaxError {
        match &self.current.kind {
            TokenKind::Error(message) => self.error(message),
            kind => self.error(&format!("expected {what}, found {}", describe(kind))),
        }
    }

    fn unexpected(&self) -> SyntaxError {
        match &self.current.kind {
            TokenKind::Error(message) => self.error(message),
            kind => self.error(&format!("unexpected {}", describe(kind))),
        }
    }
}

/// Parses every clause of a program.
///
/// # Errors
///
/// Returns the first [`SyntaxError`] encountered.
pub fn parse_program(source: &str) -> Result<Vec<ReadTerm>, SyntaxError> {
    Parser::new(source).read_all()
}

/// Parses a goal such as `sentence(['ὁ', 'λόγος'])`.
///
/// # Errors
///
/// Returns a [`SyntaxError`] if the text is not exactly one term.
pub fn parse_goal(source: &str) -> Result<ReadTerm, SyntaxError> {
    Parser::new(source).read_goal()
}

/// Priority and argument ceiling of a prefix operator.
fn prefix_op(name: &str) -> Option<(u32, u32)> {
    match name {
        ":-" | "?-" => Some((1200, 1199)),
        "dynamic" | "discontiguous" => Some((1150, 1149)),
        "\\+" => Some((900, 900)),
        "-" => Some((200, 200)),
        _ => None,
    }
}

/// Priority and left and right argument ceilings of an infix operator.
fn infix_op(name: &str) -> Option<(u32, u32, u32)> {
    let xfx = |p: u32| Some((p, p - 1, p - 1));
    let xfy = |p: u32| Some((p, p - 1, p));
    let yfx = |p: u32| Some((p, p, p - 1));
    match name {
        ":-" | "-->" => xfx(1200),
        ";" => xfy(1100),
        "->" => xfy(1050),
        "," => xfy(1000),
        "=" | "\\=" | "==" | "\\==" | "is" | "<" | ">" | "=<" | ">=" | "=:=" | "=\\=" => xfx(700),
        "+" | "-" => yfx(500),
        "*" | "/" | "//" | "mod" | "rem" => yfx(400),
        _ => None,
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::LParen => "`(`".to_string(),
        TokenKind::RParen => "`)`".to_string(),
        TokenKind::LBracket => "`[`".to_string(),
        TokenKind::RBracket => "`]`".to_string(),
        TokenKind::LBrace => "`{`".to_string(),
        TokenKind::RBrace => "`}`".to_string(),
        TokenKind::Comma => "`,`".to_string(),
        TokenKind::Bar => "`|`".to_string(),
        TokenKind::End => "end of clause".to_string(),
        TokenKind::Name(n) => format!("atom `{n}`"),
        TokenKind::QuotedName(n) => format!("atom '{n}'"),
        TokenKind::Var(n) => format!("variable `{n}`"),
        TokenKind::Int(n) => format!("integer {n}"),
        TokenKind::Str(s) => format!("string \"{s}\""),
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Error(m) => m.clone(),
    }
}
