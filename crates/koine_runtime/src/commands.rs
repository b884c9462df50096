//! REPL command parsing.
//!
//! A command is one line: a verb followed by whitespace-separated
//! arguments. Double quotes group an argument containing spaces.
//!
//! ```text
//! add noun λόγος "word, reason" genS=λόγου datS=λόγῳ
//! block λόγου
//! move 2 0
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use koine_foundation::{Word, WordId, WordType};
use koine_stdlib::paradigm;
use koine_storage::Grade;
use thiserror::Error;

/// A command the REPL could not understand.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The verb is not a command.
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    /// Wrong arguments; carries the usage line.
    #[error("usage: {0}")]
    Usage(&'static str),
    /// An argument had the wrong form.
    #[error("{0}")]
    Invalid(String),
}

/// What `review` should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewAction {
    /// Start a pass over every word.
    StartAll,
    /// Start a pass over the words due today.
    StartDue,
    /// Show the current card.
    Show,
    /// Turn the current card over.
    Flip,
    /// Move to the next card.
    Next,
    /// Move to the previous card.
    Previous,
}

/// A parsed REPL command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Register a word.
    Add(Word),
    /// List registered words.
    Words,
    /// Delete a word.
    Remove(WordId),
    /// List forms starting with a prefix.
    Suggest(String),
    /// Append a form to the sentence.
    Block(String),
    /// Remove the block at a position.
    Unblock(usize),
    /// Move a block.
    Move {
        /// Current position.
        from: usize,
        /// Position of the block to land before (or the length, for the end).
        to: usize,
    },
    /// Empty the sentence.
    Clear,
    /// Validate the sentence now.
    Check,
    /// Show every type the grammar knows for a surface.
    Types(String),
    /// Flashcard review.
    Review(ReviewAction),
    /// Grade the current card.
    Grade(Grade),
    /// Save the store.
    Save(Option<PathBuf>),
    /// Load the store.
    Load(Option<PathBuf>),
    /// Show help.
    Help,
    /// Leave the REPL.
    Quit,
}

/// Command verbs, for completion.
pub const VERBS: &[&str] = &[
    "add", "words", "remove", "suggest", "block", "unblock", "move", "clear", "check", "types",
    "review", "grade", "save", "load", "help", "quit",
];

/// One-line usage for every command.
pub const HELP: &str = "\
add <type> <lemma> <translation> [key=form ...]   register a word
words                                             list registered words
remove <lemma> <translation>                      delete a word
suggest [prefix]                                  list matching forms
block <form>                                      append a form to the sentence
unblock <position>                                remove a block
move <from> <to>                                  move a block before position <to>
clear                                             empty the sentence
check                                             validate the sentence now
types <form>                                      show the grammar's types for a form
review [all|due|flip|next|prev]                   flashcard review
grade easy|hard                                   grade the current card
save [path]                                       save words and progress
load [path]                                       load words and progress
help                                              show this help
quit                                              leave";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let args = split_args(line)?;
        let Some((verb, rest)) = args.split_first() else {
            return Err(CommandError::Usage("<command> [arguments...]"));
        };
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

        match (verb.as_str(), rest.as_slice()) {
            ("add", [word_type, lemma, translation, forms @ ..]) => {
                parse_word(word_type, lemma, translation, forms).map(Self::Add)
            }
            ("add", _) => Err(CommandError::Usage("add <type> <lemma> <translation> [key=form ...]")),
            ("words", []) => Ok(Self::Words),
            ("remove", [lemma, translation]) => Ok(Self::Remove(WordId::new(*lemma, *translation))),
            ("remove", _) => Err(CommandError::Usage("remove <lemma> <translation>")),
            ("suggest", []) => Ok(Self::Suggest(String::new())),
            ("suggest", [prefix]) => Ok(Self::Suggest((*prefix).to_string())),
            ("block", [surface]) => Ok(Self::Block((*surface).to_string())),
            ("block", _) => Err(CommandError::Usage("block <form>")),
            ("unblock", [position]) => Ok(Self::Unblock(number(position)?)),
            ("unblock", _) => Err(CommandError::Usage("unblock <position>")),
            ("move", [from, to]) => Ok(Self::Move {
                from: number(from)?,
                to: number(to)?,
            }),
            ("move", _) => Err(CommandError::Usage("move <from> <to>")),
            ("clear", []) => Ok(Self::Clear),
            ("check", []) => Ok(Self::Check),
            ("types", [surface]) => Ok(Self::Types((*surface).to_string())),
            ("types", _) => Err(CommandError::Usage("types <form>")),
            ("review", []) => Ok(Self::Review(ReviewAction::Show)),
            ("review", [action]) => review_action(action).map(Self::Review),
            ("grade", [grade]) => parse_grade(grade).map(Self::Grade),
            ("grade", _) => Err(CommandError::Usage("grade easy|hard")),
            ("save", []) => Ok(Self::Save(None)),
            ("save", [path]) => Ok(Self::Save(Some(PathBuf::from(path)))),
            ("load", []) => Ok(Self::Load(None)),
            ("load", [path]) => Ok(Self::Load(Some(PathBuf::from(path)))),
            ("help", _) => Ok(Self::Help),
            ("quit" | "exit", []) => Ok(Self::Quit),
            (verb, _) if VERBS.contains(&verb) => Err(CommandError::Invalid(format!(
                "too many arguments for '{verb}' (try 'help')"
            ))),
            (verb, _) => Err(CommandError::Unknown(verb.to_string())),
        }
    }
}

fn parse_word(
    word_type: &str,
    lemma: &str,
    translation: &str,
    forms: &[&str],
) -> Result<Word, CommandError> {
    let word_type =
        WordType::from_str(word_type).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let paradigm = paradigm(word_type);
    let mut word = Word::new(lemma, translation, word_type);
    for entry in forms {
        let Some((key, form)) = entry.split_once('=') else {
            return Err(CommandError::Invalid(format!(
                "expected key=form, got '{entry}'"
            )));
        };
        let Some(slot) = paradigm.by_key(key) else {
            let keys: Vec<&str> = paradigm.slots.iter().map(|s| s.key).collect();
            return Err(CommandError::Invalid(if keys.is_empty() {
                format!("{word_type} takes no inflections")
            } else {
                format!("unknown {word_type} inflection '{key}' (expected one of {})", keys.join(", "))
            }));
        };
        word = word.with_inflection(form, slot.label);
    }
    Ok(word)
}

fn review_action(action: &str) -> Result<ReviewAction, CommandError> {
    match action {
        "all" => Ok(ReviewAction::StartAll),
        "due" => Ok(ReviewAction::StartDue),
        "flip" => Ok(ReviewAction::Flip),
        "next" => Ok(ReviewAction::Next),
        "prev" | "previous" => Ok(ReviewAction::Previous),
        _ => Err(CommandError::Usage("review [all|due|flip|next|prev]")),
    }
}

fn parse_grade(grade: &str) -> Result<Grade, CommandError> {
    match grade.to_lowercase().as_str() {
        "easy" => Ok(Grade::Easy),
        "hard" => Ok(Grade::Hard),
        _ => Err(CommandError::Usage("grade easy|hard")),
    }
}

fn number(arg: &str) -> Result<usize, CommandError> {
    arg.parse()
        .map_err(|_| CommandError::Invalid(format!("expected a position, got '{arg}'")))
}

/// Splits a line into arguments, honouring double quotes.
///
/// # Errors
///
/// Returns `Invalid` for an unterminated quote.
pub fn split_args(line: &str) -> Result<Vec<String>, CommandError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_arg = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if quoted {
        return Err(CommandError::Invalid("unterminated quote".to_string()));
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}
