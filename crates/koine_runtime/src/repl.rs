//! The main REPL implementation.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use koine_engine::Verdict;
use koine_foundation::{Error, ErrorKind, Result, Word};
use koine_stdlib::paradigm;
use tokio::runtime::{Builder, Runtime};

use crate::commands::{Command, CommandError, HELP, ReviewAction};
use crate::config::RuntimeConfig;
use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::session::{CardView, Session};

/// What one command produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Text to show. May be empty.
    Text(String),
    /// Leave the REPL.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Words, grammar and sentence.
    session: Session,

    /// Drives the session's async operations on this thread.
    runtime: Runtime,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Whether word changes are written to the store file.
    autosave: bool,

    /// Primary prompt.
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor or the async runtime fails to
    /// initialize.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Self::with_editor(editor, config)
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the async runtime cannot be built.
    pub fn with_editor(editor: E, config: RuntimeConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| Error::new(ErrorKind::Internal(format!("async runtime: {e}"))))?;
        Ok(Self {
            editor,
            session: Session::new(config),
            runtime,
            show_banner: true,
            autosave: false,
            prompt: "κ> ".to_string(),
        })
    }

    /// Sets the session for this REPL.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Saves the store after every word or progress change.
    #[must_use]
    pub const fn with_autosave(mut self) -> Self {
        self.autosave = true;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Loads the configured grammar. Failure leaves the REPL usable
    /// without validation.
    ///
    /// # Errors
    ///
    /// Returns the load error.
    pub fn load_grammar(&mut self) -> Result<()> {
        self.runtime.block_on(self.session.load_grammar())
    }

    /// Loads the configured store file if it exists, returning the number
    /// of words loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load_store(&mut self) -> Result<usize> {
        if !self.session.config().store_path.exists() {
            return Ok(0);
        }
        let count = self.session.load(None)?;
        self.refresh_completions();
        Ok(count)
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }
        self.refresh_completions();

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => Self::print_error(&e),
            }
        }

        println!("\nχαῖρε!");
        Ok(())
    }

    /// Runs every line of `input` as a command, printing replies. Blank
    /// lines and lines starting with `#` are skipped. Returns the number of
    /// commands that failed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run_batch(&mut self, input: impl BufRead) -> Result<usize> {
        let mut failures = 0;
        for line in input.lines() {
            let line = line.map_err(|e| Error::new(ErrorKind::IoError(e.to_string())))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match self.execute(trimmed) {
                Ok(Reply::Text(text)) => print_text(&text),
                Ok(Reply::Quit) => break,
                Err(e) => {
                    failures += 1;
                    Self::print_error(&e);
                }
            }
        }
        Ok(failures)
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let line = match self.editor.read_line(&self.prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                println!();
                return Ok(true);
            }
            ReadResult::Eof => return Ok(false),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(true);
        }
        self.editor.add_history(trimmed);

        match self.execute(trimmed)? {
            Reply::Text(text) => {
                print_text(&text);
                Ok(true)
            }
            Reply::Quit => Ok(false),
        }
    }

    /// Parses and runs one command line.
    ///
    /// # Errors
    ///
    /// Returns `Config` for a line that is not a command, or the error of
    /// the failed operation.
    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        let command: Command = line
            .parse()
            .map_err(|e: CommandError| Error::new(ErrorKind::Config(e.to_string())))?;

        let text = match command {
            Command::Quit => return Ok(Reply::Quit),
            Command::Help => HELP.to_string(),
            Command::Add(word) => {
                let text = describe_added(&word);
                self.session.add_word(word)?;
                self.words_changed()?;
                text
            }
            Command::Words => self.list_words(),
            Command::Remove(id) => {
                let word = self.session.remove_word(&id)?;
                self.words_changed()?;
                format!("removed {}", word.id())
            }
            Command::Suggest(prefix) => {
                let forms = self.session.suggest(&prefix);
                if forms.is_empty() {
                    "no matching forms".to_string()
                } else {
                    forms.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
                }
            }
            Command::Block(surface) => {
                self.session.add_block(&surface)?;
                self.settle()
            }
            Command::Unblock(position) => {
                self.session.remove_block(position)?;
                self.settle()
            }
            Command::Move { from, to } => {
                self.session.move_block(from, to)?;
                self.settle()
            }
            Command::Clear => {
                self.session.clear_blocks();
                self.settle()
            }
            Command::Check => {
                self.runtime.block_on(self.session.check());
                self.sentence_line()
            }
            Command::Types(surface) => {
                let types = self.runtime.block_on(self.session.types(&surface))?;
                if types.is_empty() {
                    format!("{surface}: unknown to the grammar")
                } else {
                    format!("{surface}: {}", types.join(", "))
                }
            }
            Command::Review(action) => self.review(action)?,
            Command::Grade(grade) => {
                let card = self.session.grade_card(grade)?;
                self.progress_changed()?;
                self.session.next_card()?;
                format!(
                    "box {}, next review {}\n{}",
                    card.box_level,
                    card.next_review,
                    self.card_text()
                )
            }
            Command::Save(path) => {
                self.session.save(path.as_deref())?;
                "saved".to_string()
            }
            Command::Load(path) => {
                let count = self.session.load(path.as_deref())?;
                self.refresh_completions();
                format!("loaded {count} words")
            }
        };
        Ok(Reply::Text(text))
    }

    fn review(&mut self, action: ReviewAction) -> Result<String> {
        match action {
            ReviewAction::StartAll | ReviewAction::StartDue => {
                let count = self
                    .session
                    .start_review(action == ReviewAction::StartDue);
                if count == 0 {
                    return Ok("nothing to review".to_string());
                }
            }
            ReviewAction::Show => {}
            ReviewAction::Flip => self.session.flip_card()?,
            ReviewAction::Next => self.session.next_card()?,
            ReviewAction::Previous => self.session.previous_card()?,
        }
        Ok(self.card_text())
    }

    fn card_text(&self) -> String {
        match self.session.current_card() {
            None => "no review in progress (try 'review due')".to_string(),
            Some(CardView {
                word,
                flipped,
                counter,
            }) => {
                if flipped {
                    format!("[{counter}] {} = {} ({})", word.lemma, word.translation, word.word_type)
                } else {
                    format!("[{counter}] {}", word.lemma)
                }
            }
        }
    }

    fn list_words(&self) -> String {
        let mut out = String::new();
        for word in self.session.words() {
            let _ = write!(out, "{} ({}) {}", word.lemma, word.word_type, word.translation);
            if !word.inflections.is_empty() {
                let forms: Vec<&str> = word.inflections.iter().map(|i| i.form.as_str()).collect();
                let _ = write!(out, ": {}", forms.join(", "));
            }
            out.push('\n');
        }
        if out.is_empty() {
            "no words".to_string()
        } else {
            out.trim_end().to_string()
        }
    }

    fn settle(&mut self) -> String {
        self.runtime.block_on(self.session.settle());
        self.sentence_line()
    }

    fn sentence_line(&self) -> String {
        let blocks = self.session.blocks();
        let sentence = if blocks.is_empty() {
            "(empty)".to_string()
        } else {
            blocks
                .iter()
                .map(|b| format!("{}:{}", b.position, b.word_form.surface))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let indicator = self.session.indicator();
        let verdict = &indicator.verdict;
        let colour = match verdict {
            Verdict::Valid => "32",
            Verdict::Invalid => "31",
            Verdict::Errored(_) => "33",
            Verdict::Unchecked => "2",
        };
        let mut line = format!("{sentence}  \x1b[{colour}m[{verdict}]\x1b[0m");
        if *verdict == Verdict::Invalid {
            for diagnostic in &indicator.diagnostics {
                let _ = write!(line, "\n  - {diagnostic}");
            }
        }
        line
    }

    fn words_changed(&mut self) -> Result<()> {
        self.refresh_completions();
        self.progress_changed()
    }

    fn progress_changed(&self) -> Result<()> {
        if self.autosave {
            self.session.save(None)?;
        }
        Ok(())
    }

    fn refresh_completions(&mut self) {
        self.editor.set_forms(self.session.form_index());
    }

    fn print_error(error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    /// Prints the welcome banner.
    fn print_banner(&self) {
        println!("\x1b[1;36m");
        println!("  ╻┏ ┏━┓╻┏┓╻┏━╸");
        println!("  ┣┻┓┃ ┃┃┃┗┫┣╸ ");
        println!("  ╹ ╹┗━┛╹╹ ╹┗━╸");
        println!("\x1b[0m");
        println!("Welcome to Koine v{}", env!("CARGO_PKG_VERSION"));
        println!("Type 'help' for commands. Use Ctrl+D to exit.");
        if let Some(error) = self.session.grammar_error() {
            println!("\x1b[33mGrammar unavailable, sentences will not be checked: {error}\x1b[0m");
        }
        println!();

        let _ = io::stdout().flush();
    }
}

fn describe_added(word: &Word) -> String {
    let missing = paradigm(word.word_type).missing(word);
    let mut text = format!("added {}", word.id());
    if !missing.is_empty() {
        let keys: Vec<&str> = missing.iter().map(|s| s.key).collect();
        let _ = write!(text, " (no forms for {})", keys.join(", "));
    }
    text
}

fn print_text(text: &str) {
    if !text.is_empty() {
        println!("{text}");
    }
}
