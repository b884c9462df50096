//! Whole-application runs through the REPL command layer.

use koine_engine::{FormIndex, Verdict};
use koine_foundation::{Result, WordId};
use koine_runtime::{LineEditor, ReadResult, Repl, Reply, RuntimeConfig};

/// Editor that never has input; commands are driven through `execute`.
struct NoInput;

impl LineEditor for NoInput {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(ReadResult::Eof)
    }

    fn add_history(&mut self, _line: &str) {}

    fn set_forms(&mut self, _forms: FormIndex) {}
}

fn repl(config: RuntimeConfig) -> Repl<NoInput> {
    let mut repl = Repl::with_editor(NoInput, config).unwrap().without_banner();
    repl.load_grammar().unwrap();
    repl
}

const LESSON: &str = r#"
# a short lesson
add article ὁ the
add noun ἄνθρωπος human genS=ἀνθρώπου accS=ἄνθρωπον
add noun θεός god accS=θεόν
add verb λέγω "I say" present3s=λέγει present3p=λέγουσι
block ὁ
block ἄνθρωπος
block λέγει
block θεόν
"#;

#[test]
fn lesson_script_builds_a_valid_sentence() {
    let mut repl = repl(RuntimeConfig::default());
    let failures = repl.run_batch(LESSON.as_bytes()).unwrap();
    assert_eq!(failures, 0);
    assert_eq!(repl.session().blocks().len(), 4);
    assert_eq!(repl.session().indicator().verdict, Verdict::Valid);

    repl.execute("move 3 0").unwrap();
    assert_eq!(repl.session().indicator().verdict, Verdict::Valid);

    repl.execute("block λέγουσι").unwrap();
    assert_eq!(repl.session().indicator().verdict, Verdict::Invalid);
}

#[test]
fn autosave_persists_between_runs() {
    let path = std::env::temp_dir().join(format!("koine-autosave-{}.store", std::process::id()));
    let config = RuntimeConfig::default().with_store_path(&path);

    {
        let mut first = repl(config.clone()).with_autosave();
        first.run_batch(LESSON.as_bytes()).unwrap();
        first.execute("review all").unwrap();
        first.execute("grade hard").unwrap();
    }

    let mut second = repl(config);
    assert_eq!(second.load_store().unwrap(), 4);
    assert!(second.session().card(&WordId::new("θεός", "god")).is_some());
    assert!(second.session().blocks().is_empty());
    let reply = second.execute("types λέγουσι").unwrap();
    assert_eq!(reply, Reply::Text("λέγουσι: verb".to_string()));

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_store_file_is_not_an_error() {
    let config = RuntimeConfig::default().with_store_path("/nonexistent/dir/koine.store");
    let mut repl = repl(config);
    assert_eq!(repl.load_store().unwrap(), 0);
    assert!(repl.execute("save").is_err());
}
