//! State carried between compiler invocations
//!
//! Each test runs several passes against the same output directory, the way
//! separate compiler processes would.

mod common;

use std::fs;

use common::*;
use keypoints_ir::{ErrorKind, InstrumentUnitUseCase, InstrumentationConfig};
use keypoints_storage::{read_dictionary, BranchEntry};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn config(dir: &TempDir) -> InstrumentationConfig {
    InstrumentationConfig::default().with_output_dir(dir.path())
}

fn run(config: &InstrumentationConfig, source_file: &str, targets: usize) -> Vec<BranchEntry> {
    let mut module = fan_out(source_file, targets);
    InstrumentUnitUseCase::from_config(config)
        .unwrap()
        .execute_and_apply(&mut module)
        .unwrap()
        .entries
}

#[test]
fn test_counter_persists_across_invocations() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let first = run(&config, "a.c", 5);
    let second = run(&config, "b.c", 5);

    let ids = |entries: &[BranchEntry]| entries.iter().map(|e| e.id).collect::<Vec<_>>();
    assert_eq!(ids(&first), vec![0, 1, 2, 3, 4]);
    assert_eq!(ids(&second), vec![5, 6, 7, 8, 9]);
    assert_eq!(fs::read_to_string(config.counter_path()).unwrap().trim(), "10");
}

#[test]
fn test_dictionary_accumulates_in_order() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let mut expected = run(&config, "a.c", 2);
    expected.extend(run(&config, "b.c", 3));

    assert_eq!(read_dictionary(config.dictionary_path()).unwrap(), expected);

    let text = fs::read_to_string(config.dictionary_path()).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "br_0: a.c, 1, 100",
            "br_1: a.c, 1, 101",
            "br_2: b.c, 1, 100",
            "br_3: b.c, 1, 101",
            "br_4: b.c, 1, 102",
        ]
    );
}

#[test]
fn test_unit_without_branches_keeps_counter() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    run(&config, "a.c", 3);

    let mut module = ModuleBuilder::new("flat.c")
        .function("f", vec![block("entry", vec![located(ret(), 1)])])
        .build();
    let plan = InstrumentUnitUseCase::from_config(&config)
        .unwrap()
        .execute_and_apply(&mut module)
        .unwrap();

    assert_eq!(plan.next_id, 3);
    assert_eq!(fs::read_to_string(config.counter_path()).unwrap().trim(), "3");
    assert_eq!(read_dictionary(config.dictionary_path()).unwrap().len(), 3);
}

#[test]
fn test_corrupt_counter_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    run(&config, "a.c", 2);
    fs::write(config.counter_path(), "12abc").unwrap();

    let mut module = fan_out("b.c", 2);
    let before = module.clone();
    let err = InstrumentUnitUseCase::from_config(&config)
        .unwrap()
        .execute_and_apply(&mut module)
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::CounterState);
    assert_eq!(module, before);
    assert_eq!(read_dictionary(config.dictionary_path()).unwrap().len(), 2);
}

#[test]
fn test_locked_invocations_share_the_counter() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_lock(true);

    let first = run(&config, "a.c", 4);
    let second = run(&config, "b.c", 1);

    assert_eq!(first.last().map(|e| e.id), Some(3));
    assert_eq!(second[0].id, 4);
    assert_eq!(fs::read_to_string(config.counter_path()).unwrap().trim(), "5");
}
