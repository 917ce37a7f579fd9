use std::{collections::BTreeSet, fs, num::NonZeroUsize};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use test_split::{
    Splitter,
    algorithm::{Algorithm, SplitAlgorithm},
    config::SplitConfig,
    durations::{DurationTable, store},
};

use lib::*;

fn table<const N: usize>(entries: [(&str, f64); N]) -> DurationTable {
    entries.into_iter().collect()
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

proptest! {
    #[test]
    fn every_item_is_selected_exactly_once(
        (items, table) in suite(),
        splits in 1usize..6,
        algorithm in algorithm(),
    ) {
        let groups = partition(algorithm, splits, &items, &table);
        prop_assert_eq!(groups.len(), splits);

        let mut selected: Vec<&str> = groups.into_iter().flatten().collect();
        let mut expected: Vec<&str> = items.iter().map(String::as_str).collect();
        selected.sort();
        expected.sort();
        prop_assert_eq!(selected, expected);
    }

    #[test]
    fn deselected_is_the_complement(
        (items, table) in suite(),
        splits in 1usize..6,
        algorithm in algorithm(),
    ) {
        let splits = NonZeroUsize::new(splits).unwrap();
        for group in algorithm.split(splits, &items, &table) {
            prop_assert_eq!(group.selected.len() + group.deselected.len(), items.len());

            let selected: BTreeSet<&str> = group.selected_ids().into_iter().collect();
            let deselected: BTreeSet<&str> = group.deselected_ids().into_iter().collect();
            prop_assert!(selected.is_disjoint(&deselected));
            prop_assert_eq!(selected.len() + deselected.len(), items.len());
        }
    }

    #[test]
    fn selected_keeps_relative_order(
        (items, table) in suite(),
        splits in 1usize..6,
        algorithm in algorithm(),
    ) {
        for group in partition(algorithm, splits, &items, &table) {
            let positions: Vec<usize> = group
                .iter()
                .filter_map(|id| items.iter().position(|item| item.as_str() == *id))
                .collect();
            prop_assert_eq!(positions.len(), group.len());
            prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn least_duration_ignores_input_order(
        (items, shuffled, table) in suite().prop_flat_map(|(items, table)| {
            (Just(items.clone()), Just(items).prop_shuffle(), Just(table))
        }),
        splits in 1usize..6,
    ) {
        let original = partition(Algorithm::LeastDuration, splits, &items, &table);
        let shuffled = partition(Algorithm::LeastDuration, splits, &shuffled, &table);

        for (mut a, mut b) in original.into_iter().zip(shuffled) {
            a.sort();
            b.sort();
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn notebooks_run_on_exactly_one_runner(
        (items, table) in notebook_suite(),
        splits in 1usize..5,
    ) {
        let mut selected: Vec<&str> = notebook_runs(splits, &items, &table)
            .into_iter()
            .flatten()
            .collect();
        let mut expected: Vec<&str> = items.iter().map(String::as_str).collect();
        selected.sort();
        expected.sort();
        prop_assert_eq!(selected, expected);
    }

    #[test]
    fn single_split_selects_everything(
        (items, table) in suite(),
        algorithm in algorithm(),
    ) {
        let groups = algorithm.split(NonZeroUsize::MIN, &items, &table);
        prop_assert_eq!(groups.len(), 1);
        prop_assert_eq!(groups[0].selected.len(), items.len());
        prop_assert!(groups[0].deselected.is_empty());
    }
}

#[test]
fn one_item_per_group() {
    let durations = table([("a", 1.0), ("b", 1.0), ("c", 1.0)]);
    let items = ids(&["a", "b", "c"]);

    for algorithm in Algorithm::ALL {
        let groups = algorithm.split(NonZeroUsize::new(3).unwrap(), &items, &durations);
        for (group, id) in groups.iter().zip(["a", "b", "c"]) {
            assert_eq!(group.selected_ids(), [id], "{algorithm}");
            assert_eq!(group.deselected.len(), 2, "{algorithm}");
            assert_eq!(group.duration, 1.0, "{algorithm}");
        }
    }
}

#[test]
fn average_only_counts_collected_tests() {
    let durations = table([("b", 1.0), ("c", 1.0), ("d", 1.0), ("e", 10000.0)]);
    let items = ids(&["a", "b", "c", "d"]);

    assert_eq!(
        partition(Algorithm::DurationBasedChunks, 2, &items, &durations),
        [["a", "b"], ["c", "d"]]
    );
    assert_eq!(
        partition(Algorithm::LeastDuration, 2, &items, &durations),
        [["a", "c"], ["b", "d"]]
    );
}

#[test]
fn tests_missing_from_the_suite() {
    let durations = table([("a", 1.0), ("b", 1.0)]);
    let items = ids(&["a"]);

    for algorithm in Algorithm::ALL {
        let groups = partition(algorithm, 2, &items, &durations);
        assert_eq!(groups[0], ["a"], "{algorithm}");
        assert!(groups[1].is_empty(), "{algorithm}");
    }
}

#[test]
fn tests_missing_from_the_durations() {
    let durations = table([("a", 1.0)]);
    let items = ids(&["a", "b"]);

    for algorithm in Algorithm::ALL {
        assert_eq!(
            partition(algorithm, 2, &items, &durations),
            [["a"], ["b"]],
            "{algorithm}"
        );
    }
}

#[test]
fn large_duration_at_the_end() {
    let durations = table([("a", 1.0), ("b", 1.0), ("c", 1.0), ("d", 3.0)]);
    let items = ids(&["a", "b", "c", "d"]);

    let groups = Algorithm::LeastDuration.split(NonZeroUsize::new(2).unwrap(), &items, &durations);
    assert_eq!(groups[0].selected_ids(), ["d"]);
    assert_eq!(groups[0].duration, 3.0);
    assert_eq!(groups[1].selected_ids(), ["a", "b", "c"]);
    assert_eq!(groups[1].duration, 3.0);
}

#[test]
fn runners_agree_on_notebooks() {
    let items = ids(&[
        "nb/a.ipynb::Cell 0",
        "nb/a.ipynb::Cell 1",
        "nb/a.ipynb::Cell 2",
        "nb/a.ipynb::Cell 3",
        "tests/x.py::test_1",
        "tests/x.py::test_2",
        "nb/b.ipynb::Cell 0",
        "nb/b.ipynb::Cell 1",
    ]);

    let selections: Vec<Vec<&str>> = (1..=3)
        .map(|group| {
            let config = SplitConfig::new(3, group, Algorithm::DurationBasedChunks)
                .unwrap()
                .with_notebook_compat(true);
            let splitter = Splitter::new(config, DurationTable::new());
            splitter
                .split(&items)
                .selected
                .into_iter()
                .map(String::as_str)
                .collect()
        })
        .collect();

    let items: Vec<&str> = items.iter().map(String::as_str).collect();
    assert_eq!(selections[0], &items[0..4]);
    assert_eq!(selections[1], &items[4..6]);
    assert_eq!(selections[2], &items[6..8]);
}

#[test]
fn notebook_after_a_plain_test_runs_once() {
    let items = ids(&[
        "tests/x.py::test_a",
        "nb/a.ipynb::Cell 0",
        "nb/a.ipynb::Cell 1",
        "nb/a.ipynb::Cell 2",
    ]);

    let runs = notebook_runs(2, &items, &DurationTable::new());
    let items: Vec<&str> = items.iter().map(String::as_str).collect();
    assert_eq!(runs[0], items);
    assert!(runs[1].is_empty());
}

#[test]
fn cli_splits_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let test = |name: &str| format!("tests/test_adapt.py::{name}");
    let durations = format!(
        r#"[["{}", 1], ["{}", 2.6], ["{}", 0.2], ["{}", 0.2], ["tests/test_adapt.py::gone", 1000]]"#,
        test("test_1"),
        test("test_5"),
        test("test_6"),
        test("test_10"),
    );
    fs::write(dir.path().join(".test_durations"), durations).unwrap();

    let stdin: String = (1..=10).map(|n| test(&format!("test_{n}")) + "\n\n").collect();
    let expected = [
        vec![1, 2, 3, 4],
        vec![5, 6, 7],
        vec![8, 9, 10],
    ];

    for (group, expected) in expected.iter().enumerate() {
        let group = (group + 1).to_string();
        let output = run_cli(dir.path(), &["split", "--splits", "3", "--group", &group], &stdin)
            .unwrap();
        assert!(output.status.success());

        let expected: Vec<String> = expected.iter().map(|n| test(&format!("test_{n}"))).collect();
        assert_eq!(stdout_lines(&output), expected);
    }
}

#[test]
fn cli_without_group_runs_everything() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["split", "--splits", "2"], "a\nb\nc\n").unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), ["a", "b", "c"]);
}

#[test]
fn cli_rejects_invalid_groups() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["split", "--splits", "2", "--group", "3"], "a\n").unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("out of range"));

    let args = ["split", "--splits", "2", "--group", "1", "--algorithm", "random"];
    let output = run_cli(dir.path(), &args, "a\n").unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("least_duration"));
}

#[test]
fn cli_records_durations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".test_durations");
    store::save(&path, &table([("a", 9.0), ("c", 3.0)])).unwrap();

    let events = r#"
        {"id": "a", "phase": "setup", "duration": 0.5}
        {"id": "a", "phase": "call", "duration": 1.0}
        {"id": "b", "phase": "teardown", "duration": 700}
        {"id": "b", "phase": "call", "duration": 2}
    "#;
    let output = run_cli(dir.path(), &["record"], events).unwrap();
    assert!(output.status.success());

    assert_eq!(
        store::load(&path).unwrap(),
        table([("a", 1.5), ("b", 2.0), ("c", 3.0)])
    );
}

#[test]
fn cli_prints_slowest() {
    let dir = tempfile::tempdir().unwrap();
    let durations = table([("a", 1.0), ("b", 3.25), ("c", 2.0)]);
    store::save(dir.path().join(".test_durations"), &durations).unwrap();

    let output = run_cli(dir.path(), &["slowest", "-c", "2"], "").unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        ["", "[test-split] 2 slowest tests:", "3.25 b", "2.00 c"]
    );
}

#[test]
fn cli_slowest_without_durations_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["slowest"], "").unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains(".test_durations"));
}

#[test]
fn cli_combines_runner_files() {
    let dir = tempfile::tempdir().unwrap();
    for (runner, durations) in [
        ("runner-1", table([("a", 1.0), ("shared", 1.0)])),
        ("runner-2", table([("b", 2.0), ("shared", 2.0)])),
    ] {
        let runner = dir.path().join(runner);
        fs::create_dir(&runner).unwrap();
        store::save(runner.join(".test_durations"), &durations).unwrap();
    }

    let output = run_cli(dir.path(), &["combine"], "").unwrap();
    assert!(output.status.success());
    assert_eq!(
        store::load(dir.path().join(".test_durations")).unwrap(),
        table([("a", 1.0), ("b", 2.0), ("shared", 2.0)])
    );
}
