use std::collections::BTreeMap;
use std::fs;

use question_order::{Assignments, BITS, OrderError, Question, RandomCache, finalize, plan};
use tempfile::TempDir;

fn questions(texts: &[&str]) -> Vec<Question> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Question::new(
                *t,
                format!("https://www.patreon.com/posts/1?comment={i}"),
                "tester",
            )
        })
        .collect()
}

/// Full run: load cache, plan, stubbed draw, finalize, save, reload.
fn run(cache_path: &std::path::Path, qs: &[Question], drawn: Vec<u64>) -> Vec<String> {
    let mut cache = RandomCache::load(cache_path, BITS);
    let p = plan(qs, &cache).unwrap();
    assert_eq!(p.draw_count(), drawn.len());
    let ordered = finalize(qs, p, drawn).unwrap();
    cache.merge_and_save(&ordered.fresh).unwrap();
    ordered
        .ranked
        .iter()
        .map(|r| r.question.text.clone())
        .collect()
}

#[test]
fn foo_bar_baz_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prng_cache.json");
    let qs = questions(&["foo", "bar", "baz"]);

    let order = run(&path, &qs, vec![50, 10, 90]);
    assert_eq!(order, vec!["bar", "foo", "baz"]);

    let raw: BTreeMap<String, BTreeMap<String, u64>> =
        serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw.len(), 1);
    let entries = &raw[&BITS.to_string()];
    let expected: BTreeMap<String, u64> = [
        (qs[0].id.to_string(), 50),
        (qs[1].id.to_string(), 10),
        (qs[2].id.to_string(), 90),
    ]
    .into_iter()
    .collect();
    assert_eq!(entries, &expected);
}

#[test]
fn second_run_draws_only_new_questions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("qrng_cache.json");

    run(&path, &questions(&["foo", "bar", "baz"]), vec![50, 10, 90]);

    // Reordered input plus one new question: only the new one is drawn.
    let order = run(&path, &questions(&["baz", "qux", "foo", "bar"]), vec![30]);
    assert_eq!(order, vec!["bar", "qux", "foo", "baz"]);

    // Unchanged input: nothing is drawn at all.
    let order = run(&path, &questions(&["foo", "qux", "bar", "baz"]), vec![]);
    assert_eq!(order, vec!["bar", "qux", "foo", "baz"]);
    assert_eq!(RandomCache::load(&path, BITS).len(), 4);
}

#[test]
fn collision_leaves_cache_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("qrng_cache.json");
    run(&path, &questions(&["foo"]), vec![50]);
    let before = fs::read(&path).unwrap();

    let qs = questions(&["foo", "bar"]);
    let cache = RandomCache::load(&path, BITS);
    let p = plan(&qs, &cache).unwrap();
    let err = finalize(&qs, p, vec![50]).unwrap_err();
    assert!(matches!(err, OrderError::Collision(_)));

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn cached_values_stay_in_range() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("qrng_cache.json");
    let max = (1u64 << BITS) - 1;
    run(&path, &questions(&["lo", "hi"]), vec![0, max]);

    let cache = RandomCache::load(&path, BITS);
    let values: Assignments = cache.entries().clone();
    assert!(values.values().all(|v| *v < (1u64 << BITS)));
    assert_eq!(values.len(), 2);
}

#[test]
fn existing_sha1_keyed_cache_is_reused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("qrng_cache.json");
    // sha1("foo") and sha1("bar"), as written by earlier runs
    fs::write(
        &path,
        r#"{"27": {"0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33": 12345,
                   "62cdb7020ff920e5aa642c3d4066950dd1f01f4d": 678}}"#,
    )
    .unwrap();

    let qs = questions(&["foo", "bar"]);
    let cache = RandomCache::load(&path, BITS);
    assert_eq!(cache.len(), 2);

    let p = plan(&qs, &cache).unwrap();
    assert_eq!(p.draw_count(), 0);
    let ordered = finalize(&qs, p, vec![]).unwrap();
    let values: Vec<u64> = ordered.ranked.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![678, 12345]);
    assert!(ordered.fresh.is_empty());
}
