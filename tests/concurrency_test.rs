//! Verifies pure read concurrency after the one-time build.

use std::sync::{Arc, Barrier};
use std::thread;

use phonemic::prelude::*;

fn resources() -> InMemoryResources {
    let mut r = InMemoryResources::new();
    r.insert(
        "gen_rules_any",
        r#"
"sch" "" "" "S"
"ts" "" "$" "tS"
"a" "" "" "(a|o)"
"#,
    );
    r
}

fn config() -> RegistryConfig {
    RegistryConfig {
        domains: vec![DomainConfig {
            name: "gen".into(),
            languages: vec!["any".into()],
        }],
        kinds: vec![KindConfig {
            name: "rules".into(),
            base: true,
        }],
    }
}

#[test]
fn test_concurrent_matching() {
    let registry = Arc::new(RuleRegistry::build(&config(), &resources()).unwrap());

    const NUM_READERS: usize = 8;
    let barrier = Arc::new(Barrier::new(NUM_READERS));
    let mut handles = vec![];

    for i in 0..NUM_READERS {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            let rules = registry.rules("gen", "rules", "any").unwrap();
            let mut matched = 0usize;
            for j in 0..1000 {
                let input = if (i + j) % 2 == 0 { "schats" } else { "katsa" };
                for pos in 0..=input.len() {
                    for rule in rules {
                        if rule.matches(input, pos) {
                            matched += 1;
                        }
                    }
                }
            }
            matched
        }));
    }

    let counts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    // every thread saw the same immutable rules, so every thread counted
    // the same matches for its input mix
    assert!(counts.iter().all(|&c| c == counts[0]));
    assert!(counts[0] > 0);
}

#[test]
fn test_concurrent_lazy_text_flatten() {
    // many threads racing to flatten the same tree must agree; the cache
    // write is an idempotent publish
    let mut phoneme = Phoneme::new("", LanguageSet::Any);
    for i in 0..100 {
        phoneme = phoneme.append(if i % 2 == 0 { "ab" } else { "cd" });
    }
    let phoneme = Arc::new(phoneme);

    const NUM_READERS: usize = 8;
    let barrier = Arc::new(Barrier::new(NUM_READERS));
    let mut handles = vec![];

    for _ in 0..NUM_READERS {
        let phoneme = Arc::clone(&phoneme);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            phoneme.text()
        }));
    }

    let renderings: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(renderings[0].len(), 200);
    assert!(renderings.iter().all(|r| *r == renderings[0]));
}

#[test]
fn test_global_registry_single_build_under_contention() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static REGISTRY: GlobalRegistry = GlobalRegistry::new();
    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    const NUM_THREADS: usize = 8;
    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let mut handles = vec![];

    for _ in 0..NUM_THREADS {
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let registry = REGISTRY
                .get_or_build(|| {
                    BUILDS.fetch_add(1, Ordering::SeqCst);
                    RuleRegistry::build(&config(), &resources())
                })
                .unwrap();
            registry.rules("gen", "rules", "any").unwrap().len()
        }));
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
}
