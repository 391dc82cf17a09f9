use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use memo_core::{BinOp, CacheError, CallableBuilder, FnCodec, Fingerprint, Heap, InMemoryTier, Instr, MemoCache, ObjectId, PersistentTier, Value};
use serde::{Deserialize, Serialize};

fn scaled(heap: &mut Heap) -> (ObjectId, ObjectId) {
    let m = heap.add_module("jobs");
    heap.set_global(m, "factor", 10).unwrap();
    let f = heap.define(m,
                        "scaled",
                        CallableBuilder::new("scaled").param("x").instrs([Instr::LoadLocal("x".into()),
                                                                          Instr::LoadGlobal("factor".into()),
                                                                          Instr::Binary(BinOp::Mul),
                                                                          Instr::Return]))
                .unwrap();
    (m, f)
}

#[test]
fn computation_runs_once_per_key() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let cache = MemoCache::new();
    let calls = AtomicUsize::new(0);
    let run = |x: i64| {
        cache.memoize(&heap, f, &[x.into()], || {
                 calls.fetch_add(1, Ordering::SeqCst);
                 x * 10
             })
    };
    assert_eq!(run(2), 20);
    assert_eq!(run(2), 20);
    assert_eq!(run(2), 20);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(run(3), 30);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn rebinding_referenced_state_forces_recompute() {
    let mut heap = Heap::new();
    let (m, f) = scaled(&mut heap);
    let cache = MemoCache::new();
    let mut calls = 0;
    let first: i64 = cache.memoize(&heap, f, &[2.into()], || {
                              calls += 1;
                              20
                          });
    heap.set_global(m, "factor", 11).unwrap();
    let second: i64 = cache.memoize(&heap, f, &[2.into()], || {
                               calls += 1;
                               22
                           });
    heap.set_global(m, "factor", 10).unwrap();
    let third: i64 = cache.memoize(&heap, f, &[2.into()], || {
                              calls += 1;
                              -1
                          });
    assert_eq!((first, second, third), (20, 22, 20));
    assert_eq!(calls, 2);
}

#[test]
fn argument_order_and_kind_are_part_of_the_key() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let cache = MemoCache::new();
    let k1 = cache.key_for(&heap, f, &[1.into(), 2.into()]);
    let k2 = cache.key_for(&heap, f, &[2.into(), 1.into()]);
    let k3 = cache.key_for(&heap, f, &[Value::Bool(true), 2.into()]);
    assert_ne!(k1, k2);
    assert_ne!(k1, k3);
    assert_eq!(k1, cache.key_for(&heap, f, &[1.into(), 2.into()]));
}

#[test]
fn stored_value_of_another_type_is_a_miss() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let cache = MemoCache::new();
    let _: i64 = cache.memoize(&heap, f, &[1.into()], || 10);
    let s: String = cache.memoize(&heap, f, &[1.into()], || "ten".to_string());
    assert_eq!(s, "ten");
    let again: String = cache.memoize(&heap, f, &[1.into()], || unreachable!());
    assert_eq!(again, "ten");
    assert_eq!(cache.stats().computations, 2);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Report {
    name: String,
    total: f64,
}

#[test]
fn tier_survives_a_restart() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let tier = InMemoryTier::new();
    let expected = Report { name: "q1".into(),
                            total: 12.5 };

    let cache = MemoCache::with_tier(Box::new(tier.clone()));
    let first: Report = cache.memoize(&heap, f, &["q1".into()], || expected.clone());
    assert_eq!(first, expected);
    cache.close().unwrap();
    assert_eq!(tier.len(), 1);

    let restarted = MemoCache::with_tier(Box::new(tier.clone()));
    let second: Report = restarted.memoize(&heap, f, &["q1".into()], || unreachable!());
    assert_eq!(second, expected);
    let stats = restarted.stats();
    assert_eq!((stats.tier_hits, stats.computations), (1, 0));
    let key = restarted.key_for(&heap, f, &["q1".into()]);
    assert!(restarted.contains(&key));
    assert!(restarted.entry_info(&key).unwrap().size > 0);
}

#[test]
fn clear_keeps_the_tier() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let cache = MemoCache::with_tier(Box::new(InMemoryTier::new()));
    let _: i64 = cache.memoize(&heap, f, &[4.into()], || 40);
    cache.clear();
    assert!(cache.is_empty());
    let again: i64 = cache.memoize(&heap, f, &[4.into()], || unreachable!());
    assert_eq!(again, 40);
    assert_eq!(cache.stats().tier_hits, 1);
}

#[test]
fn corrupt_tier_entry_forces_recompute() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let tier = InMemoryTier::new();
    let cache = MemoCache::with_tier(Box::new(tier.clone()));
    let key = cache.key_for(&heap, f, &[5.into()]);
    tier.insert_raw(key, b"{not json".to_vec());

    let mut calls = 0;
    let v: i64 = cache.memoize(&heap, f, &[5.into()], || {
                          calls += 1;
                          50
                      });
    assert_eq!((v, calls), (50, 1));
    assert_eq!(cache.stats().tier_failures, 1);
    // el recomputo reescribe la entrada persistida
    let restarted = MemoCache::with_tier(Box::new(tier));
    let w: i64 = restarted.memoize(&heap, f, &[5.into()], || unreachable!());
    assert_eq!(w, 50);
}

struct BrokenTier;

impl PersistentTier for BrokenTier {
    fn load(&self, _key: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::StoreIo("disk on fire".into()))
    }

    fn store(&self, _key: &Fingerprint, _bytes: &[u8]) -> Result<(), CacheError> {
        Err(CacheError::StoreIo("disk on fire".into()))
    }

    fn flush(&self) -> Result<(), CacheError> {
        Err(CacheError::StoreIo("disk on fire".into()))
    }
}

#[test]
fn failing_tier_degrades_to_memory_only() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let cache = MemoCache::with_tier(Box::new(BrokenTier));
    let mut calls = 0;
    for _ in 0..3 {
        let v: i64 = cache.memoize(&heap, f, &[6.into()], || {
                              calls += 1;
                              60
                          });
        assert_eq!(v, 60);
    }
    assert_eq!(calls, 1);
    assert_eq!(cache.stats().tier_failures, 2);
    assert!(matches!(cache.flush(), Err(CacheError::StoreIo(_))));
}

#[test]
fn custom_codec_round_trips_through_the_tier() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let tier = InMemoryTier::new();
    let codec = FnCodec::new(|v: &u64| Ok(v.to_string().into_bytes()),
                             |b: &[u8]| String::from_utf8_lossy(b).parse::<u64>().map_err(|e| e.to_string()));
    let cache = MemoCache::with_tier(Box::new(tier.clone()));
    let v = cache.memoize_with(&codec, &heap, f, &[7.into()], || 70u64);
    assert_eq!(v, 70);

    let restarted = MemoCache::with_tier(Box::new(tier));
    let w: u64 = restarted.memoize_with(&codec, &heap, f, &[7.into()], || unreachable!());
    assert_eq!(w, 70);
}

#[test]
fn concurrent_callers_share_one_computation() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let cache = MemoCache::new();
    let calls = AtomicUsize::new(0);
    let threads = 16;
    let barrier = Barrier::new(threads);

    let results: Vec<i64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..threads).map(|_| {
                                              s.spawn(|| {
                                                   barrier.wait();
                                                   cache.memoize(&heap, f, &[8.into()], || {
                                                            calls.fetch_add(1, Ordering::SeqCst);
                                                            std::thread::sleep(std::time::Duration::from_millis(20));
                                                            80i64
                                                        })
                                               })
                                          })
                                          .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|v| *v == 80));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn panicking_computation_lets_waiters_recover() {
    let mut heap = Heap::new();
    let (_, f) = scaled(&mut heap);
    let cache = Arc::new(MemoCache::new());
    let heap = Arc::new(heap);

    let failed = {
        let (cache, heap) = (cache.clone(), heap.clone());
        std::thread::spawn(move || {
            let _: i64 = cache.memoize(&heap, f, &[9.into()], || panic!("boom"));
        }).join()
    };
    assert!(failed.is_err());

    let v: i64 = cache.memoize(&heap, f, &[9.into()], || 90);
    assert_eq!(v, 90);
}
