#![no_std]
extern crate alloc;
extern crate cache_policies;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use cache_policies::{LfuCache, LirsCache, LruCache, SlruCache};
use core::num::NonZeroUsize;

fn make_lru<K: core::hash::Hash + Eq + Clone, V>(cap: usize) -> LruCache<K, V> {
    LruCache::new(NonZeroUsize::new(cap).unwrap())
}

fn make_lfu<K: core::hash::Hash + Eq + Clone, V>(cap: usize) -> LfuCache<K, V> {
    LfuCache::new(NonZeroUsize::new(cap).unwrap())
}

fn make_slru<K: core::hash::Hash + Eq + Clone, V>(cap: usize, ratio: f64) -> SlruCache<K, V> {
    SlruCache::with_ratio(cap, ratio).unwrap()
}

fn make_lirs<K: core::hash::Hash + Eq + Clone, V>(cap: usize, ratio: f64) -> LirsCache<K, V> {
    LirsCache::with_ratio(cap, ratio).unwrap()
}

#[test]
fn test_lru_in_no_std() {
    let mut cache = make_lru(2);

    // String keys exercise the alloc crate
    let key1 = String::from("key1");
    let key2 = String::from("key2");
    let key3 = String::from("key3");

    cache.put(key1.clone(), 1);
    cache.put(key2.clone(), 2);

    assert_eq!(*cache.get(&key1).unwrap(), 1);
    assert_eq!(*cache.get(&key2).unwrap(), 2);

    // This should evict key1
    cache.put(key3.clone(), 3);

    assert!(cache.get(&key1).is_none());
    assert_eq!(*cache.get(&key2).unwrap(), 2);
    assert_eq!(*cache.get(&key3).unwrap(), 3);
}

#[test]
fn test_lfu_in_no_std() {
    let mut cache = make_lfu(2);

    let key1 = String::from("key1");
    let key2 = String::from("key2");

    cache.put(key1.clone(), 1);
    cache.put(key2.clone(), 2);

    // Raise key1's frequency
    cache.get(&key1);
    cache.get(&key1);

    // A new item evicts key2 (lower frequency)
    let key3 = String::from("key3");
    cache.put(key3.clone(), 3);

    assert_eq!(*cache.get(&key1).unwrap(), 1);
    assert!(cache.get(&key2).is_none());
    assert_eq!(*cache.get(&key3).unwrap(), 3);
}

#[test]
fn test_slru_in_no_std() {
    // 2 probationary slots, 8 protected
    let mut cache = make_slru(10, 0.2);

    let keys: Vec<String> = (0..4).map(|i| format!("key{i}")).collect();

    cache.put(keys[0].clone(), 0);
    cache.put(keys[1].clone(), 1);

    // Promote key0 to the protected segment
    cache.get(&keys[0]);

    // Churn the probationary segment
    cache.put(keys[2].clone(), 2);
    cache.put(keys[3].clone(), 3);

    // key0 survives in protected, key1 was evicted from probation
    assert_eq!(*cache.get(&keys[0]).unwrap(), 0);
    assert!(cache.get(&keys[1]).is_none());
    assert_eq!(*cache.get(&keys[3]).unwrap(), 3);
}

#[test]
fn test_lirs_in_no_std() {
    // 2 LIR slots, 1 resident HIR slot
    let mut cache = make_lirs(3, 0.34);

    let key1 = String::from("key1");
    let key2 = String::from("key2");
    let key3 = String::from("key3");
    let key4 = String::from("key4");

    cache.put(key1.clone(), 1);
    cache.put(key2.clone(), 2);
    cache.put(key3.clone(), 3);

    // key3 holds the single resident HIR slot; key4 pushes it out
    cache.put(key4.clone(), 4);

    assert!(cache.get(&key3).is_none());
    assert_eq!(*cache.get(&key4).unwrap(), 4); // promoted to LIR, key1 demoted
    assert_eq!(*cache.get(&key2).unwrap(), 2);
    assert_eq!(*cache.get(&key1).unwrap(), 1); // resident HIR hit
}

#[test]
fn test_complex_types_in_no_std() {
    let mut cache = make_lru(2);

    let key1 = Vec::<u8>::from([1, 2, 3]);
    let value1 = Vec::<i32>::from([10, 20, 30]);

    let key2 = Vec::<u8>::from([4, 5, 6]);
    let value2 = Vec::<i32>::from([40, 50, 60]);

    cache.put(key1.clone(), value1.clone());
    cache.put(key2.clone(), value2.clone());

    assert_eq!(*cache.get(&key1).unwrap(), value1);
    assert_eq!(*cache.get(&key2).unwrap(), value2);
}
