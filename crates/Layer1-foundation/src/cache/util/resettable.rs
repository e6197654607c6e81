//! Deduplicating registry for shared sub-computations
//!
//! Values are partitioned by concrete type and, within a type, by an explicit
//! canonical key. Two requests whose keys are equal collapse onto one stored
//! instance, regardless of which caller built them.

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A value that can be collapsed onto an equal, previously stored value
///
/// `dedup_key` is the canonical form used for equality. Implementations must
/// derive it from the value's parameters only, never from scratch state such
/// as memoized results or counters.
pub trait Deduplicate: Clone + Send + Sync + 'static {
    type Key: Eq + Hash + Send + Sync + 'static;

    fn dedup_key(&self) -> Self::Key;
}

trait Bucket: Send + Sync {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn duplicate(&self) -> Box<dyn Bucket>;
    fn len(&self) -> usize;
}

struct TypedBucket<V: Deduplicate> {
    entries: HashMap<V::Key, Arc<V>>,
}

impl<V: Deduplicate> TypedBucket<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V: Deduplicate> Bucket for TypedBucket<V> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn duplicate(&self) -> Box<dyn Bucket> {
        let entries = self
            .entries
            .values()
            .map(|value| {
                let copy = (**value).clone();
                (copy.dedup_key(), Arc::new(copy))
            })
            .collect();
        Box::new(TypedBucket::<V> { entries })
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Session-scoped registry returning one shared instance per equal value
///
/// ```ignore
/// let mut set = ResettableSet::new();
/// let a = set.find_or_add(ConvexHull::of(object));
/// let b = set.find_or_add(ConvexHull::of(object));
/// assert!(Arc::ptr_eq(&a, &b));
///
/// set.reset(); // start of a new session
/// ```
#[derive(Default)]
pub struct ResettableSet {
    buckets: HashMap<TypeId, Box<dyn Bucket>>,
    hits: u64,
    misses: u64,
}

impl ResettableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored value equal to `candidate`, storing `candidate` if none exists
    pub fn find_or_add<V: Deduplicate>(&mut self, candidate: V) -> Arc<V> {
        let key = candidate.dedup_key();
        let bucket = self
            .buckets
            .entry(TypeId::of::<V>())
            .or_insert_with(|| Box::new(TypedBucket::<V>::new()));

        let typed = match bucket.as_any_mut().downcast_mut::<TypedBucket<V>>() {
            Some(typed) => typed,
            // buckets are keyed by TypeId::of::<V>()
            None => unreachable!("bucket type mismatch"),
        };

        match typed.entries.entry(key) {
            Entry::Occupied(existing) => {
                self.hits += 1;
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => {
                self.misses += 1;
                Arc::clone(slot.insert(Arc::new(candidate)))
            }
        }
    }

    /// Remove every entry
    pub fn reset(&mut self) {
        self.buckets.clear();
    }

    /// Independent registry holding copies of the same logical entries
    ///
    /// Handles returned by the original are not shared with the copy.
    pub fn duplicate(&self) -> Self {
        Self {
            buckets: self
                .buckets
                .iter()
                .map(|(type_id, bucket)| (*type_id, bucket.duplicate()))
                .collect(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Total number of stored entries
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get registry statistics
    pub fn stats(&self) -> ResettableSetStats {
        ResettableSetStats {
            entries: self.len(),
            types: self.buckets.values().filter(|b| b.len() > 0).count(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Reset hit/miss counters
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }
}

impl fmt::Debug for ResettableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResettableSet")
            .field("entries", &self.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

/// Registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResettableSetStats {
    pub entries: usize,
    /// Number of distinct value types currently stored
    pub types: usize,
    /// Requests answered by an existing entry
    pub hits: u64,
    /// Requests that stored a new entry
    pub misses: u64,
}

impl ResettableSetStats {
    /// Fraction of requests that were deduplicated
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}
