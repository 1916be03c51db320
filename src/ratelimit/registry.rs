//! Ordered registry of scoped rates.
//!
//! Entries keep insertion order and lookups return the first exact match, so
//! an earlier rule always shadows a later duplicate for the same path and
//! method.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::rate::ScopedRate;

/// Value returned by [`RateRegistry::get_limit`] when no rate matches.
pub const NO_LIMIT: i64 = -1;

/// An ordered collection of scoped rates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateRegistry {
    rates: Vec<ScopedRate>,
}

impl RateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rate after all existing entries. Duplicates are kept.
    pub fn append(&mut self, rate: ScopedRate) {
        self.rates.push(rate);
    }

    /// First rate matching `path` and `method` exactly.
    pub fn find(&self, path: &str, method: &str) -> Option<&ScopedRate> {
        self.rates.iter().find(|rate| rate.matches(path, method))
    }

    /// Limit of the first rate matching `path` and `method`, or [`NO_LIMIT`].
    pub fn get_limit(&self, path: &str, method: &str) -> i64 {
        self.find(path, method)
            .map(|rate| rate.limit() as i64)
            .unwrap_or(NO_LIMIT)
    }

    /// Refresh the deadline of every entry from the current time.
    pub fn update_deadline(&mut self) {
        self.update_deadline_at(Utc::now());
    }

    /// Refresh the deadline of every entry from `now`.
    pub fn update_deadline_at(&mut self, now: DateTime<Utc>) {
        for rate in &mut self.rates {
            rate.update_deadline_at(now);
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopedRate> {
        self.rates.iter()
    }
}

impl Extend<ScopedRate> for RateRegistry {
    fn extend<I: IntoIterator<Item = ScopedRate>>(&mut self, iter: I) {
        self.rates.extend(iter);
    }
}

impl FromIterator<ScopedRate> for RateRegistry {
    fn from_iter<I: IntoIterator<Item = ScopedRate>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RateRegistry {
    type Item = &'a ScopedRate;
    type IntoIter = std::slice::Iter<'a, ScopedRate>;

    fn into_iter(self) -> Self::IntoIter {
        self.rates.iter()
    }
}

/// A cloneable handle to a registry shared between threads.
///
/// Every clone refers to the same registry, so an append through one handle
/// is visible through all of them.
#[derive(Debug, Clone, Default)]
pub struct SharedRateRegistry {
    inner: Arc<RwLock<RateRegistry>>,
}

impl SharedRateRegistry {
    pub fn new(registry: RateRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn append(&self, rate: ScopedRate) {
        self.inner.write().append(rate);
    }

    pub fn get_limit(&self, path: &str, method: &str) -> i64 {
        self.inner.read().get_limit(path, method)
    }

    /// Copy of the first matching rate, including its current deadline.
    pub fn find(&self, path: &str, method: &str) -> Option<ScopedRate> {
        self.inner.read().find(path, method).cloned()
    }

    pub fn update_deadline(&self) {
        self.inner.write().update_deadline();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of the registry as it is right now.
    pub fn snapshot(&self) -> RateRegistry {
        self.inner.read().clone()
    }
}

impl From<RateRegistry> for SharedRateRegistry {
    fn from(registry: RateRegistry) -> Self {
        Self::new(registry)
    }
}
