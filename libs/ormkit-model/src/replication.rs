//! Replication policy composed into a model at construction time.
//!
//! The model never grows or swaps methods at runtime: when replicas are
//! configured it simply holds a [`ReplicationPolicy`] value that picks the
//! reader connection for each read, and the writer spec is used otherwise.

use crate::connect_info::ConnectionSpec;
use crate::{ModelError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// How the next reader connection is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStrategy {
    /// Always the first configured reader.
    #[default]
    First,
    /// Cycle through readers in configuration order.
    RoundRobin,
    /// Uniform random pick.
    Random,
}

/// Read/write split policy held by the model when replication is configured.
#[derive(Debug)]
pub struct ReplicationPolicy {
    readers: Vec<ConnectionSpec>,
    balance: BalanceStrategy,
    next: AtomicUsize,
}

impl ReplicationPolicy {
    /// Build a policy over the given reader specs.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` when `readers` is empty.
    pub fn new(readers: Vec<ConnectionSpec>, balance: BalanceStrategy) -> Result<Self> {
        if readers.is_empty() {
            return Err(ModelError::InvalidConfig(
                "replication requires at least one reader".to_owned(),
            ));
        }
        Ok(Self {
            readers,
            balance,
            next: AtomicUsize::new(0),
        })
    }

    #[must_use]
    pub fn balance(&self) -> BalanceStrategy {
        self.balance
    }

    #[must_use]
    pub fn readers(&self) -> &[ConnectionSpec] {
        &self.readers
    }

    /// Pick the reader spec for the next read operation.
    #[must_use]
    pub fn next_reader(&self) -> &ConnectionSpec {
        let idx = match self.balance {
            BalanceStrategy::First => 0,
            BalanceStrategy::RoundRobin => {
                self.next.fetch_add(1, Ordering::Relaxed) % self.readers.len()
            }
            BalanceStrategy::Random => rand::rng().random_range(0..self.readers.len()),
        };
        &self.readers[idx]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn reader(dsn: &str) -> ConnectionSpec {
        ConnectionSpec {
            dsn: dsn.to_owned(),
            ..ConnectionSpec::default()
        }
    }

    #[test]
    fn empty_readers_rejected() {
        let err = ReplicationPolicy::new(Vec::new(), BalanceStrategy::First).unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig(_)));
    }

    #[test]
    fn first_always_picks_head() {
        let policy = ReplicationPolicy::new(
            vec![reader("sqlite://r0"), reader("sqlite://r1")],
            BalanceStrategy::First,
        )
        .unwrap();

        for _ in 0..5 {
            assert_eq!(policy.next_reader().dsn, "sqlite://r0");
        }
    }

    #[test]
    fn round_robin_cycles_in_order() {
        let policy = ReplicationPolicy::new(
            vec![
                reader("sqlite://r0"),
                reader("sqlite://r1"),
                reader("sqlite://r2"),
            ],
            BalanceStrategy::RoundRobin,
        )
        .unwrap();

        let picks: Vec<_> = (0..6).map(|_| policy.next_reader().dsn.clone()).collect();
        assert_eq!(
            picks,
            [
                "sqlite://r0",
                "sqlite://r1",
                "sqlite://r2",
                "sqlite://r0",
                "sqlite://r1",
                "sqlite://r2"
            ]
        );
    }

    #[test]
    fn random_stays_in_range() {
        let readers = vec![reader("sqlite://r0"), reader("sqlite://r1")];
        let dsns: Vec<_> = readers.iter().map(|r| r.dsn.clone()).collect();
        let policy = ReplicationPolicy::new(readers, BalanceStrategy::Random).unwrap();

        for _ in 0..50 {
            assert!(dsns.contains(&policy.next_reader().dsn));
        }
    }
}
