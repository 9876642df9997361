//! Bounded transaction pool
//!
//! The single synchronization point of the system: producers append
//! transactions until the pool reaches its capacity, at which point the
//! waiting miner takes the entire batch atomically. Producers and the
//! miner rendezvous only through pool fullness; there are no timeouts on
//! either side, so an unfilled pool blocks the miner indefinitely.

use std::mem;
use std::sync::{Condvar, Mutex};

use log::debug;

use crate::core::transaction::Transaction;

/// Default transactions per batch
pub const DEFAULT_BATCH_CAPACITY: usize = 4;

/// Bounded buffer releasing exactly one full batch per fill
#[derive(Debug)]
pub struct TransactionPool {
    transactions: Mutex<Vec<Transaction>>,
    /// Signals the consumer that the pool reached capacity
    batch_ready: Condvar,
    /// Signals producers that the pool was drained
    space_free: Condvar,
    capacity: usize,
}

impl TransactionPool {
    /// Create a pool releasing batches of exactly `capacity` transactions
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "batch capacity must be positive");
        Self {
            transactions: Mutex::new(Vec::with_capacity(capacity)),
            batch_ready: Condvar::new(),
            space_free: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.transactions.lock().expect("pool lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a transaction, blocking while the pool is full. Filling the
    /// pool to capacity wakes exactly one waiting consumer.
    pub fn put(&self, tx: Transaction) {
        let mut transactions = self.transactions.lock().expect("pool lock poisoned");

        while transactions.len() == self.capacity {
            transactions = self
                .space_free
                .wait(transactions)
                .expect("pool lock poisoned");
        }

        transactions.push(tx);
        debug!("pool at {}/{}", transactions.len(), self.capacity);

        if transactions.len() == self.capacity {
            self.batch_ready.notify_one();
        }
    }

    /// Block until the pool is at capacity, then atomically take the
    /// whole batch, leaving the pool empty. No put can interleave into a
    /// batch being drained: the pool lock is held across the take.
    pub fn drain_full(&self) -> Vec<Transaction> {
        let mut transactions = self.transactions.lock().expect("pool lock poisoned");

        while transactions.len() < self.capacity {
            transactions = self
                .batch_ready
                .wait(transactions)
                .expect("pool lock poisoned");
        }

        let batch = mem::take(&mut *transactions);
        self.space_free.notify_all();
        batch
    }
}
