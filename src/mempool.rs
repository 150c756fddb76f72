//! Pending work waiting to be sealed into a block.

use crate::certificate::TaskCertificate;
use crate::transaction::Transaction;
use std::collections::VecDeque;

/// Pending transactions plus the FIFO queue of task certificates.
///
/// Both queues are unbounded. Sealing drains every transaction but only the
/// oldest certificates, up to the per-block requirement.
#[derive(Debug, Clone, Default)]
pub struct PendingPool {
    transactions: Vec<Transaction>,
    certificates: VecDeque<TaskCertificate>,
}

impl PendingPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn push_certificate(&mut self, cert: TaskCertificate) {
        self.certificates.push_back(cert);
    }

    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn certificates(&self) -> impl Iterator<Item = &TaskCertificate> {
        self.certificates.iter()
    }

    /// Remove the most recently queued transaction.
    pub fn pop_transaction(&mut self) -> Option<Transaction> {
        self.transactions.pop()
    }

    /// Drain every pending transaction in submission order.
    pub fn take_transactions(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    /// Remove the `count` oldest certificates, or all of them if fewer are queued.
    pub fn take_certificates(&mut self, count: usize) -> Vec<TaskCertificate> {
        let count = count.min(self.certificates.len());
        self.certificates.drain(..count).collect()
    }

    /// Put previously taken items back at the front of their queues, ahead of
    /// anything submitted since they were taken.
    pub fn restore(&mut self, mut transactions: Vec<Transaction>, certificates: Vec<TaskCertificate>) {
        transactions.append(&mut self.transactions);
        self.transactions = transactions;

        for cert in certificates.into_iter().rev() {
            self.certificates.push_front(cert);
        }
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }
}
