use crate::Transaction;

/// Transactions waiting for the next mined block, in submission order.
#[derive(Clone, Debug, Default)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, party_a: impl Into<String>, party_b: impl Into<String>) {
        self.pending.push(Transaction::new(party_a, party_b));
    }

    /// Removes and returns every pending transaction.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    /// Puts drained transactions back in front of anything submitted since.
    pub(crate) fn requeue(&mut self, mut transactions: Vec<Transaction>) {
        transactions.append(&mut self.pending);
        self.pending = transactions;
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.pending.clone()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
