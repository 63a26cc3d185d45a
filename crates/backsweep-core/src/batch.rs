//! Tick batch: the canonical columnar unit crossing every internal boundary.

use crate::fixed_point::to_real;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling or validating a [`TickBatch`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("batch has no rows")]
    Empty,
    #[error(
        "column length mismatch: ts_exchange={ts} price={price} qty={qty} side={side} symbol_id={symbol_id}"
    )]
    LengthMismatch {
        ts: usize,
        price: usize,
        qty: usize,
        side: usize,
        symbol_id: usize,
    },
    #[error("side column value {0} is not in {{+1, -1}}")]
    InvalidSide(i8),
    #[error("price column value {0} is negative")]
    NegativePrice(i64),
    #[error("qty column value {0} is negative")]
    NegativeQty(i64),
}

/// A block of ticks delivered as equal-length column arrays: `ts_exchange`
/// (ns, non-decreasing), `price`/`qty` (fixed-point, scale 10^8), `side`
/// (+1 taker-buy / -1 taker-sell), `symbol_id` (0 for single-asset runs).
///
/// Immutable once constructed — every field is validated against the §3
/// invariants at construction time, so consumers never re-check them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickBatch {
    ts_exchange: Vec<i64>,
    price: Vec<i64>,
    qty: Vec<i64>,
    side: Vec<i8>,
    symbol_id: Vec<i64>,
}

impl TickBatch {
    pub fn new(
        ts_exchange: Vec<i64>,
        price: Vec<i64>,
        qty: Vec<i64>,
        side: Vec<i8>,
        symbol_id: Vec<i64>,
    ) -> Result<Self, BatchError> {
        let len = ts_exchange.len();
        if len == 0 {
            return Err(BatchError::Empty);
        }
        if price.len() != len || qty.len() != len || side.len() != len || symbol_id.len() != len {
            return Err(BatchError::LengthMismatch {
                ts: len,
                price: price.len(),
                qty: qty.len(),
                side: side.len(),
                symbol_id: symbol_id.len(),
            });
        }
        if let Some(&s) = side.iter().find(|&&s| s != 1 && s != -1) {
            return Err(BatchError::InvalidSide(s));
        }
        if let Some(&p) = price.iter().find(|&&p| p < 0) {
            return Err(BatchError::NegativePrice(p));
        }
        if let Some(&q) = qty.iter().find(|&&q| q < 0) {
            return Err(BatchError::NegativeQty(q));
        }
        Ok(Self {
            ts_exchange,
            price,
            qty,
            side,
            symbol_id,
        })
    }

    /// Number of rows in this batch. Always > 0.
    pub fn len(&self) -> usize {
        self.ts_exchange.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn ts_exchange(&self) -> &[i64] {
        &self.ts_exchange
    }

    pub fn price_raw(&self) -> &[i64] {
        &self.price
    }

    pub fn qty_raw(&self) -> &[i64] {
        &self.qty
    }

    pub fn sides(&self) -> &[i8] {
        &self.side
    }

    pub fn symbol_id(&self) -> &[i64] {
        &self.symbol_id
    }

    /// Decode the `price` column into real values (real = value / 10^8).
    pub fn decode_prices(&self) -> Vec<f64> {
        self.price.iter().copied().map(to_real).collect()
    }

    /// Decode the `qty` column into real values (real = value / 10^8).
    pub fn decode_qtys(&self) -> Vec<f64> {
        self.qty.iter().copied().map(to_real).collect()
    }

    /// First timestamp in the batch, used to check cross-batch monotonicity.
    pub fn first_ts(&self) -> i64 {
        self.ts_exchange[0]
    }

    /// Last timestamp in the batch, used to check cross-batch monotonicity.
    pub fn last_ts(&self) -> i64 {
        self.ts_exchange[self.ts_exchange.len() - 1]
    }
}

/// Accumulates rows during CSV transformation before being frozen into a
/// validated [`TickBatch`]. Kept separate from `TickBatch` itself so the
/// streamer can push raw rows without re-validating on every push.
#[derive(Debug, Default)]
pub struct TickBatchBuilder {
    ts_exchange: Vec<i64>,
    price: Vec<i64>,
    qty: Vec<i64>,
    side: Vec<i8>,
    symbol_id: Vec<i64>,
}

impl TickBatchBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            ts_exchange: Vec::with_capacity(cap),
            price: Vec::with_capacity(cap),
            qty: Vec::with_capacity(cap),
            side: Vec::with_capacity(cap),
            symbol_id: Vec::with_capacity(cap),
        }
    }

    pub fn push(&mut self, ts_exchange: i64, price: i64, qty: i64, side: i8, symbol_id: i64) {
        self.ts_exchange.push(ts_exchange);
        self.price.push(price);
        self.qty.push(qty);
        self.side.push(side);
        self.symbol_id.push(symbol_id);
    }

    pub fn len(&self) -> usize {
        self.ts_exchange.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ts_exchange.is_empty()
    }

    pub fn build(self) -> Result<TickBatch, BatchError> {
        TickBatch::new(
            self.ts_exchange,
            self.price,
            self.qty,
            self.side,
            self.symbol_id,
        )
    }
}
