//! User transaction log, notes and average-cost position summaries
//!
//! Cost basis follows the simple average-cost model: buys blend into the
//! average, sells reduce the share count at the current average.

use crate::error::{ChartError, Result};
use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A buy or sell the user logged against a ticker.
///
/// Deserialized records pass the same checks as [`Transaction::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    pub id: Uuid,
    pub symbol: String,
    pub side: TradeSide,
    pub shares: f64,
    pub price: f64,
    pub date: NaiveDate,
}

impl Transaction {
    /// Create a new transaction, rejecting non-positive shares or price
    pub fn new(
        symbol: impl Into<String>,
        side: TradeSide,
        shares: f64,
        price: f64,
        date: NaiveDate,
    ) -> Result<Self> {
        TransactionRecord {
            id: None,
            symbol: symbol.into(),
            side,
            shares,
            price,
            date,
        }
        .try_into()
    }

    /// Get total transaction value (price * shares)
    pub fn value(&self) -> f64 {
        self.price * self.shares
    }

    pub fn is_buy(&self) -> bool {
        matches!(self.side, TradeSide::Buy)
    }
}

/// Transaction as stored; the id is generated when absent
#[derive(Debug, Clone, Deserialize)]
struct TransactionRecord {
    #[serde(default)]
    id: Option<Uuid>,
    symbol: String,
    side: TradeSide,
    shares: f64,
    price: f64,
    date: NaiveDate,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = ChartError;

    fn try_from(record: TransactionRecord) -> Result<Self> {
        if !(record.shares > 0.0) || !(record.price > 0.0) {
            return Err(ChartError::InvalidParameter(format!(
                "shares and price must be positive, got {} @ {}",
                record.shares, record.price
            )));
        }
        let symbol = record.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ChartError::InvalidParameter(
                "transaction symbol must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            symbol,
            side: record.side,
            shares: record.shares,
            price: record.price,
            date: record.date,
        })
    }
}

/// Free-text note pinned to a ticker at a price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub symbol: String,
    pub price: f64,
    pub content: String,
    pub date: NaiveDate,
}

impl Note {
    pub fn new(symbol: impl Into<String>, price: f64, content: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into().to_uppercase(),
            price,
            content: content.into(),
            date,
        }
    }
}

/// Share counts of the quick dollar-cost-averaging table
pub const DCA_QUICK_AMOUNTS: [f64; 5] = [1.0, 5.0, 10.0, 50.0, 100.0];

/// Position after hypothetically buying more shares at one price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcaProjection {
    pub additional_shares: f64,
    pub price: f64,
    pub total_shares: f64,
    pub new_avg_cost: f64,
    /// Market value of the enlarged position at `price`
    pub total_value: f64,
}

/// Open position in one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub symbol: String,
    pub total_shares: f64,
    pub avg_cost: f64,
    pub total_cost: f64,
}

impl PortfolioSummary {
    fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            total_shares: 0.0,
            avg_cost: 0.0,
            total_cost: 0.0,
        }
    }

    fn apply(&mut self, tx: &Transaction) {
        match tx.side {
            TradeSide::Buy => {
                self.total_cost += tx.value();
                self.total_shares += tx.shares;
                self.avg_cost = if self.total_shares > 0.0 {
                    self.total_cost / self.total_shares
                } else {
                    0.0
                };
            }
            TradeSide::Sell => {
                self.total_shares -= tx.shares;
                self.total_cost = self.total_shares * self.avg_cost;
            }
        }
    }

    /// Market value of the position at `price`
    pub fn market_value(&self, price: f64) -> f64 {
        self.total_shares * price
    }

    /// Average cost and value after buying `shares` more at `price`.
    ///
    /// A position that would hold no shares divides by 1.
    pub fn with_additional(&self, shares: f64, price: f64) -> DcaProjection {
        let total_shares = self.total_shares + shares;
        let divisor = if total_shares == 0.0 { 1.0 } else { total_shares };

        DcaProjection {
            additional_shares: shares,
            price,
            total_shares,
            new_avg_cost: (self.total_shares * self.avg_cost + shares * price) / divisor,
            total_value: total_shares * price,
        }
    }

    /// [`Self::with_additional`] for each of [`DCA_QUICK_AMOUNTS`]
    pub fn dca_table(&self, price: f64) -> Vec<DcaProjection> {
        DCA_QUICK_AMOUNTS
            .iter()
            .map(|&n| self.with_additional(n, price))
            .collect()
    }

    /// Unrealized gain at `price`, in percent of cost
    pub fn unrealized_percent(&self, price: f64) -> Option<f64> {
        if self.avg_cost > 0.0 {
            Some((price - self.avg_cost) / self.avg_cost * 100.0)
        } else {
            None
        }
    }
}

/// Replay transactions in order and return open positions sorted by symbol
pub fn summarize(transactions: &[Transaction]) -> Vec<PortfolioSummary> {
    let mut summaries: HashMap<&str, PortfolioSummary> = HashMap::new();

    for tx in transactions {
        summaries
            .entry(tx.symbol.as_str())
            .or_insert_with(|| PortfolioSummary::empty(&tx.symbol))
            .apply(tx);
    }

    let mut open: Vec<PortfolioSummary> = summaries
        .into_values()
        .filter(|s| s.total_shares > 0.0)
        .collect();
    open.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    open
}

/// Position in `symbol`, or an empty summary when none is open
pub fn summary_for(transactions: &[Transaction], symbol: &str) -> PortfolioSummary {
    let symbol = symbol.to_uppercase();
    summarize(transactions)
        .into_iter()
        .find(|s| s.symbol == symbol)
        .unwrap_or_else(|| PortfolioSummary::empty(&symbol))
}
