//! Financial data: market random walks and scripted transactions.
//!
//! Stocks walk at ~0.1% per 5-minute step but only while the market is open
//! (09:30-16:00); crypto walks around the clock at higher volatility. A
//! scripted transaction list anchored to meal and commute times drives a
//! sliding window of the three most recent settled transactions, the account
//! balance, and the spend-vs-budget line. Markets don't know anyone
//! collapsed, so everything keeps moving through the crisis.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::error::GeneratorError;
use crate::generator::modules::{fractional_hour, round2, ModuleGenerator};
use crate::generator::rng::RngStream;
use crate::generator::schedule::PersonSchedule;
use crate::models::scenario::{
    CryptoQuote, FinancialData, PendingCharge, StockQuote, Transaction,
};

/// Stock watchlist with plausible 2027-era base prices: blue chip, biotech
/// micro-cap, mid-caps, small-cap fintech.
const STOCKS: [(&str, f64); 5] = [
    ("AAPL", 245.0),
    ("SAVA", 28.0),
    ("AXON", 420.0),
    ("PLTR", 55.0),
    ("SOFI", 18.0),
];

/// Single crypto asset; a BTC+ETH pair moving in lockstep reads synthetic.
const CRYPTO: [(&str, f64); 1] = [("SOL", 250.0)];

const MARKET_OPEN_HOUR: f64 = 9.5;
const MARKET_CLOSE_HOUR: f64 = 16.0;

/// Per-step volatilities.
const STOCK_SIGMA: f64 = 0.001;
const CRYPTO_SIGMA: f64 = 0.0035;

/// Today's scripted transactions: (HH, MM, counterparty, amount, category).
const TRANSACTIONS: [(u32, u32, &str, f64, &str); 5] = [
    (6, 50, "Starbucks", -5.75, "food_and_drink"),
    (7, 5, "MTA MetroCard", -2.90, "transportation"),
    (10, 20, "Duane Reade", -8.47, "health_and_beauty"),
    (12, 35, "Bibimbap House", -18.50, "food_and_drink"),
    (13, 45, "Amazon", -34.99, "shopping"),
];

/// Yesterday's tail, visible until today's purchases push it out.
const YESTERDAY: [(&str, f64, &str); 3] = [
    ("Whole Foods Market", -67.43, "groceries"),
    ("Con Edison", -142.30, "utilities"),
    ("Spotify Premium", -10.99, "subscription"),
];

/// Pending charges: (merchant, amount, settle hour or None to stay pending).
const PENDING: [(&str, f64, Option<f64>); 2] = [
    ("Netflix", 15.99, None),
    ("Spotify Premium", 10.99, Some(10.0)),
];

const STARTING_BALANCE: f64 = 4850.00;
const MONTHLY_BUDGET: f64 = 2500.00;
const PRIOR_MONTH_SPENDING: f64 = 735.00;

#[derive(Debug, Default)]
pub struct FinancialGenerator {
    stock_prices: Vec<f64>,
    crypto_prices: Vec<f64>,
    transactions: Vec<(DateTime<Utc>, Transaction)>,
    settled: Vec<Transaction>,
    next_tx: usize,
    balance: f64,
    spent_today: f64,
    initialized: bool,
}

impl FinancialGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn init_once(&mut self, schedule: &PersonSchedule) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.stock_prices = STOCKS.iter().map(|&(_, base)| base).collect();
        self.crypto_prices = CRYPTO.iter().map(|&(_, base)| base).collect();
        self.balance = STARTING_BALANCE;
        self.settled = YESTERDAY
            .iter()
            .map(|&(counterparty, amount, category)| Transaction {
                counterparty: counterparty.to_string(),
                amount,
                category: category.to_string(),
            })
            .collect();

        let date = schedule.scenario_date;
        for (h, m, counterparty, amount, category) in TRANSACTIONS {
            let dt = Utc.from_utc_datetime(
                &date.and_time(NaiveTime::from_hms_opt(h, m, 0).expect("static time")),
            );
            self.transactions.push((
                dt,
                Transaction {
                    counterparty: counterparty.to_string(),
                    amount,
                    category: category.to_string(),
                },
            ));
        }
    }
}

impl ModuleGenerator for FinancialGenerator {
    type Output = FinancialData;

    fn generate(
        &mut self,
        schedule: &PersonSchedule,
        _heartbeat_id: u32,
        timestamp: DateTime<Utc>,
        rng: &mut RngStream,
    ) -> Result<FinancialData, GeneratorError> {
        self.init_once(schedule);

        let hour = fractional_hour(timestamp);
        let market_open = (MARKET_OPEN_HOUR..MARKET_CLOSE_HOUR).contains(&hour);

        // Fixed draw budget: 5 stock walks + 1 crypto walk (two draws each)
        // plus 2 spares = 14 per heartbeat. Walks are drawn even when the
        // market is closed; the step is just not applied.
        for price in self.stock_prices.iter_mut() {
            let step = rng.gauss(0.0, STOCK_SIGMA);
            if market_open {
                *price = round2(*price * (1.0 + step));
            }
        }
        for price in self.crypto_prices.iter_mut() {
            let step = rng.gauss(0.0, CRYPTO_SIGMA);
            *price = round2(*price * (1.0 + step));
        }
        let _ = rng.uniform();
        let _ = rng.uniform();

        // Settle any scripted transactions that have occurred by now.
        while self.next_tx < self.transactions.len() {
            let (tx_time, ref tx) = self.transactions[self.next_tx];
            if tx_time > timestamp {
                break;
            }
            self.balance += tx.amount;
            self.spent_today += tx.amount.abs();
            self.settled.push(tx.clone());
            self.next_tx += 1;
        }

        let last_3_transactions = self
            .settled
            .iter()
            .rev()
            .take(3)
            .rev()
            .cloned()
            .collect();

        let stock_watchlist = STOCKS
            .iter()
            .zip(&self.stock_prices)
            .map(|(&(symbol, _), &price)| StockQuote {
                symbol: symbol.to_string(),
                price,
            })
            .collect();
        let crypto_watchlist = CRYPTO
            .iter()
            .zip(&self.crypto_prices)
            .map(|(&(symbol, _), &price)| CryptoQuote {
                symbol: symbol.to_string(),
                price,
            })
            .collect();

        let pending_charges = PENDING
            .iter()
            .filter(|&&(_, _, settle)| settle.map_or(true, |s| hour < s))
            .map(|&(merchant, amount, _)| PendingCharge {
                merchant: merchant.to_string(),
                amount,
            })
            .collect();

        let total_month = PRIOR_MONTH_SPENDING + self.spent_today;
        let pct = total_month / MONTHLY_BUDGET * 100.0;
        let spending_vs_budget = format!(
            "${total_month:.0} of ${MONTHLY_BUDGET:.0} monthly budget ({pct:.0}%)"
        );

        Ok(FinancialData {
            last_3_transactions,
            account_balance: round2(self.balance),
            pending_charges,
            stock_watchlist,
            crypto_watchlist,
            spending_vs_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::schedule::cardiac_arrest_blocks;

    fn schedule() -> PersonSchedule {
        PersonSchedule::new(cardiac_arrest_blocks(), PersonSchedule::default_date()).unwrap()
    }

    fn at(sched: &PersonSchedule, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &sched
                .scenario_date
                .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap()),
        )
    }

    #[test]
    fn stocks_freeze_outside_market_hours() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = FinancialGenerator::new();
        let early_a = gen.generate(&sched, 0, at(&sched, 7, 0), &mut rng).unwrap();
        let early_b = gen.generate(&sched, 1, at(&sched, 7, 5), &mut rng).unwrap();
        assert_eq!(early_a.stock_watchlist, early_b.stock_watchlist);

        let open_a = gen.generate(&sched, 2, at(&sched, 10, 0), &mut rng).unwrap();
        let open_b = gen.generate(&sched, 3, at(&sched, 10, 5), &mut rng).unwrap();
        assert_ne!(open_a.stock_watchlist, open_b.stock_watchlist);
    }

    #[test]
    fn crypto_trades_around_the_clock() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = FinancialGenerator::new();
        let a = gen.generate(&sched, 0, at(&sched, 7, 0), &mut rng).unwrap();
        let b = gen.generate(&sched, 1, at(&sched, 7, 5), &mut rng).unwrap();
        assert_ne!(a.crypto_watchlist[0].price, b.crypto_watchlist[0].price);
    }

    #[test]
    fn transactions_slide_and_decrement_the_balance() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = FinancialGenerator::new();

        let before = gen.generate(&sched, 0, at(&sched, 6, 45), &mut rng).unwrap();
        assert_eq!(before.account_balance, STARTING_BALANCE);
        assert_eq!(before.last_3_transactions[0].counterparty, "Whole Foods Market");

        let after = gen.generate(&sched, 1, at(&sched, 6, 55), &mut rng).unwrap();
        assert_eq!(after.account_balance, STARTING_BALANCE - 5.75);
        assert_eq!(after.last_3_transactions[2].counterparty, "Starbucks");

        let lunchtime = gen.generate(&sched, 2, at(&sched, 12, 40), &mut rng).unwrap();
        assert_eq!(lunchtime.last_3_transactions[2].counterparty, "Bibimbap House");
        assert!(lunchtime.account_balance < after.account_balance);
    }

    #[test]
    fn pending_charge_settles_mid_morning() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = FinancialGenerator::new();
        let early = gen.generate(&sched, 0, at(&sched, 9, 0), &mut rng).unwrap();
        assert_eq!(early.pending_charges.len(), 2);
        let later = gen.generate(&sched, 1, at(&sched, 10, 5), &mut rng).unwrap();
        assert_eq!(later.pending_charges.len(), 1);
        assert_eq!(later.pending_charges[0].merchant, "Netflix");
    }

    #[test]
    fn budget_summary_tracks_todays_spending() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = FinancialGenerator::new();
        let morning = gen.generate(&sched, 0, at(&sched, 6, 30), &mut rng).unwrap();
        assert!(morning.spending_vs_budget.starts_with("$735 of $2500"));
        let evening = gen.generate(&sched, 1, at(&sched, 14, 0), &mut rng).unwrap();
        assert!(evening.spending_vs_budget.starts_with("$806 of $2500"), "{}", evening.spending_vs_budget);
    }

    #[test]
    fn walks_continue_through_the_crisis() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = FinancialGenerator::new();
        let a = gen.generate(&sched, 0, at(&sched, 18, 10), &mut rng).unwrap();
        let b = gen.generate(&sched, 1, at(&sched, 18, 15), &mut rng).unwrap();
        assert_ne!(a.crypto_watchlist[0].price, b.crypto_watchlist[0].price);
    }
}
