//! Table-backed tax lookup used when no live provider is configured.
//!
//! The built-in table holds state-level base sales-tax rates as percents.
//! Local add-on rates are not included.

use std::collections::BTreeMap;
use std::future::{self, Future};

use chrono::{DateTime, Utc};

use super::lookup::{TaxLookup, TaxQuote, TaxSource};
use crate::error::LoanCalcError;
use crate::LoanCalcResult;

const BASE_STATE_RATES_PCT: &[(&str, f64)] = &[
    ("AL", 4.0),
    ("AK", 0.0),
    ("AZ", 5.6),
    ("AR", 6.5),
    ("CA", 7.25),
    ("CO", 2.9),
    ("CT", 6.35),
    ("DC", 6.0),
    ("DE", 0.0),
    ("FL", 6.0),
    ("GA", 4.0),
    ("HI", 4.0),
    ("IA", 6.0),
    ("ID", 6.0),
    ("IL", 6.25),
    ("IN", 7.0),
    ("KS", 6.5),
    ("KY", 6.0),
    ("LA", 4.45),
    ("MA", 6.25),
    ("MD", 6.0),
    ("ME", 5.5),
    ("MI", 6.0),
    ("MN", 6.875),
    ("MO", 4.225),
    ("MS", 7.0),
    ("MT", 0.0),
    ("NC", 4.75),
    ("ND", 5.0),
    ("NE", 5.5),
    ("NH", 0.0),
    ("NJ", 6.625),
    ("NM", 4.875),
    ("NV", 6.85),
    ("NY", 4.0),
    ("OH", 5.75),
    ("OK", 4.5),
    ("OR", 0.0),
    ("PA", 6.0),
    ("RI", 7.0),
    ("SC", 6.0),
    ("SD", 4.2),
    ("TN", 7.0),
    ("TX", 6.25),
    ("UT", 6.1),
    ("VA", 5.3),
    ("VT", 6.0),
    ("WA", 6.5),
    ("WI", 5.0),
    ("WV", 6.0),
    ("WY", 4.0),
];

/// Tax lookup answering from an in-memory state table.
#[derive(Debug, Clone)]
pub struct StaticTaxRates {
    rates: BTreeMap<String, f64>,
    updated_at: DateTime<Utc>,
}

impl StaticTaxRates {
    /// Build from `(state_code, rate)` pairs. Codes are upper-cased.
    pub fn new<I, S>(rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self {
            rates: rates
                .into_iter()
                .map(|(code, rate)| (canonical_code(code.as_ref()), rate))
                .collect(),
            updated_at: Utc::now(),
        }
    }

    /// Parse a `{ "CA": 7.25, ... }` table.
    pub fn from_json(json: &str) -> LoanCalcResult<Self> {
        let rates: BTreeMap<String, f64> = serde_json::from_str(json)?;
        Ok(Self::new(rates))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    fn quote(&self, state_code: &str) -> LoanCalcResult<TaxQuote> {
        let code = canonical_code(state_code);
        match self.rates.get(&code) {
            Some(rate) => Ok(TaxQuote {
                rate: *rate,
                source: TaxSource::Static,
                updated_at: self.updated_at,
            }),
            None => Err(LoanCalcError::TaxLookup {
                state_code: code,
                reason: "no rate on file for state".into(),
            }),
        }
    }
}

impl Default for StaticTaxRates {
    fn default() -> Self {
        Self::new(BASE_STATE_RATES_PCT.iter().copied())
    }
}

impl TaxLookup for StaticTaxRates {
    fn lookup(&self, state_code: &str) -> impl Future<Output = LoanCalcResult<TaxQuote>> + Send {
        future::ready(self.quote(state_code))
    }
}

fn canonical_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
