//! The sales-tax lookup collaborator.
//!
//! A lookup resolves a two-letter state code to a [`TaxQuote`]. The quote's
//! `rate` is untrusted: its unit depends on the provider, so callers must run
//! it through [`normalize_tax_rate`](super::normalize::normalize_tax_rate).

use std::future::{self, Future};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::LoanCalcResult;

/// Where a tax quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxSource {
    Static,
    Taxjar,
    None,
}

/// A provider's answer for one state, in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxQuote {
    /// Raw rate, either a decimal fraction or a percent.
    pub rate: f64,
    pub source: TaxSource,
    pub updated_at: DateTime<Utc>,
}

/// Resolves a state code to a sales-tax quote.
///
/// Implementations own any I/O, timeout and cancellation policy. A failed
/// lookup is reported as `Err` and never retried by the caller.
pub trait TaxLookup {
    fn lookup(&self, state_code: &str) -> impl Future<Output = LoanCalcResult<TaxQuote>> + Send;
}

/// Lookup that always answers with a zero rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTaxLookup;

impl TaxLookup for NoTaxLookup {
    fn lookup(&self, _state_code: &str) -> impl Future<Output = LoanCalcResult<TaxQuote>> + Send {
        future::ready(Ok(TaxQuote {
            rate: 0.0,
            source: TaxSource::None,
            updated_at: Utc::now(),
        }))
    }
}

/// Adapter turning an async closure into a [`TaxLookup`].
#[derive(Clone)]
pub struct FnTaxLookup<F>(F);

/// Wrap `f` so it can be passed wherever a [`TaxLookup`] is expected.
pub fn lookup_fn<F, Fut>(f: F) -> FnTaxLookup<F>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = LoanCalcResult<TaxQuote>> + Send,
{
    FnTaxLookup(f)
}

impl<F, Fut> TaxLookup for FnTaxLookup<F>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = LoanCalcResult<TaxQuote>> + Send,
{
    fn lookup(&self, state_code: &str) -> impl Future<Output = LoanCalcResult<TaxQuote>> + Send {
        (self.0)(state_code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanCalcError;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_no_tax_lookup_is_zero() {
        let quote = NoTaxLookup.lookup("CA").await.unwrap();
        assert_eq!(quote.rate, 0.0);
        assert_eq!(quote.source, TaxSource::None);
    }

    #[tokio::test]
    async fn test_lookup_fn_passes_state_code() {
        let lookup = lookup_fn(|state: String| async move {
            if state == "WA" {
                Ok(TaxQuote {
                    rate: 0.065,
                    source: TaxSource::Taxjar,
                    updated_at: Utc::now(),
                })
            } else {
                Err(LoanCalcError::TaxLookup {
                    state_code: state,
                    reason: "unsupported".into(),
                })
            }
        });
        assert_eq!(lookup.lookup("WA").await.unwrap().rate, 0.065);
        assert!(lookup.lookup("ZZ").await.is_err());
    }

    #[test]
    fn test_quote_wire_shape() {
        let json = r#"{"rate":6.5,"source":"static","updatedAt":"2024-01-15T00:00:00Z"}"#;
        let quote: TaxQuote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.rate, 6.5);
        assert_eq!(quote.source, TaxSource::Static);
        let back = serde_json::to_value(&quote).unwrap();
        assert_eq!(back["source"], "static");
        assert!(back.get("updatedAt").is_some());
    }
}
