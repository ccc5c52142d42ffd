use chrono::Utc;
use loan_calc_core::loan::details::{compute_loan_details, compute_with_quote, LoanRequest};
use loan_calc_core::tax::lookup::{lookup_fn, NoTaxLookup, TaxQuote, TaxSource};
use loan_calc_core::tax::static_rates::StaticTaxRates;
use loan_calc_core::LoanCalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};

fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tol,
        "{}: expected ~{}, got {} (diff = {})",
        msg,
        expected,
        actual,
        diff
    );
}

fn car_loan(state: &str) -> LoanRequest {
    LoanRequest {
        property_value: Some(dec!(30_000)),
        state_code: Some(state.into()),
        include_sales_tax: true,
        ..LoanRequest::new(dec!(30_000), dec!(6.5), 5)
    }
}

// ===========================================================================
// Standard mortgage scenarios
// ===========================================================================

#[tokio::test]
async fn test_conventional_30y_no_tax() {
    let req = LoanRequest {
        property_value: Some(dec!(250_000)),
        ..LoanRequest::new(dec!(200_000), dec!(5), 30)
    };
    let out = compute_loan_details(&req, &NoTaxLookup).await.unwrap();
    let details = &out.result;

    assert_close(details.results.monthly_payment, dec!(1073.64), dec!(0.01), "P&I");
    assert_eq!(details.schedule.len(), 360);
    // Full-precision payment. The cent-rounded 1073.64 * 360 gives 186,510.40.
    assert_close(details.results.total_interest, dec!(186_511.57), dec!(0.01), "total interest");
    assert_eq!(details.loan_info.ltv, dec!(0.8));
    assert!(!details.loan_info.pmi_required);
    assert_eq!(details.results.monthly_pmi, Decimal::ZERO);
    assert_eq!(details.results.pmi_drop_off_month, None);
    assert_eq!(details.results.total_pmi_paid, Decimal::ZERO);
    assert_eq!(details.loan_info.down_payment, dec!(50_000));
    assert_eq!(
        details.results.total_paid,
        details.schedule.iter().map(|e| e.payment_amount).sum::<Decimal>()
    );
}

#[tokio::test]
async fn test_high_ltv_requires_pmi() {
    let req = LoanRequest {
        property_value: Some(dec!(500_000)),
        monthly_insurance: dec!(125),
        ..LoanRequest::new(dec!(450_000), dec!(6), 30)
    };
    let out = compute_loan_details(&req, &NoTaxLookup).await.unwrap();
    let info = &out.result.loan_info;
    let results = &out.result.results;

    assert_eq!(info.ltv, dec!(0.9));
    assert!(info.pmi_required);
    assert_eq!(results.monthly_pmi, dec!(300));

    let month = results.pmi_drop_off_month.unwrap();
    assert!(month > 0 && month < 360);
    assert_eq!(month, 103);
    assert_eq!(results.total_pmi_paid, dec!(300) * Decimal::from(month));

    assert_eq!(
        results.total_monthly_payment,
        results.monthly_payment + dec!(300) + dec!(125)
    );
    assert!(out.warnings.iter().any(|w| w.contains("PMI")));
}

#[tokio::test]
async fn test_zero_pmi_rate_skips_drop_off() {
    let req = LoanRequest {
        property_value: Some(dec!(500_000)),
        pmi_rate: Decimal::ZERO,
        ..LoanRequest::new(dec!(450_000), dec!(6), 30)
    };
    let out = compute_loan_details(&req, &NoTaxLookup).await.unwrap();
    assert!(out.result.loan_info.pmi_required);
    assert_eq!(out.result.results.monthly_pmi, Decimal::ZERO);
    assert_eq!(out.result.results.pmi_drop_off_month, None);
    assert_eq!(out.result.results.total_pmi_paid, Decimal::ZERO);
}

// ===========================================================================
// Sales tax enrichment
// ===========================================================================

#[tokio::test]
async fn test_static_percent_rate_is_financed() {
    let out = compute_loan_details(&car_loan("CA"), &StaticTaxRates::default())
        .await
        .unwrap();
    let info = &out.result.loan_info;
    assert_eq!(info.tax_rate, dec!(0.0725));
    assert_eq!(info.tax_amount, dec!(2175));
    assert_eq!(info.financed_principal, dec!(32_175));

    let principal_sum: Decimal = out.result.schedule.iter().map(|e| e.principal_payment).sum();
    assert_close(principal_sum, dec!(32_175), dec!(0.01), "financed principal closure");
    assert_close(
        out.result.results.total_interest,
        out.result.results.total_paid - dec!(32_175),
        dec!(0.000001),
        "interest identity",
    );
}

#[tokio::test]
async fn test_decimal_provider_rate_is_financed() {
    let lookup = lookup_fn(|_state: String| async {
        Ok(TaxQuote {
            rate: 0.065,
            source: TaxSource::Taxjar,
            updated_at: Utc::now(),
        })
    });
    let out = compute_loan_details(&car_loan("WA"), &lookup).await.unwrap();
    assert_eq!(out.result.loan_info.tax_rate, dec!(0.065));
    assert_eq!(out.result.loan_info.tax_amount, dec!(1950));
}

#[tokio::test]
async fn test_failed_lookup_falls_back_to_zero_tax() {
    let lookup = lookup_fn(|state: String| async move {
        Result::<TaxQuote, _>::Err(LoanCalcError::TaxLookup {
            state_code: state,
            reason: "connection reset".into(),
        })
    });
    let out = compute_loan_details(&car_loan("NY"), &lookup).await.unwrap();
    let info = &out.result.loan_info;
    assert_eq!(info.tax_rate, Decimal::ZERO);
    assert_eq!(info.tax_amount, Decimal::ZERO);
    assert_eq!(info.financed_principal, info.principal);
}

#[tokio::test]
async fn test_unknown_state_falls_back_to_zero_tax() {
    let out = compute_loan_details(&car_loan("ZZ"), &StaticTaxRates::default())
        .await
        .unwrap();
    assert_eq!(out.result.loan_info.financed_principal, dec!(30_000));
}

#[tokio::test]
async fn test_lookup_called_once_and_only_when_needed() {
    let calls = AtomicUsize::new(0);
    let lookup = lookup_fn(|_state: String| {
        calls.fetch_add(1, Ordering::SeqCst);
        async {
            Ok(TaxQuote {
                rate: 6.0,
                source: TaxSource::Static,
                updated_at: Utc::now(),
            })
        }
    });

    compute_loan_details(&car_loan("FL"), &lookup).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let mut no_tax = car_loan("FL");
    no_tax.include_sales_tax = false;
    compute_loan_details(&no_tax, &lookup).await.unwrap();

    let mut no_state = car_loan("FL");
    no_state.state_code = None;
    compute_loan_details(&no_state, &lookup).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_async_and_prefetched_quote_agree() {
    let rates = StaticTaxRates::default();
    let req = car_loan("TX");
    let via_lookup = compute_loan_details(&req, &rates).await.unwrap();

    let quote = TaxQuote {
        rate: 6.25,
        source: TaxSource::Static,
        updated_at: Utc::now(),
    };
    let via_quote = compute_with_quote(&req, Some(&quote)).unwrap();
    assert_eq!(via_lookup.result, via_quote.result);
}

fn provider_quote(rate: f64) -> TaxQuote {
    TaxQuote {
        rate,
        source: TaxSource::Taxjar,
        updated_at: Utc::now(),
    }
}

#[test]
fn test_oversized_quote_falls_back_to_zero_tax() {
    let req = LoanRequest {
        state_code: Some("CA".into()),
        include_sales_tax: true,
        ..LoanRequest::new(dec!(100_000_000), dec!(5), 30)
    };
    let out = compute_with_quote(&req, Some(&provider_quote(1e23))).unwrap();
    let info = &out.result.loan_info;
    assert_eq!(info.tax_rate, Decimal::ZERO);
    assert_eq!(info.tax_amount, Decimal::ZERO);
    assert_eq!(info.financed_principal, dec!(100_000_000));
    assert!(out.warnings.iter().any(|w| w.contains("sales tax ignored")));
}

#[test]
fn test_quote_at_or_above_full_rate_falls_back_to_zero_tax() {
    for raw in [250.0, 100.0, 1.0] {
        let out = compute_with_quote(&car_loan("CA"), Some(&provider_quote(raw))).unwrap();
        let info = &out.result.loan_info;
        assert_eq!(info.tax_rate, Decimal::ZERO, "raw rate {raw}");
        assert_eq!(info.financed_principal, dec!(30_000), "raw rate {raw}");
        assert!(out.warnings.iter().any(|w| w.contains("sales tax ignored")));
    }

    let out = compute_with_quote(&car_loan("CA"), Some(&provider_quote(99.0))).unwrap();
    assert_eq!(out.result.loan_info.tax_rate, dec!(0.99));
}

// ===========================================================================
// Validation
// ===========================================================================

#[tokio::test]
async fn test_invalid_principal_is_error() {
    let req = LoanRequest::new(Decimal::ZERO, dec!(5), 30);
    match compute_loan_details(&req, &NoTaxLookup).await {
        Err(LoanCalcError::InvalidInput { field, .. }) => assert_eq!(field, "principal"),
        other => panic!("Expected InvalidInput, got {:?}", other.map(|o| o.result)),
    }
}

#[test]
fn test_output_serializes() {
    let req = LoanRequest::new(dec!(10_000), dec!(4), 1);
    let out = compute_with_quote(&req, None).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["schedule"].as_array().unwrap().len(), 12);
    assert_eq!(json["result"]["schedule"][11]["remaining_balance"], "0");
    assert!(json["result"]["results"]["pmi_drop_off_month"].is_number());
}
