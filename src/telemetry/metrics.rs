//! Metric instrument factories for sitewatch.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"sitewatch"` meter.

use opentelemetry::metrics::{Counter, Meter};

/// Returns the shared meter for sitewatch instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("sitewatch")
}

/// Counter: searches sent to the item source.
pub fn searches() -> Counter<u64> {
    meter()
        .u64_counter("sitewatch.searches")
        .with_description("Number of searches performed")
        .build()
}

/// Counter: items passed over during filtering.
/// Labels: `reason` ("reshare" | "duplicate").
pub fn items_skipped() -> Counter<u64> {
    meter()
        .u64_counter("sitewatch.items.skipped")
        .with_description("Items excluded from reply eligibility")
        .build()
}

/// Counter: reply attempts.
/// Labels: `result` ("posted" | "failed").
pub fn replies() -> Counter<u64> {
    meter()
        .u64_counter("sitewatch.replies")
        .with_description("Number of reply attempts")
        .build()
}

/// Counter: entries durably written to the ledger.
pub fn ledger_appends() -> Counter<u64> {
    meter()
        .u64_counter("sitewatch.ledger.appends")
        .with_description("Ledger entries appended")
        .build()
}
