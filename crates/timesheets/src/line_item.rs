use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One consultant's billable row for a period, normalized from a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub consultant_name: String,
    pub company_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub actual_hours: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub client_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_to_invoice: Decimal,
}

impl LineItem {
    /// Sum of `amount_to_invoice`, accumulated in decimal.
    ///
    /// `None` when the sum leaves the representable `Decimal` range.
    pub fn total<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Option<Decimal> {
        items
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(i.amount_to_invoice))
    }
}
