//! Row extraction and normalization for one monthly sheet.
//!
//! Fixed column layout of a monthly sheet (range `A:H`, first row is a header):
//! A consultant name, C company, D actual hours, F client rate, H amount to invoice.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use sheetbill_core::{parse_amount, AmountParseError};

use crate::{A1Range, LineItem, SheetSource, SourceError};

const FIRST_COLUMN: char = 'A';
const LAST_COLUMN: char = 'H';

const CONSULTANT_COL: usize = 0;
const COMPANY_COL: usize = 2;
const HOURS_COL: usize = 3;
const RATE_COL: usize = 5;
const AMOUNT_COL: usize = 7;

/// Which normalized rows to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter<'a> {
    /// Rows whose trimmed company column equals the identifier.
    Company(&'a str),
    /// Every row with a non-empty company column.
    AnyCompany,
}

pub struct SheetDataExtractor<S> {
    source: S,
}

impl<S: SheetSource> SheetDataExtractor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Billable rows of `sheet_name` for one company, in sheet order.
    ///
    /// An empty result is not an error; callers decide whether that is a 404.
    pub async fn fetch_company_line_items(
        &self,
        sheet_name: &str,
        company_identifier: &str,
    ) -> Result<Vec<LineItem>, SourceError> {
        let rows = self.fetch_rows(sheet_name).await?;
        Ok(normalize_rows(sheet_name, &rows, RowFilter::Company(company_identifier)))
    }

    /// Billable rows of `sheet_name` for every company (administrative preview).
    pub async fn fetch_all_line_items(
        &self,
        sheet_name: &str,
    ) -> Result<Vec<LineItem>, SourceError> {
        let rows = self.fetch_rows(sheet_name).await?;
        Ok(normalize_rows(sheet_name, &rows, RowFilter::AnyCompany))
    }

    async fn fetch_rows(&self, sheet_name: &str) -> Result<Vec<Vec<String>>, SourceError> {
        let range = A1Range::columns(sheet_name, FIRST_COLUMN, LAST_COLUMN);
        let rows = self.source.values(&range).await?;
        debug!(sheet = sheet_name, rows = rows.len(), "fetched sheet rows");
        Ok(rows)
    }
}

/// Normalize raw rows (header included) into line items.
///
/// Kept rows have a non-empty consultant name, strictly positive hours and a
/// company column accepted by `filter`. Original row order is preserved.
pub fn normalize_rows(
    sheet_name: &str,
    rows: &[Vec<String>],
    filter: RowFilter<'_>,
) -> Vec<LineItem> {
    rows.iter()
        .enumerate()
        .skip(1)
        .filter_map(|(idx, row)| {
            let company = cell(row, COMPANY_COL).trim();
            let keep = match filter {
                RowFilter::Company(identifier) => company == identifier,
                RowFilter::AnyCompany => !company.is_empty(),
            };
            if !keep {
                return None;
            }

            let consultant = cell(row, CONSULTANT_COL).trim();
            if consultant.is_empty() {
                return None;
            }

            // Sheet row numbers are 1-based.
            let row_no = idx + 1;
            let actual_hours = numeric_cell(sheet_name, row_no, "hours", cell(row, HOURS_COL));
            if actual_hours <= Decimal::ZERO {
                return None;
            }

            Some(LineItem {
                consultant_name: consultant.to_string(),
                company_name: company.to_string(),
                actual_hours,
                client_rate: numeric_cell(sheet_name, row_no, "client rate", cell(row, RATE_COL)),
                amount_to_invoice: numeric_cell(
                    sheet_name,
                    row_no,
                    "amount",
                    cell(row, AMOUNT_COL),
                ),
            })
        })
        .collect()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Unparseable cells count as zero; anything other than a blank cell is logged.
fn numeric_cell(sheet: &str, row: usize, column: &'static str, raw: &str) -> Decimal {
    match parse_amount(raw) {
        Ok(v) => v,
        Err(AmountParseError::Empty) => Decimal::ZERO,
        Err(e) => {
            warn!(sheet, row, column, error = %e, "unparseable numeric cell treated as zero");
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;
    use proptest::prelude::*;

    use crate::InMemorySheetSource;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn header() -> Vec<&'static str> {
        vec![
            "Nombre",
            "Rol",
            "Empresa",
            "Horas Reales",
            "Horas Plan",
            "$ cliente",
            "$ consultor",
            "Importe a facturar",
        ]
    }

    fn june_source() -> InMemorySheetSource {
        InMemorySheetSource::new().with_sheet(
            "June2025",
            vec![
                header(),
                vec!["John Doe", "Dev", "Velir", "40", "", "$100.00", "$60", "$4,000.00"],
                vec!["Jane Roe", "QA", " Velir ", "12.5", "", "$80", "$50", "$1,000.00"],
                vec!["Idle Person", "Dev", "Velir", "0", "", "$80", "$50", "$0.00"],
                vec!["", "Dev", "Velir", "10", "", "$80", "$50", "$800.00"],
                vec!["Ana Diaz", "Dev", "Daily Kos", "20", "", "$90", "$50", "$1,800.00"],
                vec!["Short Row", "Dev", "Velir", "8"],
                vec!["Bad Hours", "Dev", "Velir", "n/a", "", "$80", "$50", "$640"],
            ],
        )
    }

    #[tokio::test]
    async fn company_rows_are_filtered_and_normalized_in_sheet_order() {
        let extractor = SheetDataExtractor::new(june_source());
        let items = extractor.fetch_company_line_items("June2025", "Velir").await.unwrap();

        let names: Vec<_> = items.iter().map(|i| i.consultant_name.as_str()).collect();
        assert_eq!(names, vec!["John Doe", "Jane Roe", "Short Row"]);

        assert_eq!(items[0].actual_hours, dec("40"));
        assert_eq!(items[0].client_rate, dec("100"));
        assert_eq!(items[0].amount_to_invoice, dec("4000"));
        assert_eq!(items[1].company_name, "Velir");
        assert_eq!(items[1].actual_hours, dec("12.5"));
        // Missing trailing cells default to zero.
        assert_eq!(items[2].client_rate, Decimal::ZERO);
        assert_eq!(items[2].amount_to_invoice, Decimal::ZERO);

        assert_eq!(LineItem::total(&items), Some(dec("5000")));
    }

    #[tokio::test]
    async fn unmatched_company_yields_empty_result() {
        let extractor = SheetDataExtractor::new(june_source());
        let mcgowan = extractor.fetch_company_line_items("June2025", "McGowan").await.unwrap();
        assert!(mcgowan.is_empty());
        // Identifier match is exact.
        assert!(extractor.fetch_company_line_items("June2025", "velir").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_sheet_yields_empty_result() {
        let source = InMemorySheetSource::new().with_sheet("July2025", Vec::<Vec<String>>::new());
        let extractor = SheetDataExtractor::new(source);
        assert!(extractor.fetch_company_line_items("July2025", "Velir").await.unwrap().is_empty());
        assert!(extractor.fetch_all_line_items("July2025").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_rows_variant_skips_rows_without_company() {
        let source = june_source().with_sheet(
            "May2025",
            vec![
                header(),
                vec!["John Doe", "Dev", "Velir", "40", "", "$100", "", "$4000"],
                vec!["No Company", "Dev", "", "10", "", "$100", "", "$1000"],
                vec!["Ana Diaz", "Dev", "Daily Kos", "20", "", "$90", "", "$1800"],
            ],
        );
        let extractor = SheetDataExtractor::new(source);
        let items = extractor.fetch_all_line_items("May2025").await.unwrap();
        let companies: Vec<_> = items.iter().map(|i| i.company_name.as_str()).collect();
        assert_eq!(companies, vec!["Velir", "Daily Kos"]);
    }

    #[tokio::test]
    async fn source_failures_propagate() {
        let extractor = SheetDataExtractor::new(InMemorySheetSource::new());
        let err = extractor.fetch_company_line_items("June2025", "Velir").await.unwrap_err();
        assert!(matches!(err, SourceError::Api { .. }));
    }

    #[test]
    fn line_items_serialize_with_camel_case_numbers() {
        let rows = vec![
            vec!["h".to_string()],
            vec!["John Doe", "", "Velir", "40", "", "$100", "", "$4,000"]
                .into_iter()
                .map(String::from)
                .collect(),
        ];
        let items = normalize_rows("June2025", &rows, RowFilter::Company("Velir"));
        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["consultantName"], "John Doe");
        assert_eq!(json["actualHours"].as_f64(), Some(40.0));
        assert_eq!(json["amountToInvoice"].as_f64(), Some(4000.0));
    }

    proptest! {
        #[test]
        fn kept_rows_always_satisfy_the_filter(
            rows in proptest::collection::vec(
                (
                    prop_oneof![Just(""), Just(" "), Just("Ann"), Just("Bo")],
                    prop_oneof![Just("Velir"), Just(" Velir"), Just("Other"), Just("")],
                    prop_oneof![Just("0"), Just("-3"), Just("8"), Just("x"), Just(""), Just("1.5")],
                ),
                0..20,
            )
        ) {
            let mut raw = vec![vec!["header".to_string()]];
            for (name, company, hours) in &rows {
                raw.push(vec![
                    name.to_string(),
                    String::new(),
                    company.to_string(),
                    hours.to_string(),
                ]);
            }
            let items = normalize_rows("Prop2025", &raw, RowFilter::Company("Velir"));
            for item in &items {
                prop_assert!(item.actual_hours > Decimal::ZERO);
                prop_assert!(!item.consultant_name.is_empty());
                prop_assert_eq!(item.company_name.as_str(), "Velir");
            }
        }
    }
}
