use tracing::debug;

use sheetbill_core::InvoicePeriod;

use crate::{SheetSource, SourceError};

/// Lists the monthly sheets that can be invoiced.
pub struct SheetCatalog<S> {
    source: S,
    year: u16,
}

impl<S: SheetSource> SheetCatalog<S> {
    /// `year` is the single calendar year considered current for listing.
    pub fn new(source: S, year: u16) -> Self {
        Self { source, year }
    }

    /// Monthly sheet names for the configured year, most recent first.
    pub async fn list_available_sheets(&self) -> Result<Vec<String>, SourceError> {
        let titles = self.source.sheet_titles().await?;
        let total = titles.len();
        let sheets = select_monthly_sheets(titles, self.year);
        debug!(total, monthly = sheets.len(), year = self.year, "listed sheets");
        Ok(sheets)
    }
}

/// Keep names shaped `<Month><optional space><yyyy>` within `year`, sorted by
/// period descending.
pub fn select_monthly_sheets(titles: impl IntoIterator<Item = String>, year: u16) -> Vec<String> {
    let mut monthly: Vec<(InvoicePeriod, String)> = titles
        .into_iter()
        .filter_map(|title| InvoicePeriod::parse(&title).ok().map(|p| (p, title)))
        .filter(|(period, _)| period.year == year)
        .collect();

    monthly.sort_by(|(a, _), (b, _)| b.cmp(a));
    monthly.into_iter().map(|(_, title)| title).collect()
}
