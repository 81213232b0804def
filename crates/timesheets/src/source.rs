use core::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;

use sheetbill_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("spreadsheet source rejected credentials: {0}")]
    Unauthorized(String),

    #[error("spreadsheet source unreachable: {0}")]
    Unreachable(String),

    #[error("spreadsheet source returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected spreadsheet response: {0}")]
    Decode(String),
}

impl From<SourceError> for DomainError {
    fn from(err: SourceError) -> Self {
        DomainError::upstream(err.to_string())
    }
}

/// A column span of one sheet in A1 notation, e.g. `'March 2024'!A:H`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub first_column: char,
    pub last_column: char,
}

impl A1Range {
    pub fn columns(sheet: impl Into<String>, first_column: char, last_column: char) -> Self {
        Self {
            sheet: sheet.into(),
            first_column,
            last_column,
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sheet names are always quoted; embedded quotes are doubled.
        write!(
            f,
            "'{}'!{}:{}",
            self.sheet.replace('\'', "''"),
            self.first_column,
            self.last_column
        )
    }
}

/// Read-only access to the external spreadsheet.
///
/// Rows come back as display strings; trailing empty cells may be omitted, so
/// rows can be shorter than the requested span.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Titles of every sheet in the spreadsheet, in spreadsheet order.
    async fn sheet_titles(&self) -> Result<Vec<String>, SourceError>;

    /// All rows of `range`, header row included.
    async fn values(&self, range: &A1Range) -> Result<Vec<Vec<String>>, SourceError>;
}

#[async_trait]
impl<S> SheetSource for Arc<S>
where
    S: SheetSource + ?Sized,
{
    async fn sheet_titles(&self) -> Result<Vec<String>, SourceError> {
        (**self).sheet_titles().await
    }

    async fn values(&self, range: &A1Range) -> Result<Vec<Vec<String>>, SourceError> {
        (**self).values(range).await
    }
}

/// In-memory spreadsheet for tests/dev.
#[derive(Debug, Clone, Default)]
pub struct InMemorySheetSource {
    sheets: IndexMap<String, Vec<Vec<String>>>,
}

impl InMemorySheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet<R, C>(mut self, title: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.sheets.insert(title.into(), rows);
        self
    }
}

#[async_trait]
impl SheetSource for InMemorySheetSource {
    async fn sheet_titles(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.sheets.keys().cloned().collect())
    }

    async fn values(&self, range: &A1Range) -> Result<Vec<Vec<String>>, SourceError> {
        self.sheets
            .get(&range.sheet)
            .cloned()
            .ok_or_else(|| SourceError::Api {
                status: 400,
                message: format!("Unable to parse range: {range}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_range_quotes_sheet_names() {
        assert_eq!(A1Range::columns("March 2024", 'A', 'H').to_string(), "'March 2024'!A:H");
        assert_eq!(A1Range::columns("Bob's", 'A', 'B').to_string(), "'Bob''s'!A:B");
    }

    #[tokio::test]
    async fn in_memory_source_serves_rows_and_titles() {
        let source = InMemorySheetSource::new()
            .with_sheet("June2025", vec![vec!["Nombre"], vec!["Ana"]])
            .with_sheet("Summary", Vec::<Vec<String>>::new());

        assert_eq!(source.sheet_titles().await.unwrap(), vec!["June2025", "Summary"]);
        let rows = source.values(&A1Range::columns("June2025", 'A', 'H')).await.unwrap();
        assert_eq!(rows.len(), 2);

        let err = source.values(&A1Range::columns("Missing", 'A', 'H')).await.unwrap_err();
        assert!(matches!(err, SourceError::Api { status: 400, .. }));
    }
}
