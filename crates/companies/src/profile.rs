use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Registry contents keyed by company key, in insertion order.
pub type CompanyMap = IndexMap<String, CompanyProfile>;

/// Persisted identity and billing configuration for one client.
///
/// The persisted JSON shape keeps the field names of the existing
/// `companies.json` files (`name`, `googleSheetsValue`, ...). The `key` is the
/// map key in that document and is not repeated inside the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(skip)]
    pub key: String,
    #[serde(rename = "name")]
    pub legal_name: String,
    pub address: String,
    pub city: String,
    pub project: String,
    pub latest_invoice_number: u32,
    /// Value matched against the company column of a sheet.
    #[serde(rename = "googleSheetsValue")]
    pub sheet_identifier: String,
}

impl CompanyProfile {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn matches_sheet_identifier(&self, identifier: &str) -> bool {
        self.sheet_identifier == identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_shape_uses_legacy_field_names() {
        let profile = CompanyProfile {
            key: "Velir".to_string(),
            legal_name: "Velir Studios, Inc.".to_string(),
            address: "212 Elm Street, Suite 201".to_string(),
            city: "Somerville, MA".to_string(),
            project: "Velir Clients".to_string(),
            latest_invoice_number: 586,
            sheet_identifier: "Velir".to_string(),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["name"], "Velir Studios, Inc.");
        assert_eq!(json["latestInvoiceNumber"], 586);
        assert_eq!(json["googleSheetsValue"], "Velir");
        assert!(json.get("key").is_none());

        let back: CompanyProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back.key, "");
        assert_eq!(back.legal_name, profile.legal_name);
    }
}
