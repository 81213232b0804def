use crate::{CompanyMap, CompanyProfile};

fn profile(
    key: &str,
    legal_name: &str,
    address: &str,
    city: &str,
    project: &str,
    latest_invoice_number: u32,
) -> (String, CompanyProfile) {
    (
        key.to_string(),
        CompanyProfile {
            key: key.to_string(),
            legal_name: legal_name.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            project: project.to_string(),
            latest_invoice_number,
            sheet_identifier: key.to_string(),
        },
    )
}

/// Profiles used to seed an empty registry.
pub fn default_companies() -> CompanyMap {
    [
        profile(
            "Velir",
            "Velir Studios, Inc.",
            "212 Elm Street, Suite 201",
            "Somerville, MA",
            "Velir Clients",
            586,
        ),
        profile(
            "Daily Kos",
            "Kos Media, LLC",
            "436 14th Street",
            "Oakland, CA 94612, United States",
            "Daily Kos",
            14,
        ),
        profile(
            "McGowan",
            "McGowan Wholesale",
            "20595 Lorain Rd",
            "Fairview Park, OH 44126",
            "Hive",
            11,
        ),
        profile(
            "travcoding",
            "Preferred Guest Resorts LLC",
            "501 N Wynmore Road",
            "Winter Park, FL, 32789",
            "travcoding",
            117,
        ),
    ]
    .into_iter()
    .collect()
}
