//! Known Azure regions and their display names.

use serde::Serialize;

/// Cloud environment a region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloudEnvironment {
    Global,
    China,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: &'static str,
    pub display_name: &'static str,
    pub environment: CloudEnvironment,
}

const fn region(id: &'static str, display_name: &'static str, environment: CloudEnvironment) -> Region {
    Region {
        id,
        display_name,
        environment,
    }
}

use CloudEnvironment::{China, Global};

pub const REGIONS: &[Region] = &[
    region("chinaeast", "China East", China),
    region("chinaeast2", "China East 2", China),
    region("chinaeast3", "China East 3", China),
    region("chinanorth", "China North", China),
    region("chinanorth2", "China North 2", China),
    region("chinanorth3", "China North 3", China),
    region("eastus", "East US", Global),
    region("eastus2", "East US 2", Global),
    region("centralus", "Central US", Global),
    region("northcentralus", "North Central US", Global),
    region("southcentralus", "South Central US", Global),
    region("westcentralus", "West Central US", Global),
    region("westus", "West US", Global),
    region("westus2", "West US 2", Global),
    region("westus3", "West US 3", Global),
    region("canadacentral", "Canada Central", Global),
    region("canadaeast", "Canada East", Global),
    region("brazilsouth", "Brazil South", Global),
    region("northeurope", "North Europe", Global),
    region("westeurope", "West Europe", Global),
    region("uksouth", "UK South", Global),
    region("ukwest", "UK West", Global),
    region("francecentral", "France Central", Global),
    region("germanywestcentral", "Germany West Central", Global),
    region("switzerlandnorth", "Switzerland North", Global),
    region("norwayeast", "Norway East", Global),
    region("swedencentral", "Sweden Central", Global),
    region("eastasia", "East Asia", Global),
    region("southeastasia", "Southeast Asia", Global),
    region("japaneast", "Japan East", Global),
    region("japanwest", "Japan West", Global),
    region("koreacentral", "Korea Central", Global),
    region("australiaeast", "Australia East", Global),
    region("australiasoutheast", "Australia Southeast", Global),
    region("centralindia", "Central India", Global),
    region("southindia", "South India", Global),
    region("uaenorth", "UAE North", Global),
    region("southafricanorth", "South Africa North", Global),
];

/// Looks a region up by identifier, ignoring case and whitespace.
pub fn find_region(id: &str) -> Option<&'static Region> {
    let normalized = normalize(id);
    REGIONS.iter().find(|region| region.id == normalized)
}

/// Whether a rate-card region label such as `China North 3` or `CN North 3`
/// names the region `id`.
pub fn label_matches(label: &str, id: &str) -> bool {
    let mut label = normalize(label);
    if label.starts_with("cn") && !label.starts_with("china") {
        label.replace_range(..2, "china");
    }
    let id = normalize(id);
    if label.is_empty() || id.is_empty() {
        return false;
    }
    label == id
        || find_region(&id).map_or(false, |region| normalize(region.display_name) == label)
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Display name for `id`; unknown identifiers display as themselves.
pub fn display_name(id: &str) -> String {
    find_region(id)
        .map(|region| region.display_name.to_string())
        .unwrap_or_else(|| id.to_string())
}

pub fn regions_in(environment: CloudEnvironment) -> impl Iterator<Item = &'static Region> {
    REGIONS
        .iter()
        .filter(move |region| region.environment == environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("chinanorth3", "China North 3" ; "china region")]
    #[test_case("EastUS", "East US" ; "case insensitive")]
    #[test_case("China East 2", "China East 2" ; "display name form")]
    #[test_case("moonbase1", "moonbase1" ; "unknown region")]
    fn resolves_display_names(id: &str, expected: &str) {
        assert_eq!(display_name(id), expected);
    }

    #[test_case("China North 3", "chinanorth3", true ; "display name")]
    #[test_case("CN North 3", "chinanorth3", true ; "rate card abbreviation")]
    #[test_case("CN East", "chinaeast", true ; "abbreviated without number")]
    #[test_case("CN East", "chinanorth3", false ; "other region")]
    #[test_case("US East", "eastus", false ; "word order differs")]
    #[test_case("East US", "EastUS", true ; "global region")]
    #[test_case("", "chinanorth3", false ; "empty label")]
    fn matches_rate_card_labels(label: &str, id: &str, expected: bool) {
        assert_eq!(label_matches(label, id), expected);
    }

    #[test]
    fn china_catalog_is_complete() {
        assert_eq!(regions_in(CloudEnvironment::China).count(), 6);
        assert!(regions_in(CloudEnvironment::Global).all(|r| !r.id.starts_with("china")));
    }
}
