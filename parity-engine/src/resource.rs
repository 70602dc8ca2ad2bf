use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Location property overwritten with the target region before analysis.
pub const LOCATION_FIELD: &str = "location";

/// A resource as retrieved from the resource manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceModel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Resource-manager shaped properties; always has `type` and `location`
    /// when present.
    #[serde(default)]
    pub details: Option<Value>,
}

impl ResourceModel {
    pub fn new(id: impl Into<String>, details: Value) -> Self {
        Self {
            id: id.into(),
            details: Some(details),
            ..Self::default()
        }
    }

    /// Details with `location` replaced by `region`; the resource is left untouched.
    ///
    /// `None` when the resource carries no details.
    pub fn details_in_region(&self, region: &str) -> Option<Value> {
        let mut details = match &self.details {
            None | Some(Value::Null) => return None,
            Some(details) => details.clone(),
        };
        if let Value::Object(map) = &mut details {
            map.insert(LOCATION_FIELD.to_string(), Value::String(region.to_string()));
        }
        Some(details)
    }
}
