use serde::{Deserialize, Serialize};

use crate::gateway::ResourceKind;

/// Manufacturer entry, keyed by brandName.
pub struct Brand;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandCreate {
    pub brand_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_description: Option<String>,
}

impl ResourceKind for Brand {
    const COLLECTION: &'static str = "brands";
    const DISPLAY: &'static str = "Brand";
    const KEY_FIELD: &'static str = "brandName";

    type Create = BrandCreate;
    type Patch = BrandPatch;

    fn key(input: &Self::Create) -> &str {
        &input.brand_name
    }
}
