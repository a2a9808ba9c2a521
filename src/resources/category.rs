use serde::{Deserialize, Serialize};

use crate::gateway::ResourceKind;

/// Product grouping, keyed by categoryName.
pub struct Category;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    pub category_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_description: Option<String>,
}

impl ResourceKind for Category {
    const COLLECTION: &'static str = "categories";
    const DISPLAY: &'static str = "Category";
    const KEY_FIELD: &'static str = "categoryName";

    type Create = CategoryCreate;
    type Patch = CategoryPatch;

    fn key(input: &Self::Create) -> &str {
        &input.category_name
    }
}
