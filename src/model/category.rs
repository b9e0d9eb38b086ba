use crate::model::validation::FieldErrors;
use list_sync::{ListResource, QueryError};
use serde::{Deserialize, Serialize};

/// Page size used by the category picker in book forms.
pub const PICKER_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Only present on the admin list endpoint.
    #[serde(default)]
    pub book_count: Option<u64>,
}

impl ListResource for Category {
    const NAME: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
}

impl CategoryForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn check(&self) -> Result<(), QueryError> {
        let mut errors = FieldErrors::default();
        if self.name.trim().chars().count() <= 2 {
            errors.add("name", "Name must be longer than 2 characters");
        }
        errors.into_result()
    }

    /// The JSON body with the name trimmed.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.trim(),
            "description": self.description,
        })
    }
}
