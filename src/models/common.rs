use serde::{Deserialize, Serialize};

// Define pagination query parameters for list endpoints
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

pub fn default_page() -> usize {
    1
}

pub fn default_page_size() -> usize {
    20
}

/// Links handed back to the operator after a form is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormUrls {
    pub preview_url: String,
    pub public_url: String,
    pub submissions_url: String,
}

impl FormUrls {
    pub fn for_form(form_id: &uuid::Uuid) -> Self {
        FormUrls {
            preview_url: format!("/dashboard/forms/{}", form_id),
            public_url: format!("/public/form/{}", form_id),
            submissions_url: format!("/dashboard/forms/{}/submissions", form_id),
        }
    }
}
