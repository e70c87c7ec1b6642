use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MaterialCreate {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default = "default_file_type")]
    #[validate(length(min = 1, max = 32, message = "file_type must not be empty"))]
    pub(crate) file_type: String,
    #[serde(default)]
    pub(crate) file_path: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MaterialUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "file_type must not be empty"))]
    pub(crate) file_type: Option<String>,
    #[serde(default)]
    pub(crate) file_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MaterialResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) file_type: String,
    pub(crate) file_path: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl MaterialResponse {
    pub(crate) fn from_db(material: crate::db::models::Material) -> Self {
        Self {
            id: material.id.to_string(),
            course_id: material.course_id.to_string(),
            title: material.title,
            description: material.description,
            file_type: material.file_type,
            file_path: material.file_path,
            created_at: format_primitive(material.created_at),
            updated_at: format_primitive(material.updated_at),
        }
    }
}

fn default_file_type() -> String {
    "link".to_string()
}
