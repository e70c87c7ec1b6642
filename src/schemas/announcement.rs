use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnnouncementCreate {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(length(max = 20_000, message = "content is too long"))]
    pub(crate) content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnnouncementResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) publisher_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: String,
}

impl AnnouncementResponse {
    pub(crate) fn from_db(announcement: crate::db::models::Announcement) -> Self {
        Self {
            id: announcement.id.to_string(),
            course_id: announcement.course_id.to_string(),
            publisher_id: announcement.publisher_id.to_string(),
            title: announcement.title,
            content: announcement.content,
            created_at: format_primitive(announcement.created_at),
        }
    }
}
