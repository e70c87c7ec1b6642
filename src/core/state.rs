use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::relationships::{CourseDirectory, PgCourseDirectory, RelationshipResolver};

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    directory: Arc<dyn CourseDirectory>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, redis: RedisHandle) -> Self {
        let directory = Arc::new(PgCourseDirectory::new(db.clone()));
        Self::with_directory(settings, db, redis, directory)
    }

    /// Builds state around an explicit relationship source.
    pub(crate) fn with_directory(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        directory: Arc<dyn CourseDirectory>,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, redis, directory }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn directory(&self) -> &dyn CourseDirectory {
        self.inner.directory.as_ref()
    }

    pub(crate) fn relationships(&self) -> RelationshipResolver<'_> {
        RelationshipResolver::new(self.directory())
    }
}
