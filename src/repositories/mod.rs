pub(crate) mod announcements;
pub(crate) mod assignments;
pub(crate) mod course_assistants;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod health;
pub(crate) mod materials;
pub(crate) mod quizzes;
pub(crate) mod submissions;
pub(crate) mod users;
