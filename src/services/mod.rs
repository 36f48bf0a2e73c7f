pub mod draft_service;
pub mod grading_service;
pub mod lesson_service;
pub mod quiz_service;
pub mod stats_service;
pub mod upload_service;
