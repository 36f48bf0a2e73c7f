pub mod lesson;
pub mod media_file;
pub mod quiz;
pub mod quiz_question;
pub mod quiz_result;
pub use lesson::{Lesson, LessonAutosave, LessonContent, MediaRef};
pub use media_file::MediaFile;
pub use quiz::Quiz;
pub use quiz_question::{Answer, Question, QuestionType};
pub use quiz_result::{GradeReport, QuestionResult, QuizResult, ResultBand, SubmittedAnswer};
