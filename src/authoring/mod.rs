pub mod editor;
pub mod session;
pub mod validation;

pub use editor::{EditCommand, EditError, MoveDirection, QuizDraft};
pub use session::{QuizSession, SessionError, SessionState};
pub use validation::validate_quiz;
