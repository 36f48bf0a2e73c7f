use crate::models::domain::{Answer, Lesson, LessonContent, Question, QuestionType, Quiz};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A question whose answers are given as `(text, is_correct)` pairs.
    pub fn question(question_type: QuestionType, text: &str, answers: &[(&str, bool)]) -> Question {
        let mut question = Question::new(question_type, 1);
        question.text = text.to_string();
        question.answers = answers
            .iter()
            .map(|(text, is_correct)| Answer {
                text: text.to_string(),
                is_correct: *is_correct,
                ..Answer::blank()
            })
            .collect();
        question
    }

    pub fn test_lesson() -> Lesson {
        Lesson::new("Fractions", LessonContent::default())
    }

    /// One single-choice and one multiple-choice question.
    pub fn test_quiz(lesson_id: &str) -> Quiz {
        Quiz::new(
            lesson_id,
            "Fractions check",
            vec![
                question(
                    QuestionType::Single,
                    "What is 1/2 + 1/2?",
                    &[("1", true), ("2", false), ("1/4", false)],
                ),
                question(
                    QuestionType::Multiple,
                    "Which equal one half?",
                    &[("2/4", true), ("3/6", true), ("2/3", false)],
                ),
            ],
        )
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_fixture_quiz_is_well_formed() {
        let quiz = test_quiz("lesson-1");
        assert_eq!(quiz.questions.len(), 2);
        assert!(quiz.invariant_violations().is_empty());
        assert_eq!(quiz.questions[1].number, 2);
    }

    #[test]
    fn test_fixture_question_marks_correct_answers() {
        let q = question(QuestionType::Multiple, "Pick", &[("a", true), ("b", true)]);
        assert_eq!(q.correct_answer_texts(), vec!["a", "b"]);
        assert_ne!(q.answers[0].id, q.answers[1].id);
    }
}
