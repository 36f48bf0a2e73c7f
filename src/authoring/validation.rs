use crate::{
    authoring::editor::QuizDraft,
    models::domain::quiz_question::{MAX_POINTS, MIN_ANSWERS},
};

/// Every reason the draft cannot be saved yet. Empty means ready to save.
pub fn validate_quiz(draft: &QuizDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push("Quiz title is required".to_string());
    }
    if draft.questions.is_empty() {
        errors.push("Add at least one question".to_string());
    }

    for (index, question) in draft.questions.iter().enumerate() {
        let number = index + 1;

        if question.text.trim().is_empty() {
            errors.push(format!("Question {}: text is required", number));
        }

        let filled = question.answers.iter().filter(|a| a.has_text()).count();
        if filled < MIN_ANSWERS {
            errors.push(format!(
                "Question {}: needs at least {} answers with text",
                number, MIN_ANSWERS
            ));
        }

        if !question.answers.iter().any(|a| a.is_correct && a.has_text()) {
            errors.push(format!(
                "Question {}: mark at least one answer as correct",
                number
            ));
        }

        if question.points < 1 {
            errors.push(format!("Question {}: points must be at least 1", number));
        } else if question.points > MAX_POINTS {
            errors.push(format!(
                "Question {}: points must be at most {}",
                number, MAX_POINTS
            ));
        }
    }

    errors
}
