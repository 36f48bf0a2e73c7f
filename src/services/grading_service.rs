use std::collections::BTreeSet;

use crate::models::domain::{
    GradeReport, Question, QuestionResult, QuestionType, Quiz, SubmittedAnswer,
};

pub struct GradingService;

impl GradingService {
    /// Grade a submission against a quiz using its own passing score.
    pub fn grade_quiz(quiz: &Quiz, submitted_answers: &[SubmittedAnswer]) -> GradeReport {
        Self::grade(&quiz.questions, submitted_answers, quiz.passing_score)
    }

    /// Grade submitted answers against a question list.
    ///
    /// Questions without a matching answer score zero; grading never fails.
    pub fn grade(
        questions: &[Question],
        submitted_answers: &[SubmittedAnswer],
        passing_score: u32,
    ) -> GradeReport {
        let mut score: u32 = 0;
        let mut max_score: u32 = 0;
        let mut results = Vec::with_capacity(questions.len());

        for (index, question) in questions.iter().enumerate() {
            let points = question.effective_points();
            max_score = max_score.saturating_add(points);

            let is_correct = Self::find_submission(index, question, submitted_answers)
                .map(|submitted| Self::grade_question(question, submitted))
                .unwrap_or(false);

            if is_correct {
                score = score.saturating_add(points);
            }

            results.push(QuestionResult {
                question_index: index,
                question_id: question.id.clone(),
                question_text: question.text.clone(),
                is_correct,
                correct_answers: question.correct_answer_texts(),
            });
        }

        let percentage = percentage(score, max_score);

        GradeReport {
            score,
            max_score,
            percentage,
            passed: percentage >= passing_score,
            results,
        }
    }

    /// Match by index first, then by question id.
    fn find_submission<'a>(
        index: usize,
        question: &Question,
        submitted_answers: &'a [SubmittedAnswer],
    ) -> Option<&'a SubmittedAnswer> {
        submitted_answers
            .iter()
            .find(|a| a.question_index == Some(index))
            .or_else(|| {
                submitted_answers
                    .iter()
                    .find(|a| {
                        a.question_index.is_none()
                            && a.question_id.as_deref() == Some(question.id.as_str())
                    })
            })
    }

    /// Grade an individual question based on type
    fn grade_question(question: &Question, submitted: &SubmittedAnswer) -> bool {
        let correct_ids = question.correct_answer_ids();

        match question.question_type {
            QuestionType::Single => {
                // Exactly one pick, and it is the one correct answer
                let picked = match (&submitted.answer, &submitted.answers) {
                    (Some(answer), _) => Some(answer.as_str()),
                    (None, Some(answers)) if answers.len() == 1 => Some(answers[0].as_str()),
                    _ => None,
                };
                match (picked, correct_ids.as_slice()) {
                    (Some(picked), [correct]) => picked == *correct,
                    _ => false,
                }
            }
            QuestionType::Multiple => {
                let selected: BTreeSet<&str> = match (&submitted.answers, &submitted.answer) {
                    (Some(answers), _) if !answers.is_empty() => {
                        answers.iter().map(String::as_str).collect()
                    }
                    (_, Some(answer)) => BTreeSet::from([answer.as_str()]),
                    _ => BTreeSet::new(),
                };
                let correct: BTreeSet<&str> = correct_ids.into_iter().collect();

                !selected.is_empty() && selected == correct
            }
        }
    }
}

/// `round(100 * score / max_score)`, or 0 for an empty quiz.
fn percentage(score: u32, max_score: u32) -> u32 {
    if max_score == 0 {
        return 0;
    }
    (f64::from(score) * 100.0 / f64::from(max_score)).round() as u32
}
