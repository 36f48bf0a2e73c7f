use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::quiz_question::Question;

pub const DEFAULT_PASSING_SCORE: u32 = 70;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub lesson_id: String, // one quiz per lesson
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub time_limit: Option<u32>, // minutes, never enforced
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_passing_score() -> u32 {
    DEFAULT_PASSING_SCORE
}

fn default_attempts() -> u32 {
    1
}

impl Quiz {
    pub fn new(lesson_id: &str, title: &str, questions: Vec<Question>) -> Self {
        let now = Utc::now();
        let mut quiz = Quiz {
            id: Uuid::new_v4().to_string(),
            lesson_id: lesson_id.to_string(),
            title: title.to_string(),
            description: None,
            questions,
            time_limit: None,
            passing_score: DEFAULT_PASSING_SCORE,
            attempts: default_attempts(),
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        quiz.normalize_questions();
        quiz
    }

    /// Assigns missing question/answer ids and renumbers questions in order.
    pub fn normalize_questions(&mut self) {
        for (index, question) in self.questions.iter_mut().enumerate() {
            question.assign_missing_ids();
            question.number = index as u32 + 1;
        }
    }

    /// Every structural problem across all questions.
    pub fn invariant_violations(&self) -> Vec<String> {
        self.questions
            .iter()
            .enumerate()
            .flat_map(|(index, q)| q.invariant_violations(index + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::quiz_question::{Answer, QuestionType};

    #[test]
    fn new_quiz_applies_defaults_and_numbers_questions() {
        let mut first = Question::new(QuestionType::Single, 0);
        first.id.clear();
        let second = Question::new(QuestionType::Multiple, 0);

        let quiz = Quiz::new("lesson-1", "Basics", vec![first, second]);

        assert_eq!(quiz.passing_score, 70);
        assert_eq!(quiz.attempts, 1);
        assert!(!quiz.is_published);
        assert!(quiz.time_limit.is_none());
        assert_eq!(quiz.questions[0].number, 1);
        assert_eq!(quiz.questions[1].number, 2);
        assert!(!quiz.questions[0].id.is_empty());
    }

    #[test]
    fn quiz_serializes_with_camel_case_fields() {
        let quiz = Quiz::new("lesson-1", "Basics", vec![]);
        let json = serde_json::to_value(&quiz).unwrap();

        assert_eq!(json["lessonId"], "lesson-1");
        assert_eq!(json["passingScore"], 70);
        assert!(json.get("description").is_none());
    }

    #[test]
    fn invariant_violations_are_numbered_by_position() {
        let mut good = Question::new(QuestionType::Single, 1);
        good.answers[0].is_correct = true;
        let mut bad = Question::new(QuestionType::Single, 2);
        bad.answers = vec![Answer::blank()];

        let quiz = Quiz::new("lesson-1", "Basics", vec![good, bad]);
        let problems = quiz.invariant_violations();

        assert_eq!(problems.len(), 2);
        assert!(problems.iter().all(|p| p.starts_with("Question 2")));
    }
}
