use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_ANSWERS: usize = 2;
pub const MAX_ANSWERS: usize = 6;
pub const MAX_POINTS: i32 = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Single, // exactly one correct answer, radio semantics
    Multiple, // any non-empty set of correct answers
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl Answer {
    pub fn blank() -> Self {
        Answer {
            id: new_id("a"),
            text: String::new(),
            is_correct: false,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub number: u32, // 1-based display position
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default = "default_points")]
    pub points: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn default_points() -> i32 {
    1
}

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

impl Question {
    /// A fresh question with two blank answers worth one point.
    pub fn new(question_type: QuestionType, number: u32) -> Self {
        Question {
            id: new_id("q"),
            number,
            text: String::new(),
            question_type,
            answers: vec![Answer::blank(), Answer::blank()],
            points: default_points(),
            explanation: None,
        }
    }

    /// Points counted by grading, clamped to `1..=MAX_POINTS`.
    pub fn effective_points(&self) -> u32 {
        self.points.clamp(1, MAX_POINTS) as u32
    }

    pub fn correct_answer_ids(&self) -> Vec<&str> {
        self.answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.id.as_str())
            .collect()
    }

    pub fn correct_answer_texts(&self) -> Vec<String> {
        self.answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.text.clone())
            .collect()
    }

    pub fn find_answer(&self, answer_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }

    /// Fills in ids that are missing on input so answers keep a stable identity.
    pub fn assign_missing_ids(&mut self) {
        if self.id.trim().is_empty() {
            self.id = new_id("q");
        }
        for answer in &mut self.answers {
            if answer.id.trim().is_empty() {
                answer.id = new_id("a");
            }
        }
    }

    /// Structural problems with this question, numbered by `position` (1-based).
    pub fn invariant_violations(&self, position: usize) -> Vec<String> {
        let mut problems = Vec::new();
        let correct = self.answers.iter().filter(|a| a.is_correct).count();

        if self.answers.len() < MIN_ANSWERS {
            problems.push(format!(
                "Question {} must have at least {} answers",
                position, MIN_ANSWERS
            ));
        }
        if correct == 0 {
            problems.push(format!(
                "Question {} must have at least one correct answer",
                position
            ));
        }
        if self.question_type == QuestionType::Single && correct > 1 {
            problems.push(format!(
                "Question {} is single choice but has {} correct answers",
                position, correct
            ));
        }
        if self.points < 1 {
            problems.push(format!("Question {} must be worth at least 1 point", position));
        } else if self.points > MAX_POINTS {
            problems.push(format!(
                "Question {} must be worth at most {} points",
                position, MAX_POINTS
            ));
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&QuestionType::Multiple).unwrap();
        assert_eq!(json, "\"multiple\"");

        let parsed: QuestionType = serde_json::from_str("\"single\"").unwrap();
        assert_eq!(parsed, QuestionType::Single);

        assert!(serde_json::from_str::<QuestionType>("\"essay\"").is_err());
    }

    #[test]
    fn question_defaults_apply_when_fields_are_missing() {
        let question: Question = serde_json::from_str(
            r#"{"text": "2 + 2?", "answers": [{"text": "4", "isCorrect": true}, {"text": "5"}]}"#,
        )
        .unwrap();

        assert_eq!(question.question_type, QuestionType::Single);
        assert_eq!(question.points, 1);
        assert!(question.id.is_empty());
        assert!(!question.answers[1].is_correct);
    }

    #[test]
    fn assign_missing_ids_keeps_existing_ids() {
        let mut question = Question::new(QuestionType::Single, 1);
        let first_id = question.answers[0].id.clone();
        question.answers[1].id.clear();
        question.id.clear();

        question.assign_missing_ids();

        assert!(!question.id.is_empty());
        assert_eq!(question.answers[0].id, first_id);
        assert!(!question.answers[1].id.is_empty());
        assert_ne!(question.answers[0].id, question.answers[1].id);
    }

    #[test]
    fn invariant_violations_flag_single_with_two_correct() {
        let mut question = Question::new(QuestionType::Single, 1);
        question.answers[0].is_correct = true;
        question.answers[1].is_correct = true;

        let problems = question.invariant_violations(1);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("single choice"));
    }

    #[test]
    fn new_question_has_two_blank_answers_and_one_point() {
        let question = Question::new(QuestionType::Multiple, 3);
        assert_eq!(question.answers.len(), MIN_ANSWERS);
        assert_eq!(question.points, 1);
        assert_eq!(question.number, 3);
        assert!(question.answers.iter().all(|a| !a.has_text() && !a.is_correct));
    }

    #[test]
    fn effective_points_floors_at_one() {
        let mut question = Question::new(QuestionType::Single, 1);
        question.points = 0;
        assert_eq!(question.effective_points(), 1);
        question.points = 4;
        assert_eq!(question.effective_points(), 4);
        question.points = i32::MAX;
        assert_eq!(question.effective_points(), MAX_POINTS as u32);
    }

    #[test]
    fn points_above_the_cap_are_a_violation() {
        let mut question = Question::new(QuestionType::Single, 1);
        question.answers[0].is_correct = true;

        question.points = MAX_POINTS;
        assert!(question.invariant_violations(1).is_empty());

        question.points = MAX_POINTS + 1;
        assert_eq!(
            question.invariant_violations(1),
            vec![format!("Question 1 must be worth at most {} points", MAX_POINTS)]
        );
    }
}
