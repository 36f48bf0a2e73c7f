use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One learner answer as submitted. `answer` carries a single-choice pick,
/// `answers` a multiple-choice selection; either may be used for either type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<String>>,
}

impl SubmittedAnswer {
    pub fn single(question_index: usize, answer_id: &str) -> Self {
        SubmittedAnswer {
            question_index: Some(question_index),
            answer: Some(answer_id.to_string()),
            ..Default::default()
        }
    }

    pub fn multiple(question_index: usize, answer_ids: &[&str]) -> Self {
        SubmittedAnswer {
            question_index: Some(question_index),
            answers: Some(answer_ids.iter().map(|id| id.to_string()).collect()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_index: usize,
    pub question_id: String,
    pub question_text: String,
    pub is_correct: bool,
    pub correct_answers: Vec<String>, // answer texts
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultBand {
    Excellent,
    Good,
    Satisfactory,
    TryAgain,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    pub results: Vec<QuestionResult>,
}

impl GradeReport {
    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_correct).count()
    }

    pub fn band(&self) -> ResultBand {
        match self.percentage {
            p if p >= 90 => ResultBand::Excellent,
            p if p >= 70 => ResultBand::Good,
            p if p >= 50 => ResultBand::Satisfactory,
            _ => ResultBand::TryAgain,
        }
    }
}

/// An archived, graded submission.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: String,
    pub quiz_id: String,
    pub student_name: String,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    pub answers: Vec<SubmittedAnswer>,
    pub results: Vec<QuestionResult>,
    pub submitted_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn from_report(
        quiz_id: &str,
        student_name: &str,
        answers: Vec<SubmittedAnswer>,
        report: &GradeReport,
    ) -> Self {
        QuizResult {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz_id.to_string(),
            student_name: student_name.to_string(),
            score: report.score,
            max_score: report.max_score,
            percentage: report.percentage,
            passed: report.passed,
            answers,
            results: report.results.clone(),
            submitted_at: Utc::now(),
        }
    }
}
