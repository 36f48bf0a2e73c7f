use thiserror::Error;

use crate::{
    errors::AppError,
    models::{
        domain::{GradeReport, Question, QuestionType, Quiz, SubmittedAnswer},
        dto::request::SubmitQuizRequest,
    },
    services::grading_service::GradingService,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("quiz '{0}' has no questions")]
    EmptyQuiz(String),

    #[error("answer '{0}' does not belong to the current question")]
    UnknownAnswer(String),

    #[error("select an answer for question {0} first")]
    Unanswered(usize),

    #[error("questions {0:?} still need an answer")]
    Incomplete(Vec<usize>),

    #[error("the quiz is already finished")]
    Finished,
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Active(usize),
    Finished(GradeReport),
}

/// A learner working through a quiz one question at a time.
///
/// `timeLimit` on the quiz is carried along but no clock is ever checked.
#[derive(Clone, Debug)]
pub struct QuizSession {
    quiz: Quiz,
    selections: Vec<Vec<String>>,
    state: SessionState,
}

impl QuizSession {
    pub fn new(quiz: Quiz) -> Result<Self, SessionError> {
        if quiz.questions.is_empty() {
            return Err(SessionError::EmptyQuiz(quiz.id));
        }
        let selections = vec![Vec::new(); quiz.questions.len()];
        Ok(QuizSession {
            quiz,
            selections,
            state: SessionState::Active(0),
        })
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Active(index) => Some(index),
            SessionState::Finished(_) => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().map(|index| &self.quiz.questions[index])
    }

    pub fn selected(&self, question_index: usize) -> &[String] {
        self.selections
            .get(question_index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Single choice replaces the pick, multiple choice toggles membership.
    pub fn select_answer(&mut self, answer_id: &str) -> Result<(), SessionError> {
        let index = self.active_index()?;
        let question = &self.quiz.questions[index];
        if question.find_answer(answer_id).is_none() {
            return Err(SessionError::UnknownAnswer(answer_id.to_string()));
        }

        let selection = &mut self.selections[index];
        match question.question_type {
            QuestionType::Single => {
                selection.clear();
                selection.push(answer_id.to_string());
            }
            QuestionType::Multiple => {
                if let Some(pos) = selection.iter().position(|id| id == answer_id) {
                    selection.remove(pos);
                } else {
                    selection.push(answer_id.to_string());
                }
            }
        }
        Ok(())
    }

    pub fn next(&mut self) -> Result<usize, SessionError> {
        let index = self.active_index()?;
        if self.selections[index].is_empty() {
            return Err(SessionError::Unanswered(index + 1));
        }
        let next = (index + 1).min(self.quiz.questions.len() - 1);
        self.state = SessionState::Active(next);
        Ok(next)
    }

    pub fn previous(&mut self) -> Result<usize, SessionError> {
        let index = self.active_index()?;
        let previous = index.saturating_sub(1);
        self.state = SessionState::Active(previous);
        Ok(previous)
    }

    /// Grades the collected answers once every question has one.
    pub fn finish(&mut self) -> Result<GradeReport, SessionError> {
        self.active_index()?;
        let missing: Vec<usize> = self
            .selections
            .iter()
            .enumerate()
            .filter(|(_, selection)| selection.is_empty())
            .map(|(index, _)| index + 1)
            .collect();
        if !missing.is_empty() {
            return Err(SessionError::Incomplete(missing));
        }

        let report = GradingService::grade_quiz(&self.quiz, &self.submitted_answers());
        self.state = SessionState::Finished(report.clone());
        Ok(report)
    }

    pub fn retry(&mut self) {
        self.selections.iter_mut().for_each(Vec::clear);
        self.state = SessionState::Active(0);
    }

    /// `(answered, total)`
    pub fn progress(&self) -> (usize, usize) {
        let answered = self.selections.iter().filter(|s| !s.is_empty()).count();
        (answered, self.selections.len())
    }

    /// The request body the submit endpoint expects for these answers.
    pub fn submission(&self, student_name: &str) -> SubmitQuizRequest {
        SubmitQuizRequest {
            student_name: Some(student_name.to_string()),
            answers: self.submitted_answers(),
        }
    }

    fn submitted_answers(&self) -> Vec<SubmittedAnswer> {
        self.quiz
            .questions
            .iter()
            .zip(&self.selections)
            .enumerate()
            .filter(|(_, (_, selection))| !selection.is_empty())
            .map(|(index, (question, selection))| SubmittedAnswer {
                question_index: Some(index),
                question_id: Some(question.id.clone()),
                answer: match question.question_type {
                    QuestionType::Single => selection.first().cloned(),
                    QuestionType::Multiple => None,
                },
                answers: match question.question_type {
                    QuestionType::Single => None,
                    QuestionType::Multiple => Some(selection.clone()),
                },
            })
            .collect()
    }

    fn active_index(&self) -> Result<usize, SessionError> {
        self.current_index().ok_or(SessionError::Finished)
    }
}
