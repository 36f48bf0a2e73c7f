use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    errors::AppError,
    models::domain::{
        quiz_question::{MAX_ANSWERS, MIN_ANSWERS},
        Answer, Question, QuestionType,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("question '{0}' is not in this draft")]
    QuestionNotFound(String),

    #[error("answer '{answer_id}' is not part of question '{question_id}'")]
    AnswerNotFound {
        question_id: String,
        answer_id: String,
    },

    #[error("a question can have at most {MAX_ANSWERS} answers")]
    TooManyAnswers,

    #[error("a question needs at least {MIN_ANSWERS} answers")]
    TooFewAnswers,

    #[error("removing question {0} needs confirmation")]
    NotConfirmed(usize),
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::QuestionNotFound(_) | EditError::AnswerNotFound { .. } => {
                AppError::NotFound(err.to_string())
            }
            _ => AppError::ValidationError(err.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// One authoring action, as sent by the editor UI.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditCommand {
    SetTitle { title: String },
    AddQuestion {
        #[serde(rename = "type", default)]
        question_type: QuestionType,
    },
    RemoveQuestion {
        question_id: String,
        #[serde(default)]
        confirmed: bool,
    },
    MoveQuestion {
        question_id: String,
        direction: MoveDirection,
    },
    SetQuestionText { question_id: String, text: String },
    SetQuestionType {
        question_id: String,
        #[serde(rename = "type")]
        question_type: QuestionType,
    },
    SetPoints { question_id: String, points: i32 },
    AddAnswer { question_id: String },
    RemoveAnswer { question_id: String, answer_id: String },
    SetAnswerText {
        question_id: String,
        answer_id: String,
        text: String,
    },
    ToggleCorrect {
        question_id: String,
        answer_id: String,
        checked: bool,
    },
}

/// A quiz being authored for one lesson. Every operation keeps question
/// numbers sequential and leaves the draft unchanged when it fails.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub lesson_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub saved_at: DateTime<Utc>,
}

impl QuizDraft {
    pub fn new(lesson_id: &str) -> Self {
        QuizDraft {
            lesson_id: lesson_id.to_string(),
            title: String::new(),
            questions: Vec::new(),
            saved_at: Utc::now(),
        }
    }

    /// Start editing from an already saved quiz.
    pub fn from_questions(lesson_id: &str, title: &str, questions: Vec<Question>) -> Self {
        let mut draft = QuizDraft::new(lesson_id);
        draft.title = title.to_string();
        draft.questions = questions;
        draft.renumber();
        draft
    }

    pub fn apply(&mut self, command: EditCommand) -> Result<(), EditError> {
        match command {
            EditCommand::SetTitle { title } => {
                self.title = title;
                Ok(())
            }
            EditCommand::AddQuestion { question_type } => {
                self.add_question(question_type);
                Ok(())
            }
            EditCommand::RemoveQuestion {
                question_id,
                confirmed,
            } => self.remove_question(&question_id, confirmed),
            EditCommand::MoveQuestion {
                question_id,
                direction,
            } => self.move_question(&question_id, direction),
            EditCommand::SetQuestionText { question_id, text } => {
                self.set_question_text(&question_id, &text)
            }
            EditCommand::SetQuestionType {
                question_id,
                question_type,
            } => self.set_question_type(&question_id, question_type),
            EditCommand::SetPoints {
                question_id,
                points,
            } => self.set_points(&question_id, points),
            EditCommand::AddAnswer { question_id } => self.add_answer(&question_id).map(|_| ()),
            EditCommand::RemoveAnswer {
                question_id,
                answer_id,
            } => self.remove_answer(&question_id, &answer_id),
            EditCommand::SetAnswerText {
                question_id,
                answer_id,
                text,
            } => self.set_answer_text(&question_id, &answer_id, &text),
            EditCommand::ToggleCorrect {
                question_id,
                answer_id,
                checked,
            } => self.toggle_correct(&question_id, &answer_id, checked),
        }
    }

    /// Appends a question with two blank answers and returns its id.
    pub fn add_question(&mut self, question_type: QuestionType) -> String {
        let question = Question::new(question_type, self.questions.len() as u32 + 1);
        let id = question.id.clone();
        self.questions.push(question);
        id
    }

    pub fn remove_question(&mut self, question_id: &str, confirmed: bool) -> Result<(), EditError> {
        let index = self.position(question_id)?;
        if !confirmed {
            return Err(EditError::NotConfirmed(index + 1));
        }
        self.questions.remove(index);
        self.renumber();
        Ok(())
    }

    /// Swaps with the neighbour in `direction`; a no-op at either end.
    pub fn move_question(
        &mut self,
        question_id: &str,
        direction: MoveDirection,
    ) -> Result<(), EditError> {
        let index = self.position(question_id)?;
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.questions.len() => index + 1,
            _ => return Ok(()),
        };
        self.questions.swap(index, target);
        self.renumber();
        Ok(())
    }

    pub fn set_question_text(&mut self, question_id: &str, text: &str) -> Result<(), EditError> {
        self.question_mut(question_id)?.text = text.to_string();
        Ok(())
    }

    pub fn set_points(&mut self, question_id: &str, points: i32) -> Result<(), EditError> {
        self.question_mut(question_id)?.points = points;
        Ok(())
    }

    /// Switching to single choice keeps only the first correct answer.
    pub fn set_question_type(
        &mut self,
        question_id: &str,
        question_type: QuestionType,
    ) -> Result<(), EditError> {
        let question = self.question_mut(question_id)?;
        question.question_type = question_type;
        if question_type == QuestionType::Single {
            let mut seen_correct = false;
            for answer in &mut question.answers {
                if answer.is_correct && seen_correct {
                    answer.is_correct = false;
                }
                seen_correct |= answer.is_correct;
            }
        }
        Ok(())
    }

    /// Appends a blank answer and returns its id.
    pub fn add_answer(&mut self, question_id: &str) -> Result<String, EditError> {
        let question = self.question_mut(question_id)?;
        if question.answers.len() >= MAX_ANSWERS {
            return Err(EditError::TooManyAnswers);
        }
        let answer = Answer::blank();
        let id = answer.id.clone();
        question.answers.push(answer);
        Ok(id)
    }

    pub fn remove_answer(&mut self, question_id: &str, answer_id: &str) -> Result<(), EditError> {
        let question = self.question_mut(question_id)?;
        let index = question
            .answers
            .iter()
            .position(|a| a.id == answer_id)
            .ok_or_else(|| EditError::AnswerNotFound {
                question_id: question_id.to_string(),
                answer_id: answer_id.to_string(),
            })?;
        if question.answers.len() <= MIN_ANSWERS {
            return Err(EditError::TooFewAnswers);
        }
        question.answers.remove(index);
        Ok(())
    }

    pub fn set_answer_text(
        &mut self,
        question_id: &str,
        answer_id: &str,
        text: &str,
    ) -> Result<(), EditError> {
        self.answer_mut(question_id, answer_id)?.text = text.to_string();
        Ok(())
    }

    /// Radio semantics for single choice, independent checkboxes for multiple.
    pub fn toggle_correct(
        &mut self,
        question_id: &str,
        answer_id: &str,
        checked: bool,
    ) -> Result<(), EditError> {
        // Resolve the answer first so a bad id leaves siblings untouched.
        self.answer_mut(question_id, answer_id)?;
        let question = self.question_mut(question_id)?;

        match question.question_type {
            QuestionType::Single => {
                // Unchecking the only correct answer would leave none; radios cannot be unchecked.
                if !checked {
                    return Ok(());
                }
                for answer in &mut question.answers {
                    answer.is_correct = answer.id == answer_id;
                }
            }
            QuestionType::Multiple => {
                if let Some(answer) = question.answers.iter_mut().find(|a| a.id == answer_id) {
                    answer.is_correct = checked;
                }
            }
        }
        Ok(())
    }

    /// Questions as they will be saved: blank answers dropped.
    pub fn questions_for_save(&self) -> Vec<Question> {
        self.questions
            .iter()
            .cloned()
            .map(|mut q| {
                q.answers.retain(Answer::has_text);
                q
            })
            .collect()
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    fn position(&self, question_id: &str) -> Result<usize, EditError> {
        self.questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or_else(|| EditError::QuestionNotFound(question_id.to_string()))
    }

    fn question_mut(&mut self, question_id: &str) -> Result<&mut Question, EditError> {
        self.questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| EditError::QuestionNotFound(question_id.to_string()))
    }

    fn answer_mut(&mut self, question_id: &str, answer_id: &str) -> Result<&mut Answer, EditError> {
        self.question_mut(question_id)?
            .answers
            .iter_mut()
            .find(|a| a.id == answer_id)
            .ok_or_else(|| EditError::AnswerNotFound {
                question_id: question_id.to_string(),
                answer_id: answer_id.to_string(),
            })
    }

    fn renumber(&mut self) {
        for (index, question) in self.questions.iter_mut().enumerate() {
            question.number = index as u32 + 1;
        }
    }
}
