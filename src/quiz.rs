//! Quiz engine: a pure reducer over a single-player walk through the question set.
//!
//! Answering --submit--> Revealed --next--> Answering (next question), or a full
//! reset to question 0 with score 0 after the last one.

use serde::Serialize;

use crate::domain::{Language, QuizQuestion};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizState {
  pub current_index: usize,
  pub selected_option: Option<usize>,
  pub revealed: bool,
  pub score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizAction {
  Select(usize),
  Submit,
  Next,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizEvent {
  Answered { correct: bool },
  /// Passed the last question; state has already been reset.
  Wrapped { final_score: u32, total: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizStep {
  pub state: QuizState,
  pub event: Option<QuizEvent>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
  #[error("the quiz has no questions")]
  EmptyQuiz,
  #[error("answer already revealed; selection is locked")]
  SelectionLocked,
  #[error("option {0} does not exist for this question")]
  OptionOutOfRange(usize),
  #[error("select an option before submitting")]
  NothingSelected,
  #[error("this question was already submitted")]
  AlreadyRevealed,
  #[error("submit an answer before moving on")]
  NotRevealed,
}

/// Apply one action. Rejected actions leave the caller's state untouched.
pub fn reduce(state: QuizState, action: QuizAction, questions: &[QuizQuestion]) -> Result<QuizStep, QuizError> {
  let question = questions.get(state.current_index).ok_or(QuizError::EmptyQuiz)?;
  match action {
    QuizAction::Select(idx) => {
      if state.revealed {
        return Err(QuizError::SelectionLocked);
      }
      if idx >= question.options.len() {
        return Err(QuizError::OptionOutOfRange(idx));
      }
      Ok(QuizStep { state: QuizState { selected_option: Some(idx), ..state }, event: None })
    }
    QuizAction::Submit => {
      if state.revealed {
        return Err(QuizError::AlreadyRevealed);
      }
      let selected = state.selected_option.ok_or(QuizError::NothingSelected)?;
      let correct = selected == question.correct_index;
      let score = if correct { state.score + 1 } else { state.score };
      Ok(QuizStep {
        state: QuizState { revealed: true, score, ..state },
        event: Some(QuizEvent::Answered { correct }),
      })
    }
    QuizAction::Next => {
      if !state.revealed {
        return Err(QuizError::NotRevealed);
      }
      if state.current_index + 1 < questions.len() {
        Ok(QuizStep {
          state: QuizState { current_index: state.current_index + 1, selected_option: None, revealed: false, score: state.score },
          event: None,
        })
      } else {
        Ok(QuizStep {
          state: QuizState::default(),
          event: Some(QuizEvent::Wrapped { final_score: state.score, total: questions.len() }),
        })
      }
    }
  }
}

/// Text or inline-code span of a question, split on backticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Segment {
  Text(String),
  Code(String),
}

/// Odd-numbered backtick-delimited parts are code; empty parts are dropped.
pub fn question_segments(question: &str) -> Vec<Segment> {
  question
    .split('`')
    .enumerate()
    .filter(|(_, part)| !part.is_empty())
    .map(|(i, part)| if i % 2 == 1 { Segment::Code(part.to_string()) } else { Segment::Text(part.to_string()) })
    .collect()
}

/// What a client may see for the current question. The answer stays hidden until revealed.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
  pub index: usize,
  pub total: usize,
  pub score: u32,
  pub language: Language,
  pub question: String,
  pub segments: Vec<Segment>,
  pub options: Vec<String>,
  pub selected_option: Option<usize>,
  pub revealed: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub correct_index: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
}

pub fn view(state: &QuizState, questions: &[QuizQuestion]) -> Option<QuizView> {
  let q = questions.get(state.current_index)?;
  Some(QuizView {
    index: state.current_index,
    total: questions.len(),
    score: state.score,
    language: q.language,
    question: q.question.clone(),
    segments: question_segments(&q.question),
    options: q.options.clone(),
    selected_option: state.selected_option,
    revealed: state.revealed,
    correct_index: state.revealed.then_some(q.correct_index),
    explanation: state.revealed.then(|| q.explanation.clone()),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::practice_quiz;

  fn qs() -> Vec<QuizQuestion> {
    practice_quiz()
  }

  fn run(state: QuizState, actions: &[QuizAction], questions: &[QuizQuestion]) -> QuizState {
    actions.iter().fold(state, |s, a| reduce(s, *a, questions).unwrap().state)
  }

  #[test]
  fn correct_submit_scores_exactly_once() {
    let q = qs();
    let right = q[0].correct_index;
    let s = run(QuizState::default(), &[QuizAction::Select(right), QuizAction::Submit], &q);
    assert_eq!(s.score, 1);
    assert!(s.revealed);
    assert_eq!(reduce(s, QuizAction::Submit, &q), Err(QuizError::AlreadyRevealed));
  }

  #[test]
  fn wrong_submit_does_not_score() {
    let q = qs();
    let wrong = (q[0].correct_index + 1) % q[0].options.len();
    let step = reduce(QuizState { selected_option: Some(wrong), ..QuizState::default() }, QuizAction::Submit, &q).unwrap();
    assert_eq!(step.state.score, 0);
    assert_eq!(step.event, Some(QuizEvent::Answered { correct: false }));
  }

  #[test]
  fn guards() {
    let q = qs();
    assert_eq!(reduce(QuizState::default(), QuizAction::Submit, &q), Err(QuizError::NothingSelected));
    assert_eq!(reduce(QuizState::default(), QuizAction::Next, &q), Err(QuizError::NotRevealed));
    assert_eq!(reduce(QuizState::default(), QuizAction::Select(99), &q), Err(QuizError::OptionOutOfRange(99)));
    let revealed = run(QuizState::default(), &[QuizAction::Select(0), QuizAction::Submit], &q);
    assert_eq!(reduce(revealed, QuizAction::Select(1), &q), Err(QuizError::SelectionLocked));
    assert_eq!(reduce(QuizState::default(), QuizAction::Select(0), &[]), Err(QuizError::EmptyQuiz));
  }

  #[test]
  fn selection_can_change_before_submit() {
    let q = qs();
    let s = run(QuizState::default(), &[QuizAction::Select(0), QuizAction::Select(3)], &q);
    assert_eq!(s.selected_option, Some(3));
    assert!(!s.revealed);
  }

  #[test]
  fn next_advances_and_keeps_score() {
    let q = qs();
    let right = q[0].correct_index;
    let s = run(QuizState::default(), &[QuizAction::Select(right), QuizAction::Submit, QuizAction::Next], &q);
    assert_eq!(s, QuizState { current_index: 1, selected_option: None, revealed: false, score: 1 });
  }

  #[test]
  fn advancing_past_last_question_wraps_and_resets_score() {
    let q = qs();
    let mut s = QuizState::default();
    for question in &q {
      s = run(s, &[QuizAction::Select(question.correct_index), QuizAction::Submit], &q);
      let step = reduce(s, QuizAction::Next, &q).unwrap();
      if s.current_index + 1 == q.len() {
        assert_eq!(step.event, Some(QuizEvent::Wrapped { final_score: q.len() as u32, total: q.len() }));
      }
      s = step.state;
    }
    assert_eq!(s, QuizState::default());
  }

  #[test]
  fn segments_split_inline_code() {
    assert_eq!(
      question_segments("What is the output of `print(2 ** 3)` in Python?"),
      vec![
        Segment::Text("What is the output of ".into()),
        Segment::Code("print(2 ** 3)".into()),
        Segment::Text(" in Python?".into()),
      ]
    );
    assert_eq!(question_segments("`x`"), vec![Segment::Code("x".into())]);
  }

  #[test]
  fn view_hides_answer_until_revealed() {
    let q = qs();
    let v = view(&QuizState::default(), &q).unwrap();
    assert!(v.correct_index.is_none() && v.explanation.is_none());
    assert_eq!(v.total, q.len());

    let s = run(QuizState::default(), &[QuizAction::Select(0), QuizAction::Submit], &q);
    let v = view(&s, &q).unwrap();
    assert_eq!(v.correct_index, Some(q[0].correct_index));
    assert!(v.explanation.is_some());
  }
}
