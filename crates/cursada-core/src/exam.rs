//! Multiple-choice exam questions and option shuffling.
//!
//! Questions arrive from the generation backend as a JSON array whose
//! `answer` is a single letter indexing `options` (`"a"` is the first).
//! Shuffling permutes the options and rewrites the letter so it still points
//! at the same option text.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamQuestion {
  pub question: String,
  #[serde(default)]
  pub options:  Vec<String>,
  #[serde(default)]
  pub answer:   String,
}

impl ExamQuestion {
  /// The option index `answer` refers to, if it is a single in-range letter.
  pub fn answer_index(&self) -> Option<usize> {
    let mut chars = self.answer.trim().chars();
    let letter = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some() || !letter.is_ascii_lowercase() {
      return None;
    }
    let index = (letter as u8 - b'a') as usize;
    (index < self.options.len()).then_some(index)
  }

  /// The text of the correct option.
  pub fn correct_option(&self) -> Option<&str> {
    self.answer_index().map(|i| self.options[i].as_str())
  }
}

/// Letter for option `index`: 0 → `"a"`. `None` past `z`.
pub fn answer_letter(index: usize) -> Option<String> {
  u8::try_from(index)
    .ok()
    .filter(|i| *i < 26)
    .map(|i| char::from(b'a' + i).to_string())
}

/// Uniform in-place Fisher-Yates shuffle.
fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
  for i in (1..items.len()).rev() {
    let j = rng.gen_range(0..=i);
    items.swap(i, j);
  }
}

/// Shuffle one question's options and re-derive its answer letter.
///
/// When several options share the correct text, the answer points at the
/// first of them after shuffling. A question whose answer does not resolve
/// is returned unchanged.
pub fn shuffle_question<R: Rng + ?Sized>(question: &ExamQuestion, rng: &mut R) -> ExamQuestion {
  let Some(correct) = question.correct_option() else {
    return question.clone();
  };

  let mut options = question.options.clone();
  fisher_yates(&mut options, rng);

  let answer = options
    .iter()
    .position(|o| o == correct)
    .and_then(answer_letter);

  match answer {
    Some(answer) => ExamQuestion { question: question.question.clone(), options, answer },
    None => question.clone(),
  }
}

/// Shuffle every question independently. Output length equals input length.
pub fn shuffle_exam<R: Rng + ?Sized>(questions: &[ExamQuestion], rng: &mut R) -> Vec<ExamQuestion> {
  questions.iter().map(|q| shuffle_question(q, rng)).collect()
}

/// Parse the `examData` string returned by the generation backend.
///
/// Markdown code fences around the JSON are tolerated.
pub fn parse_exam_data(raw: &str) -> Result<Vec<ExamQuestion>> {
  let body = strip_fences(raw);
  serde_json::from_str(body).map_err(|e| Error::MalformedExam(e.to_string()))
}

fn strip_fences(raw: &str) -> &str {
  let trimmed = raw.trim();
  let Some(rest) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  // Drop an optional language tag on the opening fence.
  let rest = rest.split_once('\n').map_or("", |(_, body)| body);
  rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
