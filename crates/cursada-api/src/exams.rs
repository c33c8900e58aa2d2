//! `POST /exams/shuffle`: shuffle the options of a generated exam.
//!
//! Body: `{"examData": "<JSON array of questions>"}`, as returned by the
//! exam generation function. Responds with the shuffled questions, or 422
//! when the payload cannot be parsed so the client can retry generation.

use axum::Json;
use cursada_core::exam::{ExamQuestion, parse_exam_data, shuffle_exam};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShuffleBody {
  pub exam_data: String,
}

pub async fn shuffle(Json(body): Json<ShuffleBody>) -> Result<Json<Vec<ExamQuestion>>, ApiError> {
  let questions = parse_exam_data(&body.exam_data)?;
  let mut rng = rand::thread_rng();
  Ok(Json(shuffle_exam(&questions, &mut rng)))
}
