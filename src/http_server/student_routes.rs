//! Student HTTP routes
//!
//! `/students` CRUD, filtered listing and `/students/summary`. Extractor
//! rejections for bodies (`$body`) and query strings (`$query`) become
//! validation failures with the usual error body.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::student::{
    StudentError, StudentPayload, StudentQuery, StudentRecord, StudentService, Summary,
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub fn student_routes(service: StudentService) -> Router {
    Router::new()
        .route("/students", get(list_handler).post(create_handler))
        .route("/students/summary", get(summary_handler))
        .route(
            "/students/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .with_state(service)
}

fn decode_body(body: Result<Json<Value>, JsonRejection>) -> Result<StudentPayload, StudentError> {
    match body {
        Ok(Json(value)) => StudentPayload::from_json(value),
        Err(rejection) => Err(StudentError::validation("$body", rejection.body_text())),
    }
}

fn decode_query(
    query: Result<Query<StudentQuery>, QueryRejection>,
) -> Result<StudentQuery, StudentError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| StudentError::validation("$query", rejection.body_text()))
}

async fn create_handler(
    State(service): State<StudentService>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentRecord>), StudentError> {
    let payload = decode_body(body)?;
    let record = service.create_student(&payload)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_handler(
    State(service): State<StudentService>,
    query: Result<Query<StudentQuery>, QueryRejection>,
) -> Result<Json<Vec<StudentRecord>>, StudentError> {
    service.list_students(&decode_query(query)?).map(Json)
}

async fn summary_handler(
    State(service): State<StudentService>,
) -> Result<Json<Summary>, StudentError> {
    service.get_summary().map(Json)
}

async fn get_handler(
    State(service): State<StudentService>,
    Path(id): Path<String>,
) -> Result<Json<StudentRecord>, StudentError> {
    service.get_student(&id).map(Json)
}

async fn update_handler(
    State(service): State<StudentService>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StudentRecord>, StudentError> {
    let payload = decode_body(body)?;
    service.update_student(&id, &payload).map(Json)
}

async fn delete_handler(
    State(service): State<StudentService>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, StudentError> {
    service.delete_student(&id)?;
    Ok(Json(MessageResponse {
        message: "Student deleted successfully",
    }))
}
