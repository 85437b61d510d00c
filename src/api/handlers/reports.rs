use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    api::state::AppState,
    error::{AppError, Result},
    service::{report_export, ExportFormat, ReportKind, ReportQuery},
};

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    format: Option<String>,
    /// Comma separated column names.
    columns: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ReportDescription {
    pub kind: ReportKind,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub date_filtered: bool,
}

pub async fn list_kinds() -> Json<Vec<ReportDescription>> {
    Json(
        ReportKind::ALL
            .iter()
            .map(|kind| ReportDescription {
                kind: *kind,
                title: kind.title(),
                columns: kind.columns(),
                date_filtered: kind.is_dated(),
            })
            .collect(),
    )
}

pub async fn generate(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Response> {
    let kind = ReportKind::from_str(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown report: {}", kind)))?;

    let format = match params.format.as_deref() {
        None => ExportFormat::Json,
        Some(value) => ExportFormat::from_str(value)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported format: {}", value)))?,
    };

    if let (Some(start), Some(end)) = (params.start, params.end) {
        if start > end {
            return Err(AppError::BadRequest("start must not be after end".to_string()));
        }
    }

    let query = ReportQuery {
        columns: params
            .columns
            .map(|list| list.split(',').map(|c| c.trim().to_string()).collect())
            .unwrap_or_default(),
        start: params.start,
        end: params.end,
    };

    let report = state.service_context.report_service.generate(kind, &query).await?;

    let body = match format {
        ExportFormat::Json => {
            return Ok(Json(json!({
                "kind": report.kind,
                "title": report.title,
                "generated_at": report.generated_at,
                "columns": report.columns,
                "rows": report.records(),
            }))
            .into_response());
        }
        ExportFormat::Csv => report_export::to_csv(&report),
        ExportFormat::Text => report_export::to_text(&report, report.generated_at.date_naive()),
    };

    let disposition = format!("attachment; filename=\"{}\"", report_export::file_name(&report, format));

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
