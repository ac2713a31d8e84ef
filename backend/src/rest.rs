use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::domain::expense_service::ExpenseService;
use crate::domain::export_service::ExportService;
use crate::domain::foreign_service::ForeignDonationService;
use crate::domain::record_service::RecordService;
use crate::domain::report::{parse_range, ReportVariant};
use crate::domain::report_service::ReportService;
use crate::storage::DbConnection;
use shared::{
    CreateExpenseRequest, CreateForeignDonationRequest, CreateRecordRequest, DateRange,
    ExportReportRequest, UpdateExpenseRequest, UpdateForeignDonationRequest, UpdateRecordRequest,
};

/// Application state containing the ledger services
#[derive(Clone)]
pub struct AppState {
    pub record_service: RecordService<DbConnection>,
    pub expense_service: ExpenseService<DbConnection>,
    pub foreign_service: ForeignDonationService<DbConnection>,
    pub report_service: ReportService<DbConnection>,
    pub export_service: ExportService,
}

impl AppState {
    /// Create new application state over a database connection
    pub fn new(db: DbConnection) -> Self {
        Self {
            record_service: RecordService::new(db.clone()),
            expense_service: ExpenseService::new(db.clone()),
            foreign_service: ForeignDonationService::new(db.clone()),
            report_service: ReportService::new(db),
            export_service: ExportService::new(),
        }
    }
}

/// API routes under /api
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/records", get(list_records).post(create_record))
        .route("/records/:id", put(update_record).delete(delete_record))
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
        .route(
            "/foreign-donations",
            get(list_foreign_donations).post(create_foreign_donation),
        )
        .route(
            "/foreign-donations/:id",
            put(update_foreign_donation).delete(delete_foreign_donation),
        )
        .route("/reports", get(get_report))
        .route("/reports/export", post(export_report))
}

/// Query parameters for the report endpoint
#[derive(Deserialize, Debug)]
pub struct ReportQuery {
    pub from: String,
    pub to: String,
}

/// Axum handler function for GET /api/records
pub async fn list_records(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/records");

    match state.record_service.list_records().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error listing records: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing records").into_response()
        }
    }
}

/// Axum handler function for POST /api/records
pub async fn create_record(
    State(state): State<AppState>,
    Json(request): Json<CreateRecordRequest>,
) -> impl IntoResponse {
    info!("POST /api/records - donor: {}", request.donor_name);

    match state.record_service.create_record(request).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => {
            tracing::error!("Error creating record: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler function for PUT /api/records/:id
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRecordRequest>,
) -> impl IntoResponse {
    info!("PUT /api/records/{}", id);

    match state.record_service.update_record(&id, request).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => {
            tracing::error!("Error updating record {}: {:?}", id, e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler function for DELETE /api/records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/records/{}", id);

    match state.record_service.delete_record(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Record not found").into_response(),
        Err(e) => {
            tracing::error!("Error deleting record {}: {:?}", id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error deleting record").into_response()
        }
    }
}

/// Axum handler function for GET /api/expenses
pub async fn list_expenses(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/expenses");

    match state.expense_service.list_expenses().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error listing expenses: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing expenses").into_response()
        }
    }
}

/// Axum handler function for POST /api/expenses
pub async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/expenses - {}", request.service_description);

    match state.expense_service.create_expense(request).await {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => {
            tracing::error!("Error creating expense: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler function for PUT /api/expenses/:id
pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{}", id);

    match state.expense_service.update_expense(&id, request).await {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(e) => {
            tracing::error!("Error updating expense {}: {:?}", id, e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler function for DELETE /api/expenses/:id
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/expenses/{}", id);

    match state.expense_service.delete_expense(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Expense not found").into_response(),
        Err(e) => {
            tracing::error!("Error deleting expense {}: {:?}", id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error deleting expense").into_response()
        }
    }
}

/// Axum handler function for GET /api/foreign-donations
pub async fn list_foreign_donations(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/foreign-donations");

    match state.foreign_service.list_foreign_donations().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error listing foreign donations: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error listing foreign donations",
            )
                .into_response()
        }
    }
}

/// Axum handler function for POST /api/foreign-donations
pub async fn create_foreign_donation(
    State(state): State<AppState>,
    Json(request): Json<CreateForeignDonationRequest>,
) -> impl IntoResponse {
    info!("POST /api/foreign-donations - donor: {}", request.donor_name);

    match state.foreign_service.create_foreign_donation(request).await {
        Ok(donation) => (StatusCode::CREATED, Json(donation)).into_response(),
        Err(e) => {
            tracing::error!("Error creating foreign donation: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler function for PUT /api/foreign-donations/:id
pub async fn update_foreign_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateForeignDonationRequest>,
) -> impl IntoResponse {
    info!("PUT /api/foreign-donations/{}", id);

    match state
        .foreign_service
        .update_foreign_donation(&id, request)
        .await
    {
        Ok(donation) => (StatusCode::OK, Json(donation)).into_response(),
        Err(e) => {
            tracing::error!("Error updating foreign donation {}: {:?}", id, e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler function for DELETE /api/foreign-donations/:id
pub async fn delete_foreign_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/foreign-donations/{}", id);

    match state.foreign_service.delete_foreign_donation(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Foreign donation not found").into_response(),
        Err(e) => {
            tracing::error!("Error deleting foreign donation {}: {:?}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error deleting foreign donation",
            )
                .into_response()
        }
    }
}

/// Axum handler function for GET /api/reports
///
/// A malformed `from` or `to` is rejected with 400 before any filtering
/// happens; the report itself either comes back complete or not at all.
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    info!("GET /api/reports - from: {}, to: {}", query.from, query.to);

    let range = match parse_range(&query.from, &query.to) {
        Ok(range) => range,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state
        .report_service
        .generate(range, ReportVariant::Screen)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error generating report: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error generating report").into_response()
        }
    }
}

/// Axum handler function for POST /api/reports/export
pub async fn export_report(
    State(state): State<AppState>,
    Json(request): Json<ExportReportRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/reports/export - from: {}, to: {}",
        request.from, request.to
    );

    let range = DateRange::new(request.from, request.to);

    let report = match state
        .report_service
        .generate(range, ReportVariant::Export)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Error generating export report: {:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error generating report").into_response();
        }
    };

    match state
        .export_service
        .export_to_path(&report.document, request.directory.as_deref())
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error exporting report: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error exporting report").into_response()
        }
    }
}
