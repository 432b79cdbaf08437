use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::calc;
use crate::errors::ApiError;
use crate::models::{DeleteResponse, Loan, LoanStatus, QuoteResponse};
use crate::validate;
use crate::AppState;

/// The only fields the partial-update endpoint may touch. Status changes go
/// through the dedicated status route and are never mixed in here.
const ALLOWED_UPDATES: [&str; 5] = [
    "borrowerName",
    "loanAmount",
    "interestRate",
    "loanTerm",
    "paymentDueDate",
];

#[post("/calculate")]
pub async fn calculate(
    _user: AuthedUser,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    validate::calculate(&body)?;
    let loan_amount = body["loanAmount"].as_f64().unwrap_or_default();
    let interest_rate = body["interestRate"].as_f64().unwrap_or_default();
    let loan_term = body["loanTerm"].as_u64().unwrap_or_default() as u32;

    // A zero amount or term is treated as absent, and zero is invalid for
    // both anyway. A zero interest rate is a real input and takes the
    // degenerate branch of the formula.
    if loan_amount == 0.0 || loan_term == 0 {
        return Err(ApiError::MissingFields);
    }

    let quote = calc::quote(loan_amount, interest_rate, loan_term);
    Ok(HttpResponse::Ok().json(QuoteResponse {
        monthly_payment: quote.monthly_payment.to_string(),
        total_repayment: quote.total_repayment.to_string(),
    }))
}

#[post("")]
pub async fn create_loan(
    user: AuthedUser,
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    validate::create_loan(&body)?;
    let now = Utc::now();

    let loan = state
        .db
        .insert_loan(Loan {
            id: Uuid::new_v4(),
            borrower_name: body["borrowerName"].as_str().unwrap_or_default().to_string(),
            loan_amount: body["loanAmount"].as_f64().unwrap_or_default(),
            interest_rate: body["interestRate"].as_f64().unwrap_or_default(),
            loan_term: body["loanTerm"].as_u64().unwrap_or_default() as u32,
            loan_status: LoanStatus::Pending,
            payment_due_date: validate::parse_iso_date(&body["paymentDueDate"])
                .ok_or_else(|| ApiError::Internal("validated date failed to parse".into()))?,
            created_by: user.0.id,
            created_at: now,
            updated_at: now,
        })
        .await;

    Ok(HttpResponse::Created().json(loan))
}

#[get("")]
pub async fn get_loans(
    user: AuthedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let loans = state.db.find_loans(user.0.id).await;
    Ok(HttpResponse::Ok().json(loans))
}

#[get("/{id}")]
pub async fn get_loan(
    user: AuthedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = validate::loan_id(&path)?;
    let loan = state
        .db
        .find_loan(user.0.id, id)
        .await
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(loan))
}

#[patch("/{id}")]
pub async fn update_loan(
    user: AuthedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let id = validate::loan_id(&path)?;
    validate::update_loan(&body)?;

    // All-or-nothing over the set of provided names: one stranger field
    // rejects the whole request before anything is touched.
    let fields = body.as_object().ok_or(ApiError::InvalidUpdate)?;
    if !fields
        .keys()
        .all(|key| ALLOWED_UPDATES.contains(&key.as_str()))
    {
        return Err(ApiError::InvalidUpdate);
    }

    let loan = state
        .db
        .find_loan_and_update(user.0.id, id, |loan| {
            if let Some(name) = body["borrowerName"].as_str() {
                loan.borrower_name = name.to_string();
            }
            if let Some(amount) = body["loanAmount"].as_f64() {
                loan.loan_amount = amount;
            }
            if let Some(rate) = body["interestRate"].as_f64() {
                loan.interest_rate = rate;
            }
            if let Some(term) = body["loanTerm"].as_u64() {
                loan.loan_term = term as u32;
            }
            if let Some(date) = validate::parse_iso_date(&body["paymentDueDate"]) {
                loan.payment_due_date = date;
            }
        })
        .await
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(loan))
}

#[patch("/{id}/status")]
pub async fn update_loan_status(
    user: AuthedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let id = validate::loan_id(&path)?;
    let status = body["status"]
        .as_str()
        .and_then(LoanStatus::parse)
        .ok_or(ApiError::InvalidStatus)?;

    let loan = state
        .db
        .find_loan_and_update(user.0.id, id, |loan| loan.loan_status = status)
        .await
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(loan))
}

#[delete("/{id}")]
pub async fn delete_loan(
    user: AuthedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = validate::loan_id(&path)?;
    let loan = state
        .db
        .find_loan_and_delete(user.0.id, id)
        .await
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        message: "Loan has been deleted successfully".to_string(),
        loan,
    }))
}
