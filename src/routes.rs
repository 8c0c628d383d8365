use std::sync::Arc;

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::codec::{decode_trip, encode_trip};
use crate::error::AppError;
use crate::schemas::{now_millis, Currency, Expense, Person, Trip};
use crate::share::ShareStore;
use crate::store::TripStore;

#[derive(Clone)]
pub struct AppState {
    pub trips: Arc<dyn TripStore>,
    pub shares: Arc<dyn ShareStore>,
}

type Response = Result<HttpResponse, AppError>;

#[derive(Deserialize, Serialize)]
struct NewTripJson {
    name: String,
    #[serde(default)]
    currency: Currency,
}

#[derive(Deserialize, Serialize)]
struct EncodedTripJson {
    data: String,
}

#[derive(Deserialize, Serialize)]
struct ShareRequestJson {
    trip: Trip,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareCreatedJson {
    id: String,
    expires_at: i64,
}

async fn load_trip(state: &AppState, id: &str) -> Result<Trip, AppError> {
    state.trips.get(id).await?.ok_or(AppError::TripNotFound)
}

// Applies a change to a stored trip and persists the result. A concurrent
// write between the load and the update surfaces as a conflict.
async fn modify_trip<F>(state: &AppState, id: &str, change: F) -> Response
where
    F: FnOnce(&mut Trip) -> Result<(), AppError>,
{
    let mut trip = load_trip(state, id).await?;
    change(&mut trip)?;
    let trip = state.trips.update(trip).await?;
    Ok(HttpResponse::Ok().json(trip))
}

#[get("/api/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "timestamp": now_millis() }))
}

#[get("/api/trips")]
async fn list_trips(state: web::Data<AppState>) -> Response {
    Ok(HttpResponse::Ok().json(state.trips.list().await?))
}

#[post("/api/trips")]
async fn create_trip(state: web::Data<AppState>, json: web::Json<NewTripJson>) -> Response {
    let NewTripJson { name, currency } = json.into_inner();
    let trip = state.trips.create(name.trim(), currency).await?;
    tracing::info!(trip = %trip.id, currency = %trip.currency, "created trip");
    Ok(HttpResponse::Created().json(trip))
}

#[get("/api/trips/{id}")]
async fn get_trip(state: web::Data<AppState>, id: web::Path<String>) -> Response {
    Ok(HttpResponse::Ok().json(load_trip(&state, &id).await?))
}

#[delete("/api/trips/{id}")]
async fn delete_trip(state: web::Data<AppState>, id: web::Path<String>) -> Response {
    if state.trips.delete(&id).await? {
        tracing::info!(trip = %id, "deleted trip");
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::TripNotFound)
    }
}

#[post("/api/trips/{id}/people")]
async fn add_person(
    state: web::Data<AppState>,
    id: web::Path<String>,
    person: web::Json<Person>,
) -> Response {
    modify_trip(&state, &id, |trip| {
        trip.add_person(person.into_inner()).map_err(AppError::from)
    })
    .await
}

#[put("/api/trips/{id}/people/{index}")]
async fn update_person(
    state: web::Data<AppState>,
    path: web::Path<(String, usize)>,
    person: web::Json<Person>,
) -> Response {
    let (id, index) = path.into_inner();
    modify_trip(&state, &id, |trip| {
        trip.update_person(index, person.into_inner())
            .map_err(AppError::from)
    })
    .await
}

#[delete("/api/trips/{id}/people/{index}")]
async fn remove_person(state: web::Data<AppState>, path: web::Path<(String, usize)>) -> Response {
    let (id, index) = path.into_inner();
    modify_trip(&state, &id, |trip| {
        trip.remove_person(index)?;
        Ok(())
    })
    .await
}

#[post("/api/trips/{id}/expenses")]
async fn add_expense(
    state: web::Data<AppState>,
    id: web::Path<String>,
    expense: web::Json<Expense>,
) -> Response {
    modify_trip(&state, &id, |trip| {
        trip.add_expense(expense.into_inner()).map_err(AppError::from)
    })
    .await
}

#[put("/api/trips/{id}/expenses/{expense_id}")]
async fn update_expense(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    expense: web::Json<Expense>,
) -> Response {
    let (id, expense_id) = path.into_inner();
    modify_trip(&state, &id, |trip| {
        trip.update_expense(&expense_id, expense.into_inner())
            .map_err(AppError::from)
    })
    .await
}

#[delete("/api/trips/{id}/expenses/{expense_id}")]
async fn remove_expense(state: web::Data<AppState>, path: web::Path<(String, String)>) -> Response {
    let (id, expense_id) = path.into_inner();
    modify_trip(&state, &id, |trip| {
        trip.remove_expense(&expense_id)?;
        Ok(())
    })
    .await
}

#[get("/api/trips/{id}/settlement")]
async fn get_settlement(state: web::Data<AppState>, id: web::Path<String>) -> Response {
    let trip = load_trip(&state, &id).await?;
    let settlement = trip.settlement();
    tracing::debug!(
        trip = %trip.id,
        total = %trip.currency.format(settlement.total_cost),
        transactions = settlement.transactions.len(),
        "computed settlement"
    );
    Ok(HttpResponse::Ok().json(settlement))
}

#[get("/api/trips/{id}/export")]
async fn export_trip(state: web::Data<AppState>, id: web::Path<String>) -> Response {
    let trip = load_trip(&state, &id).await?;
    let data = encode_trip(&trip)?;
    Ok(HttpResponse::Ok().json(EncodedTripJson { data }))
}

#[post("/api/import")]
async fn import_trip(state: web::Data<AppState>, json: web::Json<EncodedTripJson>) -> Response {
    let compact = decode_trip(&json.data)?;
    tracing::info!(name = compact.name(), "importing shared trip");
    let trip = state.trips.save(compact.into_trip()).await?;
    Ok(HttpResponse::Created().json(trip))
}

#[post("/api/share")]
async fn share_trip(state: web::Data<AppState>, json: web::Json<ShareRequestJson>) -> Response {
    let share = state.shares.create(json.into_inner().trip).await?;
    tracing::info!(share = %share.id, trip = %share.trip.id, "shared trip");
    Ok(HttpResponse::Ok().json(ShareCreatedJson {
        id: share.id,
        expires_at: share.expires_at,
    }))
}

#[get("/api/share/{id}")]
async fn get_shared_trip(state: web::Data<AppState>, id: web::Path<String>) -> Response {
    let trip = state.shares.fetch(&id).await?;
    Ok(HttpResponse::Ok().json(ShareRequestJson { trip }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list_trips)
        .service(create_trip)
        .service(get_trip)
        .service(delete_trip)
        .service(add_person)
        .service(update_person)
        .service(remove_person)
        .service(add_expense)
        .service(update_expense)
        .service(remove_expense)
        .service(get_settlement)
        .service(export_trip)
        .service(import_trip)
        .service(share_trip)
        .service(get_shared_trip);
}
