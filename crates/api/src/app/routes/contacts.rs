//! Owner-scoped contact CRUD, search, and birthday queries.
//!
//! Every store call carries the authenticated owner id; a contact belonging
//! to someone else yields the same 404 as one that does not exist. Each
//! operation class is rate limited independently per client address.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use rolodex_contacts::{ContactPatch, NewContact};
use rolodex_core::ContactId;

use crate::app::rate::{self, RateClass};
use crate::app::{dto, errors, services::AppServices};
use crate::context::{ClientIp, CurrentUser};

const MAX_PAGE_SIZE: u64 = 1000;
const DEFAULT_PAGE_SIZE: u64 = 100;
const DEFAULT_BIRTHDAY_WINDOW_DAYS: u32 = 7;
const MAX_BIRTHDAY_WINDOW_DAYS: u32 = 365;

pub fn router() -> Router {
    Router::new()
        .route("/contacts/", axum::routing::post(create).get(list))
        .route("/contacts/search/", get(search))
        .route("/contacts/birthdays/upcoming/", get(upcoming_birthdays))
        .route(
            "/contacts/:id",
            get(get_one).put(update).delete(delete_one),
        )
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(ip): Extension<ClientIp>,
    Json(body): Json<NewContact>,
) -> axum::response::Response {
    if let Err(r) = rate::check(&services, RateClass::ContactCreate, &ip) {
        return r;
    }

    let input = match body.validate() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .contacts
        .insert(input.into_contact(user.id, Utc::now()))
        .await
    {
        Ok(contact) => {
            (StatusCode::CREATED, Json(dto::contact_to_json(&contact))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(ip): Extension<ClientIp>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    if let Err(r) = rate::check(&services, RateClass::ContactRead, &ip) {
        return r;
    }

    let skip = query.skip.unwrap_or(0);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    match services.contacts.list(user.id, skip, limit).await {
        Ok(contacts) => contacts_json(&contacts),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(ip): Extension<ClientIp>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(r) = rate::check(&services, RateClass::ContactRead, &ip) {
        return r;
    }
    let id = match parse_contact_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match services.contacts.get(user.id, id).await {
        Ok(Some(contact)) => {
            (StatusCode::OK, Json(dto::contact_to_json(&contact))).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(ip): Extension<ClientIp>,
    Path(id): Path<String>,
    Json(body): Json<ContactPatch>,
) -> axum::response::Response {
    if let Err(r) = rate::check(&services, RateClass::ContactUpdate, &ip) {
        return r;
    }
    let id = match parse_contact_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    let patch = match body.validate() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.contacts.update(user.id, id, patch).await {
        Ok(Some(contact)) => {
            (StatusCode::OK, Json(dto::contact_to_json(&contact))).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(ip): Extension<ClientIp>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(r) = rate::check(&services, RateClass::ContactDelete, &ip) {
        return r;
    }
    let id = match parse_contact_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match services.contacts.delete(user.id, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(ip): Extension<ClientIp>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    if let Err(r) = rate::check(&services, RateClass::ContactSearch, &ip) {
        return r;
    }

    match services.contacts.search(user.id, &query.query).await {
        Ok(contacts) => contacts_json(&contacts),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn upcoming_birthdays(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(ip): Extension<ClientIp>,
    Query(query): Query<dto::BirthdaysQuery>,
) -> axum::response::Response {
    if let Err(r) = rate::check(&services, RateClass::ContactBirthdays, &ip) {
        return r;
    }

    let days = query.days.unwrap_or(DEFAULT_BIRTHDAY_WINDOW_DAYS);
    if days < 1 || days > MAX_BIRTHDAY_WINDOW_DAYS {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "days must be between 1 and 365",
        );
    }

    let today = Utc::now().date_naive();
    match services
        .contacts
        .upcoming_birthdays(user.id, today, days)
        .await
    {
        Ok(contacts) => contacts_json(&contacts),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn contacts_json(contacts: &[rolodex_contacts::Contact]) -> axum::response::Response {
    let items = contacts.iter().map(dto::contact_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
}

fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "contact not found")
}

fn parse_contact_id(raw: &str) -> Result<ContactId, axum::response::Response> {
    raw.parse::<ContactId>()
        .map_err(errors::domain_error_to_response)
}
