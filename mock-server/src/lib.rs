//! In-memory stand-in for the ticket API, used by the client's integration
//! tests. Responses use the server's snake_case envelope.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    pub data_item_id: Uuid,
    pub data_type_id: u64,
    pub data_item_value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: u64,
    pub organization_id: u64,
    pub title: String,
    pub ticket_status: String,
    pub due_date: Option<String>,
    pub data_items: Vec<DataItem>,
}

/// The wrapper every JSON reply is sent in.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "_meta")]
    pub meta: Value,
    pub code: u16,
    pub errors: Option<Vec<String>>,
    pub data: T,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            meta: json!({}),
            code: 200,
            errors: None,
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    pub query_string: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TicketUpdate {
    pub action: String,
    pub due_date: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDataItem {
    pub data_type_id: u64,
    pub data_item_value: Value,
}

pub type Db = Arc<RwLock<BTreeMap<u64, Ticket>>>;

/// Tickets every fresh server starts with.
pub fn seed() -> BTreeMap<u64, Ticket> {
    [
        (1, 3, "Blackbriar store audit", "ASSIGNED"),
        (2, 3, "Treadstone shelf check", "UNASSIGNED"),
        (3, 3, "Blackbriar price survey", "UNASSIGNED"),
        (4, 9, "Outcome inventory count", "ASSIGNED"),
    ]
    .into_iter()
    .map(|(ticket_id, organization_id, title, status)| {
        let ticket = Ticket {
            ticket_id,
            organization_id,
            title: title.to_string(),
            ticket_status: status.to_string(),
            due_date: None,
            data_items: Vec::new(),
        };
        (ticket_id, ticket)
    })
    .collect()
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/v1/auth", get(get_auth).post(get_auth))
        .route("/v1/forgot_password", post(forgot_password))
        .route("/v1/reset_password", post(reset_password))
        .route("/v2/organizations/{organization_id}/search/tickets", post(search_tickets))
        .route("/v1/tickets/{ticket_id}", get(get_ticket).put(update_ticket))
        .route("/v1/tickets/{ticket_id}/data_items", post(create_data_item))
        .route("/v1/tickets/{ticket_id}/data_items/{data_item_id}", delete(delete_data_item))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = Envelope {
        meta: json!({}),
        code: status.as_u16(),
        errors: Some(vec![message.to_string()]),
        data: Value::Null,
    };
    (status, Json(body)).into_response()
}

async fn get_auth(headers: HeaderMap) -> Response {
    let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) else {
        return error(StatusCode::UNAUTHORIZED, "missing credentials");
    };
    let auth_type = match auth.split_once(' ') {
        Some(("Basic", _)) => "basic",
        Some(("Token", _)) => "token",
        _ => return error(StatusCode::UNAUTHORIZED, "unsupported authorization scheme"),
    };
    Envelope::ok(vec![json!({ "customer_id": 1, "auth_type": auth_type })]).into_response()
}

async fn forgot_password(Json(body): Json<Value>) -> Response {
    if body.get("email").and_then(Value::as_str).is_none() {
        return error(StatusCode::BAD_REQUEST, "email is required");
    }
    "Success!".into_response()
}

async fn reset_password(Json(body): Json<Value>) -> Response {
    for key in ["email", "password", "token"] {
        if body.get(key).and_then(Value::as_str).is_none() {
            return error(StatusCode::BAD_REQUEST, &format!("{key} is required"));
        }
    }
    Envelope::ok(Value::Null).into_response()
}

async fn search_tickets(
    State(db): State<Db>,
    Path(organization_id): Path<u64>,
    Query(page): Query<SearchQuery>,
    Json(body): Json<SearchBody>,
) -> Response {
    let needle = body.query_string.unwrap_or_default().to_lowercase();
    let tickets = db.read().await;
    let matches: Vec<&Ticket> = tickets
        .values()
        .filter(|t| t.organization_id == organization_id)
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .collect();
    let total = matches.len();
    let hits: Vec<Ticket> = matches
        .into_iter()
        .skip(page.offset.unwrap_or(0))
        .take(page.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    debug!(organization_id, total, returned = hits.len(), "ticket search");
    Envelope::ok(json!({ "hits": hits, "total_records": total })).into_response()
}

async fn get_ticket(State(db): State<Db>, Path(ticket_id): Path<u64>) -> Response {
    match db.read().await.get(&ticket_id) {
        Some(ticket) => Envelope::ok(vec![ticket.clone()]).into_response(),
        None => error(StatusCode::NOT_FOUND, "ticket not found"),
    }
}

async fn update_ticket(
    State(db): State<Db>,
    Path(ticket_id): Path<u64>,
    Json(update): Json<TicketUpdate>,
) -> Response {
    let mut tickets = db.write().await;
    let Some(ticket) = tickets.get_mut(&ticket_id) else {
        return error(StatusCode::NOT_FOUND, "ticket not found");
    };
    match update.action.as_str() {
        "extend" => ticket.due_date = update.due_date,
        "assign" => ticket.ticket_status = "ASSIGNED".to_string(),
        "cancel" => ticket.ticket_status = "CANCELED".to_string(),
        "edit" => {
            if let Some(title) = update.title {
                ticket.title = title;
            }
        }
        other => return error(StatusCode::BAD_REQUEST, &format!("unknown action {other}")),
    }
    Envelope::ok(vec![ticket.clone()]).into_response()
}

async fn create_data_item(
    State(db): State<Db>,
    Path(ticket_id): Path<u64>,
    Json(input): Json<CreateDataItem>,
) -> Response {
    let mut tickets = db.write().await;
    let Some(ticket) = tickets.get_mut(&ticket_id) else {
        return error(StatusCode::NOT_FOUND, "ticket not found");
    };
    ticket.data_items.push(DataItem {
        data_item_id: Uuid::new_v4(),
        data_type_id: input.data_type_id,
        data_item_value: input.data_item_value,
    });
    (StatusCode::CREATED, Envelope::ok(vec![ticket.clone()])).into_response()
}

async fn delete_data_item(
    State(db): State<Db>,
    Path((ticket_id, data_item_id)): Path<(u64, Uuid)>,
) -> Response {
    let mut tickets = db.write().await;
    let Some(ticket) = tickets.get_mut(&ticket_id) else {
        return error(StatusCode::NOT_FOUND, "ticket not found");
    };
    let before = ticket.data_items.len();
    ticket.data_items.retain(|item| item.data_item_id != data_item_id);
    if ticket.data_items.len() == before {
        return error(StatusCode::NOT_FOUND, "data item not found");
    }
    Envelope::ok(vec![ticket.clone()]).into_response()
}
