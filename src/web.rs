use std::path::PathBuf;
use std::sync::Mutex;

use actix_files::Files;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::Deserialize;

use crate::planner::{plan_between, PlanError};
use crate::store::{SeatAssignment, SeatStore};

/// Shared application state: the store behind a mutex, plus the file it is
/// persisted to (None keeps everything in memory, used by the tests)
pub struct AppState {
    pub store: Mutex<SeatStore>,
    pub data_path: Option<PathBuf>,
}

impl AppState {
    // Writes the store to disk after a mutation; a failed save is logged
    // but does not fail the request that already committed in memory
    fn persist(&self, store: &SeatStore) {
        if let Some(path) = &self.data_path {
            if let Err(e) = store.save(path) {
                log::warn!("failed to save store to {}: {}", path.display(), e);
            }
        }
    }
}

#[derive(Deserialize)]
pub struct CreateMemberRequest {
    name: String,
}

#[derive(Deserialize)]
pub struct LayoutRequest {
    name: String,
    seats: Vec<SeatAssignment>,
}

#[derive(Deserialize)]
pub struct CalculateMovesRequest {
    from_layout_id: i64,
    to_layout_id: i64,
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": message}))
}

// Maps a planning failure to a status code plus a machine-readable kind
fn plan_error_response(err: &PlanError) -> HttpResponse {
    let body = serde_json::json!({"error": err.kind(), "message": err.to_string()});
    match err {
        PlanError::LayoutNotFound(_) => HttpResponse::NotFound().json(body),
        PlanError::InvalidLayout(_) | PlanError::OutOfRange { .. } => {
            HttpResponse::BadRequest().json(body)
        }
        PlanError::NoHoldingSeat => HttpResponse::UnprocessableEntity().json(body),
    }
}

async fn list_members(state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.store.lock().unwrap();
    Ok(HttpResponse::Ok().json(store.list_members()))
}

async fn create_member(
    req: web::Json<CreateMemberRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.store.lock().unwrap();
    match store.create_member(&req.name) {
        Ok(member) => {
            state.persist(&store);
            Ok(HttpResponse::Ok().json(member))
        }
        Err(e) => Ok(bad_request(&e)),
    }
}

async fn delete_member(
    member_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.store.lock().unwrap();
    if store.delete_member(*member_id) {
        state.persist(&store);
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "Member not found"})))
    }
}

async fn list_layouts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.store.lock().unwrap();
    let layouts: Vec<serde_json::Value> = store
        .list_layouts()
        .iter()
        .map(|l| serde_json::json!({"id": l.id, "name": l.name}))
        .collect();
    Ok(HttpResponse::Ok().json(layouts))
}

async fn create_layout(
    req: web::Json<LayoutRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let mut store = state.store.lock().unwrap();
    match store.create_layout(&req.name, req.seats) {
        Ok(layout) => {
            state.persist(&store);
            Ok(HttpResponse::Ok().json(serde_json::json!({"id": layout.id, "name": layout.name})))
        }
        Err(e) => Ok(bad_request(&e)),
    }
}

async fn get_layout(layout_id: web::Path<i64>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.store.lock().unwrap();
    match store.get_layout(*layout_id) {
        Some(layout) => Ok(HttpResponse::Ok().json(&layout.seats)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "Layout not found"}))),
    }
}

async fn update_layout(
    layout_id: web::Path<i64>,
    req: web::Json<LayoutRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let mut store = state.store.lock().unwrap();
    match store.update_layout(*layout_id, &req.name, req.seats) {
        Ok(()) => {
            state.persist(&store);
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
        }
        Err(e) => Ok(bad_request(&e)),
    }
}

async fn delete_layout(
    layout_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.store.lock().unwrap();
    if store.delete_layout(*layout_id) {
        state.persist(&store);
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "Layout not found"})))
    }
}

async fn calculate_moves(
    req: web::Json<CalculateMovesRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let store = state.store.lock().unwrap();
    match plan_between(&*store, req.from_layout_id, req.to_layout_id) {
        Ok(plan) => Ok(HttpResponse::Ok().json(plan)),
        Err(e) => Ok(plan_error_response(&e)),
    }
}

async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Registers every API route; shared between the server and the tests
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/members", web::get().to(list_members))
        .route("/api/members", web::post().to(create_member))
        .route("/api/members/{id}", web::delete().to(delete_member))
        .route("/api/layouts", web::get().to(list_layouts))
        .route("/api/layouts", web::post().to(create_layout))
        .route("/api/layouts/{id}", web::get().to(get_layout))
        .route("/api/layouts/{id}", web::put().to(update_layout))
        .route("/api/layouts/{id}", web::delete().to(delete_layout))
        .route("/api/calculate-moves", web::post().to(calculate_moves));
}

pub async fn start_server(port: u16, store: SeatStore, data_path: PathBuf) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        store: Mutex::new(store),
        data_path: Some(data_path),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(configure_routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
