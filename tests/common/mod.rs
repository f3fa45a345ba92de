use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::oneshot;

/// In-process stand-in for the catalog API, served from a dedicated thread so
/// the blocking client under test never shares a runtime with it. Dropping
/// the guard shuts the server down.
pub struct ServerGuard {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn spawn_server() -> Result<ServerGuard> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (addr_tx, addr_rx) = mpsc::channel::<SocketAddr>();

    let handle = thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build test runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind test listener");
            addr_tx
                .send(listener.local_addr().expect("local addr"))
                .expect("report test addr");
            axum::serve(listener, router())
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("serve mock catalog");
        });
    });

    let addr = addr_rx.recv().context("mock catalog failed to start")?;
    Ok(ServerGuard {
        base_url: format!("http://{}", addr),
        shutdown: Some(shutdown_tx),
        handle: Some(handle),
    })
}

fn router() -> Router {
    Router::new()
        .route("/api/courses", get(search_courses))
        .route("/api/courses/meta", get(catalog_meta))
        .route("/api/ai-assistant", post(ai_assistant))
        .with_state(fixture_courses())
}

/// Forty CS courses plus a handful from other departments, enough to page
/// through several windows of thirty.
fn fixture_courses() -> Vec<Value> {
    let mut courses = Vec::new();
    for n in 0..40 {
        courses.push(json!({
            "course_code": format!("CS {}", 100 + n),
            "course_name": format!("Computing Topics {}", n),
            "department": "CS",
            "credit_hours": "3",
            "description": format!("Topic {} in computing.", n),
            "gen_ed_requirements": if n % 2 == 0 { "Quantitative Reasoning" } else { "" },
        }));
    }
    courses.push(json!({
        "course_code": "MATH 241",
        "course_name": "Calculus III",
        "department": "MATH",
        // Numeric on the wire; the client must tolerate it.
        "credit_hours": 4,
        "description": "Multivariable calculus.",
        "gen_ed_requirements": "Quantitative Reasoning; Natural Sciences",
    }));
    courses.push(json!({
        "course_code": "ENGL 199",
        "course_name": "Writing Seminar",
        "department": "ENGL",
        "credit_hours": "3",
        "description": null,
        "gen_ed_requirements": "Advanced Composition",
    }));
    courses
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    major: Option<String>,
    #[serde(default)]
    geneds: Option<String>,
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

async fn search_courses(
    State(courses): State<Vec<Value>>,
    Query(query): Query<SearchQuery>,
) -> Json<Value> {
    let geneds: Vec<String> = query
        .geneds
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();
    let needle = query.q.as_deref().unwrap_or("").trim().to_lowercase();

    let matching: Vec<&Value> = courses
        .iter()
        .filter(|course| {
            if let Some(major) = query.major.as_deref() {
                if course["department"].as_str() != Some(major) {
                    return false;
                }
            }
            let tags = course["gen_ed_requirements"]
                .as_str()
                .unwrap_or("")
                .to_lowercase();
            if !geneds.iter().all(|g| tags.contains(g.as_str())) {
                return false;
            }
            if needle.is_empty() {
                return true;
            }
            ["course_code", "course_name", "description"]
                .iter()
                .any(|field| {
                    course[field]
                        .as_str()
                        .map(|text| text.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
        })
        .collect();

    let limit = query.limit.unwrap_or(30);
    Json(json!({
        "results": matching.iter().take(limit).collect::<Vec<_>>(),
        "matches": matching.len(),
    }))
}

async fn catalog_meta(State(courses): State<Vec<Value>>) -> Json<Value> {
    let mut departments: Vec<&str> = courses
        .iter()
        .filter_map(|course| course["department"].as_str())
        .collect();
    departments.sort_unstable();
    departments.dedup();
    Json(json!({
        "departments": departments,
        "geneds": [
            "Advanced Composition",
            "Natural Sciences",
            "Quantitative Reasoning",
        ],
    }))
}

/// The assistant endpoint's behavior is keyed off the requested major so each
/// test can pick the response shape it needs.
async fn ai_assistant(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match body["major"].as_str().unwrap_or("") {
        "CS" => {
            // The structured shape, JSON-encoded as a string.
            let inner = json!({
                "recommended_courses": [
                    {"course": "CS 225", "reason": "Core data structures."},
                    {"course": "CS 173", "reason": "Discrete math foundation."},
                ]
            });
            (
                StatusCode::OK,
                Json(json!({"recommendation": inner.to_string()})),
            )
        }
        "MATH" => (
            StatusCode::OK,
            Json(json!({
                "recommendation": {
                    "recommended_courses": [
                        {"course": "MATH 241", "reason": "Multivariable calculus."},
                    ]
                }
            })),
        ),
        "FAIL" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "model quota exhausted"})),
        ),
        "BROKEN" => (StatusCode::BAD_GATEWAY, Json(json!({"detail": "upstream"}))),
        other => (
            StatusCode::OK,
            Json(json!({
                "recommendation": format!("Consider an elective outside {other}."),
            })),
        ),
    }
}
