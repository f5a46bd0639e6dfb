use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::application::InsightsEngine;
use crate::domain::insight::InsightType;
use crate::domain::preview::PreviewSummary;
use crate::domain::visualization::VisualizationSpec;
use crate::infrastructure::config::ServerConfig;
use crate::infrastructure::{storage, tabular};

/// A stored upload a client can refer back to by session id.
pub struct UploadedFile {
    pub path: PathBuf,
    pub original_filename: String,
    pub uploaded_at: DateTime<Utc>,
}

pub struct AppState {
    pub engine: InsightsEngine,
    pub upload_dir: PathBuf,
    pub sessions: Mutex<HashMap<Uuid, UploadedFile>>,
}

impl AppState {
    fn register_session(&self, path: PathBuf, original_filename: String) -> Uuid {
        let session_id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(
            session_id,
            UploadedFile {
                path,
                original_filename,
                uploaded_at: Utc::now(),
            },
        );
        session_id
    }

    fn session_path(&self, session_id: &Uuid) -> Option<PathBuf> {
        let sessions = self.sessions.lock().unwrap();
        sessions.get(session_id).map(|entry| entry.path.clone())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody { error: message })
}

fn server_error(message: String) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorBody { error: message })
}

#[derive(Serialize)]
struct SummaryResponse {
    success: bool,
    filename: String,
    summary: PreviewSummary,
    session_id: Uuid,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub session_id: Uuid,
    #[serde(default)]
    pub insight_type: InsightType,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    success: bool,
    insights: String,
    visualizations: Vec<VisualizationSpec>,
}

/// Register the bundled demo dataset and return its preview summary.
#[get("/sample_data")]
async fn sample_data(data: web::Data<AppState>) -> impl Responder {
    info!("loading sample data for demonstration");

    let path = match storage::ensure_sample_dataset(&data.upload_dir) {
        Ok(path) => path,
        Err(err) => {
            error!(error = %err, "failed to write sample dataset");
            return server_error(format!("Error loading sample data: {}", err));
        }
    };

    match data.engine.data_summary(&path) {
        Ok(summary) => {
            let session_id =
                data.register_session(path, storage::SAMPLE_FILENAME.to_string());
            HttpResponse::Ok().json(SummaryResponse {
                success: true,
                filename: format!("{} (Demo)", storage::SAMPLE_FILENAME),
                summary,
                session_id,
            })
        }
        Err(err) => {
            error!(error = %err, "failed to summarize sample dataset");
            server_error(format!("Error loading sample data: {}", err))
        }
    }
}

/// Accept a multipart upload, store it under a fresh session id, and return
/// the preview summary.
#[post("/upload")]
async fn upload(data: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    let mut uploaded: Option<(String, Vec<u8>)> = None;
    while let Ok(Some(mut field)) = payload.try_next().await {
        if field.name() != "file" {
            continue;
        }
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string)
            .unwrap_or_default();
        let mut bytes = Vec::new();
        while let Ok(Some(chunk)) = field.try_next().await {
            bytes.extend_from_slice(&chunk);
        }
        uploaded = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = match uploaded {
        Some(pair) => pair,
        None => {
            error!("no file part in the request");
            return bad_request("No file part in the request".to_string());
        }
    };

    if filename.is_empty() {
        error!("no selected file");
        return bad_request("No selected file".to_string());
    }
    info!(filename = %filename, size = bytes.len(), "received file");

    let extension = std::path::Path::new(&filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !tabular::is_supported(&extension) {
        error!(extension = %extension, "unsupported file type");
        return bad_request(format!(
            "Unsupported file type: .{}. Please upload CSV, Excel, or JSON files.",
            extension
        ));
    }

    let session_id = Uuid::new_v4();
    let path = storage::stored_file_path(&data.upload_dir, &session_id, &extension);
    if let Err(err) = storage::save_upload(&path, &bytes) {
        error!(error = %err, path = %path.display(), "failed to store upload");
        return server_error(format!("Error processing file: {}", err));
    }
    info!(path = %path.display(), "file saved");

    match data.engine.data_summary(&path) {
        Ok(summary) => {
            let mut sessions = data.sessions.lock().unwrap();
            sessions.insert(
                session_id,
                UploadedFile {
                    path,
                    original_filename: filename.clone(),
                    uploaded_at: Utc::now(),
                },
            );
            HttpResponse::Ok().json(SummaryResponse {
                success: true,
                filename,
                summary,
                session_id,
            })
        }
        Err(err) => {
            error!(error = %err, "failed to process uploaded file");
            server_error(format!("Error processing file: {}", err))
        }
    }
}

/// Generate insight text and chart data for a previously uploaded file.
#[post("/analyze")]
async fn analyze(data: web::Data<AppState>, req: web::Json<AnalyzeRequest>) -> impl Responder {
    let path = match data.session_path(&req.session_id) {
        Some(path) => path,
        None => {
            return bad_request("No file uploaded. Please upload a file first.".to_string())
        }
    };

    info!(
        session_id = %req.session_id,
        insight_type = ?req.insight_type,
        has_question = req.question.is_some(),
        "generating insights"
    );

    let insights = match data
        .engine
        .generate_insights(&path, req.question.as_deref(), req.insight_type)
        .await
    {
        Ok(insights) => insights,
        Err(err) => {
            error!(error = %err, "failed to generate insights");
            return server_error(format!("Error generating insights: {}", err));
        }
    };

    match data.engine.visualization_data(&path) {
        Ok(visualizations) => HttpResponse::Ok().json(AnalyzeResponse {
            success: true,
            insights,
            visualizations,
        }),
        Err(err) => {
            error!(error = %err, "failed to derive visualizations");
            server_error(format!("Error generating insights: {}", err))
        }
    }
}

pub fn start_server(server: &ServerConfig, state: AppState) -> std::io::Result<Server> {
    let data = web::Data::new(state);
    let host = server.host.clone();
    let port = server.port;

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // JSON API for a local/demo frontend

        App::new()
            .wrap(cors)
            .app_data(data.clone())
            .service(sample_data)
            .service(upload)
            .service(analyze)
    })
    .bind((host.as_str(), port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm_config::LLMConfig;
    use crate::infrastructure::llm_clients::gemini::GeminiClient;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;
    use std::sync::Arc;

    fn test_state() -> web::Data<AppState> {
        let upload_dir = std::env::temp_dir().join(format!("insighta-http-{}", Uuid::new_v4()));
        storage::ensure_upload_root(&upload_dir).unwrap();
        // No API key: the engine answers with canned text, no network.
        let engine = InsightsEngine::new(Arc::new(GeminiClient::new()), LLMConfig::default());
        web::Data::new(AppState {
            engine,
            upload_dir,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    #[actix_web::test]
    async fn test_analyze_without_session_is_bad_request() {
        let app = test::init_service(App::new().app_data(test_state()).service(analyze)).await;
        let req = test::TestRequest::post()
            .uri("/analyze")
            .set_json(serde_json::json!({ "session_id": Uuid::new_v4() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("No file uploaded"));
    }

    #[actix_web::test]
    async fn test_sample_data_then_analyze() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(sample_data)
                .service(analyze),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/sample_data").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["summary"]["type"], "dataframe");
        assert_eq!(body["summary"]["rows"], 10);
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/analyze")
                .set_json(serde_json::json!({
                    "session_id": session_id,
                    "insight_type": "general"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], Value::Bool(true));
        assert!(body["insights"].as_str().unwrap().contains("Insight"));
        let visualizations = body["visualizations"].as_array().unwrap();
        // 4 numeric columns: heatmap + 3 histograms, then 2 category charts.
        assert_eq!(visualizations.len(), 6);
        assert_eq!(visualizations[0]["type"], "heatmap");
        assert_eq!(visualizations[1]["type"], "histogram");
        assert_eq!(visualizations[4]["type"], "pie");

        std::fs::remove_dir_all(&state.upload_dir).ok();
    }
}
