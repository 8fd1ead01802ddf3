//! Servidor web Axum com WebSocket para visualização do NER em tempo real

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use crf_ner_core::{
    corpus::demo_texts,
    legend::{self, LegendEntry},
    AnalyzedToken, EntitySpan, NerError, NerPipeline, Palette, PipelineEvent,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::render::{ResultPage, View};

/// Pausa entre eventos enviados pelo WebSocket (animação passo a passo)
const EVENT_DELAY_MS: u64 = 35;

/// Estado compartilhado da aplicação
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<NerPipeline>,
}

impl AppState {
    pub fn new(pipeline: NerPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Erro de API serializado como `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<NerError> for ApiError {
    fn from(err: NerError) -> Self {
        let status = match err {
            NerError::EmptyInput | NerError::EmptySentence | NerError::EmptyWord { .. } => {
                StatusCode::BAD_REQUEST
            }
            NerError::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "falha na requisição");
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
    #[serde(default)]
    palette: Option<String>,
}

/// Mensagem WebSocket recebida do cliente
#[derive(Deserialize)]
struct WsRequest {
    text: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    entities: Vec<EntitySpan>,
    tokens: Vec<AnalyzedToken>,
    legend: Vec<LegendEntry>,
    processing_ms: u64,
    total_tokens: usize,
}

#[derive(Deserialize)]
struct RenderQuery {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    view: View,
    #[serde(default)]
    palette: Option<String>,
}

#[derive(Deserialize)]
struct LegendQuery {
    #[serde(default)]
    palette: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    model: &'a str,
    labels: &'a [String],
}

/// Monta o roteador com todas as rotas e camadas.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/render", get(render_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/legend", get(legend_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Paleta pedida pelo cliente, ou a configurada no pipeline
fn resolve_palette(requested: Option<&str>, state: &AppState) -> Result<Palette, ApiError> {
    match requested {
        Some(name) => name.parse().map_err(ApiError::unprocessable),
        None => Ok(state.pipeline.palette()),
    }
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("../templates/index.html"))
}

/// Análise NER via HTTP POST (sem streaming)
async fn analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let palette = resolve_palette(req.palette.as_deref(), &state)?;
    let analysis = state.pipeline.analyze(&req.text)?;
    let total_tokens = analysis.tokens.len();

    Ok(Json(AnalyzeResponse {
        entities: analysis.entities,
        tokens: analysis.tokens,
        legend: legend::legend(palette),
        processing_ms: analysis.processing_ms,
        total_tokens,
    }))
}

/// Página de resultado renderizada no servidor
async fn render_handler(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
) -> Result<Html<String>, ApiError> {
    let palette = resolve_palette(query.palette.as_deref(), &state)?;
    let page = match query.text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => {
            let analysis = state.pipeline.analyze(text)?;
            ResultPage::from_analysis(text, &analysis, query.view, palette)
        }
        _ => ResultPage::empty(palette),
    };
    Ok(Html(page.render()?))
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Legenda de cores (`?palette=sunset`)
async fn legend_handler(
    State(state): State<AppState>,
    Query(query): Query<LegendQuery>,
) -> Result<Json<Vec<LegendEntry>>, ApiError> {
    let palette = resolve_palette(query.palette.as_deref(), &state)?;
    Ok(Json(legend::legend(palette)))
}

async fn health_handler(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "ok",
        model: state.pipeline.model_source(),
        labels: state.pipeline.labels(),
    })
    .into_response()
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa pipeline e envia eventos em tempo real
async fn handle_websocket(mut socket: WebSocket, state: AppState) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // JSON {text} ou texto puro
                let text = match serde_json::from_str::<WsRequest>(&text) {
                    Ok(req) => req.text,
                    Err(_) => text.to_string(),
                };
                info!("Analisando via WebSocket: {} chars", text.len());

                let (tx_std, rx_std) = std::sync::mpsc::channel::<PipelineEvent>();
                let pipeline = Arc::clone(&state.pipeline);

                // O pipeline é síncrono: roda fora do runtime
                let handle = tokio::task::spawn_blocking(move || {
                    pipeline.analyze_streaming(&text, tx_std);
                });
                if let Err(e) = handle.await {
                    tracing::error!(error = %e, "tarefa de análise falhou");
                    continue;
                }

                // O pipeline já terminou: todos os eventos estão na fila
                let events: Vec<PipelineEvent> = rx_std.try_iter().collect();

                for event in &events {
                    let json = match serde_json::to_string(event) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::warn!(error = %e, "evento não serializável");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(json)).await.is_err() {
                        return; // cliente desconectou
                    }
                    tokio::time::sleep(tokio::time::Duration::from_millis(EVENT_DELAY_MS)).await;
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use crf_ner_core::NerConfig;
    use tower::ServiceExt;

    fn app() -> Router {
        let pipeline = NerPipeline::new(&NerConfig::default()).unwrap();
        router(AppState::new(pipeline))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_analyze(payload: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let (status, json) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "bundled");
        assert_eq!(json["labels"].as_array().map(Vec::len), Some(17));
    }

    #[tokio::test]
    async fn test_analyze_returns_entities() {
        let (status, json) =
            post_analyze(serde_json::json!({ "text": "Barack Obama visited Paris in July 2021." })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_tokens"], 8);
        assert_eq!(json["entities"][0]["text"], "Barack Obama");
        assert_eq!(json["entities"][0]["entity"], "per");
        assert_eq!(json["entities"][1]["text"], "Paris");
        assert_eq!(json["tokens"][0]["label"], "B-per");
        assert_eq!(json["legend"].as_array().map(Vec::len), Some(9));
    }

    #[tokio::test]
    async fn test_analyze_empty_text_is_bad_request() {
        let (status, json) = post_analyze(serde_json::json!({ "text": "   " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_unknown_palette_is_unprocessable() {
        let (status, json) =
            post_analyze(serde_json::json!({ "text": "Obama", "palette": "neon" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("neon"));
    }

    #[tokio::test]
    async fn test_legend_palettes() {
        let (status, json) = get_json("/legend?palette=sunset").await;
        assert_eq!(status, StatusCode::OK);
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[2]["key"], "per");
        assert_eq!(entries[2]["color"], "#F8961E");

        let (status, _) = get_json("/legend?palette=neon").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, json) = get_json("/legend").await;
        assert_eq!(json[0]["color"], "#8BC34A");
    }

    #[tokio::test]
    async fn test_demo_texts() {
        let (status, json) = get_json("/demo-texts").await;
        assert_eq!(status, StatusCode::OK);
        let demos = json.as_array().unwrap();
        assert_eq!(demos.len(), 6);
        assert_eq!(demos[0]["domain"], "Default");
    }

    #[tokio::test]
    async fn test_render_inline_and_table() {
        let text = "Barack%20Obama%20visited%20Paris%20in%20July%202021.";

        let request = Request::builder()
            .uri(format!("/render?text={text}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        let html = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Barack Obama<small>👤 Person</small>"));
        assert!(html.contains("background: #03A9F4"));

        let request = Request::builder()
            .uri(format!("/render?text={text}&view=table&palette=displacy"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        let html = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<td>B-per</td>"));
        assert!(html.contains("value=\"displacy\" selected"));
    }

    #[tokio::test]
    async fn test_render_without_text_shows_form() {
        let request = Request::builder().uri("/render").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("<form"));
    }

    #[tokio::test]
    async fn test_index_page() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("/ws"));
    }
}
