use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use fakecheck_i18n::loader::validate_language;
use fakecheck_i18n::{
    DirSource, I18n, Params, PhraseCatalog, Translated, list_languages, negotiate_language,
};
use fakecheck_verify::validation::minutes_until;
use fakecheck_verify::{
    FileHistory, GeminiProvider, GoogleCustomSearch, MemoryHistory, MockClassifier, MockMode,
    Verification, Verifier, VerifyError,
};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_LOCALES_DIR: &str = "locales";

#[derive(Serialize, Deserialize)]
pub struct TranslateResponse {
    pub key: String,
    pub language: String,
    /// A string, a list of strings or a nested object
    pub value: Value,
    /// False when the key resolved nowhere and `value` is the key itself
    pub found: bool,
}

#[derive(Serialize, Deserialize)]
pub struct VerifyRequest {
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Language for error messages
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Deserialize)]
pub struct LangQuery {
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            details: Vec::new(),
            retry_after_secs: None,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<Verifier>,
    pub locales: Arc<DirSource>,
    pub phrases: Arc<PhraseCatalog>,
}

impl AppState {
    pub fn new(verifier: Verifier, locales_dir: impl Into<PathBuf>) -> Self {
        AppState {
            verifier: Arc::new(verifier),
            locales: Arc::new(DirSource::new(locales_dir)),
            phrases: Arc::new(PhraseCatalog::builtin()),
        }
    }
}

/// Gemini when `GEMINI_API_KEY` is set, the simulated classifier otherwise
fn verifier_from_env() -> Verifier {
    let mut verifier = match GeminiProvider::from_env() {
        Ok(provider) => Verifier::new(Arc::new(provider)),
        Err(e) => {
            warn!("{}; using the simulated classifier", e);
            Verifier::new(Arc::new(MockClassifier::new(MockMode::Simulated)))
        }
    };
    match GoogleCustomSearch::from_env() {
        Ok(search) => verifier = verifier.with_search(Arc::new(search)),
        Err(e) => warn!("{}; recent-event cross-checks disabled", e),
    }
    match std::env::var("FAKECHECK_HISTORY_FILE") {
        Ok(path) => match FileHistory::open(&path) {
            Ok(store) => verifier.with_history(store),
            Err(e) => {
                warn!("Cannot open history file {}: {}; keeping it in memory", path, e);
                verifier.with_history(MemoryHistory::new())
            }
        },
        Err(_) => verifier.with_history(MemoryHistory::new()),
    }
}

pub fn app(state: AppState) -> Router {
    let locales_dir = state.locales.root().to_path_buf();
    Router::new()
        .route("/", get(serve_index))
        .route("/api/t", get(translate_key))
        .route("/api/languages", get(languages))
        .route("/api/verify", post(verify_text))
        .route("/api/history", get(history).delete(clear_history))
        .nest_service("/locales", ServeDir::new(locales_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let addr = std::env::var("FAKECHECK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let locales_dir =
        std::env::var("FAKECHECK_LOCALES_DIR").unwrap_or_else(|_| DEFAULT_LOCALES_DIR.to_string());

    let verifier = verifier_from_env();
    info!(
        "🔎 Starting fakecheck web server ({}, locales from {})",
        verifier.provider_name(),
        locales_dir
    );
    let state = AppState::new(verifier, locales_dir);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn serve_index() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        include_str!("static/index.html"),
    )
}

/// First tag of an `Accept-Language` header
fn browser_language(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::ACCEPT_LANGUAGE)?
        .to_str()
        .ok()?
        .split([',', ';'])
        .next()
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
}

/// `GET /api/t?key=home.title&lang=en&name=Ana`
///
/// Query parameters other than `key` and `lang` fill placeholders. Without
/// `lang` the language is negotiated from `Accept-Language`.
async fn translate_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(mut query): Query<HashMap<String, String>>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let key = query.remove("key").filter(|key| !key.trim().is_empty()).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing 'key' query parameter")),
        )
    })?;

    let lang = match query.remove("lang") {
        Some(lang) => lang,
        None => negotiate_language(None, browser_language(&headers)),
    };
    validate_language(&lang).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    let params: Params = query.into_iter().collect();

    let mut i18n = I18n::new();
    i18n.load(&lang, state.locales.as_ref()).await;

    let found = i18n.has_key(&key);
    let value = match i18n.t_with(&key, &params) {
        Translated::Text(text) => Value::String(text),
        Translated::List(items) => Value::from(items.to_vec()),
        Translated::Tree(tree) => serde_json::to_value(tree).map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Failed to encode translation: {}", e))),
            )
        })?,
    };

    Ok(Json(TranslateResponse {
        key,
        language: lang,
        value,
        found,
    }))
}

async fn languages(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    list_languages(state.locales.root()).map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Failed to list languages: {}", e))),
        )
    })
}

async fn verify_text(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<Verification>, ApiError> {
    let lang = request.lang.as_deref().unwrap_or("pt");
    let tr = |phrase: &str, params: &Params| state.phrases.translate(phrase, lang, params);

    match state
        .verifier
        .verify(&request.text, request.user_id.as_deref())
        .await
    {
        Ok(verification) => Ok(Json(verification)),
        Err(VerifyError::InvalidInput(errors)) => {
            let details: Vec<String> = errors
                .iter()
                .map(|error| tr(error, &Params::new()))
                .collect();
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: details.first().cloned().unwrap_or_default(),
                    details,
                    retry_after_secs: None,
                }),
            ))
        }
        Err(VerifyError::RateLimited { retry_after }) => {
            let minutes = minutes_until(retry_after);
            Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    error: tr(
                        "Muitas requisições. Tente novamente em {minutes} minuto(s)",
                        &Params::new().with("minutes", minutes),
                    ),
                    details: Vec::new(),
                    retry_after_secs: Some(retry_after.as_secs()),
                }),
            ))
        }
        Err(e) => {
            warn!("Verification failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(tr(
                    "Ocorreu um erro durante a verificação. Tente novamente.",
                    &Params::new(),
                ))),
            ))
        }
    }
}

/// `GET /api/history`, newest first
async fn history(State(state): State<AppState>) -> Json<Vec<Verification>> {
    Json(state.verifier.history())
}

/// `DELETE /api/history?lang=en`
async fn clear_history(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let lang = query.lang.as_deref().unwrap_or("pt");
    let tr = |phrase: &str| state.phrases.translate(phrase, lang, &Params::new());

    match state.verifier.clear_history() {
        Ok(()) => Ok(Json(MessageResponse {
            message: tr("Histórico apagado com sucesso!"),
        })),
        Err(e) => {
            warn!("Failed to clear history: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(tr("Não foi possível apagar o histórico"))),
            ))
        }
    }
}
