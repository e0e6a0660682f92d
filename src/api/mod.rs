use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

use crate::core::{
    Allocation, AllocationInput, AmountParseError, calculate, parse_amount, render_summary,
};
use crate::settings::{DefaultsError, Settings, SettingsStore, reset_defaults, save_defaults};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn SettingsStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }
}

/// Form fields arrive either as JSON numbers or as the raw text the user
/// typed (`"$1,200.00"`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
enum AmountValue {
    Number(f64),
    Text(String),
}

impl AmountValue {
    fn resolve(&self) -> Result<f64, AmountParseError> {
        match self {
            AmountValue::Number(value) => Ok(*value),
            AmountValue::Text(text) => parse_amount(text),
        }
    }
}

fn resolve_amount(label: &str, value: Option<&AmountValue>, fallback: f64) -> Result<f64, String> {
    match value {
        Some(value) => value.resolve().map_err(|e| format!("{label}: {e}")),
        None => Ok(fallback),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FormPayload {
    deposit: Option<AmountValue>,
    fees: Option<AmountValue>,
    sales_tax_amount: Option<AmountValue>,

    profit_percent: Option<AmountValue>,
    owner_pay_percent: Option<AmountValue>,
    income_tax_percent: Option<AmountValue>,
    opex_percent: Option<AmountValue>,

    back_out_fees: Option<bool>,
    back_out_sales_tax: Option<bool>,
}

impl FormPayload {
    /// Overlays the submitted fields on `base`; absent fields keep `base`.
    fn to_settings(&self, base: &Settings) -> Result<Settings, String> {
        Ok(Settings {
            profit_percent: resolve_amount(
                "Profit %",
                self.profit_percent.as_ref(),
                base.profit_percent,
            )?,
            owner_pay_percent: resolve_amount(
                "Owner Pay %",
                self.owner_pay_percent.as_ref(),
                base.owner_pay_percent,
            )?,
            income_tax_percent: resolve_amount(
                "Income Tax %",
                self.income_tax_percent.as_ref(),
                base.income_tax_percent,
            )?,
            opex_percent: resolve_amount("Opex %", self.opex_percent.as_ref(), base.opex_percent)?,
            back_out_processing_fees: self.back_out_fees.unwrap_or(base.back_out_processing_fees),
            back_out_sales_tax_before_pf: self
                .back_out_sales_tax
                .unwrap_or(base.back_out_sales_tax_before_pf),
            sales_tax_amount: resolve_amount(
                "Sales tax amount",
                self.sales_tax_amount.as_ref(),
                base.sales_tax_amount,
            )?,
        })
    }

    fn to_input(&self, saved: &Settings) -> Result<AllocationInput, String> {
        let settings = self.to_settings(saved)?;
        Ok(AllocationInput {
            deposit: resolve_amount("Deposit", self.deposit.as_ref(), 0.0)?,
            fees: resolve_amount("Processing fees", self.fees.as_ref(), 0.0)?,
            sales_tax_hold: settings.sales_tax_amount,
            percentages: settings.percentages(),
            back_out_fees: settings.back_out_processing_fees,
            back_out_sales_tax: settings.back_out_sales_tax_before_pf,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    #[serde(flatten)]
    allocation: Allocation,
    summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsBody {
    profit_percent: f64,
    owner_pay_percent: f64,
    income_tax_percent: f64,
    opex_percent: f64,
    back_out_fees: bool,
    back_out_sales_tax: bool,
    sales_tax_amount: f64,
}

impl From<Settings> for SettingsBody {
    fn from(value: Settings) -> Self {
        Self {
            profit_percent: value.profit_percent,
            owner_pay_percent: value.owner_pay_percent,
            income_tax_percent: value.income_tax_percent,
            opex_percent: value.opex_percent,
            back_out_fees: value.back_out_processing_fees,
            back_out_sales_tax: value.back_out_sales_tax_before_pf,
            sales_tax_amount: value.sales_tax_amount,
        }
    }
}

#[derive(Debug, Serialize)]
struct SettingsResponse {
    settings: SettingsBody,
    location: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route(
            "/api/settings",
            get(settings_get_handler).post(settings_save_handler),
        )
        .route("/api/settings/reset", post(settings_reset_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Serves the calculator form on localhost until Ctrl-C.
pub async fn run_http_server(port: u16, store: Arc<dyn SettingsStore>) -> std::io::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let app = router(AppState::new(store));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "calculator listening");
    println!("Profit First calculator: http://{addr}/ (Ctrl-C to exit)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<FormPayload>,
) -> Response {
    calculate_handler_impl(&state, &payload)
}

async fn calculate_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<FormPayload>,
) -> Response {
    calculate_handler_impl(&state, &payload)
}

fn calculate_handler_impl(state: &AppState, payload: &FormPayload) -> Response {
    let saved = state.store.load();
    let input = match payload.to_input(&saved) {
        Ok(input) => input,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match calculate(&input) {
        Ok(allocation) => {
            tracing::debug!(pf_base = allocation.pf_base, "calculated allocation");
            let summary = render_summary(&allocation);
            json_response(StatusCode::OK, CalculateResponse { allocation, summary })
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn settings_get_handler(State(state): State<AppState>) -> Response {
    settings_response(&state, state.store.load())
}

async fn settings_save_handler(
    State(state): State<AppState>,
    Json(payload): Json<FormPayload>,
) -> Response {
    let settings = match payload.to_settings(&state.store.load()) {
        Ok(settings) => settings,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match save_defaults(state.store.as_ref(), settings) {
        Ok(saved) => settings_response(&state, saved),
        Err(DefaultsError::Invalid(err)) => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Err(DefaultsError::Store(err)) => {
            tracing::error!(error = %err, "saving defaults failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

async fn settings_reset_handler(State(state): State<AppState>) -> Response {
    match reset_defaults(state.store.as_ref()) {
        Ok(settings) => settings_response(&state, settings),
        Err(err) => {
            tracing::error!(error = %err, "resetting defaults failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

fn settings_response(state: &AppState, settings: Settings) -> Response {
    json_response(
        StatusCode::OK,
        SettingsResponse {
            settings: settings.into(),
            location: state.store.location(),
        },
    )
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{JsonFileStore, MemoryStore};
    use serde_json::{Value, json};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn memory_state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()))
    }

    fn payload_from_json(json: Value) -> FormPayload {
        serde_json::from_value(json).expect("valid payload")
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn payload_accepts_numbers_and_typed_text() {
        let payload = payload_from_json(json!({
            "deposit": "$1,000.00",
            "fees": 30,
            "salesTaxAmount": " 70 ",
            "backOutFees": true
        }));

        let input = payload.to_input(&Settings::default()).expect("valid input");
        assert_approx(input.deposit, 1_000.0);
        assert_approx(input.fees, 30.0);
        assert_approx(input.sales_tax_hold, 70.0);
        assert!(input.back_out_fees);
    }

    #[test]
    fn payload_falls_back_to_saved_settings() {
        let saved = Settings {
            sales_tax_amount: 25.0,
            back_out_processing_fees: false,
            ..Settings::default()
        };

        let input = FormPayload::default().to_input(&saved).expect("valid input");
        assert_approx(input.deposit, 0.0);
        assert_approx(input.fees, 0.0);
        assert_approx(input.sales_tax_hold, 25.0);
        assert!(!input.back_out_fees);
        assert_eq!(input.percentages, saved.percentages());
    }

    #[test]
    fn payload_reports_which_field_is_unparseable() {
        let payload = payload_from_json(json!({ "opexPercent": "thirty" }));

        let err = payload.to_settings(&Settings::default()).expect_err("bad percent");
        assert!(err.starts_with("Opex %"), "{err}");
        assert!(err.contains("thirty"));
    }

    #[tokio::test]
    async fn calculate_returns_breakdown_and_summary() {
        let response = calculate_post_handler(
            State(memory_state()),
            Json(payload_from_json(json!({
                "deposit": 1000,
                "fees": 30,
                "salesTaxAmount": 70
            }))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body = body_json(response).await;
        assert_approx(body["netUsed"].as_f64().expect("netUsed"), 970.0);
        assert_approx(body["pfBase"].as_f64().expect("pfBase"), 900.0);
        assert_approx(body["ownerPayAmount"].as_f64().expect("owner"), 450.0);
        assert_approx(body["basePlusTaxHold"].as_f64().expect("check"), 970.0);
        let summary = body["summary"].as_str().expect("summary text");
        assert!(summary.starts_with("PROFIT FIRST ALLOCATION"));
        assert!(summary.contains("Profit Account: $45.00"));
    }

    #[tokio::test]
    async fn calculate_rejects_tax_hold_above_net() {
        let response = calculate_post_handler(
            State(memory_state()),
            Json(payload_from_json(json!({ "deposit": 50, "salesTaxAmount": 60 }))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Sales tax amount ($60.00) is greater than Net Used ($50.00)."
        );
    }

    #[tokio::test]
    async fn calculate_get_reads_query_strings() {
        let query = "deposit=200&fees=0&salesTaxAmount=0&profitPercent=10&opexPercent=25";
        let Query(payload) = Query::<FormPayload>::try_from_uri(
            &format!("/api/calculate?{query}")
                .parse::<axum::http::Uri>()
                .expect("uri"),
        )
        .expect("query parses");

        let response = calculate_get_handler(State(memory_state()), Query(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_approx(body["profitAmount"].as_f64().expect("profit"), 20.0);
        assert_approx(body["opexAmount"].as_f64().expect("opex"), 50.0);
    }

    #[tokio::test]
    async fn calculate_get_reads_toggles_from_query_strings() {
        for (toggles, net_used, pf_base) in [
            ("backOutFees=false&backOutSalesTax=true", 200.0, 150.0),
            ("backOutFees=true&backOutSalesTax=false", 180.0, 180.0),
        ] {
            let uri = format!("/api/calculate?deposit=200&fees=20&salesTaxAmount=50&{toggles}")
                .parse::<axum::http::Uri>()
                .expect("uri");
            let Query(payload) = Query::<FormPayload>::try_from_uri(&uri).expect("query parses");

            let response = calculate_get_handler(State(memory_state()), Query(payload)).await;
            assert_eq!(response.status(), StatusCode::OK, "{toggles}");
            let body = body_json(response).await;
            assert_approx(body["netUsed"].as_f64().expect("net used"), net_used);
            assert_approx(body["pfBase"].as_f64().expect("pf base"), pf_base);
            assert_eq!(body["feesBackedOut"], toggles.starts_with("backOutFees=true"));
        }
    }

    #[tokio::test]
    async fn save_defaults_validates_then_persists() {
        let state = memory_state();

        let rejected = settings_save_handler(
            State(state.clone()),
            Json(payload_from_json(json!({ "profitPercent": 6 }))),
        )
        .await;
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.load(), Settings::default());

        let accepted = settings_save_handler(
            State(state.clone()),
            Json(payload_from_json(json!({
                "profitPercent": 10,
                "opexPercent": 25,
                "salesTaxAmount": "15.50",
                "backOutSalesTax": false
            }))),
        )
        .await;
        assert_eq!(accepted.status(), StatusCode::OK);
        let body = body_json(accepted).await;
        assert_eq!(body["location"], "memory");
        assert_eq!(body["settings"]["salesTaxAmount"], 15.5);

        let saved = state.store.load();
        assert_eq!(saved.profit_percent, 10.0);
        assert_eq!(saved.opex_percent, 25.0);
        assert!(!saved.back_out_sales_tax_before_pf);
    }

    #[tokio::test]
    async fn reset_restores_starter_defaults() {
        let state = AppState::new(Arc::new(MemoryStore::with_settings(Settings {
            sales_tax_amount: 80.0,
            ..Settings::default()
        })));

        let response = settings_reset_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["settings"]["profitPercent"], 5.0);
        assert_eq!(body["settings"]["salesTaxAmount"], 0.0);
        assert_eq!(state.store.load(), Settings::default());
    }

    #[tokio::test]
    async fn save_failure_is_reported_as_server_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("write blocker");
        let state = AppState::new(Arc::new(JsonFileStore::new(blocker.join("settings.json"))));

        let response = settings_reset_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .expect("error text")
                .starts_with("Could not write settings")
        );
    }

    #[tokio::test]
    async fn unknown_routes_return_json_404() {
        let response = not_found_handler().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }
}
