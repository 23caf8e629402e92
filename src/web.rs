use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AdvisorError;
use crate::handlers::AdvisorHandler;
use crate::models::{
    AnalysisMode, DietaryRestriction, HealthGoal, ImageFormat, ImageUpload, MealType, Preferences,
    MAX_RECOMMENDATIONS, MIN_RECOMMENDATIONS,
};
use crate::services::{Notice, Session};

pub mod page;

use page::{PageView, Tab};

/// Upper bound for a whole request, photo included.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const UPLOAD_TOO_LARGE: &str = "The image is too large. Please upload a file under 10 MB.";

pub struct AppState {
    pub advisor: AdvisorHandler,
    /// Held for the whole of a submission, so a second one is rejected instead of queued.
    pub session: Mutex<Session>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    tab: Option<String>,
    mode: Option<String>,
}

pub fn create_router(advisor: AdvisorHandler) -> Router {
    router_with_state(Arc::new(AppState {
        advisor,
        session: Mutex::new(Session::new()),
    }))
}

fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/recommend", post(recommend_handler))
        .route("/recommend/clear", post(clear_recommendations_handler))
        .route("/analyze/text", post(analyze_text_handler))
        .route("/analyze/image", post(analyze_image_handler))
        .route("/analyze/clear", post(clear_analyses_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

fn redirect_to(tab: Tab, mode: Option<AnalysisMode>) -> Response {
    let location = match mode {
        Some(mode) => format!("/?tab={}&mode={}", tab.as_str(), mode),
        None => format!("/?tab={}", tab.as_str()),
    };
    Redirect::to(&location).into_response()
}

fn busy_response() -> Response {
    log::warn!("⏳ Rejected overlapping submission: a request is already in progress");
    (StatusCode::CONFLICT, Html(page::BUSY_PAGE)).into_response()
}

fn notice_for<T>(outcome: &Result<T, AdvisorError>, success: &str) -> Notice {
    match outcome {
        Ok(_) => Notice::success(success),
        Err(AdvisorError::Validation(message)) => Notice::warning(message.clone()),
        Err(e) => Notice::error(format!("Error: {}", e)),
    }
}

/// All values submitted under `name`, in form order.
fn field_values<'a>(fields: &'a [(String, String)], name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    fields
        .iter()
        .filter(move |(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn field<'a>(fields: &'a [(String, String)], name: &'a str) -> &'a str {
    field_values(fields, name).next().unwrap_or_default()
}

/// Reads the sidebar selections. Unknown tags and out-of-range counts are rejected.
pub fn parse_preferences(fields: &[(String, String)]) -> Result<Preferences, AdvisorError> {
    let goal_value = field(fields, "goal");
    let goal = if goal_value.trim().is_empty() {
        HealthGoal::default()
    } else {
        HealthGoal::from_string(goal_value)
            .ok_or_else(|| AdvisorError::validation(format!("Unknown health goal: {}", goal_value)))?
    };

    let mut meal_types = Vec::new();
    for value in field_values(fields, "meal_type") {
        let meal = MealType::from_string(value)
            .ok_or_else(|| AdvisorError::validation(format!("Unknown meal type: {}", value)))?;
        if !meal_types.contains(&meal) {
            meal_types.push(meal);
        }
    }

    let mut restrictions = Vec::new();
    for value in field_values(fields, "restriction") {
        let restriction = DietaryRestriction::from_string(value).ok_or_else(|| {
            AdvisorError::validation(format!("Unknown dietary restriction: {}", value))
        })?;
        if !restrictions.contains(&restriction) {
            restrictions.push(restriction);
        }
    }

    let count_value = field(fields, "count").trim();
    let count = if count_value.is_empty() {
        Preferences::default().count
    } else {
        count_value
            .parse::<u8>()
            .ok()
            .filter(|n| (MIN_RECOMMENDATIONS..=MAX_RECOMMENDATIONS).contains(n))
            .ok_or_else(|| {
                AdvisorError::validation(format!(
                    "Number of recommendations must be between {} and {}.",
                    MIN_RECOMMENDATIONS, MAX_RECOMMENDATIONS
                ))
            })?
    };

    Ok(Preferences {
        goal,
        meal_types,
        count,
        restrictions,
    })
}

struct ImageForm {
    image: Option<ImageUpload>,
    extra: String,
}

/// Multipart errors past the body limit become a notice like any other invalid upload.
fn upload_error(e: MultipartError) -> AdvisorError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        log::warn!("📦 Upload rejected: larger than {} bytes", MAX_UPLOAD_BYTES);
        AdvisorError::validation(UPLOAD_TOO_LARGE)
    } else {
        AdvisorError::validation(format!("Could not read the upload: {}", e))
    }
}

async fn read_image_form(multipart: &mut Multipart) -> Result<ImageForm, AdvisorError> {
    let mut form = ImageForm {
        image: None,
        extra: String::new(),
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(upload_error)?;

                // Browsers send an empty part when no file was picked.
                if bytes.is_empty() {
                    continue;
                }

                let format = ImageFormat::detect(&bytes).ok_or_else(|| {
                    AdvisorError::validation("Unsupported image format. Please upload a JPG or PNG image.")
                })?;
                log::debug!("🖼️ Received upload {} ({} bytes, {})", filename, bytes.len(), format.mime_type());

                form.image = Some(ImageUpload {
                    filename,
                    format,
                    bytes: bytes.to_vec(),
                });
            }
            "extra" => {
                form.extra = field.text().await.map_err(upload_error)?;
            }
            other => {
                log::debug!("Ignoring unexpected form field: {}", other);
            }
        }
    }

    Ok(form)
}

async fn index_handler(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let mut session = state.session.lock().await;
    let notice = session.take_notice();

    match page::render_page(&PageView {
        session: &session,
        notice,
        tab: Tab::from_query(query.tab.as_deref()),
        mode: page::mode_from_query(query.mode.as_deref()),
    }) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("❌ Failed to render page: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn recommend_handler(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let Ok(mut session) = state.session.try_lock() else {
        return busy_response();
    };

    let query = field(&fields, "query").to_string();
    session.drafts.query = query.clone();

    let outcome = match parse_preferences(&fields) {
        Ok(preferences) => {
            session.preferences = preferences.clone();
            state.advisor.recommend(&mut session, &query, &preferences).await
        }
        Err(e) => Err(e),
    };

    session.notice = Some(notice_for(&outcome, "Recommendations generated successfully!"));
    redirect_to(Tab::Recommend, None)
}

async fn analyze_text_handler(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let Ok(mut session) = state.session.try_lock() else {
        return busy_response();
    };

    let description = field(&fields, "description").to_string();
    session.drafts.description = description.clone();

    let outcome = state.advisor.analyze_text(&mut session, &description).await;

    session.notice = Some(notice_for(&outcome, "Analysis completed!"));
    redirect_to(Tab::Analyze, Some(AnalysisMode::Text))
}

async fn analyze_image_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let Ok(mut session) = state.session.try_lock() else {
        return busy_response();
    };

    let outcome = match read_image_form(&mut multipart).await {
        Ok(form) => {
            session.drafts.extra = form.extra.clone();
            state
                .advisor
                .analyze_image(&mut session, form.image.as_ref(), &form.extra)
                .await
        }
        Err(e) => Err(e),
    };

    session.notice = Some(notice_for(&outcome, "Image analysis completed!"));
    redirect_to(Tab::Analyze, Some(AnalysisMode::Image))
}

async fn clear_recommendations_handler(State(state): State<Arc<AppState>>) -> Response {
    let Ok(mut session) = state.session.try_lock() else {
        return busy_response();
    };

    session.recommendations.clear();
    log::info!("🗑️ Recommendation history cleared");
    redirect_to(Tab::Recommend, None)
}

async fn clear_analyses_handler(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Ok(mut session) = state.session.try_lock() else {
        return busy_response();
    };

    session.analyses.clear();
    log::info!("🧹 Analysis history cleared");
    redirect_to(Tab::Analyze, Some(page::mode_from_query(query.mode.as_deref())))
}

async fn health_check() -> &'static str {
    "OK"
}
