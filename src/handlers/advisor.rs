use std::sync::Arc;

use crate::error::AdvisorError;
use crate::models::{AnalysisMode, AnalysisRecord, ImageUpload, Preferences, RecommendationRecord};
use crate::services::prompts;
use crate::services::{CompletionClient, Session};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Runs one user action end to end: validate, build the prompt, call the model once,
/// record the result. History is only touched after a successful call.
pub struct AdvisorHandler {
    client: Arc<dyn CompletionClient>,
}

impl AdvisorHandler {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn recommend(
        &self,
        session: &mut Session,
        query: &str,
        preferences: &Preferences,
    ) -> Result<RecommendationRecord, AdvisorError> {
        let query = query.trim();
        if query.is_empty() {
            log::warn!("⚠️ Recommendation request rejected: empty query");
            return Err(AdvisorError::validation(
                "Please enter your question or food preference.",
            ));
        }

        log::info!(
            "🍴 Recommendation request - goal: {} | count: {} | meal types: {} | restrictions: {}",
            preferences.goal,
            preferences.count,
            preferences.meal_types.len(),
            preferences.restrictions.len()
        );

        let messages = prompts::build_recommendation_prompt(
            query,
            preferences.goal,
            &preferences.meal_types,
            &preferences.restrictions,
            preferences.count,
        );

        let response = self.client.complete(messages).await.map_err(|e| {
            log::error!("❌ Recommendation request failed: {}", e);
            e
        })?;

        let record = RecommendationRecord {
            query: query.to_string(),
            goal: preferences.goal.to_string(),
            response,
            timestamp: timestamp(),
        };
        session.recommendations.append(record.clone());
        log::info!("✅ Recommendation stored ({} in history)", session.recommendations.len());

        Ok(record)
    }

    pub async fn analyze_text(
        &self,
        session: &mut Session,
        description: &str,
    ) -> Result<AnalysisRecord, AdvisorError> {
        let description = description.trim();
        if description.is_empty() {
            log::warn!("⚠️ Text analysis rejected: empty description");
            return Err(AdvisorError::validation(
                "Please enter a food or meal description.",
            ));
        }

        log::info!("🔍 Text analysis request ({} chars)", description.len());
        let messages = prompts::build_text_analysis_prompt(description);

        let result = self.client.complete(messages).await.map_err(|e| {
            log::error!("❌ Text analysis failed: {}", e);
            e
        })?;

        let record = AnalysisRecord {
            mode: AnalysisMode::Text,
            input: description.to_string(),
            extra: None,
            result,
            timestamp: timestamp(),
        };
        session.analyses.append(record.clone());

        Ok(record)
    }

    pub async fn analyze_image(
        &self,
        session: &mut Session,
        image: Option<&ImageUpload>,
        extra: &str,
    ) -> Result<AnalysisRecord, AdvisorError> {
        let image = match image {
            Some(image) if !image.bytes.is_empty() => image,
            _ => {
                log::warn!("⚠️ Image analysis rejected: no image uploaded");
                return Err(AdvisorError::validation("Please upload a food image first."));
            }
        };
        let extra = extra.trim();

        log::info!(
            "📸 Image analysis request - file: {} | {} | {} bytes",
            image.filename,
            image.format.mime_type(),
            image.bytes.len()
        );
        let messages = prompts::build_image_analysis_prompt(extra, image);

        let result = self.client.complete(messages).await.map_err(|e| {
            log::error!("❌ Image analysis failed: {}", e);
            e
        })?;

        let record = AnalysisRecord {
            mode: AnalysisMode::Image,
            input: image.filename.clone(),
            extra: (!extra.is_empty()).then(|| extra.to_string()),
            result,
            timestamp: timestamp(),
        };
        session.analyses.append(record.clone());

        Ok(record)
    }
}
