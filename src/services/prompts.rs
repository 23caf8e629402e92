//! Prompt templates for the three advisor operations.
//!
//! Every builder is a pure string transformation. Empty optional inputs are replaced by a
//! neutral phrase so the prompt always reads as a complete sentence.

use base64::{engine::general_purpose, Engine};

use crate::models::{DietaryRestriction, HealthGoal, ImageUpload, MealType};
use crate::services::ai_service::{ChatMessage, ContentPart, ImageData};

pub const RECOMMENDATION_SYSTEM_PROMPT: &str = "You are a knowledgeable nutrition advisor who provides evidence-based, practical food recommendations tailored to individual health goals and dietary needs.";

pub const TEXT_ANALYSIS_SYSTEM_PROMPT: &str = "You are a nutrition expert who can analyze food descriptions and provide detailed nutritional information and health recommendations.";

pub const ANY_MEAL: &str = "Any meal";
pub const NO_RESTRICTIONS: &str = "None specified";
pub const NO_EXTRA_CONTEXT: &str = "No additional information provided.";

fn join_labels<T: std::fmt::Display>(items: &[T], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn build_recommendation_prompt(
    query: &str,
    goal: HealthGoal,
    meal_types: &[MealType],
    restrictions: &[DietaryRestriction],
    count: u8,
) -> Vec<ChatMessage> {
    let prompt = format!(
        "You are a professional nutrition advisor. Based on the following information, provide {count} specific food recommendations.\n\
         \n\
         User's Question: {query}\n\
         Health Goal: {goal}\n\
         Meal Type: {meal_types}\n\
         Dietary Restrictions: {restrictions}\n\
         \n\
         Please provide exactly {count} food recommendations.\n\
         For each recommendation, include:\n\
         1. Food/Meal name\n\
         2. Brief description (1-2 sentences)\n\
         3. Key nutritional benefits\n\
         4. Approximate calories\n\
         5. Why it fits the user's goal\n\
         \n\
         Format your response in a clear, organized manner with numbered items.",
        count = count,
        query = query,
        goal = goal,
        meal_types = join_labels(meal_types, ANY_MEAL),
        restrictions = join_labels(restrictions, NO_RESTRICTIONS),
    );

    vec![
        ChatMessage::system(RECOMMENDATION_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ]
}

pub fn build_text_analysis_prompt(description: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        "Analyze the following food/meal description and provide a detailed nutritional breakdown:\n\
         \n\
         Food Description: {description}\n\
         \n\
         Please provide:\n\
         1. **Food/Meal Summary**: Brief overview of what was described\n\
         2. **Estimated Nutritional Information**:\n\
         \x20  - Calories (approximate)\n\
         \x20  - Macronutrients (protein, carbs, fats in grams)\n\
         \x20  - Key vitamins and minerals\n\
         3. **Health Assessment**: Is this meal healthy? Any nutritional concerns?\n\
         4. **Recommendations**: How could this meal be improved nutritionally?\n\
         5. **Suitable For**: What health goals does this meal support?\n\
         \n\
         Provide your analysis in a clear, structured format.",
        description = description,
    );

    vec![
        ChatMessage::system(TEXT_ANALYSIS_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ]
}

/// Vision requests are a single user turn: instructions plus the embedded image.
pub fn build_image_analysis_prompt(extra: &str, image: &ImageUpload) -> Vec<ChatMessage> {
    let extra = extra.trim();
    let context = if extra.is_empty() {
        NO_EXTRA_CONTEXT.to_string()
    } else {
        format!("Additional information: {}", extra)
    };

    let prompt = format!(
        "Analyze this food image and provide a detailed nutritional breakdown. Include:\n\
         \n\
         1. **Food Identification**: What food items do you see?\n\
         2. **Estimated Portion Size**: Approximate serving size\n\
         3. **Nutritional Information**:\n\
         \x20  - Calories (approximate)\n\
         \x20  - Macronutrients (protein, carbs, fats in grams)\n\
         \x20  - Key vitamins and minerals\n\
         4. **Health Assessment**: Is this meal healthy? Any concerns?\n\
         5. **Recommendations**: How could this meal be improved nutritionally?\n\
         \n\
         {context}\n\
         \n\
         Provide your analysis in a clear, structured format.",
        context = context,
    );

    vec![ChatMessage::user_parts(vec![
        ContentPart::Text { text: prompt },
        ContentPart::ImageUrl {
            image_url: ImageData {
                url: image_data_uri(image),
            },
        },
    ])]
}

pub fn image_data_uri(image: &ImageUpload) -> String {
    let encoded = general_purpose::STANDARD.encode(&image.bytes);
    format!("data:{};base64,{}", image.format.mime_type(), encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageFormat;
    use crate::services::ai_service::{MessageContent, Role};

    fn upload(format: ImageFormat, bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            filename: "plate.jpg".to_string(),
            format,
            bytes: bytes.to_vec(),
        }
    }

    fn image_url(messages: &[ChatMessage]) -> String {
        match &messages[0].content {
            MessageContent::Parts(parts) => parts
                .iter()
                .find_map(|part| match part {
                    ContentPart::ImageUrl { image_url } => Some(image_url.url.clone()),
                    ContentPart::Text { .. } => None,
                })
                .expect("image part"),
            MessageContent::Text(_) => panic!("expected a multi-part message"),
        }
    }

    #[test]
    fn test_recommendation_scenario() {
        let messages = build_recommendation_prompt(
            "breakfast for energy",
            HealthGoal::EnergyBoost,
            &[MealType::Breakfast],
            &[DietaryRestriction::None],
            3,
        );

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);

        let prompt = messages[1].text();
        for needle in ["3", "breakfast for energy", "Energy Boost", "Breakfast", "None"] {
            assert!(prompt.contains(needle), "missing {:?} in prompt", needle);
        }
        assert!(prompt.contains("provide exactly 3 food recommendations"));
    }

    #[test]
    fn test_recommendation_lists_every_tag() {
        for count in 1..=10u8 {
            let messages = build_recommendation_prompt(
                "high protein lunch",
                HealthGoal::MuscleBuilding,
                &[MealType::Lunch, MealType::PostWorkout],
                &[DietaryRestriction::GlutenFree, DietaryRestriction::Halal],
                count,
            );
            let prompt = messages[1].text();

            assert!(prompt.contains(&format!("exactly {} food", count)));
            assert!(prompt.contains("Meal Type: Lunch, Post-workout"));
            assert!(prompt.contains("Dietary Restrictions: Gluten-free, Halal"));
        }
    }

    #[test]
    fn test_recommendation_empty_tags_use_neutral_phrases() {
        let messages =
            build_recommendation_prompt("anything", HealthGoal::WeightLoss, &[], &[], 5);
        let prompt = messages[1].text();

        assert!(prompt.contains("Meal Type: Any meal"));
        assert!(prompt.contains("Dietary Restrictions: None specified"));
        assert!(!prompt.contains("Meal Type: \n"));
    }

    #[test]
    fn test_text_analysis_prompt() {
        let messages = build_text_analysis_prompt("One bowl of beef pho with extra noodles");

        assert_eq!(messages[0].text(), TEXT_ANALYSIS_SYSTEM_PROMPT);
        let prompt = messages[1].text();
        assert!(prompt.contains("Food Description: One bowl of beef pho with extra noodles"));
        assert!(prompt.contains("protein, carbs, fats in grams"));
        assert!(prompt.contains("Suitable For"));
    }

    #[test]
    fn test_image_prompt_embeds_exact_bytes() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let messages = build_image_analysis_prompt("", &upload(ImageFormat::Jpeg, &bytes));

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);

        let url = image_url(&messages);
        let payload = url
            .strip_prefix("data:image/jpeg;base64,")
            .expect("jpeg data uri prefix");
        assert_eq!(general_purpose::STANDARD.decode(payload).unwrap(), bytes);
    }

    #[test]
    fn test_image_prompt_uses_png_mime() {
        let messages = build_image_analysis_prompt("", &upload(ImageFormat::Png, b"\x89PNG"));
        assert!(image_url(&messages).starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_image_prompt_extra_context() {
        let image = upload(ImageFormat::Jpeg, b"\xFF\xD8\xFF");

        let with_extra = build_image_analysis_prompt("  I ate half of this plate ", &image);
        assert!(with_extra[0]
            .text()
            .contains("Additional information: I ate half of this plate"));

        let without_extra = build_image_analysis_prompt("   ", &image);
        assert!(without_extra[0].text().contains(NO_EXTRA_CONTEXT));
        assert!(!without_extra[0].text().contains("Additional information:"));
    }
}
