use serde::{Deserialize, Serialize};

pub const MIN_RECOMMENDATIONS: u8 = 1;
pub const MAX_RECOMMENDATIONS: u8 = 10;
pub const DEFAULT_RECOMMENDATIONS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HealthGoal {
    #[default]
    GeneralHealthyEating,
    WeightLoss,
    MuscleBuilding,
    KeepFit,
    HeartHealth,
    EnergyBoost,
    DiabetesManagement,
    HighProtein,
    VegetarianVegan,
    LowCarb,
}

impl HealthGoal {
    pub const ALL: [HealthGoal; 10] = [
        HealthGoal::GeneralHealthyEating,
        HealthGoal::WeightLoss,
        HealthGoal::MuscleBuilding,
        HealthGoal::KeepFit,
        HealthGoal::HeartHealth,
        HealthGoal::EnergyBoost,
        HealthGoal::DiabetesManagement,
        HealthGoal::HighProtein,
        HealthGoal::VegetarianVegan,
        HealthGoal::LowCarb,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HealthGoal::GeneralHealthyEating => "General Healthy Eating",
            HealthGoal::WeightLoss => "Weight Loss",
            HealthGoal::MuscleBuilding => "Muscle Building",
            HealthGoal::KeepFit => "Keep Fit/Maintenance",
            HealthGoal::HeartHealth => "Heart Health",
            HealthGoal::EnergyBoost => "Energy Boost",
            HealthGoal::DiabetesManagement => "Diabetes Management",
            HealthGoal::HighProtein => "High Protein Diet",
            HealthGoal::VegetarianVegan => "Vegetarian/Vegan",
            HealthGoal::LowCarb => "Low Carb Diet",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|goal| goal.label().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for HealthGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    PreWorkout,
    PostWorkout,
}

impl MealType {
    pub const ALL: [MealType; 6] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::PreWorkout,
        MealType::PostWorkout,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
            MealType::PreWorkout => "Pre-workout",
            MealType::PostWorkout => "Post-workout",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(' ', "-");
        match normalized.as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            "pre-workout" | "preworkout" => Some(MealType::PreWorkout),
            "post-workout" | "postworkout" => Some(MealType::PostWorkout),
            _ => None,
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietaryRestriction {
    None,
    DairyFree,
    GlutenFree,
    NutFree,
    Vegetarian,
    Vegan,
    Halal,
    Kosher,
}

impl DietaryRestriction {
    pub const ALL: [DietaryRestriction; 8] = [
        DietaryRestriction::None,
        DietaryRestriction::DairyFree,
        DietaryRestriction::GlutenFree,
        DietaryRestriction::NutFree,
        DietaryRestriction::Vegetarian,
        DietaryRestriction::Vegan,
        DietaryRestriction::Halal,
        DietaryRestriction::Kosher,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DietaryRestriction::None => "None",
            DietaryRestriction::DairyFree => "Dairy-free",
            DietaryRestriction::GlutenFree => "Gluten-free",
            DietaryRestriction::NutFree => "Nut-free",
            DietaryRestriction::Vegetarian => "Vegetarian",
            DietaryRestriction::Vegan => "Vegan",
            DietaryRestriction::Halal => "Halal",
            DietaryRestriction::Kosher => "Kosher",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|restriction| restriction.label().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for DietaryRestriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sidebar selections. The last submitted set is kept as session widget state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub goal: HealthGoal,
    pub meal_types: Vec<MealType>,
    pub count: u8,
    pub restrictions: Vec<DietaryRestriction>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            goal: HealthGoal::default(),
            meal_types: Vec::new(),
            count: DEFAULT_RECOMMENDATIONS,
            restrictions: vec![DietaryRestriction::None],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub query: String,
    pub goal: String,
    pub response: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Text,
    Image,
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisMode::Text => "text",
            AnalysisMode::Image => "image",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub mode: AnalysisMode,
    pub input: String,   // description, or image filename
    pub extra: Option<String>,
    pub result: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Detects the format from the file signature alone. Names and declared content
    /// types are client-controlled and not trusted.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

        if bytes.starts_with(PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }
}

/// Raw bytes of an uploaded meal photo.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}
