//! Server-side HTML for the advisor page. The page is rebuilt from the session on every
//! request; nothing is patched incrementally.

use pulldown_cmark::{html, Event, Options, Parser, Tag};
use serde::Serialize;
use tera::{Context, Tera};

use crate::models::{
    AnalysisMode, AnalysisRecord, DietaryRestriction, HealthGoal, MealType, Preferences,
    RecommendationRecord, MAX_RECOMMENDATIONS, MIN_RECOMMENDATIONS,
};
use crate::services::{Drafts, Notice, NoticeLevel, Session};

const INDEX_TEMPLATE: &str = include_str!("../../static/index.html");
const STYLE: &str = include_str!("../../static/style.css");
pub const BUSY_PAGE: &str = include_str!("../../static/busy.html");

const RECOMMEND_FORM_ID: &str = "recommend-form";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Recommend,
    Analyze,
}

impl Tab {
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("analyze") => Tab::Analyze,
            _ => Tab::Recommend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Recommend => "recommend",
            Tab::Analyze => "analyze",
        }
    }
}

pub fn mode_from_query(value: Option<&str>) -> AnalysisMode {
    match value {
        Some("image") => AnalysisMode::Image,
        _ => AnalysisMode::Text,
    }
}

pub struct PageView<'a> {
    pub session: &'a Session,
    pub notice: Option<Notice>,
    pub tab: Tab,
    pub mode: AnalysisMode,
}

/// Link targets from model output are kept only for web URLs and relative paths.
fn is_safe_destination(dest: &str) -> bool {
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match cleaned.find(|c| matches!(c, ':' | '/' | '?' | '#')) {
        Some(idx) if cleaned[idx..].starts_with(':') => {
            let scheme = cleaned[..idx].to_ascii_lowercase();
            scheme == "http" || scheme == "https"
        }
        _ => true,
    }
}

/// Renders model output. Raw HTML is shown as text and links with other schemes lose
/// their anchor, keeping only the link text.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut dropped_link = false;
    let mut dropped_image = false;
    let parser = Parser::new_ext(text, options).filter_map(move |event| match event {
        Event::Html(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link(_, ref dest, _)) if !is_safe_destination(dest) => {
            dropped_link = true;
            None
        }
        Event::End(Tag::Link(..)) if dropped_link => {
            dropped_link = false;
            None
        }
        Event::Start(Tag::Image(_, ref dest, _)) if !is_safe_destination(dest) => {
            dropped_image = true;
            None
        }
        Event::End(Tag::Image(..)) if dropped_image => {
            dropped_image = false;
            None
        }
        other => Some(other),
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[derive(Debug, Serialize)]
struct ChoiceView {
    label: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct NoticeView {
    level: &'static str,
    icon: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct SettingsView {
    goal: &'static str,
    meal_types: String,
    count: u8,
    restrictions: String,
}

#[derive(Debug, Serialize)]
struct RecommendationView<'a> {
    timestamp: &'a str,
    goal: &'a str,
    query: &'a str,
    response_html: String,
    expanded: bool,
}

#[derive(Debug, Serialize)]
struct AnalysisView<'a> {
    timestamp: &'a str,
    title: &'static str,
    is_image: bool,
    input: &'a str,
    extra: Option<&'a str>,
    result_html: String,
    expanded: bool,
}

/// Everything the page template reads.
#[derive(Debug, Serialize)]
struct PageContext<'a> {
    style: &'static str,
    form_id: &'static str,
    tab: &'static str,
    mode: String,
    notice: Option<NoticeView>,
    goals: Vec<ChoiceView>,
    meal_types: Vec<ChoiceView>,
    restrictions: Vec<ChoiceView>,
    count: u8,
    min_count: u8,
    max_count: u8,
    settings: SettingsView,
    drafts: &'a Drafts,
    recommendations: Vec<RecommendationView<'a>>,
    analyses: Vec<AnalysisView<'a>>,
}

impl<'a> PageContext<'a> {
    fn from_view(view: &PageView<'a>) -> Self {
        let session = view.session;
        let preferences = &session.preferences;

        Self {
            style: STYLE,
            form_id: RECOMMEND_FORM_ID,
            tab: view.tab.as_str(),
            mode: view.mode.to_string(),
            notice: view.notice.as_ref().map(notice_view),
            goals: HealthGoal::ALL
                .iter()
                .map(|goal| ChoiceView {
                    label: goal.label(),
                    selected: *goal == preferences.goal,
                })
                .collect(),
            meal_types: MealType::ALL
                .iter()
                .map(|meal| ChoiceView {
                    label: meal.label(),
                    selected: preferences.meal_types.contains(meal),
                })
                .collect(),
            restrictions: DietaryRestriction::ALL
                .iter()
                .map(|restriction| ChoiceView {
                    label: restriction.label(),
                    selected: preferences.restrictions.contains(restriction),
                })
                .collect(),
            count: preferences.count,
            min_count: MIN_RECOMMENDATIONS,
            max_count: MAX_RECOMMENDATIONS,
            settings: settings_view(preferences),
            drafts: &session.drafts,
            recommendations: session
                .recommendations
                .list_most_recent_first()
                .enumerate()
                .map(|(idx, record)| recommendation_view(record, idx == 0))
                .collect(),
            analyses: session
                .analyses
                .list_most_recent_first()
                .enumerate()
                .map(|(idx, record)| analysis_view(record, idx == 0))
                .collect(),
        }
    }
}

fn notice_view(notice: &Notice) -> NoticeView {
    let (level, icon) = match notice.level {
        NoticeLevel::Success => ("success", "✅"),
        NoticeLevel::Warning => ("warning", "⚠️"),
        NoticeLevel::Error => ("error", "❌"),
    };
    NoticeView {
        level,
        icon,
        message: notice.message.clone(),
    }
}

fn join_or(labels: Vec<&str>, fallback: &str) -> String {
    if labels.is_empty() {
        fallback.to_string()
    } else {
        labels.join(", ")
    }
}

fn settings_view(preferences: &Preferences) -> SettingsView {
    SettingsView {
        goal: preferences.goal.label(),
        meal_types: join_or(preferences.meal_types.iter().map(|m| m.label()).collect(), "Any"),
        count: preferences.count,
        restrictions: join_or(
            preferences.restrictions.iter().map(|r| r.label()).collect(),
            "None specified",
        ),
    }
}

fn recommendation_view(record: &RecommendationRecord, expanded: bool) -> RecommendationView<'_> {
    RecommendationView {
        timestamp: &record.timestamp,
        goal: &record.goal,
        query: &record.query,
        response_html: render_markdown(&record.response),
        expanded,
    }
}

fn analysis_view(record: &AnalysisRecord, expanded: bool) -> AnalysisView<'_> {
    let (title, is_image) = match record.mode {
        AnalysisMode::Text => ("Text", false),
        AnalysisMode::Image => ("Image", true),
    };
    AnalysisView {
        timestamp: &record.timestamp,
        title,
        is_image,
        input: &record.input,
        extra: record.extra.as_deref(),
        result_html: render_markdown(&record.result),
        expanded,
    }
}

pub fn render_page(view: &PageView<'_>) -> Result<String, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template("index.html", INDEX_TEMPLATE)?;

    let context = Context::from_serialize(PageContext::from_view(view))?;
    tera.render("index.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendation(query: &str, timestamp: &str) -> RecommendationRecord {
        RecommendationRecord {
            query: query.to_string(),
            goal: "Energy Boost".to_string(),
            response: format!("**{}** answer", query),
            timestamp: timestamp.to_string(),
        }
    }

    fn render(session: &Session, tab: Tab, mode: AnalysisMode) -> String {
        render_page(&PageView {
            session,
            notice: None,
            tab,
            mode,
        })
        .unwrap()
    }

    #[test]
    fn test_markdown_neutralizes_raw_html() {
        let html = render_markdown("1. **Oatmeal**\n\n<script>alert(1)</script>\n");
        assert!(html.contains("<strong>Oatmeal</strong>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_markdown_drops_script_links() {
        let html = render_markdown(
            "[click](javascript:alert(1)) and [more](JavaScript:alert(2)) and ![img](data:image/svg+xml;base64,AAAA)",
        );
        assert!(!html.to_lowercase().contains("javascript:"));
        assert!(!html.contains("<a "));
        assert!(!html.contains("<img"));
        assert!(html.contains("click"));
        assert!(html.contains("more"));
    }

    #[test]
    fn test_markdown_keeps_web_links() {
        let html = render_markdown("See [the guide](https://example.com/guide) or [notes](/notes).");
        assert!(html.contains(r#"<a href="https://example.com/guide">the guide</a>"#));
        assert!(html.contains(r#"<a href="/notes">notes</a>"#));
    }

    #[test]
    fn test_safe_destination() {
        assert!(is_safe_destination("https://example.com"));
        assert!(is_safe_destination("HTTP://example.com"));
        assert!(is_safe_destination("#section"));
        assert!(is_safe_destination("/path?next=javascript:x"));
        assert!(!is_safe_destination("javascript:alert(1)"));
        assert!(!is_safe_destination(" java\tscript:alert(1)"));
        assert!(!is_safe_destination("vbscript:msgbox"));
        assert!(!is_safe_destination("data:text/html,hi"));
    }

    #[test]
    fn test_history_renders_newest_first_and_expanded() {
        let mut session = Session::new();
        session.recommendations.append(recommendation("older", "2024-05-01 08:00:00"));
        session.recommendations.append(recommendation("newer", "2024-05-01 09:00:00"));

        let html = render(&session, Tab::Recommend, AnalysisMode::Text);
        let newer = html.find("newer").unwrap();
        let older = html.find("older").unwrap();
        assert!(newer < older);
        assert_eq!(html.matches("<details open>").count(), 1);
        assert!(html.find("<details open>").unwrap() < newer);
    }

    #[test]
    fn test_user_input_is_escaped() {
        let mut session = Session::new();
        session.recommendations.append(recommendation("<img src=x>", "2024-05-01 08:00:00"));
        session.drafts.query = "</textarea><b>bold</b>".to_string();

        let html = render(&session, Tab::Recommend, AnalysisMode::Text);
        assert!(html.contains("&lt;img src=x&gt;"));
        assert!(!html.contains("<img src=x>"));
        assert!(!html.contains("<b>bold"));
    }

    #[test]
    fn test_image_record_shows_extra_info() {
        let mut session = Session::new();
        session.analyses.append(AnalysisRecord {
            mode: AnalysisMode::Image,
            input: "lunch.png".to_string(),
            extra: Some("I ate half".to_string()),
            result: "About 400 kcal".to_string(),
            timestamp: "2024-05-01 12:00:00".to_string(),
        });

        let html = render(&session, Tab::Analyze, AnalysisMode::Image);
        assert!(html.contains("Image analysis"));
        assert!(html.contains("<strong>Image File:</strong> lunch.png"));
        assert!(html.contains("<strong>Extra Info:</strong> I ate half"));
        assert!(html.contains(r#"action="/analyze/image""#));
    }

    #[test]
    fn test_empty_history_has_no_section() {
        let session = Session::new();
        let html = render(&session, Tab::Analyze, AnalysisMode::Text);
        assert!(!html.contains("Analysis History"));
        assert!(html.contains(r#"action="/analyze/text""#));
    }

    #[test]
    fn test_page_reflects_preferences() {
        let mut session = Session::new();
        session.preferences.goal = HealthGoal::HeartHealth;
        session.preferences.meal_types = vec![MealType::Dinner];

        let html = render_page(&PageView {
            session: &session,
            notice: Some(Notice::warning("Please enter your question or food preference.")),
            tab: Tab::Recommend,
            mode: AnalysisMode::Text,
        })
        .unwrap();

        assert!(html.contains(r#"<option value="Heart Health" selected>"#));
        assert!(html.contains(r#"value="Dinner" form="recommend-form" checked"#));
        assert!(html.contains("<strong>Meal Types:</strong> Dinner"));
        assert!(html.contains("notice warning"));
        assert!(html.contains("Please enter your question or food preference."));
    }

    #[test]
    fn test_tab_and_mode_from_query() {
        assert_eq!(Tab::from_query(Some("analyze")), Tab::Analyze);
        assert_eq!(Tab::from_query(Some("bogus")), Tab::Recommend);
        assert_eq!(Tab::from_query(None), Tab::Recommend);
        assert_eq!(mode_from_query(Some("image")), AnalysisMode::Image);
        assert_eq!(mode_from_query(None), AnalysisMode::Text);
    }
}
