pub mod ai_service; // Completion client trait and message types
pub mod azure_openai; // Azure OpenAI chat completions
pub mod history;
pub mod prompts;
pub mod session;

pub use ai_service::{ChatMessage, CompletionClient};
pub use azure_openai::AzureOpenAIService;
pub use history::History;
pub use session::{Drafts, Notice, NoticeLevel, Session};
