pub mod groq;
pub mod prompts;
pub mod provider;

pub use groq::{GroqProvider, GroqProviderConfig};
pub use prompts::{BASE_SYSTEM_PROMPT, UserProfile, build_system_prompt};
pub use provider::{
    ChatMessage, ChatRole, CompletionFuture, CompletionProvider, CompletionRequest,
    CompletionResponse, ProviderError, SamplingParams, TokenUsage,
};
