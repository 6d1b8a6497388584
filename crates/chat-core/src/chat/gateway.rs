use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::session::SessionStore;
use crate::llm::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, ProviderError,
    UserProfile, build_system_prompt,
};

/// Number of stored turns forwarded to the provider after the system message.
pub const HISTORY_WINDOW: usize = 10;

pub const FALLBACK_RESPONSE: &str =
    "I'm having trouble connecting right now. Please try again in a moment.";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl GatewayError {
    /// Text safe to show the end user in place of a reply.
    pub fn fallback_response(&self) -> &'static str {
        FALLBACK_RESPONSE
    }
}

/// Turns one user message into one assistant reply, recording both in the
/// session history.
#[derive(Clone)]
pub struct CompletionGateway {
    sessions: SessionStore,
    provider: Arc<dyn CompletionProvider>,
    in_flight: Arc<Semaphore>,
}

impl CompletionGateway {
    pub fn new(
        sessions: SessionStore,
        provider: Arc<dyn CompletionProvider>,
        max_in_flight: usize,
    ) -> Self {
        Self {
            sessions,
            provider,
            in_flight: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn respond(
        &self,
        session_id: &str,
        user_text: &str,
        profile: &UserProfile,
    ) -> Result<String, GatewayError> {
        // Held until the reply is recorded so turns of one session never interleave.
        let session = self.sessions.session(session_id);
        let mut conversation = session.lock().await;
        conversation.push(ChatMessage::user(user_text));

        let mut messages = Vec::with_capacity(HISTORY_WINDOW + 1);
        messages.push(ChatMessage::system(build_system_prompt(profile)));
        messages.extend(conversation.window(HISTORY_WINDOW));

        match self.complete(CompletionRequest::new(messages)).await {
            Ok(response) => {
                debug!(
                    session_id,
                    model = %response.model,
                    provider_request_id = response.provider_request_id.as_deref().unwrap_or("none"),
                    total_tokens = response.usage.as_ref().map(|usage| usage.total_tokens).unwrap_or(0),
                    "completion recorded"
                );
                conversation.push(ChatMessage::assistant(response.content.clone()));
                Ok(response.content)
            }
            Err(err) => {
                warn!(session_id, error = %err, "completion provider call failed");
                Err(GatewayError::Provider(err))
            }
        }
    }

    pub async fn reset(&self, session_id: &str) {
        self.sessions.reset(session_id).await;
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|_| ProviderError::Unavailable)?;
        self.provider.complete(request).await
    }
}
