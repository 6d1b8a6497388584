use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_core::chat::{CompletionGateway, FALLBACK_RESPONSE, GatewayError, SessionStore};
use chat_core::llm::{
    BASE_SYSTEM_PROMPT, ChatMessage, ChatRole, CompletionFuture, CompletionProvider,
    CompletionRequest, CompletionResponse, ProviderError, UserProfile,
};
use serde_json::json;

enum StubReply {
    Text(String),
    Fail(ProviderError),
}

#[derive(Clone, Default)]
struct StubProvider {
    replies: Arc<Mutex<VecDeque<StubReply>>>,
    seen_requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl StubProvider {
    fn with_replies(replies: Vec<StubReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            ..Self::default()
        }
    }

    fn echo_forever() -> Self {
        Self::default()
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn seen_requests(&self) -> Vec<CompletionRequest> {
        self.seen_requests.lock().expect("stub mutex").clone()
    }
}

impl CompletionProvider for StubProvider {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async move {
            let user_text = request
                .messages
                .last()
                .map(|message| message.content.clone())
                .unwrap_or_default();
            self.seen_requests.lock().expect("stub mutex").push(request);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let reply = self.replies.lock().expect("stub mutex").pop_front();
            match reply {
                Some(StubReply::Fail(err)) => Err(err),
                Some(StubReply::Text(content)) => Ok(stub_response(content)),
                None => Ok(stub_response(format!("echo: {user_text}"))),
            }
        })
    }
}

fn stub_response(content: String) -> CompletionResponse {
    CompletionResponse {
        model: "stub-model".to_string(),
        provider_request_id: None,
        content,
        usage: None,
    }
}

fn gateway_with(provider: StubProvider) -> CompletionGateway {
    CompletionGateway::new(SessionStore::new(200), Arc::new(provider), 4)
}

#[tokio::test]
async fn successful_reply_is_returned_and_recorded() {
    let provider = StubProvider::with_replies(vec![StubReply::Text("hi there".to_string())]);
    let gateway = gateway_with(provider.clone());

    let reply = gateway
        .respond("s1", "hello", &UserProfile::default())
        .await
        .expect("stub reply should succeed");

    assert_eq!(reply, "hi there");
    assert_eq!(
        gateway.sessions().window("s1", 10).await,
        vec![ChatMessage::user("hello"), ChatMessage::assistant("hi there")]
    );

    let requests = provider.seen_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].messages,
        vec![
            ChatMessage::system(BASE_SYSTEM_PROMPT),
            ChatMessage::user("hello")
        ]
    );
    assert_eq!(requests[0].sampling.temperature, 0.7);
    assert_eq!(requests[0].sampling.max_tokens, 800);
    assert_eq!(requests[0].sampling.top_p, 0.9);
}

#[tokio::test]
async fn provider_failure_returns_fallback_and_records_only_user_turn() {
    let provider = StubProvider::with_replies(vec![StubReply::Fail(ProviderError::Status {
        status: 401,
        code: "invalid_api_key".to_string(),
    })]);
    let gateway = gateway_with(provider);

    let err = gateway
        .respond("s1", "hello", &UserProfile::default())
        .await
        .expect_err("provider failure should surface");

    assert_eq!(err.fallback_response(), FALLBACK_RESPONSE);
    assert!(err.to_string().contains("status=401"));
    assert!(matches!(
        err,
        GatewayError::Provider(ProviderError::Status { status: 401, .. })
    ));
    assert_eq!(
        gateway.sessions().history("s1").await,
        vec![ChatMessage::user("hello")]
    );
}

#[tokio::test]
async fn eleven_exchanges_forward_only_the_latest_ten_turns() {
    let provider = StubProvider::echo_forever();
    let gateway = gateway_with(provider.clone());

    for index in 0..11 {
        gateway
            .respond("s1", &format!("question {index}"), &UserProfile::default())
            .await
            .expect("exchange should succeed");
    }

    assert_eq!(gateway.sessions().history("s1").await.len(), 22);
    let window = gateway.sessions().window("s1", 10).await;
    assert_eq!(window.len(), 10);
    assert_eq!(window[0], ChatMessage::user("question 6"));
    assert_eq!(window[9], ChatMessage::assistant("echo: question 10"));

    let last_request = provider
        .seen_requests()
        .pop()
        .expect("requests should be recorded");
    assert_eq!(last_request.messages.len(), 11);
    assert_eq!(last_request.messages[0].role, ChatRole::System);
    assert_eq!(
        last_request
            .messages
            .iter()
            .filter(|message| message.role == ChatRole::System)
            .count(),
        1
    );
    // 21 stored turns at call time: the window starts at the 12th.
    assert_eq!(last_request.messages[1], ChatMessage::assistant("echo: question 5"));
    assert_eq!(last_request.messages[10], ChatMessage::user("question 10"));
}

#[tokio::test]
async fn profile_personalizes_the_system_message() {
    let provider = StubProvider::echo_forever();
    let gateway = gateway_with(provider.clone());
    let profile: UserProfile = serde_json::from_value(json!({
        "goals": ["Muscle Gain"],
        "name": "Ada"
    }))
    .expect("profile should deserialize");

    gateway
        .respond("s1", "plan my week", &profile)
        .await
        .expect("exchange should succeed");

    let requests = provider.seen_requests();
    let system = &requests[0].messages[0];
    assert_eq!(system.role, ChatRole::System);
    assert!(system.content.starts_with(BASE_SYSTEM_PROMPT));
    assert!(system.content.ends_with(
        "User information for personalized advice:\n- Name: Ada\n- Fitness goals: Muscle Gain"
    ));

    let history = gateway.sessions().history("s1").await;
    assert!(history.iter().all(|message| message.role != ChatRole::System));
}

#[tokio::test]
async fn reset_clears_history_between_exchanges() {
    let gateway = gateway_with(StubProvider::echo_forever());

    gateway
        .respond("s1", "first", &UserProfile::default())
        .await
        .expect("exchange should succeed");
    gateway.reset("s1").await;
    assert!(gateway.sessions().window("s1", 10).await.is_empty());

    gateway
        .respond("s1", "second", &UserProfile::default())
        .await
        .expect("exchange should succeed");
    assert_eq!(
        gateway.sessions().history("s1").await,
        vec![
            ChatMessage::user("second"),
            ChatMessage::assistant("echo: second")
        ]
    );
}

#[tokio::test]
async fn concurrent_requests_on_one_session_do_not_interleave() {
    let provider = StubProvider::echo_forever().with_delay(Duration::from_millis(20));
    let gateway = gateway_with(provider);

    let mut tasks = Vec::new();
    for index in 0..5 {
        let gateway = gateway.clone();
        tasks.push(tokio::spawn(async move {
            gateway
                .respond("shared", &format!("q{index}"), &UserProfile::default())
                .await
        }));
    }
    for task in tasks {
        task.await
            .expect("task should join")
            .expect("exchange should succeed");
    }

    let history = gateway.sessions().history("shared").await;
    assert_eq!(history.len(), 10);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, ChatRole::User);
        assert_eq!(pair[1].role, ChatRole::Assistant);
        assert_eq!(pair[1].content, format!("echo: {}", pair[0].content));
    }
}
