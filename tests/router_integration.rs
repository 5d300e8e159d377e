//! Integration tests for the turn router.
//!
//! Each test wires a real `TurnRouter` with substitutable fakes — a
//! recording adapter, fixed classifiers, and a fake token provider — and
//! drives it through full turns.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use skill_router::activity::{
    Activity, ConversationId, OutboundActivity, SkillEvent, TurnContext, UserId,
};
use skill_router::adapter::{ChannelAdapter, TokenProvider, TokenStatus};
use skill_router::config::RouterConfig;
use skill_router::dialog::{DialogStack, SampleDialog};
use skill_router::error::{ChannelError, ConfigError, Error, NluError};
use skill_router::nlu::{IntentClassifier, NluCatalog, Recognition};
use skill_router::responses::ResponseCatalog;
use skill_router::router::{InterruptionAction, TurnRouter};
use skill_router::state::{MemoryStateStore, StateStore};

// ── Fakes ───────────────────────────────────────────────────────────

/// Records every outbound activity.
#[derive(Default)]
struct RecordingAdapter {
    sent: Mutex<Vec<OutboundActivity>>,
}

impl RecordingAdapter {
    async fn sent(&self) -> Vec<OutboundActivity> {
        self.sent.lock().await.clone()
    }

    async fn messages(&self) -> Vec<String> {
        self.sent()
            .await
            .into_iter()
            .filter_map(|a| match a {
                OutboundActivity::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    async fn end_of_conversation_count(&self) -> usize {
        self.sent()
            .await
            .iter()
            .filter(|a| matches!(a, OutboundActivity::EndOfConversation { .. }))
            .count()
    }
}

#[async_trait]
impl ChannelAdapter for RecordingAdapter {
    fn name(&self) -> &str {
        "recording"
    }
    async fn send(&self, activity: &OutboundActivity) -> Result<(), ChannelError> {
        self.sent.lock().await.push(activity.clone());
        Ok(())
    }
}

/// Always returns the configured intent label.
struct FixedClassifier(&'static str);

#[async_trait]
impl IntentClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }
    async fn recognize(&self, _text: &str, _locale: &str) -> Result<Recognition, NluError> {
        Ok(Recognition {
            intent: self.0.to_string(),
            score: 1.0,
            entities: serde_json::Value::Null,
        })
    }
}

/// Fake token provider backed by a fixed connection list.
struct FakeTokens {
    connections: Vec<&'static str>,
    revoked: Mutex<Vec<String>>,
}

impl FakeTokens {
    fn new(connections: Vec<&'static str>) -> Self {
        Self {
            connections,
            revoked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn token_status(&self, _user: &UserId) -> Result<Vec<TokenStatus>, ChannelError> {
        Ok(self
            .connections
            .iter()
            .map(|name| TokenStatus {
                connection_name: name.to_string(),
                has_token: true,
            })
            .collect())
    }

    async fn sign_out(&self, _user: &UserId, connection_name: &str) -> Result<(), ChannelError> {
        self.revoked.lock().await.push(connection_name.to_string());
        Ok(())
    }
}

// ── Harness ─────────────────────────────────────────────────────────

struct Harness {
    router: TurnRouter,
    adapter: Arc<RecordingAdapter>,
    store: Arc<MemoryStateStore>,
}

/// Build a router whose skill/general models always return the given
/// intent labels.
fn harness(
    skill_mode: bool,
    skill_intent: &'static str,
    general_intent: &'static str,
    tokens: Option<Arc<dyn TokenProvider>>,
) -> Harness {
    let config = RouterConfig {
        skill_mode,
        ..RouterConfig::default()
    };
    let nlu = NluCatalog::new("en")
        .with_model("en", "skill", Arc::new(FixedClassifier(skill_intent)))
        .with_model("en", "general", Arc::new(FixedClassifier(general_intent)));
    let dialogs = DialogStack::new().with_dialog(Arc::new(SampleDialog::new()));
    let store = Arc::new(MemoryStateStore::new());
    let adapter = Arc::new(RecordingAdapter::default());

    Harness {
        router: TurnRouter::new(
            config,
            store.clone(),
            nlu,
            ResponseCatalog::default(),
            dialogs,
            tokens,
        ),
        adapter,
        store,
    }
}

fn conv() -> ConversationId {
    ConversationId::new("conv-1")
}

fn user() -> UserId {
    UserId::new("user-1")
}

impl Harness {
    fn message_ctx(&self, text: &str) -> TurnContext {
        TurnContext::new(
            Activity::message(conv(), user(), "en-us", text),
            self.adapter.clone(),
        )
    }

    fn event_ctx(&self, event: SkillEvent) -> TurnContext {
        TurnContext::new(
            Activity::event(conv(), user(), "en-us", event),
            self.adapter.clone(),
        )
    }

    fn start_ctx(&self) -> TurnContext {
        TurnContext::new(
            Activity::conversation_started(conv(), user(), "en-us"),
            self.adapter.clone(),
        )
    }
}

// ── Conversation start ──────────────────────────────────────────────

#[tokio::test]
async fn standalone_greets_on_conversation_start() {
    let h = harness(false, "None", "None", None);
    h.router.handle_turn(&h.start_ctx()).await.unwrap();

    let messages = h.adapter.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Welcome"));
}

#[tokio::test]
async fn skill_mode_conversation_start_is_silent() {
    let h = harness(true, "None", "None", None);
    h.router.handle_turn(&h.start_ctx()).await.unwrap();
    assert!(h.adapter.sent().await.is_empty());
}

// ── Routing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn skill_mode_none_intent_sends_confused_then_end_of_conversation() {
    let h = harness(true, "None", "None", None);
    h.router
        .handle_turn(&h.message_ctx("gibberish"))
        .await
        .unwrap();

    let sent = h.adapter.sent().await;
    assert_eq!(sent.len(), 2, "exactly one message and one EoC: {sent:?}");
    match &sent[0] {
        OutboundActivity::Message { text, .. } => assert!(text.contains("didn't understand")),
        other => panic!("expected Message first, got {other:?}"),
    }
    match &sent[1] {
        OutboundActivity::EndOfConversation { result } => assert!(result.is_none()),
        other => panic!("expected EndOfConversation second, got {other:?}"),
    }
}

#[tokio::test]
async fn standalone_none_intent_never_signals_end_of_conversation() {
    let h = harness(false, "None", "None", None);
    h.router
        .handle_turn(&h.message_ctx("gibberish"))
        .await
        .unwrap();

    assert_eq!(h.adapter.messages().await.len(), 1);
    assert_eq!(h.adapter.end_of_conversation_count().await, 0);
}

#[tokio::test]
async fn unsupported_intent_sends_feature_unavailable() {
    let h = harness(true, "BookFlight", "None", None);
    h.router
        .handle_turn(&h.message_ctx("book me a flight"))
        .await
        .unwrap();

    let messages = h.adapter.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("can't handle"));
    assert_eq!(h.adapter.end_of_conversation_count().await, 1);
}

#[tokio::test]
async fn sample_intent_begins_dialog_and_completes_with_result() {
    let h = harness(true, "Sample", "None", None);

    // Turn 1: routed to the sample dialog, which prompts and waits.
    h.router
        .handle_turn(&h.message_ctx("run the sample"))
        .await
        .unwrap();
    assert_eq!(h.adapter.messages().await, vec!["What is your name?"]);
    assert_eq!(h.adapter.end_of_conversation_count().await, 0);

    // Turn 2: the active dialog consumes the message (no re-classification
    // of the skill intent — the interruption check still runs first).
    h.router.handle_turn(&h.message_ctx("Alice")).await.unwrap();

    let sent = h.adapter.sent().await;
    match &sent[1] {
        OutboundActivity::Message { text, .. } => assert_eq!(text, "Nice to meet you, Alice!"),
        other => panic!("expected greeting, got {other:?}"),
    }
    match sent.last().unwrap() {
        OutboundActivity::EndOfConversation { result } => {
            assert_eq!(result.as_ref().unwrap()["name"], "Alice");
        }
        other => panic!("expected EndOfConversation with result, got {other:?}"),
    }
}

#[tokio::test]
async fn route_updates_conversation_state() {
    let h = harness(false, "None", "None", None);
    h.router.handle_turn(&h.message_ctx("hello")).await.unwrap();

    let state = h.store.conversation(&conv()).await.unwrap();
    assert_eq!(state.turn_count, 1);
    assert_eq!(state.last_intent.as_deref(), Some("None"));
}

// ── Interruptions ───────────────────────────────────────────────────

#[tokio::test]
async fn help_interruption_suppresses_routing() {
    // Skill classifier would start the sample dialog, but the interruption
    // fires first and reports MessageSent.
    let h = harness(false, "Sample", "Help", None);
    h.router.handle_turn(&h.message_ctx("help")).await.unwrap();

    let messages = h.adapter.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("sample"), "help text: {}", messages[0]);
}

#[tokio::test]
async fn interrupt_reports_no_action_for_other_intents() {
    let h = harness(false, "None", "Chitchat", None);
    let action = h
        .router
        .on_interrupt(&h.message_ctx("nice weather"))
        .await
        .unwrap();
    assert_eq!(action, InterruptionAction::NoAction);
    assert!(h.adapter.sent().await.is_empty());
}

#[tokio::test]
async fn cancel_sends_cancel_message_exactly_once() {
    let h = harness(true, "Sample", "Cancel", None);
    let action = h
        .router
        .on_interrupt(&h.message_ctx("actually, cancel that"))
        .await
        .unwrap();
    assert_eq!(action, InterruptionAction::StartedDialog);

    let cancel_messages: Vec<_> = h
        .adapter
        .messages()
        .await
        .into_iter()
        .filter(|m| m.contains("cancelled"))
        .collect();
    assert_eq!(cancel_messages.len(), 1);
    // Skill mode: completing the conversation signals the host.
    assert_eq!(h.adapter.end_of_conversation_count().await, 1);
}

#[tokio::test]
async fn cancel_mid_dialog_empties_the_stack() {
    struct TwoModels;

    #[async_trait]
    impl IntentClassifier for TwoModels {
        fn name(&self) -> &str {
            "keyworded"
        }
        async fn recognize(&self, text: &str, _locale: &str) -> Result<Recognition, NluError> {
            let intent = if text.contains("cancel") { "Cancel" } else { "None" };
            Ok(Recognition {
                intent: intent.to_string(),
                score: 1.0,
                entities: serde_json::Value::Null,
            })
        }
    }

    let config = RouterConfig {
        skill_mode: false,
        ..RouterConfig::default()
    };
    let nlu = NluCatalog::new("en")
        .with_model("en", "skill", Arc::new(FixedClassifier("Sample")))
        .with_model("en", "general", Arc::new(TwoModels));
    let dialogs = DialogStack::new().with_dialog(Arc::new(SampleDialog::new()));
    let adapter = Arc::new(RecordingAdapter::default());
    let router = TurnRouter::new(
        config,
        Arc::new(MemoryStateStore::new()),
        nlu,
        ResponseCatalog::default(),
        dialogs,
        None,
    );

    let ctx = TurnContext::new(
        Activity::message(conv(), user(), "en", "run the sample"),
        adapter.clone(),
    );
    router.handle_turn(&ctx).await.unwrap();
    assert_eq!(adapter.messages().await, vec!["What is your name?"]);

    let ctx = TurnContext::new(
        Activity::message(conv(), user(), "en", "cancel"),
        adapter.clone(),
    );
    router.handle_turn(&ctx).await.unwrap();

    // The dialog is gone: the next message is routed fresh, so the sample
    // prompt comes back instead of a greeting.
    let ctx = TurnContext::new(
        Activity::message(conv(), user(), "en", "something"),
        adapter.clone(),
    );
    router.handle_turn(&ctx).await.unwrap();
    let messages = adapter.messages().await;
    assert_eq!(messages.last().unwrap(), "What is your name?");
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn logout_revokes_every_token_and_confirms_once() {
    let tokens = Arc::new(FakeTokens::new(vec!["graph", "salesforce"]));
    let h = harness(false, "None", "Logout", Some(tokens.clone()));

    let action = h
        .router
        .on_interrupt(&h.message_ctx("log me out"))
        .await
        .unwrap();
    assert_eq!(action, InterruptionAction::StartedDialog);

    let revoked = tokens.revoked.lock().await.clone();
    assert_eq!(revoked, vec!["graph", "salesforce"]);

    let messages = h.adapter.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("signed out"));
}

#[tokio::test]
async fn logout_with_zero_tokens_still_confirms_once() {
    let tokens = Arc::new(FakeTokens::new(vec![]));
    let h = harness(false, "None", "Logout", Some(tokens.clone()));

    h.router
        .handle_turn(&h.message_ctx("sign out"))
        .await
        .unwrap();

    assert!(tokens.revoked.lock().await.is_empty());
    assert_eq!(h.adapter.messages().await.len(), 1);
}

#[tokio::test]
async fn logout_without_token_capability_is_fatal() {
    let h = harness(false, "None", "Logout", None);
    let err = h
        .router
        .handle_turn(&h.message_ctx("log out"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::TokenSupportUnavailable)
    ));
    // Fatal configuration errors never produce a user-facing message.
    assert!(h.adapter.sent().await.is_empty());
}

// ── Configuration errors ────────────────────────────────────────────

#[tokio::test]
async fn missing_general_model_aborts_the_turn_silently() {
    let config = RouterConfig::default();
    // Only the skill model is registered — the interruption check fails.
    let nlu = NluCatalog::new("en").with_model("en", "skill", Arc::new(FixedClassifier("None")));
    let adapter = Arc::new(RecordingAdapter::default());
    let router = TurnRouter::new(
        config,
        Arc::new(MemoryStateStore::new()),
        nlu,
        ResponseCatalog::default(),
        DialogStack::new().with_dialog(Arc::new(SampleDialog::new())),
        None,
    );

    let ctx = TurnContext::new(Activity::message(conv(), user(), "en", "hi"), adapter.clone());
    let err = router.handle_turn(&ctx).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::ModelNotRegistered { .. })
    ));
    assert!(adapter.sent().await.is_empty());
}

#[tokio::test]
async fn missing_skill_model_aborts_routing_silently() {
    let config = RouterConfig::default();
    let nlu = NluCatalog::new("en").with_model("en", "general", Arc::new(FixedClassifier("None")));
    let adapter = Arc::new(RecordingAdapter::default());
    let router = TurnRouter::new(
        config,
        Arc::new(MemoryStateStore::new()),
        nlu,
        ResponseCatalog::default(),
        DialogStack::new().with_dialog(Arc::new(SampleDialog::new())),
        None,
    );

    let ctx = TurnContext::new(Activity::message(conv(), user(), "en", "hi"), adapter.clone());
    let err = router.handle_turn(&ctx).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::ModelNotRegistered { .. })
    ));
    assert!(adapter.sent().await.is_empty());
}

// ── Events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn skill_begin_event_stashes_payload_into_state() {
    let h = harness(true, "None", "None", None);
    let event = SkillEvent::parse("skillBegin", json!({"caller": "host-bot", "flow": "demo"}));
    h.router.handle_turn(&h.event_ctx(event)).await.unwrap();

    let state = h.store.conversation(&conv()).await.unwrap();
    assert_eq!(state.skill_context["caller"], "host-bot");
    assert_eq!(state.skill_context["flow"], "demo");
    // Extension point only: no outbound activity.
    assert!(h.adapter.sent().await.is_empty());
}

#[tokio::test]
async fn token_response_with_no_waiting_dialog_signals_host() {
    let h = harness(true, "None", "None", None);
    let event = SkillEvent::parse("tokens/response", json!({"token": "abc"}));
    h.router.handle_turn(&h.event_ctx(event)).await.unwrap();

    assert_eq!(h.adapter.end_of_conversation_count().await, 1);
}

#[tokio::test]
async fn token_response_standalone_never_signals_host() {
    let h = harness(false, "None", "None", None);
    let event = SkillEvent::parse("tokens/response", json!({"token": "abc"}));
    h.router.handle_turn(&h.event_ctx(event)).await.unwrap();

    assert!(h.adapter.sent().await.is_empty());
}

#[tokio::test]
async fn token_response_while_dialog_waits_stays_open() {
    let h = harness(true, "Sample", "None", None);
    h.router
        .handle_turn(&h.message_ctx("run the sample"))
        .await
        .unwrap();

    // The sample dialog ignores token responses and keeps waiting, so no
    // end-of-conversation is signalled.
    let event = SkillEvent::parse("tokens/response", json!({"token": "abc"}));
    h.router.handle_turn(&h.event_ctx(event)).await.unwrap();
    assert_eq!(h.adapter.end_of_conversation_count().await, 0);
}

#[tokio::test]
async fn unknown_event_is_ignored() {
    let h = harness(true, "None", "None", None);
    let event = SkillEvent::parse("somethingElse", json!({"x": 1}));
    h.router.handle_turn(&h.event_ctx(event)).await.unwrap();
    assert!(h.adapter.sent().await.is_empty());
}
