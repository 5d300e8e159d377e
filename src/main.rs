use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use skill_router::activity::{Activity, ConversationId, TurnContext, UserId};
use skill_router::adapter::CliAdapter;
use skill_router::config::RouterConfig;
use skill_router::dialog::{DialogStack, SampleDialog};
use skill_router::nlu::{KeywordClassifier, NluCatalog};
use skill_router::responses::ResponseCatalog;
use skill_router::router::TurnRouter;
use skill_router::state::MemoryStateStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RouterConfig::from_env();
    let locale = config.fallback_locale.clone();

    eprintln!("Skill Router v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Mode: {}",
        if config.skill_mode { "skill" } else { "standalone" }
    );
    eprintln!("   Locale: {}", locale);
    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    // Keyword models stand in for the external NLU service.
    let skill_model = KeywordClassifier::new("skill-demo")
        .rule("Sample", r"\b(sample|demo|try)\b")?;
    let general_model = KeywordClassifier::new("general-demo")
        .rule("Cancel", r"\b(cancel|stop|never ?mind)\b")?
        .rule("Help", r"\bhelp\b")?
        .rule("Logout", r"\b(log ?out|sign ?out)\b")?;

    let nlu = NluCatalog::new(&config.fallback_locale)
        .with_model(&locale, config.skill_model_key.clone(), Arc::new(skill_model))
        .with_model(
            &locale,
            config.general_model_key.clone(),
            Arc::new(general_model),
        );

    let dialogs = DialogStack::new().with_dialog(Arc::new(SampleDialog::new()));
    let store = Arc::new(MemoryStateStore::new());
    let adapter = Arc::new(CliAdapter::new());

    let router = TurnRouter::new(
        config,
        store,
        nlu,
        ResponseCatalog::default(),
        dialogs,
        None, // CLI channel has no token operations
    );

    let conversation = ConversationId::new("cli");
    let user = UserId::new("local-user");

    // Greet (standalone mode only; skill mode leaves this to the host).
    let ctx = TurnContext::new(
        Activity::conversation_started(conversation.clone(), user.clone(), &locale),
        adapter.clone(),
    );
    router.handle_turn(&ctx).await?;

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }
        if line == "/quit" {
            break;
        }

        let ctx = TurnContext::new(
            Activity::message(conversation.clone(), user.clone(), &locale, &line),
            adapter.clone(),
        );
        if let Err(e) = router.handle_turn(&ctx).await {
            tracing::error!(error = %e, "Turn aborted");
        }
        eprint!("> ");
    }

    Ok(())
}
