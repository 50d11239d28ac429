use news_digest_bot::{Collector, Config, GeminiComposer, Orchestrator, RunOutcome, TelegramNotifier};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Configuration is validated before any network call is made.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Startup configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let collector = Collector::new();
    let composer = GeminiComposer::new(config.gemini_api_key.clone());
    let notifier = TelegramNotifier::new(config.bot_token.clone(), config.chat_id.clone());
    let orchestrator = Orchestrator::new(collector, composer, notifier);

    if config.ci_mode {
        info!("Single-shot mode");
        let outcome = orchestrator.run_once().await;
        if outcome.is_failure() {
            anyhow::bail!("digest run failed: {:?}", outcome);
        }
        Ok(())
    } else {
        info!("Recurring mode");
        orchestrator.run_scheduled(&config).await;
        Ok(())
    }
}
