use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use app_lib::state_machine::SessionStatus;
use app_lib::ui::{render_call_row, render_dialog};
use app_lib::webcall::StubVoiceClientFactory;
use app_lib::{load_settings, open_web_call_for, ApiClient, SessionManager};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Installs the log -> tracing bridge as well, so `log` records from the library show up
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Logging already initialized: {}", e);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (for development convenience)
    // Silently ignore if not found - production uses system env vars
    let _ = dotenvy::dotenv();
    init_logging();

    let settings = load_settings();
    let api = ApiClient::from_settings(&settings).context("building API client")?;
    log::info!("Console started against {}", api.base_url());

    let agents = api.list_agents().await.context("loading agents")?;
    let calls = api.list_calls().await.context("loading calls")?;

    println!("Agents:");
    for agent in &agents {
        println!("  {:<36}  {}", agent.id, agent.display_name());
    }
    println!("Calls:");
    for call in &calls {
        println!("  {}", render_call_row(call));
    }

    // Optional: join one call as a web call
    let Some(call_id) = std::env::args().nth(1) else {
        return Ok(());
    };

    let dialog = open_web_call_for(&api, &call_id)
        .await
        .with_context(|| format!("loading call {}", call_id))?;

    log::warn!("No native vendor SDK is linked; using the simulated voice client");
    let factory = Arc::new(StubVoiceClientFactory::check_call());
    let mut manager = SessionManager::new(dialog, factory).with_audio(settings.call_audio);

    manager.open().await?;
    print!("{}", render_dialog(&manager.view()));

    loop {
        let status = tokio::select! {
            status = manager.process_next() => status,
            _ = tokio::signal::ctrl_c() => None,
        };
        print!("{}", render_dialog(&manager.view()));

        match status {
            Some(SessionStatus::Connecting | SessionStatus::Active) => continue,
            Some(_) => break,
            // Settled with nothing queued, or interrupted
            None => {
                manager.stop();
                break;
            }
        }
    }

    manager.close();
    Ok(())
}
