mod commands;
mod config;
mod docs;
mod llm;
mod session;
mod state;
mod strategy;
mod tools;

use std::collections::HashMap;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tokio::sync::RwLock;
use tracing::{error, info, Level};

use config::AssistantConfig;
use docs::DocumentStore;
use llm::LlmClient;
use state::AppState;
use strategy::sentinel::LatencySentinel;
use strategy::StrategyController;
use tools::document::{DocumentTool, FsRenderer};
use tools::web::WebSearchTool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let config = AssistantConfig::from_env()?;
    let guild_id = config.guild_id.map(serenity::GuildId::new);

    // Init storage
    let store_dir = config.data_dir.join("store");
    let store = Arc::new(DocumentStore::new(&store_dir).await?);
    info!("Document store initialized at {:?}", store_dir);

    // Init LLM client
    let llm_client = Arc::new(LlmClient::new(
        &config.llm_base_url,
        config.llm_api_key.clone(),
        &config.embed_model,
    )?);
    info!(base_url = %config.llm_base_url, "LLM client initialized");

    let sentinel = Arc::new(LatencySentinel::new(&config.sentinel_target)?);
    let web = Arc::new(WebSearchTool::new(&config.search_base_url)?);
    let renderer = Arc::new(FsRenderer::new(&config.data_dir)?);
    let documents = DocumentTool::new(llm_client.clone(), renderer);

    if !config.admin_ids.is_empty() {
        info!(count = config.admin_ids.len(), "Admin users configured");
    }

    let models = Arc::new(RwLock::new(config.models.clone()));

    let controller = Arc::new(StrategyController::new(
        llm_client.clone(),
        sentinel.clone(),
        web,
        llm_client.clone(),
        documents,
        models.clone(),
    ));

    let app_state = AppState {
        store,
        embedder: llm_client,
        sentinel,
        controller,
        admin_ids: config.admin_ids.clone(),
        models,
        sessions: RwLock::new(HashMap::new()),
    };

    let intents =
        serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MESSAGES;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::assistant()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as: {} ({})", ready.user.name, ready.user.id);

                let commands = &framework.options().commands;
                info!("Registering {} top-level command(s):", commands.len());
                for cmd in commands {
                    info!("  /{} ({} subcommands)", cmd.name, cmd.subcommands.len());
                    for sub in &cmd.subcommands {
                        info!("    /{} {}", cmd.name, sub.name);
                    }
                }

                if let Some(gid) = guild_id {
                    info!("Registering to guild {} (instant)", gid);
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        gid,
                    )
                    .await?;
                } else {
                    info!("Registering globally (up to 1 hour delay)");
                    poise::builtins::register_globally(
                        ctx,
                        &framework.options().commands,
                    )
                    .await?;
                }

                Ok(app_state)
            })
        })
        .build();

    info!("Starting adaptive assistant...");

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}
