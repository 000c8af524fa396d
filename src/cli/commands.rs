//! Command handlers: wire the engine together and run one CLI command.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::args::{CliArgs, CliCommand, USAGE};
use super::version::version_string;
use crate::adapters::{FileStore, InMemoryStore, InMemoryThreadServer, ReqwestHttpClient};
use crate::api::{ThreadApi, ThreadApiClient};
use crate::config::SyncConfig;
use crate::context::{SessionController, UserContext};
use crate::engine::{EngineEvent, RenderSource, SyncEngine};
use crate::models::{Message, MessageRole};
use crate::scheduler::{spawn_flush_scheduler_with_interval, LifecycleEvent};
use crate::session::SessionIdentityProvider;
use crate::traits::KeyValueStore;
use crate::view_state::{ThreadListController, ThreadListView};

/// How long `watch` waits for the final flush on exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Everything a command needs, built from configuration.
pub struct Services {
    pub engine: Arc<SyncEngine>,
    pub session: Arc<SessionController>,
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
}

impl Services {
    pub fn build(config: &SyncConfig) -> Result<Self> {
        let (store, api): (Arc<dyn KeyValueStore>, Arc<dyn ThreadApi>) = if config.demo {
            tracing::info!("Demo mode: using the in-memory server");
            (
                Arc::new(InMemoryStore::new()),
                Arc::new(InMemoryThreadServer::new()),
            )
        } else {
            let http = ReqwestHttpClient::with_timeout(config.request_timeout)
                .wrap_err("failed to build HTTP client")?;
            (
                open_store(config),
                Arc::new(ThreadApiClient::with_http(config.base_url.clone(), http)),
            )
        };

        Ok(Self::with_parts(store, api))
    }

    pub fn with_parts(store: Arc<dyn KeyValueStore>, api: Arc<dyn ThreadApi>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let sessions = Arc::new(SessionIdentityProvider::new(Arc::clone(&store)));
        Self {
            engine: Arc::new(SyncEngine::new(api, store).with_events(tx)),
            session: Arc::new(SessionController::new(sessions)),
            events,
        }
    }
}

fn open_store(config: &SyncConfig) -> Arc<dyn KeyValueStore> {
    let opened = match config.data_dir {
        Some(ref dir) => FileStore::open(dir),
        None => FileStore::new(),
    };
    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "Local store unavailable, keeping state in memory");
            Arc::new(InMemoryStore::new())
        }
    }
}

/// Run one parsed command.
pub async fn run_cli_command(args: CliArgs, config: &SyncConfig) -> Result<()> {
    match &args.command {
        CliCommand::Version => {
            println!("{}", version_string());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Invalid(reason) => {
            return Err(eyre!("{}\n\n{}", reason, USAGE));
        }
        _ => {}
    }

    let user = args
        .user
        .or_else(|| std::env::var("CHATSYNC_USER").ok())
        .ok_or_else(|| eyre!("no user given; pass --user <name> or set CHATSYNC_USER"))?;

    let services = Services::build(config)?;
    let ctx = services.session.login(&user)?;
    let engine = Arc::clone(&services.engine);

    match args.command {
        CliCommand::Threads => {
            let view = ThreadListController::new(engine).refresh(&ctx).await?;
            print_threads(&view);
        }
        CliCommand::New { title } => {
            let thread = match title {
                Some(title) => engine.create_thread(&ctx, &title).await?,
                None => engine.new_thread(&ctx).await?,
            };
            println!("{}", thread.id);
        }
        CliCommand::Open { thread_id } => {
            let opened = engine.switch_thread(&ctx, &thread_id).await;
            if opened.source == RenderSource::Local {
                eprintln!("(offline: showing cached messages)");
            }
            print_messages(&opened.messages);
        }
        CliCommand::Send { text } => {
            let reply = engine.send_message(&ctx, &text).await?;
            println!("{}", reply.response);
        }
        CliCommand::Rename { thread_id, title } => {
            let view = ThreadListController::new(engine)
                .rename(&ctx, &thread_id, &title)
                .await?;
            print_threads(&view);
        }
        CliCommand::Delete { thread_id } => {
            let view = ThreadListController::new(engine)
                .delete(&ctx, &thread_id)
                .await?;
            print_threads(&view);
        }
        CliCommand::Watch => watch(services, ctx, config).await?,
        CliCommand::Logout => {
            services.session.logout();
            println!("Logged out {}", user);
        }
        CliCommand::Version | CliCommand::Help | CliCommand::Invalid(_) => {}
    }

    Ok(())
}

/// Interactive loop: every stdin line is sent; the scheduler flushes in the
/// background until EOF or Ctrl-C.
async fn watch(services: Services, ctx: UserContext, config: &SyncConfig) -> Result<()> {
    let Services {
        engine,
        session,
        mut events,
    } = services;

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                EngineEvent::Rendered {
                    messages,
                    source: RenderSource::Server,
                    ..
                } => {
                    println!("--- synced ({} messages)", messages.len());
                }
                EngineEvent::ReauthRequired => {
                    eprintln!("Session expired. Please log in again.");
                }
                _ => {}
            }
        }
    });

    let summaries = engine.list_threads(&ctx).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not list threads");
        Vec::new()
    });
    if let Some(thread_id) = engine.resolve_active(&ctx, &summaries) {
        let opened = engine.open_thread(&ctx, &thread_id).await;
        print_messages(&opened.messages);
    }

    let flusher = spawn_flush_scheduler_with_interval(
        Arc::clone(&engine),
        Arc::clone(&session),
        config.flush_interval,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.wrap_err("failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match engine.send_message(&ctx, &line).await {
                    Ok(reply) => println!("{}", reply.response),
                    Err(e) if e.requires_reauth() => {
                        session.logout();
                        break;
                    }
                    Err(e) => eprintln!("{}", e.user_message()),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                flusher.notify(LifecycleEvent::Discarding);
                break;
            }
        }
    }

    if !flusher.shutdown(SHUTDOWN_GRACE).await {
        eprintln!("(some messages may not have reached the server yet)");
    }
    printer.abort();
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_threads(view: &ThreadListView) {
    if view.is_empty() {
        println!("No conversations yet.");
        return;
    }
    for row in &view.rows {
        let marker = if row.selected { "*" } else { " " };
        let when = row
            .timestamp
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{} {:<16} {:<16} {}", marker, row.id, when, row.title);
        if !row.preview.is_empty() {
            println!("    {}", row.preview);
        }
    }
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        let who = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "bot",
        };
        println!("[{}] {}", who, message.content);
    }
}
