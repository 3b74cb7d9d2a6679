use std::path;
use std::sync::Arc;

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use tokio::fs;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use super::cli::Launch;
use crate::domain::models::AIModelDescriptor;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::SessionOptions;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::ChatSession;
use crate::domain::services::InputOutcome;
use crate::domain::services::ModelRegistry;
use crate::infrastructure::backends::BackendManager;

async fn load_history(history: &path::Path) -> Result<Vec<Message>> {
    let contents = fs::read_to_string(history).await?;
    let messages = serde_json::from_str::<Vec<Message>>(&contents)?;
    tracing::debug!(count = messages.len(), "Loaded history");

    return Ok(messages);
}

async fn pick_model(models: &[AIModelDescriptor], selected: &str) -> Result<Option<String>> {
    let default_idx = models
        .iter()
        .position(|model| return model.id == selected)
        .unwrap_or(0);
    let items = models
        .iter()
        .map(|model| return format!("{} ({})", model.name, model.id))
        .collect::<Vec<String>>();

    let idx = task::spawn_blocking(move || {
        return Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Which model would you like to chat with?")
            .default(default_idx)
            .items(&items)
            .interact_opt();
    })
    .await??;

    return Ok(idx.map(|idx| return models[idx].id.to_string()));
}

fn print_messages(app_state: &mut AppState) {
    for message in app_state.drain_new_messages() {
        let line = app_state.render_message(&message);
        if message.is_user() {
            println!("{}", Paint::green(line));
        } else {
            println!("{}", Paint::cyan(line));
        }
    }

    if let Some(banner) = app_state.render_error_banner() {
        println!("{}", Paint::red(banner));
    }
}

fn print_prompt(app_state: &AppState) {
    if let Some(loading) = app_state.render_loading() {
        println!("{}", Paint::new(loading).dimmed());
        return;
    }

    println!("{}", Paint::new(app_state.render_prompt()).dimmed());
}

fn spawn_models_fetch(
    registry: &ModelRegistry,
    tx: &mpsc::UnboundedSender<Event>,
    refresh: bool,
) {
    let registry = registry.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let models = registry.list_models().await;
        let event = if refresh {
            Event::ModelsRefreshed(models)
        } else {
            Event::ModelsLoaded(models)
        };
        if tx.send(event).is_err() {
            tracing::debug!("Chat closed before models loaded");
        }
    });
}

async fn start_loop(
    app_state: &mut AppState,
    events: &mut EventsService<BufReader<tokio::io::Stdin>>,
    registry: &ModelRegistry,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    // Sends still running when the chat ends are aborted, never applied.
    let mut workers = task::JoinSet::new();
    let mut input_closed = false;

    while let Some(event) = events.next().await {
        match event {
            Event::InputLine(line) => match app_state.handle_input(&line) {
                InputOutcome::Submitted(pending) => {
                    tracing::debug!(seq = pending.seq(), "Waiting on reply");
                    let worker_tx = tx.clone();
                    workers.spawn(async move {
                        let outcome = pending.wait().await;
                        if worker_tx.send(Event::ReplyReceived(outcome)).is_err() {
                            tracing::debug!("Chat closed before the reply arrived");
                        }
                    });
                    print_messages(app_state);
                    print_prompt(app_state);
                }
                InputOutcome::Rejected(err) => {
                    tracing::debug!(error = ?err, "Input rejected");
                    if let Some(hint) = app_state.render_rejection(&err, &line) {
                        println!("{}", Paint::yellow(hint));
                    }
                }
                InputOutcome::Cleared => {
                    print_messages(app_state);
                    print_prompt(app_state);
                }
                InputOutcome::ListModels => {
                    println!("{}", Paint::new("Loading models...").dimmed());
                    spawn_models_fetch(registry, &tx, true);
                }
                InputOutcome::Notice(text) => {
                    println!("{text}");
                    print_prompt(app_state);
                }
                InputOutcome::Quit => {
                    break;
                }
            },
            Event::InputClosed() => {
                input_closed = true;
                if !app_state.session.is_pending() {
                    break;
                }
            }
            Event::ModelsLoaded(models) => {
                app_state.set_models(models);
            }
            Event::ModelsRefreshed(models) => {
                app_state.set_models(models);
                println!("{}", app_state.model_list_text());
                print_prompt(app_state);
            }
            Event::ReplyReceived(outcome) => {
                if app_state.session.apply(outcome) {
                    tracing::debug!(status = %app_state.session.status(), "Reply applied");
                    print_messages(app_state);
                    print_prompt(app_state);
                }
                if input_closed && !app_state.session.is_pending() {
                    break;
                }
            }
        }
    }

    workers.abort_all();
    return Ok(());
}

pub async fn start(launch: Launch) -> Result<()> {
    let config = launch.config;
    let backend = Arc::new(BackendManager::get(&config));
    let registry = ModelRegistry::new(Arc::clone(&backend));

    let mut initial_messages = vec![];
    if let Some(history) = &launch.history {
        initial_messages = load_history(history).await?;
    }

    let session = ChatSession::new(
        Arc::clone(&backend),
        SessionOptions {
            max_length: config.max_message_length,
            disabled: config.disabled,
            initial_messages,
        },
    );
    let mut app_state = AppState::new(session, &config);

    println!(
        "{}",
        Paint::new(format!("{} v{}", app_state.app_name, app_state.app_version)).bold()
    );

    if let Err(err) = backend.health_check().await {
        tracing::warn!(backend = %backend.name(), error = ?err, "Health check failed");
        println!(
            "{}",
            Paint::yellow(format!(
                "The {} chat service can't be reached right now, messages may fail to send.\n\nError: {err}",
                backend.name()
            ))
        );
    }

    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    if launch.pick_model {
        let models = registry.list_models().await;
        let picked = pick_model(&models, &app_state.selected_model).await?;
        app_state.set_models(models);
        if let Some(model) = picked {
            if let Err(err) = app_state.select_model(&model) {
                println!("{}", Paint::yellow(err));
            }
        }
    } else {
        spawn_models_fetch(&registry, &tx, false);
    }

    print_messages(&mut app_state);
    print_prompt(&app_state);

    let mut events = EventsService::new(BufReader::new(tokio::io::stdin()), rx);
    start_loop(&mut app_state, &mut events, &registry, tx).await?;

    return Ok(());
}
