use std::{future::Future, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{load_settings, load_settings_from},
    ArtifactFile, ConsoleError, ConsoleEvent, Coordinator, FeatureEditor, Settings,
    StatusMessage,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::Command;

#[derive(Parser, Debug)]
#[command(about = "Operator console for the model registry and serving engine")]
struct Args {
    /// TOML file with base URLs, `console.toml` when omitted. Missing files
    /// fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    registry_url: Option<String>,
    #[arg(long)]
    artifact_url: Option<String>,
    #[arg(long)]
    serving_url: Option<String>,
    #[arg(long)]
    gateway_url: Option<String>,
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        let settings = match &self.config {
            Some(path) => load_settings_from(path, |key| std::env::var(key).ok()),
            None => load_settings(),
        };
        let settings = self.apply_overrides(settings);
        settings.validate().context("invalid console configuration")?;
        Ok(settings)
    }

    /// Command-line URLs win over the file and environment.
    fn apply_overrides(&self, mut settings: Settings) -> Settings {
        for (target, value) in [
            (&mut settings.registry_url, &self.registry_url),
            (&mut settings.artifact_url, &self.artifact_url),
            (&mut settings.serving_url, &self.serving_url),
            (&mut settings.gateway_url, &self.gateway_url),
        ] {
            if let Some(value) = value {
                *target = value.trim_end_matches('/').to_string();
            }
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = args.settings()?;
    info!(
        registry = %settings.registry_url,
        artifacts = %settings.artifact_url,
        serving = %settings.serving_url,
        gateway = %settings.gateway_url,
        "console: starting"
    );

    let coordinator = Coordinator::new(&settings);
    let renderer = tokio::spawn(render_events(coordinator.subscribe_events()));

    println!("Model console. Type 'help' for commands.");
    spawn_action(coordinator.clone(), |c| async move { c.refresh_models().await });

    let mut editor = FeatureEditor::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        dispatch(&coordinator, &mut editor, &mut lines, command).await?;
    }

    renderer.abort();
    Ok(())
}

async fn dispatch(
    coordinator: &Arc<Coordinator>,
    editor: &mut FeatureEditor,
    lines: &mut Lines<BufReader<Stdin>>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Refresh => {
            spawn_action(coordinator.clone(), |c| async move { c.refresh_models().await });
        }
        Command::Register { name, version } => {
            spawn_action(coordinator.clone(), move |c| async move {
                c.register_model(&name, &version).await
            });
        }
        // Both outcomes reach the renderer as events.
        Command::Select(model_id) => {
            let _ = coordinator.select_model(model_id).await;
        }
        Command::Delete(model_id) => {
            let request = coordinator.request_delete(model_id);
            println!("Are you sure you want to delete this model? [y/N]");
            let answer = lines.next_line().await?.unwrap_or_default();
            if commands::is_confirmation(&answer) {
                let confirmed = request.confirm();
                spawn_action(coordinator.clone(), move |c| async move {
                    c.delete_model(confirmed).await
                });
            } else {
                request.cancel();
                println!("Delete cancelled.");
            }
        }
        Command::Upload(path) => {
            let file = match path {
                Some(path) => match ArtifactFile::from_path(&path).await {
                    Ok(file) => Some(file),
                    Err(err) => {
                        println!("Cannot read {}: {err}", path.display());
                        return Ok(());
                    }
                },
                None => None,
            };
            if let Some(file) = &file {
                println!("Selected file: {} ({:.2} KB)", file.file_name, file.size_kib());
                if !file.has_advertised_extension() {
                    warn!(file_name = %file.file_name, "console: artifact extension is not one of the advertised formats");
                }
            }
            spawn_action(coordinator.clone(), move |c| async move {
                c.upload_artifact(file).await
            });
        }
        Command::Load => {
            spawn_action(coordinator.clone(), |c| async move { c.load_selected().await });
        }
        Command::Status => {
            spawn_action(coordinator.clone(), |c| async move { c.check_status().await });
        }
        Command::Features => println!("{}", render::features(editor)),
        Command::FeatureAdd => {
            editor.push();
            println!("{}", render::features(editor));
        }
        Command::FeatureRemove(index) => match editor.remove(index) {
            Some(_) => println!("{}", render::features(editor)),
            None if editor.len() == 1 => println!("At least one feature is required."),
            None => println!("No feature at index {index}."),
        },
        Command::FeatureSet { index, value } => {
            if editor.set(index, value) {
                println!("{}", render::features(editor));
            } else {
                println!("No feature at index {index}.");
            }
        }
        Command::Sample(sample) => {
            editor.load_sample(sample);
            println!("{}", render::features(editor));
        }
        Command::Predict => {
            let features = editor.to_vector();
            spawn_action(coordinator.clone(), move |c| async move {
                c.predict(features).await
            });
        }
        Command::Tab(stage) => {
            let _ = coordinator.navigate(stage).await;
        }
        Command::Show => println!("{}", render::workflow(&coordinator.snapshot().await)),
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => {}
    }
    Ok(())
}

/// Runs a backend action off the input loop. Failures other than a duplicate
/// submission already reach the operator as status events.
fn spawn_action<F, Fut, T>(coordinator: Arc<Coordinator>, action: F)
where
    F: FnOnce(Arc<Coordinator>) -> Fut,
    Fut: Future<Output = Result<T, ConsoleError>> + Send + 'static,
    T: Send + 'static,
{
    let pending = action(coordinator);
    tokio::spawn(async move {
        if let Err(err @ ConsoleError::InFlight(_)) = pending.await {
            println!("{}", render::status(&StatusMessage::warning(err.to_string())));
        }
    });
}

async fn render_events(mut events: tokio::sync::broadcast::Receiver<ConsoleEvent>) {
    loop {
        match events.recv().await {
            Ok(ConsoleEvent::StateChanged(state)) => println!("{}", render::workflow(&state)),
            Ok(ConsoleEvent::Status(message)) => println!("{}", render::status(&message)),
            Ok(ConsoleEvent::InFlightChanged { action, busy: true }) => {
                println!("{}...", action.label());
            }
            Ok(ConsoleEvent::InFlightChanged { busy: false, .. }) => {}
            Ok(ConsoleEvent::PredictionReady(prediction)) => {
                println!("{}", render::prediction(&prediction));
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "console: renderer fell behind; some events were dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
