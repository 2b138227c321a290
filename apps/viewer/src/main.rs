use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use command_core::{Editor, SelectionSet};
use shared::{
    error::CommandFailure,
    protocol::{CommandSummary, ViewerEvent},
};
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{info, warn};

mod config;
mod headless;
mod script;

use config::load_settings;
use headless::HeadlessView;
use script::{parse_line, ScriptLine};

#[derive(Parser, Debug)]
struct Args {
    /// Config file; `viewer.toml` is read when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Script to run; stdin when absent.
    #[arg(long)]
    script: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ViewerEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            println!("{}", serde_json::to_string(&event)?);
        }
        Ok::<_, anyhow::Error>(())
    });

    let view = Arc::new(HeadlessView::new(settings.pointer_buffer, events_tx.clone()));
    let editor = Arc::new(Editor::with_builtins(
        view.clone(),
        &settings.command_settings(),
    )?);
    forward_selection_events(editor.selection(), &events_tx);
    {
        let registry = editor.registry();
        info!(
            commands = registry.len(),
            groups = ?registry.group_names(),
            "viewer ready"
        );
    }

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match &args.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .await
                .with_context(|| format!("failed to open script '{}'", path.display()))?,
        )),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut tasks: Vec<JoinHandle<()>> = Vec::new();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let parsed = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(line = %line, "skipping script line: {err:#}");
                continue;
            }
        };

        match parsed {
            ScriptLine::Blank => {}
            ScriptLine::Entity { id, at } => view.place_entity(id, at),
            ScriptLine::Move(at) => {
                view.move_pointer(at);
            }
            ScriptLine::Box(rect) => view.drag_box(rect),
            ScriptLine::Escape => {
                editor.cancel_active("escape");
            }
            ScriptLine::ListCommands => {
                let commands = editor
                    .registry()
                    .iter()
                    .map(|(command, group)| CommandSummary {
                        group: group.to_string(),
                        global_name: command.global_name().to_string(),
                        local_name: command.local_name().to_string(),
                    })
                    .collect();
                let _ = events_tx.send(ViewerEvent::Commands { commands });
            }
            ScriptLine::ShowSelection => {
                let _ = events_tx.send(ViewerEvent::Selection {
                    ids: editor.selection().ids(),
                });
            }
            ScriptLine::Run(name) => {
                tasks.retain(|task| !task.is_finished());
                tasks.push(tokio::spawn(run_command(
                    Arc::clone(&editor),
                    name,
                    events_tx.clone(),
                )));
            }
        }
        // Let a running command react before the next line arrives.
        tokio::task::yield_now().await;
    }

    tokio::task::yield_now().await;
    if editor.cancel_active("end of input") {
        info!("cancelled the command still waiting for input");
    }
    for task in tasks {
        task.await.context("command task panicked")?;
    }

    drop(editor);
    drop(view);
    drop(events_tx);
    printer.await.context("event printer panicked")??;
    Ok(())
}

async fn run_command(editor: Arc<Editor>, name: String, events: mpsc::UnboundedSender<ViewerEvent>) {
    let event = match editor.execute(&name).await {
        Ok(()) => ViewerEvent::CommandFinished { name },
        Err(err) => {
            warn!(command = %name, "{err}");
            ViewerEvent::CommandFailed {
                name,
                error: CommandFailure::from(&err),
            }
        }
    };
    let _ = events.send(event);
}

fn forward_selection_events(selection: &SelectionSet, events: &mpsc::UnboundedSender<ViewerEvent>) {
    let added = events.clone();
    selection.added().add_listener(move |change| {
        let _ = added.send(ViewerEvent::SelectionAdded(change.clone()));
    });
    let removed = events.clone();
    selection.removed().add_listener(move |change| {
        let _ = removed.send(ViewerEvent::SelectionRemoved(change.clone()));
    });
}
