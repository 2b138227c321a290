use anyhow::anyhow;
use async_trait::async_trait;
use shared::{
    domain::{CursorKind, InteractionMode, Rect},
    error::{CommandFailure, ErrorCode},
};

use super::*;
use crate::{
    builtins::ZoomExtentsCommand, command::Command, registry::USER_GROUP,
    test_support::RecordingView, view::View,
};

struct Broken;

#[async_trait]
impl Command for Broken {
    async fn execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        Err(anyhow!("document is read-only"))
    }
}

fn editor(view: &Arc<RecordingView>) -> Editor {
    Editor::with_builtins(view.clone(), &CommandSettings::default()).expect("editor")
}

#[tokio::test]
async fn executes_builtin_by_name() {
    let view = RecordingView::new();
    let editor = editor(&view);

    editor.execute("pan").await.expect("pan");

    assert_eq!(view.mode(), InteractionMode::Pan);
    assert_eq!(view.cursor(), CursorKind::Grab);
    assert_eq!(editor.active_command(), None);
}

#[tokio::test]
async fn unknown_name_is_reported() {
    let view = RecordingView::new();
    let editor = editor(&view);

    let err = editor.execute("explode").await.expect_err("unknown");

    assert!(matches!(err, ExecuteError::UnknownCommand(ref name) if name == "explode"));
    assert!(matches!(
        CommandFailure::from(&err).code,
        ErrorCode::UnknownCommand
    ));
}

#[tokio::test]
async fn falls_back_to_global_name() {
    let view = RecordingView::new();
    let editor = editor(&view);
    editor
        .registry_mut()
        .add_command(USER_GROUP, "ZOOMEXTENTS", "ze", Arc::new(ZoomExtentsCommand))
        .expect("register");

    editor.execute("ze").await.expect("local");
    editor.execute("ZOOMEXTENTS").await.expect("global");

    assert_eq!(view.extents_zooms(), 2);
}

#[tokio::test]
async fn command_failure_carries_the_command_name() {
    let view = RecordingView::new();
    let editor = editor(&view);
    editor
        .registry_mut()
        .add_command(USER_GROUP, "save", "", Arc::new(Broken))
        .expect("register");

    let err = editor.execute("save").await.expect_err("fails");

    match &err {
        ExecuteError::Failed { name, source } => {
            assert_eq!(name, "save");
            assert!(source.to_string().contains("read-only"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_cancellation());
    assert!(matches!(CommandFailure::from(&err).code, ErrorCode::Internal));
}

#[tokio::test]
async fn escape_cancels_the_running_jig_and_frees_the_editor() {
    let view = RecordingView::new();
    let editor = editor(&view);

    let (zoomed, busy, cancelled) = tokio::join!(
        editor.execute("zoomw"),
        async {
            tokio::task::yield_now().await;
            editor.execute("pan").await
        },
        async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            editor.cancel_active("escape")
        }
    );

    assert!(matches!(busy, Err(ExecuteError::Busy { ref active }) if active == "zoomw"));
    assert!(cancelled);
    let err = zoomed.expect_err("cancelled");
    assert!(err.is_cancellation());
    assert!(matches!(CommandFailure::from(&err).code, ErrorCode::Cancelled));
    assert!(view.zooms().is_empty());

    assert_eq!(editor.active_command(), None);
    assert!(!editor.cancel_active("escape"));
    view.supply_box(Rect::new(0.0, 0.0, 4.0, 4.0));
    editor.execute("zoomw").await.expect("fresh run");
    assert_eq!(view.zooms(), vec![(Rect::new(0.0, 0.0, 4.0, 4.0), 1.0)]);
}

#[tokio::test]
async fn deselect_through_editor_notifies_removal() {
    let view = RecordingView::new();
    let editor = editor(&view);
    editor.selection().add([shared::domain::EntityId::new("7")]);

    editor.execute("deselect").await.expect("deselect");

    assert_eq!(editor.selection().count(), 0);
    assert_eq!(editor.registry().len(), 6);
}
