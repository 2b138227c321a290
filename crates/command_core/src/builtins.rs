//! Viewer commands registered in the system group.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use shared::domain::{CursorKind, EntityId, InteractionMode, PointerEvent, Rect};
use tracing::debug;

use crate::{
    command::{Command, CommandContext},
    error::RegistryError,
    jig::{Jig, JigBehavior, JigLoop},
    registry::{CommandRegistry, SYSTEM_GROUP},
    view::View,
};

pub const DEFAULT_ZOOM_WINDOW_MARGIN: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSettings {
    /// Margin factor passed to `zoom_to` by the zoom-window command.
    pub zoom_window_margin: f64,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            zoom_window_margin: DEFAULT_ZOOM_WINDOW_MARGIN,
        }
    }
}

pub fn register_builtin_commands(
    registry: &mut CommandRegistry,
    settings: &CommandSettings,
) -> Result<(), RegistryError> {
    let commands: [(&str, Arc<dyn Command>); 6] = [
        ("pan", Arc::new(PanCommand)),
        ("select", Arc::new(SelectCommand)),
        ("zoom", Arc::new(ZoomExtentsCommand)),
        (
            "zoomw",
            Arc::new(ZoomWindowCommand {
                margin: settings.zoom_window_margin,
            }),
        ),
        ("boxselect", Arc::new(BoxSelectCommand)),
        ("deselect", Arc::new(ClearSelectionCommand)),
    ];
    for (name, command) in commands {
        registry.add_command(SYSTEM_GROUP, name, name, command)?;
    }
    Ok(())
}

pub struct PanCommand;

#[async_trait]
impl Command for PanCommand {
    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.view.set_mode(InteractionMode::Pan);
        ctx.view.set_cursor(CursorKind::Grab);
        Ok(())
    }
}

pub struct SelectCommand;

#[async_trait]
impl Command for SelectCommand {
    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.view.set_mode(InteractionMode::Selection);
        ctx.view.set_cursor(CursorKind::Crosshair);
        Ok(())
    }
}

pub struct ZoomExtentsCommand;

#[async_trait]
impl Command for ZoomExtentsCommand {
    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.view.zoom_to_extents();
        Ok(())
    }
}

pub struct ClearSelectionCommand;

#[async_trait]
impl Command for ClearSelectionCommand {
    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.selection.clear();
        Ok(())
    }
}

/// Zooms the view to a rectangle the user drags out.
pub struct ZoomWindowCommand {
    pub margin: f64,
}

#[async_trait]
impl Command for ZoomWindowCommand {
    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let jig = Jig::new(
            Arc::clone(&ctx.view),
            ZoomWindowJig {
                margin: self.margin,
            },
        );
        let _active = ctx.interaction.track(jig.canceller());
        let rect = jig.drag().await?;
        debug!(?rect, margin = self.margin, "zoom window applied");
        Ok(())
    }
}

pub struct ZoomWindowJig {
    pub margin: f64,
}

#[async_trait]
impl JigBehavior for ZoomWindowJig {
    type Output = Rect;

    async fn sampler(&self, view: &dyn View, jig: &JigLoop<Rect>) -> anyhow::Result<()> {
        let rect = view
            .selection_box()
            .await
            .context("waiting for zoom window")?;
        jig.resolve(rect);
        view.zoom_to(rect, self.margin);
        Ok(())
    }
}

/// Rubber-band selection: adds every entity inside the dragged box.
pub struct BoxSelectCommand;

#[async_trait]
impl Command for BoxSelectCommand {
    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.view.set_mode(InteractionMode::Selection);
        let jig = Jig::new(Arc::clone(&ctx.view), BoxSelectJig);
        let _active = ctx.interaction.track(jig.canceller());
        let picked = jig.drag().await?;
        debug!(picked = picked.len(), "box selection picked entities");
        ctx.selection.add(picked);
        Ok(())
    }
}

pub struct BoxSelectJig;

#[async_trait]
impl JigBehavior for BoxSelectJig {
    type Output = Vec<EntityId>;

    fn update(&self, view: &dyn View, _pointer: &PointerEvent) {
        view.set_cursor(CursorKind::Rect);
    }

    async fn sampler(&self, view: &dyn View, jig: &JigLoop<Vec<EntityId>>) -> anyhow::Result<()> {
        let rect = view
            .selection_box()
            .await
            .context("waiting for selection box")?;
        jig.resolve(view.entities_in(rect));
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/builtins_tests.rs"]
mod tests;
