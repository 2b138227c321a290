//! Line-oriented input understood by the headless viewer.

use anyhow::{anyhow, bail, Context};
use shared::domain::{EntityId, Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLine {
    Blank,
    Entity { id: EntityId, at: Point },
    Move(Point),
    Box(Rect),
    Escape,
    ListCommands,
    ShowSelection,
    Run(String),
}

pub fn parse_line(line: &str) -> anyhow::Result<ScriptLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(ScriptLine::Blank);
    }

    let mut parts = line.split_whitespace();
    let head = parts.next().ok_or_else(|| anyhow!("empty line"))?;
    let args: Vec<&str> = parts.collect();

    let parsed = match head {
        "entity" => {
            let [id, x, y] = args.as_slice() else {
                bail!("usage: entity <id> <x> <y>");
            };
            ScriptLine::Entity {
                id: EntityId::new(*id),
                at: Point::new(number(x)?, number(y)?),
            }
        }
        "move" => {
            let [x, y] = args.as_slice() else {
                bail!("usage: move <x> <y>");
            };
            ScriptLine::Move(Point::new(number(x)?, number(y)?))
        }
        "box" => {
            let [x0, y0, x1, y1] = args.as_slice() else {
                bail!("usage: box <x0> <y0> <x1> <y1>");
            };
            ScriptLine::Box(Rect::new(
                number(x0)?,
                number(y0)?,
                number(x1)?,
                number(y1)?,
            ))
        }
        "escape" | "esc" => ScriptLine::Escape,
        "commands" => ScriptLine::ListCommands,
        "selection" => ScriptLine::ShowSelection,
        name if args.is_empty() => ScriptLine::Run(name.to_string()),
        name => bail!("command '{name}' takes no arguments"),
    };
    Ok(parsed)
}

fn number(raw: &str) -> anyhow::Result<f64> {
    raw.parse::<f64>()
        .with_context(|| format!("'{raw}' is not a number"))
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
