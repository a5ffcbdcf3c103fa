//! JSON shapes crossing the JavaScript boundary.
//!
//! Selectors arrive as plain JSON values: an item id (number), a tag or
//! `"*"` (string), or an array nesting either. Handlers return mutation
//! commands as objects tagged by `op`:
//!
//! ```json
//! [{ "op": "move", "selector": "fish", "dx": 4, "dy": 0 },
//!  { "op": "setPattern", "selector": 3, "pattern": { "backgroundColor": "coral" } }]
//! ```

use canvanim_core::{Cursor, Error, ItemId, PatternPatch, Result, SceneMutation, Selector};
use serde::Deserialize;
use serde_json::Value;

pub fn parse_selector(value: &Value) -> Result<Selector> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|raw| Selector::Item(ItemId::new(raw)))
            .ok_or_else(|| Error::argument("selector", "id", format!("is not an item id ({n})"))),
        Value::String(s) => Ok(Selector::from(s.as_str())),
        Value::Array(values) => values.iter().map(parse_selector).collect::<Result<Vec<_>>>().map(Selector::Many),
        other => Err(Error::argument("selector", "selector", format!("has unsupported shape {other}"))),
    }
}

pub fn parse_selector_json(json: &str) -> Result<Selector> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::argument("selector", "selector", format!("is not valid JSON ({e})")))?;
    parse_selector(&value)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", deny_unknown_fields)]
enum Command {
    SetPattern { selector: Value, pattern: PatternPatch },
    Coords { selector: Value, x: f64, y: f64 },
    Move { selector: Value, dx: f64, dy: f64 },
    Delete { selector: Value },
    Overlap { selector: Value },
    AddTag { selector: Value, tag: String },
    DeleteTag { selector: Value, tag: String },
    SetView { x: f64, y: f64 },
    MoveView { dx: f64, dy: f64 },
    SetCursor { cursor: String },
    SetItemCursor { selector: Value, cursor: String },
    SetImageSource { selector: Value, source: String },
    Reload,
}

impl Command {
    fn into_mutation(self) -> Result<SceneMutation> {
        Ok(match self {
            Command::SetPattern { selector, pattern } => SceneMutation::SetPattern {
                selector: parse_selector(&selector)?,
                patch: pattern,
            },
            Command::Coords { selector, x, y } => SceneMutation::Coords {
                selector: parse_selector(&selector)?,
                x,
                y,
            },
            Command::Move { selector, dx, dy } => SceneMutation::Move {
                selector: parse_selector(&selector)?,
                dx,
                dy,
            },
            Command::Delete { selector } => SceneMutation::Delete(parse_selector(&selector)?),
            Command::Overlap { selector } => SceneMutation::Overlap(parse_selector(&selector)?),
            Command::AddTag { selector, tag } => SceneMutation::AddTag {
                selector: parse_selector(&selector)?,
                tag,
            },
            Command::DeleteTag { selector, tag } => SceneMutation::DeleteTag {
                selector: parse_selector(&selector)?,
                tag,
            },
            Command::SetView { x, y } => SceneMutation::SetView { x, y },
            Command::MoveView { dx, dy } => SceneMutation::MoveView { dx, dy },
            Command::SetCursor { cursor } => SceneMutation::SetCursor(cursor_arg(&cursor)?),
            Command::SetItemCursor { selector, cursor } => SceneMutation::SetItemCursor {
                selector: parse_selector(&selector)?,
                cursor: cursor_arg(&cursor)?,
            },
            Command::SetImageSource { selector, source } => SceneMutation::SetImageSource {
                selector: parse_selector(&selector)?,
                source,
            },
            Command::Reload => SceneMutation::Reload,
        })
    }
}

fn cursor_arg(cursor: &str) -> Result<Cursor> {
    let cursor = cursor.trim();
    if cursor.is_empty() {
        return Err(Error::argument("mutation", "cursor", "must not be empty"));
    }
    Ok(Cursor::parse(cursor))
}

/// Decode whatever a handler returned: nothing, one command, or a list.
pub fn parse_mutations(json: &str) -> Result<Vec<SceneMutation>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::argument("mutation", "commands", format!("are not valid JSON ({e})")))?;
    let commands = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(values) => values,
        single => vec![single],
    };
    commands
        .into_iter()
        .map(|value| {
            serde_json::from_value::<Command>(value)
                .map_err(|e| Error::argument("mutation", "command", e.to_string()))?
                .into_mutation()
        })
        .collect()
}

/// Parse `new CanvAnim(canvas, options)` options; empty means defaults.
pub fn parse_options(json: &str) -> Result<canvanim_scene::SceneOptions> {
    if json.trim().is_empty() {
        return Ok(Default::default());
    }
    serde_json::from_str(json).map_err(|e| Error::argument("CanvAnim::new", "options", e.to_string()))
}

pub fn parse_pattern(operation: &'static str, json: &str) -> Result<PatternPatch> {
    if json.trim().is_empty() {
        return Ok(PatternPatch::default());
    }
    serde_json::from_str(json).map_err(|e| Error::argument(operation, "pattern", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn selector_shapes() {
        assert_eq!(parse_selector(&json!(4)).unwrap(), Selector::Item(ItemId::new(4)));
        assert_eq!(parse_selector(&json!("*")).unwrap(), Selector::All);
        assert_eq!(parse_selector(&json!("crab")).unwrap(), Selector::Tag("crab".into()));
        assert_eq!(
            parse_selector(&json!([1, ["crab"]])).unwrap(),
            Selector::Many(vec![
                Selector::Item(ItemId::new(1)),
                Selector::Many(vec![Selector::Tag("crab".into())]),
            ])
        );
        assert!(parse_selector(&json!(-2)).is_err());
        assert!(parse_selector(&json!({"id": 1})).is_err());
    }

    #[test]
    fn handler_results() {
        assert!(parse_mutations("null").unwrap().is_empty());

        let one = parse_mutations(r#"{"op": "delete", "selector": 3}"#).unwrap();
        assert_eq!(one, vec![SceneMutation::Delete(Selector::Item(ItemId::new(3)))]);

        let many = parse_mutations(
            r#"[{"op": "move", "selector": "fish", "dx": 4, "dy": 0},
                {"op": "setCursor", "cursor": "pointer"},
                {"op": "reload"}]"#,
        )
        .unwrap();
        assert_eq!(
            many,
            vec![
                SceneMutation::Move {
                    selector: Selector::Tag("fish".into()),
                    dx: 4.0,
                    dy: 0.0
                },
                SceneMutation::SetCursor(Cursor::Named("pointer".into())),
                SceneMutation::Reload,
            ]
        );
    }

    #[test]
    fn bad_commands_are_rejected_whole() {
        assert!(parse_mutations(r#"[{"op": "reload"}, {"op": "explode"}]"#).is_err());
        assert!(parse_mutations(r#"{"op": "move", "selector": 1, "dx": 1}"#).is_err());
        assert!(parse_mutations(r#"{"op": "setCursor", "cursor": "  "}"#).is_err());
        assert!(parse_mutations("{").is_err());
    }

    #[test]
    fn options_and_patterns_default_when_blank() {
        assert_eq!(parse_options("").unwrap(), Default::default());
        let options = parse_options(r#"{"scrollRegion": {"east": 200}, "offset": {"x": 8, "y": 8}}"#).unwrap();
        assert_eq!(options.scroll_region.east, 200.0);
        assert_eq!(options.offset.x, 8.0);

        assert!(parse_pattern("test", " ").unwrap().is_empty());
        assert!(parse_pattern("test", r#"{"borderWidth": "wide"}"#).is_err());
    }
}
