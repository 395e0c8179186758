//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Color a status word green or red depending on `good`.
pub fn paint_status(text: &str, good: bool, color: bool) -> String {
    match (color, good) {
        (false, _) => text.to_owned(),
        (true, true) => text.green().to_string(),
        (true, false) => text.red().to_string(),
    }
}

/// `-` for absent optional values.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views are key/value
/// blocks rather than rows.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Render a payload that has no typed model. Table shows it as YAML, the
/// closest thing to a key/value view; plain emits compact JSON.
pub fn render_raw(format: OutputFormat, data: &serde_json::Value) -> Result<String, CliError> {
    match format {
        OutputFormat::Table | OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact | OutputFormat::Plain => render_json(data, true),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Status line on stderr, suppressed by `--quiet`.
pub fn notice(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        id: String,
        name: String,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: "1".into(),
                name: "Home".into(),
            },
            Item {
                id: "2".into(),
                name: "Cabin".into(),
            },
        ]
    }

    fn row(i: &Item) -> ItemRow {
        ItemRow {
            id: i.id.clone(),
            name: i.name.clone(),
        }
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(OutputFormat::Plain, &items(), row, |i| i.id.clone()).unwrap();
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn table_has_headers_and_values() {
        let out = render_list(OutputFormat::Table, &items(), row, |i| i.id.clone()).unwrap();
        assert!(out.contains("Name"));
        assert!(out.contains("Cabin"));
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(OutputFormat::JsonCompact, &items(), row, |i| i.id.clone()).unwrap();
        assert_eq!(out, r#"[{"id":"1","name":"Home"},{"id":"2","name":"Cabin"}]"#);
    }

    #[test]
    fn status_is_plain_without_color() {
        assert_eq!(paint_status("online", true, false), "online");
        assert_ne!(paint_status("online", true, true), "online");
    }

    #[test]
    fn raw_payload_table_is_yaml() {
        let value = serde_json::json!({ "band_steering": true, "dns": { "mode": "auto" } });
        let out = render_raw(OutputFormat::Table, &value).unwrap();
        assert!(out.contains("band_steering: true"));
        assert!(out.contains("mode: auto"));

        let plain = render_raw(OutputFormat::Plain, &value).unwrap();
        assert!(!plain.contains('\n'));
    }
}
