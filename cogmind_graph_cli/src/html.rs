use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use cogmind_graph::ChartKind;

use crate::render::ImageFormat;

const TITLE: &str = "Cogmind progression graphs";

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn stylesheet(size: u32) -> String {
    format!(
        r#"body {{
  background: #eee;
}}

.list {{
  display: flex;
  flex-direction: column;
  align-items: center;
}}

.list img {{
  margin: 0.5em;
  max-width: 95vw;
  max-height: 95vh;
}}

.format-svg img {{
  width: {size}px;
}}
"#
    )
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Build the gallery root page. `players` pairs the display name with the
/// directory holding that player's charts.
pub fn render_index(players: &[(String, String, usize)]) -> String {
    let mut sorted: Vec<&(String, String, usize)> = players.iter().collect();
    sorted.sort_by_key(|(name, _, _)| name.to_lowercase());

    let mut doc = String::new();
    let _ = write!(
        doc,
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <title>{TITLE}</title>
    <link rel="stylesheet" type="text/css" href="style.css">
  </head>
  <body>
    <h1>{TITLE}</h1>
    <p>Last updated: {}</p>
    <ul>
"#,
        timestamp()
    );
    for (name, dir, games) in sorted {
        let _ = writeln!(
            doc,
            r#"      <li><a href="{}">{}</a> ({} games)</li>"#,
            escape(dir),
            escape(name),
            games
        );
    }
    doc.push_str("    </ul>\n  </body>\n</html>\n");
    doc
}

pub fn render_player_index(player: &str, format: ImageFormat) -> String {
    let ext = format.extension();
    let mut doc = String::new();
    let _ = write!(
        doc,
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <title>{}'s Cogmind progression</title>
    <link rel="stylesheet" type="text/css" href="../style.css">
  </head>
  <body>
    <div class="list format-{ext}">
"#,
        escape(player)
    );
    for kind in ChartKind::ALL {
        let _ = writeln!(
            doc,
            r#"      <img src="{name}.{ext}" alt="{name}">"#,
            name = kind.name()
        );
    }
    let _ = write!(
        doc,
        "    </div>\n    <p>Last updated: {}</p>\n  </body>\n</html>\n",
        timestamp()
    );
    doc
}

pub fn write_index(output: &Path, players: &[(String, String, usize)], size: u32) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_file(&output.join("style.css"), &stylesheet(size))?;
    write_file(&output.join("index.html"), &render_index(players))
}

pub fn write_player_index(dir: &Path, player: &str, format: ImageFormat) -> Result<()> {
    write_file(&dir.join("index.html"), &render_player_index(player, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a&b>\"'"), "&lt;a&amp;b&gt;&quot;&#39;");
    }

    #[test]
    fn index_lists_players_case_insensitively() {
        let players = vec![
            ("zed".to_string(), "zed".to_string(), 3),
            ("Amy".to_string(), "Amy".to_string(), 5),
            ("bob".to_string(), "bob".to_string(), 2),
        ];
        let doc = render_index(&players);
        let amy = doc.find("Amy").unwrap();
        let bob = doc.find("bob").unwrap();
        let zed = doc.find("zed").unwrap();
        assert!(amy < bob && bob < zed);
        assert!(doc.contains(r#"<a href="Amy">Amy</a> (5 games)"#));
    }

    #[test]
    fn player_index_embeds_every_chart() {
        let doc = render_player_index("Ape", ImageFormat::Png);
        assert!(doc.contains(r#"class="list format-png""#));
        for kind in ChartKind::ALL {
            assert!(doc.contains(&format!("{}.png", kind.name())));
        }
        assert!(doc.contains("Ape's Cogmind progression"));
    }

    #[test]
    fn stylesheet_sizes_svg_images() {
        assert!(stylesheet(900).contains("width: 900px;"));
    }
}
