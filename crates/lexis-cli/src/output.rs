//! Rendering of lookup results.

use std::fmt::Write as _;

use colored::Colorize;
use lexis_core::{Entry, FindWordByDictionaryResponse};

/// Output format for commands that print entries
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Coloured, human-readable text (default)
    Pretty,
    /// The serialized response object
    Json,
}

/// Render `response` in `format`.
pub fn render(response: &FindWordByDictionaryResponse, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        OutputFormat::Pretty => Ok(render_pretty(&response.entries)),
    }
}

fn render_pretty(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return format!("{}", "No entries found".yellow());
    }

    let mut out = String::new();
    let mut last_head: Option<(&str, &str)> = None;

    for entry in entries {
        let head = (entry.word.as_str(), entry.part_of_speech.as_str());
        if last_head != Some(head) {
            if last_head.is_some() {
                out.push('\n');
            }
            let _ = write!(out, "{}", entry.word.bold());
            if !entry.part_of_speech.is_empty() {
                let _ = write!(out, " {}", entry.part_of_speech.italic().cyan());
            }
            if !entry.pronunciation.text.is_empty() {
                let _ = write!(out, " {}", entry.pronunciation.text.bright_black());
            }
            if !entry.grammar_note.is_empty() {
                let _ = write!(out, " {}", entry.grammar_note.bright_black());
            }
            out.push('\n');
            last_head = Some(head);
        }

        let marker = if entry.favorite_marker_id.is_some() {
            "★".yellow().to_string()
        } else {
            " ".to_string()
        };
        let id = entry
            .id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let _ = write!(out, "{marker} {:>3}. ", entry.order_rank);
        if !entry.definition_grammar_note.is_empty() {
            let _ = write!(out, "{} ", entry.definition_grammar_note.green());
        }
        let _ = writeln!(out, "{} {}", entry.definition, format!("#{id}").bright_black());

        for example in &entry.examples {
            if !example.pattern.is_empty() {
                let _ = writeln!(out, "        {}", example.pattern.bold());
            }
            for sentence in &example.sentences {
                let _ = writeln!(out, "        {} {}", "•".bright_black(), sentence.text);
            }
        }
    }

    out.trim_end().to_string()
}
