//! Markdown rendering of an ordered question list.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;
use question_order::OrderedQuestions;
use question_order::bits::to_binary;

/// Where the list and its history live.
pub const DEFAULT_REPO_URL: &str = "https://github.com/paul-gauthier/quantum-random-ama-questions";

/// Inputs of the page besides the questions themselves.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// True when the values came from the quantum source.
    pub quantum: bool,
    /// Width of the binary column.
    pub bits: u32,
    pub post_url: String,
    pub repo_url: String,
    /// Shown in New York local time.
    pub updated_at: DateTime<Utc>,
}

pub fn source_label(quantum: bool) -> &'static str {
    if quantum { "Quantum" } else { "Pseudo" }
}

/// Page title, also used as the Gist description.
pub fn title(quantum: bool) -> String {
    format!(
        "Mindscape AMA Questions in {} Random Order",
        source_label(quantum)
    )
}

/// Renders the full markdown page.
pub fn render_markdown(ordered: &OrderedQuestions, opts: &RenderOptions) -> String {
    let label = source_label(opts.quantum);
    let header = format!("{label} Random Number (Binary)");

    let rows: Vec<(String, String)> = ordered
        .ranked
        .iter()
        .map(|r| {
            let q = &r.question;
            let text = format!("**{}** says: {}", q.author.trim(), q.text);
            (to_binary(r.value, opts.bits), escape_cell(&text))
        })
        .collect();

    // backticks add two chars to every value cell
    let width = rows
        .iter()
        .map(|(bin, _)| bin.len() + 2)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", title(opts.quantum));
    out.push_str(&intro(ordered.len(), &opts.post_url, &opts.repo_url));
    let _ = writeln!(
        out,
        "Last updated on {}.\n",
        opts.updated_at
            .with_timezone(&New_York)
            .format("%Y-%m-%d at %H:%M %Z")
    );
    if !opts.quantum {
        out.push_str("Note: this data was generated using pseudo-random numbers for testing.\n\n");
    }

    let _ = writeln!(out, "| {header:<width$} | Question |");
    let _ = writeln!(out, "|{}|----------|", "-".repeat(width + 2));
    for (bin, text) in &rows {
        let cell = format!("`{bin}`");
        let _ = writeln!(out, "| {cell:<width$} | {text} |");
    }
    out
}

fn intro(count: usize, post_url: &str, repo_url: &str) -> String {
    format!(
        "If Everettian quantum mechanics is right, every ordering of this list \
exists in some branch of the multiverse. Answering the first question that was \
not already planned means every question gets answered somewhere.\n\n\
The table below lists [all {count} questions submitted for this AMA]({post_url}), \
sorted by random numbers from the [ANU QRNG service](https://qrng.anu.edu.au). \
Values are cached per question, so the order of existing questions is stable.\n\n\
This list will be [updated]({repo_url}) periodically as new questions are \
[posted to Patreon]({post_url}).\n\n"
    )
}

/// Keeps a table cell on one line and its pipes literal.
fn escape_cell(s: &str) -> String {
    s.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('|', "\\|")
}
