use std::io::{self, Write};

use scout_core::{AppViewModel, Severity, StatsSnapshot};

/// Prints view changes as plain terminal lines.
///
/// Only what changed since the previous render is written: new log entries,
/// a progress line when stats move, and the status banner on transitions.
pub struct TerminalRenderer<W: Write> {
    out: W,
    log_generation: Option<u64>,
    printed: usize,
    status_text: Option<String>,
    stats: Option<StatsSnapshot>,
    clamp_highlight: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            log_generation: None,
            printed: 0,
            status_text: None,
            stats: None,
            clamp_highlight: false,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if self.status_text.as_deref() != Some(view.status_text.as_str()) {
            writeln!(self.out, "== {} ==", view.status_text)?;
            self.status_text = Some(view.status_text.clone());
        }

        if view.clamp_highlight && !self.clamp_highlight {
            let limit = view
                .affordance
                .lock_tooltip
                .as_deref()
                .unwrap_or(view.affordance.tooltip.as_str());
            writeln!(self.out, "!! max results capped at {} ({})", view.draft_max_results, limit)?;
        }
        self.clamp_highlight = view.clamp_highlight;

        if self.log_generation != Some(view.log_generation) {
            self.log_generation = Some(view.log_generation);
            self.printed = 0;
        }
        for entry in view.log.iter().skip(self.printed) {
            writeln!(self.out, "{} {}", severity_tag(entry.severity), entry)?;
        }
        self.printed = view.log.len();

        let has_run = view.active_run.is_some() || view.last_outcome.is_some();
        if has_run && self.stats.as_ref() != Some(&view.stats) {
            writeln!(self.out, "{}", format_stats(&view.stats))?;
            self.stats = Some(view.stats.clone());
        }

        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::System => "[SYS]",
        Severity::Info => "[INF]",
        Severity::Success => "[ OK]",
        Severity::Warning => "[WRN]",
        Severity::Error => "[ERR]",
    }
}

pub fn format_stats(stats: &StatsSnapshot) -> String {
    let label = if stats.status_label.is_empty() {
        "-"
    } else {
        stats.status_label.as_str()
    };
    format!(
        "Progress {:>3}% | {} | total {} | website {} | phone {} | social {} | pixels {} | email {}",
        stats.progress_percent,
        label,
        format_with_commas(stats.total),
        format_with_commas(stats.with_website),
        format_with_commas(stats.with_phone),
        format_with_commas(stats.with_social),
        format_with_commas(stats.with_pixels),
        format_with_commas(stats.with_email),
    )
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
