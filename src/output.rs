use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, RunSummary};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(result: &RunSummary) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub fn render_summary(summary: &RunSummary) -> String {
    let mut lines = Vec::new();
    if let Some(discovered) = summary.discovered {
        lines.push(format!("discovered ids: {discovered}"));
    }
    lines.push(format!("resolved instruments: {}", summary.resolved));
    if !summary.dropped.is_empty() {
        lines.push(format!(
            "dropped ids ({}): {}",
            summary.dropped.len(),
            summary.dropped.join(", ")
        ));
    }
    lines.push(format!("ranked by total fee: {}", summary.ranked));
    for artifact in &summary.artifacts {
        lines.push(format!("  wrote {artifact}"));
    }
    lines.join("\n")
}
