//! Interactive selection for the query command.
//!
//! Presents the curated entries with dialoguer and honors the pre-selection
//! computed by the curation pipeline. Single-choice styles use a `Select`,
//! multi-choice styles a `MultiSelect`.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{MultiSelect, Select, theme::ColorfulTheme};

use repolens_core::query::{CuratedResult, submission_of};
use repolens_core::types::ResultEntry;

/// Interactive picker over one curated result.
pub struct SelectionFlow<'a, W: Write = io::Stdout> {
    result: &'a CuratedResult,
    /// Several entries may be picked
    multi: bool,
    /// Output writer (for testing)
    writer: W,
    theme: ColorfulTheme,
}

impl<'a> SelectionFlow<'a, io::Stdout> {
    pub fn new(result: &'a CuratedResult, multi: bool) -> Self {
        Self {
            result,
            multi,
            writer: io::stdout(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl<'a, W: Write> SelectionFlow<'a, W> {
    #[cfg(test)]
    pub fn with_writer(result: &'a CuratedResult, multi: bool, writer: W) -> Self {
        Self {
            result,
            multi,
            writer,
            theme: ColorfulTheme::default(),
        }
    }

    /// Prompt for a choice and return the submission string of the picked
    /// entries. `None` when there is nothing to choose from.
    pub fn choose(&mut self) -> Result<Option<String>> {
        self.print_header()?;

        let entries = &self.result.entries;
        if entries.is_empty() {
            writeln!(self.writer, "  {}", style("No entries to choose from").yellow())?;
            return Ok(None);
        }

        let labels = labels(entries);
        let picked: Vec<usize> = if self.multi {
            MultiSelect::with_theme(&self.theme)
                .with_prompt("Select entries (space to toggle, enter to confirm)")
                .items(&labels)
                .defaults(&preselected(entries))
                .interact()?
        } else {
            let selection = Select::with_theme(&self.theme)
                .with_prompt("Select an entry")
                .items(&labels)
                .default(default_index(entries))
                .interact()?;
            vec![selection]
        };

        Ok(Some(submission_of(picked.into_iter().map(|i| &entries[i]))))
    }

    fn print_header(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{}",
            style(format!("  {} entries", self.result.entries.len()))
                .bold()
                .cyan()
        )?;
        if self.result.error_occurred {
            writeln!(
                self.writer,
                "  {}",
                style("The query failed, check the log output").red()
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

fn labels(entries: &[ResultEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| format!("{}  {}", entry.key(), style(entry.value()).dim()))
        .collect()
}

/// Toggle state per entry for a multi-choice prompt.
fn preselected(entries: &[ResultEntry]) -> Vec<bool> {
    entries.iter().map(ResultEntry::is_selected).collect()
}

/// Cursor position for a single-choice prompt: the first pre-selected entry.
fn default_index(entries: &[ResultEntry]) -> usize {
    entries
        .iter()
        .position(ResultEntry::is_selected)
        .unwrap_or(0)
}
