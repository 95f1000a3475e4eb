//! Aggregate counting and the final text report.
//!
//! Counting preserves insertion order: itemized report lines follow the
//! order labels were first seen, and `most_common` breaks ties in favor of
//! the earliest label. Both behaviors are part of the report contract.

use crate::aggregates::RunAggregates;
use crate::Result;
use std::fmt::Write as _;
use std::path::Path;

/// An insertion-ordered label counter
#[derive(Debug, Default)]
pub struct Tally {
    entries: Vec<(&'static str, u64)>,
}

impl Tally {
    /// Build a tally from a label sequence
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        let mut tally = Self::default();
        for label in labels {
            tally.add(label);
        }
        tally
    }

    /// Count one occurrence of a label
    pub fn add(&mut self, label: &'static str) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((label, 1)),
        }
    }

    /// Iterate labels and counts, in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.entries.iter().copied()
    }

    /// The label with the highest count.
    ///
    /// Ties go to the label seen first.
    pub fn most_common(&self) -> Option<(&'static str, u64)> {
        let mut best: Option<(&'static str, u64)> = None;
        for &(label, count) in &self.entries {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((label, count)),
            }
        }
        best
    }

    /// Whether no labels were counted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render the fixed-format run report
pub fn render_summary(aggregates: &RunAggregates) -> String {
    let activity_tally = Tally::from_labels(aggregates.activities().iter().map(|a| a.as_str()));
    let emotion_tally = Tally::from_labels(aggregates.emotions().iter().map(|e| e.as_str()));

    let mut report = String::new();
    report.push_str("Resumo do vídeo:\n\n");
    let _ = writeln!(report, "Total de frames analisados: {}", aggregates.total_frames());
    let _ = writeln!(report, "Número de anomalias detectadas: {}\n", aggregates.anomaly_count());

    report.push_str("Atividades detectadas:\n");
    for (activity, count) in activity_tally.iter() {
        let _ = writeln!(report, "- {activity}: detectado {count} vezes");
    }

    report.push_str("\nEmoções predominantes:\n");
    for (emotion, count) in emotion_tally.iter() {
        let _ = writeln!(report, "- {emotion}: detectado {count} vezes");
    }

    report.push_str("\nAnálise geral:\n");
    if let Some((activity, count)) = activity_tally.most_common() {
        let _ = writeln!(
            report,
            "A atividade mais frequente no vídeo foi '{activity}', ocorrendo aproximadamente {count} vezes."
        );
    }
    if let Some((emotion, count)) = emotion_tally.most_common() {
        let _ = writeln!(
            report,
            "A emoção predominante foi '{emotion}', aparecendo em aproximadamente {count} quadros."
        );
    }

    report
}

/// Render and write the run report to a file
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_summary<P: AsRef<Path>>(path: P, aggregates: &RunAggregates) -> Result<()> {
    std::fs::write(path, render_summary(aggregates))?;
    Ok(())
}
