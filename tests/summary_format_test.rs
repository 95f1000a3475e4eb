//! Tests for the fixed-format text report.

use video_activity_analyzer::activity::Activity;
use video_activity_analyzer::aggregates::RunAggregates;
use video_activity_analyzer::detect::Emotion;
use video_activity_analyzer::summary::{render_summary, write_summary};

fn populated_aggregates() -> RunAggregates {
    let mut aggregates = RunAggregates::new();
    for _ in 0..10 {
        aggregates.record_frame();
    }
    aggregates.record_anomaly();
    aggregates.record_anomaly();

    // First occurrences only: repeats are dropped by the aggregates
    aggregates.record_activity(Activity::Reading);
    aggregates.record_activity(Activity::Dancing);
    aggregates.record_activity(Activity::Reading);

    aggregates.record_emotions(&[Emotion::Happy]);
    aggregates.record_emotions(&[Emotion::Happy, Emotion::Sad]);
    aggregates
}

#[test]
fn full_report_layout() {
    let report = render_summary(&populated_aggregates());

    let expected = "Resumo do vídeo:\n\
                    \n\
                    Total de frames analisados: 10\n\
                    Número de anomalias detectadas: 2\n\
                    \n\
                    Atividades detectadas:\n\
                    - Pessoa lendo: detectado 1 vezes\n\
                    - Pessoa dançando: detectado 1 vezes\n\
                    \n\
                    Emoções predominantes:\n\
                    - happy: detectado 2 vezes\n\
                    - sad: detectado 1 vezes\n\
                    \n\
                    Análise geral:\n\
                    A atividade mais frequente no vídeo foi 'Pessoa lendo', ocorrendo aproximadamente 1 vezes.\n\
                    A emoção predominante foi 'happy', aparecendo em aproximadamente 2 quadros.\n";

    assert_eq!(report, expected);
}

#[test]
fn activity_counts_sum_to_distinct_activities() {
    // Only first occurrences are recorded, so per-activity counts are all 1
    // and their sum equals the number of distinct activities observed.
    let aggregates = populated_aggregates();
    let report = render_summary(&aggregates);

    let counted: usize = report
        .lines()
        .filter(|line| line.starts_with("- Pessoa"))
        .count();
    assert_eq!(counted, aggregates.activities().len());
    assert!(report.contains("- Pessoa lendo: detectado 1 vezes"));
    assert!(report.contains("- Pessoa dançando: detectado 1 vezes"));
}

#[test]
fn most_common_activity_tie_goes_to_first_seen() {
    // Both activities have count 1; the first recorded wins the tie
    let report = render_summary(&populated_aggregates());
    assert!(report.contains("A atividade mais frequente no vídeo foi 'Pessoa lendo'"));
}

#[test]
fn empty_emotions_omit_the_emotion_sentence() {
    let mut aggregates = RunAggregates::new();
    aggregates.record_frame();
    aggregates.record_activity(Activity::Waving);

    let report = render_summary(&aggregates);

    // The section header always prints; the closing sentence does not
    assert!(report.contains("Emoções predominantes:\n"));
    assert!(!report.contains("A emoção predominante"));
    assert!(report.contains("A atividade mais frequente"));
}

#[test]
fn empty_run_omits_both_sentences() {
    let aggregates = RunAggregates::new();
    let report = render_summary(&aggregates);

    assert!(report.starts_with("Resumo do vídeo:\n\n"));
    assert!(report.contains("Total de frames analisados: 0\n"));
    assert!(report.contains("Número de anomalias detectadas: 0\n"));
    assert!(report.contains("Atividades detectadas:\n"));
    assert!(report.contains("Emoções predominantes:\n"));
    assert!(report.ends_with("Análise geral:\n"));
    assert!(!report.contains("A atividade mais frequente"));
    assert!(!report.contains("A emoção predominante"));
}

#[test]
fn summary_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("video_summary.txt");

    let aggregates = populated_aggregates();
    write_summary(&path, &aggregates).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, render_summary(&aggregates));
}
