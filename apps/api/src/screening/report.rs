//! Report Aggregator — pure ordering of a candidate's criterion scores.

use serde::{Deserialize, Serialize};

use crate::screening::scorer::ScoreEntry;

/// A candidate's score report. `ordered_scores` is sorted by score
/// descending; ties keep the original criterion order (stable sort).
/// Empty only when scoring produced zero entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub ordered_scores: Vec<ScoreEntry>,
}

/// Orders criterion scores descending. Stable, so equal scores keep plan order.
pub fn build_report(scores: &[ScoreEntry]) -> Report {
    let mut ordered = scores.to_vec();
    ordered.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Report {
        ordered_scores: ordered,
    }
}

/// The candidate's headline score: top ordered score, or 0 with no entries.
pub fn summary_score(report: &Report) -> f32 {
    report
        .ordered_scores
        .first()
        .map(|e| e.score)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(criterion: &str, score: f32) -> ScoreEntry {
        ScoreEntry {
            criterion: criterion.to_string(),
            score,
            reasoning: format!("evidence for {criterion}"),
            unavailable: false,
        }
    }

    #[test]
    fn test_report_sorted_descending() {
        let report = build_report(&[
            make_entry("a", 40.0),
            make_entry("b", 90.0),
            make_entry("c", 70.0),
        ]);
        let scores: Vec<f32> = report.ordered_scores.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90.0, 70.0, 40.0]);
    }

    #[test]
    fn test_ties_keep_criterion_order() {
        let report = build_report(&[
            make_entry("first", 50.0),
            make_entry("second", 50.0),
            make_entry("third", 80.0),
        ]);
        assert_eq!(report.ordered_scores[0].criterion, "third");
        assert_eq!(report.ordered_scores[1].criterion, "first");
        assert_eq!(report.ordered_scores[2].criterion, "second");
    }

    #[test]
    fn test_summary_score_is_top_score() {
        let report = build_report(&[make_entry("a", 30.0), make_entry("b", 65.0)]);
        assert_eq!(summary_score(&report), 65.0);
    }

    #[test]
    fn test_summary_score_zero_for_empty_report() {
        let report = build_report(&[]);
        assert!(report.ordered_scores.is_empty());
        assert_eq!(summary_score(&report), 0.0);
    }

    #[test]
    fn test_input_order_untouched() {
        let input = vec![make_entry("a", 10.0), make_entry("b", 99.0)];
        let _ = build_report(&input);
        assert_eq!(input[0].criterion, "a", "aggregation must not mutate input");
    }
}
