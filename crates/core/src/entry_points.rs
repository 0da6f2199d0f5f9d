//! Vendor entry-point analysis.
//!
//! A fixed set of onboarding questions reveals whether a couple arrived
//! with a vendor already booked (the question's `booked_response` code
//! present in their answer). This module computes per-question booking
//! metrics and the exact partition of weddings by which *subset* of the
//! selected questions they satisfy.
//!
//! The partition step classifies each wedding into its booked-subset
//! bucket in O(weddings x questions); subsets that no wedding exhibits
//! are never materialized, so the work never approaches 2^N.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::phases::OnboardingPhase;
use crate::stats::rate;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Question catalog
// ---------------------------------------------------------------------------

/// An onboarding question that signals a vendor/service booking.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntryPointQuestion {
    pub id: &'static str,
    pub label: &'static str,
    pub phase: OnboardingPhase,
    /// The response code that means "already have it" or "want it".
    pub booked_response: &'static str,
}

/// Every question eligible for entry-point analysis.
pub const AVAILABLE_ENTRY_POINT_QUESTIONS: [EntryPointQuestion; 25] = [
    // -- ceremony phase --
    EntryPointQuestion {
        id: "ceremony_venue_booked",
        label: "Ceremony venue",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "civil_paperwork_done",
        label: "Civil paperwork",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "canonical_paperwork_done",
        label: "Canonical paperwork",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "master_of_ceremony_needed",
        label: "Master of ceremonies",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "ceremony_readings_needed",
        label: "Ceremony readings",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "unity_coins_needed",
        label: "Unity coins",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "ceremony_music_needed",
        label: "Ceremony music",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "ring_exchange_needed",
        label: "Ring exchange",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "vow_exchange_needed",
        label: "Vow exchange",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "petal_toss_needed",
        label: "Rice & petal toss",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "witnesses_needed",
        label: "Witnesses",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "maid_of_honor_needed",
        label: "Maid of honor",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "car_rental_needed",
        label: "Wedding car",
        phase: OnboardingPhase::Ceremony,
        booked_response: "yes",
    },
    // -- celebration phase --
    EntryPointQuestion {
        id: "venue_search_started",
        label: "Reception venue",
        phase: OnboardingPhase::Celebration,
        booked_response: "already_booked",
    },
    EntryPointQuestion {
        id: "wedding_planner_needed",
        label: "Wedding planner",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "photographer_booked",
        label: "Photographer",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "prenup_agreement",
        label: "Prenuptial agreement",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "security_staff_needed",
        label: "Security staff",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "photobooth_needed",
        label: "Photobooth",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "fireworks_needed",
        label: "Fireworks",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "live_band_needed",
        label: "Live band",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "dj_needed",
        label: "DJ",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "dance_instructor_needed",
        label: "Dance instructor",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "cake_bakery_needed",
        label: "Wedding cake",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
    EntryPointQuestion {
        id: "open_bar",
        label: "Open bar",
        phase: OnboardingPhase::Celebration,
        booked_response: "yes",
    },
];

/// Questions analyzed when the caller does not pick any.
pub const DEFAULT_ENTRY_POINT_QUESTION_IDS: [&str; 3] = [
    "ceremony_venue_booked",
    "venue_search_started",
    "photographer_booked",
];

/// Resolve ids against the catalog, keeping catalog order and silently
/// dropping unknown ids.
pub fn questions_by_ids(ids: &[String]) -> Vec<&'static EntryPointQuestion> {
    AVAILABLE_ENTRY_POINT_QUESTIONS
        .iter()
        .filter(|q| ids.iter().any(|id| id == q.id))
        .collect()
}

pub fn question_by_id(id: &str) -> Option<&'static EntryPointQuestion> {
    AVAILABLE_ENTRY_POINT_QUESTIONS.iter().find(|q| q.id == id)
}

/// The default question selection.
pub fn default_questions() -> Vec<&'static EntryPointQuestion> {
    AVAILABLE_ENTRY_POINT_QUESTIONS
        .iter()
        .filter(|q| DEFAULT_ENTRY_POINT_QUESTION_IDS.contains(&q.id))
        .collect()
}

// ---------------------------------------------------------------------------
// Answer lookup structure
// ---------------------------------------------------------------------------

/// A wedding's answers: question id -> selected response codes.
pub type AnswerMap = HashMap<String, Vec<String>>;

/// Answers for all weddings under analysis, keyed by wedding id.
pub type WeddingAnswers = HashMap<DbId, AnswerMap>;

/// Whether a wedding's answers satisfy a question's booked condition.
fn is_booked(question: &EntryPointQuestion, answers: Option<&AnswerMap>) -> bool {
    answers
        .and_then(|map| map.get(question.id))
        .is_some_and(|responses| responses.iter().any(|r| r == question.booked_response))
}

// ---------------------------------------------------------------------------
// Per-question metrics
// ---------------------------------------------------------------------------

/// Booking metrics for one question.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionMetric {
    pub question_id: String,
    pub label: String,
    pub has_booked: i64,
    pub has_booked_rate: f64,
    /// Response-code frequency histogram, including a synthetic
    /// `no_answer` bucket for weddings that never answered.
    pub responses: BTreeMap<String, i64>,
}

impl QuestionMetric {
    pub fn zero(question: &EntryPointQuestion) -> Self {
        Self {
            question_id: question.id.to_string(),
            label: question.label.to_string(),
            has_booked: 0,
            has_booked_rate: 0.0,
            responses: BTreeMap::new(),
        }
    }
}

/// Compute booking count and response histogram for one question over
/// the weddings in scope.
pub fn question_metric(
    question: &EntryPointQuestion,
    wedding_ids: &[DbId],
    answers: &WeddingAnswers,
) -> QuestionMetric {
    let mut responses: BTreeMap<String, i64> = BTreeMap::new();
    let mut has_booked = 0i64;

    for wedding_id in wedding_ids {
        let selected = answers
            .get(wedding_id)
            .and_then(|map| map.get(question.id))
            .filter(|r| !r.is_empty());

        match selected {
            Some(codes) => {
                for code in codes {
                    *responses.entry(code.clone()).or_insert(0) += 1;
                }
                if codes.iter().any(|c| c == question.booked_response) {
                    has_booked += 1;
                }
            }
            None => {
                *responses.entry("no_answer".to_string()).or_insert(0) += 1;
            }
        }
    }

    QuestionMetric {
        question_id: question.id.to_string(),
        label: question.label.to_string(),
        has_booked,
        has_booked_rate: rate(has_booked, wedding_ids.len() as i64),
        responses,
    }
}

// ---------------------------------------------------------------------------
// Combination partition
// ---------------------------------------------------------------------------

/// One bucket of the booked-subset partition.
#[derive(Debug, Clone, Serialize)]
pub struct CombinationMetric {
    /// Sorted question ids forming this subset.
    pub combination: Vec<String>,
    pub count: i64,
    pub percentage: f64,
    pub label: String,
}

/// Full entry-point analysis for a wedding population.
#[derive(Debug, Clone, Serialize)]
pub struct EntryPointsData {
    pub total_weddings: i64,
    pub by_question: BTreeMap<String, QuestionMetric>,
    pub combinations: Vec<CombinationMetric>,
}

/// Result of a custom all-of combination query.
#[derive(Debug, Clone, Serialize)]
pub struct CustomCombination {
    pub selected_questions: Vec<String>,
    pub matching_weddings: i64,
    pub percentage: f64,
    pub total_weddings: i64,
}

/// The sorted subset of question ids a wedding has booked.
fn booked_subset(questions: &[&EntryPointQuestion], answers: Option<&AnswerMap>) -> Vec<String> {
    let mut booked: Vec<String> = questions
        .iter()
        .filter(|q| is_booked(q, answers))
        .map(|q| q.id.to_string())
        .collect();
    booked.sort();
    booked
}

/// Partition weddings by their exact booked subset.
///
/// Every wedding lands in exactly one bucket, so the returned counts sum
/// to `wedding_ids.len()`. Buckets are ordered by count descending, with
/// the lexicographically smaller subset key first on ties (stable sort
/// over the BTreeMap's key order, which keeps the output deterministic
/// for identical inputs).
pub fn combination_metrics(
    questions: &[&EntryPointQuestion],
    wedding_ids: &[DbId],
    answers: &WeddingAnswers,
) -> Vec<CombinationMetric> {
    let total = wedding_ids.len() as i64;
    let mut buckets: BTreeMap<Vec<String>, i64> = BTreeMap::new();

    for wedding_id in wedding_ids {
        let subset = booked_subset(questions, answers.get(wedding_id));
        *buckets.entry(subset).or_insert(0) += 1;
    }

    let mut combinations: Vec<CombinationMetric> = buckets
        .into_iter()
        .map(|(combination, count)| {
            let label = combination_label(&combination, questions);
            CombinationMetric {
                combination,
                count,
                percentage: rate(count, total),
                label,
            }
        })
        .collect();

    combinations.sort_by(|a, b| b.count.cmp(&a.count));
    combinations
}

/// Human-readable label for a booked subset.
pub fn combination_label(combination: &[String], questions: &[&EntryPointQuestion]) -> String {
    if combination.is_empty() {
        return "No vendors booked".to_string();
    }
    if combination.len() == questions.len() {
        return format!("All vendors ({})", questions.len());
    }

    let labels: Vec<&str> = combination
        .iter()
        .map(|id| {
            questions
                .iter()
                .find(|q| q.id == id)
                .map(|q| q.label)
                .unwrap_or(id.as_str())
        })
        .collect();

    if labels.len() == 1 {
        format!("Only {}", labels[0])
    } else {
        labels.join(" + ")
    }
}

/// Count weddings whose answers satisfy *every* listed question.
pub fn count_matching_all(
    questions: &[&EntryPointQuestion],
    wedding_ids: &[DbId],
    answers: &WeddingAnswers,
) -> i64 {
    wedding_ids
        .iter()
        .filter(|&wedding_id| {
            let map = answers.get(wedding_id);
            questions.iter().all(|q| is_booked(q, map))
        })
        .count() as i64
}

/// The well-formed zero result for a range with no weddings: every
/// selected question at zero, plus the empty-subset sentinel bucket.
pub fn empty_entry_points(questions: &[&EntryPointQuestion]) -> EntryPointsData {
    let by_question = questions
        .iter()
        .map(|q| (q.id.to_string(), QuestionMetric::zero(q)))
        .collect();

    EntryPointsData {
        total_weddings: 0,
        by_question,
        combinations: vec![CombinationMetric {
            combination: Vec::new(),
            count: 0,
            percentage: 0.0,
            label: "No vendors booked".to_string(),
        }],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: &str) -> &'static EntryPointQuestion {
        question_by_id(id).expect("question in catalog")
    }

    fn answer(wedding: DbId, question: &str, codes: &[&str]) -> (DbId, String, Vec<String>) {
        (
            wedding,
            question.to_string(),
            codes.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn answers_from(rows: Vec<(DbId, String, Vec<String>)>) -> WeddingAnswers {
        let mut map: WeddingAnswers = HashMap::new();
        for (wedding_id, question_id, codes) in rows {
            map.entry(wedding_id).or_default().insert(question_id, codes);
        }
        map
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in AVAILABLE_ENTRY_POINT_QUESTIONS.iter().enumerate() {
            for b in &AVAILABLE_ENTRY_POINT_QUESTIONS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn default_questions_resolve() {
        let ids: Vec<String> = DEFAULT_ENTRY_POINT_QUESTION_IDS
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(questions_by_ids(&ids).len(), 3);
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let ids = vec!["photographer_booked".to_string(), "bouncy_castle".to_string()];
        let questions = questions_by_ids(&ids);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "photographer_booked");
    }

    #[test]
    fn question_metric_counts_bookings_and_histogram() {
        let question = q("photographer_booked");
        let weddings = vec![1, 2, 3];
        let answers = answers_from(vec![
            answer(1, "photographer_booked", &["yes"]),
            answer(2, "photographer_booked", &["no", "maybe_later"]),
        ]);

        let metric = question_metric(question, &weddings, &answers);
        assert_eq!(metric.has_booked, 1);
        assert_eq!(metric.has_booked_rate, 33.33);
        assert_eq!(metric.responses.get("yes"), Some(&1));
        assert_eq!(metric.responses.get("no"), Some(&1));
        assert_eq!(metric.responses.get("maybe_later"), Some(&1));
        // Wedding 3 never answered.
        assert_eq!(metric.responses.get("no_answer"), Some(&1));
    }

    #[test]
    fn question_metric_empty_answer_counts_as_no_answer() {
        let question = q("photographer_booked");
        let answers = answers_from(vec![answer(1, "photographer_booked", &[])]);
        let metric = question_metric(question, &[1], &answers);
        assert_eq!(metric.has_booked, 0);
        assert_eq!(metric.responses.get("no_answer"), Some(&1));
    }

    #[test]
    fn combinations_partition_ten_weddings() {
        // 3 booked both, 2 booked only the ceremony venue, 5 booked
        // neither: buckets 3/2/5 summing to 10.
        let questions = vec![q("ceremony_venue_booked"), q("photographer_booked")];
        let weddings: Vec<DbId> = (1..=10).collect();
        let mut rows = Vec::new();
        for w in 1..=3 {
            rows.push(answer(w, "ceremony_venue_booked", &["yes"]));
            rows.push(answer(w, "photographer_booked", &["yes"]));
        }
        for w in 4..=5 {
            rows.push(answer(w, "ceremony_venue_booked", &["yes"]));
            rows.push(answer(w, "photographer_booked", &["no"]));
        }
        let answers = answers_from(rows);

        let combos = combination_metrics(&questions, &weddings, &answers);
        assert_eq!(combos.len(), 3);

        assert_eq!(combos[0].combination, Vec::<String>::new());
        assert_eq!(combos[0].count, 5);
        assert_eq!(combos[0].percentage, 50.0);

        assert_eq!(
            combos[1].combination,
            vec!["ceremony_venue_booked", "photographer_booked"]
        );
        assert_eq!(combos[1].count, 3);
        assert_eq!(combos[1].percentage, 30.0);

        assert_eq!(combos[2].combination, vec!["ceremony_venue_booked"]);
        assert_eq!(combos[2].count, 2);
        assert_eq!(combos[2].percentage, 20.0);

        let total: i64 = combos.iter().map(|c| c.count).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn combinations_counts_always_sum_to_total() {
        let questions = vec![
            q("ceremony_venue_booked"),
            q("venue_search_started"),
            q("photographer_booked"),
        ];
        let weddings: Vec<DbId> = (1..=7).collect();
        let answers = answers_from(vec![
            answer(1, "ceremony_venue_booked", &["yes"]),
            answer(2, "venue_search_started", &["already_booked"]),
            answer(3, "venue_search_started", &["searching"]),
            answer(4, "photographer_booked", &["yes"]),
            answer(4, "ceremony_venue_booked", &["yes"]),
            answer(5, "photographer_booked", &["yes"]),
            answer(5, "ceremony_venue_booked", &["yes"]),
            answer(5, "venue_search_started", &["already_booked"]),
        ]);

        let combos = combination_metrics(&questions, &weddings, &answers);
        let total: i64 = combos.iter().map(|c| c.count).sum();
        assert_eq!(total, 7);
        for combo in &combos {
            assert!((0.0..=100.0).contains(&combo.percentage));
        }
    }

    #[test]
    fn combination_labels() {
        let questions = vec![q("ceremony_venue_booked"), q("photographer_booked")];

        assert_eq!(combination_label(&[], &questions), "No vendors booked");
        assert_eq!(
            combination_label(
                &[
                    "ceremony_venue_booked".to_string(),
                    "photographer_booked".to_string()
                ],
                &questions
            ),
            "All vendors (2)"
        );
        assert_eq!(
            combination_label(&["photographer_booked".to_string()], &questions),
            "Only Photographer"
        );

        let three = vec![
            q("ceremony_venue_booked"),
            q("photographer_booked"),
            q("dj_needed"),
        ];
        assert_eq!(
            combination_label(
                &[
                    "ceremony_venue_booked".to_string(),
                    "photographer_booked".to_string()
                ],
                &three
            ),
            "Ceremony venue + Photographer"
        );
    }

    #[test]
    fn custom_combination_requires_every_question() {
        // 10 weddings, only 4 booked all three.
        let questions = vec![
            q("ceremony_venue_booked"),
            q("venue_search_started"),
            q("photographer_booked"),
        ];
        let weddings: Vec<DbId> = (1..=10).collect();
        let mut rows = Vec::new();
        for w in 1..=4 {
            rows.push(answer(w, "ceremony_venue_booked", &["yes"]));
            rows.push(answer(w, "venue_search_started", &["already_booked"]));
            rows.push(answer(w, "photographer_booked", &["yes"]));
        }
        // Wedding 5 misses one of the three.
        rows.push(answer(5, "ceremony_venue_booked", &["yes"]));
        rows.push(answer(5, "photographer_booked", &["yes"]));
        let answers = answers_from(rows);

        let matching = count_matching_all(&questions, &weddings, &answers);
        assert_eq!(matching, 4);
        assert_eq!(rate(matching, 10), 40.0);
    }

    #[test]
    fn empty_result_shape() {
        let questions = questions_by_ids(
            &DEFAULT_ENTRY_POINT_QUESTION_IDS
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        );
        let data = empty_entry_points(&questions);
        assert_eq!(data.total_weddings, 0);
        assert_eq!(data.by_question.len(), 3);
        assert!(data.by_question.values().all(|m| m.has_booked == 0));
        assert_eq!(data.combinations.len(), 1);
        assert_eq!(data.combinations[0].label, "No vendors booked");
    }

    #[test]
    fn booked_response_is_question_specific() {
        // The reception-venue question books on "already_booked", not "yes".
        let question = q("venue_search_started");
        let answers = answers_from(vec![answer(1, "venue_search_started", &["yes"])]);
        let metric = question_metric(question, &[1], &answers);
        assert_eq!(metric.has_booked, 0);

        let answers = answers_from(vec![answer(1, "venue_search_started", &["already_booked"])]);
        let metric = question_metric(question, &[1], &answers);
        assert_eq!(metric.has_booked, 1);
    }
}
