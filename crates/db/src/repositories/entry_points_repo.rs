//! Vendor entry-point aggregation.
//!
//! Fetches the in-range wedding population and their answers to the
//! selected questions, then hands the combinatorial work to
//! [`altar_core::entry_points`].

use std::collections::BTreeMap;

use sqlx::{FromRow, PgPool};

use altar_core::entry_points::{
    combination_metrics, count_matching_all, empty_entry_points, question_metric,
    CustomCombination, EntryPointQuestion, EntryPointsData, WeddingAnswers,
};
use altar_core::stats::rate;
use altar_core::types::{DateRange, DbId};

#[derive(Debug, FromRow)]
struct AnswerRow {
    wedding_id: DbId,
    question_id: String,
    selected_responses: Vec<String>,
}

/// Non-archived weddings created inside the range.
async fn wedding_population(pool: &PgPool, range: &DateRange) -> Result<Vec<DbId>, sqlx::Error> {
    sqlx::query_scalar::<_, DbId>(
        "SELECT id FROM weddings \
         WHERE archived = FALSE \
           AND created_at >= $1 AND created_at <= $2",
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await
}

/// Fetch the weddings' non-deleted answers to the selected questions,
/// keyed wedding -> question -> selected response codes.
async fn answer_map(
    pool: &PgPool,
    wedding_ids: &[DbId],
    questions: &[&EntryPointQuestion],
) -> Result<WeddingAnswers, sqlx::Error> {
    let question_ids: Vec<String> = questions.iter().map(|q| q.id.to_string()).collect();

    let rows = sqlx::query_as::<_, AnswerRow>(
        "SELECT wedding_id, question_id, selected_responses FROM question_answers \
         WHERE wedding_id = ANY($1) AND question_id = ANY($2) \
           AND deleted_at IS NULL",
    )
    .bind(wedding_ids)
    .bind(question_ids)
    .fetch_all(pool)
    .await?;

    let mut answers: WeddingAnswers = WeddingAnswers::new();
    for row in rows {
        answers
            .entry(row.wedding_id)
            .or_default()
            .insert(row.question_id, row.selected_responses);
    }
    Ok(answers)
}

/// Provides entry-point booking and combination aggregation.
pub struct EntryPointsRepo;

impl EntryPointsRepo {
    /// Per-question booking metrics plus the exact booked-subset
    /// partition of the in-range weddings.
    pub async fn entry_points(
        pool: &PgPool,
        range: &DateRange,
        questions: &[&EntryPointQuestion],
    ) -> Result<EntryPointsData, sqlx::Error> {
        let wedding_ids = wedding_population(pool, range).await?;
        let total_weddings = wedding_ids.len() as i64;

        if total_weddings == 0 {
            return Ok(empty_entry_points(questions));
        }

        let answers = answer_map(pool, &wedding_ids, questions).await?;

        let by_question: BTreeMap<String, _> = questions
            .iter()
            .map(|q| (q.id.to_string(), question_metric(q, &wedding_ids, &answers)))
            .collect();

        let combinations = combination_metrics(questions, &wedding_ids, &answers);

        Ok(EntryPointsData {
            total_weddings,
            by_question,
            combinations,
        })
    }

    /// Count weddings that satisfy *every* selected question's booked
    /// condition (a membership test, not a partition).
    pub async fn custom_combination(
        pool: &PgPool,
        range: &DateRange,
        questions: &[&EntryPointQuestion],
    ) -> Result<CustomCombination, sqlx::Error> {
        let selected: Vec<String> = questions.iter().map(|q| q.id.to_string()).collect();

        let wedding_ids = wedding_population(pool, range).await?;
        let total_weddings = wedding_ids.len() as i64;

        if total_weddings == 0 || questions.is_empty() {
            return Ok(CustomCombination {
                selected_questions: selected,
                matching_weddings: 0,
                percentage: 0.0,
                total_weddings: 0,
            });
        }

        let answers = answer_map(pool, &wedding_ids, questions).await?;
        let matching = count_matching_all(questions, &wedding_ids, &answers);

        Ok(CustomCombination {
            selected_questions: selected,
            matching_weddings: matching,
            percentage: rate(matching, total_weddings),
            total_weddings,
        })
    }
}
