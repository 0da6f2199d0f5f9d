//! Onboarding funnel, completion-time, and drop-off aggregation.

use std::collections::HashMap;

use futures::future;
use sqlx::{FromRow, PgPool};

use altar_core::funnel::{build_onboarding_funnel, top_drop_off_questions, DropOffsResult, FunnelStage};
use altar_core::phases::OnboardingPhase;
use altar_core::stats::{DurationSummary, PhaseTimeAnalysis, TimeAnalysis};
use altar_core::types::{DateRange, DbId, Timestamp};

/// Count onboarding sessions created inside the range.
pub(crate) async fn count_sessions(pool: &PgPool, range: &DateRange) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM onboarding_sessions \
         WHERE created_at >= $1 AND created_at <= $2",
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_one(pool)
    .await
}

/// Count sessions created inside the range whose `completed_phases`
/// contains the given phase.
pub(crate) async fn count_sessions_with_phase(
    pool: &PgPool,
    range: &DateRange,
    phase: OnboardingPhase,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM onboarding_sessions \
         WHERE created_at >= $1 AND created_at <= $2 \
           AND completed_phases @> $3",
    )
    .bind(range.start)
    .bind(range.end)
    .bind(vec![phase.code().to_string()])
    .fetch_one(pool)
    .await
}

/// Count sessions created in the range per phase, in phase order.
///
/// The five counts have no data dependency on each other, so they run
/// concurrently.
pub(crate) async fn phase_completion_counts(
    pool: &PgPool,
    range: &DateRange,
) -> Result<[i64; 5], sqlx::Error> {
    let counts = future::try_join_all(
        OnboardingPhase::ALL
            .iter()
            .map(|phase| count_sessions_with_phase(pool, range, *phase)),
    )
    .await?;

    let mut result = [0i64; 5];
    result.copy_from_slice(&counts);
    Ok(result)
}

#[derive(Debug, FromRow)]
struct SessionTimesRow {
    created_at: Timestamp,
    completed_at: Timestamp,
}

#[derive(Debug, FromRow)]
struct PhaseAnswerRow {
    wedding_id: DbId,
    phase: String,
    answered_at: Timestamp,
}

#[derive(Debug, FromRow)]
struct LastAnswerRow {
    wedding_id: DbId,
    question_id: String,
}

/// Provides onboarding funnel, time analysis, and drop-off aggregation.
pub struct OnboardingAnalyticsRepo;

impl OnboardingAnalyticsRepo {
    /// The six-stage onboarding funnel for sessions created in range.
    pub async fn funnel(pool: &PgPool, range: &DateRange) -> Result<Vec<FunnelStage>, sqlx::Error> {
        let total = count_sessions(pool, range).await?;
        let phase_counts = phase_completion_counts(pool, range).await?;
        Ok(build_onboarding_funnel(total, phase_counts))
    }

    /// Completion-time statistics for sessions created in range, with
    /// the per-phase breakdown derived from answer timestamps.
    pub async fn time_analysis(pool: &PgPool, range: &DateRange) -> Result<TimeAnalysis, sqlx::Error> {
        let rows = sqlx::query_as::<_, SessionTimesRow>(
            "SELECT created_at, completed_at FROM onboarding_sessions \
             WHERE completed_at IS NOT NULL \
               AND created_at >= $1 AND created_at <= $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        let durations: Vec<i64> = rows
            .iter()
            .map(|row| (row.completed_at - row.created_at).num_seconds())
            .collect();
        let overall = DurationSummary::from_secs(&durations);

        // No valid sample in range: skip the per-phase query entirely.
        if overall.sample_size == 0 {
            return Ok(TimeAnalysis::zero());
        }

        let by_phase = Self::phase_time_analysis(pool, range).await?;
        Ok(TimeAnalysis::new(overall, by_phase))
    }

    /// Per-phase time spent, measured per wedding as the span between
    /// its first and last answer in that phase.
    async fn phase_time_analysis(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<Vec<PhaseTimeAnalysis>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PhaseAnswerRow>(
            "SELECT wedding_id, phase, answered_at FROM question_answers \
             WHERE deleted_at IS NULL \
               AND answered_at >= $1 AND answered_at <= $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // phase -> wedding -> answer timestamps
        let mut grouped: HashMap<OnboardingPhase, HashMap<DbId, Vec<Timestamp>>> = HashMap::new();
        for row in rows {
            let Some(phase) = OnboardingPhase::from_code(&row.phase) else {
                continue;
            };
            grouped
                .entry(phase)
                .or_default()
                .entry(row.wedding_id)
                .or_default()
                .push(row.answered_at);
        }

        let result = OnboardingPhase::ALL
            .iter()
            .map(|phase| {
                let durations: Vec<i64> = grouped
                    .get(phase)
                    .map(|weddings| {
                        weddings
                            .values()
                            .filter(|stamps| stamps.len() >= 2)
                            .map(|stamps| {
                                let min = stamps.iter().min().copied().unwrap_or_default();
                                let max = stamps.iter().max().copied().unwrap_or_default();
                                (max - min).num_seconds()
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                PhaseTimeAnalysis::from_summary(*phase, DurationSummary::from_secs(&durations))
            })
            .collect();

        Ok(result)
    }

    /// Where abandoned sessions stalled: the top questions last answered
    /// before giving up.
    pub async fn drop_offs(pool: &PgPool, range: &DateRange) -> Result<DropOffsResult, sqlx::Error> {
        let total_started = count_sessions(pool, range).await?;

        let abandoned_weddings = sqlx::query_scalar::<_, DbId>(
            "SELECT wedding_id FROM onboarding_sessions \
             WHERE completed_at IS NULL \
               AND created_at >= $1 AND created_at <= $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        let total_drop_offs = abandoned_weddings.len() as i64;
        if total_drop_offs == 0 {
            return Ok(DropOffsResult::empty(total_started));
        }

        let answers = sqlx::query_as::<_, LastAnswerRow>(
            "SELECT wedding_id, question_id FROM question_answers \
             WHERE wedding_id = ANY($1) AND deleted_at IS NULL \
             ORDER BY answered_at DESC",
        )
        .bind(&abandoned_weddings)
        .fetch_all(pool)
        .await?;

        // Rows are newest-first: the first row seen per wedding is its
        // last answered question.
        let mut last_question: HashMap<DbId, String> = HashMap::new();
        for answer in answers {
            last_question.entry(answer.wedding_id).or_insert(answer.question_id);
        }

        let top_questions = top_drop_off_questions(last_question.into_values(), total_drop_offs);
        Ok(DropOffsResult {
            top_questions,
            total_drop_offs,
            total_started,
        })
    }
}
