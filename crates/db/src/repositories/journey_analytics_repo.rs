//! Customer-journey aggregation: the registration-cohort funnel,
//! mission milestones, and the daily event timeline.

use std::collections::{HashMap, HashSet};

use sqlx::{FromRow, PgPool};

use altar_core::funnel::{
    build_journey_funnel, build_milestones, JourneyFunnel, JourneyMilestones, MilestoneTally,
    MissionTemplate, JOURNEY_STAGE_COUNT, TUTORIAL_QUESTION_IDS,
};
use altar_core::phases::COMPLETION_PHASE;
use altar_core::stats::days_to_complete;
use altar_core::timeline::{build_timeline, JourneyTimeline};
use altar_core::types::{DateRange, DbId, Timestamp};

use crate::models::mission::MISSION_STATUS_COMPLETED;

#[derive(Debug, FromRow)]
struct SessionPhasesRow {
    wedding_id: DbId,
    completed_phases: Vec<String>,
}

#[derive(Debug, FromRow)]
struct CompletedMissionRow {
    template_id: String,
    wedding_id: DbId,
}

#[derive(Debug, FromRow)]
struct MissionTimingRow {
    template_id: String,
    status: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

fn tutorial_question_ids() -> Vec<String> {
    TUTORIAL_QUESTION_IDS.iter().map(|id| id.to_string()).collect()
}

fn mission_template_ids() -> Vec<String> {
    MissionTemplate::ALL
        .iter()
        .map(|t| t.template_id().to_string())
        .collect()
}

/// Provides journey funnel, milestone, and timeline aggregation.
pub struct JourneyAnalyticsRepo;

impl JourneyAnalyticsRepo {
    /// Track the cohort of users registered in range through the seven
    /// journey milestones.
    ///
    /// Each stage's query set depends on the previous stage's result
    /// set, so the steps run sequentially by necessity. The one
    /// exception: mission stages draw on all cohort weddings, not the
    /// tutorial survivors.
    pub async fn funnel(pool: &PgPool, range: &DateRange) -> Result<JourneyFunnel, sqlx::Error> {
        // Stage 1: the registration cohort.
        let cohort = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM users WHERE created_at >= $1 AND created_at <= $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        let registered = cohort.len() as i64;
        if registered == 0 {
            return Ok(JourneyFunnel::empty());
        }

        // Stage 2: weddings created by the cohort. Deliberately no date
        // filter -- a wedding created after the window still counts.
        let cohort_weddings = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM weddings WHERE primary_user_id = ANY($1)",
        )
        .bind(&cohort)
        .fetch_all(pool)
        .await?;

        let weddings_created = cohort_weddings.len() as i64;
        if weddings_created == 0 {
            let mut counts = [0i64; JOURNEY_STAGE_COUNT];
            counts[0] = registered;
            return Ok(build_journey_funnel(counts));
        }

        // Stage 3: cohort weddings whose onboarding reached the
        // completion phase.
        let sessions = sqlx::query_as::<_, SessionPhasesRow>(
            "SELECT wedding_id, completed_phases FROM onboarding_sessions \
             WHERE wedding_id = ANY($1)",
        )
        .bind(&cohort_weddings)
        .fetch_all(pool)
        .await?;

        let onboarding_completed: Vec<DbId> = sessions
            .into_iter()
            .filter(|s| s.completed_phases.iter().any(|p| p == COMPLETION_PHASE.code()))
            .map(|s| s.wedding_id)
            .collect();

        // Stage 4: of those, weddings that answered a tutorial question.
        let tutorial_completed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT wedding_id) FROM question_answers \
             WHERE wedding_id = ANY($1) AND question_id = ANY($2) \
               AND deleted_at IS NULL",
        )
        .bind(&onboarding_completed)
        .bind(tutorial_question_ids())
        .fetch_one(pool)
        .await?;

        // Stages 5-7: completed missions across the full cohort.
        let missions = sqlx::query_as::<_, CompletedMissionRow>(
            "SELECT template_id, wedding_id FROM missions \
             WHERE status = $1 AND template_id = ANY($2) AND wedding_id = ANY($3)",
        )
        .bind(MISSION_STATUS_COMPLETED)
        .bind(mission_template_ids())
        .bind(&cohort_weddings)
        .fetch_all(pool)
        .await?;

        let mut per_template: HashMap<MissionTemplate, HashSet<DbId>> = HashMap::new();
        for mission in missions {
            if let Some(template) = MissionTemplate::from_template_id(&mission.template_id) {
                per_template.entry(template).or_default().insert(mission.wedding_id);
            }
        }
        let mission_count = |template: MissionTemplate| -> i64 {
            per_template.get(&template).map_or(0, |set| set.len() as i64)
        };

        Ok(build_journey_funnel([
            registered,
            weddings_created,
            onboarding_completed.len() as i64,
            tutorial_completed,
            mission_count(MissionTemplate::CeremonyVenue),
            mission_count(MissionTemplate::CelebrationVenue),
            mission_count(MissionTemplate::HirePhotographer),
        ]))
    }

    /// Mission completion rates and time-to-complete, measured against
    /// all weddings created in range.
    pub async fn milestones(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<JourneyMilestones, sqlx::Error> {
        let total_weddings = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM weddings WHERE created_at >= $1 AND created_at <= $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(pool)
        .await?;

        let missions = sqlx::query_as::<_, MissionTimingRow>(
            "SELECT template_id, status, created_at, updated_at FROM missions \
             WHERE template_id = ANY($1) \
               AND created_at >= $2 AND created_at <= $3",
        )
        .bind(mission_template_ids())
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        let mut tallies: HashMap<MissionTemplate, MilestoneTally> = HashMap::new();
        for mission in missions {
            if mission.status != MISSION_STATUS_COMPLETED {
                continue;
            }
            if let Some(template) = MissionTemplate::from_template_id(&mission.template_id) {
                tallies
                    .entry(template)
                    .or_default()
                    .record(days_to_complete(mission.created_at, mission.updated_at));
            }
        }

        let tallies: Vec<(MissionTemplate, MilestoneTally)> = tallies.into_iter().collect();
        Ok(build_milestones(total_weddings, &tallies))
    }

    /// Daily histogram of registrations, wedding creations, onboarding
    /// completions, and tutorial answers inside the range.
    pub async fn timeline(pool: &PgPool, range: &DateRange) -> Result<JourneyTimeline, sqlx::Error> {
        let registrations = sqlx::query_scalar::<_, Timestamp>(
            "SELECT created_at FROM users \
             WHERE created_at >= $1 AND created_at <= $2 ORDER BY created_at",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        let weddings_created = sqlx::query_scalar::<_, Timestamp>(
            "SELECT created_at FROM weddings \
             WHERE created_at >= $1 AND created_at <= $2 ORDER BY created_at",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        // These two streams key on the event's own timestamp, not the
        // session/answer creation date.
        let onboarding_completed = sqlx::query_scalar::<_, Timestamp>(
            "SELECT completed_at FROM onboarding_sessions \
             WHERE completed_at IS NOT NULL \
               AND completed_at >= $1 AND completed_at <= $2 ORDER BY completed_at",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        let tutorial_completed = sqlx::query_scalar::<_, Timestamp>(
            "SELECT answered_at FROM question_answers \
             WHERE question_id = ANY($1) AND deleted_at IS NULL \
               AND answered_at >= $2 AND answered_at <= $3 ORDER BY answered_at",
        )
        .bind(tutorial_question_ids())
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        Ok(build_timeline(
            &registrations,
            &weddings_created,
            &onboarding_completed,
            &tutorial_completed,
        ))
    }
}
