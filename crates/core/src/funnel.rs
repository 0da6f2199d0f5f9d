//! Funnel, drop-off, churn, and customer-journey stage construction.
//!
//! The repositories hand these functions raw counts (or per-wedding
//! groupings); everything here is pure arithmetic over them. All rates
//! use [`crate::stats::rate`], so division by zero is rate 0 throughout.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::phases::OnboardingPhase;
use crate::stats::rate;

// ---------------------------------------------------------------------------
// Onboarding funnel
// ---------------------------------------------------------------------------

/// One stage of the onboarding funnel.
#[derive(Debug, Clone, Serialize)]
pub struct FunnelStage {
    pub stage: &'static str,
    pub stage_name: &'static str,
    pub count: i64,
    pub conversion_rate: f64,
    pub drop_off_rate: f64,
}

/// Build the six-stage onboarding funnel from the session total and the
/// five per-phase completion counts (in phase order).
///
/// The first stage is synthetic ("sessions created", 100% conversion);
/// each phase stage converts against the total and drops off against the
/// previous stage's count.
pub fn build_onboarding_funnel(total: i64, phase_counts: [i64; 5]) -> Vec<FunnelStage> {
    let mut stages = Vec::with_capacity(1 + phase_counts.len());
    stages.push(FunnelStage {
        stage: "sessions_created",
        stage_name: "Sessions created",
        count: total,
        conversion_rate: 100.0,
        drop_off_rate: 0.0,
    });

    for (i, phase) in OnboardingPhase::ALL.iter().enumerate() {
        let count = phase_counts[i];
        let previous = if i == 0 { total } else { phase_counts[i - 1] };
        stages.push(FunnelStage {
            stage: phase.code(),
            stage_name: phase.display_name(),
            count,
            conversion_rate: rate(count, total),
            drop_off_rate: rate(previous - count, previous),
        });
    }

    stages
}

// ---------------------------------------------------------------------------
// Drop-off attribution
// ---------------------------------------------------------------------------

/// Maximum number of drop-off questions reported.
pub const TOP_DROP_OFF_QUESTIONS: usize = 5;

/// A question at which abandoned sessions stalled.
#[derive(Debug, Clone, Serialize)]
pub struct DropOffQuestion {
    pub question_id: String,
    pub drop_off_count: i64,
    pub drop_off_rate: f64,
}

/// Abandonment attribution for a date range.
#[derive(Debug, Clone, Serialize)]
pub struct DropOffsResult {
    pub top_questions: Vec<DropOffQuestion>,
    pub total_drop_offs: i64,
    pub total_started: i64,
}

impl DropOffsResult {
    pub fn empty(total_started: i64) -> Self {
        Self {
            top_questions: Vec::new(),
            total_drop_offs: 0,
            total_started,
        }
    }
}

/// Rank the last-seen questions of abandoned sessions.
///
/// `last_questions` is the last-answered question id per abandoned
/// wedding; phase-final questions have already been excluded by the
/// caller (or are dropped here, either way they never appear). Ties are
/// broken by question id so repeated runs produce identical output.
pub fn top_drop_off_questions(
    last_questions: impl IntoIterator<Item = String>,
    total_drop_offs: i64,
) -> Vec<DropOffQuestion> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for question_id in last_questions {
        if crate::phases::is_phase_final_question(&question_id) {
            continue;
        }
        *counts.entry(question_id).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, i64)> = counts.into_iter().collect();
    // BTreeMap iteration is id-ascending; the stable sort keeps that
    // order within equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(TOP_DROP_OFF_QUESTIONS);

    ranked
        .into_iter()
        .map(|(question_id, count)| DropOffQuestion {
            question_id,
            drop_off_count: count,
            drop_off_rate: rate(count, total_drop_offs),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Churn
// ---------------------------------------------------------------------------

/// Completed / abandoned / never-started split for a date range.
#[derive(Debug, Clone, Serialize)]
pub struct ChurnOverview {
    pub never_started: i64,
    pub abandoned: i64,
    pub completed: i64,
    pub total: i64,
    pub churn_rate: f64,
}

/// Build the churn overview from registered-user and session counts.
///
/// The churn rate is over sessions that were actually started; users who
/// registered but never opened onboarding are reported separately.
pub fn build_churn_overview(total_users: i64, completed: i64, abandoned: i64) -> ChurnOverview {
    let sessions = completed + abandoned;
    ChurnOverview {
        never_started: (total_users - sessions).max(0),
        abandoned,
        completed,
        total: total_users,
        churn_rate: rate(abandoned, sessions),
    }
}

/// Per-phase entered/completed/churned counts.
#[derive(Debug, Clone, Serialize)]
pub struct StageChurn {
    pub stage: &'static str,
    pub stage_name: &'static str,
    pub entered_count: i64,
    pub completed_count: i64,
    pub churned_count: i64,
    pub churn_rate: f64,
}

/// Stage-by-stage churn for the whole onboarding.
#[derive(Debug, Clone, Serialize)]
pub struct ChurnByStage {
    pub stages: Vec<StageChurn>,
    pub total_started: i64,
    pub total_completed: i64,
    pub overall_churn_rate: f64,
}

/// Reframe the funnel counts as churn: a phase's entered count is the
/// previous phase's completed count (the session total for the first),
/// and whoever entered but did not complete churned there.
pub fn build_stage_churn(total_sessions: i64, phase_counts: [i64; 5]) -> ChurnByStage {
    let mut stages = Vec::with_capacity(phase_counts.len());

    for (i, phase) in OnboardingPhase::ALL.iter().enumerate() {
        let entered = if i == 0 {
            total_sessions
        } else {
            phase_counts[i - 1]
        };
        let completed = phase_counts[i];
        let churned = (entered - completed).max(0);
        stages.push(StageChurn {
            stage: phase.code(),
            stage_name: phase.display_name(),
            entered_count: entered,
            completed_count: completed,
            churned_count: churned,
            churn_rate: rate(churned, entered),
        });
    }

    let total_completed = phase_counts[phase_counts.len() - 1];
    ChurnByStage {
        stages,
        total_started: total_sessions,
        total_completed,
        overall_churn_rate: rate(total_sessions - total_completed, total_sessions),
    }
}

// ---------------------------------------------------------------------------
// Customer journey
// ---------------------------------------------------------------------------

/// Number of journey milestones from registration to the final mission.
pub const JOURNEY_STAGE_COUNT: usize = 7;

/// The ordered journey stages: `(code, display name)`.
pub const JOURNEY_STAGES: [(&str, &str); JOURNEY_STAGE_COUNT] = [
    ("registered", "Registered"),
    ("wedding_created", "Wedding Created"),
    ("onboarding_completed", "Onboarding Completed"),
    ("tutorial_completed", "Tutorial Completed"),
    ("ceremony_mission", "Ceremony Venue Mission"),
    ("celebration_mission", "Celebration Venue Mission"),
    ("photography_mission", "Photography Mission"),
];

/// Answering any of these questions marks the post-onboarding tutorial
/// as completed for a wedding.
pub const TUTORIAL_QUESTION_IDS: [&str; 3] = [
    "ceremony_venue_booked",
    "venue_search_started",
    "photographer_booked",
];

/// The mission templates tracked as journey milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionTemplate {
    CeremonyVenue,
    CelebrationVenue,
    HirePhotographer,
}

impl MissionTemplate {
    pub const ALL: [MissionTemplate; 3] = [
        MissionTemplate::CeremonyVenue,
        MissionTemplate::CelebrationVenue,
        MissionTemplate::HirePhotographer,
    ];

    /// Template id stored in the `missions` table.
    pub fn template_id(self) -> &'static str {
        match self {
            MissionTemplate::CeremonyVenue => "CEREMONY_VENUE",
            MissionTemplate::CelebrationVenue => "CELEBRATION_VENUE",
            MissionTemplate::HirePhotographer => "HIRE_PHOTOGRAPHER",
        }
    }

    /// Milestone slug used in the journey responses.
    pub fn milestone(self) -> &'static str {
        match self {
            MissionTemplate::CeremonyVenue => "ceremony_venue",
            MissionTemplate::CelebrationVenue => "celebration_venue",
            MissionTemplate::HirePhotographer => "photography",
        }
    }

    pub fn milestone_name(self) -> &'static str {
        match self {
            MissionTemplate::CeremonyVenue => "Ceremony Venue",
            MissionTemplate::CelebrationVenue => "Celebration Venue",
            MissionTemplate::HirePhotographer => "Photography",
        }
    }

    pub fn from_template_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.template_id() == id)
    }
}

/// One milestone of the journey funnel.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyStage {
    pub stage: &'static str,
    pub stage_name: &'static str,
    pub count: i64,
    pub percentage: f64,
    pub drop_off_count: i64,
    pub drop_off_rate: f64,
}

/// The seven-stage registration cohort funnel.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyFunnel {
    pub stages: Vec<JourneyStage>,
    pub total_users: i64,
    pub fully_completed: i64,
    pub overall_completion_rate: f64,
}

impl JourneyFunnel {
    /// The all-zero funnel returned for an empty cohort.
    pub fn empty() -> Self {
        build_journey_funnel([0; JOURNEY_STAGE_COUNT])
    }
}

/// Build the journey funnel from per-stage cohort counts.
///
/// Percentages are against the registered cohort; drop-offs against the
/// previous stage. Mission stages are each scoped to the full cohort, so
/// counts there are not necessarily monotonic -- the drop-off clamp to
/// zero covers that.
pub fn build_journey_funnel(stage_counts: [i64; JOURNEY_STAGE_COUNT]) -> JourneyFunnel {
    let registered = stage_counts[0];

    let stages = JOURNEY_STAGES
        .iter()
        .enumerate()
        .map(|(i, &(stage, stage_name))| {
            let count = stage_counts[i];
            let previous = if i == 0 { count } else { stage_counts[i - 1] };
            let drop_off_count = (previous - count).max(0);
            JourneyStage {
                stage,
                stage_name,
                count,
                percentage: rate(count, registered),
                drop_off_count,
                drop_off_rate: rate(drop_off_count, previous),
            }
        })
        .collect();

    let fully_completed = stage_counts[JOURNEY_STAGE_COUNT - 1];
    JourneyFunnel {
        stages,
        total_users: registered,
        fully_completed,
        overall_completion_rate: rate(fully_completed, registered),
    }
}

// ---------------------------------------------------------------------------
// Journey milestones
// ---------------------------------------------------------------------------

/// Running tally of completed missions for one template.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilestoneTally {
    pub completed: i64,
    pub total_days: i64,
}

impl MilestoneTally {
    /// Record one completed mission and the days it took.
    pub fn record(&mut self, days: i64) {
        self.completed += 1;
        self.total_days += days;
    }
}

/// Completion stats for one mission milestone.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyMilestone {
    pub milestone: &'static str,
    pub milestone_name: &'static str,
    pub completed_count: i64,
    pub total_eligible: i64,
    pub completion_rate: f64,
    pub avg_days_to_complete: Option<i64>,
}

/// Milestone stats for all tracked templates.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyMilestones {
    pub milestones: Vec<JourneyMilestone>,
    pub total_weddings: i64,
}

/// Build milestone stats from per-template tallies.
///
/// Completion is measured against all weddings created in range (not the
/// registration cohort); the average days are the mean of the per-mission
/// rounded-up day counts, absent when nothing completed.
pub fn build_milestones(
    total_weddings: i64,
    tallies: &[(MissionTemplate, MilestoneTally)],
) -> JourneyMilestones {
    let milestones = MissionTemplate::ALL
        .iter()
        .map(|template| {
            let tally = tallies
                .iter()
                .find(|(t, _)| t == template)
                .map(|(_, tally)| *tally)
                .unwrap_or_default();

            let avg_days = if tally.completed > 0 {
                Some((tally.total_days as f64 / tally.completed as f64).round() as i64)
            } else {
                None
            };

            JourneyMilestone {
                milestone: template.milestone(),
                milestone_name: template.milestone_name(),
                completed_count: tally.completed,
                total_eligible: total_weddings,
                completion_rate: rate(tally.completed, total_weddings),
                avg_days_to_complete: avg_days,
            }
        })
        .collect();

    JourneyMilestones {
        milestones,
        total_weddings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- onboarding funnel --

    #[test]
    fn funnel_mid_phase_counts() {
        // 100 sessions, 100 did info, 80 engagement, 40 ceremony, none
        // beyond: celebration converts at 0 and drops off 100% from
        // ceremony's 40.
        let stages = build_onboarding_funnel(100, [100, 80, 40, 0, 0]);
        assert_eq!(stages.len(), 6);

        assert_eq!(stages[0].stage, "sessions_created");
        assert_eq!(stages[0].count, 100);
        assert_eq!(stages[0].conversion_rate, 100.0);

        let ceremony = &stages[3];
        assert_eq!(ceremony.stage, "ceremony");
        assert_eq!(ceremony.count, 40);
        assert_eq!(ceremony.conversion_rate, 40.0);
        assert_eq!(ceremony.drop_off_rate, 50.0);

        let celebration = &stages[4];
        assert_eq!(celebration.count, 0);
        assert_eq!(celebration.conversion_rate, 0.0);
        assert_eq!(celebration.drop_off_rate, 100.0);

        // Guests: previous count 0, so drop-off is defined as 0.
        assert_eq!(stages[5].drop_off_rate, 0.0);
    }

    #[test]
    fn funnel_zero_sessions_is_all_zero() {
        let stages = build_onboarding_funnel(0, [0; 5]);
        assert_eq!(stages[0].count, 0);
        for stage in &stages[1..] {
            assert_eq!(stage.count, 0);
            assert_eq!(stage.conversion_rate, 0.0);
            assert_eq!(stage.drop_off_rate, 0.0);
        }
    }

    #[test]
    fn funnel_counts_non_increasing_under_monotonic_phases() {
        let stages = build_onboarding_funnel(50, [45, 30, 20, 10, 5]);
        for pair in stages.windows(2) {
            assert!(pair[1].count <= pair[0].count);
        }
    }

    // -- drop-off attribution --

    #[test]
    fn drop_offs_ranked_and_rated() {
        let last = vec![
            "budget_range".to_string(),
            "budget_range".to_string(),
            "budget_range".to_string(),
            "guest_count".to_string(),
            "guest_count".to_string(),
            "wedding_style".to_string(),
        ];
        let top = top_drop_off_questions(last, 6);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].question_id, "budget_range");
        assert_eq!(top[0].drop_off_count, 3);
        assert_eq!(top[0].drop_off_rate, 50.0);
        assert_eq!(top[1].question_id, "guest_count");
    }

    #[test]
    fn drop_offs_exclude_phase_final_questions() {
        let last = vec!["open_bar".to_string(), "budget_range".to_string()];
        let top = top_drop_off_questions(last, 2);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].question_id, "budget_range");
    }

    #[test]
    fn drop_offs_capped_at_five() {
        let last = (0..8).map(|i| format!("q{i}")).collect::<Vec<_>>();
        let top = top_drop_off_questions(last, 8);
        assert_eq!(top.len(), TOP_DROP_OFF_QUESTIONS);
    }

    #[test]
    fn drop_off_ties_break_by_question_id() {
        let last = vec!["zeta".to_string(), "alpha".to_string()];
        let top = top_drop_off_questions(last, 2);
        assert_eq!(top[0].question_id, "alpha");
        assert_eq!(top[1].question_id, "zeta");
    }

    // -- churn --

    #[test]
    fn churn_overview_basic() {
        let overview = build_churn_overview(100, 30, 20);
        assert_eq!(overview.never_started, 50);
        assert_eq!(overview.churn_rate, 40.0);
        assert_eq!(overview.total, 100);
    }

    #[test]
    fn churn_overview_all_zero() {
        let overview = build_churn_overview(0, 0, 0);
        assert_eq!(overview.never_started, 0);
        assert_eq!(overview.abandoned, 0);
        assert_eq!(overview.completed, 0);
        assert_eq!(overview.churn_rate, 0.0);
    }

    #[test]
    fn churn_never_started_clamped() {
        // More sessions than registered users (partners start sessions on
        // weddings created by earlier cohorts): clamp at zero.
        let overview = build_churn_overview(10, 8, 6);
        assert_eq!(overview.never_started, 0);
    }

    #[test]
    fn stage_churn_chains_entered_counts() {
        let by_stage = build_stage_churn(100, [90, 70, 40, 20, 10]);
        assert_eq!(by_stage.stages[0].entered_count, 100);
        assert_eq!(by_stage.stages[0].churned_count, 10);
        assert_eq!(by_stage.stages[0].churn_rate, 10.0);

        assert_eq!(by_stage.stages[1].entered_count, 90);
        assert_eq!(by_stage.stages[1].completed_count, 70);

        assert_eq!(by_stage.total_completed, 10);
        assert_eq!(by_stage.overall_churn_rate, 90.0);
    }

    // -- journey --

    #[test]
    fn journey_funnel_percentages_and_drop_offs() {
        let funnel = build_journey_funnel([200, 150, 100, 80, 60, 50, 40]);
        assert_eq!(funnel.total_users, 200);
        assert_eq!(funnel.stages[0].percentage, 100.0);
        assert_eq!(funnel.stages[0].drop_off_count, 0);

        assert_eq!(funnel.stages[1].percentage, 75.0);
        assert_eq!(funnel.stages[1].drop_off_count, 50);
        assert_eq!(funnel.stages[1].drop_off_rate, 25.0);

        assert_eq!(funnel.fully_completed, 40);
        assert_eq!(funnel.overall_completion_rate, 20.0);
    }

    #[test]
    fn journey_funnel_empty_cohort() {
        let funnel = JourneyFunnel::empty();
        assert_eq!(funnel.stages.len(), JOURNEY_STAGE_COUNT);
        assert_eq!(funnel.total_users, 0);
        for stage in &funnel.stages {
            assert_eq!(stage.count, 0);
            assert_eq!(stage.percentage, 0.0);
            assert_eq!(stage.drop_off_rate, 0.0);
        }
        assert_eq!(funnel.overall_completion_rate, 0.0);
    }

    #[test]
    fn journey_mission_stage_can_exceed_previous() {
        // A mission stage drawing on the full cohort can out-count the
        // tutorial stage; drop-off clamps at zero.
        let funnel = build_journey_funnel([100, 80, 40, 10, 30, 5, 2]);
        let ceremony = &funnel.stages[4];
        assert_eq!(ceremony.count, 30);
        assert_eq!(ceremony.drop_off_count, 0);
        assert_eq!(ceremony.drop_off_rate, 0.0);
    }

    // -- milestones --

    #[test]
    fn milestones_average_days() {
        let mut tally = MilestoneTally::default();
        tally.record(3);
        tally.record(6);
        let result = build_milestones(50, &[(MissionTemplate::CeremonyVenue, tally)]);

        let ceremony = &result.milestones[0];
        assert_eq!(ceremony.milestone, "ceremony_venue");
        assert_eq!(ceremony.completed_count, 2);
        assert_eq!(ceremony.completion_rate, 4.0);
        assert_eq!(ceremony.avg_days_to_complete, Some(5)); // 4.5 rounds up

        // Untracked templates report zero with no average.
        let photography = &result.milestones[2];
        assert_eq!(photography.completed_count, 0);
        assert_eq!(photography.avg_days_to_complete, None);
    }

    #[test]
    fn milestones_zero_weddings() {
        let result = build_milestones(0, &[]);
        assert_eq!(result.total_weddings, 0);
        for milestone in &result.milestones {
            assert_eq!(milestone.completion_rate, 0.0);
            assert_eq!(milestone.avg_days_to_complete, None);
        }
    }

    #[test]
    fn template_ids_round_trip() {
        for template in MissionTemplate::ALL {
            assert_eq!(
                MissionTemplate::from_template_id(template.template_id()),
                Some(template)
            );
        }
        assert_eq!(MissionTemplate::from_template_id("UNKNOWN"), None);
    }
}
