//! KPI metadata catalog.
//!
//! A static table describing every KPI the dashboard renders: what it
//! means for the business, how it is computed, and which KPIs relate to
//! it. The frontend's documentation pages fetch these so the formula
//! text shown to analysts always matches what the backend computes.
//!
//! Pure lookup -- no computation happens here.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Dashboard section a KPI belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiCategory {
    Users,
    Onboarding,
    Weddings,
    Churn,
    Journey,
}

impl KpiCategory {
    pub const ALL: [KpiCategory; 5] = [
        KpiCategory::Users,
        KpiCategory::Onboarding,
        KpiCategory::Weddings,
        KpiCategory::Churn,
        KpiCategory::Journey,
    ];

    pub fn code(self) -> &'static str {
        match self {
            KpiCategory::Users => "users",
            KpiCategory::Onboarding => "onboarding",
            KpiCategory::Weddings => "weddings",
            KpiCategory::Churn => "churn",
            KpiCategory::Journey => "journey",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KpiCategory::Users => "Users",
            KpiCategory::Onboarding => "Onboarding",
            KpiCategory::Weddings => "Weddings",
            KpiCategory::Churn => "Churn",
            KpiCategory::Journey => "Customer Journey",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Documentation entry for one KPI, keyed by `category/slug`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KpiDefinition {
    pub slug: &'static str,
    pub category: KpiCategory,
    pub title: &'static str,
    /// Whether the value changes with the selected date range.
    pub is_time_sensitive: bool,
    pub business_description: &'static str,
    pub technical_description: &'static str,
    pub formula: &'static str,
    pub related_kpis: &'static [&'static str],
}

pub const KPI_DEFINITIONS: [KpiDefinition; 27] = [
    // -- users --
    KpiDefinition {
        slug: "total-users",
        category: KpiCategory::Users,
        title: "Total Users",
        is_time_sensitive: false,
        business_description: "All registered accounts on the platform, the primary growth and market-penetration metric.",
        technical_description: "Counts every row in the users table regardless of onboarding status or activity.",
        formula: "SELECT COUNT(*) FROM users",
        related_kpis: &["users/new-users", "users/countries", "onboarding/completion-rate"],
    },
    KpiDefinition {
        slug: "new-users",
        category: KpiCategory::Users,
        title: "New Users",
        is_time_sensitive: true,
        business_description: "Registrations inside the selected window; shows acquisition velocity.",
        technical_description: "Counts users whose created_at falls inside the inclusive date range.",
        formula: "SELECT COUNT(*) FROM users WHERE created_at BETWEEN :start AND :end",
        related_kpis: &["users/total-users", "journey/registered"],
    },
    KpiDefinition {
        slug: "countries",
        category: KpiCategory::Users,
        title: "Countries",
        is_time_sensitive: true,
        business_description: "Distinct countries new users registered from, an international-reach signal.",
        technical_description: "Number of distinct non-null country codes among users created in range.",
        formula: "SELECT COUNT(DISTINCT country_code) FROM users WHERE created_at BETWEEN :start AND :end",
        related_kpis: &["users/new-users"],
    },
    // -- onboarding --
    KpiDefinition {
        slug: "started",
        category: KpiCategory::Onboarding,
        title: "Started Onboarding",
        is_time_sensitive: true,
        business_description: "Couples who opened the onboarding questionnaire in the window.",
        technical_description: "Counts onboarding sessions created in range; the funnel's synthetic first stage.",
        formula: "SELECT COUNT(*) FROM onboarding_sessions WHERE created_at BETWEEN :start AND :end",
        related_kpis: &["onboarding/completed", "onboarding/completion-rate", "churn/abandoned"],
    },
    KpiDefinition {
        slug: "completed",
        category: KpiCategory::Onboarding,
        title: "Completed Onboarding",
        is_time_sensitive: true,
        business_description: "Couples who finished the full questionnaire; completed profiles engage far more.",
        technical_description: "Counts sessions created in range that carry a completion timestamp.",
        formula: "SELECT COUNT(*) FROM onboarding_sessions WHERE completed_at IS NOT NULL AND created_at BETWEEN :start AND :end",
        related_kpis: &["onboarding/started", "onboarding/completion-rate", "churn/churn-rate"],
    },
    KpiDefinition {
        slug: "completion-rate",
        category: KpiCategory::Onboarding,
        title: "Completion Rate",
        is_time_sensitive: true,
        business_description: "Share of started sessions that finished; the headline onboarding health number.",
        technical_description: "Completed sessions over started sessions, two-decimal rounding, 0 when nothing started.",
        formula: "round2(completed / started * 100)",
        related_kpis: &["onboarding/started", "onboarding/completed", "churn/churn-rate"],
    },
    KpiDefinition {
        slug: "avg-time",
        category: KpiCategory::Onboarding,
        title: "Avg. Completion Time",
        is_time_sensitive: true,
        business_description: "How long finishing onboarding takes; spikes flag friction in the questionnaire.",
        technical_description: "Mean of completed_at - created_at in seconds over completed sessions, non-positive durations discarded; median and p90 are nearest-rank.",
        formula: "mean(completed_at - created_at) over completed sessions in range",
        related_kpis: &["onboarding/completion-rate"],
    },
    // -- weddings --
    KpiDefinition {
        slug: "total",
        category: KpiCategory::Weddings,
        title: "Total Weddings",
        is_time_sensitive: true,
        business_description: "Weddings created in the window; each is a planning workspace for a couple.",
        technical_description: "Counts wedding rows created in range, archived included.",
        formula: "SELECT COUNT(*) FROM weddings WHERE created_at BETWEEN :start AND :end",
        related_kpis: &["weddings/partner-join-rate", "journey/wedding-created"],
    },
    KpiDefinition {
        slug: "partner-join-rate",
        category: KpiCategory::Weddings,
        title: "Partner Join Rate",
        is_time_sensitive: true,
        business_description: "Share of weddings where the second partner also joined; both partners active doubles engagement.",
        technical_description: "Weddings with a non-null partner_user_id over all weddings created in range.",
        formula: "round2(with_partner / total_weddings * 100)",
        related_kpis: &["weddings/total", "weddings/date-set-rate"],
    },
    KpiDefinition {
        slug: "date-set-rate",
        category: KpiCategory::Weddings,
        title: "Date Set Rate",
        is_time_sensitive: true,
        business_description: "Share of weddings with a date picked; a set date anchors every downstream booking.",
        technical_description: "Weddings with a non-null wedding_date over all weddings created in range.",
        formula: "round2(with_date / total_weddings * 100)",
        related_kpis: &["weddings/total", "weddings/partner-join-rate"],
    },
    // -- churn --
    KpiDefinition {
        slug: "churn-rate",
        category: KpiCategory::Churn,
        title: "Churn Rate",
        is_time_sensitive: true,
        business_description: "Share of started onboarding sessions that were abandoned; the inverse of completion.",
        technical_description: "Abandoned sessions over started sessions (completed + abandoned), 0 when none started.",
        formula: "round2(abandoned / (completed + abandoned) * 100)",
        related_kpis: &["churn/abandoned", "churn/completed", "onboarding/completion-rate"],
    },
    KpiDefinition {
        slug: "abandoned",
        category: KpiCategory::Churn,
        title: "Abandoned",
        is_time_sensitive: true,
        business_description: "Sessions started in the window and never finished.",
        technical_description: "Counts sessions created in range with a null completed_at.",
        formula: "SELECT COUNT(*) FROM onboarding_sessions WHERE completed_at IS NULL AND created_at BETWEEN :start AND :end",
        related_kpis: &["churn/churn-rate", "onboarding/started"],
    },
    KpiDefinition {
        slug: "completed",
        category: KpiCategory::Churn,
        title: "Completed",
        is_time_sensitive: true,
        business_description: "Sessions started in the window that reached the end of onboarding.",
        technical_description: "Counts sessions created in range with a non-null completed_at.",
        formula: "SELECT COUNT(*) FROM onboarding_sessions WHERE completed_at IS NOT NULL AND created_at BETWEEN :start AND :end",
        related_kpis: &["churn/churn-rate", "churn/abandoned", "onboarding/completed"],
    },
    KpiDefinition {
        slug: "never-started",
        category: KpiCategory::Churn,
        title: "Never Started",
        is_time_sensitive: true,
        business_description: "Users who registered but never opened onboarding; a pure activation gap.",
        technical_description: "Registered users in range minus started sessions, clamped at zero.",
        formula: "max(0, registered_users - completed - abandoned)",
        related_kpis: &["users/new-users", "churn/abandoned"],
    },
    KpiDefinition {
        slug: "active-users",
        category: KpiCategory::Churn,
        title: "Active Users",
        is_time_sensitive: false,
        business_description: "Users seen in the last 7 days, across the whole user base.",
        technical_description: "Point-in-time snapshot against the request clock, not the selected range; the full user set is paginated through the identity directory.",
        formula: "count(last_sign_in_at >= now - 7 days)",
        related_kpis: &["churn/inactive-users", "churn/dormant-users"],
    },
    KpiDefinition {
        slug: "inactive-users",
        category: KpiCategory::Churn,
        title: "Inactive Users",
        is_time_sensitive: false,
        business_description: "Users last seen between 7 and 30 days ago; the re-engagement campaign audience.",
        technical_description: "Point-in-time snapshot; both window edges measured against the request clock.",
        formula: "count(now - 30 days <= last_sign_in_at < now - 7 days)",
        related_kpis: &["churn/active-users", "churn/dormant-users"],
    },
    KpiDefinition {
        slug: "dormant-users",
        category: KpiCategory::Churn,
        title: "Dormant Users",
        is_time_sensitive: false,
        business_description: "Users gone for more than 30 days; likely lost without a win-back.",
        technical_description: "Point-in-time snapshot; users with no sign-in ever are counted separately.",
        formula: "count(last_sign_in_at < now - 30 days)",
        related_kpis: &["churn/active-users", "churn/inactive-users"],
    },
    // -- journey --
    KpiDefinition {
        slug: "registered",
        category: KpiCategory::Journey,
        title: "Registered",
        is_time_sensitive: true,
        business_description: "The journey cohort: users who registered in the window.",
        technical_description: "Stage 1 of the journey funnel; every later stage is a subset chained from this cohort.",
        formula: "SELECT COUNT(*) FROM users WHERE created_at BETWEEN :start AND :end",
        related_kpis: &["journey/wedding-created", "users/new-users"],
    },
    KpiDefinition {
        slug: "wedding-created",
        category: KpiCategory::Journey,
        title: "Wedding Created",
        is_time_sensitive: true,
        business_description: "Cohort members who created their wedding, whenever that happened.",
        technical_description: "Weddings whose primary user is in the cohort; deliberately no date filter on the wedding itself.",
        formula: "count(weddings where primary_user_id in cohort)",
        related_kpis: &["journey/registered", "journey/onboarding-completed"],
    },
    KpiDefinition {
        slug: "onboarding-completed",
        category: KpiCategory::Journey,
        title: "Onboarding Completed",
        is_time_sensitive: true,
        business_description: "Cohort weddings that finished the core onboarding phases.",
        technical_description: "Cohort weddings whose session's completed_phases contains the celebration phase.",
        formula: "count(cohort sessions where completed_phases @> {celebration})",
        related_kpis: &["journey/wedding-created", "journey/tutorial-completed"],
    },
    KpiDefinition {
        slug: "tutorial-completed",
        category: KpiCategory::Journey,
        title: "Tutorial Completed",
        is_time_sensitive: true,
        business_description: "Cohort weddings that engaged with the post-onboarding tutorial.",
        technical_description: "Onboarding-completed weddings with at least one non-deleted answer to a tutorial question.",
        formula: "count(weddings with answers to tutorial questions)",
        related_kpis: &["journey/onboarding-completed", "journey/ceremony-mission"],
    },
    KpiDefinition {
        slug: "ceremony-mission",
        category: KpiCategory::Journey,
        title: "Ceremony Venue Mission",
        is_time_sensitive: true,
        business_description: "Cohort weddings that completed the ceremony-venue mission.",
        technical_description: "Distinct cohort weddings with a COMPLETED CEREMONY_VENUE mission; scoped to the full cohort, not chained from the tutorial stage.",
        formula: "count(distinct wedding_id: template CEREMONY_VENUE, status COMPLETED)",
        related_kpis: &["journey/celebration-mission", "journey/photography-mission"],
    },
    KpiDefinition {
        slug: "celebration-mission",
        category: KpiCategory::Journey,
        title: "Celebration Venue Mission",
        is_time_sensitive: true,
        business_description: "Cohort weddings that completed the celebration-venue mission.",
        technical_description: "Distinct cohort weddings with a COMPLETED CELEBRATION_VENUE mission.",
        formula: "count(distinct wedding_id: template CELEBRATION_VENUE, status COMPLETED)",
        related_kpis: &["journey/ceremony-mission", "journey/photography-mission"],
    },
    KpiDefinition {
        slug: "photography-mission",
        category: KpiCategory::Journey,
        title: "Photography Mission",
        is_time_sensitive: true,
        business_description: "Cohort weddings that hired their photographer through the platform.",
        technical_description: "Distinct cohort weddings with a COMPLETED HIRE_PHOTOGRAPHER mission; also the journey's final stage.",
        formula: "count(distinct wedding_id: template HIRE_PHOTOGRAPHER, status COMPLETED)",
        related_kpis: &["journey/ceremony-mission", "journey/overall-completion"],
    },
    KpiDefinition {
        slug: "overall-completion",
        category: KpiCategory::Journey,
        title: "Journey Completion Rate",
        is_time_sensitive: true,
        business_description: "Share of the cohort that made it all the way to the final mission.",
        technical_description: "Final-stage count over the registered cohort, two-decimal rounding.",
        formula: "round2(final_stage / registered * 100)",
        related_kpis: &["journey/registered", "journey/photography-mission"],
    },
    KpiDefinition {
        slug: "started-sessions",
        category: KpiCategory::Churn,
        title: "Started Sessions",
        is_time_sensitive: true,
        business_description: "All onboarding sessions opened in the window, the churn denominators' base.",
        technical_description: "Completed plus abandoned sessions created in range.",
        formula: "completed + abandoned",
        related_kpis: &["churn/completed", "churn/abandoned"],
    },
    KpiDefinition {
        slug: "per-phase-time",
        category: KpiCategory::Onboarding,
        title: "Per-Phase Time",
        is_time_sensitive: true,
        business_description: "Time couples spend inside each onboarding phase; locates the slow phases.",
        technical_description: "Per wedding and phase, the span between the first and last answer timestamp; weddings need at least two answers in a phase to contribute.",
        formula: "max(answered_at) - min(answered_at) per wedding and phase",
        related_kpis: &["onboarding/avg-time"],
    },
];

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// All definitions, in catalog order.
pub fn all_definitions() -> &'static [KpiDefinition] {
    &KPI_DEFINITIONS
}

/// Definitions belonging to one category, in catalog order.
pub fn definitions_by_category(category: KpiCategory) -> Vec<&'static KpiDefinition> {
    KPI_DEFINITIONS
        .iter()
        .filter(|d| d.category == category)
        .collect()
}

/// Look up a single definition by category and slug.
///
/// A miss is a [`CoreError::NotFound`], distinct from any computation
/// failure.
pub fn definition_by_slug(
    category: KpiCategory,
    slug: &str,
) -> Result<&'static KpiDefinition, CoreError> {
    KPI_DEFINITIONS
        .iter()
        .find(|d| d.category == category && d.slug == slug)
        .ok_or_else(|| CoreError::NotFound {
            entity: "KPI definition",
            key: format!("{}/{}", category.code(), slug),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn category_codes_round_trip() {
        for category in KpiCategory::ALL {
            assert_eq!(KpiCategory::from_code(category.code()), Some(category));
        }
        assert_eq!(KpiCategory::from_code("finance"), None);
    }

    #[test]
    fn catalog_keys_are_unique() {
        for (i, a) in KPI_DEFINITIONS.iter().enumerate() {
            for b in &KPI_DEFINITIONS[i + 1..] {
                assert!(
                    !(a.category == b.category && a.slug == b.slug),
                    "duplicate key {}/{}",
                    a.category.code(),
                    a.slug
                );
            }
        }
    }

    #[test]
    fn every_category_is_documented() {
        for category in KpiCategory::ALL {
            assert!(
                !definitions_by_category(category).is_empty(),
                "no definitions for {}",
                category.code()
            );
        }
    }

    #[test]
    fn slug_lookup_hits_and_misses() {
        let def = definition_by_slug(KpiCategory::Users, "total-users").unwrap();
        assert_eq!(def.title, "Total Users");

        assert_matches!(
            definition_by_slug(KpiCategory::Users, "does-not-exist"),
            Err(CoreError::NotFound { .. })
        );

        // Same slug under a different category is a distinct key.
        assert!(definition_by_slug(KpiCategory::Churn, "completed").is_ok());
        assert!(definition_by_slug(KpiCategory::Onboarding, "completed").is_ok());
    }

    #[test]
    fn related_kpis_reference_existing_keys() {
        for def in all_definitions() {
            for related in def.related_kpis {
                let (category_code, slug) = related
                    .split_once('/')
                    .unwrap_or_else(|| panic!("malformed related key {related}"));
                let category = KpiCategory::from_code(category_code)
                    .unwrap_or_else(|| panic!("unknown category in {related}"));
                assert!(
                    definition_by_slug(category, slug).is_ok(),
                    "dangling related KPI {related} on {}/{}",
                    def.category.code(),
                    def.slug
                );
            }
        }
    }
}
