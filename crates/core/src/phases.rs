//! The fixed, ordered onboarding phase sequence and its question
//! metadata.
//!
//! A session's `completed_phases` column accumulates phase codes as the
//! couple progresses. The funnel math assumes monotonic progress -- a
//! phase is only present when every earlier phase is too. That invariant
//! is enforced (or not) by the product flows that write the column; if it
//! is violated the funnel reports misleading but well-formed numbers.

use serde::Serialize;

/// The five onboarding phases, in completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingPhase {
    Info,
    Engagement,
    Ceremony,
    Celebration,
    Guests,
}

/// A session counts as "onboarding completed" for the customer journey
/// once the celebration phase is done; the guests phase is a follow-up
/// that many couples finish much later.
pub const COMPLETION_PHASE: OnboardingPhase = OnboardingPhase::Celebration;

impl OnboardingPhase {
    /// All phases in funnel order.
    pub const ALL: [OnboardingPhase; 5] = [
        OnboardingPhase::Info,
        OnboardingPhase::Engagement,
        OnboardingPhase::Ceremony,
        OnboardingPhase::Celebration,
        OnboardingPhase::Guests,
    ];

    /// Stable code stored in `completed_phases` and `question_answers.phase`.
    pub fn code(self) -> &'static str {
        match self {
            OnboardingPhase::Info => "info",
            OnboardingPhase::Engagement => "engagement",
            OnboardingPhase::Ceremony => "ceremony",
            OnboardingPhase::Celebration => "celebration",
            OnboardingPhase::Guests => "guests",
        }
    }

    /// Human-readable name for funnel charts.
    pub fn display_name(self) -> &'static str {
        match self {
            OnboardingPhase::Info => "Info",
            OnboardingPhase::Engagement => "Engagement",
            OnboardingPhase::Ceremony => "Ceremony",
            OnboardingPhase::Celebration => "Celebration",
            OnboardingPhase::Guests => "Guests",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

/// The closing question of each phase.
///
/// A couple whose last recorded answer is one of these did not stall on
/// a question -- they finished a phase and the session is mid-transition,
/// so these are excluded from drop-off attribution.
pub const PHASE_FINAL_QUESTIONS: [&str; 7] = [
    "couple_type",
    "already_engaged",
    "proposal_help",
    "engagement_party",
    "car_rental_needed",
    "open_bar",
    "invitation_format",
];

/// Whether a question is the final question of some phase.
pub fn is_phase_final_question(question_id: &str) -> bool {
    PHASE_FINAL_QUESTIONS.contains(&question_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        let codes: Vec<&str> = OnboardingPhase::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(
            codes,
            ["info", "engagement", "ceremony", "celebration", "guests"]
        );
    }

    #[test]
    fn completion_phase_is_celebration() {
        assert_eq!(COMPLETION_PHASE, OnboardingPhase::Celebration);
    }

    #[test]
    fn from_code_round_trips() {
        for phase in OnboardingPhase::ALL {
            assert_eq!(OnboardingPhase::from_code(phase.code()), Some(phase));
        }
        assert_eq!(OnboardingPhase::from_code("unknown"), None);
    }

    #[test]
    fn final_question_lookup() {
        assert!(is_phase_final_question("open_bar"));
        assert!(!is_phase_final_question("photographer_booked"));
    }
}
