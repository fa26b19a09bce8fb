//! Decision requests and answers.
//!
//! Some downs cannot finish without a choice from one side: accepting a
//! penalty, returning a punt that stopped on the goal line, picking the
//! kickoff type after a score, or the free-kick type after a safety. When
//! that side is human-controlled the orchestrator pauses and hands out a
//! [`DecisionRequest`]; the answer comes back as a [`Decision`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::special_teams::KickoffKind;
use crate::state::{GameState, Side};

/// What kind of choice is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Accept or decline a penalty.
    Penalty,
    /// Return or down a punt on the goal line.
    PuntReturn,
    /// Normal kickoff or onside kick.
    KickoffType,
    /// Kickoff or punt after a safety.
    FreeKick,
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Penalty => write!(f, "penalty"),
            Self::PuntReturn => write!(f, "punt return"),
            Self::KickoffType => write!(f, "kickoff type"),
            Self::FreeKick => write!(f, "free kick"),
        }
    }
}

/// Penalty answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyChoice {
    /// Enforce the penalty.
    Accept,
    /// Keep the play result.
    Decline,
}

/// Goal-line punt answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuntReturnChoice {
    /// Field the ball and run it out.
    Return,
    /// Down it for a touchback.
    Down,
}

/// Free-kick answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeKickChoice {
    /// Kick off from the kicker's 20.
    Kickoff,
    /// Punt from the kicker's 20.
    Punt,
}

/// An answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "choice", rename_all = "snake_case")]
pub enum Decision {
    /// Penalty answer.
    Penalty(PenaltyChoice),
    /// Goal-line punt answer.
    PuntReturn(PuntReturnChoice),
    /// Kickoff type.
    KickoffType(KickoffKind),
    /// Free-kick type.
    FreeKick(FreeKickChoice),
}

impl Decision {
    /// The kind of request this answers.
    #[must_use]
    pub const fn kind(&self) -> DecisionKind {
        match self {
            Self::Penalty(_) => DecisionKind::Penalty,
            Self::PuntReturn(_) => DecisionKind::PuntReturn,
            Self::KickoffType(_) => DecisionKind::KickoffType,
            Self::FreeKick(_) => DecisionKind::FreeKick,
        }
    }
}

/// One selectable answer, with the state it leads to when that is known
/// without further dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    /// The answer.
    pub decision: Decision,
    /// Resulting state, before clock and follow-up kicks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<GameState>,
}

/// A pause in the current down, waiting on one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// What is being asked.
    pub kind: DecisionKind,
    /// Side that must answer.
    pub decider: Side,
    /// Valid answers.
    pub options: Vec<DecisionOption>,
}

impl DecisionRequest {
    /// Accept/decline request carrying both projected states.
    #[must_use]
    pub fn penalty(decider: Side, accept: &GameState, decline: &GameState) -> Self {
        Self {
            kind: DecisionKind::Penalty,
            decider,
            options: vec![
                DecisionOption {
                    decision: Decision::Penalty(PenaltyChoice::Accept),
                    preview: Some(accept.clone()),
                },
                DecisionOption {
                    decision: Decision::Penalty(PenaltyChoice::Decline),
                    preview: Some(decline.clone()),
                },
            ],
        }
    }

    /// Goal-line punt request for the receiving side.
    #[must_use]
    pub fn punt_return(decider: Side) -> Self {
        Self::unpreviewed(
            DecisionKind::PuntReturn,
            decider,
            [
                Decision::PuntReturn(PuntReturnChoice::Return),
                Decision::PuntReturn(PuntReturnChoice::Down),
            ],
        )
    }

    /// Kickoff-type request for the kicking side.
    #[must_use]
    pub fn kickoff_type(decider: Side) -> Self {
        Self::unpreviewed(
            DecisionKind::KickoffType,
            decider,
            [
                Decision::KickoffType(KickoffKind::Normal),
                Decision::KickoffType(KickoffKind::Onside),
            ],
        )
    }

    /// Free-kick request for the side that gave up the safety.
    #[must_use]
    pub fn free_kick(decider: Side) -> Self {
        Self::unpreviewed(
            DecisionKind::FreeKick,
            decider,
            [
                Decision::FreeKick(FreeKickChoice::Kickoff),
                Decision::FreeKick(FreeKickChoice::Punt),
            ],
        )
    }

    fn unpreviewed(kind: DecisionKind, decider: Side, decisions: [Decision; 2]) -> Self {
        Self {
            kind,
            decider,
            options: decisions
                .into_iter()
                .map(|decision| DecisionOption {
                    decision,
                    preview: None,
                })
                .collect(),
        }
    }

    /// Preview for an answer, if one was computed.
    #[must_use]
    pub fn preview(&self, decision: Decision) -> Option<&GameState> {
        self.options
            .iter()
            .find(|option| option.decision == decision)
            .and_then(|option| option.preview.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_know_their_kind() {
        assert_eq!(
            Decision::KickoffType(KickoffKind::Onside).kind(),
            DecisionKind::KickoffType
        );
        assert_eq!(
            Decision::FreeKick(FreeKickChoice::Punt).kind(),
            DecisionKind::FreeKick
        );
    }

    #[test]
    fn penalty_request_carries_previews() {
        let accept = GameState::new(900);
        let mut decline = GameState::new(900);
        decline.down = 2;
        let request = DecisionRequest::penalty(Side::Away, &accept, &decline);
        assert_eq!(
            request
                .preview(Decision::Penalty(PenaltyChoice::Decline))
                .map(|state| state.down),
            Some(2)
        );
        assert!(DecisionRequest::punt_return(Side::Home)
            .preview(Decision::PuntReturn(PuntReturnChoice::Down))
            .is_none());
    }

    #[test]
    fn decision_json_shape() {
        let json = serde_json::to_value(Decision::Penalty(PenaltyChoice::Accept)).unwrap();
        assert_eq!(json["kind"], "penalty");
        assert_eq!(json["choice"], "accept");
    }
}
