//! Self-excluding round-robin scoring assignment.
//!
//! Each round, every participant is offered the targets they did not author
//! and have not yet scored, and picks one at random. A participant with
//! nothing eligible sits the round out; with few targets and many
//! participants that is expected, not an error.

use crate::core::participant::Participant;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Something that can be scored, with the id of whoever authored it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub author: String,
}

impl Target {
    pub fn new(id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
        }
    }
}

/// One scorer paired with one target for a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub round: usize,
    pub scorer: Participant,
    pub target_id: String,
}

/// Tracks who has scored what across rounds
pub struct RoundRobinAssigner {
    participants: Vec<Participant>,
    targets: Vec<Target>,
    scored: HashMap<String, HashSet<String>>,
    rounds_issued: usize,
}

impl RoundRobinAssigner {
    pub fn new(participants: Vec<Participant>, targets: Vec<Target>) -> Self {
        let scored = participants
            .iter()
            .map(|p| (p.id().to_string(), HashSet::new()))
            .collect();
        Self {
            participants,
            targets,
            scored,
            rounds_issued: 0,
        }
    }

    /// Targets `participant` may still score
    pub fn eligible(&self, participant: &Participant) -> Vec<&Target> {
        let done = self.scored.get(participant.id());
        self.targets
            .iter()
            .filter(|t| t.author != participant.id())
            .filter(|t| done.is_none_or(|d| !d.contains(&t.id)))
            .collect()
    }

    /// Draw the next round of assignments, in participant order.
    pub fn next_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Assignment> {
        let round = self.rounds_issued;
        self.rounds_issued += 1;

        let mut assignments = Vec::new();
        for participant in &self.participants {
            let picked = self.eligible(participant).choose(rng).map(|t| t.id.clone());
            let Some(target_id) = picked else {
                continue;
            };
            self.scored
                .entry(participant.id().to_string())
                .or_default()
                .insert(target_id.clone());
            assignments.push(Assignment {
                round,
                scorer: participant.clone(),
                target_id,
            });
        }
        assignments
    }

    /// Plan `rounds` rounds up front
    pub fn plan<R: Rng + ?Sized>(&mut self, rounds: usize, rng: &mut R) -> Vec<Vec<Assignment>> {
        (0..rounds).map(|_| self.next_round(rng)).collect()
    }

    /// Ids of targets `participant` has been assigned so far
    pub fn scored_by(&self, participant: &Participant) -> Option<&HashSet<String>> {
        self.scored.get(participant.id())
    }
}
