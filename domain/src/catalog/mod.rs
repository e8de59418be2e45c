//! Capability catalog.
//!
//! Static descriptions of the available deliberation pipelines, used by
//! whatever routes a problem to a pipeline. Nothing in the orchestration
//! core reads these.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative cost of running a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Low,
    #[default]
    Medium,
    High,
}

impl CostTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostTier::Low => "low",
            CostTier::Medium => "medium",
            CostTier::High => "high",
        }
    }
}

impl std::fmt::Display for CostTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_min_participants() -> usize {
    2
}

/// One pipeline's capability card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityCard {
    pub protocol_id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub problem_types: Vec<String>,
    #[serde(default)]
    pub cost_tier: CostTier,
    #[serde(default = "default_min_participants")]
    pub min_agents: usize,
    #[serde(default)]
    pub max_agents: Option<usize>,
    #[serde(default)]
    pub supports_rounds: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub when_to_use: String,
    #[serde(default)]
    pub when_not_to_use: String,
}

impl CapabilityCard {
    /// Whether a panel of `participants` fits this pipeline
    pub fn accepts(&self, participants: usize) -> bool {
        participants >= self.min_agents && self.max_agents.is_none_or(|max| participants <= max)
    }
}

/// Text block listing pipelines by problem type and by cost tier.
///
/// Problem types are sorted alphabetically; within a problem type cards
/// keep catalog order. Cost tiers list protocol ids sorted.
pub fn routing_summary(cards: &[CapabilityCard]) -> String {
    let mut by_problem: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    let mut by_cost: BTreeMap<CostTier, Vec<&str>> = BTreeMap::new();

    for card in cards {
        for problem in &card.problem_types {
            by_problem
                .entry(problem.as_str())
                .or_default()
                .push(format!("{} {}", card.protocol_id, card.name));
        }
        by_cost
            .entry(card.cost_tier)
            .or_default()
            .push(card.protocol_id.as_str());
    }

    let mut lines = vec!["Protocol mapping:".to_string()];
    for (problem, protocols) in &by_problem {
        lines.push(format!("- {}: {}", problem, protocols.join(", ")));
    }

    lines.push(String::new());
    lines.push("Cost tiers:".to_string());
    for (tier, mut ids) in by_cost {
        ids.sort_unstable();
        lines.push(format!("- {}: {}", tier, ids.join(", ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, name: &str, problems: &[&str], cost: CostTier) -> CapabilityCard {
        CapabilityCard {
            protocol_id: id.to_string(),
            name: name.to_string(),
            category: "Test".to_string(),
            problem_types: problems.iter().map(|p| p.to_string()).collect(),
            cost_tier: cost,
            min_agents: 2,
            max_agents: None,
            supports_rounds: false,
            description: String::new(),
            when_to_use: String::new(),
            when_not_to_use: String::new(),
        }
    }

    #[test]
    fn test_accepts() {
        let mut c = card("p12", "25/10", &[], CostTier::Medium);
        assert!(!c.accepts(1));
        assert!(c.accepts(20));
        c.max_agents = Some(6);
        assert!(c.accepts(6));
        assert!(!c.accepts(7));
    }

    #[test]
    fn test_routing_summary() {
        let cards = vec![
            card("p26", "Crazy Eights", &["ideation"], CostTier::Low),
            card("p12", "25/10", &["ideation", "prioritization"], CostTier::Medium),
            card("p0c", "Tiered Escalation", &["risk"], CostTier::Low),
        ];
        let summary = routing_summary(&cards);
        assert_eq!(
            summary,
            "Protocol mapping:\n\
             - ideation: p26 Crazy Eights, p12 25/10\n\
             - prioritization: p12 25/10\n\
             - risk: p0c Tiered Escalation\n\
             \n\
             Cost tiers:\n\
             - low: p0c, p26\n\
             - medium: p12"
        );
    }

    #[test]
    fn test_card_defaults_from_partial_data() {
        let c: CapabilityCard =
            serde_json::from_value(serde_json::json!({"protocol_id": "p20", "name": "Borda"})).unwrap();
        assert_eq!(c.min_agents, 2);
        assert_eq!(c.cost_tier, CostTier::Medium);
        assert!(c.max_agents.is_none());
    }
}
