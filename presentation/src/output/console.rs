//! Console output formatter for run results

use colored::Colorize;
use deliberation_application::{CrowdScoringOutcome, DotVoteOutcome, EscalationOutcome, Idea};
use deliberation_domain::{
    BordaResult, CapabilityCard, EscalationRun, PipelineRun, ScoredItem, routing_summary,
    sections, util::preview,
};
use serde::Serialize;

/// Characters of idea text shown per ranked item
const IDEA_PREVIEW: usize = 240;

#[derive(Serialize)]
struct EscalationReport<'a> {
    escalation: &'a EscalationRun,
    pipeline: &'a PipelineRun,
}

#[derive(Serialize)]
struct CrowdReport<'a> {
    items: &'a [ScoredItem],
    briefing: &'a str,
    portfolio: Option<&'a str>,
    rounds_run: usize,
    pipeline: &'a PipelineRun,
}

#[derive(Serialize)]
struct VoteReport<'a> {
    ideas: &'a [Idea],
    tally: Vec<(String, usize)>,
    winners: &'a [String],
    discarded_votes: usize,
    runoff: Option<&'a BordaResult>,
    pipeline: &'a PipelineRun,
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force color on or off regardless of terminal detection
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    // ==================== Escalation ====================

    pub fn escalation(outcome: &EscalationOutcome) -> String {
        let run = &outcome.escalation;
        let mut output = String::new();

        output.push_str(&Self::header("Escalation Result"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            run.topic().content()
        ));

        output.push_str(&Self::section_header("Tiers"));
        for tier in run.tiers() {
            output.push_str(&format!(
                "  {} {:<28} confidence {:>3}  {:.1}s\n",
                tier.tier.to_string().bold(),
                tier.tier.display_name(),
                tier.confidence,
                tier.duration.as_secs_f64()
            ));
            if !tier.reasoning.is_empty() {
                output.push_str(&format!("      {}\n", tier.reasoning.dimmed()));
            }
        }

        if run.flagged_for_human() {
            output.push_str(&format!(
                "\n{} {}\n",
                "FLAGGED FOR HUMAN REVIEW:".red().bold(),
                run.flag_reason().unwrap_or("no reason given")
            ));
        }

        let stopped = run
            .final_tier()
            .map(|t| t.display_name())
            .unwrap_or("none");
        output.push_str(&Self::section_header(&format!("Answer ({})", stopped)));
        output.push_str(run.final_response());
        output.push('\n');
        output.push_str(&Self::footer(&outcome.pipeline));
        output
    }

    pub fn escalation_json(outcome: &EscalationOutcome) -> String {
        pretty(&EscalationReport {
            escalation: &outcome.escalation,
            pipeline: &outcome.pipeline,
        })
    }

    // ==================== Crowd scoring ====================

    pub fn crowd(outcome: &CrowdScoringOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Crowd Scoring Results"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Challenge:".cyan().bold(),
            outcome.pipeline.topic().content()
        ));
        output.push_str(&format!(
            "{} {} ideas, {} scoring rounds\n",
            "Scored:".cyan().bold(),
            outcome.items.len(),
            outcome.rounds_run
        ));

        output.push_str(&Self::section_header("Ranking"));
        for (i, item) in outcome.items.iter().enumerate() {
            let title = item
                .content
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("(untitled)");
            let line = format!(
                "{:>2}. {} - {:.1} ({} scores)",
                i + 1,
                title,
                item.composite(),
                item.scores().len()
            );
            if item.is_top_quartile() {
                output.push_str(&format!("{} {}\n", line.green().bold(), "TOP 25%".green()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
            if let Some(idea) = item.content.get("idea").and_then(|t| t.as_str()) {
                output.push_str(&format!("    {}\n", preview(idea, IDEA_PREVIEW).dimmed()));
            }
        }

        output.push_str(&Self::section_header("Briefing"));
        let parts = sections(&outcome.briefing);
        if outcome.briefing.is_empty() {
            output.push_str(&format!("{}\n", "(synthesis unavailable)".yellow()));
        } else if parts.is_empty() {
            output.push_str(&outcome.briefing);
            output.push('\n');
        } else {
            for (title, body) in parts {
                output.push_str(&format!("\n{}\n{}\n", title.yellow().bold(), body));
            }
        }
        output.push_str(&Self::footer(&outcome.pipeline));
        output
    }

    pub fn crowd_json(outcome: &CrowdScoringOutcome) -> String {
        pretty(&CrowdReport {
            items: &outcome.items,
            briefing: &outcome.briefing,
            portfolio: outcome.portfolio.as_deref(),
            rounds_run: outcome.rounds_run,
            pipeline: &outcome.pipeline,
        })
    }

    // ==================== Dot vote ====================

    pub fn vote(outcome: &DotVoteOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Dot Vote Results"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            outcome.pipeline.topic().content()
        ));
        output.push_str(&format!(
            "{} {} ideas, {} votes counted, {} discarded\n",
            "Votes:".cyan().bold(),
            outcome.ideas.len(),
            outcome.tally.total_votes(),
            outcome.discarded_votes
        ));

        output.push_str(&Self::section_header("Winners"));
        if outcome.winners.is_empty() {
            output.push_str(&format!("{}\n", "(no valid votes)".yellow()));
        }
        for winner in &outcome.winners {
            output.push_str(&format!(
                "  {} {} ({} votes)\n",
                "*".green().bold(),
                winner,
                outcome.tally.count_of(winner)
            ));
        }

        let runners_up: Vec<_> = outcome
            .tally
            .ranked()
            .into_iter()
            .filter(|(idea, _)| !outcome.winners.contains(idea))
            .collect();
        if !runners_up.is_empty() {
            output.push_str(&Self::section_header("Also Voted"));
            for (idea, count) in runners_up {
                output.push_str(&format!("  {} ({})\n", idea, count));
            }
        }

        if let Some(runoff) = &outcome.runoff {
            output.push_str(&Self::section_header("Runoff (Borda)"));
            for (i, (idea, points)) in runoff.scores.iter().enumerate() {
                output.push_str(&format!("{:>2}. {} - {} pts\n", i + 1, idea, points));
            }
            if runoff.has_tie() {
                output.push_str(&format!(
                    "{} {}\n",
                    "Tied at the top:".yellow().bold(),
                    runoff.top_tied.join(", ")
                ));
            }
        }
        output.push_str(&Self::footer(&outcome.pipeline));
        output
    }

    pub fn vote_json(outcome: &DotVoteOutcome) -> String {
        pretty(&VoteReport {
            ideas: &outcome.ideas,
            tally: outcome.tally.ranked(),
            winners: &outcome.winners,
            discarded_votes: outcome.discarded_votes,
            runoff: outcome.runoff.as_ref(),
            pipeline: &outcome.pipeline,
        })
    }

    // ==================== Catalog ====================

    pub fn catalog(cards: &[CapabilityCard]) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Capability Catalog"));
        output.push('\n');

        for card in cards {
            let agents = match card.max_agents {
                Some(max) => format!("{}-{} agents", card.min_agents, max),
                None => format!("{}+ agents", card.min_agents),
            };
            output.push_str(&format!(
                "{} {} [{}, {}{}]\n",
                card.protocol_id.yellow().bold(),
                card.name.bold(),
                card.cost_tier,
                agents,
                if card.supports_rounds { ", rounds" } else { "" }
            ));
            if !card.description.is_empty() {
                output.push_str(&format!("    {}\n", card.description));
            }
        }

        output.push_str(&Self::section_header("Routing"));
        output.push_str(&routing_summary(cards));
        output.push('\n');
        output
    }

    pub fn catalog_json(cards: &[CapabilityCard]) -> String {
        pretty(&cards)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer(run: &PipelineRun) -> String {
        let defaulted = run.defaulted_phases();
        let mut footer = format!(
            "\n{}\n",
            format!(
                "run {} - {} phases in {:.1}s",
                run.run_id(),
                run.phases().len(),
                run.elapsed().as_secs_f64()
            )
            .dimmed()
        );
        if !defaulted.is_empty() {
            footer.push_str(&format!(
                "{} {}\n",
                "defaulted:".yellow(),
                defaulted.join(", ")
            ));
        }
        footer
    }
}
