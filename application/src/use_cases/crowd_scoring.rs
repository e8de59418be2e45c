//! Crowd scoring use case
//!
//! Every participant writes one bold idea card. Scorers then rate cards
//! blind over several rounds: each round a scorer gets one card they did
//! not write and have not scored yet. Cards are ranked by composite score,
//! the top quartile is marked, and a final deep call writes the briefing.

use super::phase_pipeline::{FailurePolicy, PhaseContext, PhasePipeline, PhaseSpec, PipelineError};
use crate::config::{CallBudgets, ScoringParams};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use deliberation_domain::{
    DEFAULT_CONVERGENCE_RATIO, DispersionStats, ModelTier, Participant, PhaseOutput, PipelineRun, PromptTemplate,
    ResponseShape, RoundRobinAssigner, ScoreCard, ScoredItem, Target, Topic, mark_top_quartile,
    rank_items, section,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::{info, warn};

const GENERATE: &str = "generate";
const SYNTHESIZE: &str = "synthesize";
/// Briefing section lifted into the outcome
const PORTFOLIO: &str = "Recommended Portfolio";

fn round_phase(round: usize) -> String {
    format!("score.round{}", round)
}

/// Input for the crowd scoring use case
#[derive(Debug, Clone)]
pub struct CrowdScoringInput {
    pub challenge: Topic,
    pub participants: Vec<Participant>,
}

impl CrowdScoringInput {
    pub fn new(challenge: Topic, participants: Vec<Participant>) -> Self {
        Self {
            challenge,
            participants,
        }
    }
}

/// Ranked idea cards and the closing briefing
#[derive(Debug, Clone)]
pub struct CrowdScoringOutcome {
    /// Highest composite first
    pub items: Vec<ScoredItem>,
    /// Empty when the synthesis call failed
    pub briefing: String,
    /// The briefing's "Recommended Portfolio" section, when present
    pub portfolio: Option<String>,
    /// Rounds that actually ran; fewer than requested once every scorer
    /// has seen every card they may score
    pub rounds_run: usize,
    pub pipeline: PipelineRun,
}

impl CrowdScoringOutcome {
    pub fn top_quartile(&self) -> Vec<&ScoredItem> {
        self.items.iter().filter(|i| i.is_top_quartile()).collect()
    }
}

/// The card as a scorer sees it: no author
fn card_text(card: &Value) -> String {
    let field = |key: &str| card.get(key).and_then(Value::as_str).unwrap_or_default();
    format!(
        "Title: {}\nIdea: {}\nBold because: {}",
        field("title"),
        field("idea"),
        field("bold_because")
    )
}

fn title_of(item: &ScoredItem) -> &str {
    item.content
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("(untitled)")
}

/// Ranked results block fed to the synthesis prompt. Each item notes
/// whether its scorers agreed on `spread_dimension`.
fn ranked_summary(items: &[ScoredItem], spread_dimension: &str) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut lines = vec![format!(
                "{}. {}{} - composite {:.1} from {} scores",
                i + 1,
                title_of(item),
                if item.is_top_quartile() { " [TOP 25%]" } else { "" },
                item.composite(),
                item.scores().len()
            )];
            let values: Vec<f64> = item
                .scores()
                .iter()
                .filter_map(|c| c.get(spread_dimension))
                .collect();
            if let Some(stats) = DispersionStats::from_values(&values) {
                lines.push(format!(
                    "   {} median {:.1}, spread {:.1}, agreement {:.2} ({})",
                    spread_dimension,
                    stats.median,
                    stats.spread,
                    stats.consensus_score(),
                    if stats.converged(DEFAULT_CONVERGENCE_RATIO) {
                        "scorers agree"
                    } else {
                        "scorers split"
                    }
                ));
            }
            if let Some(idea) = item.content.get("idea").and_then(Value::as_str) {
                lines.push(format!("   {}", idea));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn require_ideas(_ctx: &PhaseContext, outputs: &[PhaseOutput]) -> Result<Value, PipelineError> {
    let cards: Vec<Value> = outputs
        .iter()
        .filter_map(|o| o.extraction.value().cloned())
        .collect();
    if cards.is_empty() {
        return Err(PipelineError::reduce("no idea cards were generated"));
    }
    Ok(Value::Array(cards))
}

fn first_text(_ctx: &PhaseContext, outputs: &[PhaseOutput]) -> Result<Value, PipelineError> {
    outputs
        .iter()
        .filter_map(|o| o.extraction.text())
        .find(|t| !t.trim().is_empty())
        .map(|t| Value::String(t.to_string()))
        .ok_or_else(|| PipelineError::reduce("synthesis unavailable"))
}

/// Use case for running crowd scoring
pub struct CrowdScoringUseCase {
    pipeline: PhasePipeline,
    budgets: CallBudgets,
    params: ScoringParams,
}

impl CrowdScoringUseCase {
    pub fn new(pipeline: PhasePipeline) -> Self {
        Self {
            pipeline,
            budgets: CallBudgets::default(),
            params: ScoringParams::default(),
        }
    }

    pub fn with_budgets(mut self, budgets: CallBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    pub fn with_params(mut self, params: ScoringParams) -> Self {
        self.params = params;
        self
    }

    pub async fn execute(
        &self,
        input: CrowdScoringInput,
    ) -> Result<CrowdScoringOutcome, PipelineError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: CrowdScoringInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<CrowdScoringOutcome, PipelineError> {
        let mut session = self.pipeline.start(input.challenge, input.participants)?;

        // ==================== Generate ====================
        let generate = PhaseSpec::new(
            GENERATE,
            ModelTier::Deep,
            self.budgets.deep_tokens,
            ResponseShape::Object,
            |ctx: &PhaseContext, p: &Participant| {
                PromptTemplate::idea_card(ctx.topic().content(), p)
            },
        )
        .with_reasoning_budget(self.budgets.reasoning_tokens)
        .with_reducer(require_ideas);
        self.pipeline
            .run_phase(&mut session, &generate, progress)
            .await?;

        let mut items: Vec<ScoredItem> = session
            .run()
            .phase(GENERATE)
            .map(|record| {
                record
                    .outputs
                    .iter()
                    .filter_map(|o| o.extraction.value().map(|v| (o, v)))
                    .enumerate()
                    .map(|(i, (o, v))| {
                        ScoredItem::new(format!("idea-{}", i + 1), o.participant.clone(), v.clone())
                    })
                    .collect()
            })
            .unwrap_or_default();
        info!("{} idea cards to score", items.len());

        // ==================== Score ====================
        let targets = items
            .iter()
            .map(|i| Target::new(i.id.clone(), i.author.id()))
            .collect();
        let mut assigner =
            RoundRobinAssigner::new(session.context().participants().to_vec(), targets);
        let mut rng = match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let dimensions = self.params.dimension_refs();

        let mut rounds_run = 0;
        for round in 1..=self.params.rounds {
            let assignments = assigner.next_round(&mut rng);
            if assignments.is_empty() {
                info!("No eligible cards left after {} rounds", rounds_run);
                break;
            }

            // scorer id -> (target id, card text)
            let assigned: HashMap<String, (String, String)> = assignments
                .iter()
                .filter_map(|a| {
                    let item = items.iter().find(|i| i.id == a.target_id)?;
                    Some((
                        a.scorer.id().to_string(),
                        (a.target_id.clone(), card_text(&item.content)),
                    ))
                })
                .collect();
            let cards: HashMap<String, String> = assigned
                .iter()
                .map(|(scorer, (_, text))| (scorer.clone(), text.clone()))
                .collect();

            let name = round_phase(round);
            let (rubric, scale) = (self.params.dimensions.clone(), self.params.scale);
            let spec = PhaseSpec::new(
                name.as_str(),
                ModelTier::Cheap,
                self.budgets.cheap_tokens,
                ResponseShape::Object,
                move |ctx: &PhaseContext, p: &Participant| {
                    let rubric: Vec<&str> = rubric.iter().map(String::as_str).collect();
                    PromptTemplate::score_card(
                        ctx.topic().content(),
                        cards.get(p.id()).map(String::as_str).unwrap_or_default(),
                        &rubric,
                        scale,
                    )
                },
            )
            .with_participants(assignments.iter().map(|a| a.scorer.clone()).collect());
            self.pipeline.run_phase(&mut session, &spec, progress).await?;
            rounds_run = round;

            let outputs = session
                .run()
                .phase(&name)
                .map(|r| r.outputs.clone())
                .unwrap_or_default();
            for output in outputs {
                let scorer = output.participant;
                let card = match output.extraction.value() {
                    Some(v) => ScoreCard::from_json(scorer.clone(), v, &dimensions, self.params.scale),
                    None => {
                        warn!("{} round {}: neutral score substituted", scorer, round);
                        ScoreCard::neutral(scorer.clone(), &dimensions, self.params.scale)
                    }
                };
                let Some((target_id, _)) = assigned.get(scorer.id()) else {
                    continue;
                };
                if let Some(item) = items.iter_mut().find(|i| &i.id == target_id)
                    && let Err(e) = item.add_score(card)
                {
                    warn!("Score discarded: {}", e);
                }
            }
        }

        rank_items(&mut items, &self.params.composite);
        let selected = mark_top_quartile(&mut items);
        info!("{} of {} ideas in the top quartile", selected, items.len());

        // ==================== Synthesize ====================
        let spread_dimension = self
            .params
            .composite
            .dimensions()
            .first()
            .copied()
            .unwrap_or("overall")
            .to_string();
        let summary = ranked_summary(&items, &spread_dimension);
        let synthesize = PhaseSpec::new(
            SYNTHESIZE,
            ModelTier::Deep,
            self.budgets.deep_tokens,
            ResponseShape::Raw,
            move |ctx: &PhaseContext, _: &Participant| {
                PromptTemplate::crowd_synthesis(ctx.topic().content(), &summary)
            },
        )
        .with_participants(vec![Participant::system()])
        .with_reducer(first_text)
        .on_failure(FailurePolicy::Substitute(Value::String(String::new())));
        let briefing = self
            .pipeline
            .run_phase(&mut session, &synthesize, progress)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string();

        let portfolio = section(&briefing, PORTFOLIO).filter(|p| !p.is_empty());

        let ranked = serde_json::to_value(&items).map_err(|e| PipelineError::reduce(e.to_string()))?;
        session.set_output(json!({
            "items": ranked,
            "briefing": briefing,
            "portfolio": portfolio,
        }));

        Ok(CrowdScoringOutcome {
            items,
            briefing,
            portfolio,
            rounds_run,
            pipeline: session.finish(),
        })
    }
}
