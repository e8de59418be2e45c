//! Dot vote use case
//!
//! Participants list short ideas, then each casts a few votes for ideas
//! that are not their own. Votes are matched back to the listed ideas;
//! unknown ideas, own ideas and votes past the allowance are discarded.
//! The tally keeps the top three plus anything tied with third place, up
//! to five. With the runoff enabled and more than one winner, every
//! participant then ranks the winners and a Borda count orders them.

use super::phase_pipeline::{PhaseContext, PhasePipeline, PhaseSpec, PipelineError};
use crate::config::{CallBudgets, DotVoteParams};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use deliberation_domain::{
    BordaResult, ModelTier, Participant, PhaseOutput, PipelineRun, PromptTemplate, RankedBallot,
    ResponseShape, Topic, VoteTally, borda_count, match_option,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

const GENERATE: &str = "generate";
const VOTE: &str = "vote";
const RUNOFF: &str = "runoff";

/// One listed idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Idea {
    pub author: String,
    pub text: String,
}

/// Input for the dot vote use case
#[derive(Debug, Clone)]
pub struct DotVoteInput {
    pub question: Topic,
    pub participants: Vec<Participant>,
}

impl DotVoteInput {
    pub fn new(question: Topic, participants: Vec<Participant>) -> Self {
        Self {
            question,
            participants,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DotVoteOutcome {
    pub ideas: Vec<Idea>,
    pub tally: VoteTally,
    pub winners: Vec<String>,
    /// Votes that named an unknown idea, the voter's own idea, or went
    /// over the allowance
    pub discarded_votes: usize,
    /// Borda re-rank of the winners, when the runoff ran
    pub runoff: Option<BordaResult>,
    pub pipeline: PipelineRun,
}

/// Idea strings from a generate output, trimmed and capped
fn listed_ideas(value: &Value, cap: usize) -> Vec<String> {
    let mut ideas: Vec<String> = Vec::new();
    for idea in value.as_array().into_iter().flatten() {
        let Some(text) = idea.as_str().map(str::trim) else {
            continue;
        };
        if !text.is_empty() && !ideas.iter().any(|i| i == text) {
            ideas.push(text.to_string());
        }
    }
    ideas.truncate(cap);
    ideas
}

/// Raw vote texts: `{"votes": [..]}` entries may be strings or `{idea}`
fn vote_texts(value: &Value) -> Vec<String> {
    value
        .get("votes")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|v| {
            v.as_str()
                .or_else(|| v.get("idea").and_then(Value::as_str))
                .map(str::to_string)
        })
        .collect()
}

/// A ranking resolved against the options: unknown entries and repeats
/// are dropped, order is kept
fn resolve_ranking<'a>(value: &Value, options: &'a [String]) -> Vec<&'a str> {
    let mut ranked: Vec<&str> = Vec::new();
    let entries = value.get("ranking").and_then(Value::as_array);
    for text in entries.into_iter().flatten().filter_map(Value::as_str) {
        if let Some(option) = match_option(text, options)
            && !ranked.contains(&option)
        {
            ranked.push(option);
        }
    }
    ranked
}

fn require_ideas(_ctx: &PhaseContext, outputs: &[PhaseOutput]) -> Result<Value, PipelineError> {
    let any = outputs.iter().any(|o| {
        o.extraction
            .value()
            .and_then(Value::as_array)
            .is_some_and(|a| a.iter().any(|i| i.as_str().is_some_and(|s| !s.trim().is_empty())))
    });
    if !any {
        return Err(PipelineError::reduce("no ideas were generated"));
    }
    Ok(Value::Array(
        outputs
            .iter()
            .filter_map(|o| o.extraction.value().cloned())
            .collect(),
    ))
}

/// Use case for running a dot vote
pub struct DotVoteUseCase {
    pipeline: PhasePipeline,
    budgets: CallBudgets,
    params: DotVoteParams,
}

impl DotVoteUseCase {
    pub fn new(pipeline: PhasePipeline) -> Self {
        Self {
            pipeline,
            budgets: CallBudgets::default(),
            params: DotVoteParams::default(),
        }
    }

    pub fn with_budgets(mut self, budgets: CallBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    pub fn with_params(mut self, params: DotVoteParams) -> Self {
        self.params = params;
        self
    }

    pub async fn execute(&self, input: DotVoteInput) -> Result<DotVoteOutcome, PipelineError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: DotVoteInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<DotVoteOutcome, PipelineError> {
        let mut session = self.pipeline.start(input.question, input.participants)?;
        let per_participant = self.params.ideas_per_participant;

        // ==================== Generate ====================
        let generate = PhaseSpec::new(
            GENERATE,
            ModelTier::Deep,
            self.budgets.deep_tokens,
            ResponseShape::Array,
            move |ctx: &PhaseContext, p: &Participant| {
                PromptTemplate::rapid_ideas(ctx.topic().content(), p, per_participant)
            },
        )
        .with_reducer(require_ideas);
        self.pipeline
            .run_phase(&mut session, &generate, progress)
            .await?;

        let ideas: Vec<Idea> = session
            .run()
            .phase(GENERATE)
            .map(|record| {
                record
                    .outputs
                    .iter()
                    .filter_map(|o| o.extraction.value().map(|v| (o.participant.id(), v)))
                    .flat_map(|(author, v)| {
                        listed_ideas(v, per_participant)
                            .into_iter()
                            .map(move |text| Idea {
                                author: author.to_string(),
                                text,
                            })
                    })
                    .collect()
            })
            .unwrap_or_default();
        let candidates: Vec<String> = ideas.iter().fold(Vec::new(), |mut acc, i| {
            if !acc.contains(&i.text) {
                acc.push(i.text.clone());
            }
            acc
        });
        info!("{} distinct ideas up for vote", candidates.len());

        // ==================== Vote ====================
        let votes = self.params.votes_per_participant;
        let (ballot_ideas, ballot_candidates) = (ideas.clone(), candidates.clone());
        let vote = PhaseSpec::new(
            VOTE,
            ModelTier::Cheap,
            self.budgets.cheap_tokens,
            ResponseShape::Object,
            move |ctx: &PhaseContext, p: &Participant| {
                let own: Vec<String> = ballot_ideas
                    .iter()
                    .filter(|i| i.author == p.id())
                    .map(|i| i.text.clone())
                    .collect();
                PromptTemplate::dot_vote(ctx.topic().content(), p, &ballot_candidates, &own, votes)
            },
        );
        self.pipeline.run_phase(&mut session, &vote, progress).await?;

        let mut tally = VoteTally::default();
        let mut discarded = 0;
        let outputs = session
            .run()
            .phase(VOTE)
            .map(|r| r.outputs.clone())
            .unwrap_or_default();
        for output in &outputs {
            let voter = output.participant.id();
            let cast = output.extraction.value().map(vote_texts).unwrap_or_default();
            let mut accepted = 0;
            for text in &cast {
                let own = |idea: &str| ideas.iter().any(|i| i.author == voter && i.text == idea);
                match match_option(text, &candidates) {
                    Some(idea) if accepted < votes && !own(idea) => {
                        tally.add(idea);
                        accepted += 1;
                    }
                    _ => {
                        debug!("Discarded vote from {}: {}", voter, text);
                        discarded += 1;
                    }
                }
            }
        }

        let winners = tally.winners();
        info!(
            "{} votes counted, {} discarded, {} winners",
            tally.total_votes(),
            discarded,
            winners.len()
        );

        // ==================== Runoff ====================
        let runoff = if self.params.runoff && winners.len() > 1 {
            let options = winners.clone();
            let spec = PhaseSpec::new(
                RUNOFF,
                ModelTier::Deep,
                self.budgets.deep_tokens,
                ResponseShape::Object,
                move |ctx: &PhaseContext, p: &Participant| {
                    PromptTemplate::runoff_ranking(ctx.topic().content(), p, &options)
                },
            );
            self.pipeline.run_phase(&mut session, &spec, progress).await?;

            let ballots: Vec<RankedBallot> = session
                .run()
                .phase(RUNOFF)
                .into_iter()
                .flat_map(|r| r.outputs.iter())
                .filter_map(|o| {
                    let ranked = resolve_ranking(o.extraction.value()?, &winners);
                    (!ranked.is_empty()).then(|| RankedBallot::ordered(o.participant.id(), ranked))
                })
                .collect();
            let result = borda_count(&winners, &ballots);
            info!(
                "Runoff over {} ballots: {} leads by {}{}",
                ballots.len(),
                result.winner().unwrap_or("-"),
                result.margin(),
                if result.has_tie() { " (tied)" } else { "" }
            );
            Some(result)
        } else {
            None
        };

        session.set_output(json!({
            "tally": tally.ranked(),
            "winners": winners,
            "runoff": runoff,
        }));

        Ok(DotVoteOutcome {
            ideas,
            tally,
            winners,
            discarded_votes: discarded,
            runoff,
            pipeline: session.finish(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelRoster;
    use crate::testing::ScriptedEngine;
    use crate::use_cases::remote_call::RemoteCallExecutor;
    use std::sync::Arc;

    fn use_case(engine: Arc<ScriptedEngine>) -> DotVoteUseCase {
        DotVoteUseCase::new(PhasePipeline::new(RemoteCallExecutor::new(
            engine,
            ModelRoster::default(),
        )))
    }

    fn panel() -> Vec<Participant> {
        ["A", "B", "C", "D"]
            .iter()
            .map(|id| Participant::with_persona(*id, format!("persona {id}")))
            .collect()
    }

    fn input() -> DotVoteInput {
        DotVoteInput::new(Topic::new("How do we cut churn?").unwrap(), panel())
    }

    /// Each participant lists two ideas; votes are scripted per persona.
    fn engine() -> Arc<ScriptedEngine> {
        Arc::new(ScriptedEngine::new(|_, req| {
            let who = req
                .persona
                .as_deref()
                .and_then(|p| p.strip_prefix("persona "))
                .unwrap_or("?")
                .to_string();
            if req.prompt.contains("distinct, short ideas") {
                return Ok(format!(r#"["{who} one", "{who} two"]"#));
            }
            let votes = match who.as_str() {
                // own idea and an unknown one are discarded
                "A" => r#"["A one", "B one", "nonsense", "C one"]"#,
                "B" => r#"[{"idea": "a one", "reason": "x"}, {"idea": "C one"}, {"idea": "D one"}]"#,
                "C" => r#"["A one", "B one", "D one", "B two"]"#,
                _ => r#"["A one", "B one", "C one"]"#,
            };
            Ok(format!(r#"{{"votes": {votes}}}"#))
        }))
    }

    #[tokio::test]
    async fn test_dot_vote_tally_and_winners() {
        let outcome = use_case(engine()).execute(input()).await.unwrap();

        assert_eq!(outcome.ideas.len(), 8);
        assert_eq!(outcome.tally.count_of("A one"), 3);
        assert_eq!(outcome.tally.count_of("B one"), 3);
        assert_eq!(outcome.tally.count_of("C one"), 3);
        assert_eq!(outcome.tally.count_of("D one"), 2);
        assert_eq!(outcome.tally.count_of("B two"), 0);
        // A: own + unknown; C: fourth vote over the allowance
        assert_eq!(outcome.discarded_votes, 3);
        // three-way tie keeps first-vote order; D one falls below the cutoff
        assert_eq!(outcome.winners, vec!["B one", "C one", "A one"]);
        assert_eq!(outcome.pipeline.output().unwrap()["winners"][0], "B one");
    }

    #[tokio::test]
    async fn test_voting_is_cheap_and_shows_own_ideas() {
        let engine = engine();
        use_case(engine.clone()).execute(input()).await.unwrap();
        let calls = engine.calls.lock().unwrap();
        let votes: Vec<_> = calls
            .iter()
            .filter(|(_, r)| r.prompt.contains("Cast exactly"))
            .collect();
        assert_eq!(votes.len(), 4);
        assert!(votes.iter().all(|(_, r)| r.model_tier == ModelTier::Cheap));
        let b = votes
            .iter()
            .find(|(_, r)| r.persona.as_deref() == Some("persona B"))
            .unwrap();
        assert!(b.1.prompt.contains("  - B one\n  - B two"));
    }

    #[tokio::test]
    async fn test_ambiguous_votes_are_discarded() {
        let engine = Arc::new(ScriptedEngine::new(|_, req| {
            let who = req
                .persona
                .as_deref()
                .and_then(|p| p.strip_prefix("persona "))
                .unwrap_or("?")
                .to_string();
            if req.prompt.contains("distinct, short ideas") {
                return Ok(format!(r#"["{who} one", "{who} two"]"#));
            }
            // "one" fits four ideas and "two" fits four; "D tw" fits only "D two"
            let votes = if who == "A" {
                r#"["one", "two", "D tw"]"#
            } else {
                r#"["A one"]"#
            };
            Ok(format!(r#"{{"votes": {votes}}}"#))
        }));
        let outcome = use_case(engine).execute(input()).await.unwrap();

        assert_eq!(outcome.discarded_votes, 2);
        assert_eq!(outcome.tally.count_of("D two"), 1);
        assert_eq!(outcome.tally.count_of("A one"), 3);
        assert_eq!(outcome.tally.total_votes(), 4);
        assert!(outcome.runoff.is_none());
    }

    #[tokio::test]
    async fn test_runoff_reranks_winners() {
        let engine = Arc::new(ScriptedEngine::new(|_, req| {
            let who = req
                .persona
                .as_deref()
                .and_then(|p| p.strip_prefix("persona "))
                .unwrap_or("?")
                .to_string();
            let p = &req.prompt;
            if p.contains("distinct, short ideas") {
                return Ok(format!(r#"["{who} one", "{who} two"]"#));
            }
            if p.contains("Rank ALL") {
                // C one is everyone's first choice; D repeats itself and names an unknown
                let ranking = if who == "D" {
                    r#"["c one", "C one", "nothing", "A one"]"#
                } else {
                    r#"["C one", "B one", "A one"]"#
                };
                return Ok(format!(r#"{{"ranking": {ranking}}}"#));
            }
            let votes = match who.as_str() {
                "A" => r#"["B one", "C one"]"#,
                "B" => r#"["A one", "C one"]"#,
                "C" => r#"["A one", "B one"]"#,
                _ => r#"["A one", "B one", "C one"]"#,
            };
            Ok(format!(r#"{{"votes": {votes}}}"#))
        }));
        let params = DotVoteParams::default().with_runoff(true);
        let outcome = use_case(engine.clone())
            .with_params(params)
            .execute(input())
            .await
            .unwrap();

        assert_eq!(outcome.winners, vec!["B one", "C one", "A one"]);
        let runoff = outcome.runoff.as_ref().unwrap();
        // three ballots give C 2, B 1, A 0 each; D's ballot ranks C then A
        assert_eq!(
            runoff.scores,
            vec![
                ("C one".to_string(), 8),
                ("B one".to_string(), 3),
                ("A one".to_string(), 1)
            ]
        );
        assert_eq!(runoff.winner(), Some("C one"));
        assert_eq!(runoff.margin(), 5);
        assert!(!runoff.has_tie());
        assert_eq!(outcome.pipeline.output().unwrap()["runoff"]["top_tied"][0], "C one");

        let names: Vec<_> = outcome.pipeline.phases().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["generate", "vote", "runoff"]);
        let calls = engine.calls.lock().unwrap();
        let ranking: Vec<_> = calls.iter().filter(|(_, r)| r.prompt.contains("Rank ALL 3")).collect();
        assert_eq!(ranking.len(), 4);
        assert!(ranking.iter().all(|(_, r)| r.model_tier == ModelTier::Deep));
    }

    #[tokio::test]
    async fn test_runoff_skipped_for_single_winner() {
        let engine = Arc::new(ScriptedEngine::new(|_, req| {
            if req.prompt.contains("distinct, short ideas") {
                let who = req.persona.clone().unwrap_or_default();
                return Ok(format!(r#"["idea of {who}"]"#));
            }
            Ok(r#"{"votes": ["idea of persona A"]}"#.to_string())
        }));
        let outcome = use_case(engine.clone())
            .with_params(DotVoteParams::default().with_runoff(true))
            .execute(input())
            .await
            .unwrap();
        assert_eq!(outcome.winners.len(), 1);
        assert!(outcome.runoff.is_none());
        assert!(engine.prompts().iter().all(|p| !p.contains("Rank ALL")));
    }

    #[test]
    fn test_resolve_ranking_drops_unknown_and_repeats() {
        let options = vec!["Expand".to_string(), "Hold".to_string()];
        let v = json!({"ranking": ["hold", "Hold", "Sell", 4, "expand"]});
        assert_eq!(resolve_ranking(&v, &options), vec!["Hold", "Expand"]);
        assert!(resolve_ranking(&json!({}), &options).is_empty());
    }

    #[tokio::test]
    async fn test_no_ideas_aborts() {
        let engine = Arc::new(ScriptedEngine::constant("[]"));
        let err = use_case(engine).execute(input()).await.unwrap_err();
        assert!(matches!(err, PipelineError::PhaseAborted { .. }));
    }

    #[test]
    fn test_listed_ideas_caps_and_dedupes() {
        let v = json!(["x", " x ", "", 3, "y", "z"]);
        assert_eq!(listed_ideas(&v, 2), vec!["x", "y"]);
    }

    #[test]
    fn test_vote_texts_accepts_both_forms() {
        let v = json!({"votes": ["a", {"idea": "b"}, {"reason": "no idea"}]});
        assert_eq!(vote_texts(&v), vec!["a", "b"]);
    }
}
