//! Run Escalation use case
//!
//! Confidence-gated tiers, cheapest first:
//!
//! 1. one deep answer, then a cheap confidence check
//! 2. a deep answer per participant, then a cheap synthesis with a
//!    consensus score
//! 3. a deep rebuttal per participant, then a cheap oversight review
//!
//! A tier that clears its threshold ends the run. T3 always ends it; a
//! failed safety check flags the run for human review but the oversight's
//! answer is still returned.

use super::phase_pipeline::{PhaseContext, PhasePipeline, PhaseSpec, PipelineError};
use crate::config::CallBudgets;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use deliberation_domain::{
    ConfidenceVerdict, DomainError, EscalationRun, EscalationThresholds, ModelTier,
    OversightVerdict, Participant, PipelineRun, PromptTemplate, ResponseShape, SynthesisVerdict,
    Tier, TierResult, Topic,
};
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

const T1_ANSWER: &str = "tier1.answer";
const T1_EVALUATE: &str = "tier1.evaluate";
const T2_PERSPECTIVES: &str = "tier2.perspectives";
const T2_SYNTHESIS: &str = "tier2.synthesis";
const T3_REBUTTAL: &str = "tier3.rebuttal";
const T3_OVERSIGHT: &str = "tier3.oversight";

/// Errors that prevent an escalation from running
///
/// A failed safety check is not an error; it is reported through
/// [`EscalationRun::flagged_for_human`].
#[derive(Error, Debug)]
pub enum EscalationError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Input for the escalation use case
#[derive(Debug, Clone)]
pub struct EscalationInput {
    pub topic: Topic,
    pub participants: Vec<Participant>,
}

impl EscalationInput {
    pub fn new(topic: Topic, participants: Vec<Participant>) -> Self {
        Self {
            topic,
            participants,
        }
    }
}

/// Tier results plus the phase-level record of every call made
#[derive(Debug, Clone)]
pub struct EscalationOutcome {
    pub escalation: EscalationRun,
    pub pipeline: PipelineRun,
}

/// One participant's answer read back from a phase value
struct Answer {
    participant: String,
    text: String,
    failed: bool,
}

fn answers(value: Option<&Value>) -> Vec<Answer> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|e| Answer {
                    participant: e["participant"].as_str().unwrap_or_default().to_string(),
                    text: e["value"].as_str().unwrap_or_default().to_string(),
                    failed: e["failed"].as_bool().unwrap_or(true),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `(participant, text)` pairs of the answers that came back
fn delivered(value: Option<&Value>) -> Vec<(String, String)> {
    answers(value)
        .into_iter()
        .filter(|a| !a.failed)
        .map(|a| (a.participant, a.text))
        .collect()
}

fn first_text(value: Option<&Value>) -> String {
    answers(value)
        .into_iter()
        .find(|a| !a.failed)
        .map(|a| a.text)
        .unwrap_or_default()
}

/// Use case for running a tiered escalation
pub struct RunEscalationUseCase {
    pipeline: PhasePipeline,
    budgets: CallBudgets,
    thresholds: EscalationThresholds,
}

impl RunEscalationUseCase {
    pub fn new(pipeline: PhasePipeline) -> Self {
        Self {
            pipeline,
            budgets: CallBudgets::default(),
            thresholds: EscalationThresholds::default(),
        }
    }

    pub fn with_budgets(mut self, budgets: CallBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    pub fn with_thresholds(mut self, thresholds: EscalationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: EscalationInput,
    ) -> Result<EscalationOutcome, EscalationError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: EscalationInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<EscalationOutcome, EscalationError> {
        let mut session = self
            .pipeline
            .start(input.topic.clone(), input.participants)?;
        let mut run = EscalationRun::new(session.context().run_id(), input.topic);
        let system = vec![Participant::system()];

        // ==================== T1: single answer ====================
        progress.on_tier_start(Tier::Single);
        let started = Instant::now();

        let answer_spec = PhaseSpec::new(
            T1_ANSWER,
            ModelTier::Deep,
            self.budgets.deep_tokens,
            ResponseShape::Raw,
            |ctx: &PhaseContext, _: &Participant| {
                PromptTemplate::single_answer(ctx.topic().content())
            },
        )
        .with_participants(system.clone());
        let answer_value = self
            .pipeline
            .run_phase(&mut session, &answer_spec, progress)
            .await?;
        let answer = first_text(Some(&answer_value));

        let verdict = if answer.is_empty() {
            ConfidenceVerdict {
                confidence: 0,
                reasoning: "single response unavailable".to_string(),
            }
        } else {
            let evaluate_spec = PhaseSpec::new(
                T1_EVALUATE,
                ModelTier::Cheap,
                self.budgets.cheap_tokens,
                ResponseShape::Raw,
                |ctx: &PhaseContext, _: &Participant| {
                    PromptTemplate::confidence_check(
                        ctx.topic().content(),
                        &first_text(ctx.output(T1_ANSWER)),
                    )
                },
            )
            .with_participants(system.clone());
            let value = self
                .pipeline
                .run_phase(&mut session, &evaluate_spec, progress)
                .await?;
            ConfidenceVerdict::from_text(&first_text(Some(&value)))
        };

        let t1 = TierResult {
            tier: Tier::Single,
            response: answer,
            confidence: verdict.confidence,
            reasoning: verdict.reasoning,
            duration: started.elapsed(),
        };
        if self.settle(&mut run, t1, progress)? {
            return Ok(Self::outcome(run, session.finish()));
        }

        // ==================== T2: consensus ====================
        progress.on_tier_start(Tier::Consensus);
        let started = Instant::now();

        let perspectives_spec = PhaseSpec::new(
            T2_PERSPECTIVES,
            ModelTier::Deep,
            self.budgets.deep_tokens,
            ResponseShape::Raw,
            |ctx: &PhaseContext, p: &Participant| {
                PromptTemplate::perspective(ctx.topic().content(), p)
            },
        );
        self.pipeline
            .run_phase(&mut session, &perspectives_spec, progress)
            .await?;

        let synthesis_spec = PhaseSpec::new(
            T2_SYNTHESIS,
            ModelTier::Cheap,
            self.budgets.deep_tokens,
            ResponseShape::Raw,
            |ctx: &PhaseContext, _: &Participant| {
                PromptTemplate::consensus_synthesis(
                    ctx.topic().content(),
                    &delivered(ctx.output(T2_PERSPECTIVES)),
                )
            },
        )
        .with_participants(system.clone());
        let value = self
            .pipeline
            .run_phase(&mut session, &synthesis_spec, progress)
            .await?;
        let synthesis = SynthesisVerdict::from_text(&first_text(Some(&value)));

        let t2 = TierResult {
            tier: Tier::Consensus,
            response: synthesis.synthesis.clone(),
            confidence: synthesis.confidence(),
            reasoning: synthesis.reasoning.clone(),
            duration: started.elapsed(),
        };
        if self.settle_consensus(&mut run, t2, synthesis.consensus_score, progress)? {
            return Ok(Self::outcome(run, session.finish()));
        }

        // ==================== T3: rebuttal + oversight ====================
        progress.on_tier_start(Tier::Oversight);
        let started = Instant::now();

        let synthesis_text = synthesis.synthesis.clone();
        let rebuttal_spec = PhaseSpec::new(
            T3_REBUTTAL,
            ModelTier::Deep,
            self.budgets.deep_tokens,
            ResponseShape::Raw,
            move |ctx: &PhaseContext, p: &Participant| {
                let perspectives = answers(ctx.output(T2_PERSPECTIVES));
                let own = perspectives
                    .iter()
                    .find(|a| a.participant == p.id())
                    .map(|a| a.text.as_str())
                    .unwrap_or_default();
                let others: Vec<(String, String)> = perspectives
                    .iter()
                    .filter(|a| !a.failed && a.participant != p.id())
                    .map(|a| (a.participant.clone(), a.text.clone()))
                    .collect();
                PromptTemplate::rebuttal(ctx.topic().content(), p, own, &synthesis_text, &others)
            },
        );
        self.pipeline
            .run_phase(&mut session, &rebuttal_spec, progress)
            .await?;

        let synthesis_text = synthesis.synthesis.clone();
        let oversight_spec = PhaseSpec::new(
            T3_OVERSIGHT,
            ModelTier::Cheap,
            self.budgets.deep_tokens,
            ResponseShape::Raw,
            move |ctx: &PhaseContext, _: &Participant| {
                PromptTemplate::oversight(
                    ctx.topic().content(),
                    &first_text(ctx.output(T1_ANSWER)),
                    &synthesis_text,
                    &delivered(ctx.output(T3_REBUTTAL)),
                )
            },
        )
        .with_participants(system);
        let value = self
            .pipeline
            .run_phase(&mut session, &oversight_spec, progress)
            .await?;
        let oversight = OversightVerdict::from_text(&first_text(Some(&value)));

        let t3 = TierResult {
            tier: Tier::Oversight,
            response: oversight.final_response_or(&synthesis.synthesis),
            confidence: oversight.confidence,
            reasoning: format!(
                "Safety check: {}",
                if oversight.passes_safety_check {
                    "passed"
                } else {
                    "failed"
                }
            ),
            duration: started.elapsed(),
        };
        run.record(t3.clone())?;
        progress.on_tier_complete(&t3, oversight.passes_safety_check);
        if oversight.passes_safety_check {
            run.accept();
        } else {
            info!("Escalation flagged for human review");
            run.flag(oversight.reported_flag_reason());
        }

        Ok(Self::outcome(run, session.finish()))
    }

    /// Record T1 and report whether its confidence ends the run
    fn settle(
        &self,
        run: &mut EscalationRun,
        result: TierResult,
        progress: &dyn ProgressNotifier,
    ) -> Result<bool, EscalationError> {
        let accepted = self.thresholds.accepts_confidence(result.confidence);
        info!(
            "{} confidence {} (threshold {}): {}",
            result.tier,
            result.confidence,
            self.thresholds.confidence(),
            if accepted { "accepted" } else { "escalating" }
        );
        run.record(result.clone())?;
        progress.on_tier_complete(&result, accepted);
        if accepted {
            run.accept();
        }
        Ok(accepted)
    }

    /// Record T2 and report whether its consensus ends the run
    fn settle_consensus(
        &self,
        run: &mut EscalationRun,
        result: TierResult,
        consensus: f64,
        progress: &dyn ProgressNotifier,
    ) -> Result<bool, EscalationError> {
        let accepted = self.thresholds.accepts_consensus(consensus);
        info!(
            "{} consensus {:.2} (threshold {:.2}): {}",
            result.tier,
            consensus,
            self.thresholds.consensus(),
            if accepted { "accepted" } else { "escalating" }
        );
        run.record(result.clone())?;
        progress.on_tier_complete(&result, accepted);
        if accepted {
            run.accept();
        }
        Ok(accepted)
    }

    fn outcome(escalation: EscalationRun, pipeline: PipelineRun) -> EscalationOutcome {
        EscalationOutcome {
            escalation,
            pipeline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelRoster;
    use crate::ports::reasoning_engine::EngineError;
    use crate::testing::ScriptedEngine;
    use crate::use_cases::remote_call::RemoteCallExecutor;
    use std::sync::{Arc, Mutex};

    /// Scripted answers keyed on which prompt is being sent
    fn engine(
        confidence: &'static str,
        synthesis: &'static str,
        oversight: &'static str,
    ) -> Arc<ScriptedEngine> {
        Arc::new(ScriptedEngine::new(move |_, req| {
            let p = &req.prompt;
            Ok(if p.contains("response quality evaluator") {
                confidence.to_string()
            } else if p.contains("synthesis engine") {
                synthesis.to_string()
            } else if p.contains("oversight agent") {
                oversight.to_string()
            } else if p.contains("rebuttal") {
                format!("rebuttal from {}", req.persona.as_deref().unwrap_or("?"))
            } else {
                "a considered answer".to_string()
            })
        }))
    }

    fn use_case(engine: Arc<ScriptedEngine>) -> RunEscalationUseCase {
        RunEscalationUseCase::new(PhasePipeline::new(RemoteCallExecutor::new(
            engine,
            ModelRoster::default(),
        )))
    }

    fn input() -> EscalationInput {
        EscalationInput::new(
            Topic::new("Should we acquire our largest competitor?").unwrap(),
            Participant::default_panel(),
        )
    }

    #[derive(Default)]
    struct TierLog(Mutex<Vec<(u8, bool)>>);

    impl ProgressNotifier for TierLog {
        fn on_phase_start(&self, _: &str, _: usize) {}
        fn on_task_complete(&self, _: &str, _: &Participant, _: bool) {}
        fn on_phase_complete(&self, _: &str) {}
        fn on_tier_complete(&self, result: &TierResult, accepted: bool) {
            self.0.lock().unwrap().push((result.tier.number(), accepted));
        }
    }

    #[tokio::test]
    async fn test_confident_single_answer_stops_at_tier_one() {
        let engine = engine(r#"{"confidence": 92, "reasoning": "complete"}"#, "", "");
        let outcome = use_case(engine.clone()).execute(input()).await.unwrap();

        let run = &outcome.escalation;
        assert_eq!(run.final_tier(), Some(Tier::Single));
        assert_eq!(run.final_response(), "a considered answer");
        assert!(!run.flagged_for_human());
        assert_eq!(engine.call_count(), 2);
        assert_eq!(outcome.pipeline.phases().len(), 2);
    }

    #[tokio::test]
    async fn test_low_confidence_then_consensus_stops_at_tier_two() {
        let engine = engine(
            r#"{"confidence": 60, "reasoning": "thin"}"#,
            r#"Here you go: {"synthesis": "merged view", "consensus_score": 0.75, "reasoning": "aligned"}"#,
            "",
        );
        let log = TierLog::default();
        let outcome = use_case(engine.clone())
            .execute_with_progress(input(), &log)
            .await
            .unwrap();

        let run = &outcome.escalation;
        assert_eq!(run.final_tier(), Some(Tier::Consensus));
        assert!(!run.flagged_for_human());
        assert_eq!(run.final_response(), "merged view");
        assert_eq!(run.tiers()[0].confidence, 60);
        assert_eq!(run.tiers()[1].confidence, 75);
        assert_eq!(*log.0.lock().unwrap(), vec![(1, false), (2, true)]);
        // answer + evaluate + 3 perspectives + synthesis
        assert_eq!(engine.call_count(), 6);
    }

    #[tokio::test]
    async fn test_failed_oversight_flags_but_returns_answer() {
        let engine = engine(
            r#"{"confidence": 10}"#,
            r#"{"synthesis": "split view", "consensus_score": 0.3}"#,
            r#"{"passes_safety_check": false, "final_response": "proceed with caveats", "flag_reason": "unresolved legal risk", "confidence": 55}"#,
        );
        let log = TierLog::default();
        let outcome = use_case(engine.clone())
            .execute_with_progress(input(), &log)
            .await
            .unwrap();

        let run = &outcome.escalation;
        assert_eq!(run.final_tier(), Some(Tier::Oversight));
        assert!(run.flagged_for_human());
        assert_eq!(run.flag_reason(), Some("unresolved legal risk"));
        assert_eq!(run.final_response(), "proceed with caveats");
        let tiers: Vec<u8> = run.tiers().iter().map(|t| t.tier.number()).collect();
        assert_eq!(tiers, vec![1, 2, 3]);
        assert_eq!(
            *log.0.lock().unwrap(),
            vec![(1, false), (2, false), (3, false)]
        );

        // rebuttals see their own answer and the synthesis
        let prompts = engine.prompts();
        let rebuttal = prompts.iter().find(|p| p.contains("rebuttal")).unwrap();
        assert!(rebuttal.contains("split view"));
    }

    #[tokio::test]
    async fn test_unparseable_oversight_falls_back_to_synthesis_and_flags() {
        let engine = engine(
            "not sure",
            r#"{"synthesis": "best effort", "consensus_score": 0.1}"#,
            "I could not decide.",
        );
        let outcome = use_case(engine).execute(input()).await.unwrap();
        let run = &outcome.escalation;
        assert_eq!(run.final_tier(), Some(Tier::Oversight));
        assert!(run.flagged_for_human());
        assert_eq!(run.final_response(), "best effort");
    }

    #[tokio::test]
    async fn test_participant_failure_is_isolated_in_tier_two() {
        let engine = Arc::new(ScriptedEngine::new(|_, req| {
            let p = &req.prompt;
            if p.contains("response quality evaluator") {
                Ok(r#"{"confidence": 0}"#.to_string())
            } else if p.contains("synthesis engine") {
                Ok(r#"{"synthesis": "two voices", "consensus_score": 0.9}"#.to_string())
            } else if p.starts_with("You are CFO") {
                Err(EngineError::Timeout)
            } else {
                Ok("answer".to_string())
            }
        }));
        let outcome = use_case(engine.clone()).execute(input()).await.unwrap();
        assert_eq!(outcome.escalation.final_tier(), Some(Tier::Consensus));

        let prompts = engine.prompts();
        let synthesis = prompts
            .iter()
            .find(|p| p.contains("synthesis engine"))
            .unwrap();
        assert!(synthesis.contains("### CEO"));
        assert!(!synthesis.contains("### CFO"));
        let perspectives = outcome.pipeline.phase(T2_PERSPECTIVES).unwrap();
        assert_eq!(perspectives.failed_participants(), vec!["CFO"]);
    }

    #[tokio::test]
    async fn test_custom_thresholds() {
        let engine = engine(r#"{"confidence": 60}"#, "", "");
        let outcome = use_case(engine)
            .with_thresholds(EscalationThresholds::new(50, 0.7).unwrap())
            .execute(input())
            .await
            .unwrap();
        assert_eq!(outcome.escalation.final_tier(), Some(Tier::Single));
    }

    #[tokio::test]
    async fn test_no_participants() {
        let engine = engine("", "", "");
        let err = use_case(engine)
            .execute(EscalationInput::new(Topic::new("q").unwrap(), vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EscalationError::Pipeline(PipelineError::NoParticipants)
        ));
    }
}
