//! Prompt templates for the escalation, crowd scoring and dot vote flows

use crate::core::participant::Participant;
use crate::scoring::RubricScale;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

/// `### name\ntext` blocks separated by blank lines
fn labelled_block<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    entries
        .into_iter()
        .map(|(name, text)| format!("### {}\n{}", name, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// What a scorer is asked about each rubric dimension
fn rubric_question(dimension: &str) -> String {
    match dimension {
        "boldness" => "is this a genuinely non-obvious, high-upside idea?".to_string(),
        "feasibility" => "can this realistically be executed?".to_string(),
        "impact" => "if successful, how much does this move the needle?".to_string(),
        "overall" => {
            "your gut judgment of whether this idea belongs in the top 25%".to_string()
        }
        "severity" => "how bad is the outcome if this goes wrong?".to_string(),
        "likelihood" => "how likely is it to go wrong?".to_string(),
        other => format!("how strongly does this idea rate on {}?", other),
    }
}

fn speaker(participant: &Participant) -> String {
    match participant.persona() {
        Some(persona) => format!("You are {}. {}", participant.id(), persona),
        None => format!("You are {}.", participant.id()),
    }
}

impl PromptTemplate {
    // ==================== Escalation ====================

    /// T1: a single direct answer
    pub fn single_answer(question: &str) -> String {
        format!(
            r#"You are a senior strategic advisor. Answer the following question directly and thoroughly.

Question:
{}

Provide a clear, well-structured response covering key considerations, risks, and recommendations."#,
            question
        )
    }

    /// T1: confidence evaluation of the single answer
    pub fn confidence_check(question: &str, response: &str) -> String {
        format!(
            r#"You are a response quality evaluator. Given a strategic question and a single response, assess how confident you are that this response is complete, accurate, and sufficient.

Question:
{}

Response:
{}

Evaluate completeness, accuracy, nuance, and actionability.

Respond in JSON:
{{
  "confidence": <0-100>,
  "reasoning": "<2-3 sentences explaining the assessment>"
}}"#,
            question, response
        )
    }

    /// T2: one participant's perspective
    pub fn perspective(question: &str, participant: &Participant) -> String {
        format!(
            r#"{}

Answer the following strategic question from your professional perspective.

Question:
{}

Provide a thorough analysis from your area of expertise."#,
            speaker(participant),
            question
        )
    }

    /// T2: merge perspectives and score consensus
    pub fn consensus_synthesis(question: &str, responses: &[(String, String)]) -> String {
        let block = labelled_block(responses.iter().map(|(n, t)| (n.as_str(), t.as_str())));
        format!(
            r#"You are a synthesis engine. Given multiple expert perspectives on a strategic question, merge them into a single coherent response and assess the degree of consensus.

Question:
{}

Expert responses:
{}

Respond in JSON:
{{
  "synthesis": "<the merged response>",
  "consensus_score": <0.0-1.0, where 1.0 = perfect agreement>,
  "reasoning": "<explain areas of agreement and disagreement>"
}}"#,
            question, block
        )
    }

    /// T3: rebuttal seeing own answer, the synthesis and everyone else's answer
    pub fn rebuttal(
        question: &str,
        participant: &Participant,
        own_response: &str,
        synthesis: &str,
        others: &[(String, String)],
    ) -> String {
        let block = labelled_block(
            others
                .iter()
                .filter(|(name, _)| name != participant.id())
                .map(|(n, t)| (n.as_str(), t.as_str())),
        );
        format!(
            r#"{}

You previously answered a strategic question along with other experts. Review the synthesis and other perspectives, then provide a rebuttal or refinement.

Question:
{}

Your previous response:
{}

Synthesis of all responses:
{}

Other expert responses:
{}

Challenge weak points, reinforce strong ones, and add anything that was missed."#,
            speaker(participant),
            question,
            own_response,
            synthesis,
            block
        )
    }

    /// T3: oversight across every tier
    pub fn oversight(
        question: &str,
        single_response: &str,
        synthesis: &str,
        rebuttals: &[(String, String)],
    ) -> String {
        let block = labelled_block(rebuttals.iter().map(|(n, t)| (n.as_str(), t.as_str())));
        format!(
            r#"You are an oversight agent responsible for quality and safety review. Given a strategic question and the full deliberation history, assess whether the final answer is safe to deliver or should be flagged for human review.

Question:
{}

Tier 1 response:
{}

Tier 2 synthesis:
{}

Tier 3 rebuttals:
{}

Check for factual consistency across tiers, unresolved contradictions, high-risk recommendations without caveats, and missing perspectives.

Respond in JSON:
{{
  "passes_safety_check": <true|false>,
  "final_response": "<the best response to deliver, incorporating all tiers>",
  "flag_reason": "<if not passing, why human review is needed; null if passing>",
  "confidence": <0-100>
}}"#,
            question, single_response, synthesis, block
        )
    }

    // ==================== Crowd scoring ====================

    /// One bold idea card per participant
    pub fn idea_card(challenge: &str, participant: &Participant) -> String {
        format!(
            r#"{}

You are participating in a crowd-sourcing exercise. Write ONE bold, actionable idea that addresses the challenge below.

- One idea only: your single best, boldest recommendation
- Be specific: what, how, estimated effort, expected outcome
- Concise enough to evaluate in 30 seconds

Respond in JSON:
{{"title": "<5-10 word title>", "idea": "<2-4 sentences>", "bold_because": "<why this is non-obvious>"}}

THE CHALLENGE:
{}"#,
            speaker(participant),
            challenge
        )
    }

    /// Anonymous scoring of one idea card on the given rubric
    pub fn score_card(
        challenge: &str,
        idea_card: &str,
        dimensions: &[&str],
        scale: RubricScale,
    ) -> String {
        let rubric = dimensions
            .iter()
            .map(|d| format!("- {}: {}", d, rubric_question(d)))
            .collect::<Vec<_>>()
            .join("\n");
        let fields = dimensions
            .iter()
            .map(|d| format!("\"{}\": N", d))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"You are scoring an anonymous idea card. You do NOT know who wrote it. Score each dimension on a {} scale (N between {} and {}):

{}

Output as JSON:
{{{}, "one_line_reaction": "..."}}

THE CHALLENGE CONTEXT:
{}

THE IDEA CARD:
{}"#,
            scale.label(),
            scale.min,
            scale.max,
            rubric,
            fields,
            challenge,
            idea_card
        )
    }

    /// Strategic briefing over ranked results
    pub fn crowd_synthesis(challenge: &str, ranked_results: &str) -> String {
        format!(
            r#"You are synthesizing a crowd-sourcing exercise in which participants generated bold ideas and then scored each other's ideas anonymously over several rounds.

Using the ranked results below, produce a briefing with:

## Top Ideas
Why each winner scored well.

## Scoring Patterns
Where scorers agreed and where they split.

## Bold vs. Safe
Ideas that scored high on boldness but lower on feasibility.

## Recommended Portfolio
2-3 ideas to pursue together, and why.

Use exactly these four headings.

THE ORIGINAL CHALLENGE:
{}

RANKED RESULTS:
{}"#,
            challenge, ranked_results
        )
    }

    // ==================== Dot vote ====================

    /// Rapid generation of short ideas
    pub fn rapid_ideas(question: &str, participant: &Participant, count: usize) -> String {
        format!(
            r#"{}

Generate exactly {} distinct, short ideas (one sentence each) for the question below. Quantity and variety over polish.

Respond with a JSON array of strings:
["idea one", "idea two", ...]

Question:
{}"#,
            speaker(participant),
            count,
            question
        )
    }

    /// Vote for ideas other than your own
    pub fn dot_vote(
        question: &str,
        participant: &Participant,
        candidates: &[String],
        own_ideas: &[String],
        votes: usize,
    ) -> String {
        let candidates_block = candidates
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n");
        let own_block = if own_ideas.is_empty() {
            "  (none)".to_string()
        } else {
            own_ideas
                .iter()
                .map(|i| format!("  - {}", i))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            r#"{}

Cast exactly {} votes for the most promising ideas below. You may NOT vote for your own ideas:
{}

Question:
{}

Candidate ideas:
{}

Respond in JSON, copying each idea text exactly:
{{"votes": [{{"idea": "<idea text>", "reason": "<one line>"}}]}}"#,
            speaker(participant),
            votes,
            own_block,
            question,
            candidates_block
        )
    }

    /// Rank the tied or leading ideas from best to worst
    pub fn runoff_ranking(question: &str, participant: &Participant, options: &[String]) -> String {
        let options_block = options
            .iter()
            .map(|o| format!("- {}", o))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"{}

Rank ALL {} options below from best (first) to worst (last) as answers to the question.

Question:
{}

Options:
{}

Respond in JSON, copying each option text exactly:
{{"ranking": ["<best option>", "...", "<worst option>"]}}"#,
            speaker(participant),
            options.len(),
            question,
            options_block
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuttal_excludes_own_answer_from_others() {
        let cfo = Participant::with_persona("CFO", "You watch the money.");
        let others = vec![
            ("CEO".to_string(), "grow".to_string()),
            ("CFO".to_string(), "save".to_string()),
            ("CTO".to_string(), "build".to_string()),
        ];
        let prompt = PromptTemplate::rebuttal("q?", &cfo, "save", "grow carefully", &others);
        assert!(prompt.starts_with("You are CFO. You watch the money."));
        assert!(prompt.contains("### CEO\ngrow"));
        assert!(prompt.contains("### CTO\nbuild"));
        assert!(!prompt.contains("### CFO"));
        assert!(prompt.contains("Your previous response:\nsave"));
    }

    #[test]
    fn test_json_braces_survive_formatting() {
        let prompt = PromptTemplate::confidence_check("q", "r");
        assert!(prompt.contains("\"confidence\": <0-100>"));
        assert!(prompt.contains("{\n"));
    }

    #[test]
    fn test_score_card_renders_rubric_and_scale() {
        let prompt = PromptTemplate::score_card(
            "c",
            "card",
            &["severity", "likelihood"],
            RubricScale::new(1.0, 10.0),
        );
        assert!(prompt.contains("on a 1-10 scale"));
        assert!(prompt.contains("- severity: how bad"));
        assert!(prompt.contains("{\"severity\": N, \"likelihood\": N, \"one_line_reaction\": \"...\"}"));
        assert!(!prompt.contains("boldness"));

        let custom = PromptTemplate::score_card("c", "card", &["novelty"], RubricScale::default());
        assert!(custom.contains("- novelty: how strongly does this idea rate on novelty?"));
        assert!(custom.contains("on a 1-5 scale"));
    }

    #[test]
    fn test_runoff_lists_every_option() {
        let p = Participant::new("CEO");
        let prompt = PromptTemplate::runoff_ranking("q", &p, &["x".to_string(), "y".to_string()]);
        assert!(prompt.contains("Rank ALL 2 options"));
        assert!(prompt.contains("- x\n- y"));
        assert!(prompt.contains("{\"ranking\": ["));
    }

    #[test]
    fn test_dot_vote_lists_own_ideas() {
        let p = Participant::new("CTO");
        let prompt = PromptTemplate::dot_vote(
            "q",
            &p,
            &["a".to_string(), "b".to_string()],
            &[],
            3,
        );
        assert!(prompt.starts_with("You are CTO."));
        assert!(prompt.contains("(none)"));
        assert!(prompt.contains("- a\n- b"));
    }
}
