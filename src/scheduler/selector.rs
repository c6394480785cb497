//! Model-driven hand-off
//!
//! After each turn a decision service is asked, once, which participant
//! should speak next. The previous speaker is never a candidate unless the
//! roster has a single member, and an answer that does not name exactly one
//! candidate is an error rather than a silent default.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::agent::{Agent, Transcript};
use crate::core::{AgoraError, ChatMessage, Message, Result};
use crate::llm::{GenerateOptions, LLMProvider};
use crate::scheduler::Scheduler;

/// A roster entry as presented to the decision service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    pub description: String,
}

/// Everything the decision service gets to see for one decision
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    /// The full roster, in registration order
    pub roster: Vec<Participant>,
    /// Names that may be chosen this turn
    pub candidates: Vec<String>,
    /// The transcript so far
    pub history: Vec<Message>,
}

impl SelectionRequest {
    /// Render the roster as `name: description` lines
    pub fn roles(&self) -> String {
        self.roster
            .iter()
            .map(|p| format!("{}: {}", p.name, p.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the history as `source: content` blocks
    pub fn conversation(&self) -> String {
        self.history
            .iter()
            .map(|m| format!("{}: {}", m.source, m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Oracle that names the next speaker
#[async_trait]
pub trait DecisionService: Send + Sync {
    /// Return the raw answer; the scheduler resolves it against the roster
    async fn decide(&self, request: &SelectionRequest) -> Result<String>;
}

#[async_trait]
impl<D: DecisionService + ?Sized> DecisionService for Arc<D> {
    async fn decide(&self, request: &SelectionRequest) -> Result<String> {
        (**self).decide(request).await
    }
}

/// Scheduler that delegates each choice to a [`DecisionService`]
pub struct SelectorScheduler<D> {
    service: D,
}

impl<D: DecisionService> SelectorScheduler<D> {
    pub fn new(service: D) -> Self {
        Self { service }
    }

    /// Get the decision service
    pub fn service(&self) -> &D {
        &self.service
    }
}

/// Names eligible for the next turn
///
/// Everyone but the previous speaker; the whole roster on the first turn or
/// when there is only one member.
pub fn candidates<'a>(roster: &'a [Agent], previous: Option<&str>) -> Vec<&'a str> {
    if roster.len() == 1 {
        return vec![roster[0].name()];
    }

    roster
        .iter()
        .map(Agent::name)
        .filter(|name| Some(*name) != previous)
        .collect()
}

/// Roster indexes named in `text` as whole words
///
/// A mention nested inside a longer member name (`Agent` within `Agent-1`)
/// does not count.
fn mentioned_members(text: &str, roster: &[Agent]) -> Result<Vec<usize>> {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');

    let mut spans = Vec::new();
    for (index, agent) in roster.iter().enumerate() {
        if agent.name().is_empty() {
            continue;
        }
        let re = Regex::new(&regex::escape(agent.name())).map_err(|e| {
            AgoraError::selection(format!("invalid agent name pattern: {}", e))
        })?;
        for m in re.find_iter(text) {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            if !is_word(before) && !is_word(after) {
                spans.push((index, m.start(), m.end()));
            }
        }
    }

    let mut mentioned: Vec<usize> = spans
        .iter()
        .filter(|&&(index, start, end)| {
            !spans.iter().any(|&(other, s, e)| {
                other != index && s <= start && end <= e && e - s > end - start
            })
        })
        .map(|&(index, _, _)| index)
        .collect();
    mentioned.sort_unstable();
    mentioned.dedup();
    Ok(mentioned)
}

/// Map a decision service answer to a roster index
///
/// The answer is trimmed of whitespace, quotes and trailing punctuation and
/// matched exactly against the roster. Failing that, the roster names
/// mentioned as whole words are collected; exactly one mention is accepted.
/// The chosen name must be a candidate.
pub fn resolve_selection(answer: &str, roster: &[Agent], candidates: &[&str]) -> Result<usize> {
    let cleaned = answer.trim().trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '*' | '.' | ',' | ':' | ';' | '!')
    });

    if cleaned.is_empty() {
        return Err(AgoraError::selection("decision service returned an empty answer"));
    }

    let chosen = match roster.iter().position(|a| a.name() == cleaned) {
        Some(index) => index,
        None => {
            let mentioned = mentioned_members(cleaned, roster)?;

            match mentioned.as_slice() {
                [index] => *index,
                [] => {
                    return Err(AgoraError::selection(format!(
                        "'{}' does not name a team member",
                        cleaned
                    )))
                }
                _ => {
                    return Err(AgoraError::selection(format!(
                        "ambiguous answer '{}' names several team members",
                        cleaned
                    )))
                }
            }
        }
    };

    let name = roster[chosen].name();
    if !candidates.contains(&name) {
        return Err(AgoraError::selection(format!(
            "'{}' spoke last and cannot be selected again",
            name
        )));
    }

    Ok(chosen)
}

#[async_trait]
impl<D: DecisionService> Scheduler for SelectorScheduler<D> {
    async fn next(&mut self, roster: &[Agent], transcript: &Transcript) -> Result<usize> {
        if roster.is_empty() {
            return Err(AgoraError::config("team roster is empty"));
        }

        let candidates = candidates(roster, transcript.last_speaker());

        // Nothing to decide
        if let [only] = candidates.as_slice() {
            return roster
                .iter()
                .position(|a| a.name() == *only)
                .ok_or_else(|| AgoraError::selection(format!("unknown agent '{}'", only)));
        }

        let request = SelectionRequest {
            roster: roster
                .iter()
                .map(|a| Participant {
                    name: a.name().to_string(),
                    description: a.description().to_string(),
                })
                .collect(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            history: transcript.messages().to_vec(),
        };

        let answer = self.service.decide(&request).await?;
        debug!(answer = %answer, candidates = ?request.candidates, "selector answered");

        resolve_selection(&answer, roster, &candidates)
    }

    fn name(&self) -> &str {
        "selector"
    }
}

/// A language model acting as the decision service
pub struct ModelDecisionService {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ModelDecisionService {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Build the role-selection prompt
    pub fn prompt(request: &SelectionRequest) -> String {
        let candidates = request.candidates.join(", ");
        format!(
            "You are in a role play game. The following roles are available:\n{}\n\n\
             Read the following conversation. Then select the next role from [{}] to play. \
             Only return the role.\n\n{}\n\n\
             Read the above conversation. Then select the next role from [{}] to play. \
             Only return the role.",
            request.roles(),
            candidates,
            request.conversation(),
            candidates
        )
    }
}

#[async_trait]
impl DecisionService for ModelDecisionService {
    async fn decide(&self, request: &SelectionRequest) -> Result<String> {
        let context = [ChatMessage::user(Self::prompt(request))];

        self.provider
            .complete(
                &self.model,
                &context,
                "You coordinate a team conversation by choosing who speaks next.",
                Some(GenerateOptions {
                    temperature: Some(0.0),
                    ..Default::default()
                }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMResponse;
    use std::sync::Mutex;

    struct Unused;

    #[async_trait]
    impl LLMProvider for Unused {
        async fn chat(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            Err(AgoraError::provider("not used"))
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "unused"
        }
    }

    fn roster(names: &[&str]) -> Vec<Agent> {
        let provider: Arc<dyn LLMProvider> = Arc::new(Unused);
        names
            .iter()
            .map(|n| {
                Agent::builder(*n)
                    .description(format!("{} role", n))
                    .model("m")
                    .provider(provider.clone())
                    .build()
                    .unwrap()
            })
            .collect()
    }

    struct Answers {
        answers: Mutex<Vec<String>>,
        requests: Mutex<Vec<SelectionRequest>>,
    }

    impl Answers {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().rev().map(|s| s.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DecisionService for Answers {
        async fn decide(&self, request: &SelectionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.answers
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AgoraError::selection("out of answers"))
        }
    }

    #[test]
    fn test_candidates_exclude_previous_speaker() {
        let roster = roster(&["A", "B", "C"]);
        assert_eq!(candidates(&roster, Some("B")), vec!["A", "C"]);
        assert_eq!(candidates(&roster, None), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_single_member_is_always_candidate() {
        let roster = roster(&["Solo"]);
        assert_eq!(candidates(&roster, Some("Solo")), vec!["Solo"]);
    }

    #[test]
    fn test_resolve_exact_and_decorated() {
        let roster = roster(&["Planner", "Builder"]);
        let all = ["Planner", "Builder"];
        assert_eq!(resolve_selection("Builder", &roster, &all).unwrap(), 1);
        assert_eq!(resolve_selection("  \"Planner\".\n", &roster, &all).unwrap(), 0);
        assert_eq!(resolve_selection("**Builder**", &roster, &all).unwrap(), 1);
    }

    #[test]
    fn test_resolve_single_mention() {
        let roster = roster(&["Planner", "Builder"]);
        let all = ["Planner", "Builder"];
        assert_eq!(
            resolve_selection("The next role is Builder", &roster, &all).unwrap(),
            1
        );
    }

    #[test]
    fn test_resolve_rejects_unknown_empty_and_ambiguous() {
        let roster = roster(&["Planner", "Builder"]);
        let all = ["Planner", "Builder"];
        assert!(matches!(
            resolve_selection("Reviewer", &roster, &all),
            Err(AgoraError::Selection(_))
        ));
        assert!(resolve_selection("   ", &roster, &all).is_err());
        assert!(resolve_selection("Planner or Builder", &roster, &all).is_err());
    }

    #[test]
    fn test_resolve_requires_whole_word() {
        let roster = roster(&["Agent1", "Agent10"]);
        let all = ["Agent1", "Agent10"];
        assert_eq!(resolve_selection("pick Agent10", &roster, &all).unwrap(), 1);
    }

    #[test]
    fn test_resolve_prefers_longest_member_name() {
        let roster = roster(&["Agent", "Agent-1"]);
        let all = ["Agent", "Agent-1"];
        assert_eq!(resolve_selection("pick Agent-1", &roster, &all).unwrap(), 1);
        assert_eq!(resolve_selection("Agent should go next", &roster, &all).unwrap(), 0);

        let err = resolve_selection("Agent and Agent-1", &roster, &all).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_resolve_rejects_excluded_speaker() {
        let roster = roster(&["A", "B", "C"]);
        let err = resolve_selection("B", &roster, &["A", "C"]).unwrap_err();
        assert!(err.to_string().contains("spoke last"));
    }

    #[tokio::test]
    async fn test_selector_issues_one_request_per_turn() {
        let roster = roster(&["A", "B", "C"]);
        let mut scheduler = SelectorScheduler::new(Answers::new(&["C"]));

        let mut transcript = Transcript::new("task");
        transcript.push("B", "my take");

        let index = scheduler.next(&roster, &transcript).await.unwrap();
        assert_eq!(index, 2);

        let requests = scheduler.service().requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].candidates, vec!["A", "C"]);
        assert_eq!(requests[0].roster.len(), 3);
        assert_eq!(requests[0].history.len(), 2);
    }

    #[tokio::test]
    async fn test_first_turn_offers_whole_roster() {
        let roster = roster(&["A", "B"]);
        let mut scheduler = SelectorScheduler::new(Answers::new(&["B"]));

        let index = scheduler.next(&roster, &Transcript::new("task")).await.unwrap();
        assert_eq!(index, 1);
        let requests = scheduler.service().requests.lock().unwrap();
        assert_eq!(requests[0].candidates, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_single_candidate_skips_decision() {
        let roster = roster(&["A", "B"]);
        let mut scheduler = SelectorScheduler::new(Answers::new(&[]));

        let mut transcript = Transcript::new("task");
        transcript.push("A", "done my part");

        assert_eq!(scheduler.next(&roster, &transcript).await.unwrap(), 1);
        assert!(scheduler.service().requests.lock().unwrap().is_empty());
    }

    struct Unreachable;

    #[async_trait]
    impl LLMProvider for Unreachable {
        async fn chat(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            Err(AgoraError::provider("Cannot connect to the selector model"))
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_model_decision_keeps_transport_error() {
        let roster = roster(&["A", "B"]);
        let service = ModelDecisionService::new(Arc::new(Unreachable), "m");
        let mut scheduler = SelectorScheduler::new(service);

        let err = scheduler
            .next(&roster, &Transcript::new("task"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgoraError::Provider(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_prompt_lists_roles_and_candidates() {
        let request = SelectionRequest {
            roster: vec![
                Participant {
                    name: "A".to_string(),
                    description: "first".to_string(),
                },
                Participant {
                    name: "C".to_string(),
                    description: "third".to_string(),
                },
            ],
            candidates: vec!["A".to_string(), "C".to_string()],
            history: vec![Message::task("go")],
        };

        let prompt = ModelDecisionService::prompt(&request);
        assert!(prompt.contains("A: first"));
        assert!(prompt.contains("[A, C]"));
        assert!(prompt.contains("user: go"));
    }
}
