//! One agent "turn": resolve the selected agent, assemble the prompt, make
//! a single completion call, and on success append the reply to the shared
//! discussion. Exactly one transcript append per successful call; every
//! failure path leaves the transcript untouched. Nothing is retried.

use tracing::{debug, warn};

use crate::boundary::{Completion, ReferenceFetcher};
use crate::error::Error;
use crate::prompt::{build_prompt, PromptInputs, TAIL_CHARS};
use crate::session::SessionState;
use crate::Result;

/// Drive one interaction with the agent at `index`.
///
/// Returns `Ok(Some(reply))` on a non-empty completion, `Ok(None)` when the
/// call failed or returned nothing (logged, no state mutation). Errors are
/// reserved for the caller's mistakes: a stale index, or a missing
/// credential. The credential check runs before any network traffic,
/// including the reference fetch.
pub async fn run_interaction(
    state: &mut SessionState,
    index: usize,
    completion: &dyn Completion,
    fetcher: &dyn ReferenceFetcher,
    api_key: Option<&str>,
) -> Result<Option<String>> {
    let agent = state.agent(index)?;
    let agent_name = agent.name.clone();
    let description = agent.description.clone();
    let api_key = api_key.ok_or(Error::MissingCredential)?;

    let ctx = state.request_context();
    let prompt = build_prompt(
        &PromptInputs {
            agent_name: &agent_name,
            agent_description: &description,
            user_request: &ctx.user_request,
            rephrased_request: &ctx.rephrased_request,
            user_input: &ctx.user_input,
            reference_url: &ctx.reference_url,
            transcript: &state.transcript,
        },
        fetcher,
    )
    .await;
    debug!(agent = %agent_name, prompt_chars = prompt.chars().count(), "interaction prompt built");

    match completion.send(&agent_name, &prompt, api_key).await {
        Ok(reply) if !reply.is_empty() => {
            state.transcript.push(&agent_name, &reply);
            state.form_agent_name = agent_name;
            state.form_agent_description = description;
            state.selected = Some(index);
            Ok(Some(reply))
        }
        Ok(_) => {
            warn!(agent = %agent_name, error = %Error::EmptyCompletion, "interaction aborted");
            Ok(None)
        }
        Err(err) => {
            warn!(agent = %agent_name, error = %err, "completion call failed");
            Ok(None)
        }
    }
}

/// Ask the completion API for a revised description of the agent at
/// `index`, taking the current user request and the discussion so far into
/// account.
///
/// Purely advisory: returns the trimmed reply, or `Ok(None)` when the call
/// failed or returned nothing. The caller decides whether to stage the
/// result on the agent.
pub async fn regenerate_description(
    state: &SessionState,
    index: usize,
    completion: &dyn Completion,
    api_key: Option<&str>,
) -> Result<Option<String>> {
    let agent = state.agent(index)?;
    let api_key = api_key.ok_or(Error::MissingCredential)?;

    let prompt = regeneration_prompt(
        &agent.name,
        &agent.description,
        &state.user_request,
        &state.transcript.tail(TAIL_CHARS),
    );

    match completion.send(&agent.name, &prompt, api_key).await {
        Ok(reply) if !reply.trim().is_empty() => Ok(Some(reply.trim().to_string())),
        Ok(_) => Ok(None),
        Err(err) => {
            warn!(agent = %agent.name, error = %err, "description regeneration failed");
            Ok(None)
        }
    }
}

fn regeneration_prompt(name: &str, description: &str, user_request: &str, history: &str) -> String {
    format!(
        "You are an AI assistant helping to improve an agent's description. \
         The agent's current details are:\n\
         Name: {name}\n\
         Description: {description}\n\n\
         The current user request is: {user_request}\n\n\
         The discussion history so far is: {history}\n\n\
         Please generate a revised description for this agent that defines it in the \
         best manner possible to address the current user request, taking into account \
         the discussion thus far. Return only the revised description, without any \
         additional commentary or narrative. It is imperative that you return ONLY the \
         text of the new description. No preamble, no narrative, no superfluous \
         commentary whatsoever. Just the description, unlabeled, please."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::testing::{MockCompletion, MockFetcher};

    fn state_with_researcher() -> SessionState {
        let mut state = SessionState::new();
        state.add_agent(Agent::new("Researcher", "finds facts"));
        state
    }

    #[tokio::test]
    async fn test_successful_interaction_appends_one_turn() {
        let mut state = state_with_researcher();
        state.user_input = "focus on 2023 data".to_string();
        let completion = MockCompletion::new();
        completion.queue_reply("Here are the facts.");
        let fetcher = MockFetcher::new();

        let reply = run_interaction(&mut state, 0, &completion, &fetcher, Some("key"))
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("Here are the facts."));
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.transcript.turns()[0].speaker, "Researcher");
        assert_eq!(state.transcript.turns()[0].text, "Here are the facts.");

        assert_eq!(state.selected, Some(0));
        assert_eq!(state.form_agent_name, "Researcher");
        assert_eq!(state.form_agent_description, "finds facts");

        let call = completion.last_call().unwrap();
        assert_eq!(call.agent_name, "Researcher");
        assert_eq!(call.api_key, "key");
        assert!(call.prompt.starts_with("Act as the Researcher who finds facts."));
        assert!(call.prompt.contains("Additional input: focus on 2023 data."));
    }

    #[tokio::test]
    async fn test_missing_credential_aborts_before_any_network_call() {
        let mut state = state_with_researcher();
        state.reference_url = "https://example.com".to_string();
        let completion = MockCompletion::new();
        let fetcher = MockFetcher::new();

        let result = run_interaction(&mut state, 0, &completion, &fetcher, None).await;

        assert!(matches!(result, Err(Error::MissingCredential)));
        assert_eq!(completion.call_count(), 0);
        assert_eq!(fetcher.call_count(), 0);
        assert!(state.transcript.is_empty());
        assert_eq!(state.selected, None);
    }

    #[tokio::test]
    async fn test_stale_index_is_an_error() {
        let mut state = state_with_researcher();
        let completion = MockCompletion::new();
        let fetcher = MockFetcher::new();

        let result = run_interaction(&mut state, 7, &completion, &fetcher, Some("key")).await;
        assert!(matches!(
            result,
            Err(Error::StaleSelection { index: 7, len: 1 })
        ));
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_reply_mutates_nothing() {
        let mut state = state_with_researcher();
        let completion = MockCompletion::new();
        completion.queue_reply("");
        let fetcher = MockFetcher::new();

        let reply = run_interaction(&mut state, 0, &completion, &fetcher, Some("key"))
            .await
            .unwrap();

        assert_eq!(reply, None);
        assert!(state.transcript.is_empty());
        assert_eq!(state.selected, None);
        assert_eq!(state.form_agent_name, "");
    }

    #[tokio::test]
    async fn test_failed_call_mutates_nothing() {
        let mut state = state_with_researcher();
        let completion = MockCompletion::new();
        completion.queue_error(Error::Network("connection reset".to_string()));
        let fetcher = MockFetcher::new();

        let reply = run_interaction(&mut state, 0, &completion, &fetcher, Some("key"))
            .await
            .unwrap();

        assert_eq!(reply, None);
        assert!(state.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_each_success_appends_exactly_one_turn() {
        let mut state = state_with_researcher();
        let completion = MockCompletion::new();
        completion.queue_reply("first");
        completion.queue_reply("second");
        let fetcher = MockFetcher::new();

        run_interaction(&mut state, 0, &completion, &fetcher, Some("key"))
            .await
            .unwrap();
        run_interaction(&mut state, 0, &completion, &fetcher, Some("key"))
            .await
            .unwrap();

        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.transcript.turns()[0].text, "first");
        assert_eq!(state.transcript.turns()[1].text, "second");

        // The second prompt folds the first reply back in.
        let call = completion.last_call().unwrap();
        assert!(call.prompt.contains("The discussion so far has been Researcher: first."));
    }

    #[tokio::test]
    async fn test_regenerate_description_returns_trimmed_reply() {
        let mut state = state_with_researcher();
        state.user_request = "build a site".to_string();
        let completion = MockCompletion::new();
        completion.queue_reply("  digs up primary sources and verifies them  ");

        let revised = regenerate_description(&state, 0, &completion, Some("key"))
            .await
            .unwrap();
        assert_eq!(
            revised.as_deref(),
            Some("digs up primary sources and verifies them")
        );

        let call = completion.last_call().unwrap();
        assert!(call.prompt.contains("Name: Researcher"));
        assert!(call.prompt.contains("Description: finds facts"));
        assert!(call.prompt.contains("The current user request is: build a site"));
        // Advisory only: the session is untouched.
        assert_eq!(state.agent(0).unwrap().description, "finds facts");
        assert!(state.agent(0).unwrap().pending_description.is_none());
    }

    #[tokio::test]
    async fn test_regenerate_description_requires_credential() {
        let state = state_with_researcher();
        let completion = MockCompletion::new();

        let result = regenerate_description(&state, 0, &completion, None).await;
        assert!(matches!(result, Err(Error::MissingCredential)));
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_regenerate_description_yields_none_on_failure() {
        let state = state_with_researcher();
        let completion = MockCompletion::new();
        completion.queue_error(Error::Api {
            status: 500,
            message: "server error".to_string(),
        });

        let revised = regenerate_description(&state, 0, &completion, Some("key"))
            .await
            .unwrap();
        assert_eq!(revised, None);
    }
}
