//! Outbound prompt assembly.
//!
//! One interaction produces one prompt string: a fixed persona sentence
//! followed by an ordered list of optional segments, each rendered only
//! when its input is non-empty and folded onto the prompt left to right.
//! The builder is infallible: a failing reference fetch skips its segment
//! instead of failing the build (best-effort, by explicit policy).

use tracing::warn;

use crate::boundary::ReferenceFetcher;
use crate::transcript::Transcript;

/// Cap on the trailing window of discussion text folded into a prompt.
pub const TAIL_CHARS: usize = 50_000;

/// Everything the builder reads for one prompt. Empty strings mean "absent".
#[derive(Debug)]
pub struct PromptInputs<'a> {
    pub agent_name: &'a str,
    pub agent_description: &'a str,
    pub user_request: &'a str,
    pub rephrased_request: &'a str,
    pub user_input: &'a str,
    pub reference_url: &'a str,
    pub transcript: &'a Transcript,
}

/// Assemble the prompt for one interaction.
///
/// Segment order is fixed: original request, rephrased request, additional
/// input, reference-page text, discussion tail. Always returns a well-formed
/// string, even when the reference fetch fails.
pub async fn build_prompt(inputs: &PromptInputs<'_>, fetcher: &dyn ReferenceFetcher) -> String {
    let mut prompt = format!(
        "Act as the {} who {}.",
        inputs.agent_name, inputs.agent_description
    );

    let reference = fetch_reference(inputs.reference_url, fetcher).await;
    let tail = (!inputs.transcript.is_empty()).then(|| inputs.transcript.tail(TAIL_CHARS));

    let segments = [
        segment(inputs.user_request, |v| format!(" Original request was: {v}.")),
        segment(inputs.rephrased_request, |v| {
            format!(" You are helping a team work on satisfying {v}.")
        }),
        segment(inputs.user_input, |v| format!(" Additional input: {v}.")),
        reference.map(|text| format!(" Reference URL content: {text}.")),
        tail.map(|text| format!(" The discussion so far has been {text}.")),
    ];

    for rendered in segments.into_iter().flatten() {
        prompt.push_str(&rendered);
    }
    prompt
}

fn segment(value: &str, render: impl FnOnce(&str) -> String) -> Option<String> {
    (!value.is_empty()).then(|| render(value))
}

/// Best-effort fetch of the reference page. Failure is logged and treated
/// as "no content"; never upgraded to a hard error.
async fn fetch_reference(url: &str, fetcher: &dyn ReferenceFetcher) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    match fetcher.fetch_text(url).await {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(url, error = %err, "reference fetch failed, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    fn inputs<'a>(transcript: &'a Transcript) -> PromptInputs<'a> {
        PromptInputs {
            agent_name: "Researcher",
            agent_description: "finds facts",
            user_request: "",
            rephrased_request: "",
            user_input: "",
            reference_url: "",
            transcript,
        }
    }

    #[tokio::test]
    async fn test_all_empty_inputs_yield_base_sentence_only() {
        let transcript = Transcript::new();
        let fetcher = MockFetcher::new();
        let prompt = build_prompt(&inputs(&transcript), &fetcher).await;
        assert_eq!(prompt, "Act as the Researcher who finds facts.");
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_user_input_appends_additional_input_sentence() {
        let transcript = Transcript::new();
        let fetcher = MockFetcher::new();
        let mut inputs = inputs(&transcript);
        inputs.user_input = "focus on 2023 data";

        let prompt = build_prompt(&inputs, &fetcher).await;
        assert_eq!(
            prompt,
            "Act as the Researcher who finds facts. Additional input: focus on 2023 data."
        );
    }

    #[tokio::test]
    async fn test_segments_appear_in_fixed_order() {
        let mut transcript = Transcript::new();
        transcript.push("Planner", "step one");
        let fetcher = MockFetcher::new();
        fetcher.queue_page("Example Domain");

        let inputs = PromptInputs {
            agent_name: "Researcher",
            agent_description: "finds facts",
            user_request: "build a site",
            rephrased_request: "create a website",
            user_input: "use blue",
            reference_url: "https://example.com",
            transcript: &transcript,
        };

        let prompt = build_prompt(&inputs, &fetcher).await;
        assert_eq!(
            prompt,
            "Act as the Researcher who finds facts. \
             Original request was: build a site. \
             You are helping a team work on satisfying create a website. \
             Additional input: use blue. \
             Reference URL content: Example Domain. \
             The discussion so far has been Planner: step one."
        );
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_reference_fetch_is_swallowed() {
        let transcript = Transcript::new();
        let fetcher = MockFetcher::new();
        fetcher.queue_failure("connection refused");

        let mut inputs = inputs(&transcript);
        inputs.reference_url = "https://unreachable.invalid";

        let prompt = build_prompt(&inputs, &fetcher).await;
        assert_eq!(prompt, "Act as the Researcher who finds facts.");
        assert!(!prompt.contains("Reference URL content"));
    }

    #[tokio::test]
    async fn test_long_discussion_is_capped_to_trailing_window() {
        let mut transcript = Transcript::new();
        transcript.push("Writer", "x".repeat(TAIL_CHARS + 500));
        let rendered = transcript.render();
        assert!(rendered.chars().count() > TAIL_CHARS);

        let fetcher = MockFetcher::new();
        let prompt = build_prompt(&inputs(&transcript), &fetcher).await;

        let expected_tail: String = rendered
            .chars()
            .skip(rendered.chars().count() - TAIL_CHARS)
            .collect();
        assert_eq!(
            prompt,
            format!(
                "Act as the Researcher who finds facts. The discussion so far has been {expected_tail}."
            )
        );
        assert!(!prompt.contains("truncat"));
    }
}
