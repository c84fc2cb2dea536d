//! The tip generator: prompt template, bounded invocation, sanitizing, and
//! retry on degenerate output.

use std::time::Duration;

use tracing::{debug, warn};

use crate::coach::capability::{CapabilityError, GenerationRequest, TextGenerator};
use crate::error::Error;
use crate::store::event::require_nonempty;

/// Configuration for tip generation.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Model identifier passed through to the capability.
    pub model: String,
    /// Maximum tokens the capability may produce per attempt.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Character budget for the sanitized tip.
    pub max_chars: usize,
    /// Total attempts when the capability returns degenerate output.
    /// Capability-level failures are never retried.
    pub max_attempts: u32,
    /// Deadline for a single capability call.
    pub timeout: Duration,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: crate::DEFAULT_MODEL.to_string(),
            max_tokens: 96,
            temperature: 0.7,
            max_chars: 280,
            max_attempts: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CoachConfig {
    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sanitized-output character budget.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Set the total attempt budget for degenerate output.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Deterministic prompt template. The wording is a tunable parameter, not a
/// contract — only the fact that it embeds the habit name is.
pub fn build_prompt(habit_name: &str) -> String {
    format!(
        "Provide a motivational tip for improving the habit: {habit_name}. \
         Be positive and actionable."
    )
}

/// Post-process raw capability output into a bounded, single-paragraph tip.
///
/// Strips the echoed prompt prefix if present, collapses all whitespace runs
/// (including newlines) into single spaces, and truncates to `max_chars`
/// characters, dropping a trailing partial word when truncation occurred.
/// The result may be empty — the caller decides whether that is degenerate.
pub fn sanitize_tip(raw: &str, prompt: &str, max_chars: usize) -> String {
    let trimmed = raw.trim_start();
    let body = trimmed.strip_prefix(prompt).unwrap_or(trimmed);

    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let truncated: String = collapsed.chars().take(max_chars).collect();
    // Cut back to the last full word so the tip doesn't end mid-word.
    match truncated.rfind(' ') {
        #[allow(clippy::string_slice)] // rfind(' ') lands on an ASCII space
        Some(pos) if pos > 0 => truncated[..pos].trim_end().to_string(),
        _ => truncated,
    }
}

/// Whether sanitized output is unusable: empty, or still just the prompt.
fn is_degenerate(tip: &str, prompt: &str) -> bool {
    tip.is_empty() || tip == prompt
}

/// Produces short, positive, habit-specific motivational messages.
///
/// Holds no persistent state and never touches the habit store, so an
/// abandoned call cannot leave the store inconsistent. The capability handle
/// it wraps is expensive to initialize and should be built once per process
/// and borrowed here.
pub struct TipGenerator<'a> {
    capability: &'a dyn TextGenerator,
    config: CoachConfig,
}

impl<'a> TipGenerator<'a> {
    pub fn new(capability: &'a dyn TextGenerator, config: CoachConfig) -> Self {
        Self { capability, config }
    }

    /// Generate a motivational tip for the named habit.
    ///
    /// Fails with [`Error::Validation`] on an empty name. Degenerate output
    /// (empty after sanitizing, or an exact echo of the prompt) is retried
    /// with the same prompt up to the configured attempt budget; capability
    /// failures and timeouts surface as [`Error::Generation`] immediately so
    /// latency stays bounded.
    pub async fn generate(&self, habit_name: &str) -> Result<String, Error> {
        require_nonempty("habit name", habit_name)?;

        let prompt = build_prompt(habit_name);

        for attempt in 1..=self.config.max_attempts {
            let request = GenerationRequest {
                prompt: prompt.clone(),
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            };

            let raw = match tokio::time::timeout(
                self.config.timeout,
                self.capability.complete(request),
            )
            .await
            {
                Err(_) => {
                    return Err(Error::from(CapabilityError::Timeout));
                }
                Ok(Err(e)) => return Err(Error::from(e)),
                Ok(Ok(raw)) => raw,
            };

            let tip = sanitize_tip(&raw, &prompt, self.config.max_chars);
            if is_degenerate(&tip, &prompt) {
                warn!(
                    attempt,
                    max_attempts = self.config.max_attempts,
                    "degenerate tip output, retrying"
                );
                continue;
            }

            debug!(attempt, chars = tip.len(), "tip generated");
            return Ok(tip);
        }

        Err(Error::Generation(format!(
            "capability produced unusable output after {} attempt(s)",
            self.config.max_attempts
        )))
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::capability::GenerateFuture;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    const PROMPT: &str = "Provide a motivational tip for improving the habit: Exercise. \
                          Be positive and actionable.";

    // ── Stub capabilities ──────────────────────────────────────────

    /// Always returns the same raw text.
    struct Fixed(&'static str);

    impl TextGenerator for Fixed {
        fn complete(&self, _request: GenerationRequest) -> GenerateFuture<'_> {
            Box::pin(async move { Ok(self.0.to_string()) })
        }
    }

    /// Echoes the prompt back verbatim, like an un-postprocessed GPT-2.
    struct EchoOnly;

    impl TextGenerator for EchoOnly {
        fn complete(&self, request: GenerationRequest) -> GenerateFuture<'_> {
            Box::pin(async move { Ok(request.prompt) })
        }
    }

    /// Pops canned responses in order, counting calls.
    struct Scripted {
        responses: Mutex<Vec<Result<String, CapabilityError>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(responses: Vec<Result<String, CapabilityError>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }
    }

    impl TextGenerator for Scripted {
        fn complete(&self, _request: GenerationRequest) -> GenerateFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(CapabilityError::Unavailable("script exhausted".into())));
            Box::pin(async move { next })
        }
    }

    /// Never answers within any reasonable test deadline.
    struct Slow;

    impl TextGenerator for Slow {
        fn complete(&self, _request: GenerationRequest) -> GenerateFuture<'_> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("too late".to_string())
            })
        }
    }

    // ── sanitize_tip ───────────────────────────────────────────────

    #[test]
    fn sanitize_strips_echoed_prompt_prefix() {
        let raw = format!("{PROMPT} Start with just five minutes a day.");
        let tip = sanitize_tip(&raw, PROMPT, 280);
        assert_eq!(tip, "Start with just five minutes a day.");
    }

    #[test]
    fn sanitize_collapses_to_single_paragraph() {
        let tip = sanitize_tip("Line one.\n\nLine   two.\n\tLine three.", PROMPT, 280);
        assert_eq!(tip, "Line one. Line two. Line three.");
    }

    #[test]
    fn sanitize_truncates_on_word_boundary() {
        let tip = sanitize_tip("alpha beta gamma delta", PROMPT, 16);
        assert!(tip.chars().count() <= 16);
        assert_eq!(tip, "alpha beta");
    }

    #[test]
    fn sanitize_keeps_short_output_untouched() {
        assert_eq!(sanitize_tip("Just do it.", PROMPT, 280), "Just do it.");
    }

    #[test]
    fn sanitize_of_pure_echo_is_empty() {
        assert!(sanitize_tip(PROMPT, PROMPT, 280).is_empty());
    }

    // ── generate ───────────────────────────────────────────────────

    #[tokio::test]
    async fn generate_rejects_empty_habit_name() {
        let stub = Fixed("irrelevant");
        let generator = TipGenerator::new(&stub, CoachConfig::default());
        assert!(matches!(
            generator.generate("").await.unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            generator.generate("   ").await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn generate_returns_sanitized_tip() {
        let stub = Fixed(
            "Provide a motivational tip for improving the habit: Exercise. \
             Be positive and actionable.  Tie your workout\nto an existing routine.",
        );
        let generator = TipGenerator::new(&stub, CoachConfig::default());

        let tip = generator.generate("Exercise").await.unwrap();
        assert_eq!(tip, "Tie your workout to an existing routine.");
        assert_ne!(tip, build_prompt("Exercise"));
    }

    #[tokio::test]
    async fn generate_respects_char_budget() {
        let stub = Fixed(
            "One two three four five six seven eight nine ten eleven twelve \
             thirteen fourteen fifteen.",
        );
        let config = CoachConfig::default().with_max_chars(40);
        let generator = TipGenerator::new(&stub, config);

        let tip = generator.generate("Exercise").await.unwrap();
        assert!(!tip.is_empty());
        assert!(tip.chars().count() <= 40);
    }

    #[tokio::test]
    async fn echo_only_output_exhausts_retries() {
        let stub = EchoOnly;
        let config = CoachConfig::default().with_max_attempts(3);
        let generator = TipGenerator::new(&stub, config);

        let err = generator.generate("Exercise").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.to_string().contains("3 attempt(s)"));
    }

    #[tokio::test]
    async fn empty_then_good_output_succeeds_on_retry() {
        let stub = Scripted::new(vec![
            Ok("   \n ".to_string()),
            Ok("Lay out your running shoes the night before.".to_string()),
        ]);
        let generator = TipGenerator::new(&stub, CoachConfig::default());

        let tip = generator.generate("Run").await.unwrap();
        assert_eq!(tip, "Lay out your running shoes the night before.");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn capability_failure_is_not_retried() {
        let stub = Scripted::new(vec![Err(CapabilityError::Unavailable(
            "connection refused".into(),
        ))]);
        let generator = TipGenerator::new(&stub, CoachConfig::default());

        let err = generator.generate("Exercise").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_capability_hits_the_deadline() {
        let stub = Slow;
        let config = CoachConfig::default().with_timeout(Duration::from_millis(50));
        let generator = TipGenerator::new(&stub, config);

        let start = std::time::Instant::now();
        let err = generator.generate("Exercise").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.to_string().contains("timed out"));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
