//! Trait boundary for the text reasoning provider.

use async_trait::async_trait;

use crate::error::Result;

/// A remote reasoning service that answers a prompt with free text.
///
/// The evaluator only ever needs single-turn completions: a system role
/// framing plus one user prompt, answered with a short string. Provider
/// errors and timeouts surface as [`crate::ResearchError`] values and are
/// handled at the call site — never propagated past the evaluator.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Request one completion for the given system framing and user prompt.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl ReasoningProvider for EchoProvider {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            Ok(user.to_string())
        }
    }

    #[test]
    fn provider_is_object_safe() {
        fn assert_dyn(_p: &dyn ReasoningProvider) {}
        assert_dyn(&EchoProvider);
    }

    #[tokio::test]
    async fn echo_provider_completes() {
        let provider = EchoProvider;
        let answer = provider.complete("system", "hello").await.expect("ok");
        assert_eq!(answer, "hello");
    }
}
