//! # Conversation Loop
//!
//! The interactive prompt/response cycle. Owns the in-memory
//! [`Conversation`] for the lifetime of one process invocation, reads one
//! line per iteration, forwards the full conversation to the completion
//! provider, and displays the reply through the pager launcher.
//!
//! Provider failures are reported and the loop continues; the unanswered
//! `user` message stays in the conversation and is resent verbatim on the
//! next turn.

pub mod history;
pub mod pager;
pub mod term;

use std::sync::Arc;

use log::{error, info};
use rustyline::error::ReadlineError;

use crate::core::config::ResolvedConfig;
use crate::inference::{CompletionProvider, CompletionRequest, Conversation, ProviderError};
use self::history::PromptSession;

/// Returns true for the reserved control tokens that end the session.
fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Runs one turn: appends the user message, calls the provider with the
/// full conversation, and appends the reply on success. A failed call
/// leaves the user message unanswered and the conversation otherwise
/// untouched.
async fn submit_turn(
    provider: &dyn CompletionProvider,
    conversation: &mut Conversation,
    config: &ResolvedConfig,
    input: &str,
) -> Result<String, ProviderError> {
    conversation.push_user(input);

    let request = CompletionRequest {
        conversation: &*conversation,
        model: &config.model,
        max_tokens: config.max_tokens,
    };
    let reply = provider.complete(request).await?;

    conversation.push_assistant(reply.clone());
    Ok(reply)
}

/// Runs the conversation loop until the user enters an exit token or
/// closes the input stream. Input history is flushed to disk when the
/// session ends, whichever path ends it.
pub async fn run(
    provider: Arc<dyn CompletionProvider>,
    config: &ResolvedConfig,
) -> rustyline::Result<()> {
    println!("Interactive chatbot ({})", config.model);
    println!("Type 'exit' or 'quit' to leave.\n");

    let mut conversation = Conversation::new(&config.system_prompt);
    let mut session = PromptSession::open(&config.history_file)?;

    loop {
        match session.readline("You: ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if is_exit_command(input) {
                    println!("Goodbye!");
                    break;
                }
                session.remember(input);

                match submit_turn(provider.as_ref(), &mut conversation, config, input).await {
                    Ok(reply) => pager::show(&format!("AI: {reply}\n")),
                    Err(e) => {
                        error!("Completion failed: {}", e);
                        println!("Error: {e}\n");
                    }
                }
            }
            // Ctrl-C / Ctrl-D end the session like the exit token; the
            // history guard still flushes on the way out.
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        "Session over after {} messages",
        conversation.len().saturating_sub(1)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Role;
    use crate::test_support::{test_config, CannedProvider, FailingProvider};

    #[test]
    fn test_exit_command_matching() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("Quit"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quitting"));
        assert!(!is_exit_command(""));
    }

    #[tokio::test]
    async fn test_conversation_grows_by_two_per_successful_turn() {
        let provider = CannedProvider("canned reply");
        let config = test_config();
        let mut conversation = Conversation::new(&config.system_prompt);

        for turn in 1..=3usize {
            let reply = submit_turn(&provider, &mut conversation, &config, "hello")
                .await
                .unwrap();
            assert_eq!(reply, "canned reply");
            assert_eq!(conversation.len(), 1 + 2 * turn);
        }
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_dangling_user_message() {
        let provider = FailingProvider;
        let config = test_config();
        let mut conversation = Conversation::new(&config.system_prompt);

        let result = submit_turn(&provider, &mut conversation, &config, "hello").await;
        assert!(matches!(result, Err(ProviderError::Network(_))));
        assert_eq!(conversation.len(), 2);
        let last = conversation.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "hello");
    }

    #[tokio::test]
    async fn test_loop_recovers_after_a_failed_turn() {
        let config = test_config();
        let mut conversation = Conversation::new(&config.system_prompt);

        let _ = submit_turn(&FailingProvider, &mut conversation, &config, "first").await;
        let reply = submit_turn(
            &CannedProvider("second answer"),
            &mut conversation,
            &config,
            "second",
        )
        .await
        .unwrap();

        assert_eq!(reply, "second answer");
        // system, dangling user, user, assistant
        let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::User, Role::Assistant]
        );
        assert_eq!(conversation.messages()[1].content, "first");
    }
}
