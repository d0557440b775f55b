//! Property-based tests for the conversation data model
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{
    ChatMessage, ConversationHistory, ConversationTurn, GenerationParams, MessageRole,
    ModelRequest,
};
use proptest::prelude::*;

fn arb_turn() -> impl Strategy<Value = ConversationTurn> {
    ("[a-zあ-ん ]{1,12}", prop_oneof![Just(String::new()), "[a-zあ-ん ]{1,12}"])
        .prop_map(|(user, assistant)| ConversationTurn::new(user, assistant))
}

fn arb_history() -> impl Strategy<Value = ConversationHistory> {
    prop::collection::vec(arb_turn(), 0..12).prop_map(|turns| turns.into_iter().collect())
}

// ============================================================================
// Message list assembly
// ============================================================================

mod message_list_tests {
    use super::*;

    proptest! {
        #[test]
        fn message_list_ends_with_new_user_message(
            history in arb_history(),
            message in "[a-z ]{1,20}",
            with_system in any::<bool>(),
        ) {
            let system = with_system.then_some("system prompt");
            let req = ModelRequest::assemble(
                "m", system, &history, message.clone(), GenerationParams::default(),
            );
            prop_assert_eq!(req.messages.last(), Some(&ChatMessage::user(message)));
        }

        #[test]
        fn history_entries_alternate_user_then_optional_assistant(
            history in arb_history(),
            with_system in any::<bool>(),
        ) {
            let system = with_system.then_some("system prompt");
            let req = ModelRequest::assemble(
                "m", system, &history, "new", GenerationParams::default(),
            );

            let mut messages = req.messages.iter();
            if with_system {
                prop_assert_eq!(messages.next().map(|m| m.role), Some(MessageRole::System));
            }

            for turn in &history {
                let user = messages.next();
                prop_assert_eq!(user.map(|m| m.role), Some(MessageRole::User));
                prop_assert_eq!(user.map(|m| m.content.as_str()), Some(turn.user_text()));

                if turn.has_assistant_text() {
                    let assistant = messages.next();
                    prop_assert_eq!(assistant.map(|m| m.role), Some(MessageRole::Assistant));
                    prop_assert_eq!(
                        assistant.map(|m| m.content.as_str()),
                        Some(turn.assistant_text())
                    );
                }
            }

            prop_assert_eq!(messages.next().map(|m| m.role), Some(MessageRole::User));
            prop_assert!(messages.next().is_none());
        }

        #[test]
        fn only_first_message_may_be_system(history in arb_history()) {
            let req = ModelRequest::assemble(
                "m", Some("sys"), &history, "new", GenerationParams::default(),
            );
            let system_count = req
                .messages
                .iter()
                .filter(|m| m.role == MessageRole::System)
                .count();
            prop_assert_eq!(system_count, 1);
            prop_assert_eq!(req.messages[0].role, MessageRole::System);
        }
    }
}

// ============================================================================
// GenerationParams Property Tests
// ============================================================================

mod generation_params_tests {
    use super::*;

    proptest! {
        #[test]
        fn in_range_values_accepted(t in 0.0f32..=2.0f32, n in 1u32..=8192u32) {
            let params = GenerationParams::new(t, n);
            prop_assert!(params.is_ok());
            let params = params.unwrap();
            prop_assert!((params.temperature() - t).abs() < f32::EPSILON);
            prop_assert_eq!(params.max_tokens(), n);
        }

        #[test]
        fn out_of_range_temperature_rejected(
            t in prop_oneof![(-100.0f32..-0.001f32), (2.001f32..100.0f32)],
            n in 1u32..=8192u32,
        ) {
            prop_assert!(GenerationParams::new(t, n).is_err());
        }

        #[test]
        fn out_of_range_tokens_rejected(n in 8193u32..1_000_000u32) {
            prop_assert!(GenerationParams::new(0.7, n).is_err());
        }
    }
}
