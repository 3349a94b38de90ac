// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Matcher scenarios and order-independence properties.

use proptest::prelude::*;
use streamline_core::types::{Message, StreamingState};
use streamline_lifecycle::{MatchKind, RecoverableStreamMatcher};
use streamline_test_utils::recoverable;

fn interrupted(id: &str, content: &str) -> Message {
    let mut message = Message::streaming_assistant(id);
    message.content = content.to_string();
    message.streaming_state = StreamingState::Interrupted;
    message
}

#[test]
fn partial_answer_matches_longer_stream() {
    let matcher = RecoverableStreamMatcher::new();
    let message = interrupted("temp-abc", "The answer is");
    let streams = vec![
        recoverable("s-unrelated", None, "Something else entirely", 9),
        recoverable("s-answer", None, "The answer is 4", 0),
    ];

    let found = matcher.find_match(&message, &streams).expect("prefix match");
    assert_eq!(found.stream.stream_id.as_str(), "s-answer");
    assert_eq!(found.kind, MatchKind::Prefix);
}

#[test]
fn later_update_wins_between_equal_candidates() {
    let matcher = RecoverableStreamMatcher::new();
    let message = interrupted("m1", "Draft");
    let streams = vec![
        recoverable("s-1000", None, "Draft one", 0),
        recoverable("s-1005", None, "Draft two", 5),
    ];

    let found = matcher.find_match(&message, &streams).expect("match");
    assert_eq!(found.stream.stream_id.as_str(), "s-1005");
}

/// Streams with unique ids, as the directory guarantees.
fn streams_strategy() -> impl Strategy<Value = Vec<streamline_core::types::RecoverableStream>> {
    let record = (
        prop::option::of(prop_oneof![Just("m1"), Just("m2")]),
        prop_oneof![Just(""), Just("Hel"), Just("Hello"), Just("Hello world"), Just("Bye")],
        0u32..4,
    );
    prop::collection::vec(record, 0..8).prop_map(|records| {
        records
            .into_iter()
            .enumerate()
            .map(|(i, (message_id, text, minute))| {
                recoverable(&format!("s{i}"), message_id, text, minute)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn result_does_not_depend_on_input_order(
        (streams, shuffled) in streams_strategy()
            .prop_flat_map(|streams| {
                let shuffled = Just(streams.clone()).prop_shuffle();
                (Just(streams), shuffled)
            }),
        content in prop_oneof![Just("Hello"), Just("Hello world, again"), Just("Bye"), Just("")],
    ) {
        let matcher = RecoverableStreamMatcher::new();
        let message = interrupted("m1", content);

        prop_assert_eq!(
            matcher.find_match(&message, &streams),
            matcher.find_match(&message, &shuffled)
        );
        prop_assert_eq!(matcher.assess(&message, &streams), matcher.assess(&message, &shuffled));
    }
}
