use super::*;
use proptest::prelude::*;
use std::collections::HashMap;

fn arb_message_id() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}@[a-z]{1,8}\\.org"
}

proptest! {
    /// Ids survive a bracket round trip through a header
    #[test]
    fn prop_bracketed_ids_normalize_back(id in arb_message_id()) {
        prop_assert_eq!(normalize_message_id(&bracketed(&id)), Some(id));
    }

    /// Formatting a chain as a header and parsing it back keeps its order
    #[test]
    fn prop_references_header_parses_in_order(chain in prop::collection::vec(arb_message_id(), 0..15)) {
        let header = chain.iter().map(|id| bracketed(id)).collect::<Vec<_>>().join(" ");
        let parsed = parse_references(&header);

        let mut expected = Vec::new();
        for id in &chain {
            if !expected.contains(id) {
                expected.push(id.clone());
            }
        }
        prop_assert_eq!(parsed, expected);
    }

    /// Every message in a linear conversation lands in the root's thread,
    /// whatever subset of the conversation has been stored already
    #[test]
    fn prop_linear_conversation_shares_thread(
        chain in prop::collection::vec(arb_message_id(), 1..12),
        stored_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let mut chain = chain;
        chain.dedup();
        let root = chain[0].clone();

        // Stored messages were threaded correctly when they arrived
        let known: HashMap<String, String> = chain
            .iter()
            .zip(stored_mask.iter())
            .filter(|(_, stored)| **stored)
            .map(|(id, _)| (id.clone(), root.clone()))
            .collect();

        for (i, id) in chain.iter().enumerate() {
            let refs = chain[..i].to_vec();
            let in_reply_to = refs.last().cloned();
            let thread = resolve_thread_id(id, in_reply_to.as_deref(), &refs, |c| known.get(c).cloned());
            prop_assert_eq!(&thread, &root);
        }
    }

    /// Replies built by reply_headers never exceed the cap and keep the root
    #[test]
    fn prop_reply_headers_bounded(chain in prop::collection::vec(arb_message_id(), 1..40), parent in arb_message_id()) {
        prop_assume!(!chain.contains(&parent));
        let headers = reply_headers(ThreadParent {
            message_id: &parent,
            references: &chain,
            thread_id: &chain[0],
        });
        prop_assert!(headers.references.len() <= MAX_REFERENCES);
        prop_assert_eq!(headers.references.last(), Some(&parent));
        prop_assert_eq!(&headers.references[0], &chain[0]);
    }
}
