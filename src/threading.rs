//! Mail threading
//!
//! Messages are grouped into threads using their `Message-ID`,
//! `In-Reply-To` and `References` headers. A thread is identified by the
//! Message-ID of its root message. Ids are stored normalized: no
//! surrounding whitespace and no angle brackets.

use uuid::Uuid;

/// Maximum number of ids kept in an outgoing `References` list
pub const MAX_REFERENCES: usize = 20;

/// Headers a reply has to carry to stay in its parent's thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyHeaders {
    pub in_reply_to: String,
    pub references: Vec<String>,
    pub thread_id: String,
}

/// The parts of a stored message that threading looks at
#[derive(Debug, Clone, Copy)]
pub struct ThreadParent<'a> {
    pub message_id: &'a str,
    pub references: &'a [String],
    pub thread_id: &'a str,
}

/// Normalizes a Message-ID header value
///
/// Trims whitespace and one pair of enclosing angle brackets. Returns
/// `None` when nothing is left.
pub fn normalize_message_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed)
        .trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

/// Parses a `References` (or `In-Reply-To`) header into normalized ids
///
/// Every `<...>` token is taken in order. Headers written without brackets
/// fall back to whitespace splitting. Duplicates keep their first position.
pub fn parse_references(header: &str) -> Vec<String> {
    let mut ids = Vec::new();
    if header.contains('<') {
        let mut rest = header;
        while let Some(start) = rest.find('<') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('>') else { break };
            if let Some(id) = normalize_message_id(&after[..end]) {
                ids.push(id);
            }
            rest = &after[end + 1..];
        }
    } else {
        ids.extend(header.split_whitespace().filter_map(normalize_message_id));
    }
    dedup_preserving_order(ids)
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Determines the thread a message belongs to
///
/// Candidates are checked nearest ancestor first: `in_reply_to`, then the
/// references from last to first. The first one `lookup` knows yields
/// that message's thread. Without a known ancestor the root reference,
/// else `in_reply_to`, else the message's own id starts the thread, so
/// messages of one conversation agree even when they arrive out of order.
///
/// ### Arguments
///
/// * `message_id` - The normalized id of the message being threaded
/// * `in_reply_to` - Its normalized `In-Reply-To`, if any
/// * `references` - Its normalized `References`, root first
/// * `lookup` - Returns the stored thread id of a known message id
pub fn resolve_thread_id<F>(
    message_id: &str,
    in_reply_to: Option<&str>,
    references: &[String],
    mut lookup: F,
) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let candidates = in_reply_to
        .into_iter()
        .chain(references.iter().rev().map(String::as_str))
        .filter(|candidate| *candidate != message_id);

    for candidate in candidates {
        if let Some(thread_id) = lookup(candidate) {
            return thread_id;
        }
    }

    references
        .first()
        .map(String::as_str)
        .or(in_reply_to)
        .unwrap_or(message_id)
        .to_string()
}

/// Builds the headers for a reply to `parent`
///
/// The parent's references are extended with the parent's own id. When the
/// list grows past `MAX_REFERENCES` the root is kept together with the most
/// recent ids.
pub fn reply_headers(parent: ThreadParent<'_>) -> ReplyHeaders {
    let mut references: Vec<String> = parent.references.to_vec();
    references.push(parent.message_id.to_string());
    let mut references = dedup_preserving_order(references);

    if references.len() > MAX_REFERENCES {
        let tail_start = references.len() - (MAX_REFERENCES - 1);
        let mut trimmed = Vec::with_capacity(MAX_REFERENCES);
        trimmed.push(references[0].clone());
        trimmed.extend(references.drain(tail_start..));
        references = trimmed;
    }

    ReplyHeaders {
        in_reply_to: parent.message_id.to_string(),
        references,
        thread_id: parent.thread_id.to_string(),
    }
}

/// Prefixes `Re: ` unless the subject is already a reply
pub fn reply_subject(subject: &str) -> String {
    let trimmed = subject.trim();
    let is_reply = trimmed
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("re:"));
    if is_reply {
        trimmed.to_string()
    } else {
        format!("Re: {}", trimmed)
    }
}

/// Generates a fresh normalized Message-ID for an outgoing message
pub fn generate_message_id(domain: &str) -> String {
    format!("{}@{}", Uuid::new_v4(), domain)
}

/// Formats a normalized id for use in a header
pub fn bracketed(id: &str) -> String {
    format!("<{}>", id)
}


#[cfg(test)]
mod prop_tests;
