//! Reply text. Two fixed templates, picked by whether the candidate has a
//! locality tag.

use crate::model::CandidateRecord;

const BODY: &str = "That website is part of a multi-billion dollar propaganda effort to divide and manipulate people";
const TAIL: &str = "How did you come across it? Want me to shut up? Just yell.";

/// Reply addressed to `author` about a mention of `candidate`.
pub fn render(candidate: &CandidateRecord, author: &str) -> String {
    if candidate.has_locality() {
        with_location(author, &candidate.locality)
    } else {
        without_location(author)
    }
}

pub fn without_location(author: &str) -> String {
    format!("@{author} {BODY}. {TAIL}")
}

/// `locality` is inserted verbatim.
pub fn with_location(author: &str, locality: &str) -> String {
    format!("@{author} {BODY} in {locality}. {TAIL}")
}
