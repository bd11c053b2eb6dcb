//! Free-form operator queries.

use serde::{Deserialize, Serialize};

/// A question typed by an operator, answered by the query responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMessage {
    pub text: String,
}

impl QueryMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
