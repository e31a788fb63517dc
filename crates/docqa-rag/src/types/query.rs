//! Query request types

use serde::{Deserialize, Serialize};

/// Question submitted to `/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    #[serde(default)]
    pub question: String,
}
