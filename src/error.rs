//! Error types for the reconciliation pass.

/// Error fetching one of the two input sets.
///
/// Any fetch error is fatal: the pass aborts before computing deltas, and
/// no mutation is attempted with partial knowledge of either set.
#[derive(Debug)]
pub enum FetchError {
    /// HTTP request failed.
    Http(reqwest::Error),
    /// Request timed out.
    Timeout,
    /// Non-2xx response from the remote endpoint.
    Status {
        status: u16,
        detail: String,
    },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "HTTP error: {}", e),
            FetchError::Timeout => write!(f, "Request timed out"),
            FetchError::Status { status, detail } => {
                if detail.is_empty() {
                    write!(f, "HTTP {}", status)
                } else {
                    write!(f, "HTTP {}: {}", status, detail)
                }
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(e)
        }
    }
}

/// Error applying one batch of deltas.
///
/// Apply errors are per-chunk: a failed chunk is recorded and the remaining
/// chunks are still attempted. Already-applied chunks are never rolled back.
#[derive(Debug)]
pub enum ApplyError {
    /// HTTP request failed.
    Http(reqwest::Error),
    /// Request timed out.
    Timeout,
    /// The remote service rejected the batch.
    Rejected {
        status: u16,
        detail: String,
    },
}

impl ApplyError {
    /// True when the rejection is a 400-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApplyError::Rejected { status, .. } if (400u16..500).contains(status))
    }
}

impl std::fmt::Display for ApplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyError::Http(e) => write!(f, "HTTP error: {}", e),
            ApplyError::Timeout => write!(f, "Request timed out"),
            ApplyError::Rejected { status, detail } => {
                write!(f, "ACL update rejected (HTTP {}): {}", status, detail)?;
                // A 400 is usually the ACL entry limit, not a malformed batch.
                if (400u16..500).contains(status) {
                    write!(
                        f,
                        "; you may need the provider to raise the maximum ACL entries limit"
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ApplyError {}

impl From<reqwest::Error> for ApplyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApplyError::Timeout
        } else {
            ApplyError::Http(e)
        }
    }
}
