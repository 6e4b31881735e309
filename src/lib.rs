//! ACL synchronization tool for Tor exit nodes.
//!
//! Reconciles an ACL on a managed edge service with the published Tor exit
//! node list. One run performs a single reconciliation pass:
//!
//! 1. Fetch the desired IP set from the exit node list feed.
//! 2. Fetch the current ACL entries from the managed service.
//! 3. Compute the create/delete deltas between the two.
//! 4. Apply the deltas as size-bounded PATCH batches.
//!
//! The pass is idempotent: the remote ACL is the only durable state, so a
//! rerun recomputes deltas against whatever the previous run left behind.
//!
//! # Example Configuration
//!
//! ```yaml
//! source:
//!   url: "https://check.torproject.org/torbulkexitlist"
//!
//! acl:
//!   api_key: "${FASTLY_API_KEY}"
//!   service_id: "SU1Z0isxPaozGVKXdv0eY"
//!   acl_id: "6tUXdegLTf5BCig0zGFrU3"
//!
//! batch:
//!   max_size: 500
//! ```

pub mod acl;
pub mod apply;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod source;
pub mod sync;

pub use config::Config;
pub use sync::{run_pass, PassOptions, PassReport};
