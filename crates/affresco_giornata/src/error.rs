//! Error types for the reconciliation engine.

use compact_str::CompactString;
use thiserror::Error;

/// Errors surfaced at the renderer boundary.
///
/// These are programmer errors - a malformed tree or an unfinishable
/// component - and fail fast. Data-dependent conditions (unknown names,
/// writes to props) degrade gracefully with a diagnostic instead.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The node was built outside the constructors and its shape flags
    /// disagree with the children payload, breaking the dispatch invariant.
    #[error("malformed node: shape `{shape}` disagrees with the children payload of {kind}")]
    MalformedNode { kind: String, shape: String },

    /// An update referenced a previous node that was never realized.
    #[error("previous node at this position has no realized host")]
    DetachedPrevious,

    /// A component ended setup with no render function from any source.
    #[error("component `{0}` has no render function after setup")]
    MissingRender(CompactString),
}
