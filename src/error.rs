use crate::layer::ZoneId;

/// Errors a dashboard event can surface to the caller.
///
/// Stale selection indices are deliberately absent: they occur naturally from
/// event ordering (a selection committed against a pre-search view) and are
/// recovered by clamping, never by failing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ZonescopeError {
    /// The search input could not be parsed as a zone identifier.
    #[error("invalid zone identifier: {0:?}")]
    InvalidInput(String),

    /// The identifier parsed but matched no coarse zone.
    #[error("no coarse zone matches id {0}")]
    NotFound(ZoneId),

    /// Two geometry collections are tagged with different reference frames.
    /// Fatal to the current operation; prior state is left intact.
    #[error("reference frame mismatch: expected EPSG:{expected}, found EPSG:{found}")]
    ReferenceFrameMismatch { expected: u32, found: u32 },
}
