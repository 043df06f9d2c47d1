//! Fund lookup results and how they pre-fill new holdings.
//!
//! A lookup never touches the ledger. Callers turn a successful result into a
//! [`NewHolding`] and add it themselves.

use super::error::LookupError;
use super::holding::NewHolding;
use crate::ports::lookup_port::FundLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundInfo {
    pub name: String,
    pub code: String,
}

/// Trims `code` and rejects it when empty before asking `port`.
pub async fn lookup_fund(port: &dyn FundLookup, code: &str) -> Result<FundInfo, LookupError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(LookupError::EmptyCode);
    }
    let result = port.lookup(code).await;
    match &result {
        Ok(info) => tracing::debug!(code, name = %info.name, "fund lookup succeeded"),
        Err(e) => tracing::warn!(code, "fund lookup failed: {e}"),
    }
    result
}

/// Builds the holding to add once a lookup has settled.
///
/// A successful lookup supplies name and code. On failure `fallback_name`
/// is used with the code as typed; without one the lookup error is returned
/// so the caller can ask for manual entry.
pub fn prefill_holding(
    lookup: Result<FundInfo, LookupError>,
    code: &str,
    fallback_name: Option<&str>,
) -> Result<NewHolding, LookupError> {
    match (lookup, fallback_name) {
        (Ok(info), _) => Ok(NewHolding::new(info.name, info.code)),
        (Err(_), Some(name)) => Ok(NewHolding::new(name, code.trim())),
        (Err(e), None) => Err(e),
    }
}
