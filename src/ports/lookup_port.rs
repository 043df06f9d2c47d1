//! Fund lookup port trait.

use async_trait::async_trait;

use crate::domain::error::LookupError;
use crate::domain::fund_info::FundInfo;

/// Resolves a fund code to its display name using an external source.
#[async_trait]
pub trait FundLookup: Send + Sync {
    async fn lookup(&self, code: &str) -> Result<FundInfo, LookupError>;
}
