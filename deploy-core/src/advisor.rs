use crate::{AdvisoryError, AdvisoryResult, RequestParameters};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod client;

/// Anything that can answer "should I deploy today?" for a set of parameters.
///
/// Implementations make exactly one attempt per call; retrying is up to the caller.
#[async_trait]
pub trait Advisor: Send + Sync + Debug {
    async fn advise(&self, params: &RequestParameters) -> Result<AdvisoryResult, AdvisoryError>;
}
