use crate::domain::model::{Candidate, SearchHit};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// External source of image records. One call per round trip.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Lightweight lookup returning one record reference.
    async fn search(&self) -> Result<SearchHit>;

    /// Full record, including breed metadata, for an id returned by `search`.
    async fn fetch(&self, id: &str) -> Result<Candidate>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn max_attempts(&self) -> usize;
    fn request_timeout(&self) -> Option<Duration>;
}
