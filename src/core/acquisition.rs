use crate::core::run::RunToken;
use crate::domain::exclusion::ExclusionSet;
use crate::domain::model::{AcquisitionOutcome, Candidate};
use crate::domain::ports::RecordSource;
use crate::utils::error::Result;
use chrono::Utc;

pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Fetches candidates from a `RecordSource` until one passes the exclusion
/// set, the attempt budget runs out, a fetch fails, or the run is superseded.
pub struct Acquirer<R: RecordSource> {
    source: R,
    max_attempts: usize,
}

impl<R: RecordSource> Acquirer<R> {
    pub fn new(source: R) -> Self {
        Self::with_max_attempts(source, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(source: R, max_attempts: usize) -> Self {
        Self {
            source,
            max_attempts,
        }
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub async fn acquire(&self, exclusions: &ExclusionSet) -> AcquisitionOutcome {
        self.acquire_run(exclusions, &RunToken::detached()).await
    }

    pub async fn acquire_run(&self, exclusions: &ExclusionSet, token: &RunToken) -> AcquisitionOutcome {
        let started = Utc::now();
        tracing::info!(
            "🐱 Run #{}: looking for a cat ({} exclusions, up to {} attempts)",
            token.id(),
            exclusions.len(),
            self.max_attempts
        );

        let mut attempts = 0;
        let mut accepted = None;

        while accepted.is_none() && attempts < self.max_attempts {
            // 每次往返前檢查是否已被新的請求取代
            if token.is_superseded() {
                return superseded(token, attempts);
            }

            let candidate = match self.attempt(token).await {
                Ok(Some(candidate)) => candidate,
                Ok(None) => return superseded(token, attempts),
                Err(error) => {
                    tracing::warn!(
                        "❌ Run #{} failed on attempt {}: {}",
                        token.id(),
                        attempts + 1,
                        error
                    );
                    return AcquisitionOutcome::Failed { error, attempts };
                }
            };

            match exclusions.matching_rule(&candidate) {
                Some(rule) => tracing::debug!(
                    "Attempt {}: {} ({}) excluded by {}",
                    attempts + 1,
                    candidate.id,
                    candidate.breed_name().unwrap_or("unknown breed"),
                    rule
                ),
                None => accepted = Some(candidate),
            }

            attempts += 1;
        }

        let elapsed_ms = (Utc::now() - started).num_milliseconds();
        match accepted {
            Some(candidate) => {
                tracing::info!(
                    "✅ Run #{} accepted {} ({}) after {} attempts in {}ms",
                    token.id(),
                    candidate.id,
                    candidate.breed_name().unwrap_or("no breed data"),
                    attempts,
                    elapsed_ms
                );
                AcquisitionOutcome::Accepted {
                    candidate,
                    attempts,
                }
            }
            None => {
                tracing::warn!(
                    "🙀 Run #{} found no acceptable cat after {} attempts in {}ms",
                    token.id(),
                    attempts,
                    elapsed_ms
                );
                AcquisitionOutcome::Exhausted { attempts }
            }
        }
    }

    /// One search + detail round trip pair. `None` when the run was
    /// superseded while the search was in flight.
    async fn attempt(&self, token: &RunToken) -> Result<Option<Candidate>> {
        let hit = self.source.search().await?;
        tracing::debug!("Search returned {} ({})", hit.id, hit.url);
        if token.is_superseded() {
            return Ok(None);
        }
        self.source.fetch(&hit.id).await.map(Some)
    }
}

fn superseded(token: &RunToken, attempts: usize) -> AcquisitionOutcome {
    tracing::info!("⏭️ Run #{} superseded after {} attempts", token.id(), attempts);
    AcquisitionOutcome::Superseded { attempts }
}
