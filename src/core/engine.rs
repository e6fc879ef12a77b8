use crate::core::catalog::Catalog;
use crate::core::posted::{PostedSet, PostedStore};
use crate::core::selector;
use crate::domain::model::{CatalogRecord, DispatchReceipt, RunReport, SendConfirmation};
use crate::domain::ports::{Broadcaster, ImageVerifier, Storage};
use crate::utils::error::{BroadcastError, Result};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Selecting,
    Verifying,
    Dispatching,
    Committing,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Selecting => "selecting",
            RunState::Verifying => "verifying",
            RunState::Dispatching => "dispatching",
            RunState::Committing => "committing",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(2),
        }
    }
}

struct AttemptFailure {
    state: RunState,
    error: BroadcastError,
}

struct AttemptSuccess {
    record: CatalogRecord,
    image_url: String,
    receipt: DispatchReceipt,
}

/// Drives one daily run: select, verify, dispatch, commit, retrying
/// recoverable failures with a fixed backoff.
pub struct BroadcastEngine<V: ImageVerifier, B: Broadcaster, S: Storage> {
    verifier: V,
    broadcaster: B,
    posted_store: PostedStore<S>,
    policy: RetryPolicy,
    dry_run: bool,
}

impl<V: ImageVerifier, B: Broadcaster, S: Storage> BroadcastEngine<V, B, S> {
    pub fn new(verifier: V, broadcaster: B, posted_store: PostedStore<S>) -> Self {
        Self {
            verifier,
            broadcaster,
            posted_store,
            policy: RetryPolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = RetryPolicy {
            max_attempts: policy.max_attempts.max(1),
            backoff: policy.backoff,
        };
        self
    }

    /// In dry-run mode a successful broadcast is not recorded as posted.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, catalog: &Catalog) -> Result<RunReport> {
        let posted = self.posted_store.load().await?;
        tracing::info!(
            "{} of {} cards still unposted",
            selector::eligible(catalog.records(), &posted).len(),
            catalog.len()
        );

        let max_attempts = self.policy.max_attempts;
        let mut attempt = 1;
        loop {
            tracing::info!("Attempt {} of {}", attempt, max_attempts);

            match self.attempt(catalog, &posted).await {
                Ok(success) => return self.commit(success, attempt).await,
                Err(AttemptFailure { state, error }) => {
                    tracing::debug!("Run state: {} (from {})", RunState::Failed, state);
                    if error.is_partial_success() {
                        tracing::error!(
                            "Attempt {} partially succeeded while {}: {}",
                            attempt,
                            state,
                            error
                        );
                    } else {
                        tracing::error!("Attempt {} failed while {}: {}", attempt, state, error);
                    }

                    if !error.is_retryable() {
                        tracing::error!("{} is not retryable, giving up", error);
                        return Err(error);
                    }

                    if attempt >= max_attempts {
                        tracing::error!("All {} attempts failed for this run", max_attempts);
                        return Err(BroadcastError::RetriesExhausted {
                            attempts: attempt,
                            last_error: Box::new(error),
                        });
                    }

                    tracing::info!("Retrying in {:?}", self.policy.backoff);
                    tokio::time::sleep(self.policy.backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        catalog: &Catalog,
        posted: &PostedSet,
    ) -> std::result::Result<AttemptSuccess, AttemptFailure> {
        let mut state = RunState::Selecting;
        let fail = |state: RunState| move |error: BroadcastError| AttemptFailure { state, error };

        let record = {
            let mut rng = rand::thread_rng();
            selector::pick_unposted(catalog.records(), posted, &mut rng)
                .map_err(fail(state))?
                .clone()
        };
        tracing::info!("Selected card: {} (id: {})", record.title, record.id);

        state = RunState::Verifying;
        let verified = self
            .verifier
            .verify(&record.image_ref)
            .await
            .map_err(fail(state))?;
        tracing::info!("Verified image is accessible at: {}", verified.url);

        state = RunState::Dispatching;
        let dispatched = self
            .broadcaster
            .compose_and_send(&record.title, &verified.url)
            .await;
        verified.artifact.cleanup();
        let receipt = dispatched.map_err(fail(state))?;

        Ok(AttemptSuccess {
            record,
            image_url: verified.url,
            receipt,
        })
    }

    async fn commit(
        &self,
        success: AttemptSuccess,
        attempts: u32,
    ) -> Result<RunReport> {
        tracing::debug!("Run state: {}", RunState::Committing);
        let AttemptSuccess {
            record,
            image_url,
            receipt,
        } = success;

        let committed = if self.dry_run {
            tracing::info!("Dry run: card {} not marked as posted", record.id);
            false
        } else {
            self.posted_store.append(&record.id).await.map_err(|e| {
                tracing::error!(
                    "Broadcast {} went out but {} could not be updated: {}",
                    receipt.broadcast_id,
                    self.posted_store.path(),
                    e
                );
                e
            })?;
            tracing::info!("Marked card {} as posted", record.id);
            true
        };

        if let SendConfirmation::Unconfirmed { .. } = receipt.confirmation {
            tracing::warn!(
                "Broadcast {} was not confirmed by the provider",
                receipt.broadcast_id
            );
        }
        tracing::info!(
            "Broadcast for card '{}' created and sent successfully",
            record.title
        );
        tracing::debug!("Run state: {}", RunState::Done);

        Ok(RunReport {
            card_id: record.id,
            title: record.title,
            image_url,
            broadcast_id: receipt.broadcast_id,
            confirmation: receipt.confirmation,
            attempts,
            committed,
        })
    }
}
