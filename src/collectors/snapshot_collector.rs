use super::{
    endpoint_poller::{
        poll_endpoint,
        SnapshotClient,
    },
    Collector,
};
use crate::{
    error::{
        EndpointFailure,
        GatherError,
        PollError,
    },
    metrics::{
        unknown_groups,
        Accumulator,
        Role,
    },
};
use futures::{
    stream::FuturesUnordered,
    StreamExt as _,
};
use snapshot_gatherer_config::RoleConfig;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};

/// Timeout hint used when none is configured, in ms.
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Fans a gather out to every endpoint of one role.
pub struct SnapshotCollector {
    role: Role,
    config: RoleConfig,
    client: SnapshotClient,
}

impl SnapshotCollector {
    pub fn new(role: Role, config: RoleConfig, client: SnapshotClient) -> Self {
        for name in unknown_groups(role, &config.collections) {
            warn!(%role, group = name, "Unknown metrics group in collections, it keeps nothing");
        }
        Self { role, config, client }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn config(&self) -> &RoleConfig {
        &self.config
    }

    /// Configured endpoints, or the role's local default when none are.
    pub fn endpoints(&self) -> Vec<String> {
        if self.config.endpoints.is_empty() {
            vec![self.role.descriptor().default_endpoint()]
        } else {
            self.config.endpoints.clone()
        }
    }

    fn fill_default_timeout(&mut self) {
        if self.config.timeout == 0 {
            warn!(role = %self.role, "Missing timeout value, setting default value ({DEFAULT_TIMEOUT_MS}ms)");
            self.config.timeout = DEFAULT_TIMEOUT_MS;
        }
    }

    /// Polls all endpoints concurrently and waits for every one of them.
    ///
    /// Successful endpoints are delivered to `acc` regardless of failures
    /// elsewhere. Failures are returned together, in completion order.
    pub async fn gather(&mut self, acc: Arc<dyn Accumulator>) -> Result<(), GatherError> {
        self.fill_default_timeout();

        let role = self.role;
        let config = Arc::new(self.config.clone());
        let endpoints = self.endpoints();
        debug!(%role, endpoints = endpoints.len(), "Gathering snapshots");

        let mut polls: FuturesUnordered<_> = endpoints
            .into_iter()
            .map(|address| {
                let client = self.client.clone();
                let config = config.clone();
                let acc = acc.clone();
                let task = tokio::spawn({
                    let address = address.clone();
                    async move { poll_endpoint(&client, role, &config, &address, acc.as_ref()).await }
                });
                async move { (address, task.await) }
            })
            .collect();

        let mut failures = Vec::new();
        while let Some((endpoint, outcome)) = polls.next().await {
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error,
                Err(join_error) => {
                    error!(%role, %endpoint, %join_error, "Poll task failed");
                    PollError::Aborted(endpoint.clone())
                }
            };
            debug!(%role, %endpoint, %error, "Endpoint failed");
            failures.push(EndpointFailure { endpoint, error });
        }

        match GatherError::from_failures(failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Collector for SnapshotCollector {
    fn collect(
        &mut self,
        acc: Arc<dyn Accumulator>,
    ) -> Pin<Box<dyn Future<Output = Result<(), GatherError>> + Send + '_>> {
        Box::pin(self.gather(acc))
    }

    fn description(&self) -> &'static str {
        self.role.descriptor().description
    }

    fn sample_config(&self) -> &'static str {
        self.role.descriptor().sample_config
    }

    fn name(&self) -> &'static str {
        self.role.descriptor().measurement
    }
}
