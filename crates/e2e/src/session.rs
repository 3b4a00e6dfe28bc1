//! A remote editor session and the poller its steps wait with

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wedtest_common::probe::{FnProbe, SampleFn};
use wedtest_common::{
    classify_environment, probe_fn, sample_fn, CapabilityMap, EnvironmentConfig, HarnessConfig,
    Poller, Probe, Readiness, Remote,
};

use crate::error::{E2eError, E2eResult};

/// Handle the step layer drives the editor through
///
/// Cheap to clone; clones share the underlying session.
#[derive(Clone)]
pub struct EditorSession {
    remote: Arc<Remote>,
    poller: Poller,
    environment: EnvironmentConfig,
}

impl EditorSession {
    pub fn new(remote: Arc<Remote>, poller: Poller, environment: EnvironmentConfig) -> Self {
        Self {
            remote,
            poller,
            environment,
        }
    }

    pub fn from_config(remote: Arc<Remote>, config: &HarnessConfig) -> Self {
        Self::new(
            remote,
            Poller::from_config(&config.poll),
            config.environment.clone(),
        )
    }

    pub fn remote(&self) -> &Remote {
        &*self.remote
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn environment(&self) -> &EnvironmentConfig {
        &self.environment
    }

    /// Reference capability flags for the configured browser
    pub fn capabilities(&self) -> E2eResult<CapabilityMap> {
        Ok(classify_environment(&self.environment)?)
    }

    /// Wait on `probe` with the session's default timeout
    pub async fn wait<P>(&self, probe: P) -> E2eResult<P::Output>
    where
        P: Probe<Remote, Error = E2eError>,
    {
        self.poller.wait(self.remote(), probe).await
    }

    pub async fn wait_timeout<P>(&self, probe: P, timeout: Duration) -> E2eResult<P::Output>
    where
        P: Probe<Remote, Error = E2eError>,
    {
        self.poller.wait_timeout(self.remote(), probe, timeout).await
    }

    /// Run a script once and decode what it returns
    pub async fn query<T: DeserializeOwned>(
        &self,
        what: &str,
        script: &str,
        args: &[Value],
    ) -> E2eResult<T> {
        let value = self.remote.execute(script, args).await?;
        decode(what, value)
    }
}

/// Decode a script result, keeping the raw value for the error
pub(crate) fn decode<T: DeserializeOwned>(what: &str, value: Value) -> E2eResult<T> {
    serde_json::from_value(value.clone()).map_err(|_| E2eError::UnexpectedValue {
        what: what.to_string(),
        value,
    })
}

/// Always-ready probe over the session
pub(crate) fn sample<T, F>(f: F) -> SampleFn<F, T, E2eError>
where
    F: for<'a> FnMut(&'a Remote) -> BoxFuture<'a, E2eResult<T>> + Send,
{
    sample_fn::<Remote, T, E2eError, F>(f)
}

/// Self-classifying probe over the session
pub(crate) fn probe<T, F>(f: F) -> FnProbe<F, T, E2eError>
where
    F: for<'a> FnMut(&'a Remote) -> BoxFuture<'a, E2eResult<Readiness<T>>> + Send,
{
    probe_fn::<Remote, T, E2eError, F>(f)
}

/// Probe that runs `script` and is ready once it returns `true`
pub(crate) fn truthy(
    what: &'static str,
    script: &'static str,
) -> impl Probe<Remote, Output = (), Error = E2eError> {
    probe(move |remote: &Remote| {
        Box::pin(async move {
            let value = remote.execute(script, &[]).await?;
            let ready = decode::<Option<bool>>(what, value)?.unwrap_or(false);
            Ok::<_, E2eError>(if ready {
                Readiness::Ready(())
            } else {
                Readiness::NotReady
            })
        })
    })
}
