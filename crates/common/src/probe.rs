//! Probes: one sample of remote state, classified as ready or not
//!
//! A probe never signals "not ready" through its data. `Ready(0)`,
//! `Ready(false)` and `Ready(None)` are all results; only
//! [`Readiness::NotReady`] asks the poller to try again.

use std::marker::PhantomData;

use async_trait::async_trait;
use futures::future::BoxFuture;

/// Outcome of one probe evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Readiness<T> {
    Ready(T),
    NotReady,
}

impl<T> Readiness<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Readiness<U> {
        match self {
            Readiness::Ready(value) => Readiness::Ready(f(value)),
            Readiness::NotReady => Readiness::NotReady,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Readiness::Ready(value) => Some(value),
            Readiness::NotReady => None,
        }
    }
}

impl<T> From<Option<T>> for Readiness<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Readiness::Ready(value),
            None => Readiness::NotReady,
        }
    }
}

/// A repeatable query against a state source `S`
///
/// Errors returned from [`Probe::evaluate`] are fatal to the wait that is
/// driving the probe: the poller hands them back to its caller untouched.
#[async_trait]
pub trait Probe<S: ?Sized + Sync>: Send {
    type Output: Send;
    type Error: Send;

    async fn evaluate(&mut self, source: &S) -> Result<Readiness<Self::Output>, Self::Error>;
}

/// Probe backed by a closure that classifies its own sample
pub struct FnProbe<F, T, E> {
    f: F,
    _marker: PhantomData<fn() -> (T, E)>,
}

/// Build a probe from a closure returning a boxed future
///
/// ```ignore
/// let probe = probe_fn(|session: &dyn RemoteStateSource| {
///     Box::pin(async move {
///         let flag = session.execute("return window.done;", &[]).await?;
///         Ok(if flag == Value::Bool(true) { Readiness::Ready(()) } else { Readiness::NotReady })
///     })
/// });
/// ```
pub fn probe_fn<S, T, E, F>(f: F) -> FnProbe<F, T, E>
where
    S: ?Sized + Sync,
    F: for<'a> FnMut(&'a S) -> BoxFuture<'a, Result<Readiness<T>, E>> + Send,
{
    FnProbe {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<S, T, E, F> Probe<S> for FnProbe<F, T, E>
where
    S: ?Sized + Sync,
    T: Send,
    E: Send,
    F: for<'a> FnMut(&'a S) -> BoxFuture<'a, Result<Readiness<T>, E>> + Send,
{
    type Output = T;
    type Error = E;

    async fn evaluate(&mut self, source: &S) -> Result<Readiness<T>, E> {
        (self.f)(source).await
    }
}

/// Probe backed by a closure that only samples; every sample is ready
pub struct SampleFn<F, T, E> {
    f: F,
    _marker: PhantomData<fn() -> (T, E)>,
}

/// Build an always-ready probe from a sampling closure
///
/// Useful as the inner probe of [`changed_from`] and [`until`].
pub fn sample_fn<S, T, E, F>(f: F) -> SampleFn<F, T, E>
where
    S: ?Sized + Sync,
    F: for<'a> FnMut(&'a S) -> BoxFuture<'a, Result<T, E>> + Send,
{
    SampleFn {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<S, T, E, F> Probe<S> for SampleFn<F, T, E>
where
    S: ?Sized + Sync,
    T: Send,
    E: Send,
    F: for<'a> FnMut(&'a S) -> BoxFuture<'a, Result<T, E>> + Send,
{
    type Output = T;
    type Error = E;

    async fn evaluate(&mut self, source: &S) -> Result<Readiness<T>, E> {
        (self.f)(source).await.map(Readiness::Ready)
    }
}

/// Ready with the first sample that differs from a value captured earlier
pub struct ChangedFrom<P, V> {
    inner: P,
    prior: V,
}

/// Wait for a value to move away from `prior`
///
/// Comparison is structural (`PartialEq`). When `V` is an `Option`, a
/// prior of `None` stays not-ready for as long as the sample is also
/// `None`.
pub fn changed_from<P, V>(inner: P, prior: V) -> ChangedFrom<P, V> {
    ChangedFrom { inner, prior }
}

#[async_trait]
impl<S, P, V> Probe<S> for ChangedFrom<P, V>
where
    S: ?Sized + Sync,
    P: Probe<S, Output = V>,
    V: PartialEq + Send,
{
    type Output = V;
    type Error = P::Error;

    async fn evaluate(&mut self, source: &S) -> Result<Readiness<V>, P::Error> {
        Ok(match self.inner.evaluate(source).await? {
            Readiness::Ready(value) if value != self.prior => Readiness::Ready(value),
            _ => Readiness::NotReady,
        })
    }
}

/// Ready once a measured collection size equals a target
pub struct UntilCount<P> {
    inner: P,
    target: usize,
}

/// Wait for a collection to reach exactly `target` elements
///
/// The inner probe reports `NotReady` when the size cannot be measured
/// yet, so a target of zero is never satisfied by a missing measurement.
pub fn until_count<P>(inner: P, target: usize) -> UntilCount<P> {
    UntilCount { inner, target }
}

#[async_trait]
impl<S, P> Probe<S> for UntilCount<P>
where
    S: ?Sized + Sync,
    P: Probe<S, Output = usize>,
{
    type Output = usize;
    type Error = P::Error;

    async fn evaluate(&mut self, source: &S) -> Result<Readiness<usize>, P::Error> {
        Ok(match self.inner.evaluate(source).await? {
            Readiness::Ready(count) if count == self.target => Readiness::Ready(count),
            _ => Readiness::NotReady,
        })
    }
}

/// Ready with the first sample that satisfies a predicate
pub struct Until<P, F> {
    inner: P,
    predicate: F,
}

pub fn until<P, F>(inner: P, predicate: F) -> Until<P, F> {
    Until { inner, predicate }
}

#[async_trait]
impl<S, P, F> Probe<S> for Until<P, F>
where
    S: ?Sized + Sync,
    P: Probe<S>,
    F: FnMut(&P::Output) -> bool + Send,
{
    type Output = P::Output;
    type Error = P::Error;

    async fn evaluate(&mut self, source: &S) -> Result<Readiness<P::Output>, P::Error> {
        Ok(match self.inner.evaluate(source).await? {
            Readiness::Ready(value) if (self.predicate)(&value) => Readiness::Ready(value),
            _ => Readiness::NotReady,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Hands out a fixed sequence, repeating the last entry forever
    struct Script<T> {
        values: Mutex<Vec<T>>,
    }

    impl<T: Clone> Script<T> {
        fn new(mut values: Vec<T>) -> Self {
            values.reverse();
            Self {
                values: Mutex::new(values),
            }
        }

        fn next(&self) -> T {
            let mut values = self.values.lock().unwrap();
            if values.len() > 1 {
                values.pop().unwrap()
            } else {
                values[0].clone()
            }
        }
    }

    #[test]
    fn test_readiness_from_option() {
        assert_eq!(Readiness::from(Some(0)), Readiness::Ready(0));
        assert_eq!(Readiness::<i32>::from(None), Readiness::NotReady);
        assert!(Readiness::Ready(false).is_ready());
        assert_eq!(Readiness::Ready(2).map(|v| v * 2).into_option(), Some(4));
    }

    #[tokio::test]
    async fn test_changed_from_ignores_equal_samples() {
        let script = Script::new(vec![3, 3, 5]);
        let mut probe = changed_from(
            sample_fn::<_, i32, (), _>(|script: &Script<i32>| Box::pin(async move { Ok(script.next()) })),
            3,
        );

        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::NotReady));
        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::NotReady));
        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::Ready(5)));
    }

    #[tokio::test]
    async fn test_changed_from_absent_prior() {
        let script = Script::new(vec![None, Some((10, 20))]);
        let mut probe = changed_from(
            sample_fn::<_, Option<(i32, i32)>, (), _>(|script: &Script<Option<(i32, i32)>>| {
                Box::pin(async move { Ok(script.next()) })
            }),
            None,
        );

        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::NotReady));
        assert_eq!(
            probe.evaluate(&script).await,
            Ok(Readiness::Ready(Some((10, 20))))
        );
    }

    #[tokio::test]
    async fn test_until_count_zero_is_not_unmeasured() {
        let script = Script::new(vec![Readiness::NotReady, Readiness::Ready(0usize)]);
        let inner = probe_fn::<_, usize, (), _>(|script: &Script<Readiness<usize>>| {
            Box::pin(async move { Ok(script.next()) })
        });
        let mut probe = until_count(inner, 0);

        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::NotReady));
        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::Ready(0)));
    }

    #[tokio::test]
    async fn test_until_predicate() {
        let script = Script::new(vec![1, 2, 7]);
        let mut probe = until(
            sample_fn::<_, i32, (), _>(|script: &Script<i32>| Box::pin(async move { Ok(script.next()) })),
            |v: &i32| *v > 5,
        );

        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::NotReady));
        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::NotReady));
        assert_eq!(probe.evaluate(&script).await, Ok(Readiness::Ready(7)));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let mut probe = changed_from(
            sample_fn::<(), i32, &'static str, _>(|_: &()| Box::pin(async { Err("query rejected") })),
            0,
        );

        assert_eq!(probe.evaluate(&()).await, Err("query rejected"));
    }
}
