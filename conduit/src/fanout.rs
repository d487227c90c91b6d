use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use conduit_core::{Broker, ConduitError};

/// Attach the broker name to an error unless it already carries one.
pub fn tag_err(broker: &str, e: ConduitError) -> ConduitError {
    match e {
        e @ (ConduitError::Broker { .. }
        | ConduitError::BrokerTimeout { .. }
        | ConduitError::BrokersFailed { .. }
        | ConduitError::Routing(_)
        | ConduitError::UnknownBroker { .. }) => e,
        other => ConduitError::broker(broker, other.to_string()),
    }
}

/// Collapse the failures of one fan-out into a single error.
///
/// Rules:
/// - One failure is returned as-is.
/// - Several failures become `BrokersFailed`, in broker construction order.
pub fn collapse_fanout_errors(operation: &str, mut errors: Vec<ConduitError>) -> ConduitError {
    if errors.len() == 1
        && let Some(only) = errors.pop()
    {
        return only;
    }
    ConduitError::BrokersFailed {
        operation: operation.to_string(),
        errors,
    }
}

/// Await a broker future, bounded by `timeout` when one is set.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "conduit::fanout::call_with_timeout",
        skip_all,
        fields(broker = %broker, operation = %operation),
    )
)]
pub async fn call_with_timeout<T, Fut>(
    broker: &str,
    operation: &str,
    timeout: Option<Duration>,
    fut: Fut,
) -> Result<T, ConduitError>
where
    Fut: Future<Output = Result<T, ConduitError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or_else(|_| Err(ConduitError::broker_timeout(broker, operation))),
        None => fut.await,
    }
}

/// Run `call` against every broker concurrently and wait for all of them.
///
/// Each broker call runs in its own task, so a broker that panics cannot
/// cancel the others; the panic is reported as that broker's error.
/// Successful results come back in construction order. If any broker fails,
/// every attempt still runs to completion and the failures are collapsed with
/// [`collapse_fanout_errors`]; no partial results are returned.
///
/// # Panics
/// Panics if called outside a Tokio runtime.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "conduit::fanout::fan_out",
        skip_all,
        fields(operation = %operation, brokers = brokers.len()),
    )
)]
pub async fn fan_out<T, F, Fut>(
    brokers: &[Arc<dyn Broker>],
    operation: &'static str,
    timeout: Option<Duration>,
    call: F,
) -> Result<Vec<T>, ConduitError>
where
    F: Fn(Arc<dyn Broker>) -> Fut,
    Fut: Future<Output = Result<T, ConduitError>> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = brokers
        .iter()
        .map(|b| {
            let name = b.name().to_string();
            let fut = call(Arc::clone(b));
            let task_name = name.clone();
            let task = tokio::spawn(async move {
                call_with_timeout(&task_name, operation, timeout, fut).await
            });
            (name, task)
        })
        .collect();

    let results = futures::future::join_all(handles.into_iter().map(|(name, task)| async move {
        match task.await {
            Ok(res) => res.map_err(|e| tag_err(&name, e)),
            Err(e) if e.is_panic() => {
                let msg = panic_message(e.into_panic());
                #[cfg(feature = "tracing")]
                tracing::error!(broker = %name, operation, panic = %msg, "broker call panicked");
                Err(ConduitError::broker(name, format!("{operation} panicked: {msg}")))
            }
            Err(e) => Err(ConduitError::broker(name, e.to_string())),
        }
    }))
    .await;

    let mut values = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for r in results {
        match r {
            Ok(v) => values.push(v),
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        return Ok(values);
    }
    #[cfg(feature = "tracing")]
    tracing::warn!(operation, failed = errors.len(), "fan-out failed");
    Err(collapse_fanout_errors(operation, errors))
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(s) => *s,
        Err(payload) => payload
            .downcast_ref::<&'static str>()
            .map_or_else(|| "non-string panic payload".to_string(), |s| (*s).to_string()),
    }
}
