//! Concurrency-limited admission of outbound requests.
//!
//! # Design
//! Every request the client sends passes through `RequestQueue::admit`. At
//! most `limit` requests are handed to the transport at once; the rest wait
//! on a `tokio::sync::Semaphore`, which is fair, so waiters are admitted in
//! submission order as slots free up. Waiting is notification driven, never
//! polled.
//!
//! An entry moves queued → active → completed. A transport failure is
//! returned to that entry's caller only. The queue adds no retries and no
//! timeout of its own.
//!
//! Dropping an `admit` future while it is still queued removes it from the
//! line without consuming a slot. Once admitted, the send runs on its own
//! task that owns the slot, so an active entry runs to completion and keeps
//! its slot even if the caller stops waiting for it.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

pub struct RequestQueue {
    transport: Arc<dyn Transport>,
    slots: Arc<Semaphore>,
    limit: usize,
    active: Arc<AtomicUsize>,
    pending: Arc<AtomicUsize>,
}

impl RequestQueue {
    /// A `limit` of zero is treated as one.
    pub fn new(transport: Arc<dyn Transport>, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            transport,
            slots: Arc::new(Semaphore::new(limit)),
            limit,
            active: Arc::default(),
            pending: Arc::default(),
        }
    }

    /// Wait for a free slot, then send `request` through the transport.
    ///
    /// Resolves exactly as the transport does, or with
    /// `TransportError::Cancelled` if the queue is closed while this entry
    /// is still waiting.
    pub async fn admit(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let queued = Gauge::enter(&self.pending);
        let permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| TransportError::Cancelled)?;
        drop(queued);

        let active = Gauge::enter(&self.active);
        debug!(
            method = %request.method,
            url = %request.url,
            active = self.active(),
            pending = self.pending(),
            "request admitted"
        );
        let transport = self.transport.clone();
        let send = tokio::spawn(async move {
            let _slot = (active, permit);
            transport.send(request).await
        });
        match send.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(TransportError::Request(e.to_string())),
        }
    }

    /// Reject every entry that is still waiting. Active entries finish
    /// normally; later `admit` calls fail immediately.
    pub fn close(&self) {
        self.slots.close();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Entries currently handed to the transport.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Entries waiting for a slot.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestQueue")
            .field("limit", &self.limit)
            .field("active", &self.active())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Increments a counter for as long as it lives.
struct Gauge(Arc<AtomicUsize>);

impl Gauge {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for Gauge {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
