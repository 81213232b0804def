use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::error;

use sheetbill_invoicing::InvoiceDocument;

use crate::{DocumentRenderer, InvoiceRenderer, RenderError};

/// Bounded set of render slots shared by all request handlers.
///
/// Each render runs on a blocking thread while holding one slot, so at most
/// `capacity` documents are painted concurrently and the async workers never
/// block on PDF generation.
pub struct RenderPool<R = DocumentRenderer> {
    renderer: Arc<R>,
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl<R> Clone for RenderPool<R> {
    fn clone(&self) -> Self {
        Self {
            renderer: self.renderer.clone(),
            slots: self.slots.clone(),
            capacity: self.capacity,
        }
    }
}

impl<R: InvoiceRenderer> RenderPool<R> {
    /// A capacity of zero is raised to one.
    pub fn new(renderer: R, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            renderer: Arc::new(renderer),
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<RenderLease<R>, RenderError> {
        let permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| RenderError::PoolClosed)?;
        Ok(RenderLease {
            renderer: self.renderer.clone(),
            permit,
        })
    }

    /// Acquire a slot and render `doc` with it.
    pub async fn render(&self, doc: InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        self.acquire().await?.render(doc).await
    }

    /// Refuse further renders; waiters fail with [`RenderError::PoolClosed`].
    pub fn close(&self) {
        self.slots.close();
    }
}

/// One acquired render slot. Released when the render finishes.
pub struct RenderLease<R> {
    renderer: Arc<R>,
    permit: OwnedSemaphorePermit,
}

impl<R: InvoiceRenderer> RenderLease<R> {
    pub async fn render(self, doc: InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        let RenderLease { renderer, permit } = self;
        let invoice_number = doc.invoice_number();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            renderer.render(&doc)
        })
        .await
        .map_err(|e| {
            error!(invoice_number, error = %e, "render task failed");
            RenderError::Panicked(e.to_string())
        })?
    }
}
