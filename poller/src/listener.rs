use async_trait::async_trait;

/// Hook invoked after a refresh completes.
///
/// No payload is passed; implementors read the current state through a
/// [`StatusHandle`](crate::StatusHandle) they hold.
#[async_trait]
pub trait StatusListener: Send + Sync {
    async fn status_changed(&self);
}
