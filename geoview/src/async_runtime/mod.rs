use std::future::Future;

use tokio::task::JoinHandle;

/// Runs the future on the tokio runtime in the background.
pub fn spawn<T>(future: T) -> JoinHandle<T::Output>
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    tokio::spawn(future)
}
