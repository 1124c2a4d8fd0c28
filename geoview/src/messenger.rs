/// Notifies the host application that the viewer state changed and the map should be redrawn.
pub trait Messenger: Send + Sync {
    /// Request a new render pass.
    fn request_redraw(&self);
}

/// Messenger that ignores all requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMessenger {}

impl Messenger for DummyMessenger {
    fn request_redraw(&self) {}
}
