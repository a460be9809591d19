/// Notifies the application that the map should be drawn again.
pub trait Messenger: Send + Sync {
    /// Requests a redraw of the map.
    fn request_redraw(&self);
}

impl<T: Fn() + Send + Sync> Messenger for T {
    fn request_redraw(&self) {
        self()
    }
}
