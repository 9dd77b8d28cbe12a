//! Timer-driven advancement for a [`Carousel`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::carousel::{Breakpoint, Carousel, AUTOPLAY_INTERVAL};

/// Advances the carousel once per period. Hover and item changes made through
/// the driver restart the period; dropping it stops the task.
pub struct Autoplay<T> {
    carousel: Arc<Mutex<Carousel<T>>>,
    rearm: Arc<Notify>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Autoplay<T> {
    /// Start autoplay with the default five second period.
    pub fn start(carousel: Carousel<T>) -> Self {
        Self::with_period(carousel, AUTOPLAY_INTERVAL)
    }

    pub fn with_period(carousel: Carousel<T>, period: Duration) -> Self {
        let carousel = Arc::new(Mutex::new(carousel));
        let rearm = Arc::new(Notify::new());
        let task = tokio::spawn(run(carousel.clone(), rearm.clone(), period));

        Self {
            carousel,
            rearm,
            task,
        }
    }

    pub async fn set_hovered(&self, hovered: bool) {
        let changed = self.carousel.lock().await.set_hovered(hovered);
        if changed {
            self.rearm.notify_one();
        }
    }

    pub async fn set_items(&self, items: Vec<T>) {
        self.carousel.lock().await.set_items(items);
        self.rearm.notify_one();
    }

    pub async fn resize(&self, viewport_width: u32) -> Breakpoint {
        self.carousel.lock().await.resize(viewport_width)
    }

    pub async fn advance(&self) {
        self.carousel.lock().await.advance();
    }

    pub async fn retreat(&self) {
        self.carousel.lock().await.retreat();
    }

    pub async fn go_to(&self, index: usize) {
        self.carousel.lock().await.go_to(index);
    }

    pub async fn current_index(&self) -> usize {
        self.carousel.lock().await.current_index()
    }

    /// Run `f` against the carousel, e.g. to build a view.
    pub async fn with<R>(&self, f: impl FnOnce(&Carousel<T>) -> R) -> R {
        let carousel = self.carousel.lock().await;
        f(&carousel)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl<T> Drop for Autoplay<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T>(carousel: Arc<Mutex<Carousel<T>>>, rearm: Arc<Notify>, period: Duration) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(period) => {
                let mut carousel = carousel.lock().await;
                if carousel.tick() {
                    debug!(index = carousel.current_index(), "Autoplay advanced");
                }
            }
            _ = rearm.notified() => {
                debug!("Autoplay timer re-armed");
            }
        }
    }
}
