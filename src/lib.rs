pub mod autoplay;
pub mod carousel;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod rate_limiter;
pub mod response;
pub mod server;
pub mod validation;

pub use autoplay::Autoplay;
pub use carousel::{Breakpoint, Carousel, CarouselView};
pub use config::Config;
pub use error::{ApiError, Result};
pub use rate_limiter::{LimiterOptions, RateLimitStatus, RateLimiter};
pub use server::create_app;
