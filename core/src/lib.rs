//! Blocking JSON API client with sample facades.
//!
//! # Overview
//! `RequestDispatcher` turns a method, a relative path and optional query
//! parameters, body and header overrides into one HTTP round-trip and
//! returns the decoded JSON. Two facades sit on top of it:
//! `PlaceholderApi` (posts/users CRUD) and `WeatherApi` (current
//! conditions and forecasts, keyed by query parameter).
//!
//! # Design
//! - The dispatcher is immutable after construction; calls share nothing.
//! - Request building and response parsing are pure; only the
//!   [`Transport`] does I/O, so both halves are testable without a server.
//! - Every failure is a [`DispatchError`]. Nothing is retried.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod placeholder;
pub mod transport;
pub mod types;
pub mod weather;

pub use config::{DispatcherConfig, DEFAULT_TIMEOUT};
pub use dispatcher::{Call, RequestDispatcher, USER_AGENT};
pub use error::{ConfigError, DispatchError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use placeholder::{PlaceholderApi, PLACEHOLDER_BASE_URL};
pub use transport::{Transport, UreqTransport};
pub use types::{NewPost, PostUpdate};
pub use weather::{Units, WeatherApi, WEATHER_BASE_URL};
