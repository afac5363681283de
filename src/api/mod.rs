//! HTTP client for the aggregation server's `/v1` REST API.

mod client;
mod types;

pub use client::{ApiClient, ApiError};
pub use types::{FeedId, FeedRecord, FollowRecord, PostRecord, UserRecord};
