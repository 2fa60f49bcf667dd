use crate::error::ErrorResponse;
use crate::middleware::client_ip::extract_client_ip;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Fixed-window counter for one client.
#[derive(Clone)]
struct RateLimitBucket {
    count: u32,
    reset_at: Instant,
}

impl RateLimitBucket {
    fn new(window_seconds: u64) -> Self {
        Self {
            count: 0,
            reset_at: Instant::now() + Duration::from_secs(window_seconds),
        }
    }

    fn check_and_increment(&mut self, limit: u32, window_seconds: u64) -> (bool, u32) {
        let now = Instant::now();

        // Reset if window expired
        if now >= self.reset_at {
            self.count = 0;
            self.reset_at = now + Duration::from_secs(window_seconds);
        }

        if self.count < limit {
            self.count += 1;
            (true, limit.saturating_sub(self.count))
        } else {
            (false, 0)
        }
    }

    fn reset_in(&self) -> Duration {
        self.reset_at.saturating_duration_since(Instant::now())
    }
}

/// Sharded in-memory rate limiter keyed by client IP.
///
/// Multiple shards (separate HashMaps) distribute load so a hot path does not
/// serialize on a single mutex. Keys are hashed to pick a shard.
#[derive(Clone)]
pub struct HttpRateLimiter {
    shards: Vec<Arc<Mutex<HashMap<String, RateLimitBucket>>>>,
    shard_count: usize,
    limit_per_minute: u32,
    window_seconds: u64,
    max_buckets: usize,
}

impl HttpRateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self::with_shards(limit_per_minute, 16)
    }

    /// `shard_count` should be a power of two for even distribution.
    pub fn with_shards(limit_per_minute: u32, shard_count: usize) -> Self {
        let shards = (0..shard_count)
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            shard_count,
            limit_per_minute,
            window_seconds: 60,
            max_buckets: 10_000,
        }
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shard_count
    }

    /// Remove buckets whose window expired past a grace period, across all shards.
    pub async fn cleanup_expired_buckets(&self) {
        let now = Instant::now();
        let grace_period = Duration::from_secs(self.window_seconds);
        let mut total_cleaned = 0;

        for shard in &self.shards {
            let mut buckets = shard.lock().await;
            let before_count = buckets.len();
            buckets.retain(|_key, bucket| {
                bucket.reset_at > now || (now - bucket.reset_at) < grace_period
            });
            total_cleaned += before_count - buckets.len();
        }

        if total_cleaned > 0 {
            tracing::debug!(
                buckets_cleaned = total_cleaned,
                "Cleaned up expired rate limit buckets"
            );
        }
    }

    /// Returns remaining requests in the window, or the time until reset when
    /// the limit is exhausted.
    pub async fn check_rate_limit(&self, key: &str) -> Result<u32, Duration> {
        let shard = &self.shards[self.shard_index(key)];
        let mut buckets = shard.lock().await;

        // Shard at capacity: drop expired buckets, then the oldest one if needed
        if buckets.len() >= self.max_buckets {
            let now = Instant::now();
            let grace_period = Duration::from_secs(self.window_seconds);
            buckets.retain(|_key, bucket| {
                bucket.reset_at > now || (now - bucket.reset_at) < grace_period
            });

            if buckets.len() >= self.max_buckets {
                let oldest_key = buckets
                    .iter()
                    .min_by_key(|(_, bucket)| bucket.reset_at)
                    .map(|(k, _)| k.clone());
                if let Some(key_to_remove) = oldest_key {
                    buckets.remove(&key_to_remove);
                    tracing::debug!(
                        removed_key = %key_to_remove,
                        "Evicted oldest rate limit bucket at capacity"
                    );
                }
            }
        }

        let window_seconds = self.window_seconds;
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| RateLimitBucket::new(window_seconds));

        let (allowed, remaining) = bucket.check_and_increment(self.limit_per_minute, window_seconds);
        if allowed {
            Ok(remaining)
        } else {
            Err(bucket.reset_in())
        }
    }

    pub fn limit_per_minute(&self) -> u32 {
        self.limit_per_minute
    }
}

/// Per-IP rate limiting middleware.
///
/// Adds `X-RateLimit-Limit` and `X-RateLimit-Remaining` to every response,
/// and `Retry-After` on 429 responses.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<HttpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    // Validated IP extraction so X-Forwarded-For spoofing cannot steal buckets
    let trusted_proxy_count = std::env::var("TRUSTED_PROXY_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1);
    let socket_addr = request.extensions().get::<std::net::SocketAddr>().copied();
    let ip = extract_client_ip(request.headers(), socket_addr.as_ref(), trusted_proxy_count);
    let rate_limit_key = format!("ip:{}", ip);

    let limit = rate_limiter.limit_per_minute();

    match rate_limiter.check_rate_limit(&rate_limit_key).await {
        Ok(remaining) => {
            let mut response = next.run(request).await;

            if let Ok(header_value) = HeaderValue::from_str(&limit.to_string()) {
                response
                    .headers_mut()
                    .insert("X-RateLimit-Limit", header_value);
            }
            if let Ok(header_value) = HeaderValue::from_str(&remaining.to_string()) {
                response
                    .headers_mut()
                    .insert("X-RateLimit-Remaining", header_value);
            }

            response
        }
        Err(reset_in) => {
            tracing::warn!(
                key = %rate_limit_key,
                path = %request.uri().path(),
                limit,
                "Rate limit exceeded"
            );

            let reset_seconds = reset_in.as_secs().max(1);

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                axum::Json(ErrorResponse {
                    error: "Too many requests. Please slow down.".to_string(),
                    details: None,
                    code: "RATE_LIMITED".to_string(),
                    recoverable: true,
                    suggested_action: Some(format!("Retry after {} seconds", reset_seconds)),
                    field_errors: None,
                }),
            )
                .into_response();

            if let Ok(header_value) = HeaderValue::from_str(&limit.to_string()) {
                response
                    .headers_mut()
                    .insert("X-RateLimit-Limit", header_value);
            }
            response
                .headers_mut()
                .insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
            if let Ok(header_value) = HeaderValue::from_str(&reset_seconds.to_string()) {
                response.headers_mut().insert("Retry-After", header_value);
            }

            response
        }
    }
}
