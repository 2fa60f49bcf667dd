//! Client IP extraction for rate limiting.
//!
//! Behind a load balancer the peer address is the proxy, so the client IP
//! comes from X-Forwarded-For. Only the last `trusted_proxy_count` entries
//! of the chain are trusted; everything before them is client-controlled.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract the client IP from headers, falling back to the socket address.
/// Returns "unknown" when nothing usable is present.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&std::net::SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded_for.to_str() {
            let ip = from_forwarded_chain(value, trusted_proxy_count);
            if ip != "unknown" {
                return ip;
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            let trimmed = value.trim();
            if is_valid_ip(trimmed) {
                return trimmed.to_string();
            }
        }
    }

    if let Some(addr) = socket_addr {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// X-Forwarded-For is `client, proxy1, proxy2, ...`. With N trusted proxies
/// at the end of the chain, the client is the entry just before them.
fn from_forwarded_chain(header_value: &str, trusted_proxy_count: usize) -> String {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let candidate = if trusted_proxy_count == 0 || ips.len() <= trusted_proxy_count {
        // Cannot trust the full chain, use the entry closest to us
        ips.last().copied()
    } else {
        ips.get(ips.len() - trusted_proxy_count - 1).copied()
    };

    match candidate {
        Some(ip) if is_valid_ip(ip) => ip.to_string(),
        _ => "unknown".to_string(),
    }
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}
