pub mod client_ip;
pub mod rate_limit;
pub mod request_id;

pub use request_id::request_id_middleware;
