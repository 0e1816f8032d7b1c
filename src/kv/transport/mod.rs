mod memory_transport;
mod redis_transport;
mod rest_transport;

pub use memory_transport::MemoryTransport;
pub use redis_transport::RedisTransport;
pub use rest_transport::RestTransport;
