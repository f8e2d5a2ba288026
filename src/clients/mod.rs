pub mod brainly_client;
pub mod transport;

pub use brainly_client::{BrainlyClient, RequestOptions};
pub use transport::{HttpMethod, ReqwestTransport, Transport, TransportRequest};
