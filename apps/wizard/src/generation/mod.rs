// Generation requests: channel selection, local preconditions, one outbound
// call through the transport seam, normalization of the response.
// All HTTP goes through service_client; nothing here builds requests itself.

pub mod channel;
pub mod orchestrator;
pub mod templates;
pub mod transport;
