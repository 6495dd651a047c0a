pub mod api_client;
pub mod encoder;
pub mod logging;
pub mod payload;
pub mod response;
