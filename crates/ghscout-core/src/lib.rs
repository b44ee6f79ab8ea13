pub mod config;
pub mod doctor;
pub mod github;
pub mod http_transport;
#[cfg(test)]
pub(crate) mod test_support;
