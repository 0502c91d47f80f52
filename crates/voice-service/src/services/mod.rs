pub mod provider_client;
pub mod provisioning;
pub mod token_service;
pub mod tunnel;
