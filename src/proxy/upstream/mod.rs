// Upstream client module

pub mod client;
