// Composition root for the energy graph gateway.
//
// Binaries read the config, pick the driver mode and hand an AppState to the
// router; everything request-scoped lives in RequestContext.

pub mod auth;
pub mod config;
pub mod context;
pub mod errors;
pub mod graphql;
pub mod http;
pub mod state;
