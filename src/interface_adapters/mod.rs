// Interface adapters: HTTP surface plus identity, clock and dice adapters.

pub mod handlers;
pub mod identity;
pub mod protocol;
pub mod routes;
pub mod state;
