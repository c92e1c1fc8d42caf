mod handlers;
mod responses;
mod server;
#[cfg(test)]
mod tests;

pub(crate) use server::local_addr;
pub use server::{router, ControlServer, ControlServerBuilder, ServerState};
