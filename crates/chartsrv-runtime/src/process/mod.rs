//! OS-level process and socket concerns for the chart server child.

mod handle;
mod ports;
mod spawn;

pub use handle::ServerHandle;
pub use ports::{find_available_port, find_port_in_candidates, is_port_available};
#[cfg(test)]
pub(crate) use ports::hold_consecutive;
pub use spawn::{SERVER_ARGS_TAIL, spawn_server};
