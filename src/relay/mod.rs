pub mod messages;
pub mod registry;
pub mod session;
pub mod ws;

pub use registry::SessionRegistry;
pub use ws::handle_connection;
