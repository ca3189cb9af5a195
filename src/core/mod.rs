pub mod engine;
pub mod server;

pub use engine::{Engine, GenerateReport};
pub use server::Server;
