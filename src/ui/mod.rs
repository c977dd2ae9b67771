pub mod app;
pub mod command;
pub mod context;
pub mod insert;
pub mod render;

pub use app::App;
pub use command::match_action;
pub use context::Context;
