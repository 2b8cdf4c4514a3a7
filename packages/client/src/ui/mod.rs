//! Terminal UI: join form, chat view and the router between them.

pub mod chat_view;
pub mod join_view;
pub mod notification;
pub mod render;
mod runner;
pub mod state; // UseCase 層からアクセスするため public
pub mod terminal;

pub use runner::{Route, run};
