#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod edges;
pub mod editing;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod shapes;
pub mod surface;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
