pub mod console_dashboard;

pub use console_dashboard::render;
