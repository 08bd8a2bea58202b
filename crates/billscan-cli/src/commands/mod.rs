pub mod batch;
pub mod config;
pub mod output;
pub mod process;
pub mod rules;
pub mod text;
