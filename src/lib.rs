pub mod cli;
pub mod collector;
pub mod config;
pub mod parser;
pub mod source;
