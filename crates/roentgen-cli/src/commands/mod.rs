pub mod annotate;
pub mod config;
pub mod convert;
pub mod filter;
pub mod info;
