pub mod error;
pub mod consts;
pub mod raster;
pub mod study;
pub mod transform;
pub mod annotations;
pub mod filters;
pub mod processing;
pub mod render;
pub mod tools;
pub mod viewer;
pub mod io;
pub mod config;
