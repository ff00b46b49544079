pub mod config;
pub mod datasource;
pub mod dataset;
pub mod mapping;
pub mod merge;
pub mod preview;
pub mod routing;
pub mod template;
