// cheatguessr/src/lib.rs

pub mod actors;
pub mod cli;
pub mod dev_proxy;
pub mod feed;
pub mod hub;
pub mod routing;
pub mod static_files;
