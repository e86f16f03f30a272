// cheatguessr/src/actors/mod.rs

pub mod guess_session;
pub mod registry_actor;
