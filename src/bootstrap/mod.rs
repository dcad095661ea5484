//! Process bootstrap helpers shared by both binaries.

pub mod logger;
