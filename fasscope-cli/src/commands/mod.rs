pub mod common;
pub mod decompile;
pub mod info;
pub mod strings;
