pub mod assets;
pub mod data;
pub mod files;
