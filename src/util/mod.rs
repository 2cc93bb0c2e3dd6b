pub mod persistence;
pub mod version;
