pub mod emotion;
pub mod image;
