pub mod render;
pub mod surface;
