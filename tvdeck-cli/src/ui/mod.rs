pub mod assets;
pub mod layout;
pub mod render;
pub mod theme;
