pub mod components;
pub mod scene;
