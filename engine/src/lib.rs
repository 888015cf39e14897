pub mod scene_builder;
pub mod scene_loop;
pub mod simulation;
