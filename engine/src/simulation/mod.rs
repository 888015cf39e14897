pub mod collider_factory;
pub mod convert;
pub mod obj_collider;
pub mod physics_state;
pub mod registry;
