use rapier3d::prelude::*;

pub const GRAVITY: f32 = -9.81;

/// The simulation world: every rigid body and collider, plus the pipeline that steps them.
///
/// Gravity is fixed at construction; only the timestep changes from one step to the next.
#[derive(Default)]
pub struct PhysicsState {
    pub physics_pipeline: PhysicsPipeline,
    pub islands: IslandManager,
    pub broad_phase: BroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub integration_parameters: IntegrationParameters,
    gravity: Vector<f32>,
}

impl PhysicsState {
    pub fn new() -> Self {
        Self {
            gravity: Vector::y() * GRAVITY,
            ..Default::default()
        }
    }

    pub fn gravity(&self) -> &Vector<f32> {
        &self.gravity
    }

    pub fn set_delta_time(&mut self, time_step: f32) {
        self.integration_parameters.dt = time_step;
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        )
    }

    /// Inserts the rigid body first, then the collider with the body as its parent.
    pub fn insert_body(
        &mut self,
        rigid_body: RigidBody,
        collider: Collider,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let rigid_body_handle = self.bodies.insert(rigid_body);
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, rigid_body_handle, &mut self.bodies);
        (rigid_body_handle, collider_handle)
    }

    pub fn rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }
}
