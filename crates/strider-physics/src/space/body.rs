//! Body descriptions and the per-body record stored by [`ShapeSpace`](super::ShapeSpace).

use strider_math::{BodyTransform, Dimension, MotionVector};

use super::geometry::SpaceDimension;
use super::shape::{SeparationRay, Shape};

/// How a body participates in the space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyMode {
    /// Never moves.
    Static,
    /// Moves with its own velocity, unaffected by contacts.
    Kinematic,
    /// Dynamic body. Only its velocity is integrated here; ignored by
    /// sweeps that request infinite inertia.
    Rigid,
    /// Driven by a [`KinematicBody`](crate::KinematicBody).
    Character,
}

/// Everything needed to insert a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc<D: Dimension> {
    pub mode: BodyMode,
    pub transform: D::Transform,
    pub shapes: Vec<Shape<D>>,
    pub rays: Vec<SeparationRay<D>>,
    pub linear_velocity: D::Vector,
    pub angular_velocity: D::Angular,
    /// Layers this body occupies.
    pub layer: u32,
    /// Layers this body collides with when it moves.
    pub mask: u32,
    /// Scene-side identity reported in collision records.
    pub user_id: u64,
}

impl<D: Dimension> BodyDesc<D> {
    pub fn new(mode: BodyMode, transform: D::Transform) -> Self {
        Self {
            mode,
            transform,
            shapes: Vec::new(),
            rays: Vec::new(),
            linear_velocity: D::Vector::ZERO,
            angular_velocity: D::Angular::default(),
            layer: 1,
            mask: 1,
            user_id: 0,
        }
    }

    pub fn at(mode: BodyMode, origin: D::Vector) -> Self {
        Self::new(mode, D::Transform::from_origin(origin))
    }

    pub fn with_shape(mut self, shape: Shape<D>) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn with_ray(mut self, ray: SeparationRay<D>) -> Self {
        self.rays.push(ray);
        self
    }

    pub fn with_velocity(mut self, linear: D::Vector, angular: D::Angular) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    pub fn with_collision(mut self, layer: u32, mask: u32) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Stored body record.
#[derive(Debug, Clone)]
pub(crate) struct Body<D: SpaceDimension> {
    pub desc: BodyDesc<D>,
    /// One collider per entry of `desc.shapes`.
    pub colliders: Vec<D::Collider>,
    /// Disabled bodies are out of the space: they neither query nor collide.
    pub enabled: bool,
    /// Receives a state notification after every step.
    pub observed: bool,
    /// Transform requested through a state update, applied on the next step.
    pub pending_transform: Option<D::Transform>,
}

impl<D: SpaceDimension> Body<D> {
    pub fn new(desc: BodyDesc<D>) -> Self {
        let colliders = desc.shapes.iter().map(D::build_collider).collect();
        Self {
            desc,
            colliders,
            enabled: true,
            observed: false,
            pending_transform: None,
        }
    }

    pub fn origin(&self) -> D::Vector {
        self.desc.transform.origin()
    }

    /// Radius used when this body is swept: its first ball, or a point.
    pub fn sweep_radius(&self) -> f32 {
        self.desc
            .shapes
            .iter()
            .find_map(|shape| match shape {
                Shape::Ball { radius } => Some(*radius),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    /// Index of the shape used for sweeping, reported as the local shape.
    pub fn sweep_shape_index(&self) -> usize {
        self.desc
            .shapes
            .iter()
            .position(|shape| matches!(shape, Shape::Ball { .. }))
            .unwrap_or(0)
    }

    pub fn velocity_at(&self, point: D::Vector) -> D::Vector {
        D::point_velocity(
            self.desc.linear_velocity,
            self.desc.angular_velocity,
            point - self.origin(),
        )
    }

    /// Whether a mover with `mask` should see this body.
    pub fn interacts_with(&self, mask: u32) -> bool {
        self.enabled && (self.desc.layer & mask) != 0
    }

    /// Advances the body by one step of length `dt`.
    pub fn integrate(&mut self, dt: f32) {
        if let Some(target) = self.pending_transform.take() {
            if dt > 0.0
                && matches!(self.desc.mode, BodyMode::Kinematic | BodyMode::Character)
            {
                self.desc.linear_velocity = (target.origin() - self.origin()) / dt;
            }
            self.desc.transform = target;
            return;
        }
        match self.desc.mode {
            BodyMode::Kinematic | BodyMode::Rigid => {
                let offset = self.desc.linear_velocity * dt;
                self.desc.transform.set_origin(self.origin() + offset);
                D::integrate_rotation(&mut self.desc.transform, self.desc.angular_velocity, dt);
            }
            BodyMode::Character => self.desc.linear_velocity = D::Vector::ZERO,
            BodyMode::Static => {}
        }
    }
}
