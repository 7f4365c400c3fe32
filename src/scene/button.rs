//! Interactive button objects and their transforms.

use glam::Vec3;

/// Placement of an object in the scene.
///
/// Rotation is expressed as Euler angles in radians (the convention of the
/// viewer's `Object3D.rotation`); scale is uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position
    pub position: Vec3,
    /// Euler rotation in radians
    pub rotation: Vec3,
    /// Uniform scale factor
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Create a transform from explicit components.
    pub fn new(position: Vec3, rotation: Vec3, scale: f32) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// An interactive object in the scene, addressed by its unique id.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    /// Unique identifier, stable for the lifetime of the scene
    pub id: String,
    /// Current placement
    pub transform: Transform,
}

impl Button {
    /// Create a button with the given id and transform.
    pub fn new(id: impl Into<String>, transform: Transform) -> Self {
        Self {
            id: id.into(),
            transform,
        }
    }

    /// Create a button at the origin with the default transform.
    pub fn at_origin(id: impl Into<String>) -> Self {
        Self::new(id, Transform::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_transform() {
        let transform = Transform::default();
        assert_eq!(transform.position, Vec3::ZERO);
        assert_eq!(transform.rotation, Vec3::ZERO);
        assert_eq!(transform.scale, 1.0);
    }

    #[test]
    fn test_button_at_origin() {
        let button = Button::at_origin("exampleButton");
        assert_eq!(button.id, "exampleButton");
        assert_eq!(button.transform, Transform::default());
    }
}
