use bevy::prelude::*;

/// Ray-sphere intersection test
/// Returns the distance along the ray to the entry point, or the exit point when the
/// ray starts inside the sphere. None if the sphere is missed or entirely behind the origin.
pub fn ray_sphere_distance(ray: Ray3d, sphere_center: Vec3, sphere_radius: f32) -> Option<f32> {
    let direction = *ray.direction; // Dir3 is unit length, so t is a world distance
    let oc = ray.origin - sphere_center;
    let b = oc.dot(direction);
    let c = oc.dot(oc) - sphere_radius * sphere_radius;
    let discriminant = b * b - c;

    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();

    // Near intersection (entry point)
    let t = -b - root;
    if t >= 0.0 {
        return Some(t);
    }

    // Far intersection (exit point, origin inside the sphere)
    let t2 = -b + root;
    if t2 >= 0.0 {
        return Some(t2);
    }

    None
}

/// Screen-space rectangle spanned by two drag corners, in any order
#[inline]
pub fn screen_rect(a: Vec2, b: Vec2) -> Rect {
    Rect::from_corners(a, b)
}

/// Inclusive point-in-rectangle test (points on the border count as inside)
#[inline]
pub fn rect_contains(rect: Rect, point: Vec2) -> bool {
    point.x >= rect.min.x && point.x <= rect.max.x && point.y >= rect.min.y && point.y <= rect.max.y
}
