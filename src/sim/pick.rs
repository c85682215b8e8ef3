//! Camera projection and tap picking
//!
//! View coordinates have their origin at the top-left, y pointing down, in
//! the same units as `viewport`.

use glam::{Mat4, Vec2, Vec3};

use super::scene::{Node, NodeId, NodeKind, SceneRegistry, Transform};
use super::shape::Geometry;
use crate::consts::HUD_FONT_SIZE;
use crate::settings::CameraSettings;

/// Advance of one HUD glyph relative to the font size
const GLYPH_ADVANCE: f32 = 0.6;

/// Torus sphere-tracing limits
const MARCH_STEPS: usize = 128;
const MARCH_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub dir: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Distance to the first intersection with a sphere, if any
    pub fn hit_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_d = disc.sqrt();
        let near = -b - sqrt_d;
        let far = -b + sqrt_d;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            // Origin inside the sphere
            Some(0.0)
        } else {
            None
        }
    }

    /// Side wall of a frustum around the y axis whose radius at height `y`
    /// is `slope * y + mid_radius`, bounded to `|y| <= half_height`
    pub fn hit_frustum_side(&self, slope: f32, mid_radius: f32, half_height: f32) -> Option<f32> {
        let (o, d) = (self.origin, self.dir);
        let r0 = slope * o.y + mid_radius;
        let a = d.x * d.x + d.z * d.z - slope * slope * d.y * d.y;
        let b = 2.0 * (o.x * d.x + o.z * d.z - slope * d.y * r0);
        let c = o.x * o.x + o.z * o.z - r0 * r0;
        let (t0, t1) = solve_quadratic(a, b, c)?;
        [t0, t1]
            .into_iter()
            .filter(|&t| {
                let p = self.at(t);
                t >= 0.0 && p.y.abs() <= half_height && slope * p.y + mid_radius >= 0.0
            })
            .reduce(f32::min)
    }

    /// Annulus in the plane at height `y`, centered on the y axis
    pub fn hit_disc(&self, y: f32, inner: f32, outer: f32) -> Option<f32> {
        if self.dir.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (y - self.origin.y) / self.dir.y;
        if t < 0.0 {
            return None;
        }
        let p = self.at(t);
        let r2 = p.x * p.x + p.z * p.z;
        (r2 >= inner * inner && r2 <= outer * outer).then_some(t)
    }

    /// Entry distance into the convex region where `n.dot(p) <= d` for every plane
    pub fn hit_convex(&self, planes: &[(Vec3, f32)]) -> Option<f32> {
        let mut t_near = 0.0f32;
        let mut t_far = f32::INFINITY;
        for &(normal, d) in planes {
            let denom = normal.dot(self.dir);
            let dist = d - normal.dot(self.origin);
            if denom.abs() < f32::EPSILON {
                if dist < 0.0 {
                    return None;
                }
                continue;
            }
            let t = dist / denom;
            if denom < 0.0 {
                t_near = t_near.max(t);
            } else {
                t_far = t_far.min(t);
            }
            if t_near > t_far {
                return None;
            }
        }
        Some(t_near)
    }

    /// Torus lying in the xz plane, by sphere tracing its distance field
    /// inside the enclosing sphere
    pub fn hit_torus(&self, ring_radius: f32, pipe_radius: f32) -> Option<f32> {
        let outer = ring_radius + pipe_radius;
        let (enter, exit) = solve_quadratic(
            self.dir.length_squared(),
            2.0 * self.origin.dot(self.dir),
            self.origin.length_squared() - outer * outer,
        )?;
        if exit < 0.0 {
            return None;
        }

        let mut t = enter.max(0.0);
        for _ in 0..MARCH_STEPS {
            if t > exit {
                return None;
            }
            let p = self.at(t);
            let ring = Vec2::new(Vec2::new(p.x, p.z).length() - ring_radius, p.y);
            let dist = ring.length() - pipe_radius;
            if dist < MARCH_EPSILON {
                return Some(t);
            }
            t += dist;
        }
        None
    }

    /// Distance to the entry point of an axis-aligned box (slab test)
    pub fn hit_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let inv = self.dir.recip();
        let t1 = (min - self.origin) * inv;
        let t2 = (max - self.origin) * inv;
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();
        if t_near > t_far || t_far < 0.0 {
            None
        } else {
            Some(t_near.max(0.0))
        }
    }
}

/// Real roots of `a·t² + b·t + c`, smallest first
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a.abs() < f32::EPSILON {
        if b.abs() < f32::EPSILON {
            return None;
        }
        let t = -c / b;
        return Some((t, t));
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_d = disc.sqrt();
    let t0 = (-b - sqrt_d) / (2.0 * a);
    let t1 = (-b + sqrt_d) / (2.0 * a);
    Some((t0.min(t1), t0.max(t1)))
}

/// Ray test against the surface of `geometry` in its own local space
/// (unit-length `ray.dir`)
pub fn hit_geometry(ray: &Ray, geometry: &Geometry) -> Option<f32> {
    let nearest = |hits: &[Option<f32>]| hits.iter().flatten().copied().reduce(f32::min);

    match *geometry {
        Geometry::Sphere { radius } => ray.hit_sphere(Vec3::ZERO, radius),
        Geometry::Box { width, height, length, .. } => {
            let half = Vec3::new(width, height, length) / 2.0;
            ray.hit_aabb(-half, half)
        }
        Geometry::Capsule { cap_radius, height } => {
            let half_segment = (height / 2.0 - cap_radius).max(0.0);
            let cap = Vec3::Y * half_segment;
            nearest(&[
                ray.hit_frustum_side(0.0, cap_radius, half_segment),
                ray.hit_sphere(cap, cap_radius),
                ray.hit_sphere(-cap, cap_radius),
            ])
        }
        Geometry::Cylinder { radius, height } => {
            let half = height / 2.0;
            nearest(&[
                ray.hit_frustum_side(0.0, radius, half),
                ray.hit_disc(half, 0.0, radius),
                ray.hit_disc(-half, 0.0, radius),
            ])
        }
        Geometry::Cone { top_radius, bottom_radius, height } => {
            if height <= 0.0 {
                return None;
            }
            let half = height / 2.0;
            nearest(&[
                ray.hit_frustum_side(
                    (top_radius - bottom_radius) / height,
                    (top_radius + bottom_radius) / 2.0,
                    half,
                ),
                ray.hit_disc(half, 0.0, top_radius),
                ray.hit_disc(-half, 0.0, bottom_radius),
            ])
        }
        Geometry::Tube { inner_radius, outer_radius, height } => {
            let half = height / 2.0;
            nearest(&[
                ray.hit_frustum_side(0.0, outer_radius, half),
                ray.hit_frustum_side(0.0, inner_radius, half),
                ray.hit_disc(half, inner_radius, outer_radius),
                ray.hit_disc(-half, inner_radius, outer_radius),
            ])
        }
        Geometry::Pyramid { width, height, length } => {
            let (hw, hl) = (width / 2.0, length / 2.0);
            // Base on y = 0, apex at (0, height, 0)
            ray.hit_convex(&[
                (Vec3::NEG_Y, 0.0),
                (Vec3::new(height, hw, 0.0), height * hw),
                (Vec3::new(-height, hw, 0.0), height * hw),
                (Vec3::new(0.0, hl, height), height * hl),
                (Vec3::new(0.0, hl, -height), height * hl),
            ])
        }
        Geometry::Torus { ring_radius, pipe_radius } => ray.hit_torus(ring_radius, pipe_radius),
    }
}

/// World-space distance to a shape placed at `transform`
fn hit_shape(ray: &Ray, transform: &Transform, geometry: &Geometry) -> Option<f32> {
    let bound = geometry.bounding_radius() * transform.scale.abs().max_element();
    ray.hit_sphere(transform.position, bound)?;

    let inv = transform.matrix().inverse();
    let dir = inv.transform_vector3(ray.dir);
    let len = dir.length();
    if len < f32::EPSILON {
        return None;
    }
    let local = Ray {
        origin: inv.transform_point3(ray.origin),
        dir: dir / len,
    };
    // Local distances shrink or grow with the inverse scale
    hit_geometry(&local, geometry).map(|t| t / len)
}

/// Perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub viewport: Vec2,
}

impl Camera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            position: settings.position,
            forward: settings.forward.normalize_or(Vec3::NEG_Z),
            fov_y: settings.fov_y_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
            viewport: settings.viewport,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.viewport.x / self.viewport.y;
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World point to view coordinates; None if behind the camera
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    /// Ray from the near plane through a view point
    pub fn ray(&self, point: Vec2) -> Ray {
        let ndc_x = point.x / self.viewport.x * 2.0 - 1.0;
        let ndc_y = 1.0 - point.y / self.viewport.y * 2.0;
        let inv = self.view_projection().inverse();
        // perspective_rh maps depth to [0, 1]
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Ray {
            origin: near,
            dir: (far - near).normalize_or(self.forward),
        }
    }
}

/// Nearest node under a tap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// World-space box around a HUD label's extruded text
pub fn label_bounds(node: &Node, text: &str) -> (Vec3, Vec3) {
    let scale = node.presentation.scale;
    let glyphs = text.chars().count().max(1) as f32;
    let extent = Vec3::new(
        glyphs * GLYPH_ADVANCE * HUD_FONT_SIZE * scale.x,
        HUD_FONT_SIZE * scale.y,
        scale.z,
    );
    let min = node.presentation.position;
    (min, min + extent)
}

/// Hit-test every node at the rendered transform; nearest wins, ties go to the older node
pub fn pick(camera: &Camera, scene: &SceneRegistry, point: Vec2) -> Option<PickHit> {
    let ray = camera.ray(point);
    let mut best: Option<PickHit> = None;

    for node in scene.iter() {
        let distance = match &node.kind {
            NodeKind::Shape(entity) => hit_shape(&ray, &node.presentation, &entity.geometry),
            NodeKind::Label(label) => {
                let (min, max) = label_bounds(node, &label.text);
                ray.hit_aabb(min, max)
            }
        };
        let Some(distance) = distance else {
            continue;
        };
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(PickHit {
                node: node.id,
                distance,
                point: ray.at(distance),
            });
        }
    }

    best
}
