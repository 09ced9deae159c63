use glam::Vec3;

use crate::types::Overlap;

/// Exact sphere tests used to re-filter cell-granular index results.
pub struct Narrowphase;

impl Narrowphase {
    /// Sphere A (`c0`, `r0`) against sphere B (`c1`, `r1`). Touching counts as overlap.
    pub fn overlap_sphere_sphere(c0: Vec3, r0: f32, c1: Vec3, r1: f32) -> Option<Overlap> {
        let delta = c0 - c1;
        let dist2 = delta.length_squared();
        let rsum = r0 + r1;
        if dist2 > rsum * rsum {
            return None;
        }
        if dist2 == 0.0 {
            // Coincident centers; undefined normal.
            return Some(Overlap {
                normal: Vec3::ZERO,
                depth: rsum,
                contact: c0,
            });
        }
        let dist = dist2.sqrt();
        let normal = delta / dist; // from B into A
        let depth = (rsum - dist).max(0.0);
        let contact = c0 - normal * r0;
        Some(Overlap {
            normal,
            depth,
            contact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_sphere_sphere_basic() {
        let ov = Narrowphase::overlap_sphere_sphere(Vec3::ZERO, 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0)
            .unwrap();
        assert!((ov.depth - 0.5).abs() < 1e-6);
        // normal points from B into A
        assert!((ov.normal - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-6);
        assert!((ov.contact - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_overlap_sphere_sphere_tangent_and_separated() {
        let touch =
            Narrowphase::overlap_sphere_sphere(Vec3::ZERO, 1.0, Vec3::new(0.0, 0.0, 2.0), 1.0);
        assert!(touch.is_some());
        assert_eq!(touch.unwrap().depth, 0.0);
        let apart =
            Narrowphase::overlap_sphere_sphere(Vec3::ZERO, 1.0, Vec3::new(0.0, 0.0, 2.1), 1.0);
        assert!(apart.is_none());
    }

    #[test]
    fn test_overlap_sphere_sphere_coincident() {
        let ov = Narrowphase::overlap_sphere_sphere(Vec3::ONE, 0.5, Vec3::ONE, 0.25).unwrap();
        assert_eq!(ov.normal, Vec3::ZERO);
        assert_eq!(ov.depth, 0.75);
    }
}
