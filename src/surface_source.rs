//! Surface source (C3): the external callback the grid samples during
//! construction and injection.
//!
//! Implementations are called back under the grid's single-threaded
//! construction or edit path only; polygonization never calls a surface
//! source.

/// An axis-aligned sampling box: per-axis start, end (exclusive count), and
/// step, in world units.
#[derive(Clone, Copy, Debug)]
pub struct SampleBox {
  pub start: [f32; 3],
  /// Number of samples to produce along each axis.
  pub count: [u32; 3],
  pub step: f32,
}

/// A pure interface the grid and injections call back through.
///
/// Given a 3D axis-aligned sampling box and output buffers for distance
/// (mandatory) and optional material and blend, fills those buffers with
/// values in X-fastest, then Y, then Z order.
pub trait SurfaceSource: Sync {
  /// Fill `out_distance` (required) and, if provided, `out_material` /
  /// `out_blend` with samples over `box_`.
  fn sample(
    &self,
    box_: SampleBox,
    out_distance: &mut [f32],
    out_material: Option<&mut [u8]>,
    out_blend: Option<&mut [u8]>,
  );
}

/// Signed distance to a sphere, useful for tests and examples (E2E-2).
pub struct SphereSource {
  pub center: [f32; 3],
  pub radius: f32,
}

impl SurfaceSource for SphereSource {
  fn sample(
    &self,
    box_: SampleBox,
    out_distance: &mut [f32],
    out_material: Option<&mut [u8]>,
    out_blend: Option<&mut [u8]>,
  ) {
    let [nx, ny, nz] = box_.count;
    let mut idx = 0;
    for z in 0..nz {
      for y in 0..ny {
        for x in 0..nx {
          let p = [
            box_.start[0] + x as f32 * box_.step,
            box_.start[1] + y as f32 * box_.step,
            box_.start[2] + z as f32 * box_.step,
          ];
          let d = ((p[0] - self.center[0]).powi(2)
            + (p[1] - self.center[1]).powi(2)
            + (p[2] - self.center[2]).powi(2))
          .sqrt()
            - self.radius;
          out_distance[idx] = d;
          idx += 1;
        }
      }
    }
    if let Some(m) = out_material {
      m.fill(0);
    }
    if let Some(b) = out_blend {
      b.fill(0);
    }
  }
}

/// Surface that never crosses: all-positive (empty) grid, useful for E2E-1.
pub struct EmptySource {
  pub distance: f32,
}

impl SurfaceSource for EmptySource {
  fn sample(
    &self,
    _box_: SampleBox,
    out_distance: &mut [f32],
    out_material: Option<&mut [u8]>,
    out_blend: Option<&mut [u8]>,
  ) {
    out_distance.fill(self.distance);
    if let Some(m) = out_material {
      m.fill(0);
    }
    if let Some(b) = out_blend {
      b.fill(0);
    }
  }
}

/// Signed distance to the plane `x + y + z = offset`, useful for E2E-3.
pub struct DiagonalPlaneSource {
  pub offset: f32,
}

impl SurfaceSource for DiagonalPlaneSource {
  fn sample(
    &self,
    box_: SampleBox,
    out_distance: &mut [f32],
    out_material: Option<&mut [u8]>,
    out_blend: Option<&mut [u8]>,
  ) {
    let [nx, ny, nz] = box_.count;
    let mut idx = 0;
    for z in 0..nz {
      for y in 0..ny {
        for x in 0..nx {
          let p = [
            box_.start[0] + x as f32 * box_.step,
            box_.start[1] + y as f32 * box_.step,
            box_.start[2] + z as f32 * box_.step,
          ];
          out_distance[idx] = (p[0] + p[1] + p[2]) - self.offset;
          idx += 1;
        }
      }
    }
    if let Some(m) = out_material {
      m.fill(0);
    }
    if let Some(b) = out_blend {
      b.fill(0);
    }
  }
}

#[cfg(test)]
#[path = "surface_source_test.rs"]
mod surface_source_test;
