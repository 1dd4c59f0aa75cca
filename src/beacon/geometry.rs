use rayon::prelude::*;

use crate::beacon::buffer::ObjectBuffer;
use crate::beacon::scene::Triangle;

/// Refreshes edge vectors and normals of every live triangle.
///
/// Has to run after any vertex mutation and before the buffer is uploaded or
/// picked against. Each triangle only reads and writes itself.
pub fn compute_triangles(buffer: &mut ObjectBuffer) {
    buffer
        .triangles_mut()
        .par_iter_mut()
        .for_each(Triangle::recompute);
}
