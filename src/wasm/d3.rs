use crate::kdtree::KdTree;
use crate::wasm::get_seed;
use rand::prelude::*;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

// --- Picker ---

/// Nearest-point picker over a flat `[x, y, z, x, y, z, ...]` coordinate buffer.
///
/// The 3D counterpart of [`Picker2D`](crate::Picker2D), for viewers that
/// hit-test against unprojected scene points.
#[wasm_bindgen]
pub struct Picker3D {
    inner: KdTree<u32>,
}

#[wasm_bindgen]
impl Picker3D {
    /// Builds a picker from interleaved xyz triples.
    #[wasm_bindgen(constructor)]
    pub fn new(points: &[f64]) -> Result<Picker3D, JsValue> {
        if points.len() % 3 != 0 {
            return Err(JsValue::from_str(
                "expected interleaved xyz triples, got a leftover coordinate",
            ));
        }
        let count = (points.len() / 3) as u32;
        let inner = KdTree::build(0..count, |&i| {
            points[i as usize * 3..i as usize * 3 + 3].to_vec()
        })
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Picker3D { inner })
    }

    /// Builds a picker over `count` random points in the given box extents.
    pub fn random(count: usize, width: f64, height: f64, depth: f64) -> Picker3D {
        let mut rng = StdRng::seed_from_u64(get_seed());
        let mut points = Vec::with_capacity(count * 3);
        for _ in 0..count {
            points.push(rng.gen_range(0.0..width));
            points.push(rng.gen_range(0.0..height));
            points.push(rng.gen_range(0.0..depth));
        }
        Picker3D::new(&points).unwrap()
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// Flat coordinate buffer, three values per point.
    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<f64> {
        self.inner.points().to_vec()
    }

    pub fn get_point(&self, index: usize) -> Vec<f64> {
        self.inner.point(index).to_vec()
    }

    /// Indices of the up-to-`k` points nearest to `(x, y, z)`, closest first,
    /// all within `max_distance`. Pass `Infinity` for an unbounded radius.
    pub fn query(&self, x: f64, y: f64, z: f64, k: usize, max_distance: f64) -> Vec<u32> {
        self.inner
            .nearest_within(&[x, y, z], k, max_distance)
            .into_iter()
            .copied()
            .collect()
    }

    /// Index of the single point nearest to `(x, y, z)` within `max_distance`,
    /// or -1 when none qualifies.
    pub fn pick(&self, x: f64, y: f64, z: f64, max_distance: f64) -> i32 {
        self.inner
            .nearest_within(&[x, y, z], 1, max_distance)
            .first()
            .map_or(-1, |&&i| i as i32)
    }
}
