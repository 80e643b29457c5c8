use crate::kdtree::KdTree;
use crate::wasm::get_seed;
use rand::prelude::*;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

// --- Picker ---

/// Nearest-point picker over a flat `[x, y, x, y, ...]` coordinate buffer.
///
/// Wraps a [`KdTree`] of point indices: the viewer hands its point list over
/// once, then translates cursor positions into indices from there on. The
/// index is immutable; rebuild the picker when the point set changes.
#[wasm_bindgen]
pub struct Picker2D {
    inner: KdTree<u32>,
}

#[wasm_bindgen]
impl Picker2D {
    /// Builds a picker from interleaved xy pairs.
    #[wasm_bindgen(constructor)]
    pub fn new(points: &[f64]) -> Result<Picker2D, JsValue> {
        if points.len() % 2 != 0 {
            return Err(JsValue::from_str(
                "expected interleaved xy pairs, got an odd number of coordinates",
            ));
        }
        let count = (points.len() / 2) as u32;
        let inner = KdTree::build(0..count, |&i| {
            points[i as usize * 2..i as usize * 2 + 2].to_vec()
        })
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Picker2D { inner })
    }

    /// Builds a picker over `count` random points in `[0, width) x [0, height)`.
    pub fn random(count: usize, width: f64, height: f64) -> Picker2D {
        let mut rng = StdRng::seed_from_u64(get_seed());
        let mut points = Vec::with_capacity(count * 2);
        for _ in 0..count {
            points.push(rng.gen_range(0.0..width));
            points.push(rng.gen_range(0.0..height));
        }
        Picker2D::new(&points).unwrap()
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// Flat coordinate buffer, two values per point.
    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<f64> {
        self.inner.points().to_vec()
    }

    pub fn get_point(&self, index: usize) -> Vec<f64> {
        self.inner.point(index).to_vec()
    }

    /// Indices of the up-to-`k` points nearest to `(x, y)`, closest first,
    /// all within `max_distance`. Pass `Infinity` for an unbounded radius.
    pub fn query(&self, x: f64, y: f64, k: usize, max_distance: f64) -> Vec<u32> {
        self.inner
            .nearest_within(&[x, y], k, max_distance)
            .into_iter()
            .copied()
            .collect()
    }

    /// Index of the single point nearest to `(x, y)` within `max_distance`,
    /// or -1 when none qualifies.
    pub fn pick(&self, x: f64, y: f64, max_distance: f64) -> i32 {
        self.inner
            .nearest_within(&[x, y], 1, max_distance)
            .first()
            .map_or(-1, |&&i| i as i32)
    }
}
