//! Collision oracle boundary.
//!
//! The simulation core does not own any map geometry; it only asks an
//! external oracle whether a circular footprint at a candidate position
//! intersects forbidden space. The oracle is queried once per kinematic
//! step, after the new pose is computed and before it is committed.

/// A read-only predicate over world positions.
///
/// Implementations must be pure queries: the engine assumes repeated calls
/// with the same arguments return the same answer and mutate nothing.
pub trait CollisionOracle {
    /// Returns `true` if a disc of `radius` meters centered at `(x, y)`
    /// (world frame) intersects forbidden geometry.
    fn collision(&self, x: f64, y: f64, radius: f64) -> bool;
}

/// Closures can serve directly as oracles, which keeps simple maps and test
/// fixtures free of wrapper types.
impl<F> CollisionOracle for F
where
    F: Fn(f64, f64, f64) -> bool,
{
    fn collision(&self, x: f64, y: f64, radius: f64) -> bool {
        self(x, y, radius)
    }
}
