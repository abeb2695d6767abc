//! Exponential-moving-average weight updates.
//!
//! ```text
//! bump(w)  = w + α·(1 − w)
//! decay(w) = w − α·w
//! ```
//!
//! Both map [0, 1] into [0, 1] for α in (0, 1). They do not commute:
//! `decay(bump(w)) − bump(decay(w)) = −α²`, so updates are always applied
//! in log order.

/// Reinforce toward 1.
pub fn bump(weight: f64, alpha: f64) -> f64 {
    (weight + alpha * (1.0 - weight)).clamp(0.0, 1.0)
}

/// Decay toward 0.
pub fn decay(weight: f64, alpha: f64) -> f64 {
    (weight - alpha * weight).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_and_decay_move_in_opposite_directions() {
        assert!((bump(0.5, 0.1) - 0.55).abs() < 1e-12);
        assert!((decay(0.5, 0.1) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn fixed_points() {
        assert_eq!(bump(1.0, 0.1), 1.0);
        assert_eq!(decay(0.0, 0.1), 0.0);
    }

    #[test]
    fn order_matters_by_alpha_squared() {
        for w in [0.0, 0.3, 0.77, 1.0] {
            let db = decay(bump(w, 0.1), 0.1);
            let bd = bump(decay(w, 0.1), 0.1);
            assert!((db - bd + 0.01).abs() < 1e-12, "w = {w}");
        }
    }
}
