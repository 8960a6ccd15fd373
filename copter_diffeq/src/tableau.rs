/// Coefficients of an explicit Runge-Kutta method.
///
/// `b` weights the propagated solution. `b_star`, when present, weights the
/// embedded lower order solution used for error estimation. `order` is the
/// order of the propagated solution.
pub struct ButcherTableau<const STAGES: usize> {
    pub a: [[f64; STAGES]; STAGES],
    pub b: [f64; STAGES],
    pub b_star: Option<[f64; STAGES]>,
    pub c: [f64; STAGES],
    pub order: usize,
}

impl<const STAGES: usize> ButcherTableau<STAGES> {
    pub fn is_embedded(&self) -> bool {
        self.b_star.is_some()
    }
}

impl ButcherTableau<4> {
    // usage is ButcherTableau::<4>::RK4
    pub const RK4: Self = Self {
        a: [
            [0., 0., 0., 0.],
            [1. / 2., 0., 0., 0.],
            [0., 1. / 2., 0., 0.],
            [0., 0., 1., 0.],
        ],
        b: [1. / 6., 1. / 3., 1. / 3., 1. / 6.],
        b_star: None,
        c: [0., 1. / 2., 1. / 2., 1.],
        order: 4,
    };

    // Bogacki-Shampine 3(2)
    pub const BOGACKISHAMPINE32: Self = Self {
        a: [
            [0., 0., 0., 0.],
            [1. / 2., 0., 0., 0.],
            [0., 3. / 4., 0., 0.],
            [2. / 9., 1. / 3., 4. / 9., 0.],
        ],
        b: [2. / 9., 1. / 3., 4. / 9., 0.],
        b_star: Some([7. / 24., 1. / 4., 1. / 3., 1. / 8.]),
        c: [0., 1. / 2., 3. / 4., 1.],
        order: 3,
    };
}

impl ButcherTableau<7> {
    // usage is ButcherTableau::<7>::DORMANDPRINCE45
    pub const DORMANDPRINCE45: Self = Self {
        a: [
            [0., 0., 0., 0., 0., 0., 0.],
            [1. / 5., 0., 0., 0., 0., 0., 0.],
            [3. / 40., 9. / 40., 0., 0., 0., 0., 0.],
            [44. / 45., -56. / 15., 32. / 9., 0., 0., 0., 0.],
            [
                19372. / 6561.,
                -25360. / 2187.,
                64448. / 6561.,
                -212. / 729.,
                0.,
                0.,
                0.,
            ],
            [
                9017. / 3168.,
                -355. / 33.,
                46732. / 5247.,
                49. / 176.,
                -5103. / 18656.,
                0.,
                0.,
            ],
            [
                35. / 384.,
                0.,
                500. / 1113.,
                125. / 192.,
                -2187. / 6784.,
                11. / 84.,
                0.,
            ],
        ],
        b: [
            35. / 384.,
            0.,
            500. / 1113.,
            125. / 192.,
            -2187. / 6784.,
            11. / 84.,
            0.,
        ],
        b_star: Some([
            5179. / 57600.,
            0.,
            7571. / 16695.,
            393. / 640.,
            -92097. / 339200.,
            187. / 2100.,
            1. / 40.,
        ]),
        c: [0., 1. / 5., 3. / 10., 4. / 5., 8. / 9., 1., 1.],
        order: 5,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-13;

    fn check_consistency<const STAGES: usize>(tableau: &ButcherTableau<STAGES>) {
        // weights sum to one and each row of a sums to c
        assert_abs_diff_eq!(tableau.b.iter().sum::<f64>(), 1.0, epsilon = TOL);
        if let Some(b_star) = tableau.b_star {
            assert_abs_diff_eq!(b_star.iter().sum::<f64>(), 1.0, epsilon = TOL);
        }
        for s in 0..STAGES {
            assert_abs_diff_eq!(tableau.a[s].iter().sum::<f64>(), tableau.c[s], epsilon = TOL);
        }
    }

    #[test]
    fn test_tableaus_are_consistent() {
        check_consistency(&ButcherTableau::<4>::RK4);
        check_consistency(&ButcherTableau::<4>::BOGACKISHAMPINE32);
        check_consistency(&ButcherTableau::<7>::DORMANDPRINCE45);
    }

    #[test]
    fn test_embedded() {
        assert!(!ButcherTableau::<4>::RK4.is_embedded());
        assert!(ButcherTableau::<7>::DORMANDPRINCE45.is_embedded());
    }
}
