/**
 * The monotonized-central, fourth-order piecewise-linear slope. From a
 * five-point stencil `s = q[i-2 .. i+2]` of one scalar component, two
 * van-Leer-limited estimates are formed on the cell pairs biased toward
 * i-1 and i+1, combined with a fourth-order central estimate, and the
 * result is re-limited with the same sign / twice-the-minimum-magnitude
 * rule. The slope is forced to zero wherever the one-sided differences
 * disagree in sign (a local extremum), which is what suppresses new
 * oscillations.
 */
pub fn plm_slope(s: &[f64; 5]) -> f64 {

    let mut dlft = s[1] - s[0];
    let mut drgt = s[2] - s[1];
    let mut dcen = 0.5 * (dlft + drgt);
    let mut dsgn = 1.0_f64.copysign(dcen);
    let mut dlim = if dlft * drgt >= 0.0 {
        2.0 * dlft.abs().min(drgt.abs())
    } else {
        0.0
    };
    let dfm = dsgn * dlim.min(dcen.abs());

    dlft = s[3] - s[2];
    drgt = s[4] - s[3];
    dcen = 0.5 * (dlft + drgt);
    dsgn = 1.0_f64.copysign(dcen);
    dlim = if dlft * drgt >= 0.0 {
        2.0 * dlft.abs().min(drgt.abs())
    } else {
        0.0
    };
    let dfp = dsgn * dlim.min(dcen.abs());

    dlft = s[2] - s[1];
    drgt = s[3] - s[2];
    dcen = 0.5 * (dlft + drgt);
    dsgn = 1.0_f64.copysign(dcen);
    dlim = if dlft * drgt >= 0.0 {
        2.0 * dlft.abs().min(drgt.abs())
    } else {
        0.0
    };

    let dtemp = 4.0 / 3.0 * dcen - 1.0 / 6.0 * (dfp + dfm);

    dsgn * dlim.min(dtemp.abs())
}




// ============================================================================
#[cfg(test)]
mod test {
    use super::plm_slope;

    #[test]
    fn linear_ramp_recovers_the_exact_derivative() {
        assert_eq!(plm_slope(&[1.0, 2.0, 3.0, 4.0, 5.0]), 1.0);
        assert_eq!(plm_slope(&[5.0, 4.0, 3.0, 2.0, 1.0]), -1.0);
    }

    #[test]
    fn local_extremum_forces_zero_slope() {
        assert_eq!(plm_slope(&[0.0, 1.0, 3.0, 1.0, 0.0]), 0.0);
        assert_eq!(plm_slope(&[0.0, -1.0, -3.0, -1.0, 0.0]), 0.0);
    }

    #[test]
    fn uniform_stencil_has_zero_slope() {
        assert_eq!(plm_slope(&[7.0; 5]), 0.0);
    }

    #[test]
    fn slope_is_bounded_by_twice_the_one_sided_differences() {
        // Steep jump on the right; the limiter must not let the left side
        // overshoot.
        let s = [0.0, 0.0, 0.1, 10.0, 10.0];
        let slope = plm_slope(&s);
        assert!(slope >= 0.0);
        assert!(slope <= 2.0 * (s[2] - s[1]).abs());
    }

    #[test]
    fn monotone_data_stays_monotone_at_the_edges() {
        for s in &[[1.0, 2.0, 4.0, 8.0, 16.0], [0.0, 0.1, 0.2, 5.0, 5.1]] {
            let slope = plm_slope(s);
            let left = s[2] - 0.5 * slope;
            let right = s[2] + 0.5 * slope;
            assert!(left >= s[1].min(s[2]) && left <= s[1].max(s[2]));
            assert!(right >= s[2].min(s[3]) && right <= s[2].max(s[3]));
        }
    }
}
