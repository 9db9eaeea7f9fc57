use gfdensity::{
    Accuracy, DensityError, GreenFunction, ImFreqMesh, Statistics, TailFitOptions, TailMoments,
    density, density_imfreq, density_imfreq_with,
};
use num_complex::Complex;

mod common;
use common::{TwoLevel, assert_close, bose, fermi, single_pole_gf, single_pole_moments};

#[test]
fn test_fermionic_single_pole_with_exact_moments() {
    let (beta, eps) = (10.0, 0.5);
    let gf = single_pole_gf(beta, Statistics::Fermionic, 2000, eps);
    let result = density_imfreq(&gf, Some(&single_pole_moments(eps))).unwrap();

    assert_eq!(result.accuracy(), Accuracy::TailCorrected { fit_error: None });
    assert!(!result.is_degraded());
    let n = result.as_scalar().unwrap();
    assert_close(n, Complex::new(fermi(eps, beta), 0.0), 1e-8, "n_F(0.5) at β=10");
}

#[test]
fn test_fermionic_single_pole_below_fermi_level() {
    let (beta, eps) = (5.0, -1.2);
    let gf = single_pole_gf(beta, Statistics::Fermionic, 2000, eps);
    let n = density_imfreq(&gf, Some(&single_pole_moments(eps)))
        .unwrap()
        .as_scalar()
        .unwrap();
    assert_close(n, Complex::new(fermi(eps, beta), 0.0), 1e-8, "n_F(-1.2) at β=5");
}

#[test]
fn test_bosonic_single_pole_gives_minus_bose_factor() {
    let beta = 10.0;
    for eps in [0.5, -0.3] {
        let gf = single_pole_gf(beta, Statistics::Bosonic, 2000, eps);
        let n = density_imfreq(&gf, Some(&single_pole_moments(eps)))
            .unwrap()
            .as_scalar()
            .unwrap();
        assert_close(n, Complex::new(-bose(eps, beta), 0.0), 1e-8, "-n_B(ε)");
    }
}

#[test]
fn test_fitted_moments_reproduce_single_pole() {
    let (beta, eps) = (10.0, 0.5);
    let gf = single_pole_gf(beta, Statistics::Fermionic, 2000, eps);
    let result = density(&gf, None).unwrap();

    match result.accuracy() {
        Accuracy::TailCorrected {
            fit_error: Some(err),
        } => assert!(err < 1e-10, "fit error {}", err),
        other => panic!("unexpected accuracy {:?}", other),
    }
    let n = result.as_scalar().unwrap();
    assert_close(n, Complex::new(fermi(eps, beta), 0.0), 1e-7, "fitted tail");
}

#[test]
fn test_fitted_moments_with_known_first_moment() {
    let (beta, eps) = (10.0, -0.5);
    let gf = single_pole_gf(beta, Statistics::Fermionic, 1000, eps);
    let known = TailMoments::from_scalars(&[Complex::new(1.0, 0.0)]).unwrap();
    let fit = gfdensity::fit_tail_moments(&gf, &known, &TailFitOptions::default()).unwrap();
    let n = density_imfreq(&gf, Some(fit.moments()))
        .unwrap()
        .as_scalar()
        .unwrap();
    assert_close(n, Complex::new(fermi(eps, beta), 0.0), 1e-7, "fit with known M1");
}

#[test]
fn test_tail_correction_accelerates_convergence() {
    let (beta, eps) = (10.0, 0.5);
    let exact = fermi(eps, beta);

    let mut previous_plain = f64::INFINITY;
    for n_iw in [100, 1000, 10000] {
        let gf = single_pole_gf(beta, Statistics::Fermionic, n_iw, eps);

        let plain = density_imfreq(&gf, Some(&TailMoments::empty())).unwrap();
        assert_eq!(plain.accuracy(), Accuracy::Degraded { order: 0 });
        let plain_err = (plain.as_scalar().unwrap().re - exact).abs();
        assert!(
            plain_err < previous_plain,
            "plain sum did not improve at n_iw={}: {} >= {}",
            n_iw,
            plain_err,
            previous_plain
        );
        previous_plain = plain_err;

        let corrected = density_imfreq(&gf, Some(&single_pole_moments(eps))).unwrap();
        let corrected_err = (corrected.as_scalar().unwrap().re - exact).abs();
        assert!(
            corrected_err < 1e-2 * plain_err,
            "tail correction gained too little at n_iw={}: {} vs {}",
            n_iw,
            corrected_err,
            plain_err
        );
    }
    // The plain sum error falls off like 1/ω_max
    assert!(previous_plain < 1e-4, "plain error {}", previous_plain);
}

#[test]
fn test_two_pole_plain_sum_converges() {
    // M1 = 0 for this pair of poles
    let (beta, eps) = (10.0, 0.5);
    let exact = fermi(eps, beta) - fermi(-eps, beta);
    let mesh = ImFreqMesh::new(beta, Statistics::Fermionic, 5000).unwrap();
    let values: Vec<Complex<f64>> = mesh
        .iter()
        .map(|f| {
            let iw = f.value_imaginary(beta);
            1.0 / (iw - eps) - 1.0 / (iw + eps)
        })
        .collect();
    let gf = GreenFunction::scalar(mesh, &values).unwrap();
    let n = density_imfreq(&gf, Some(&TailMoments::empty()))
        .unwrap()
        .as_scalar()
        .unwrap();
    assert!((n.re - exact).abs() < 1e-3, "n = {}, expected {}", n, exact);
}

#[test]
fn test_plain_sum_converges_to_density() {
    let beta = 10.0;
    for (statistics, eps, positive_only) in [
        (Statistics::Fermionic, 0.5, false),
        (Statistics::Fermionic, -0.8, true),
        (Statistics::Bosonic, 0.5, false),
        (Statistics::Bosonic, 0.7, true),
    ] {
        let mut mesh = ImFreqMesh::new(beta, statistics, 20000).unwrap();
        if positive_only {
            mesh = mesh.positive_only();
        }
        let gf = gfdensity::pole::single_pole_imfreq(mesh, eps).unwrap();
        let n = density_imfreq(&gf, Some(&TailMoments::empty()))
            .unwrap()
            .as_scalar()
            .unwrap();
        let expected = gfdensity::single_pole_density(statistics, eps, beta);
        assert!(
            (n.re - expected).abs() < 1e-4,
            "{:?}, ε = {}, positive-only {}: n = {}, expected {}",
            statistics,
            eps,
            positive_only,
            n,
            expected
        );
    }
}

#[test]
fn test_positive_only_mesh_matches_full_mesh() {
    let (beta, eps) = (8.0, 0.3);
    for statistics in [Statistics::Fermionic, Statistics::Bosonic] {
        let full = single_pole_gf(beta, statistics, 500, eps);
        let half_mesh = ImFreqMesh::new(beta, statistics, 500).unwrap().positive_only();
        let half = gfdensity::pole::single_pole_imfreq(half_mesh, eps).unwrap();

        let moments = single_pole_moments(eps);
        let n_full = density_imfreq(&full, Some(&moments)).unwrap().as_scalar().unwrap();
        let n_half = density_imfreq(&half, Some(&moments)).unwrap().as_scalar().unwrap();
        assert_close(n_half, n_full, 1e-12, "positive-only vs full mesh");
    }
}

#[test]
fn test_matrix_density_matches_rotated_occupations() {
    let beta = 10.0;
    let model = TwoLevel {
        eps: [-0.4, 0.7],
        theta: 0.6,
        phi: 0.9,
    };
    let mesh = ImFreqMesh::new(beta, Statistics::Fermionic, 2000).unwrap();
    let gf = model.gf(mesh);

    let result = density_imfreq(&gf, Some(&model.moments())).unwrap();
    assert_eq!(result.value().dims(), (2, 2));
    for i in 0..2 {
        for j in 0..2 {
            let expected = model.density(Statistics::Fermionic, beta, i, j);
            assert_close(result.get(i, j), expected, 1e-8, "matrix density entry");
        }
    }
    assert!(result.value().hermiticity_error() < 1e-12);
    let expected_trace = fermi(-0.4, beta) + fermi(0.7, beta);
    assert!((result.value().trace().re - expected_trace).abs() < 1e-8);

    // Same result from a positive-only mesh, and from fitted moments
    let half_mesh = ImFreqMesh::new(beta, Statistics::Fermionic, 2000).unwrap();
    let half = model.gf(half_mesh.positive_only());
    let result_half = density_imfreq(&half, Some(&model.moments())).unwrap();
    let result_fit = density_imfreq(&gf, None).unwrap();
    for i in 0..2 {
        for j in 0..2 {
            assert_close(result_half.get(i, j), result.get(i, j), 1e-12, "positive-only matrix");
            assert_close(result_fit.get(i, j), result.get(i, j), 1e-7, "fitted matrix");
        }
    }
}

#[test]
fn test_partial_moments_are_degraded_but_valid() {
    let (beta, eps) = (10.0, 0.5);
    let gf = single_pole_gf(beta, Statistics::Fermionic, 4000, eps);
    let m1 = TailMoments::from_scalars(&[Complex::new(1.0, 0.0)]).unwrap();
    let result = density_imfreq(&gf, Some(&m1)).unwrap();
    assert_eq!(result.accuracy(), Accuracy::Degraded { order: 1 });
    // With M1 removed the error is O(1/ω_max)
    assert!((result.as_scalar().unwrap().re - fermi(eps, beta)).abs() < 1e-3);
}

#[test]
fn test_custom_fit_options() {
    let (beta, eps) = (10.0, 0.5);
    let gf = single_pole_gf(beta, Statistics::Fermionic, 1000, eps);
    let options = TailFitOptions::default()
        .with_tail_fraction(0.3)
        .with_n_tail_max(20)
        .with_expansion_order(5);
    let n = density_imfreq_with(&gf, None, &options)
        .unwrap()
        .as_scalar()
        .unwrap();
    assert_close(n, Complex::new(fermi(eps, beta), 0.0), 1e-7, "custom fit options");
}

#[test]
fn test_non_finite_data_is_rejected_before_summation() {
    let beta = 10.0;
    let mesh = ImFreqMesh::new(beta, Statistics::Fermionic, 10).unwrap();
    let mut values: Vec<Complex<f64>> =
        mesh.iter().map(|f| 1.0 / f.value_imaginary(beta)).collect();
    values[3] = Complex::new(f64::INFINITY, 0.0);
    let gf = GreenFunction::scalar(mesh, &values).unwrap();
    assert_eq!(
        density_imfreq(&gf, Some(&single_pole_moments(0.0))).unwrap_err(),
        DensityError::NonFinite {
            context: "Green's function data",
            index: 3
        }
    );
}
