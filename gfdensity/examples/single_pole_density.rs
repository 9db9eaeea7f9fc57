//! Density of a single level at ε = 0.5, β = 10 in all three representations
//!
//! Run with: cargo run --example single_pole_density

use gfdensity::pole::{lorentzian_refreq, single_pole_imfreq, single_pole_legendre};
use gfdensity::{
    ImFreqMesh, LegendreMesh, ReFreqMesh, Statistics, TailMoments, density, single_pole_density,
};
use num_complex::Complex;

fn main() -> gfdensity::Result<()> {
    let (beta, eps) = (10.0, 0.5);
    let exact = single_pole_density(Statistics::Fermionic, eps, beta);
    println!("exact n_F(ε)             = {:.12}", exact);

    let gf = single_pole_imfreq(ImFreqMesh::new(beta, Statistics::Fermionic, 2000)?, eps)?;
    let moments = TailMoments::from_scalars(&[
        Complex::new(1.0, 0.0),
        Complex::new(eps, 0.0),
        Complex::new(eps * eps, 0.0),
    ])?;
    let known = density(&gf, Some(&moments))?;
    let fitted = density(&gf, None)?;
    let plain = density(&gf, Some(&TailMoments::empty()))?;
    for (label, result) in [
        ("Matsubara, exact moments", &known),
        ("Matsubara, fitted tail  ", &fitted),
        ("Matsubara, no moments   ", &plain),
    ] {
        let n = result.get(0, 0).re;
        println!(
            "{} = {:.12}  (error {:.2e}, {:?})",
            label,
            n,
            (n - exact).abs(),
            result.accuracy()
        );
    }

    let legendre_mesh = LegendreMesh::new(beta, Statistics::Fermionic, 30)?;
    let legendre = single_pole_legendre(legendre_mesh, eps, 64)?;
    let n = density(&legendre, None)?.get(0, 0).re;
    println!("Legendre, 30 coefficients = {:.12}  (error {:.2e})", n, (n - exact).abs());

    // A narrow Lorentzian approximates the delta-function spectrum
    let mesh = ReFreqMesh::new(-10.0, 10.0, 20001)?.with_beta(beta)?;
    let refreq = lorentzian_refreq(mesh, eps, 0.01)?;
    let result = density(&refreq, None)?;
    println!(
        "real frequency, γ = 0.01  = {:.12}  ({:?})",
        result.get(0, 0).re,
        result.accuracy()
    );

    Ok(())
}
