use crate::error::Result;
use crate::field::{extend_borders, Field, FieldShape};
use crate::stencil::{dense_horizontal, dense_vertical, random_matrix, Stencil};
use ndarray::{ArrayView2, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Right-hand side `dU/dt = F(t, U)`. `rate` keeps the input shape.
pub trait FieldOperator {
    fn name(&self) -> &'static str;

    fn rate(&mut self, t: f64, field: ArrayView2<f64>) -> Result<Field>;

    /// Whether equal inputs always give bit-identical output.
    fn is_deterministic(&self) -> bool {
        true
    }
}

impl<O: FieldOperator + ?Sized> FieldOperator for Box<O> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn rate(&mut self, t: f64, field: ArrayView2<f64>) -> Result<Field> {
        (**self).rate(t, field)
    }

    fn is_deterministic(&self) -> bool {
        (**self).is_deterministic()
    }
}

// a: row-axis term, b: column-axis term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combination {
    Sum,            // a + b
    Norm,           // sqrt(a² + b²)
    QuarticSquared, // (a⁴ + b⁴)²
}

impl Combination {
    pub fn combine(self, mut a: Field, b: &Field) -> Field {
        match self {
            Combination::Sum => a += b,
            Combination::Norm => {
                Zip::from(&mut a).and(b).for_each(|a, &b| *a = (*a * *a + b * b).sqrt());
            }
            Combination::QuarticSquared => {
                Zip::from(&mut a)
                    .and(b)
                    .for_each(|a, &b| *a = (a.powi(4) + b.powi(4)).powi(2));
            }
        }
        a
    }
}

pub fn banded_rate(
    stencil: Stencil,
    combination: Combination,
    field: ArrayView2<f64>,
) -> Result<Field> {
    let shape = FieldShape::of(&field)?;
    let padded = extend_borders(field)?;
    let vertical = stencil.apply_vertical(padded.view(), shape)?;
    let horizontal = stencil.apply_horizontal(padded.view(), shape)?;
    Ok(combination.combine(vertical, &horizontal))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Diffusion;

impl FieldOperator for Diffusion {
    fn name(&self) -> &'static str {
        "diffusion"
    }

    fn rate(&mut self, _t: f64, field: ArrayView2<f64>) -> Result<Field> {
        banded_rate(Stencil::Laplacian, Combination::Sum, field)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GradientNorm;

impl FieldOperator for GradientNorm {
    fn name(&self) -> &'static str {
        "gradient_norm"
    }

    fn rate(&mut self, _t: f64, field: ArrayView2<f64>) -> Result<Field> {
        banded_rate(Stencil::Gradient, Combination::Norm, field)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LaplacianNorm;

impl FieldOperator for LaplacianNorm {
    fn name(&self) -> &'static str {
        "laplacian_norm"
    }

    fn rate(&mut self, _t: f64, field: ArrayView2<f64>) -> Result<Field> {
        banded_rate(Stencil::Laplacian, Combination::Norm, field)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Brightness;

impl FieldOperator for Brightness {
    fn name(&self) -> &'static str {
        "brightness"
    }

    fn rate(&mut self, _t: f64, field: ArrayView2<f64>) -> Result<Field> {
        banded_rate(Stencil::Brightness, Combination::Sum, field)
    }
}

/// Fourth-power diffusion: `((D_r U)⁴ + (D_c U)⁴)²`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuarticDiffusion;

impl FieldOperator for QuarticDiffusion {
    fn name(&self) -> &'static str {
        "quartic"
    }

    fn rate(&mut self, _t: f64, field: ArrayView2<f64>) -> Result<Field> {
        banded_rate(Stencil::Laplacian, Combination::QuarticSquared, field)
    }
}

/// "Prince de Galles" texture: two fresh random matrices per evaluation.
#[derive(Debug, Clone)]
pub struct PrinceDeGalles<R = StdRng> {
    rng: R,
}

impl<R: Rng> PrinceDeGalles<R> {
    pub fn new(rng: R) -> Self {
        PrinceDeGalles { rng }
    }
}

impl PrinceDeGalles<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> FieldOperator for PrinceDeGalles<R> {
    fn name(&self) -> &'static str {
        "prince_de_galles"
    }

    fn rate(&mut self, _t: f64, field: ArrayView2<f64>) -> Result<Field> {
        let shape = FieldShape::of(&field)?;
        let padded = extend_borders(field)?;
        let row_matrix = random_matrix(shape.rows, &mut self.rng)?;
        let col_matrix = random_matrix(shape.cols, &mut self.rng)?;
        let vertical = dense_vertical(&row_matrix, padded.view(), shape)?;
        let horizontal = dense_horizontal(&col_matrix, padded.view(), shape)?;
        Ok(Combination::Sum.combine(vertical, &horizontal))
    }

    fn is_deterministic(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Diffusion,
    GradientNorm,
    LaplacianNorm,
    Brightness,
    PrinceDeGalles,
    Quartic,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Diffusion,
        FilterKind::GradientNorm,
        FilterKind::LaplacianNorm,
        FilterKind::Brightness,
        FilterKind::PrinceDeGalles,
        FilterKind::Quartic,
    ];

    /// Builds the operator. `seed` only affects the random variant; without
    /// one it is seeded from the OS.
    pub fn build(self, seed: Option<u64>) -> Box<dyn FieldOperator + Send> {
        match self {
            FilterKind::Diffusion => Box::new(Diffusion),
            FilterKind::GradientNorm => Box::new(GradientNorm),
            FilterKind::LaplacianNorm => Box::new(LaplacianNorm),
            FilterKind::Brightness => Box::new(Brightness),
            FilterKind::Quartic => Box::new(QuarticDiffusion),
            FilterKind::PrinceDeGalles => match seed {
                Some(seed) => Box::new(PrinceDeGalles::seeded(seed)),
                None => Box::new(PrinceDeGalles::from_os_rng()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample(rows: usize, cols: usize) -> Field {
        Field::from_shape_fn((rows, cols), |(i, j)| {
            (((i + 1) * (j + 2)) % 9) as f64 * 10.0 - 3.0 * j as f64
        })
    }

    #[test]
    fn every_kind_preserves_shape() {
        for kind in FilterKind::ALL {
            let mut op = kind.build(Some(3));
            for (rows, cols) in [(1, 1), (1, 6), (5, 1), (4, 9)] {
                let out = op.rate(0.0, sample(rows, cols).view()).unwrap();
                assert_eq!(out.dim(), (rows, cols), "{}", op.name());
            }
        }
    }

    #[test]
    fn diffusion_of_constant_field_is_zero() {
        let u = Field::from_elem((4, 6), 42.0);
        let out = Diffusion.rate(0.0, u.view()).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn diffusion_matches_hand_computed_values() {
        // Padded:
        // 1 1 2 2
        // 1 1 2 2
        // 3 3 4 4
        // 3 3 4 4
        let u = array![[1.0, 2.0], [3.0, 4.0]];
        let out = Diffusion.rate(0.0, u.view()).unwrap();
        // Vertical terms are 2 on row 0 and -2 on row 1, horizontal terms 1 on
        // column 0 and -1 on column 1.
        let expected = array![[2.0 + 1.0, 2.0 - 1.0], [-2.0 + 1.0, -2.0 - 1.0]];
        assert_eq!(out, expected);
    }

    #[test]
    fn norm_variants_are_non_negative() {
        let u = sample(6, 7) - 40.0;
        let ops: Vec<Box<dyn FieldOperator>> = vec![Box::new(GradientNorm), Box::new(LaplacianNorm)];
        for mut op in ops {
            let out = op.rate(0.0, u.view()).unwrap();
            assert!(out.iter().all(|&v| v >= 0.0), "{}", op.name());
        }
    }

    #[test]
    fn quartic_combines_axis_terms() {
        let u = array![[0.0, 1.0, 0.0]];
        let out = QuarticDiffusion.rate(0.0, u.view()).unwrap();
        // Single row: vertical term vanishes, horizontal second differences are [1, -2, 1].
        let expected = array![[1.0, 256.0, 1.0]];
        assert_eq!(out, expected);
    }

    #[test]
    fn time_argument_is_ignored() {
        let u = sample(5, 5);
        for kind in FilterKind::ALL {
            if kind == FilterKind::PrinceDeGalles {
                continue;
            }
            let mut op = kind.build(None);
            let a = op.rate(0.0, u.view()).unwrap();
            let b = op.rate(123.5, u.view()).unwrap();
            assert_eq!(a, b, "{}", op.name());
        }
    }

    #[test]
    fn random_variant_resamples_between_calls() {
        let u = sample(8, 8);
        let mut op = PrinceDeGalles::seeded(11);
        let first = op.rate(0.0, u.view()).unwrap();
        let second = op.rate(0.0, u.view()).unwrap();
        assert_ne!(first, second);
        assert!(!op.is_deterministic());

        let mut replay = PrinceDeGalles::seeded(11);
        assert_eq!(replay.rate(0.0, u.view()).unwrap(), first);
    }

    #[test]
    fn nan_propagates_through_stencil() {
        let mut u = Field::zeros((3, 3));
        u[[1, 1]] = f64::NAN;
        let out = Diffusion.rate(0.0, u.view()).unwrap();
        assert!(out[[1, 1]].is_nan());
        assert!(out[[0, 1]].is_nan());
        assert!(out[[1, 0]].is_nan());
    }

    #[test]
    fn empty_field_is_rejected() {
        let u = Field::zeros((0, 3));
        assert!(Diffusion.rate(0.0, u.view()).is_err());
        assert!(PrinceDeGalles::seeded(0).rate(0.0, u.view()).is_err());
    }

    #[test]
    fn filter_kind_reads_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: FilterKind,
        }
        let w: Wrapper = toml::from_str("kind = \"prince_de_galles\"").unwrap();
        assert_eq!(w.kind, FilterKind::PrinceDeGalles);
        let w: Wrapper = toml::from_str("kind = \"gradient_norm\"").unwrap();
        assert_eq!(w.kind, FilterKind::GradientNorm);
    }
}
