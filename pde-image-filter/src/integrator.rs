use crate::error::{FilterError, Result};
use crate::field::{image_shape, Field, FieldShape, Image};
use crate::operator::FieldOperator;
use log::{debug, trace};
use ndarray::{ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationParams {
    pub t0: f64,       // Initial time
    pub h: f64,        // Step size
    pub nbiter: usize, // Number of steps
}

impl IntegrationParams {
    pub fn new(t0: f64, h: f64, nbiter: usize) -> Self {
        Self { t0, h, nbiter }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.h.is_finite() {
            return Err(FilterError::InvalidParameters(format!(
                "step size must be finite, got h={}",
                self.h
            )));
        }
        Ok(())
    }

    pub fn final_time(&self) -> f64 {
        self.t0 + self.nbiter as f64 * self.h
    }
}

impl Default for IntegrationParams {
    fn default() -> Self {
        Self {
            t0: 0.0,
            h: 0.01,
            nbiter: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub channel: usize,
    pub channels: usize,
    pub iteration: usize, // 1-based
    pub nbiter: usize,
}

pub struct FieldIntegrator<'a, O: FieldOperator + ?Sized> {
    operator: &'a mut O,
    field: Field,
    params: IntegrationParams,
    current_iteration: usize,
}

impl<'a, O: FieldOperator + ?Sized> FieldIntegrator<'a, O> {
    pub fn new(
        operator: &'a mut O,
        initial: ArrayView2<f64>,
        params: IntegrationParams,
    ) -> Result<Self> {
        params.validate()?;
        FieldShape::of(&initial)?;
        Ok(Self {
            operator,
            field: initial.to_owned(),
            params,
            current_iteration: 0,
        })
    }

    pub fn current_time(&self) -> f64 {
        self.params.t0 + self.current_iteration as f64 * self.params.h
    }

    pub fn current_iteration(&self) -> usize {
        self.current_iteration
    }

    pub fn is_finished(&self) -> bool {
        self.current_iteration >= self.params.nbiter
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn into_field(self) -> Field {
        self.field
    }

    pub fn step(&mut self) -> Result<()> {
        let t = self.current_time();
        self.field = rk4_step(&mut *self.operator, t, self.params.h, &self.field)?;
        self.current_iteration += 1;
        trace!(
            "{}: step {}/{} (t={:.4})",
            self.operator.name(),
            self.current_iteration,
            self.params.nbiter,
            self.current_time()
        );
        Ok(())
    }

    /// Runs the remaining steps, calling `on_step` with the 1-based iteration after each.
    pub fn run(&mut self, mut on_step: impl FnMut(usize)) -> Result<()> {
        while !self.is_finished() {
            self.step()?;
            on_step(self.current_iteration);
        }
        Ok(())
    }
}

/// Classical RK4 step of size `h` from `(t, u)`.
pub fn rk4_step<O: FieldOperator + ?Sized>(
    operator: &mut O,
    t: f64,
    h: f64,
    u: &Field,
) -> Result<Field> {
    let half = h / 2.0;

    // Each stage reads a fresh field, `u` is never touched
    let k1 = checked_rate(operator, t, u.view())? * h;
    let k2 = checked_rate(operator, t + half, (u + &(&k1 / 2.0)).view())? * h;
    let k3 = checked_rate(operator, t + half, (u + &(&k2 / 2.0)).view())? * h;
    let k4 = checked_rate(operator, t + h, (u + &k3).view())? * h;

    Ok(u + &((k1 + &(k2 * 2.0) + &(k3 * 2.0) + &k4) * (1.0 / 6.0)))
}

fn checked_rate<O: FieldOperator + ?Sized>(
    operator: &mut O,
    t: f64,
    u: ArrayView2<f64>,
) -> Result<Field> {
    let rate = operator.rate(t, u)?;
    if rate.dim() != u.dim() {
        return Err(FilterError::DimensionMismatch {
            expected: u.dim(),
            found: rate.dim(),
        });
    }
    Ok(rate)
}

pub fn integrate_field<O: FieldOperator + ?Sized>(
    operator: &mut O,
    initial: ArrayView2<f64>,
    params: IntegrationParams,
) -> Result<Field> {
    integrate_field_with_progress(operator, initial, params, |_| {})
}

pub fn integrate_field_with_progress<O: FieldOperator + ?Sized>(
    operator: &mut O,
    initial: ArrayView2<f64>,
    params: IntegrationParams,
    on_step: impl FnMut(usize),
) -> Result<Field> {
    let mut integrator = FieldIntegrator::new(operator, initial, params)?;
    integrator.run(on_step)?;
    Ok(integrator.into_field())
}

pub fn integrate_image<O: FieldOperator + ?Sized>(
    operator: &mut O,
    image: ArrayView3<f64>,
    params: IntegrationParams,
) -> Result<Image> {
    integrate_image_with_progress(operator, image, params, |_| {})
}

// Channels run in index order and share the operator
pub fn integrate_image_with_progress<O: FieldOperator + ?Sized>(
    operator: &mut O,
    image: ArrayView3<f64>,
    params: IntegrationParams,
    mut on_progress: impl FnMut(Progress),
) -> Result<Image> {
    params.validate()?;
    let (_, _, channels) = image_shape(&image)?;

    let mut output = Image::zeros(image.raw_dim());
    for (channel, layer) in image.axis_iter(Axis(2)).enumerate() {
        debug!(
            "{}: channel {}/{} ({} steps, h={})",
            operator.name(),
            channel + 1,
            channels,
            params.nbiter,
            params.h
        );
        let field = integrate_field_with_progress(&mut *operator, layer, params, |iteration| {
            on_progress(Progress {
                channel,
                channels,
                iteration,
                nbiter: params.nbiter,
            })
        })?;
        output.index_axis_mut(Axis(2), channel).assign(&field);
    }
    Ok(output)
}

/// Integrates channels on the rayon pool, building one operator per channel.
///
/// Deterministic operators give the same result as [`integrate_image`].
pub fn integrate_image_parallel<F, O>(
    make_operator: F,
    image: ArrayView3<f64>,
    params: IntegrationParams,
) -> Result<Image>
where
    F: Fn(usize) -> O + Sync,
    O: FieldOperator,
{
    params.validate()?;
    let (_, _, channels) = image_shape(&image)?;

    let layers: Vec<ArrayView2<f64>> = image.axis_iter(Axis(2)).collect();
    let fields = layers
        .into_par_iter()
        .enumerate()
        .map(|(channel, layer)| -> Result<Field> {
            let mut operator = make_operator(channel);
            debug!(
                "{}: channel {}/{} on worker thread",
                operator.name(),
                channel + 1,
                channels
            );
            let field = integrate_field(&mut operator, layer, params)?;
            debug!(
                "{}: channel {}/{} finished ({} steps)",
                operator.name(),
                channel + 1,
                channels,
                params.nbiter
            );
            Ok(field)
        })
        .collect::<Result<Vec<Field>>>()?;

    let mut output = Image::zeros(image.raw_dim());
    for (channel, field) in fields.iter().enumerate() {
        output.index_axis_mut(Axis(2), channel).assign(field);
    }
    Ok(output)
}
