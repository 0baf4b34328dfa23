//! Filter parameters of the warped lattice shaper.

use thiserror::Error;

use crate::MAX_ORDER;

/// Errors reported by the strict configuration constructors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("requested order {requested} exceeds the maximum of {max}")]
    OrderTooHigh { requested: usize, max: usize },
    #[error("order {order} needs {order} reflection coefficients, got {provided}")]
    MissingCoefficients { order: usize, provided: usize },
}

/// Order, warping coefficient and reflection coefficients.
///
/// Storage is fixed at [`MAX_ORDER`] stages; only the first `order` entries
/// are meaningful.
#[derive(Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ConfigRepr", into = "ConfigRepr")
)]
pub struct ShaperConfig {
    order: usize,
    lambda: f32,
    k: [f32; MAX_ORDER],
}

impl Default for ShaperConfig {
    fn default() -> Self {
        Self::bypass()
    }
}

impl std::fmt::Debug for ShaperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaperConfig")
            .field("order", &self.order)
            .field("lambda", &self.lambda)
            .field("k", &self.coefficients())
            .finish()
    }
}

impl ShaperConfig {
    /// Order 0: the shaper passes the error through untouched.
    pub const fn bypass() -> Self {
        Self {
            order: 0,
            lambda: 0.0,
            k: [0.0; MAX_ORDER],
        }
    }

    /// Uses every coefficient in `coefficients`, up to [`MAX_ORDER`].
    pub fn new(lambda: f32, coefficients: &[f32]) -> Self {
        Self::with_order(lambda, coefficients.len(), coefficients)
    }

    /// Takes the first `order` coefficients. Orders above [`MAX_ORDER`] are
    /// clamped.
    ///
    /// # Panics
    ///
    /// Panics if `coefficients` holds fewer than the clamped order.
    pub fn with_order(lambda: f32, order: usize, coefficients: &[f32]) -> Self {
        let order = clamp_order(order);
        let mut k = [0.0; MAX_ORDER];
        k[..order].copy_from_slice(&coefficients[..order]);
        Self { order, lambda, k }
    }

    /// Pulls at most `order` (clamped) coefficients from `coefficients`. A
    /// shorter source lowers the order to the number of values it yielded.
    pub fn from_source<I>(lambda: f32, order: usize, coefficients: I) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        let order = clamp_order(order);
        let mut k = [0.0; MAX_ORDER];
        let mut taken = 0;
        for (slot, value) in k[..order].iter_mut().zip(coefficients) {
            *slot = value;
            taken += 1;
        }
        if taken < order {
            tracing::debug!(order, taken, "coefficient source ended early");
        }
        Self {
            order: taken,
            lambda,
            k,
        }
    }

    /// Strict constructor: rejects orders above [`MAX_ORDER`] and short
    /// coefficient slices instead of clamping.
    pub fn try_new(
        lambda: f32,
        order: usize,
        coefficients: &[f32],
    ) -> Result<Self, ConfigError> {
        if order > MAX_ORDER {
            tracing::warn!(order, max = MAX_ORDER, "rejecting shaper order");
            return Err(ConfigError::OrderTooHigh {
                requested: order,
                max: MAX_ORDER,
            });
        }
        if coefficients.len() < order {
            return Err(ConfigError::MissingCoefficients {
                order,
                provided: coefficients.len(),
            });
        }
        Ok(Self::with_order(lambda, order, coefficients))
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn lambda(&self) -> f32 {
        self.lambda
    }

    #[inline]
    pub fn coefficients(&self) -> &[f32] {
        &self.k[..self.order]
    }

    /// # Panics
    ///
    /// Panics if `index >= self.order()`.
    #[inline]
    pub fn coefficient(&self, index: usize) -> f32 {
        self.coefficients()[index]
    }
}

fn clamp_order(requested: usize) -> usize {
    if requested > MAX_ORDER {
        tracing::debug!(requested, max = MAX_ORDER, "clamping shaper order");
        MAX_ORDER
    } else {
        requested
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ConfigRepr {
    lambda: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order: Option<usize>,
    coefficients: Vec<f32>,
}

#[cfg(feature = "serde")]
impl TryFrom<ConfigRepr> for ShaperConfig {
    type Error = ConfigError;

    fn try_from(repr: ConfigRepr) -> Result<Self, Self::Error> {
        let order = repr.order.unwrap_or(repr.coefficients.len());
        ShaperConfig::try_new(repr.lambda, order, &repr.coefficients)
    }
}

#[cfg(feature = "serde")]
impl From<ShaperConfig> for ConfigRepr {
    fn from(config: ShaperConfig) -> Self {
        Self {
            lambda: config.lambda,
            order: None,
            coefficients: config.coefficients().to_vec(),
        }
    }
}
