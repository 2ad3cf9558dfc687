//! Derivative-free minimisation for model parameter estimation.

use std::cmp::Ordering;

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The optimal point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Spread of objective values, relative to `1 + |best|`, below which
    /// the search may stop.
    pub tolerance: f64,
    /// Simplex size, relative to `1 + |centroid|`, below which the search
    /// may stop. Both tolerances must be met.
    pub point_tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrinkage coefficient.
    pub sigma: f64,
    /// Initial simplex step, relative to each non-zero start coordinate.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            point_tolerance: 1e-6,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Vertices of the simplex with their objective values, kept sorted best
/// first.
struct Simplex {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl Simplex {
    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| {
            self.values[a]
                .partial_cmp(&self.values[b])
                .unwrap_or(Ordering::Equal)
        });
        self.vertices = order.iter().map(|&i| self.vertices[i].clone()).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }

    fn best(&self) -> f64 {
        self.values[0]
    }

    fn worst(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    fn second_worst(&self) -> f64 {
        self.values[self.values.len() - 2]
    }

    fn replace_worst(&mut self, point: Vec<f64>, value: f64) {
        let last = self.values.len() - 1;
        self.vertices[last] = point;
        self.values[last] = value;
    }

    /// Centroid of every vertex except the worst.
    fn centroid(&self) -> Vec<f64> {
        let dim = self.vertices[0].len();
        let count = self.vertices.len() - 1;
        let mut centroid = vec![0.0; dim];
        for vertex in &self.vertices[..count] {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= count as f64);
        centroid
    }

    fn diameter(&self, centroid: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|v| distance(v, centroid))
            .fold(0.0, f64::max)
    }
}

/// Minimise `objective` with the Nelder-Mead simplex method.
///
/// Points are clamped to `bounds` (one `(min, max)` pair per coordinate)
/// before every evaluation.
///
/// # Example
/// ```
/// use activity_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let dim = initial.len();
    if dim == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: Vec<f64>| clamp_to_bounds(point, bounds);
    let evaluate = |point: &[f64]| {
        let value = objective(point);
        if value.is_nan() {
            f64::INFINITY
        } else {
            value
        }
    };

    let start = clamp(initial.to_vec());
    let mut vertices = vec![start.clone()];
    for i in 0..dim {
        let mut vertex = start.clone();
        vertex[i] += if start[i].abs() > 1e-10 {
            config.initial_step * start[i].abs()
        } else {
            config.initial_step
        };
        vertices.push(clamp(vertex));
    }
    let values = vertices.iter().map(|v| evaluate(v)).collect();
    let mut simplex = Simplex { vertices, values };

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        simplex.sort();

        let spread = simplex.worst() - simplex.best();
        let centroid = simplex.centroid();
        let values_close = spread <= config.tolerance * (1.0 + simplex.best().abs());
        let points_close = simplex.diameter(&centroid)
            <= config.point_tolerance * (1.0 + norm(&centroid));
        if values_close && points_close {
            converged = true;
            break;
        }

        let worst = simplex.vertices[dim].clone();
        let reflected = clamp(towards(&centroid, &worst, -config.alpha));
        let reflected_value = evaluate(&reflected);

        if reflected_value < simplex.best() {
            let expanded = clamp(towards(&centroid, &reflected, config.gamma));
            let expanded_value = evaluate(&expanded);
            if expanded_value < reflected_value {
                simplex.replace_worst(expanded, expanded_value);
            } else {
                simplex.replace_worst(reflected, reflected_value);
            }
            continue;
        }

        if reflected_value < simplex.second_worst() {
            simplex.replace_worst(reflected, reflected_value);
            continue;
        }

        let (target, target_value) = if reflected_value < simplex.worst() {
            (&reflected, reflected_value)
        } else {
            (&worst, simplex.worst())
        };
        let contracted = clamp(towards(&centroid, target, config.rho));
        let contracted_value = evaluate(&contracted);
        if contracted_value < target_value {
            simplex.replace_worst(contracted, contracted_value);
            continue;
        }

        // Shrink towards the best vertex
        let best = simplex.vertices[0].clone();
        for i in 1..=dim {
            let shrunk: Vec<f64> = best
                .iter()
                .zip(&simplex.vertices[i])
                .map(|(b, v)| b + config.sigma * (v - b))
                .collect();
            let shrunk = clamp(shrunk);
            simplex.values[i] = evaluate(&shrunk);
            simplex.vertices[i] = shrunk;
        }
    }

    simplex.sort();
    NelderMeadResult {
        optimal_point: simplex.vertices[0].clone(),
        optimal_value: simplex.values[0],
        iterations,
        converged,
    }
}

/// `centroid + coef · (point − centroid)`.
fn towards(centroid: &[f64], point: &[f64], coef: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + coef * (p - c))
        .collect()
}

fn clamp_to_bounds(mut point: Vec<f64>, bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
            *x = x.clamp(lo, hi);
        }
    }
    point
}

fn norm(a: &[f64]) -> f64 {
    a.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
