use ndarray::Array1;
use tracing::debug;

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Outcome of a Nelder-Mead run
#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Array1<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Derivative-free simplex minimizer
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Maximum simplex updates
    pub max_iter: usize,
    /// Stop once the spread of objective values falls below this
    pub tol: f64,
}

impl NelderMead {
    pub fn new(max_iter: usize, tol: f64) -> Self {
        Self { max_iter, tol }
    }

    /// Minimize `f` starting from `x0`. Non-finite objective values are
    /// treated as +inf so the simplex walks away from them.
    pub fn minimize<F>(&self, f: F, x0: &Array1<f64>) -> Minimum
    where
        F: Fn(&Array1<f64>) -> f64,
    {
        let objective = |x: &Array1<f64>| {
            let v = f(x);
            if v.is_finite() { v } else { f64::INFINITY }
        };

        let n = x0.len();
        let mut simplex: Vec<Array1<f64>> = Vec::with_capacity(n + 1);
        simplex.push(x0.clone());
        for i in 0..n {
            let mut vertex = x0.clone();
            vertex[i] += initial_step(x0[i]);
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|x| objective(x)).collect();

        let mut iterations = 0;
        loop {
            order_simplex(&mut simplex, &mut values);

            let best = values[0];
            let worst = values[n];
            if (worst - best).abs() <= self.tol * (1.0 + best.abs()) {
                debug!("Nelder-Mead converged in {} iterations (f={:.6e})", iterations, best);
                return Minimum {
                    x: simplex.swap_remove(0),
                    value: best,
                    iterations,
                    converged: true,
                };
            }
            if iterations >= self.max_iter {
                debug!("Nelder-Mead stopped after {} iterations (spread={:.3e})", iterations, worst - best);
                return Minimum {
                    x: simplex.swap_remove(0),
                    value: best,
                    iterations,
                    converged: false,
                };
            }
            iterations += 1;

            // Centroid of every vertex except the worst
            let mut centroid = Array1::<f64>::zeros(n);
            for vertex in simplex.iter().take(n) {
                centroid += vertex;
            }
            centroid /= n as f64;

            let reflected = &centroid + &((&centroid - &simplex[n]) * REFLECT);
            let f_reflected = objective(&reflected);

            if f_reflected < values[0] {
                let expanded = &centroid + &((&reflected - &centroid) * EXPAND);
                let f_expanded = objective(&expanded);
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
                continue;
            }

            if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
                continue;
            }

            // Contract toward whichever of reflected/worst is better
            let (toward, f_toward) = if f_reflected < values[n] {
                (reflected, f_reflected)
            } else {
                (simplex[n].clone(), values[n])
            };
            let contracted = &centroid + &((&toward - &centroid) * CONTRACT);
            let f_contracted = objective(&contracted);
            if f_contracted < f_toward {
                simplex[n] = contracted;
                values[n] = f_contracted;
                continue;
            }

            let best_vertex = simplex[0].clone();
            for i in 1..=n {
                simplex[i] = &best_vertex + &((&simplex[i] - &best_vertex) * SHRINK);
                values[i] = objective(&simplex[i]);
            }
        }
    }
}

fn initial_step(x: f64) -> f64 {
    (0.05 * x.abs()).max(0.1)
}

fn order_simplex(simplex: &mut Vec<Array1<f64>>, values: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
    *values = idx.iter().map(|&i| values[i]).collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_minimizes_quadratic_bowl() {
        let optimizer = NelderMead::new(1000, 1e-12);
        let result = optimizer.minimize(
            |x| (x[0] - 3.0).powi(2) + 2.0 * (x[1] + 1.0).powi(2),
            &array![0.0, 0.0],
        );
        assert!(result.converged);
        assert!((result.x[0] - 3.0).abs() < 1e-4);
        assert!((result.x[1] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_rosenbrock() {
        let optimizer = NelderMead::new(5000, 1e-14);
        let result = optimizer.minimize(
            |x| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2),
            &array![-1.2, 1.0],
        );
        assert!(result.converged);
        assert!((result.x[0] - 1.0).abs() < 1e-2);
        assert!((result.x[1] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_reports_exhausted_budget() {
        let optimizer = NelderMead::new(2, 1e-12);
        let result = optimizer.minimize(|x| (x[0] - 50.0).powi(2), &array![0.0]);
        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_non_finite_objective_is_avoided() {
        let optimizer = NelderMead::new(1000, 1e-12);
        let result = optimizer.minimize(
            |x| if x[0] < 0.0 { f64::NAN } else { (x[0] - 1.0).powi(2) },
            &array![0.5],
        );
        assert!(result.converged);
        assert!((result.x[0] - 1.0).abs() < 1e-4);
    }
}
