//! Regressors

mod linear;

pub use linear::LinearRegression;
