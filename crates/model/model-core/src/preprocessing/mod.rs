//! Feature preprocessing
//!
//! Fitted transformations applied before an estimator sees a row.

mod label;
mod one_hot;
mod scaler;

pub use label::LabelEncoder;
pub use one_hot::OneHotEncoder;
pub use scaler::StandardScaler;
