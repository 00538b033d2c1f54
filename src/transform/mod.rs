//! Signal transformations applied before embedding.
//!
//! # Example
//!
//! ```
//! use gait_entropy::transform::standardize;
//!
//! let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//! let scaled = standardize(&series).unwrap();
//! assert!(scaled.data.iter().sum::<f64>().abs() < 1e-12);
//! ```

pub mod scale;

pub use scale::{standardize, ScaleResult};
