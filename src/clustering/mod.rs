//! Clustering of embedded vectors into symbol alphabets.
//!
//! # Example
//!
//! ```
//! use gait_entropy::clustering::{kmeans, KMeansConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let points = vec![
//!     vec![1.0, 2.0],
//!     vec![1.1, 2.1],
//!     vec![10.0, 11.0],
//!     vec![10.1, 11.1],
//! ];
//! let config = KMeansConfig::default().k(2);
//! let mut rng = StdRng::seed_from_u64(42);
//! let result = kmeans(&points, &config, &mut rng).unwrap();
//! assert_eq!(result.centroids.len(), 2);
//! ```

pub mod elbow;
pub mod kmeans;

pub use elbow::{
    candidate_sizes, select_alphabet_size, select_elbow, wcss_curve, AlphabetSelection,
    DEFAULT_MAX_ALPHABET, MIN_ALPHABET,
};
pub use kmeans::{kmeans, KMeansConfig, KMeansResult};
