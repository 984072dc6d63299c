pub mod build;
pub mod concordance;
pub mod cophenetic;
pub mod error;
pub mod matrix;
pub mod node;
pub mod tree;

pub use build::Method;
pub use concordance::{Evaluation, Policy};
pub use error::PhyloError;
pub use matrix::DistanceMatrix;
pub use node::{Node, NodeId};
pub use tree::Tree;
