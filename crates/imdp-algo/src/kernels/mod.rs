//! The robust Bellman operator's per-column/per-axis kernels (§4.2).
//!
//! [`omax`] is the exact O-maximization kernel used directly by the
//! non-factored dense/sparse Bellman step, and as the per-axis building
//! block for the factored O-maximization relaxation. [`vertex`] and
//! [`mccormick`] are the two exact (but more expensive) kernels available
//! for factored systems. [`factored`] combines all three into the joint
//! backup a multi-marginal source state needs, dispatched by
//! [`crate::bellman`] per the selected `BellmanAlgorithm`.

pub mod factored;
pub mod mccormick;
pub mod omax;
pub mod vertex;
