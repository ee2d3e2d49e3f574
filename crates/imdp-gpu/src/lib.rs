//! # imdp-gpu: the alternative (GPU) Bellman-operator backend (§1, §7)
//!
//! An alternative backend consuming the same contracts as `imdp-algo`'s CPU
//! kernels: a [`GpuBellmanBackend`] trait mirroring the robust Bellman
//! operator's signature, plus an availability query. Per §1 this crate is
//! out of scope as a full implementation — no shader bodies, no `wgpu`
//! pipeline construction — but it must compile as a real, documented
//! contract so `imdp-cli`'s `--backend gpu` flag and `imdp-algo`'s dispatch
//! have something concrete to target.
//!
//! This crate is excluded from the workspace's default members (see the
//! root `Cargo.toml`), matching how this codebase keeps its own optional GPU
//! crate out of default builds: it pulls in `wgpu`, which is a heavy,
//! platform-sensitive dependency nobody wants in a `cargo test` of the core
//! engine.

use imdp_core::{FactoredMdp, ImdpError, ImdpResult, Scalar};

/// The `wgpu` backend set a real device-construction path would probe.
/// Exposed so callers can query platform support without this crate
/// standing up an actual device or pipeline.
pub fn supported_backends() -> wgpu::Backends {
    wgpu::Backends::all()
}

/// Mirrors the CPU Bellman operator's contract (§4.2): given a value
/// vector and a non-factored or factored system, compute the updated value
/// vector under the requested bound/objective. A real implementation would
/// dispatch a compute shader per Bellman step and read the result buffer
/// back; this interface has none of that.
pub trait GpuBellmanBackend<R: Scalar> {
    /// Whether this backend can currently run at all (driver present,
    /// device created, shared-memory budget available). The core solver
    /// falls back to the CPU path whenever this is `false`.
    fn is_available(&self) -> bool;

    /// Runs one robust Bellman step on the GPU. Always fails with
    /// [`ImdpError::Resource`] in this interface-only crate: there is no
    /// device to exhaust, but out-of-shared-memory is the one failure mode
    /// §7 reserves for an alternative backend, and reporting it here keeps
    /// callers' error-handling paths exercised against a real variant.
    fn bellman_step(
        &self,
        _value: &[R],
        _system: &FactoredMdp<R>,
        _upper_bound: bool,
        _maximize: bool,
    ) -> ImdpResult<Vec<R>> {
        Err(ImdpError::Resource(
            "imdp-gpu is an interface-only backend; no device is available".to_string(),
        ))
    }
}

/// The (currently sole) GPU backend implementation: a thin handle that never
/// reports itself available, since no `wgpu` device/pipeline is constructed
/// here.
#[derive(Debug, Default, Clone, Copy)]
pub struct WgpuBellmanBackend;

impl<R: Scalar> GpuBellmanBackend<R> for WgpuBellmanBackend {
    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_reports_unavailable() {
        let backend = WgpuBellmanBackend;
        assert!(!<WgpuBellmanBackend as GpuBellmanBackend<f64>>::is_available(&backend));
    }

    #[test]
    fn bellman_step_fails_with_resource_error() {
        let backend = WgpuBellmanBackend;
        let err = <WgpuBellmanBackend as GpuBellmanBackend<f64>>::bellman_step(
            &backend, &[], &dummy_system(), false, true,
        )
        .unwrap_err();
        assert!(matches!(err, ImdpError::Resource(_)));
    }

    fn dummy_system() -> FactoredMdp<f64> {
        use imdp_core::{AmbiguitySet, DenseAmbiguitySet, InitialStates, Marginal};
        let set = AmbiguitySet::Dense(
            DenseAmbiguitySet::from_lower_gap(1, 1, vec![1.0], vec![0.0]).unwrap(),
        );
        let marginal = Marginal::new(set, vec![0], vec![0], vec![1], vec![1]).unwrap();
        FactoredMdp::non_factored(1, 1, marginal, InitialStates::All).unwrap()
    }
}
