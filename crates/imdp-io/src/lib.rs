//! # imdp-io: the persisted-format boundary (§6.3 of the system design)
//!
//! The robust dynamic-programming engine (`imdp-core` + `imdp-algo`) never
//! touches a filesystem path; this crate is where a [`imdp_core::FactoredMdp`]
//! and [`imdp_core::Specification`] meet the outside world. Three formats
//! are in scope:
//!
//! - [`prism`] — PRISM's explicit-model text format (`.sta`/`.tra`/`.lab`/
//!   `.pctl`/`.srew`). This is the one format this crate ships a real,
//!   tested writer for: it is the simplest of the three and the one the
//!   reference test suite round-trips against.
//! - [`bmdp`] — the single-file bmdp-tool format. Record types only; the
//!   reader/writer bodies are interface stubs (§1: out of scope for a full
//!   implementation).
//! - [`netcdf_json`] — the native sparse-CSC netCDF system plus its
//!   companion JSON specification. Record/attribute types only, same stub
//!   treatment as `bmdp`.
//!
//! None of these three modules constructs or mutates the value-iteration
//! engine's state; they only translate to/from its public data model.

pub mod bmdp;
pub mod netcdf_json;
pub mod prism;

pub use imdp_core::{ImdpError, ImdpResult};

fn unsupported(what: &str) -> ImdpError {
    std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("{what} is not implemented by this boundary crate; see §1/§6.3"),
    )
    .into()
}
