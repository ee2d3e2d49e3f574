//! bmdp-tool format (§6.3): one plain-text file, header
//! `N_states\nN_actions\nN_terminal\n`, `N_terminal` terminal-state ids, then
//! `src act dest lower upper` transition lines in sorted source/action order.
//!
//! Record types only (§1: this format's reader/writer bodies are out of
//! scope for a full implementation; the boundary crate ships the shapes so
//! downstream code and tests can depend on a stable contract).

use std::path::Path;

use imdp_core::{FactoredMdp, ImdpResult, Scalar};

/// One `src act dest lower upper` transition line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BmdpTransition {
    pub src: usize,
    pub act: usize,
    pub dest: usize,
    pub lower: f64,
    pub upper: f64,
}

/// The file's three-line header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmdpHeader {
    pub num_states: usize,
    pub num_actions: usize,
    pub num_terminal: usize,
}

/// Reads a bmdp-tool file into a [`FactoredMdp`]. Not implemented: bmdp-tool
/// is named in §1 as an external format this core repo only defines an
/// interface for.
pub fn read<R: Scalar>(_path: &Path) -> ImdpResult<FactoredMdp<R>> {
    Err(crate::unsupported("bmdp-tool import"))
}

/// Writes a non-factored system to bmdp-tool format. Not implemented; see
/// [`read`].
pub fn write<R: Scalar>(_path: &Path, _system: &FactoredMdp<R>) -> ImdpResult<()> {
    Err(crate::unsupported("bmdp-tool export"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_reports_unsupported() {
        let err = read::<f64>(Path::new("/dev/null")).unwrap_err();
        assert!(err.to_string().contains("bmdp-tool"));
    }
}
