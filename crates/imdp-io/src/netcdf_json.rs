//! Native netCDF + JSON format (§6.3): a netCDF file storing the sparse-CSC
//! ambiguity-set components (`lower_colptr`/`lower_rowval`/`lower_nzval`,
//! `upper_*`, `stateptr`, `initial_states`) plus a companion JSON document
//! encoding the property, horizon, and solve mode.
//!
//! Record/attribute types only, same stub treatment as [`crate::bmdp`].

use std::path::Path;

use imdp_core::{FactoredMdp, ImdpResult, Scalar, Specification};
use serde::{Deserialize, Serialize};

/// The netCDF file's global attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetcdfAttributes {
    pub num_states: usize,
    pub model: ModelKind,
    pub rows: String,
    pub cols: ColsKind,
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Imdp,
    Imc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColsKind {
    #[serde(rename = "from")]
    From,
    #[serde(rename = "from/action")]
    FromAction,
}

/// The companion JSON specification document (§6.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSpecification {
    pub property: JsonProperty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reach: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avoid: Option<Vec<usize>>,
    pub infinite_time: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub satisfaction_mode: String,
    pub strategy_mode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JsonProperty {
    Reachability,
    ReachAvoid,
    Reward,
}

/// Reads the netCDF + JSON pair into a [`FactoredMdp`] and [`Specification`].
/// Not implemented: native netCDF I/O is named in §1 as an external format
/// this core repo only defines an interface for.
pub fn read<R: Scalar>(_nc_path: &Path, _json_path: &Path) -> ImdpResult<(FactoredMdp<R>, Specification<R>)> {
    Err(crate::unsupported("netCDF+JSON import"))
}

/// Writes a system and specification to the netCDF + JSON pair. Not
/// implemented; see [`read`].
pub fn write<R: Scalar>(
    _nc_path: &Path,
    _json_path: &Path,
    _system: &FactoredMdp<R>,
    _spec: &Specification<R>,
) -> ImdpResult<()> {
    Err(crate::unsupported("netCDF+JSON export"))
}
