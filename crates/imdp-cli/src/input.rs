//! Native JSON input parsing: a non-factored system document and a
//! specification document (reusing `imdp-io`'s netCDF-companion JSON shape,
//! §6.3), turned into the `imdp-core` types `imdp-algo::solve` consumes.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use imdp_core::{
    AmbiguitySet, DenseAmbiguitySet, FactoredMdp, InitialStates, Marginal, Property,
    SatisfactionMode, Specification, StrategyMode,
};
use imdp_io::netcdf_json::{JsonProperty, JsonSpecification};
use serde::Deserialize;

/// A non-factored (`N = M = 1`) IMDP, described densely: `lower`/`gap` are
/// `num_states * num_states * num_actions`-length column-major arrays over
/// `(target, source*action)`, matching [`DenseAmbiguitySet`]'s layout.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemDoc {
    pub num_states: usize,
    pub num_actions: usize,
    pub lower: Vec<f64>,
    pub gap: Vec<f64>,
    #[serde(default = "default_initial")]
    pub initial_states: InitialStatesDoc,
}

fn default_initial() -> InitialStatesDoc {
    InitialStatesDoc::All
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InitialStatesDoc {
    All,
    Some(Vec<Vec<usize>>),
}

impl From<InitialStatesDoc> for InitialStates {
    fn from(doc: InitialStatesDoc) -> Self {
        match doc {
            InitialStatesDoc::All => InitialStates::All,
            InitialStatesDoc::Some(states) => InitialStates::Some(states),
        }
    }
}

pub fn load_system(path: &Path) -> Result<FactoredMdp<f64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading system file {}", path.display()))?;
    let doc: SystemDoc = serde_json::from_str(&text)
        .with_context(|| format!("parsing system file {}", path.display()))?;
    let n_target = doc.num_states;
    let n_source = doc.num_states * doc.num_actions;
    let set = AmbiguitySet::Dense(DenseAmbiguitySet::from_lower_gap(
        n_target, n_source, doc.lower, doc.gap,
    )?);
    let marginal = Marginal::new(
        set,
        vec![0],
        vec![0],
        vec![doc.num_states],
        vec![doc.num_actions],
    )?;
    Ok(FactoredMdp::non_factored(
        doc.num_states,
        doc.num_actions,
        marginal,
        doc.initial_states.into(),
    )?)
}

fn parse_satisfaction(mode: &str) -> Result<SatisfactionMode> {
    match mode {
        "pessimistic" => Ok(SatisfactionMode::Pessimistic),
        "optimistic" => Ok(SatisfactionMode::Optimistic),
        other => bail!("unknown satisfaction_mode '{other}'; expected pessimistic|optimistic"),
    }
}

fn parse_strategy(mode: &str) -> Result<StrategyMode> {
    match mode {
        "maximize" => Ok(StrategyMode::Maximize),
        "minimize" => Ok(StrategyMode::Minimize),
        other => bail!("unknown strategy_mode '{other}'; expected maximize|minimize"),
    }
}

fn property_from_json(doc: &JsonSpecification) -> Result<Property<f64>> {
    let reach = doc.reach.clone().unwrap_or_default();
    let avoid = doc.avoid.clone().unwrap_or_default();
    Ok(match (doc.property, doc.infinite_time) {
        (JsonProperty::Reachability, false) => Property::FiniteTimeReachability {
            reach,
            horizon: doc.time_horizon.context("time_horizon required for finite-time property")?,
        },
        (JsonProperty::Reachability, true) => Property::InfiniteTimeReachability {
            reach,
            eps: doc.eps.context("eps required for infinite-time property")?,
        },
        (JsonProperty::ReachAvoid, false) => Property::FiniteTimeReachAvoid {
            reach,
            avoid,
            horizon: doc.time_horizon.context("time_horizon required for finite-time property")?,
        },
        (JsonProperty::ReachAvoid, true) => Property::InfiniteTimeReachAvoid {
            reach,
            avoid,
            eps: doc.eps.context("eps required for infinite-time property")?,
        },
        (JsonProperty::Reward, false) => Property::FiniteTimeReward {
            reward: doc.reward.clone().context("reward array required")?,
            discount: doc.discount.context("discount required")?,
            horizon: doc.time_horizon.context("time_horizon required for finite-time property")?,
        },
        (JsonProperty::Reward, true) => Property::InfiniteTimeReward {
            reward: doc.reward.clone().context("reward array required")?,
            discount: doc.discount.context("discount required")?,
            eps: doc.eps.context("eps required for infinite-time property")?,
        },
    })
}

pub fn load_specification(path: &Path) -> Result<Specification<f64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading specification file {}", path.display()))?;
    let doc: JsonSpecification = serde_json::from_str(&text)
        .with_context(|| format!("parsing specification file {}", path.display()))?;
    let property = property_from_json(&doc)?;
    let satisfaction_mode = parse_satisfaction(&doc.satisfaction_mode)?;
    let strategy_mode = parse_strategy(&doc.strategy_mode)?;
    Ok(Specification::new(property, satisfaction_mode, strategy_mode)?)
}

/// Logical reach/avoid index lists, used by `export-prism` to build a
/// `.lab` [`imdp_io::prism::LabelSet`] without re-parsing the JSON document.
pub fn reach_avoid(spec: &Specification<f64>) -> (Vec<usize>, Vec<usize>) {
    match &spec.property {
        Property::FiniteTimeReachability { reach, .. }
        | Property::InfiniteTimeReachability { reach, .. }
        | Property::ExactTimeReachability { reach, .. } => (reach.clone(), vec![]),
        Property::FiniteTimeReachAvoid { reach, avoid, .. }
        | Property::InfiniteTimeReachAvoid { reach, avoid, .. }
        | Property::ExactTimeReachAvoid { reach, avoid, .. } => (reach.clone(), avoid.clone()),
        Property::FiniteTimeSafety { avoid, .. } | Property::InfiniteTimeSafety { avoid, .. } => {
            (vec![], avoid.clone())
        }
        Property::ExpectedExitTime { avoid, .. } => (vec![], avoid.clone()),
        _ => (vec![], vec![]),
    }
}

