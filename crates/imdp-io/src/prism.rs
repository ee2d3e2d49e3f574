//! PRISM explicit-model writer (§6.3): four plain-text files sharing a path
//! prefix (`.sta`, `.tra`, `.lab`, `.pctl`), plus `.srew` for reward
//! properties. Scoped to the non-factored IMDP/IMC case — the format has no
//! native notion of a factored/orthogonal product, so a factored system is
//! rejected with a `DimensionMismatch` rather than silently flattened.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use imdp_core::{FactoredMdp, ImdpError, ImdpResult, Property, Scalar, Specification};

/// A `.sta` line: `state_id:(state_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaRecord {
    pub state_id: usize,
}

/// A `.tra` line: `src act_idx dest [lower,upper] action_label`.
#[derive(Debug, Clone, PartialEq)]
pub struct TraRecord {
    pub src: usize,
    pub act_idx: usize,
    pub dest: usize,
    pub lower: f64,
    pub upper: f64,
    pub action_label: String,
}

/// One `.lab` entry: a state id and the label ids that apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabRecord {
    pub state_id: usize,
    pub label_ids: Vec<usize>,
}

/// A `.srew` line: `state_id reward`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrewRecord {
    pub state_id: usize,
    pub reward: f64,
}

/// PRISM requires constant (non-zero) support on written intervals; a lower
/// bound of exactly zero is clamped to this floor on write.
pub const EPS_LB: f64 = 1e-12;

/// Which states get the given label ids, beyond the always-present
/// `0="init"` / `1="deadlock"` pair the `.lab` header always carries.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    /// Label names in id order, starting at id 2 (0 and 1 are reserved).
    pub names: Vec<String>,
    /// `label_assignment[state_id]` lists the (2-based) label ids that hold.
    pub assignment: Vec<Vec<usize>>,
}

fn sta_lines(num_states: usize) -> Vec<StaRecord> {
    (0..num_states).map(|state_id| StaRecord { state_id }).collect()
}

fn tra_records<R: Scalar>(system: &FactoredMdp<R>) -> ImdpResult<Vec<TraRecord>> {
    if !system.is_non_factored() {
        return Err(ImdpError::DimensionMismatch {
            context: "PRISM explicit export requires a non-factored (N=M=1) system".to_string(),
            expected: vec![1],
            actual: vec![system.num_axes()],
        });
    }
    let marginal = &system.marginals()[0];
    let num_states = system.state_vars()[0];
    let num_actions = system.action_vars()[0];
    let mut records = Vec::new();
    for src in 0..num_states {
        for act_idx in 0..num_actions {
            let col = marginal.column_index(&[src], &[act_idx])?;
            for (dest, lower, upper) in marginal.ambiguity().column_iter(col) {
                let lower = if lower <= R::zero() { EPS_LB } else { lower.to_f64() };
                records.push(TraRecord {
                    src,
                    act_idx,
                    dest,
                    lower,
                    upper: upper.to_f64(),
                    action_label: format!("a{act_idx}"),
                });
            }
        }
    }
    Ok(records)
}

/// Writes `<prefix>.sta`.
pub fn write_sta(prefix: &Path, num_states: usize) -> ImdpResult<()> {
    let mut f = BufWriter::new(File::create(prefix.with_extension("sta"))?);
    writeln!(f, "(s)")?;
    for StaRecord { state_id } in sta_lines(num_states) {
        writeln!(f, "{state_id}:({state_id})")?;
    }
    Ok(())
}

/// Writes `<prefix>.tra` for a non-factored system.
pub fn write_tra<R: Scalar>(prefix: &Path, system: &FactoredMdp<R>) -> ImdpResult<()> {
    let records = tra_records(system)?;
    let num_states = system.total_states();
    let num_actions = system.action_vars()[0];
    let num_choices = if num_actions <= 1 {
        num_states
    } else {
        num_states * num_actions
    };
    let mut f = BufWriter::new(File::create(prefix.with_extension("tra"))?);
    writeln!(f, "{num_states} {num_choices} {}", records.len())?;
    for r in &records {
        writeln!(
            f,
            "{} {} {} [{},{}] {}",
            r.src, r.act_idx, r.dest, r.lower, r.upper, r.action_label
        )?;
    }
    Ok(())
}

/// Writes `<prefix>.lab`, always including `0="init"` and `1="deadlock"`.
pub fn write_lab(prefix: &Path, initial: &[usize], labels: &LabelSet) -> ImdpResult<()> {
    let mut f = BufWriter::new(File::create(prefix.with_extension("lab"))?);
    let mut header = vec!["0=\"init\"".to_string(), "1=\"deadlock\"".to_string()];
    for (i, name) in labels.names.iter().enumerate() {
        header.push(format!("{}=\"{name}\"", i + 2));
    }
    writeln!(f, "{}", header.join(" "))?;
    for (state_id, assigned) in labels.assignment.iter().enumerate() {
        let mut ids: Vec<usize> = assigned.clone();
        if initial.contains(&state_id) {
            ids.insert(0, 0);
        }
        if !ids.is_empty() {
            let ids_str: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
            writeln!(f, "{state_id}: {}", ids_str.join(" "))?;
        }
    }
    Ok(())
}

/// Builds the single PCTL line encoding a specification's strategy and
/// satisfaction modes (§6.3): `P{max,min}{max,min}=? [ <pathprop> ]` for
/// probabilistic properties, `R{max,min}{max,min}=? [ C<=H ]` for reward.
pub fn pctl_line<R: Scalar>(spec: &Specification<R>) -> String {
    let strategy = if spec.maximize() { "max" } else { "min" };
    let satisfaction = if spec.upper_bound() { "max" } else { "min" };
    match &spec.property {
        Property::FiniteTimeReachability { horizon, .. } => {
            format!("P{strategy}{satisfaction}=? [ F<={horizon} \"reach\" ]")
        }
        Property::InfiniteTimeReachability { .. } | Property::ExactTimeReachability { .. } => {
            format!("P{strategy}{satisfaction}=? [ F \"reach\" ]")
        }
        Property::FiniteTimeReachAvoid { horizon, .. } | Property::ExactTimeReachAvoid { horizon, .. } => {
            format!("P{strategy}{satisfaction}=? [ !\"avoid\" U<={horizon} \"reach\" ]")
        }
        Property::InfiniteTimeReachAvoid { .. } => {
            format!("P{strategy}{satisfaction}=? [ !\"avoid\" U \"reach\" ]")
        }
        Property::FiniteTimeSafety { horizon, .. } => {
            format!("P{strategy}{satisfaction}=? [ G<={horizon} !\"avoid\" ]")
        }
        Property::InfiniteTimeSafety { .. } => {
            format!("P{strategy}{satisfaction}=? [ G !\"avoid\" ]")
        }
        Property::FiniteTimeReward { horizon, .. } => {
            format!("R{strategy}{satisfaction}=? [ C<={horizon} ]")
        }
        Property::InfiniteTimeReward { .. } => format!("R{strategy}{satisfaction}=? [ C ]"),
        Property::ExpectedExitTime { .. } => format!("R{strategy}{satisfaction}=? [ F \"avoid\" ]"),
        Property::FiniteTimeDfaReachability { horizon, .. } => {
            format!("P{strategy}{satisfaction}=? [ F<={horizon} \"accept\" ]")
        }
        Property::InfiniteTimeDfaReachability { .. } => {
            format!("P{strategy}{satisfaction}=? [ F \"accept\" ]")
        }
        Property::FiniteTimeDfaSafety { horizon, .. } => {
            format!("P{strategy}{satisfaction}=? [ G<={horizon} !\"reject\" ]")
        }
        Property::InfiniteTimeDfaSafety { .. } => {
            format!("P{strategy}{satisfaction}=? [ G !\"reject\" ]")
        }
    }
}

/// Writes `<prefix>.pctl`.
pub fn write_pctl<R: Scalar>(prefix: &Path, spec: &Specification<R>) -> ImdpResult<()> {
    let mut f = BufWriter::new(File::create(prefix.with_extension("pctl"))?);
    writeln!(f, "{}", pctl_line(spec))?;
    Ok(())
}

/// Writes `<prefix>.srew` from a flat reward array matching the state shape.
pub fn write_srew<R: Scalar>(prefix: &Path, reward: &[R]) -> ImdpResult<()> {
    let nonzero: Vec<SrewRecord> = reward
        .iter()
        .enumerate()
        .filter(|(_, &r)| r != R::zero())
        .map(|(state_id, &r)| SrewRecord {
            state_id,
            reward: r.to_f64(),
        })
        .collect();
    let mut f = BufWriter::new(File::create(prefix.with_extension("srew"))?);
    writeln!(f, "{} {}", reward.len(), nonzero.len())?;
    for r in &nonzero {
        writeln!(f, "{} {}", r.state_id, r.reward)?;
    }
    Ok(())
}

/// Writes the full explicit-model bundle (`.sta`/`.tra`/`.lab`/`.pctl`, and
/// `.srew` when the property carries a reward array) for a non-factored
/// system and specification sharing `prefix`.
pub fn write_explicit<R: Scalar>(
    prefix: &Path,
    system: &FactoredMdp<R>,
    spec: &Specification<R>,
    labels: &LabelSet,
) -> ImdpResult<()> {
    let num_states = system.total_states();
    let initial = match system.initial_states() {
        imdp_core::InitialStates::All => (0..num_states).collect::<Vec<_>>(),
        imdp_core::InitialStates::Some(tuples) => tuples.iter().map(|t| t[0]).collect(),
    };
    write_sta(prefix, num_states)?;
    write_tra(prefix, system)?;
    write_lab(prefix, &initial, labels)?;
    write_pctl(prefix, spec)?;
    match &spec.property {
        Property::FiniteTimeReward { reward, .. } | Property::InfiniteTimeReward { reward, .. } => {
            write_srew(prefix, reward)?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdp_core::{
        AmbiguitySet, DenseAmbiguitySet, InitialStates, Marginal, SatisfactionMode, StrategyMode,
    };
    use std::fs;

    fn three_state_system() -> FactoredMdp<f64> {
        // Matches §8 scenario 1's 3-state example: 2 actions in states 0/1, a
        // single sink action in state 2 (the reach state).
        let n_target = 3;
        let n_source = 6; // 3 states * 2 actions
        let mut lower = vec![0.0; n_target * n_source];
        let mut gap = vec![0.0; n_target * n_source];
        // state 0, action 0: stay with 0.5, go to reach with [0, 0.7]
        lower[0 * n_target + 0] = 0.5;
        gap[0 * n_target + 2] = 0.7;
        // state 0, action 1: go to state 1 deterministically
        lower[1 * n_target + 1] = 1.0;
        // state 1, action 0: go to state 0
        lower[2 * n_target + 0] = 1.0;
        // state 1, action 1: go to reach with interval [0.6, 1.0]
        lower[3 * n_target + 2] = 0.6;
        gap[3 * n_target + 2] = 0.4;
        // state 2, action 0 and 1: self-loop (reach is absorbing)
        lower[4 * n_target + 2] = 1.0;
        lower[5 * n_target + 2] = 1.0;
        let set =
            AmbiguitySet::Dense(DenseAmbiguitySet::from_lower_gap(n_target, n_source, lower, gap).unwrap());
        let marginal = Marginal::new(set, vec![0], vec![0], vec![3], vec![2]).unwrap();
        FactoredMdp::non_factored(3, 2, marginal, InitialStates::All).unwrap()
    }

    #[test]
    fn writes_all_four_files_and_they_round_trip_shape() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("model");
        let system = three_state_system();
        let spec = Specification::new(
            Property::FiniteTimeReachability {
                reach: vec![2],
                horizon: 10,
            },
            SatisfactionMode::Pessimistic,
            StrategyMode::Maximize,
        )
        .unwrap();
        let mut labels = LabelSet::default();
        labels.names.push("reach".to_string());
        labels.assignment = vec![vec![], vec![], vec![2]];

        write_explicit(&prefix, &system, &spec, &labels).unwrap();

        let sta = fs::read_to_string(prefix.with_extension("sta")).unwrap();
        assert_eq!(sta.lines().count(), 4); // header + 3 states
        assert!(sta.starts_with("(s)"));

        let tra = fs::read_to_string(prefix.with_extension("tra")).unwrap();
        let header = tra.lines().next().unwrap();
        assert_eq!(header, "3 6 6");

        let lab = fs::read_to_string(prefix.with_extension("lab")).unwrap();
        assert!(lab.lines().next().unwrap().contains("\"reach\""));
        assert!(lab.lines().any(|l| l.starts_with("2: ") && l.contains('2')));

        let pctl = fs::read_to_string(prefix.with_extension("pctl")).unwrap();
        assert_eq!(pctl.trim(), "Pmaxmin=? [ F<=10 \"reach\" ]");
    }

    #[test]
    fn zero_lower_bound_transitions_are_clamped_to_eps_lb() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("model");
        let system = three_state_system();
        write_tra(&prefix, &system).unwrap();
        let tra = fs::read_to_string(prefix.with_extension("tra")).unwrap();
        // state 0 action 0's transition to the reach state has lower bound 0.
        let line = tra.lines().find(|l| l.starts_with("0 0 2")).unwrap();
        assert!(line.contains(&format!("[{EPS_LB},")));
    }

    #[test]
    fn factored_system_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("model");
        let n_target = 2;
        let lower = vec![1.0, 0.0, 0.0, 1.0];
        let gap = vec![0.0, 0.0, 0.0, 0.0];
        let set =
            AmbiguitySet::Dense(DenseAmbiguitySet::from_lower_gap(n_target, 2, lower, gap).unwrap());
        let marginal = Marginal::new(set, vec![0], vec![], vec![2], vec![]).unwrap();
        let marginal2 = marginal.clone();
        let system = FactoredMdp::new(
            vec![2, 2],
            vec![1, 1],
            vec![2, 2],
            vec![marginal, marginal2],
            InitialStates::All,
        )
        .unwrap();
        let err = write_tra(&prefix, &system).unwrap_err();
        assert!(matches!(err, ImdpError::DimensionMismatch { .. }));
    }
}
