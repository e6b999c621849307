//! Threat detection over a causal structure.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::plan::Plan;

use super::pct::{PcLink, Threat};
use super::structure::CausalStructure;

/// Threats aggregated per link and per threatening (step, literal), so both
/// query directions are cheap: the threats to a given link, and the links
/// threatened by a given step effect.
#[derive(Debug, Default, Clone)]
pub struct ThreatSet {
    to_link: FxHashMap<PcLink, FxHashSet<Threat>>,
    by_threat: FxHashMap<Threat, FxHashSet<PcLink>>,
}

impl ThreatSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, link: PcLink, threat: Threat) {
        self.to_link
            .entry(link.clone())
            .or_default()
            .insert(threat.clone());
        self.by_threat.entry(threat).or_default().insert(link);
    }

    pub fn threats_to(&self, link: &PcLink) -> impl Iterator<Item = &Threat> {
        self.to_link.get(link).into_iter().flatten()
    }

    pub fn threat_count(&self, link: &PcLink) -> usize {
        self.to_link.get(link).map_or(0, FxHashSet::len)
    }

    pub fn threatened_by(&self, threat: &Threat) -> impl Iterator<Item = &PcLink> {
        self.by_threat.get(threat).into_iter().flatten()
    }

    pub fn threatened_count(&self, threat: &Threat) -> usize {
        self.by_threat.get(threat).map_or(0, FxHashSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.to_link.is_empty()
    }
}

/// Finds every threat to every link of `structure`.
///
/// A step effect threatens a link when its sign is opposite to the link's
/// produced literal over the same predicate. The link's own producer is
/// exempt when the threatening effect is declared *before* the producing
/// effect in the same step (the producing effect is the step's final word
/// on that literal). In total-order mode the threat's position must lie in
/// `[producer, consumer)`; in partial-order mode any step other than the
/// consumer threatens, ordering being exactly what the CSP gets to decide.
pub fn detect_threats(plan: &Plan, structure: &CausalStructure) -> ThreatSet {
    let mut pos_links: FxHashMap<&str, Vec<&PcLink>> = FxHashMap::default();
    let mut neg_links: FxHashMap<&str, Vec<&PcLink>> = FxHashMap::default();

    for link in structure.links() {
        let lit = &link.producer.literal;
        let map = if lit.positive { &mut pos_links } else { &mut neg_links };
        map.entry(lit.atom.pred.name.as_str()).or_default().push(link);
    }

    let mut threats = ThreatSet::new();

    for (i, threat_step) in plan.steps().iter().enumerate() {
        for (j, effect) in threat_step.post.iter().enumerate() {
            let candidates = if effect.positive {
                neg_links.get(effect.atom.pred.name.as_str())
            } else {
                pos_links.get(effect.atom.pred.name.as_str())
            };
            let Some(candidates) = candidates else { continue };

            // initial-state effects are never undone
            if i != 0 && threat_step.undone(j) {
                continue;
            }

            for link in candidates {
                // self-undo exception: the producing effect is declared
                // after this one in the same step
                if link.producer.step == i {
                    let prod_idx = plan.step(i).effect_index(&link.producer.literal);
                    if prod_idx.is_some_and(|p| p > j) {
                        continue;
                    }
                }

                let threatened = if structure.is_total_order() {
                    i >= link.producer.step && i < link.consumer.step
                } else {
                    i != link.consumer.step
                };

                if threatened {
                    threats.add((*link).clone(), Threat::new(i, effect.negated()));
                }
            }
        }
    }

    threats
}
