//! The causal structure: a directed bipartite multigraph over producers and
//! consumers.

use rustc_hash::{FxHashMap, FxHashSet};

use super::pct::{Consumer, PcLink, Producer};

/// Producer/consumer graph with a total-order/partial-order mode flag.
///
/// The mode changes which producers are eligible for a consumer (strictly
/// earlier positions only in total-order mode; any other position in
/// partial-order mode) and which steps count as threats. The relaxation
/// engine mutates a single working structure in place; the reference
/// "actual" and "minimal" structures are never mutated after construction.
#[derive(Debug, Clone)]
pub struct CausalStructure {
    total_order: bool,
    producers_of: FxHashMap<Consumer, FxHashSet<Producer>>,
    consumers_of: FxHashMap<Producer, FxHashSet<Consumer>>,
    links: FxHashSet<PcLink>,
}

impl CausalStructure {
    pub fn new(total_order: bool) -> Self {
        Self {
            total_order,
            producers_of: FxHashMap::default(),
            consumers_of: FxHashMap::default(),
            links: FxHashSet::default(),
        }
    }

    pub fn is_total_order(&self) -> bool {
        self.total_order
    }

    pub fn add(&mut self, link: PcLink) {
        self.producers_of
            .entry(link.consumer.clone())
            .or_default()
            .insert(link.producer.clone());
        self.consumers_of
            .entry(link.producer.clone())
            .or_default()
            .insert(link.consumer.clone());
        self.links.insert(link);
    }

    pub fn remove(&mut self, link: &PcLink) {
        if let Some(prods) = self.producers_of.get_mut(&link.consumer) {
            prods.remove(&link.producer);
        }
        if let Some(conss) = self.consumers_of.get_mut(&link.producer) {
            conss.remove(&link.consumer);
        }
        self.links.remove(link);
    }

    pub fn contains(&self, link: &PcLink) -> bool {
        self.links.contains(link)
    }

    pub fn producers_of(&self, consumer: &Consumer) -> impl Iterator<Item = &Producer> {
        self.producers_of.get(consumer).into_iter().flatten()
    }

    pub fn producer_count(&self, consumer: &Consumer) -> usize {
        self.producers_of.get(consumer).map_or(0, FxHashSet::len)
    }

    pub fn consumers_of(&self, producer: &Producer) -> impl Iterator<Item = &Consumer> {
        self.consumers_of.get(producer).into_iter().flatten()
    }

    pub fn consumer_count(&self, producer: &Producer) -> usize {
        self.consumers_of.get(producer).map_or(0, FxHashSet::len)
    }

    /// Consumers with at least one incoming link.
    pub fn consumers(&self) -> impl Iterator<Item = &Consumer> {
        self.producers_of
            .iter()
            .filter(|(_, prods)| !prods.is_empty())
            .map(|(cons, _)| cons)
    }

    /// Producers with at least one outgoing link.
    pub fn producers(&self) -> impl Iterator<Item = &Producer> {
        self.consumers_of
            .iter()
            .filter(|(_, conss)| !conss.is_empty())
            .map(|(prod, _)| prod)
    }

    pub fn links(&self) -> impl Iterator<Item = &PcLink> {
        self.links.iter()
    }

    pub fn link_set(&self) -> &FxHashSet<PcLink> {
        &self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

impl std::fmt::Display for CausalStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut consumers: Vec<&Consumer> = self.consumers().collect();
        consumers.sort_by(|a, b| a.step.cmp(&b.step));
        for cons in consumers {
            let mut prods: Vec<String> =
                self.producers_of(cons).map(ToString::to_string).collect();
            prods.sort();
            writeln!(f, "{cons} = {{ {} }}", prods.join(", "))?;
        }
        Ok(())
    }
}
