// WHY: Matching over-generates. These passes remove nested duplicates, explicit
// exclusions, idle modifiers and modifiers swallowed by the term they modify.

use std::collections::HashSet;
use tracing::debug;

use super::{Annotation, EdgeKind, MarkupGraph, TagId};

impl MarkupGraph {
    /// Remove annotations fully encompassed by another annotation with the same category set.
    ///
    /// Nodes are visited by span start (then end, then id). Identical spans encompass each
    /// other, so the lower id (the first one marked) survives.
    pub fn prune_overlapping(&mut self) {
        let nodes = self.annotations();
        if nodes.len() < 2 {
            return;
        }

        let mut removed: HashSet<TagId> = HashSet::new();
        for (i, earlier) in nodes.iter().enumerate() {
            if removed.contains(&earlier.id()) {
                continue;
            }
            for later in &nodes[i + 1..] {
                if removed.contains(&later.id()) || !earlier.item().same_categories(later.item()) {
                    continue;
                }
                if earlier.encompasses(later) {
                    removed.insert(later.id());
                } else if later.encompasses(earlier) {
                    removed.insert(earlier.id());
                    break;
                }
            }
        }

        let removed: Vec<TagId> = nodes.iter().map(|a| a.id()).filter(|id| removed.contains(id)).collect();
        debug!("pruning {} overlapping nodes", removed.len());
        self.remove_nodes(&removed);
    }

    /// Remove every annotation whose categories include `category`
    pub fn drop_marks(&mut self, category: &str) {
        let dropped: Vec<TagId> = self
            .annotations()
            .into_iter()
            .filter(|a| a.is_a(category))
            .map(Annotation::id)
            .collect();
        if !dropped.is_empty() {
            debug!(category, "dropping {} marks", dropped.len());
        }
        self.remove_nodes(&dropped);
    }

    /// Remove modifiers with no relationships; all modifiers go if the sentence has no targets
    pub fn drop_inactive_modifiers(&mut self) {
        let no_targets = self.targets().is_empty();
        let inactive: Vec<TagId> = self
            .modifiers()
            .into_iter()
            .filter(|m| no_targets || self.degree(m.id()) == 0)
            .map(Annotation::id)
            .collect();
        if !inactive.is_empty() {
            debug!(no_targets, "dropping {} inactive modifiers", inactive.len());
        }
        self.remove_nodes(&inactive);
    }

    /// Remove modifiers that lie inside a node they are linked to (e.g. "free" within "free air")
    pub fn prune_self_modifying(&mut self) {
        let self_modifying: Vec<TagId> = self
            .modifiers()
            .into_iter()
            .filter(|m| {
                self.predecessors(m.id())
                    .into_iter()
                    .chain(self.successors(m.id()))
                    .any(|other| other.encompasses(m))
            })
            .map(Annotation::id)
            .collect();
        if !self_modifying.is_empty() {
            debug!("removing {} self-modifying nodes", self_modifying.len());
        }
        self.remove_nodes(&self_modifying);
    }

    /// Keep only the closest target for each modifier that modifies several.
    ///
    /// Distance is the gap between spans; ties go to the earlier target.
    pub fn keep_closest_relationship(&mut self) {
        let mut dropped: Vec<(TagId, TagId)> = Vec::new();
        for modifier in self.modifiers() {
            let modified: Vec<&Annotation> = self
                .successors(modifier.id())
                .into_iter()
                .filter(|t| self.edge_kind(modifier.id(), t.id()) == Some(EdgeKind::Modifies))
                .collect();
            if modified.len() < 2 {
                continue;
            }

            let closest = modified
                .iter()
                .min_by_key(|t| (modifier.distance(t), t.sort_key()))
                .map(|t| t.id());
            for target in &modified {
                if Some(target.id()) != closest {
                    dropped.push((modifier.id(), target.id()));
                }
            }
        }

        debug!("dropping {} distant relationships", dropped.len());
        for (modifier, target) in dropped {
            self.remove_edge(modifier, target);
        }
    }
}
