// WHY: Scope propagation. Terminators cut short the scope of modifiers that share
// a category with them; modifiers then link to every target whose start lies in scope.

use tracing::debug;

use super::{EdgeKind, MarkupGraph, Scope, TagId};
use crate::lexicon::Rule;

impl MarkupGraph {
    /// Narrow each modifier's scope at the terminators around it.
    ///
    /// For every ordered pair of distinct modifiers `(a, b)` where `b` terminates and the
    /// two share a category: a forward-looking `a` stops at a later `b`, a backward-looking
    /// `a` stops at an earlier `b`. The terminator that sets each final bound is linked by
    /// an edge `a -> b`; terminators beyond it are not. Scopes only ever shrink.
    pub fn update_scopes(&mut self) {
        self.scope_updated = true;

        let modifiers: Vec<TagId> = self.modifiers().iter().map(|m| m.id()).collect();
        let mut narrowed: Vec<(TagId, Scope)> = Vec::new();
        let mut truncations: Vec<(TagId, TagId)> = Vec::new();

        for &a_id in &modifiers {
            let Some(a) = self.annotation(a_id) else { continue };
            let Some(original) = self.scope(a_id) else { continue };

            let terminators: Vec<_> = modifiers
                .iter()
                .filter(|&&b_id| b_id != a_id)
                .filter_map(|&b_id| self.annotation(b_id))
                .filter(|b| b.rule() == Rule::Terminate && a.item().shares_category(b.item()))
                .collect();

            let mut scope = original;
            for b in &terminators {
                if a.rule().looks_forward() && b.span().start > a.span().end {
                    scope.end = scope.end.min(b.span().start);
                }
                if a.rule().looks_backward() && b.span().end < a.span().start {
                    scope.start = scope.start.max(b.span().end);
                }
            }
            if scope == original {
                continue;
            }

            // Only the terminators that set a final bound are linked
            for b in &terminators {
                let cuts_end = scope.end != original.end && b.span().start > a.span().end && b.span().start == scope.end;
                let cuts_start =
                    scope.start != original.start && b.span().end < a.span().start && b.span().end == scope.start;
                if (cuts_end && a.rule().looks_forward()) || (cuts_start && a.rule().looks_backward()) {
                    truncations.push((a_id, b.id()));
                }
            }

            debug!(id = %a_id, ?original, narrowed = ?scope, "narrowed modifier scope");
            narrowed.push((a_id, scope));
        }

        for (id, scope) in narrowed {
            self.set_scope(id, scope);
        }
        for (a_id, b_id) in truncations {
            self.add_edge(a_id, b_id, EdgeKind::Terminates);
        }
    }

    /// Link each modifier to every target whose start lies within the modifier's scope.
    ///
    /// Runs `update_scopes` first if it has not run yet. All qualifying modifiers are
    /// linked; `keep_closest_relationship` can reduce them afterwards.
    pub fn apply_modifiers(&mut self) {
        if !self.scope_updated {
            self.update_scopes();
        }

        let mut links: Vec<(TagId, TagId)> = Vec::new();
        for target in self.targets() {
            for modifier in self.modifiers() {
                if !modifier.rule().modifies_targets() {
                    continue;
                }
                let Some(scope) = self.scope(modifier.id()) else { continue };
                if scope.contains(target.span().start) {
                    links.push((modifier.id(), target.id()));
                }
            }
        }

        debug!("applying {} modifier relationships", links.len());
        for (modifier, target) in links {
            self.add_edge(modifier, target, EdgeKind::Modifies);
        }
    }
}
