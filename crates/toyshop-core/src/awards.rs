//! Diversity and majority awards.
//!
//! Diversity is checked after each placement: a player who has every item of
//! a category on their board gets the award, unless someone already took it
//! for that category. Majority is settled once at game end by comparing each
//! player's largest single-item holding per category.

use crate::player::{Award, AwardKind, Player, PlayerId};
use crate::rules::RuleSet;
use crate::tile::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which categories have had their diversity award claimed, across all
/// players of one game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiversityFlags {
    taken: Vec<bool>,
}

impl DiversityFlags {
    pub fn new(category_count: usize) -> Self {
        Self {
            taken: vec![false; category_count],
        }
    }

    pub fn is_taken(&self, category: Category) -> bool {
        self.taken.get(category.index()).copied().unwrap_or(false)
    }

    pub fn mark(&mut self, category: Category) {
        if let Some(flag) = self.taken.get_mut(category.index()) {
            *flag = true;
        }
    }

    /// Number of categories the flags cover
    pub fn category_count(&self) -> usize {
        self.taken.len()
    }

    pub fn taken_count(&self) -> usize {
        self.taken.iter().filter(|&&t| t).count()
    }
}

/// Whether the player's board shows every distinct item of `category`
pub fn has_diversity(player: &Player, category: Category, rules: &RuleSet) -> bool {
    let target = rules.diversity_target(category);
    target > 0 && player.items_collected(category).len() >= target
}

/// Whether a diversity award for `category` would go to `player` right now
pub fn evaluate_diversity(
    player: &Player,
    category: Category,
    rules: &RuleSet,
    flags: &DiversityFlags,
) -> bool {
    !flags.is_taken(category)
        && !player.has_award(AwardKind::Diversity, category)
        && has_diversity(player, category, rules)
}

/// Diversity awards `player` earns now, in category order
pub fn diversity_awards(player: &Player, rules: &RuleSet, flags: &DiversityFlags) -> Vec<Award> {
    rules
        .categories()
        .filter(|&category| evaluate_diversity(player, category, rules, flags))
        .map(|category| Award {
            kind: AwardKind::Diversity,
            category,
            value: rules.diversity_award_value,
        })
        .collect()
}

/// Majority awards for every player. Players tied at the top all receive
/// the award; a category nobody holds awards nothing.
pub fn evaluate_majority(players: &[Player], rules: &RuleSet) -> BTreeMap<PlayerId, Vec<Award>> {
    let mut result: BTreeMap<PlayerId, Vec<Award>> =
        players.iter().map(|p| (p.id, Vec::new())).collect();

    for category in rules.categories() {
        let best: Vec<(PlayerId, u32)> = players
            .iter()
            .map(|p| {
                let top = p.item_cells(category).into_values().max().unwrap_or(0);
                (p.id, top)
            })
            .collect();
        let max = best.iter().map(|&(_, count)| count).max().unwrap_or(0);
        if max == 0 {
            continue;
        }

        for (id, _) in best.into_iter().filter(|&(_, count)| count == max) {
            result.entry(id).or_default().push(Award {
                kind: AwardKind::Majority,
                category,
                value: rules.majority_award_value,
            });
        }
    }

    result
}
