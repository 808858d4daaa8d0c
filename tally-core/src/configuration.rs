//! Per-collection dashboard configuration
//!
//! An ordered list of cards plus the groups clustering them. The flat card
//! order is the only render order for ungrouped cards and is independent of
//! grouping. Invariants:
//!
//! - card and group ids are unique
//! - every group has at least 2 members, all of them existing cards
//! - a card belongs to at most one group, and `CardConfig::group_id` mirrors it
//!
//! Every mutation validates first and leaves the configuration untouched on
//! error.

use crate::{
    default_title, find_column, is_legal_aggregation, reconcile_aggregation, validate_conditions,
    AggregationType, CardConfig, CardId, CardUpdate, Column, ColumnId, FilterOperator, GroupConfig,
    GroupId, NewCard, TallyResult, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum number of cards in a group.
pub const MIN_GROUP_SIZE: usize = 2;

/// Cards and groups of one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Configuration {
    #[serde(default)]
    pub cards: Vec<CardConfig>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.groups.is_empty()
    }

    /// True when a stored card uses an aggregation or filter operator this
    /// version does not recognize. Such values are rewritten as `UNSUPPORTED`
    /// on the next save.
    pub fn has_unsupported_values(&self) -> bool {
        self.cards.iter().any(|card| {
            card.aggregation == AggregationType::Unsupported
                || card
                    .filters
                    .iter()
                    .any(|f| f.operator == FilterOperator::Unsupported)
        })
    }

    pub fn card(&self, card_id: CardId) -> Option<&CardConfig> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn group(&self, group_id: GroupId) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// The group a card belongs to, if any.
    pub fn group_of(&self, card_id: CardId) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.contains(card_id))
    }

    /// Position of a card in the flat order.
    pub fn position(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    /// Cards not in any group, in flat order.
    pub fn ungrouped_cards(&self) -> impl Iterator<Item = &CardConfig> {
        self.cards.iter().filter(|c| self.group_of(c.id).is_none())
    }

    // ========================================================================
    // CARD OPERATIONS
    // ========================================================================

    /// Append a new card to the end of the flat order.
    pub fn add_card(&mut self, new_card: NewCard, columns: &[Column]) -> TallyResult<CardId> {
        let column = require_column(columns, &new_card.column_id)?;
        if !is_legal_aggregation(column.column_type, new_card.aggregation) {
            return Err(ValidationError::IllegalAggregation {
                aggregation: new_card.aggregation,
                column_type: column.column_type,
            }
            .into());
        }
        validate_conditions(&new_card.filters, columns)?;

        let (title, auto_title) = match new_card.title {
            Some(title) => (non_blank("title", title)?, false),
            None => (
                default_title(new_card.aggregation, column, &new_card.filters, columns),
                true,
            ),
        };

        let id = CardId::now_v7();
        self.cards.push(CardConfig {
            id,
            title,
            column_id: new_card.column_id,
            aggregation: new_card.aggregation,
            filters: new_card.filters,
            group_id: None,
            auto_title,
        });
        Ok(id)
    }

    /// Edit a card. Switching to a column whose type does not allow the
    /// current aggregation falls back to that type's default aggregation.
    pub fn update_card(
        &mut self,
        card_id: CardId,
        update: CardUpdate,
        columns: &[Column],
    ) -> TallyResult<()> {
        let index = self
            .position(card_id)
            .ok_or(ValidationError::UnknownCard { card_id })?;
        let current = &self.cards[index];

        // Title-only edits do not need the card's column to still exist
        let structural =
            update.column_id.is_some() || update.aggregation.is_some() || update.filters.is_some();
        if !structural {
            let (title, auto_title) = match update.title {
                Some(title) => (non_blank("title", title)?, false),
                None if update.reset_title => {
                    let column = require_column(columns, &current.column_id)?;
                    let title =
                        default_title(current.aggregation, column, &current.filters, columns);
                    (title, true)
                }
                None => return Ok(()),
            };
            let card = &mut self.cards[index];
            card.title = title;
            card.auto_title = auto_title;
            return Ok(());
        }

        let column_id = update.column_id.unwrap_or_else(|| current.column_id.clone());
        let column = require_column(columns, &column_id)?;
        let aggregation = match update.aggregation {
            Some(aggregation) if !is_legal_aggregation(column.column_type, aggregation) => {
                return Err(ValidationError::IllegalAggregation {
                    aggregation,
                    column_type: column.column_type,
                }
                .into());
            }
            Some(aggregation) => aggregation,
            None => reconcile_aggregation(column.column_type, current.aggregation),
        };
        let filters = update.filters.unwrap_or_else(|| current.filters.clone());
        validate_conditions(&filters, columns)?;

        let (title, auto_title) = match update.title {
            Some(title) => (non_blank("title", title)?, false),
            None if update.reset_title || current.auto_title => {
                (default_title(aggregation, column, &filters, columns), true)
            }
            None => (current.title.clone(), false),
        };

        let card = &mut self.cards[index];
        card.column_id = column_id;
        card.aggregation = aggregation;
        card.filters = filters;
        card.title = title;
        card.auto_title = auto_title;
        Ok(())
    }

    /// Remove a card, dropping it from its group. A group left with fewer
    /// than two members is deleted and its remaining member becomes ungrouped.
    pub fn remove_card(&mut self, card_id: CardId) -> TallyResult<CardConfig> {
        let index = self
            .position(card_id)
            .ok_or(ValidationError::UnknownCard { card_id })?;
        let removed = self.cards.remove(index);

        for group in &mut self.groups {
            group.card_ids.retain(|id| *id != card_id);
        }
        let (kept, dissolved): (Vec<GroupConfig>, Vec<GroupConfig>) = self
            .groups
            .drain(..)
            .partition(|g| g.card_ids.len() >= MIN_GROUP_SIZE);
        self.groups = kept;
        for group in dissolved {
            self.clear_membership(&group);
        }

        Ok(removed)
    }

    /// Move a card to `new_index` in the flat order. Indices past the end
    /// move it to the last position. Group membership is not affected.
    pub fn reorder_card(&mut self, card_id: CardId, new_index: usize) -> TallyResult<()> {
        let index = self
            .position(card_id)
            .ok_or(ValidationError::UnknownCard { card_id })?;
        let card = self.cards.remove(index);
        let target = new_index.min(self.cards.len());
        self.cards.insert(target, card);
        Ok(())
    }

    // ========================================================================
    // GROUP OPERATIONS
    // ========================================================================

    /// Cluster ungrouped cards under a name.
    pub fn create_group(&mut self, name: &str, card_ids: &[CardId]) -> TallyResult<GroupId> {
        let name = non_blank("group name", name.to_string())?;
        if card_ids.len() < MIN_GROUP_SIZE {
            return Err(ValidationError::GroupTooSmall {
                count: card_ids.len(),
            }
            .into());
        }
        let mut seen = HashSet::new();
        for &card_id in card_ids {
            if !seen.insert(card_id) {
                return Err(ValidationError::DuplicateGroupMember { card_id }.into());
            }
            if self.card(card_id).is_none() {
                return Err(ValidationError::UnknownCard { card_id }.into());
            }
            if let Some(existing) = self.group_of(card_id) {
                return Err(ValidationError::AlreadyGrouped {
                    card_id,
                    group_id: existing.id,
                }
                .into());
            }
        }

        let id = GroupId::now_v7();
        for card in self.cards.iter_mut().filter(|c| seen.contains(&c.id)) {
            card.group_id = Some(id);
        }
        self.groups.push(GroupConfig {
            id,
            name,
            card_ids: card_ids.to_vec(),
        });
        Ok(id)
    }

    /// Delete a group. Its cards stay where they are in the flat order.
    pub fn remove_group(&mut self, group_id: GroupId) -> TallyResult<GroupConfig> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or(ValidationError::UnknownGroup { group_id })?;
        let removed = self.groups.remove(index);
        self.clear_membership(&removed);
        Ok(removed)
    }

    pub fn rename_group(&mut self, group_id: GroupId, name: &str) -> TallyResult<()> {
        let name = non_blank("group name", name.to_string())?;
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(ValidationError::UnknownGroup { group_id })?;
        group.name = name;
        Ok(())
    }

    fn clear_membership(&mut self, group: &GroupConfig) {
        for card in &mut self.cards {
            if card.group_id == Some(group.id) {
                card.group_id = None;
            }
        }
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Check every structural invariant. Used on data read back from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut card_ids = HashSet::new();
        for card in &self.cards {
            if !card_ids.insert(card.id) {
                return Err(ValidationError::DuplicateId {
                    id: card.id.to_string(),
                });
            }
        }

        let mut group_ids = HashSet::new();
        let mut grouped = HashSet::new();
        for group in &self.groups {
            if !group_ids.insert(group.id) {
                return Err(ValidationError::DuplicateId {
                    id: group.id.to_string(),
                });
            }
            if group.card_ids.len() < MIN_GROUP_SIZE {
                return Err(ValidationError::GroupTooSmall {
                    count: group.card_ids.len(),
                });
            }
            for &card_id in &group.card_ids {
                if !card_ids.contains(&card_id) {
                    return Err(ValidationError::UnknownCard { card_id });
                }
                if !grouped.insert(card_id) {
                    return Err(ValidationError::AlreadyGrouped {
                        card_id,
                        group_id: group.id,
                    });
                }
            }
        }

        for card in &self.cards {
            if card.group_id != self.group_of(card.id).map(|g| g.id) {
                return Err(ValidationError::InconsistentMembership { card_id: card.id });
            }
        }
        Ok(())
    }
}

fn require_column<'a>(columns: &'a [Column], id: &ColumnId) -> Result<&'a Column, ValidationError> {
    find_column(columns, id).ok_or_else(|| ValidationError::UnknownColumn {
        column_id: id.clone(),
    })
}

fn non_blank(field: &str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName {
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// TESTS
// =============================================================================
