//! Dashboard rendering
//!
//! Turns a configuration plus the live schema and records into the ordered
//! list of entries a UI draws. Cards whose column no longer exists are
//! skipped. A group is emitted once, at the flat position of its first
//! member, with its members in group order.

use crate::{
    compute, find_column, AggregateValue, CardConfig, CardId, Column, Configuration, GroupId,
    Record,
};
use serde::Serialize;
use std::collections::HashSet;

/// One rendered card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub card_id: CardId,
    pub title: String,
    pub aggregation_label: &'static str,
    pub column_name: String,
    pub value: AggregateValue,
    /// Summaries of the filters whose column still exists
    pub filter_summary: Vec<String>,
    pub has_filters: bool,
}

/// One rendered group with its renderable members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub group_id: GroupId,
    pub name: String,
    pub members: Vec<CardView>,
}

/// A top-level dashboard entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardEntry {
    Card(CardView),
    Group(GroupView),
}

/// Render one card, or `None` if its column is gone.
pub fn render_card(card: &CardConfig, columns: &[Column], records: &[Record]) -> Option<CardView> {
    let column = find_column(columns, &card.column_id)?;
    Some(CardView {
        card_id: card.id,
        title: card.title.clone(),
        aggregation_label: card.aggregation.label(),
        column_name: column.name.clone(),
        value: compute(records, column, card.aggregation, &card.filters, columns),
        filter_summary: card
            .filters
            .iter()
            .filter_map(|f| f.describe(columns))
            .collect(),
        has_filters: card.has_filters(),
    })
}

/// Render the whole dashboard in display order.
pub fn render(
    configuration: &Configuration,
    columns: &[Column],
    records: &[Record],
) -> Vec<DashboardEntry> {
    let mut entries = Vec::new();
    let mut emitted: HashSet<GroupId> = HashSet::new();

    for card in &configuration.cards {
        match configuration.group_of(card.id) {
            Some(group) => {
                if !emitted.insert(group.id) {
                    continue;
                }
                let members: Vec<CardView> = group
                    .card_ids
                    .iter()
                    .filter_map(|id| configuration.card(*id))
                    .filter_map(|member| render_card(member, columns, records))
                    .collect();
                if !members.is_empty() {
                    entries.push(DashboardEntry::Group(GroupView {
                        group_id: group.id,
                        name: group.name.clone(),
                        members,
                    }));
                }
            }
            None => {
                if let Some(view) = render_card(card, columns, records) {
                    entries.push(DashboardEntry::Card(view));
                }
            }
        }
    }
    entries
}
