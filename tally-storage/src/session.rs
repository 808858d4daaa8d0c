//! Dashboard session: one collection's configuration bound to a store.
//!
//! The session owns the in-memory configuration. Every mutation runs against
//! a copy, the copy is saved, and only then does it replace the live state,
//! so a rejected edit or a failed save leaves the session unchanged.

use tally_core::{
    render, CardConfig, CardId, CardUpdate, CollectionId, Column, Configuration, DashboardEntry,
    GroupConfig, GroupId, NewCard, Record, TallyResult,
};

use crate::ConfigurationStore;

pub struct DashboardSession<S: ConfigurationStore> {
    store: S,
    collection: CollectionId,
    configuration: Configuration,
    collapsed: bool,
}

impl<S: ConfigurationStore> DashboardSession<S> {
    /// Load the saved state for `collection`. Missing, unreadable or
    /// inconsistent data yields an empty configuration.
    pub fn open(store: S, collection: impl Into<CollectionId>) -> Self {
        let collection = collection.into();

        let configuration = match store.load(&collection) {
            Ok(Some(configuration)) => match configuration.validate() {
                Ok(()) => configuration,
                Err(e) => {
                    tracing::warn!(
                        collection = %collection,
                        error = %e,
                        "discarding inconsistent configuration"
                    );
                    Configuration::default()
                }
            },
            Ok(None) => Configuration::default(),
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "discarding unreadable configuration"
                );
                Configuration::default()
            }
        };

        let collapsed = match store.load_collapsed(&collection) {
            Ok(flag) => flag.unwrap_or(false),
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "discarding unreadable collapse flag"
                );
                false
            }
        };

        if configuration.has_unsupported_values() {
            tracing::warn!(
                collection = %collection,
                "configuration uses unknown aggregations or operators; they will be saved as UNSUPPORTED"
            );
        }

        tracing::debug!(
            collection = %collection,
            cards = configuration.cards.len(),
            groups = configuration.groups.len(),
            "loaded dashboard configuration"
        );

        Self {
            store,
            collection,
            configuration,
            collapsed,
        }
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Apply `op` to a copy, persist it, then commit.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut Configuration) -> TallyResult<T>,
    ) -> TallyResult<T> {
        let mut next = self.configuration.clone();
        let output = op(&mut next)?;
        self.store.save(&self.collection, &next)?;
        tracing::debug!(
            collection = %self.collection,
            cards = next.cards.len(),
            groups = next.groups.len(),
            "saved dashboard configuration"
        );
        self.configuration = next;
        Ok(output)
    }

    // ========================================================================
    // CARDS
    // ========================================================================

    pub fn add_card(&mut self, new_card: NewCard, columns: &[Column]) -> TallyResult<CardId> {
        self.mutate(|c| c.add_card(new_card, columns))
    }

    pub fn update_card(
        &mut self,
        card_id: CardId,
        update: CardUpdate,
        columns: &[Column],
    ) -> TallyResult<()> {
        self.mutate(|c| c.update_card(card_id, update, columns))
    }

    pub fn remove_card(&mut self, card_id: CardId) -> TallyResult<CardConfig> {
        self.mutate(|c| c.remove_card(card_id))
    }

    pub fn reorder_card(&mut self, card_id: CardId, new_index: usize) -> TallyResult<()> {
        self.mutate(|c| c.reorder_card(card_id, new_index))
    }

    // ========================================================================
    // GROUPS
    // ========================================================================

    pub fn create_group(&mut self, name: &str, card_ids: &[CardId]) -> TallyResult<GroupId> {
        self.mutate(|c| c.create_group(name, card_ids))
    }

    pub fn remove_group(&mut self, group_id: GroupId) -> TallyResult<GroupConfig> {
        self.mutate(|c| c.remove_group(group_id))
    }

    pub fn rename_group(&mut self, group_id: GroupId, name: &str) -> TallyResult<()> {
        self.mutate(|c| c.rename_group(group_id, name))
    }

    // ========================================================================
    // COLLAPSE FLAG AND RESET
    // ========================================================================

    pub fn set_collapsed(&mut self, collapsed: bool) -> TallyResult<()> {
        self.store.save_collapsed(&self.collection, collapsed)?;
        self.collapsed = collapsed;
        Ok(())
    }

    /// Flip the collapse flag and return the new value.
    pub fn toggle_collapsed(&mut self) -> TallyResult<bool> {
        let next = !self.collapsed;
        self.set_collapsed(next)?;
        Ok(next)
    }

    /// Drop all saved state for the collection.
    pub fn clear(&mut self) -> TallyResult<()> {
        self.store.clear(&self.collection)?;
        tracing::debug!(collection = %self.collection, "cleared dashboard configuration");
        self.configuration = Configuration::default();
        self.collapsed = false;
        Ok(())
    }

    /// Render the dashboard against the current schema and records.
    pub fn render(&self, columns: &[Column], records: &[Record]) -> Vec<DashboardEntry> {
        render(&self.configuration, columns, records)
    }
}
