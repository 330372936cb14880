//! Module: db::context
//! Responsibility: batched overlay reads applied across an object graph,
//! and sync of in-memory values back into the overlay store.
//! Does not own: relation traversal (walker) or store persistence.


use crate::{
    config::{ConfigError, OverlayConfig},
    db::{
        address::{Address, OverlayFilter, OverlayRecord},
        overlay::{OverlayAccessor, OverlayStore},
        registry::Registry,
        walker::{Collected, GraphWalker, RelationTree},
    },
    error::InternalError,
    language::Language,
    obs::sink::{self, MetricsEvent},
    traits::Translatable,
};
use std::collections::{BTreeMap, HashMap};

///
/// ApplyStats
///
/// What one apply pass touched.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ApplyStats {
    /// Distinct `(type, id)` instances reached.
    pub instances: usize,
    /// Overlay records available to the pass.
    pub records: usize,
    /// Field writes performed; a shared instance counts once.
    pub fields: usize,
}

///
/// TranslationContext
///
/// One apply/sync/read invocation. Holds no state across calls.
///

pub struct TranslationContext<'a> {
    registry: &'a Registry,
    overlay: OverlayAccessor<'a>,
    config: &'a OverlayConfig,
    debug: bool,
}

impl<'a> TranslationContext<'a> {
    #[must_use]
    pub fn new(
        registry: &'a Registry,
        store: &'a dyn OverlayStore,
        config: &'a OverlayConfig,
        debug: bool,
    ) -> Self {
        Self {
            registry,
            overlay: OverlayAccessor::new(store, debug),
            config,
            debug,
        }
    }

    // ------------------------------------------------------------------
    // Apply
    // ------------------------------------------------------------------

    /// Overlay `language` onto `roots` and everything reachable through
    /// `relations`, with exactly one store read.
    ///
    /// Fields without a matching record keep their current value.
    pub fn apply(
        &self,
        roots: &mut [&mut dyn Translatable],
        relations: &[&str],
        language: &Language,
    ) -> Result<ApplyStats, InternalError> {
        let (tree, collected) = self.prepare(roots, relations, language)?;
        let filter = self.filter(collected, language);
        let instances = filter.entities.len();
        let records = self.overlay.fetch(&filter)?;

        self.write(roots, &tree, instances, records)
    }

    /// Apply a caller-supplied record set instead of reading the store.
    /// Records for other languages are ignored.
    pub fn apply_records(
        &self,
        roots: &mut [&mut dyn Translatable],
        relations: &[&str],
        records: &[OverlayRecord],
        language: &Language,
    ) -> Result<ApplyStats, InternalError> {
        let (tree, collected) = self.prepare(roots, relations, language)?;
        let instances = collected.entities().len();
        let records = records
            .iter()
            .filter(|record| &record.address.language == language)
            .cloned()
            .collect();

        self.write(roots, &tree, instances, records)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// The records `apply` would use, without mutating anything.
    pub fn translations(
        &self,
        roots: &[&dyn Translatable],
        relations: &[&str],
        language: &Language,
    ) -> Result<Vec<OverlayRecord>, InternalError> {
        self.check_language(language)?;
        let tree = self.relation_tree(roots, relations)?;
        let collected = GraphWalker::new(self.registry).collect(roots, &tree)?;

        self.overlay.fetch(&self.filter(collected, language))
    }

    // ------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------

    /// Store the in-memory value of every translatable field of `entity`
    /// as its `language` translation. Returns the number of records written.
    ///
    /// `None` fields are skipped. Empty strings are written unless the
    /// config turns `sync_empty` off. Nothing is written if any address
    /// fails validation.
    pub fn sync(
        &self,
        entity: &dyn Translatable,
        language: &Language,
    ) -> Result<usize, InternalError> {
        self.check_language(language)?;

        let entry = self.registry.get(entity.type_tag())?;
        let identity = entity.identity();
        let mut records = Vec::with_capacity(entry.translatable_fields().len());

        for &field in entry.translatable_fields() {
            let Some(text) = entity.text(field) else {
                continue;
            };
            if text.is_empty() && !self.config.sync_empty() {
                continue;
            }

            records.push(OverlayRecord::new(
                Address::new(entity.type_tag(), identity.clone(), field, language.clone()),
                text.to_string(),
            ));
        }

        for record in &records {
            self.check_address(&record.address)?;
        }

        let written = records.len();
        self.overlay.write(records)?;

        sink::record(MetricsEvent::Sync {
            entity_type: entity.type_tag(),
            fields: written as u64,
        });
        if self.debug {
            tracing::debug!(
                entity_type = entity.type_tag(),
                entity_id = %identity,
                %language,
                fields = written,
                "sync"
            );
        }

        Ok(written)
    }

    /// Remove every overlay record owned by `entity`.
    pub fn purge(&self, entity: &dyn Translatable) -> Result<usize, InternalError> {
        self.registry.get(entity.type_tag())?;

        self.overlay.purge(entity.type_tag(), &entity.identity())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    // Validate everything that can fail without the store, then walk.
    fn prepare(
        &self,
        roots: &[&mut dyn Translatable],
        relations: &[&str],
        language: &Language,
    ) -> Result<(RelationTree, Collected), InternalError> {
        self.check_language(language)?;

        let shared: Vec<&dyn Translatable> = roots.iter().map(|root| &**root).collect();
        let tree = self.relation_tree(&shared, relations)?;
        let collected = GraphWalker::new(self.registry).collect(&shared, &tree)?;

        if self.debug {
            tracing::debug!(
                roots = roots.len(),
                levels = collected.levels().len(),
                instances = collected.entities().len(),
                %language,
                "apply walk"
            );
        }

        Ok((tree, collected))
    }

    fn relation_tree(
        &self,
        roots: &[&dyn Translatable],
        relations: &[&str],
    ) -> Result<RelationTree, InternalError> {
        let tree = RelationTree::parse(relations)?;

        let mut checked: Vec<&'static str> = Vec::new();
        for root in roots {
            let type_tag = root.type_tag();
            if !checked.contains(&type_tag) {
                tree.validate(self.registry, type_tag)?;
                checked.push(type_tag);
            }
        }

        Ok(tree)
    }

    // Restrict the collected set to types that declare translatable fields.
    fn filter(&self, collected: Collected, language: &Language) -> OverlayFilter {
        let entities = collected
            .into_entities()
            .into_iter()
            .filter(|entity| {
                self.registry
                    .translatable_fields(&entity.entity_type)
                    .is_ok_and(|fields| !fields.is_empty())
            })
            .collect();

        OverlayFilter::new(entities, language.clone())
    }

    fn write(
        &self,
        roots: &mut [&mut dyn Translatable],
        tree: &RelationTree,
        instances: usize,
        records: Vec<OverlayRecord>,
    ) -> Result<ApplyStats, InternalError> {
        let mut stats = ApplyStats {
            instances,
            records: records.len(),
            fields: 0,
        };

        let index: HashMap<(String, String, String), String> = records
            .into_iter()
            .map(|record| {
                let Address {
                    entity_type,
                    entity_id,
                    field,
                    ..
                } = record.address;
                ((entity_type, entity_id, field), record.text)
            })
            .collect();

        // Every targeted field must take text before any node changes.
        GraphWalker::new(self.registry).for_each_mut(roots, tree, &mut |node| {
            let type_tag = node.type_tag();
            let identity = node.identity();

            for &field in self.registry.translatable_fields(type_tag)? {
                let key = (type_tag.to_string(), identity.clone(), field.to_string());
                if index.contains_key(&key) && !node.accepts_text(field) {
                    return Err(rejected_text(type_tag, field));
                }
            }

            Ok(())
        })?;

        let mut per_type: BTreeMap<&'static str, (u64, u64)> = BTreeMap::new();

        GraphWalker::new(self.registry).for_each_mut(roots, tree, &mut |node| {
            let type_tag = node.type_tag();
            let fields = self.registry.translatable_fields(type_tag)?;
            let identity = node.identity();
            let counters = per_type.entry(type_tag).or_default();
            counters.0 += 1;

            for &field in fields {
                let key = (type_tag.to_string(), identity.clone(), field.to_string());
                let Some(text) = index.get(&key) else {
                    continue;
                };

                if !node.set_text(field, text.clone()) {
                    return Err(rejected_text(type_tag, field));
                }
                counters.1 += 1;
                stats.fields += 1;
            }

            Ok(())
        })?;

        for (entity_type, (walked, applied)) in &per_type {
            sink::record(MetricsEvent::InstancesWalked {
                entity_type,
                instances: *walked,
            });
            sink::record(MetricsEvent::FieldsApplied {
                entity_type,
                fields: *applied,
            });
        }
        sink::record(MetricsEvent::Apply {
            instances: stats.instances as u64,
            fields: stats.fields as u64,
        });

        Ok(stats)
    }

    fn check_language(&self, language: &Language) -> Result<(), ConfigError> {
        if self.config.languages().contains(language) {
            Ok(())
        } else {
            Err(ConfigError::UnknownLanguage {
                code: language.to_string(),
            })
        }
    }

    fn check_address(&self, address: &Address) -> Result<(), InternalError> {
        address.validate()?;
        self.check_language(&address.language)?;

        let entry = self.registry.get(&address.entity_type)?;
        if !entry.is_translatable(&address.field) {
            return Err(InternalError::context_internal(format!(
                "address {address} names a field that is not translatable"
            )));
        }

        Ok(())
    }
}

fn rejected_text(type_tag: &str, field: &str) -> InternalError {
    InternalError::context_internal(format!(
        "field '{type_tag}.{field}' rejected translated text"
    ))
}
