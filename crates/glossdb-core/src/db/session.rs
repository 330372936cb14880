use crate::{
    config::OverlayConfig,
    db::{
        address::OverlayRecord,
        context::{ApplyStats, TranslationContext},
        overlay::OverlayStore,
        query::{Response, Rows, Shape, TranslatedQuery, ValueRow},
        registry::Registry,
        store::EntityStore,
    },
    error::InternalError,
    language::Language,
    obs::sink::{MetricsSink, with_metrics_sink},
    traits::{EntityKind, Translatable},
    value::Value,
};

///
/// TranslationSession
///
/// Session-scoped handle over the registry, overlay store and config,
/// with policy (debug, metrics). Every call is an independent invocation;
/// nothing is cached between calls.
///

pub struct TranslationSession<'a> {
    registry: &'a Registry,
    overlay: &'a dyn OverlayStore,
    config: &'a OverlayConfig,
    debug: bool,
    metrics: Option<&'static dyn MetricsSink>,
}

impl<'a> TranslationSession<'a> {
    #[must_use]
    pub const fn new(
        registry: &'a Registry,
        overlay: &'a dyn OverlayStore,
        config: &'a OverlayConfig,
    ) -> Self {
        Self {
            registry,
            overlay,
            config,
            debug: false,
            metrics: None,
        }
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &'a Registry {
        self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &'a OverlayConfig {
        self.config
    }

    fn with_metrics<T>(&self, f: impl FnOnce() -> T) -> T {
        if let Some(sink) = self.metrics {
            with_metrics_sink(sink, f)
        } else {
            f()
        }
    }

    fn context(&self) -> TranslationContext<'a> {
        TranslationContext::new(self.registry, self.overlay, self.config, self.debug)
    }

    // ---------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------

    /// Resolve a caller-supplied code against the configured languages.
    pub fn language(&self, code: &str) -> Result<Language, InternalError> {
        Ok(self.config.languages().resolve(code)?)
    }

    /// Translatable fields of a registered type, in declaration order.
    pub fn translatable_fields(&self, type_tag: &str) -> Result<&'a [&'static str], InternalError> {
        Ok(self.registry.translatable_fields(type_tag)?)
    }

    // ---------------------------------------------------------------------
    // Apply / read
    // ---------------------------------------------------------------------

    /// Overlay `language` onto `roots` and the instances reachable through
    /// `relations`, with one overlay read.
    pub fn apply<E: Translatable>(
        &self,
        roots: &mut [E],
        relations: &[&str],
        language: &str,
    ) -> Result<ApplyStats, InternalError> {
        let mut roots: Vec<&mut dyn Translatable> = roots
            .iter_mut()
            .map(|root| root as &mut dyn Translatable)
            .collect();

        self.apply_dyn(&mut roots, relations, language)
    }

    pub fn apply_one<E: Translatable>(
        &self,
        entity: &mut E,
        relations: &[&str],
        language: &str,
    ) -> Result<ApplyStats, InternalError> {
        let root: &mut dyn Translatable = entity;

        self.apply_dyn(&mut [root], relations, language)
    }

    /// `apply` over roots of mixed types.
    pub fn apply_dyn(
        &self,
        roots: &mut [&mut dyn Translatable],
        relations: &[&str],
        language: &str,
    ) -> Result<ApplyStats, InternalError> {
        let language = self.language(language)?;

        self.with_metrics(|| self.context().apply(roots, relations, &language))
    }

    /// Apply a record set obtained earlier instead of reading the store.
    pub fn apply_records<E: Translatable>(
        &self,
        roots: &mut [E],
        relations: &[&str],
        records: &[OverlayRecord],
        language: &str,
    ) -> Result<ApplyStats, InternalError> {
        let language = self.language(language)?;
        let mut roots: Vec<&mut dyn Translatable> = roots
            .iter_mut()
            .map(|root| root as &mut dyn Translatable)
            .collect();

        self.with_metrics(|| {
            self.context()
                .apply_records(&mut roots, relations, records, &language)
        })
    }

    /// The overlay records `apply` would use, without mutating `roots`.
    pub fn translations<E: Translatable>(
        &self,
        roots: &[E],
        relations: &[&str],
        language: &str,
    ) -> Result<Vec<OverlayRecord>, InternalError> {
        let language = self.language(language)?;
        let roots: Vec<&dyn Translatable> = roots
            .iter()
            .map(|root| root as &dyn Translatable)
            .collect();

        self.with_metrics(|| self.context().translations(&roots, relations, &language))
    }

    // ---------------------------------------------------------------------
    // Write
    // ---------------------------------------------------------------------

    /// Store the in-memory translatable values of `entity` as its
    /// `language` translation.
    pub fn sync(&self, entity: &dyn Translatable, language: &str) -> Result<usize, InternalError> {
        let language = self.language(language)?;

        self.with_metrics(|| self.context().sync(entity, &language))
    }

    /// Remove every overlay record owned by `entity`.
    pub fn purge(&self, entity: &dyn Translatable) -> Result<usize, InternalError> {
        self.with_metrics(|| self.context().purge(entity))
    }

    // ---------------------------------------------------------------------
    // Query
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn load<E: EntityKind>(&self) -> TranslatedQuery<E> {
        TranslatedQuery::new(self.config.languages().clone())
    }

    /// Plan `query`, run it against `store`, then translate the loaded rows
    /// when the query is in translate mode.
    ///
    /// The response carries the executed snapshot; it can be refined with
    /// further clauses but no longer switch mode or language.
    pub fn execute<E>(
        &self,
        query: &TranslatedQuery<E>,
        store: &dyn EntityStore<E>,
    ) -> Result<Response<E>, InternalError>
    where
        E: EntityKind + Translatable,
    {
        self.with_metrics(|| {
            let plan = query.plan(self.registry)?;

            if self.debug {
                tracing::debug!(
                    entity_type = E::MODEL.type_tag,
                    predicate = ?plan.predicate,
                    language = ?plan.language,
                    relations = ?plan.relations,
                    "query plan"
                );
            }

            let mut loaded = store.query(&plan.predicate)?;

            let rows = match &plan.shape {
                Shape::Values(fields) => {
                    Rows::Values(loaded.iter().map(|row| project(row, fields)).collect())
                }
                Shape::Entities => {
                    if let Some(language) = &plan.language {
                        let relations: Vec<&str> =
                            plan.relations.iter().map(String::as_str).collect();
                        let mut roots: Vec<&mut dyn Translatable> = loaded
                            .iter_mut()
                            .map(|row| row as &mut dyn Translatable)
                            .collect();

                        self.context().apply(&mut roots, &relations, language)?;
                    }

                    Rows::Entities(loaded)
                }
            };

            Ok(Response::new(rows, query.executed()))
        })
    }
}

fn project<E: Translatable>(row: &E, fields: &[String]) -> ValueRow {
    fields
        .iter()
        .map(|field| (field.clone(), row.get_value(field).unwrap_or(Value::Null)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{address::Address, predicate::field, store::MemoryEntityStore},
        obs::{MetricsEvent, metrics_report, metrics_reset_all},
        test_support::{
            CountingOverlayStore,
            fixtures::{Article, article, author, config, registry, shared_author},
        },
    };
    use std::cell::Cell;

    fn fr_title(id: u64) -> Address {
        Address::new("blog.article", id.to_string(), "title", Language::new("fr"))
    }

    struct CountingSink {
        events: Cell<u64>,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _event: MetricsEvent) {
            self.events.set(self.events.get() + 1);
        }
    }

    #[test]
    fn language_codes_resolve_against_config() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        let session = TranslationSession::new(&registry, &overlay, &config);

        assert_eq!(session.language("FR-ca").unwrap(), Language::new("fr"));
        assert!(session.language("it").unwrap_err().is_configuration());
    }

    #[test]
    fn translatable_fields_follow_registration() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        let session = TranslationSession::new(&registry, &overlay, &config);

        assert_eq!(
            session.translatable_fields("blog.article").unwrap(),
            ["title", "body"]
        );
        assert_eq!(session.translatable_fields("blog.author").unwrap(), ["name", "bio"]);
        assert!(session.translatable_fields("blog.comment").unwrap().is_empty());
        assert!(
            session
                .translatable_fields("blog.unknown")
                .unwrap_err()
                .is_configuration()
        );
    }

    #[test]
    fn apply_resolves_regional_codes() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        overlay.seed(fr_title(1), "Bonjour");
        let session = TranslationSession::new(&registry, &overlay, &config);

        let mut rows = vec![article(1, "Hello")];
        session.apply(&mut rows, &[], "fr-CA").unwrap();

        assert_eq!(rows[0].title, "Bonjour");
    }

    #[test]
    fn execute_filters_on_translated_text_then_applies() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        overlay.seed(fr_title(1), "Bonjour");
        overlay.seed(fr_title(2), "Salut");

        let store = MemoryEntityStore::<Article>::new(&overlay);
        store.insert(article(1, "Hello"));
        store.insert(article(2, "Hi"));

        let session = TranslationSession::new(&registry, &overlay, &config);
        let query = session
            .load::<Article>()
            .apply(Some("fr"))
            .unwrap()
            .filter(field("title").text_contains("Bon"));

        let response = session.execute(&query, &store).unwrap();

        assert_eq!(response.len(), 1);
        assert_eq!(response.entities()[0].title, "Bonjour");
        assert_eq!(overlay.fetches.get(), 1);

        let german = session
            .load::<Article>()
            .apply(Some("de"))
            .unwrap()
            .filter(field("title").text_contains("Bon"));
        assert!(session.execute(&german, &store).unwrap().is_empty());
    }

    #[test]
    fn execute_translates_related_rows() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        overlay.seed(Address::new("blog.author", "7", "name", Language::new("fr")), "Anne");

        let store = MemoryEntityStore::<Article>::new(&overlay);
        let mut row = article(1, "Hello");
        row.author = Some(shared_author(author(7, "Ann")));
        store.insert(row);

        let session = TranslationSession::new(&registry, &overlay, &config);
        let query = session
            .load::<Article>()
            .apply(Some("fr"))
            .unwrap()
            .translate_related(["author"]);

        let rows = session.execute(&query, &store).unwrap().into_entities();
        let name = rows[0].author.as_ref().map(|a| a.borrow().name.clone());

        assert_eq!(name.as_deref(), Some("Anne"));
    }

    #[test]
    fn executed_snapshot_is_returned_with_the_response() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        let store = MemoryEntityStore::<Article>::new(&overlay);
        let session = TranslationSession::new(&registry, &overlay, &config);

        let query = session.load::<Article>().apply(Some("fr")).unwrap();
        let response = session.execute(&query, &store).unwrap();

        assert!(!query.is_executed());
        assert!(response.query().is_executed());
        assert!(response.query().apply(Some("de")).is_err());
        assert!(response.query().decipher().is_err());
    }

    #[test]
    fn projection_reads_base_values() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        overlay.seed(fr_title(1), "Bonjour");

        let store = MemoryEntityStore::<Article>::new(&overlay);
        store.insert(article(1, "Hello"));

        let session = TranslationSession::new(&registry, &overlay, &config);
        let query = session
            .load::<Article>()
            .apply(Some("fr"))
            .unwrap()
            .decipher()
            .unwrap()
            .values(["id", "title", "body"]);

        let response = session.execute(&query, &store).unwrap();
        let row = &response.values()[0];

        assert_eq!(row["id"], Value::Uint(1));
        assert_eq!(row["title"], Value::Text("Hello".to_string()));
        assert_eq!(row["body"], Value::Null);
        assert_eq!(overlay.calls(), 0);
    }

    #[test]
    fn projection_in_translate_mode_fails_before_store_access() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        let store = MemoryEntityStore::<Article>::new(&overlay);
        store.insert(article(1, "Hello"));

        let session = TranslationSession::new(&registry, &overlay, &config);
        let query = session.load::<Article>().apply(Some("fr")).unwrap().values(["title"]);

        let err = session.execute(&query, &store).unwrap_err();

        assert!(err.is_unsupported());
        assert_eq!(overlay.calls(), 0);
    }

    #[test]
    fn sync_and_purge_round_trip() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        let session = TranslationSession::new(&registry, &overlay, &config);

        let edited = article(1, "Bonjour");
        assert_eq!(session.sync(&edited, "FR").unwrap(), 1);

        let records = session.translations(&[article(1, "Hello")], &[], "fr").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Bonjour");

        assert_eq!(session.purge(&edited).unwrap(), 1);
        assert!(overlay.inner.is_empty());
    }

    #[test]
    fn apply_records_uses_supplied_translations() {
        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        overlay.seed(fr_title(1), "Bonjour");
        let session = TranslationSession::new(&registry, &overlay, &config);

        let records = session.translations(&[article(1, "Hello")], &[], "fr").unwrap();
        let mut rows = vec![article(1, "Hello")];
        session.apply_records(&mut rows, &[], &records, "fr").unwrap();

        assert_eq!(rows[0].title, "Bonjour");
        assert_eq!(overlay.fetches.get(), 1);
    }

    #[test]
    fn metrics_sink_override_is_scoped_to_the_session() {
        metrics_reset_all();
        let sink: &'static CountingSink = Box::leak(Box::new(CountingSink {
            events: Cell::new(0),
        }));

        let registry = registry();
        let config = config();
        let overlay = CountingOverlayStore::new();
        overlay.seed(fr_title(1), "Bonjour");
        let session = TranslationSession::new(&registry, &overlay, &config).metrics_sink(sink);

        session.apply_one(&mut article(1, "Hello"), &[], "fr").unwrap();

        assert!(sink.events.get() > 0);
        assert_eq!(metrics_report().ops.apply_calls, 0);
    }
}
