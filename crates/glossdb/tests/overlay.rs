use glossdb::{
    Error, ErrorKind, StoreErrorKind,
    core::db::{Address, OverlayFilter, OverlayRecord},
    prelude::*,
    translatable_entity,
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

translatable_entity! {
    #[derive(Clone, Debug, Default)]
    pub struct Product {
        pub id: u64,
        pub name: String,
        pub description: Option<String>,
        pub sku: String,
        pub category: Option<Rc<RefCell<Category>>>,
    }

    tag: "shop.product",
    id: id,

    fields {
        id: Uint,
        name: Text,
        description: LongText,
        sku: Text,
    }

    translatable: [name, description],

    relations {
        category -> "shop.category": One,
    }
}

translatable_entity! {
    #[derive(Clone, Debug, Default)]
    pub struct Category {
        pub id: u64,
        pub title: String,
    }

    tag: "shop.category",
    id: id,

    fields {
        id: Uint,
        title: Text,
    }

    translatable: auto,
}

///
/// CountingStore
///

#[derive(Default)]
struct CountingStore {
    inner: MemoryOverlayStore,
    fetches: Cell<usize>,
}

impl OverlayStore for CountingStore {
    fn fetch(
        &self,
        filter: &OverlayFilter,
    ) -> Result<Vec<OverlayRecord>, glossdb::core::error::InternalError> {
        self.fetches.set(self.fetches.get() + 1);
        self.inner.fetch(filter)
    }

    fn get(
        &self,
        address: &Address,
    ) -> Result<Option<OverlayRecord>, glossdb::core::error::InternalError> {
        self.inner.get(address)
    }

    fn upsert(
        &self,
        address: Address,
        text: String,
    ) -> Result<(), glossdb::core::error::InternalError> {
        self.inner.upsert(address, text)
    }

    fn purge_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<usize, glossdb::core::error::InternalError> {
        self.inner.purge_entity(entity_type, entity_id)
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_kind::<Product>().expect("product registers");
    registry.register_kind::<Category>().expect("category registers");

    registry
}

fn config() -> OverlayConfig {
    OverlayConfig::from_toml_str(
        r#"
        base_language = "en"
        languages = ["en", "fr", "de"]
        "#,
    )
    .expect("config parses")
}

fn product(id: u64, name: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        sku: format!("SKU-{id}"),
        ..Product::default()
    }
}

fn seed(store: &CountingStore, entity_type: &str, id: u64, field: &str, language: &str, text: &str) {
    store
        .inner
        .upsert(
            Address::new(entity_type, id.to_string(), field, Language::new(language)),
            text.to_string(),
        )
        .expect("seed write");
}

#[test]
fn apply_overlays_requested_language_with_fallback() -> glossdb::Result<()> {
    let registry = registry();
    let config = config();
    let store = CountingStore::default();
    seed(&store, "shop.product", 1, "name", "fr", "Bonjour");
    let session = TranslationSession::new(&registry, &store, &config);

    let mut rows = vec![product(1, "Hello")];
    session.apply(&mut rows, &[], "fr")?;
    assert_eq!(rows[0].name, "Bonjour");

    let mut rows = vec![product(1, "Hello")];
    session.apply(&mut rows, &[], "de")?;
    assert_eq!(rows[0].name, "Hello");

    Ok(())
}

#[test]
fn filters_match_translated_text_only_in_that_language() -> glossdb::Result<()> {
    let registry = registry();
    let config = config();
    let store = CountingStore::default();
    seed(&store, "shop.product", 1, "name", "fr", "Bonjour");

    let products = MemoryEntityStore::<Product>::new(&store);
    products.insert(product(1, "Hello"));
    let session = TranslationSession::new(&registry, &store, &config);

    let french = session
        .load::<Product>()
        .apply(Some("fr"))?
        .filter(field("name").text_contains("Bon"));
    let found = session.execute(&french, &products)?;
    assert_eq!(found.entities().len(), 1);
    assert_eq!(found.entities()[0].name, "Bonjour");

    let german = session
        .load::<Product>()
        .apply(Some("de"))?
        .filter(field("name").text_contains("Bon"));
    assert!(session.execute(&german, &products)?.is_empty());

    // No fallback in filters: the base value does not match either.
    let base_word = session
        .load::<Product>()
        .apply(Some("de"))?
        .filter(field("name").eq("Hello"));
    assert!(session.execute(&base_word, &products)?.is_empty());

    Ok(())
}

#[test]
fn shared_related_instance_is_fetched_once_and_written_once() -> glossdb::Result<()> {
    let registry = registry();
    let config = config();
    let store = CountingStore::default();
    seed(&store, "shop.product", 1, "name", "fr", "Chaise");
    seed(&store, "shop.product", 2, "name", "fr", "Table");
    seed(&store, "shop.category", 9, "title", "fr", "Meubles");
    let session = TranslationSession::new(&registry, &store, &config);

    let category = Rc::new(RefCell::new(Category {
        id: 9,
        title: "Furniture".to_string(),
    }));
    let mut first = product(1, "Chair");
    let mut second = product(2, "Table");
    first.category = Some(category.clone());
    second.category = Some(category.clone());

    let mut rows = vec![first, second];
    let stats = session.apply(&mut rows, &["category"], "fr")?;

    assert_eq!(store.fetches.get(), 1);
    assert_eq!(stats.instances, 3);
    assert_eq!(stats.fields, 3);
    assert_eq!(category.borrow().title, "Meubles");
    assert_eq!(rows[0].name, "Chaise");

    Ok(())
}

#[test]
fn apply_is_idempotent() -> glossdb::Result<()> {
    let registry = registry();
    let config = config();
    let store = CountingStore::default();
    seed(&store, "shop.product", 1, "name", "fr", "Bonjour");
    let session = TranslationSession::new(&registry, &store, &config);

    let mut rows = vec![product(1, "Hello")];
    session.apply(&mut rows, &[], "fr")?;
    let once = rows[0].clone();
    session.apply(&mut rows, &[], "fr")?;

    assert_eq!(rows[0].name, once.name);
    assert_eq!(rows[0].description, once.description);

    Ok(())
}

#[test]
fn sync_then_apply_round_trips() -> glossdb::Result<()> {
    let registry = registry();
    let config = config();
    let store = CountingStore::default();
    let session = TranslationSession::new(&registry, &store, &config);

    let mut edited = product(1, "Bonjour");
    edited.description = Some("Une chaise".to_string());
    assert_eq!(session.sync(&edited, "fr")?, 2);

    let mut fresh = product(1, "Hello");
    session.apply_one(&mut fresh, &[], "fr")?;

    assert_eq!(fresh.name, "Bonjour");
    assert_eq!(fresh.description.as_deref(), Some("Une chaise"));
    assert_eq!(fresh.sku, "SKU-1");

    Ok(())
}

#[test]
fn deleting_an_entity_cascades_to_its_overlays() -> glossdb::Result<()> {
    let store = CountingStore::default();
    seed(&store, "shop.product", 1, "name", "fr", "Bonjour");
    seed(&store, "shop.product", 2, "name", "fr", "Salut");

    let products = MemoryEntityStore::<Product>::new(&store);
    products.insert(product(1, "Hello"));
    products.insert(product(2, "Hi"));
    products.delete("1")?;

    assert_eq!(store.inner.len(), 1);

    Ok(())
}

#[test]
fn failures_map_onto_the_public_taxonomy() {
    let registry = registry();
    let config = config();
    let store = CountingStore::default();
    let session = TranslationSession::new(&registry, &store, &config);

    let err: Error = session
        .apply(&mut [product(1, "Hello")], &["supplier"], "fr")
        .unwrap_err()
        .into();
    assert_eq!(err.kind, ErrorKind::Configuration);

    let err: Error = session
        .apply(&mut [product(1, "Hello")], &[], "it")
        .unwrap_err()
        .into();
    assert!(err.is_configuration());

    let err: Error = session
        .load::<Product>()
        .apply(Some("fr"))
        .expect("fr is configured")
        .values(["name"])
        .plan(&registry)
        .unwrap_err()
        .into();
    assert_eq!(err.kind, ErrorKind::Unsupported);

    store.inner.set_unavailable(true);
    let err: Error = session
        .apply(&mut [product(1, "Hello")], &[], "fr")
        .unwrap_err()
        .into();
    assert_eq!(err.kind, ErrorKind::Store(StoreErrorKind::Unavailable));
    assert_eq!(store.fetches.get(), 1);
}
