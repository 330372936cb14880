//! Module: db::query
//! Responsibility: immutable, chainable query snapshots over translated fields.
//! Does not own: predicate evaluation or store execution.


use crate::{
    config::ConfigError,
    db::{
        predicate::{Predicate, RewriteError, rewrite},
        registry::{Registry, RegistryError},
        walker::RelationTree,
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    language::{Language, Languages},
    traits::EntityKind,
    value::Value,
};
use std::{collections::BTreeMap, fmt, marker::PhantomData};
use thiserror::Error as ThisError;

///
/// QueryError
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("cannot alter query shape after execution")]
    AlreadyExecuted,

    #[error("value projections cannot be read in translated mode; decipher the query first")]
    ProjectionWhileTranslating,

    #[error("entity type '{entity_type}' has no field '{field}' to project")]
    UnknownProjectionField { entity_type: String, field: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl QueryError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::ProjectionWhileTranslating => ErrorClass::Unsupported,
            Self::Rewrite(err) => err.class(),
            Self::AlreadyExecuted
            | Self::UnknownProjectionField { .. }
            | Self::Config(_)
            | Self::Registry(_) => ErrorClass::Configuration,
        }
    }
}

impl From<QueryError> for InternalError {
    fn from(err: QueryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Query, err.to_string())
    }
}

///
/// TranslationMode
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TranslationMode {
    /// Read and filter translated values.
    #[default]
    Cipher,
    /// Read and filter base values.
    Decipher,
}

///
/// Shape
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Shape {
    #[default]
    Entities,
    Values(Vec<String>),
}

///
/// Clause
///
/// One filter or exclude call. `language` is the translation target that
/// was active when the clause was added, or `None` for base values.
///

#[derive(Clone, Debug, Eq, PartialEq)]
struct Clause {
    predicate: Predicate,
    negated: bool,
    language: Option<Language>,
}

///
/// QueryPlan
///
/// Store-ready form of a query: one rewritten predicate plus the
/// post-load apply step, if any.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryPlan {
    pub predicate: Predicate,
    pub language: Option<Language>,
    pub relations: Vec<String>,
    pub shape: Shape,
}

///
/// TranslatedQuery
///
/// Immutable query snapshot. Every chaining call returns a new snapshot;
/// the receiver is never modified.
///

pub struct TranslatedQuery<E> {
    languages: Languages,
    language: Option<Language>,
    relations: Vec<String>,
    mode: TranslationMode,
    clauses: Vec<Clause>,
    shape: Shape,
    executed: bool,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Clone for TranslatedQuery<E> {
    fn clone(&self) -> Self {
        Self {
            languages: self.languages.clone(),
            language: self.language.clone(),
            relations: self.relations.clone(),
            mode: self.mode,
            clauses: self.clauses.clone(),
            shape: self.shape.clone(),
            executed: self.executed,
            _marker: PhantomData,
        }
    }
}

impl<E> fmt::Debug for TranslatedQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatedQuery")
            .field("language", &self.language)
            .field("relations", &self.relations)
            .field("mode", &self.mode)
            .field("clauses", &self.clauses)
            .field("shape", &self.shape)
            .field("executed", &self.executed)
            .finish_non_exhaustive()
    }
}

impl<E: EntityKind> TranslatedQuery<E> {
    /// Start an untranslated query; `languages` resolves later `apply` calls.
    #[must_use]
    pub fn new(languages: Languages) -> Self {
        Self {
            languages,
            language: None,
            relations: Vec::new(),
            mode: TranslationMode::default(),
            clauses: Vec::new(),
            shape: Shape::default(),
            executed: false,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    #[must_use]
    pub const fn mode(&self) -> TranslationMode {
        self.mode
    }

    #[must_use]
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub const fn is_executed(&self) -> bool {
        self.executed
    }

    /// Whether loads and new clauses use translated values.
    #[must_use]
    pub const fn translate_mode(&self) -> bool {
        self.language.is_some() && matches!(self.mode, TranslationMode::Cipher)
    }

    // ------------------------------------------------------------------
    // Chaining
    // ------------------------------------------------------------------

    /// Keep rows matching `predicate`, under the current mode and language.
    #[must_use]
    pub fn filter(&self, predicate: Predicate) -> Self {
        self.with_clause(predicate, false)
    }

    /// Drop rows matching `predicate`, under the current mode and language.
    #[must_use]
    pub fn exclude(&self, predicate: Predicate) -> Self {
        self.with_clause(predicate, true)
    }

    /// Translate into `language`; `None` selects the base language.
    pub fn apply(&self, language: Option<&str>) -> Result<Self, QueryError> {
        self.ensure_reshapable()?;

        let language = match language {
            Some(code) => self.languages.resolve(code)?,
            None => self.languages.base().clone(),
        };

        let mut next = self.chain();
        next.language = Some(language);
        Ok(next)
    }

    /// Relations to translate alongside the loaded rows.
    #[must_use]
    pub fn translate_related<I, S>(&self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.chain();
        next.relations = relations.into_iter().map(Into::into).collect();
        next
    }

    /// Use translated values.
    pub fn cipher(&self) -> Result<Self, QueryError> {
        self.with_mode(TranslationMode::Cipher)
    }

    /// Use base values.
    pub fn decipher(&self) -> Result<Self, QueryError> {
        self.with_mode(TranslationMode::Decipher)
    }

    /// Project rows onto `fields` instead of returning entities.
    #[must_use]
    pub fn values<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.chain();
        next.shape = Shape::Values(fields.into_iter().map(Into::into).collect());
        next
    }

    // ------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------

    /// Rewrite and validate everything that does not need the store.
    pub fn plan(&self, registry: &Registry) -> Result<QueryPlan, InternalError> {
        let model = E::MODEL;

        if let Shape::Values(fields) = &self.shape {
            if self.translate_mode() {
                return Err(QueryError::ProjectionWhileTranslating.into());
            }
            if let Some(field) = fields.iter().find(|field| model.field(field).is_none()) {
                return Err(QueryError::UnknownProjectionField {
                    entity_type: model.type_tag.to_string(),
                    field: field.clone(),
                }
                .into());
            }
        }

        let entity = registry.get(model.type_tag).map_err(QueryError::from)?;
        let base = self.languages.base();

        let mut predicates = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let language = clause.language.as_ref().unwrap_or(base);
            let rewritten = rewrite(
                &clause.predicate,
                entity,
                language,
                clause.language.is_some(),
            )
            .map_err(QueryError::from)?;

            predicates.push(if clause.negated {
                Predicate::not(rewritten)
            } else {
                rewritten
            });
        }

        let predicate = match predicates.len() {
            0 => Predicate::True,
            1 => predicates.remove(0),
            _ => Predicate::And(predicates),
        };

        let language = self.translate_mode().then(|| self.language.clone()).flatten();
        if language.is_some() {
            RelationTree::parse(&self.relations)?.validate(registry, model.type_tag)?;
        }

        Ok(QueryPlan {
            predicate,
            language,
            relations: self.relations.clone(),
            shape: self.shape.clone(),
        })
    }

    /// Snapshot marked as executed; it can no longer switch mode or language.
    #[must_use]
    pub(crate) fn executed(&self) -> Self {
        let mut next = self.clone();
        next.executed = true;
        next
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    // Fresh snapshot; chaining starts an unexecuted query.
    fn chain(&self) -> Self {
        let mut next = self.clone();
        next.executed = false;
        next
    }

    fn with_clause(&self, predicate: Predicate, negated: bool) -> Self {
        let language = self.translate_mode().then(|| self.language.clone()).flatten();

        let mut next = self.chain();
        next.clauses.push(Clause {
            predicate,
            negated,
            language,
        });
        next
    }

    fn with_mode(&self, mode: TranslationMode) -> Result<Self, QueryError> {
        self.ensure_reshapable()?;

        let mut next = self.chain();
        next.mode = mode;
        Ok(next)
    }

    fn ensure_reshapable(&self) -> Result<(), QueryError> {
        if self.executed {
            Err(QueryError::AlreadyExecuted)
        } else {
            Ok(())
        }
    }
}

///
/// ValueRow
/// One projected row, keyed by field name.
///

pub type ValueRow = BTreeMap<String, Value>;

///
/// Rows
///

#[derive(Clone, Debug)]
pub enum Rows<E> {
    Entities(Vec<E>),
    Values(Vec<ValueRow>),
}

///
/// Response
///
/// Loaded rows plus the executed query snapshot they came from.
///

#[derive(Debug)]
pub struct Response<E> {
    rows: Rows<E>,
    query: TranslatedQuery<E>,
}

impl<E> Response<E> {
    pub(crate) const fn new(rows: Rows<E>, query: TranslatedQuery<E>) -> Self {
        Self { rows, query }
    }

    #[must_use]
    pub const fn query(&self) -> &TranslatedQuery<E> {
        &self.query
    }

    #[must_use]
    pub fn into_query(self) -> TranslatedQuery<E> {
        self.query
    }

    #[must_use]
    pub const fn rows(&self) -> &Rows<E> {
        &self.rows
    }

    /// Entity rows; empty for a projection.
    #[must_use]
    pub fn entities(&self) -> &[E] {
        match &self.rows {
            Rows::Entities(rows) => rows,
            Rows::Values(_) => &[],
        }
    }

    #[must_use]
    pub fn into_entities(self) -> Vec<E> {
        match self.rows {
            Rows::Entities(rows) => rows,
            Rows::Values(_) => Vec::new(),
        }
    }

    /// Projected rows; empty for an entity load.
    #[must_use]
    pub fn values(&self) -> &[ValueRow] {
        match &self.rows {
            Rows::Entities(_) => &[],
            Rows::Values(rows) => rows,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.rows {
            Rows::Entities(rows) => rows.len(),
            Rows::Values(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
