//! Predicate rewriting: route leaves on translatable fields to the overlay table.

use crate::{
    db::{
        predicate::{OVERLAY_TEXT_FIELD, OverlayPredicate, Predicate},
        registry::RegisteredEntity,
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    language::Language,
    obs::sink::{self, MetricsEvent},
};
use thiserror::Error as ThisError;

///
/// RewriteError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RewriteError {
    #[error("entity type '{entity_type}' has no field '{field}'")]
    UnknownField { entity_type: String, field: String },

    #[error(
        "null and missing tests are not supported on translated field '{entity_type}.{field}'"
    )]
    NullTestOnTranslatedField { entity_type: String, field: String },
}

impl RewriteError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownField { .. } => ErrorClass::Configuration,
            Self::NullTestOnTranslatedField { .. } => ErrorClass::Unsupported,
        }
    }
}

impl From<RewriteError> for InternalError {
    fn from(err: RewriteError) -> Self {
        Self::new(err.class(), ErrorOrigin::Query, err.to_string())
    }
}

/// Rewrite `predicate` for one entity type and target language.
///
/// With `translate` on, every leaf naming a translatable field becomes a
/// `Predicate::Overlay` node carrying the original leaf as its condition.
/// Other leaves are kept. The boolean structure is rebuilt node for node.
pub fn rewrite(
    predicate: &Predicate,
    entity: &RegisteredEntity,
    language: &Language,
    translate: bool,
) -> Result<Predicate, RewriteError> {
    let mut leaves = 0;
    let rewritten = Rewriter {
        entity,
        language,
        translate,
        leaves: &mut leaves,
    }
    .rewrite(predicate)?;

    if leaves > 0 {
        sink::record(MetricsEvent::Rewrite { leaves });
    }

    Ok(rewritten)
}

struct Rewriter<'a> {
    entity: &'a RegisteredEntity,
    language: &'a Language,
    translate: bool,
    leaves: &'a mut u64,
}

impl Rewriter<'_> {
    fn rewrite(&mut self, predicate: &Predicate) -> Result<Predicate, RewriteError> {
        match predicate {
            Predicate::True => Ok(Predicate::True),
            Predicate::False => Ok(Predicate::False),
            Predicate::And(children) => Ok(Predicate::And(self.rewrite_all(children)?)),
            Predicate::Or(children) => Ok(Predicate::Or(self.rewrite_all(children)?)),
            Predicate::Not(inner) => Ok(Predicate::Not(Box::new(self.rewrite(inner)?))),

            // Already routed; keep as-is.
            Predicate::Overlay(_) => Ok(predicate.clone()),

            leaf => self.rewrite_leaf(leaf),
        }
    }

    fn rewrite_all(&mut self, children: &[Predicate]) -> Result<Vec<Predicate>, RewriteError> {
        children.iter().map(|child| self.rewrite(child)).collect()
    }

    fn rewrite_leaf(&mut self, leaf: &Predicate) -> Result<Predicate, RewriteError> {
        let model = self.entity.model();
        let Some(field) = leaf.leaf_field() else {
            return Ok(leaf.clone());
        };

        if model.field(field).is_none() {
            return Err(RewriteError::UnknownField {
                entity_type: model.type_tag.to_string(),
                field: field.to_string(),
            });
        }

        if !self.translate || !self.entity.is_translatable(field) {
            return Ok(leaf.clone());
        }

        if matches!(leaf, Predicate::IsNull { .. } | Predicate::IsMissing { .. }) {
            return Err(RewriteError::NullTestOnTranslatedField {
                entity_type: model.type_tag.to_string(),
                field: field.to_string(),
            });
        }

        *self.leaves += 1;

        Ok(Predicate::Overlay(OverlayPredicate {
            entity_type: model.type_tag.to_string(),
            field: field.to_string(),
            language: self.language.clone(),
            condition: Box::new(leaf.with_leaf_field(OVERLAY_TEXT_FIELD)),
        }))
    }
}
