use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{EntityModel, FieldKind, TranslatableFields},
    traits::EntityKind,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum RegistryError {
    #[error("entity type '{0}' is not registered as translatable")]
    NotRegistered(String),

    #[error("entity type '{0}' already registered")]
    AlreadyRegistered(&'static str),

    #[error("entity type '{entity_type}' declares field '{field}' more than once")]
    DuplicateField {
        entity_type: &'static str,
        field: &'static str,
    },

    #[error("entity type '{entity_type}' has no field '{field}'")]
    UnknownField {
        entity_type: &'static str,
        field: &'static str,
    },

    #[error("field '{entity_type}.{field}' ({kind}) cannot hold translations")]
    FieldNotTranslatable {
        entity_type: &'static str,
        field: &'static str,
        kind: FieldKind,
    },

    #[error("entity type '{entity_type}' primary key '{field}' is not a declared field")]
    UnknownPrimaryKey {
        entity_type: &'static str,
        field: &'static str,
    },
}

impl From<RegistryError> for InternalError {
    fn from(err: RegistryError) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Registry, err.to_string())
    }
}

///
/// RegisteredEntity
///
/// An entity model with its translatable field set resolved at
/// registration time.
///

#[derive(Clone, Debug)]
pub struct RegisteredEntity {
    model: &'static EntityModel,
    translatable: Vec<&'static str>,
}

impl RegisteredEntity {
    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    #[must_use]
    pub fn translatable_fields(&self) -> &[&'static str] {
        &self.translatable
    }

    #[must_use]
    pub fn is_translatable(&self, field: &str) -> bool {
        self.translatable.contains(&field)
    }
}

///
/// Registry
///
/// Type-tag keyed table of every entity type the engine may touch.
/// Built once at startup and shared by reference.
///

#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<&'static str, RegisteredEntity>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the model of an `EntityKind`.
    pub fn register_kind<E: EntityKind>(&mut self) -> Result<(), RegistryError> {
        self.register(E::MODEL)
    }

    /// Register one model, resolving its translatable field set.
    pub fn register(&mut self, model: &'static EntityModel) -> Result<(), RegistryError> {
        if self.entries.contains_key(model.type_tag) {
            return Err(RegistryError::AlreadyRegistered(model.type_tag));
        }

        let translatable = resolve_translatable_fields(model)?;
        self.entries.insert(
            model.type_tag,
            RegisteredEntity {
                model,
                translatable,
            },
        );

        Ok(())
    }

    pub fn get(&self, type_tag: &str) -> Result<&RegisteredEntity, RegistryError> {
        self.entries
            .get(type_tag)
            .ok_or_else(|| RegistryError::NotRegistered(type_tag.to_string()))
    }

    /// Translatable fields of a registered type, in declaration order.
    pub fn translatable_fields(&self, type_tag: &str) -> Result<&[&'static str], RegistryError> {
        self.get(type_tag)
            .map(RegisteredEntity::translatable_fields)
    }

    #[must_use]
    pub fn contains(&self, type_tag: &str) -> bool {
        self.entries.contains_key(type_tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredEntity> {
        self.entries.values()
    }
}

// Resolve the field set declared by a model.
fn resolve_translatable_fields(
    model: &'static EntityModel,
) -> Result<Vec<&'static str>, RegistryError> {
    let entity_type = model.type_tag;

    for (index, field) in model.fields.iter().enumerate() {
        if model.fields[..index]
            .iter()
            .any(|earlier| earlier.name == field.name)
        {
            return Err(RegistryError::DuplicateField {
                entity_type,
                field: field.name,
            });
        }
    }

    if model.field(model.primary_key).is_none() {
        return Err(RegistryError::UnknownPrimaryKey {
            entity_type,
            field: model.primary_key,
        });
    }

    match model.translatable {
        TranslatableFields::None => Ok(Vec::new()),

        TranslatableFields::Auto => Ok(model
            .fields
            .iter()
            .filter(|field| field.kind.is_free_text() && field.name != model.primary_key)
            .map(|field| field.name)
            .collect()),

        TranslatableFields::Explicit(names) => {
            let mut fields = Vec::with_capacity(names.len());

            for &name in names {
                let field = model.field(name).ok_or(RegistryError::UnknownField {
                    entity_type,
                    field: name,
                })?;

                if !field.kind.accepts_translation() || name == model.primary_key {
                    return Err(RegistryError::FieldNotTranslatable {
                        entity_type,
                        field: name,
                        kind: field.kind,
                    });
                }
                if fields.contains(&name) {
                    return Err(RegistryError::DuplicateField {
                        entity_type,
                        field: name,
                    });
                }

                fields.push(name);
            }

            Ok(fields)
        }
    }
}
