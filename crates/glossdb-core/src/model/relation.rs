///
/// RelationModel
///
/// One named relation an entity can be traversed through.
/// The target is named by type tag and resolved through the registry,
/// so models may refer to each other cyclically.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelationModel {
    pub name: &'static str,
    pub target: &'static str,
    pub cardinality: Cardinality,
}

impl RelationModel {
    #[must_use]
    pub const fn new(name: &'static str, target: &'static str, cardinality: Cardinality) -> Self {
        Self {
            name,
            target,
            cardinality,
        }
    }
}

///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    One,
    Many,
}
