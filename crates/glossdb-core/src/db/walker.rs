//! Module: db::walker
//! Responsibility: relation-path parsing/validation and object-graph traversal.
//! Does not own: store access or field-level translation logic.

use crate::{
    db::{address::EntityRef, registry::Registry},
    error::InternalError,
    traits::{RelatedMut, Translatable},
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

// Value address plus type tag: an inline child may share its parent's address.
type NodeKey = (usize, &'static str);

// Subtrees reached through an instance that was borrowed at the time.
type Deferred<'t> = HashMap<NodeKey, Vec<&'t RelationTree>>;

///
/// RelationTree
///
/// Relation paths merged by common prefix: `["author", "author.avatar",
/// "tags"]` becomes `{author: {avatar: {}}, tags: {}}`, so a shared
/// prefix is walked once.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RelationTree {
    children: BTreeMap<String, Self>,
}

impl RelationTree {
    /// Parse dotted relation paths. Empty paths and empty segments are
    /// configuration errors.
    pub fn parse<I, S>(paths: I) -> Result<Self, InternalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Self::default();

        for path in paths {
            let path = path.as_ref();
            let mut node = &mut root;

            for segment in path.split('.') {
                let segment = segment.trim();
                if segment.is_empty() {
                    return Err(InternalError::walker_configuration(format!(
                        "relation path '{path}' has an empty segment"
                    )));
                }

                node = node.children.entry(segment.to_string()).or_default();
            }
        }

        Ok(root)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Self)> {
        self.children
            .iter()
            .map(|(name, child)| (name.as_str(), child))
    }

    /// Check every segment against the declared relations, starting at
    /// `root_tag`. Runs before any store access.
    pub fn validate(&self, registry: &Registry, root_tag: &str) -> Result<(), InternalError> {
        self.validate_at(registry, root_tag, "")
    }

    fn validate_at(
        &self,
        registry: &Registry,
        type_tag: &str,
        prefix: &str,
    ) -> Result<(), InternalError> {
        let model = registry.get(type_tag)?.model();

        for (name, child) in &self.children {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };

            let relation = model.relation(name).ok_or_else(|| {
                InternalError::walker_configuration(format!(
                    "relation path '{path}': '{name}' is not a relation of '{type_tag}'"
                ))
            })?;

            child.validate_at(registry, relation.target, &path)?;
        }

        Ok(())
    }
}

///
/// Collected
///
/// Output of one read-only walk: instances grouped by the depth they were
/// reached at and by type tag, plus the global `(type, id)` set that feeds
/// the single batched fetch.
///

#[derive(Debug, Default)]
pub struct Collected {
    levels: Vec<BTreeMap<&'static str, BTreeSet<String>>>,
    entities: BTreeSet<EntityRef>,
}

impl Collected {
    #[must_use]
    pub fn levels(&self) -> &[BTreeMap<&'static str, BTreeSet<String>>] {
        &self.levels
    }

    #[must_use]
    pub const fn entities(&self) -> &BTreeSet<EntityRef> {
        &self.entities
    }

    #[must_use]
    pub fn into_entities(self) -> BTreeSet<EntityRef> {
        self.entities
    }

    fn insert(&mut self, depth: usize, type_tag: &'static str, identity: String) {
        if self.levels.len() <= depth {
            self.levels.resize_with(depth + 1, BTreeMap::new);
        }

        self.entities
            .insert(EntityRef::new(type_tag, identity.clone()));
        self.levels[depth]
            .entry(type_tag)
            .or_default()
            .insert(identity);
    }
}

///
/// GraphWalker
///

pub struct GraphWalker<'a> {
    registry: &'a Registry,
}

impl<'a> GraphWalker<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Enumerate every translatable instance reachable from `roots` along
    /// `tree`, deduplicated by identity within each type.
    pub fn collect(
        &self,
        roots: &[&dyn Translatable],
        tree: &RelationTree,
    ) -> Result<Collected, InternalError> {
        let mut out = Collected::default();

        for root in roots {
            self.collect_node(*root, tree, 0, &mut out)?;
        }

        Ok(out)
    }

    fn collect_node(
        &self,
        node: &dyn Translatable,
        tree: &RelationTree,
        depth: usize,
        out: &mut Collected,
    ) -> Result<(), InternalError> {
        let type_tag = node.type_tag();
        self.registry.get(type_tag)?;
        out.insert(depth, type_tag, node.identity());

        for (relation, subtree) in tree.children() {
            let mut outcome = Ok(());
            let known = node.visit_related(relation, &mut |child| {
                if outcome.is_ok() {
                    outcome = self.collect_node(child, subtree, depth + 1, out);
                }
            });

            if !known {
                return Err(unknown_relation(type_tag, relation));
            }
            outcome?;
        }

        Ok(())
    }

    /// Walk the same graph mutably, calling `write` once per physical
    /// instance. An instance reached through several paths (a diamond) is
    /// written once; traversal still continues below it along each path.
    ///
    /// A path that re-enters an ancestor finds it borrowed. The rest of
    /// that path is resumed from the ancestor once its own relations are
    /// done.
    pub fn for_each_mut(
        &self,
        roots: &mut [&mut dyn Translatable],
        tree: &RelationTree,
        write: &mut dyn FnMut(&mut dyn Translatable) -> Result<(), InternalError>,
    ) -> Result<(), InternalError> {
        let mut visited = HashSet::new();
        let mut deferred = Deferred::new();

        for root in roots.iter_mut() {
            Self::visit_node_mut(&mut **root, tree, &mut visited, &mut deferred, write)?;
        }

        if let Some((_, type_tag)) = deferred.keys().next() {
            return Err(InternalError::walker_unsupported(format!(
                "a '{type_tag}' instance was borrowed outside the walk"
            )));
        }

        Ok(())
    }

    fn visit_node_mut<'t>(
        node: &mut dyn Translatable,
        tree: &'t RelationTree,
        visited: &mut HashSet<NodeKey>,
        deferred: &mut Deferred<'t>,
        write: &mut dyn FnMut(&mut dyn Translatable) -> Result<(), InternalError>,
    ) -> Result<(), InternalError> {
        let type_tag = node.type_tag();
        let key = (std::ptr::from_mut(node).cast::<()>() as usize, type_tag);

        if visited.insert(key) {
            write(node)?;
        }

        for (relation, subtree) in tree.children() {
            let mut outcome = Ok(());
            let known = node.visit_related_mut(relation, &mut |related| {
                if outcome.is_err() {
                    return;
                }

                outcome = match related {
                    RelatedMut::Node(child) => {
                        Self::visit_node_mut(child, subtree, visited, deferred, write)
                    }
                    RelatedMut::Busy {
                        addr,
                        type_tag: Some(target),
                    } => {
                        deferred.entry((addr, target)).or_default().push(subtree);
                        Ok(())
                    }
                    RelatedMut::Busy { type_tag: None, .. } => {
                        Err(InternalError::walker_unsupported(format!(
                            "relation '{type_tag}.{relation}' holds a borrowed value that is not an entity"
                        )))
                    }
                };
            });

            if !known {
                return Err(unknown_relation(type_tag, relation));
            }
            outcome?;
        }

        while let Some(pending) = deferred.remove(&key) {
            for subtree in pending {
                Self::visit_node_mut(node, subtree, visited, deferred, write)?;
            }
        }

        Ok(())
    }
}

fn unknown_relation(type_tag: &str, relation: &str) -> InternalError {
    InternalError::walker_configuration(format!(
        "entity '{type_tag}' does not expose relation '{relation}'"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::{article, author, registry, shared_author, tag};
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn parse_merges_common_prefixes() {
        let tree = RelationTree::parse(["author", "author.articles", "tags"]).unwrap();

        let names: Vec<&str> = tree.children().map(|(name, _)| name).collect();
        assert_eq!(names, ["author", "tags"]);

        let (_, author) = tree.children().next().unwrap();
        let nested: Vec<&str> = author.children().map(|(name, _)| name).collect();
        assert_eq!(nested, ["articles"]);
    }

    #[test]
    fn parse_rejects_empty_segments() {
        let err = RelationTree::parse(["author..articles"]).unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn validate_rejects_undeclared_segment() {
        let tree = RelationTree::parse(["author.publisher"]).unwrap();
        let err = tree.validate(&registry(), "blog.article").unwrap_err();

        assert!(err.is_configuration());
        assert!(err.message.contains("author.publisher"));
    }

    #[test]
    fn validate_accepts_cyclic_paths() {
        let tree = RelationTree::parse(["author.articles.author"]).unwrap();

        tree.validate(&registry(), "blog.article")
            .expect("cyclic relation path should validate");
    }

    #[test]
    fn collect_groups_by_level_and_type() {
        let registry = registry();
        let mut first = article(1, "Hello");
        let mut second = article(2, "World");
        first.author = Some(shared_author(author(7, "Ann")));
        second.author = first.author.clone();

        let tree = RelationTree::parse(["author"]).unwrap();
        let collected = GraphWalker::new(&registry)
            .collect(&[&first, &second], &tree)
            .unwrap();

        assert_eq!(collected.levels().len(), 2);
        assert_eq!(collected.levels()[0]["blog.article"].len(), 2);
        assert_eq!(collected.levels()[1]["blog.author"].len(), 1);
        assert_eq!(collected.entities().len(), 3);
    }

    #[test]
    fn for_each_mut_writes_shared_instance_once() {
        let registry = registry();
        let shared = shared_author(author(7, "Ann"));
        let mut first = article(1, "Hello");
        let mut second = article(2, "World");
        first.author = Some(shared.clone());
        second.author = Some(shared.clone());

        let tree = RelationTree::parse(["author"]).unwrap();
        let mut writes: Vec<String> = Vec::new();
        GraphWalker::new(&registry)
            .for_each_mut(&mut [&mut first, &mut second], &tree, &mut |node| {
                writes.push(format!("{}#{}", node.type_tag(), node.identity()));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            writes,
            ["blog.article#1", "blog.author#7", "blog.article#2"]
        );
    }

    #[test]
    fn for_each_mut_resumes_path_after_reentering_an_ancestor() {
        let registry = registry();
        let shared = shared_author(author(7, "Ann"));
        let mut reply = article(2, "Hi");
        reply.author = Some(shared.clone());
        reply.tags = vec![tag(5, "News")];
        shared.borrow_mut().articles.push(Rc::new(RefCell::new(reply)));

        let mut root = article(1, "Hello");
        root.author = Some(shared.clone());

        let tree = RelationTree::parse(["author.articles.author.articles.tags"]).unwrap();
        let mut writes: Vec<String> = Vec::new();
        GraphWalker::new(&registry)
            .for_each_mut(&mut [&mut root], &tree, &mut |node| {
                writes.push(format!("{}#{}", node.type_tag(), node.identity()));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            writes,
            ["blog.article#1", "blog.author#7", "blog.article#2", "blog.tag#5"]
        );

        shared.borrow_mut().articles.clear();
    }

    #[test]
    fn for_each_mut_rejects_instance_borrowed_outside_the_walk() {
        let registry = registry();
        let shared = shared_author(author(7, "Ann"));
        let mut root = article(1, "Hello");
        root.author = Some(shared.clone());
        let _held = shared.borrow();

        let tree = RelationTree::parse(["author"]).unwrap();
        let err = GraphWalker::new(&registry)
            .for_each_mut(&mut [&mut root], &tree, &mut |_| Ok(()))
            .unwrap_err();

        assert!(err.is_unsupported());
    }
}
