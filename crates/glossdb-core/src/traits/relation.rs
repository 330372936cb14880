use crate::traits::Translatable;
use std::{cell::RefCell, rc::Rc};

///
/// RelatedMut
///
/// One instance reached by a mutable relation visit.
///

pub enum RelatedMut<'a> {
    Node(&'a mut dyn Translatable),

    /// A shared cell that is already borrowed, usually by an ancestor
    /// higher up the same walk. `addr` is the address of the cell's value.
    Busy {
        addr: usize,
        type_tag: Option<&'static str>,
    },
}

///
/// RelationTarget
///
/// Anything a relation field can hold: one entity, an optional entity,
/// a boxed or shared entity, or a list of them.
///

pub trait RelationTarget {
    /// Type tag when the target is a single entity.
    const TYPE_TAG: Option<&'static str> = None;

    fn visit(&self, f: &mut dyn FnMut(&dyn Translatable));

    fn visit_mut(&mut self, f: &mut dyn FnMut(RelatedMut<'_>));
}

impl<R: RelationTarget> RelationTarget for Option<R> {
    fn visit(&self, f: &mut dyn FnMut(&dyn Translatable)) {
        if let Some(inner) = self {
            inner.visit(f);
        }
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(RelatedMut<'_>)) {
        if let Some(inner) = self {
            inner.visit_mut(f);
        }
    }
}

impl<R: RelationTarget> RelationTarget for Vec<R> {
    fn visit(&self, f: &mut dyn FnMut(&dyn Translatable)) {
        for item in self {
            item.visit(f);
        }
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(RelatedMut<'_>)) {
        for item in self {
            item.visit_mut(f);
        }
    }
}

impl<R: RelationTarget> RelationTarget for Box<R> {
    fn visit(&self, f: &mut dyn FnMut(&dyn Translatable)) {
        (**self).visit(f);
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(RelatedMut<'_>)) {
        (**self).visit_mut(f);
    }
}

impl<R: RelationTarget> RelationTarget for Rc<RefCell<R>> {
    fn visit(&self, f: &mut dyn FnMut(&dyn Translatable)) {
        if let Ok(inner) = self.try_borrow() {
            inner.visit(f);
        }
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(RelatedMut<'_>)) {
        let cell: &RefCell<R> = self;

        if let Ok(mut inner) = cell.try_borrow_mut() {
            inner.visit_mut(f);
            return;
        }

        f(RelatedMut::Busy {
            addr: cell.as_ptr().cast::<()>() as usize,
            type_tag: R::TYPE_TAG,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::{author, shared_author};

    #[test]
    fn borrowed_cell_reports_its_value_address() {
        let shared = shared_author(author(7, "Ann"));
        let mut handle = shared.clone();
        let guard = shared.borrow_mut();
        let expected = std::ptr::from_ref(&*guard).cast::<()>() as usize;

        let mut seen = None;
        handle.visit_mut(&mut |related| {
            if let RelatedMut::Busy { addr, type_tag } = related {
                seen = Some((addr, type_tag));
            }
        });

        assert_eq!(seen, Some((expected, Some("blog.author"))));
    }
}
