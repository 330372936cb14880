///
/// translatable_entity
///
/// Declare a struct together with its entity model and the
/// `EntityKind`, `FieldValues`, `Translatable` and `RelationTarget` impls
/// the overlay engine needs.
///
/// ```ignore
/// translatable_entity! {
///     #[derive(Clone, Debug)]
///     pub struct Article {
///         pub id: u64,
///         pub title: String,
///         pub status: String,
///         pub author: Option<Rc<RefCell<Author>>>,
///     }
///
///     tag: "blog.article",
///     id: id,
///     fields { id: Uint, title: Text, status: Choice["draft", "live"] }
///     translatable: auto,
///     relations { author -> "blog.author": One }
/// }
/// ```
///
/// `translatable` is `auto`, `none`, or an explicit list such as
/// `[title, body]`. Relation fields hold any `RelationTarget`.
///

#[macro_export]
macro_rules! translatable_entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $entity:ident {
            $( $(#[$field_meta:meta])* $field_vis:vis $struct_field:ident : $struct_ty:ty ),* $(,)?
        }

        tag: $tag:literal,
        id: $id:ident,

        fields { $( $field:ident : $kind:ident $([ $($choice:literal),* $(,)? ])? ),* $(,)? }

        translatable: $translatable:tt,

        $(relations { $( $relation:ident -> $target:literal : $cardinality:ident ),* $(,)? })?
    ) => {
        $(#[$meta])*
        $vis struct $entity {
            $( $(#[$field_meta])* $field_vis $struct_field : $struct_ty ),*
        }

        impl $crate::traits::EntityKind for $entity {
            const MODEL: &'static $crate::model::EntityModel = &$crate::model::EntityModel {
                type_tag: $tag,
                primary_key: stringify!($id),
                fields: &[
                    $(
                        $crate::model::FieldModel::new(
                            stringify!($field),
                            $crate::translatable_entity!(@kind $kind $([ $($choice),* ])?),
                        )
                    ),*
                ],
                relations: &[
                    $($(
                        $crate::model::RelationModel::new(
                            stringify!($relation),
                            $target,
                            $crate::model::Cardinality::$cardinality,
                        )
                    ),*)?
                ],
                translatable: $crate::translatable_entity!(@translatable $translatable),
            };
        }

        impl $crate::traits::FieldValues for $entity {
            fn get_value(&self, field: &str) -> Option<$crate::value::Value> {
                match field {
                    $( stringify!($field) => Some($crate::traits::FieldValue::to_value(&self.$field)), )*
                    _ => None,
                }
            }
        }

        impl $crate::traits::Translatable for $entity {
            fn model(&self) -> &'static $crate::model::EntityModel {
                <Self as $crate::traits::EntityKind>::MODEL
            }

            fn identity(&self) -> String {
                ::std::string::ToString::to_string(&self.$id)
            }

            fn text(&self, field: &str) -> Option<&str> {
                match field {
                    $( stringify!($field) => $crate::traits::FieldValue::as_text(&self.$field), )*
                    _ => None,
                }
            }

            fn accepts_text(&self, field: &str) -> bool {
                match field {
                    $( stringify!($field) => $crate::traits::FieldValue::accepts_text(&self.$field), )*
                    _ => false,
                }
            }

            #[allow(unused_variables)]
            fn set_text(&mut self, field: &str, text: String) -> bool {
                match field {
                    $( stringify!($field) => $crate::traits::FieldValue::assign_text(&mut self.$field, text), )*
                    _ => false,
                }
            }

            #[allow(unused_variables)]
            fn visit_related(
                &self,
                relation: &str,
                f: &mut dyn FnMut(&dyn $crate::traits::Translatable),
            ) -> bool {
                match relation {
                    $($(
                        stringify!($relation) => {
                            $crate::traits::RelationTarget::visit(&self.$relation, f);
                            true
                        }
                    )*)?
                    _ => false,
                }
            }

            #[allow(unused_variables)]
            fn visit_related_mut(
                &mut self,
                relation: &str,
                f: &mut dyn FnMut($crate::traits::RelatedMut<'_>),
            ) -> bool {
                match relation {
                    $($(
                        stringify!($relation) => {
                            $crate::traits::RelationTarget::visit_mut(&mut self.$relation, f);
                            true
                        }
                    )*)?
                    _ => false,
                }
            }
        }

        impl $crate::traits::RelationTarget for $entity {
            const TYPE_TAG: Option<&'static str> = Some($tag);

            fn visit(&self, f: &mut dyn FnMut(&dyn $crate::traits::Translatable)) {
                f(self);
            }

            fn visit_mut(&mut self, f: &mut dyn FnMut($crate::traits::RelatedMut<'_>)) {
                f($crate::traits::RelatedMut::Node(self));
            }
        }
    };

    // =============================================================
    // Field kinds
    // =============================================================
    (@kind Choice [ $($choice:literal),* ]) => {
        $crate::model::FieldKind::Choice(&[ $($choice),* ])
    };

    (@kind $kind:ident) => {
        $crate::model::FieldKind::$kind
    };

    // =============================================================
    // Translatable field sets
    // =============================================================
    (@translatable auto) => {
        $crate::model::TranslatableFields::Auto
    };

    (@translatable none) => {
        $crate::model::TranslatableFields::None
    };

    (@translatable [ $($field:ident),* $(,)? ]) => {
        $crate::model::TranslatableFields::Explicit(&[ $( stringify!($field) ),* ])
    };
}
