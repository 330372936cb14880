use crate::{config::OverlayConfig, db::registry::Registry, traits::EntityKind};
use std::{cell::RefCell, rc::Rc};

crate::translatable_entity! {
    #[derive(Clone, Debug, Default)]
    pub struct Article {
        pub id: u64,
        pub title: String,
        pub body: Option<String>,
        pub status: String,
        pub views: u64,
        pub author: Option<Rc<RefCell<Author>>>,
        pub tags: Vec<Tag>,
        pub comments: Vec<Comment>,
    }

    tag: "blog.article",
    id: id,

    fields {
        id: Uint,
        title: Text,
        body: LongText,
        status: Choice["draft", "live"],
        views: Uint,
    }

    translatable: auto,

    relations {
        author -> "blog.author": One,
        tags -> "blog.tag": Many,
        comments -> "blog.comment": Many,
    }
}

crate::translatable_entity! {
    #[derive(Clone, Debug, Default)]
    pub struct Author {
        pub id: u64,
        pub name: String,
        pub bio: Option<String>,
        pub email: String,
        pub articles: Vec<Rc<RefCell<Article>>>,
    }

    tag: "blog.author",
    id: id,

    fields {
        id: Uint,
        name: Text,
        bio: LongText,
        email: Email,
    }

    translatable: auto,

    relations {
        articles -> "blog.article": Many,
    }
}

crate::translatable_entity! {
    #[derive(Clone, Debug, Default)]
    pub struct Tag {
        pub id: u64,
        pub label: String,
        pub slug: String,
    }

    tag: "blog.tag",
    id: id,

    fields {
        id: Uint,
        label: Text,
        slug: Text,
    }

    translatable: [label],
}

crate::translatable_entity! {
    #[derive(Clone, Debug, Default)]
    pub struct Comment {
        pub id: u64,
        pub message: String,
        pub author: Option<Rc<RefCell<Author>>>,
    }

    tag: "blog.comment",
    id: id,

    fields {
        id: Uint,
        message: Text,
    }

    translatable: none,

    relations {
        author -> "blog.author": One,
    }
}

#[must_use]
pub fn article(id: u64, title: &str) -> Article {
    Article {
        id,
        title: title.to_string(),
        status: "draft".to_string(),
        ..Article::default()
    }
}

#[must_use]
pub fn author(id: u64, name: &str) -> Author {
    Author {
        id,
        name: name.to_string(),
        email: format!("author{id}@example.com"),
        ..Author::default()
    }
}

#[must_use]
pub fn tag(id: u64, label: &str) -> Tag {
    Tag {
        id,
        label: label.to_string(),
        slug: label.to_ascii_lowercase(),
    }
}

#[must_use]
pub fn comment(id: u64, message: &str) -> Comment {
    Comment {
        id,
        message: message.to_string(),
        author: None,
    }
}

#[must_use]
pub fn shared_author(author: Author) -> Rc<RefCell<Author>> {
    Rc::new(RefCell::new(author))
}

/// Registry holding every fixture entity.
#[must_use]
pub fn registry() -> Registry {
    let mut registry = Registry::new();

    for model in [Article::MODEL, Author::MODEL, Tag::MODEL, Comment::MODEL] {
        registry
            .register(model)
            .expect("fixture model should register");
    }

    registry
}

/// Languages `en` (base), `fr` and `de`.
#[must_use]
pub fn config() -> OverlayConfig {
    OverlayConfig::new("en", &["en", "fr", "de"]).expect("fixture config should build")
}
