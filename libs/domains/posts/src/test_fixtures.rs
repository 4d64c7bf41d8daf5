use chrono::{DateTime, Utc};

use crate::models::{Blog, Event, Post, PostProps};

fn timestamp() -> DateTime<Utc> {
    "2026-03-01T12:00:00Z".parse().unwrap()
}

fn props(id: &str, author_id: &str, is_published: bool) -> PostProps {
    PostProps {
        id: id.to_string(),
        title: "A".to_string(),
        sub_title: None,
        content: "B".to_string(),
        author_id: author_id.to_string(),
        feature_img: vec![],
        tags: vec!["x".to_string()],
        is_published,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn blog(id: &str, author_id: &str, is_published: bool) -> Post {
    Post::Blog(Blog {
        props: props(id, author_id, is_published),
    })
}

pub fn event(id: &str, author_id: &str, is_published: bool) -> Post {
    Post::Event(Event {
        props: props(id, author_id, is_published),
        event_start: "2026-04-01T18:00:00Z".parse().unwrap(),
        event_end: "2026-04-01T21:00:00Z".parse().unwrap(),
        location: None,
    })
}
