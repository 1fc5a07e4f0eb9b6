//! The club site's collections.
//!
//! One schema per page-level table, plus a typed row for code that prefers
//! structs over field maps. Column names are the store's snake_case names.

mod rows;

use crate::collection::Direction;
use crate::schema::{FieldSpec, InputKind, Schema};

pub use rows::{
    Announcement, AttendanceRecord, BlogPost, Club, Event, FeedbackEntry, GalleryItem,
    Registration,
};

pub const EXPERIENCE_LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

pub fn events() -> Schema {
    Schema::new("events", "event")
        .field(FieldSpec::required("title", InputKind::Text))
        .field(FieldSpec::required("date", InputKind::Date))
        .field(FieldSpec::required("time", InputKind::Time))
        .field(FieldSpec::optional("duration", InputKind::Number))
        .field(FieldSpec::required("location", InputKind::Text))
        .field(FieldSpec::optional("description", InputKind::TextArea))
        .ordered_by("date", Direction::Ascending)
}

pub fn clubs() -> Schema {
    Schema::new("clubs", "club")
        .field(FieldSpec::required("name", InputKind::Text))
        .field(FieldSpec::required("category", InputKind::Text))
        .field(FieldSpec::optional("member_count", InputKind::Number))
        .field(FieldSpec::optional("description", InputKind::TextArea))
}

pub fn announcements() -> Schema {
    Schema::new("announcements", "announcement")
        .field(FieldSpec::required("title", InputKind::Text))
        .field(FieldSpec::required("content", InputKind::TextArea))
        .field(FieldSpec::optional("date", InputKind::Date))
        .ordered_by("date", Direction::Descending)
}

pub fn gallery() -> Schema {
    Schema::new("gallery", "gallery item")
        .field(FieldSpec::required("title", InputKind::Text))
        .field(FieldSpec::required("image_url", InputKind::Url))
        .field(FieldSpec::optional("description", InputKind::TextArea))
        .ordered_by("id", Direction::Ascending)
}

pub fn blog_posts() -> Schema {
    Schema::new("blog_posts", "blog post")
        .field(FieldSpec::required("title", InputKind::Text))
        .field(FieldSpec::required("content", InputKind::TextArea))
        .field(FieldSpec::required("author", InputKind::Text))
        .field(FieldSpec::optional("image_url", InputKind::Url))
        .ordered_by("id", Direction::Ascending)
}

pub fn feedback() -> Schema {
    Schema::new("feedback", "feedback")
        .field(FieldSpec::required("name", InputKind::Text))
        .field(FieldSpec::required("email", InputKind::Email))
        .field(FieldSpec::required("event_name", InputKind::Text))
        .field(FieldSpec::required("rating", InputKind::Number))
        .field(FieldSpec::optional("comments", InputKind::TextArea))
        .field(FieldSpec::optional("would_recommend", InputKind::Checkbox))
}

pub fn attendance() -> Schema {
    Schema::new("attendance", "attendee")
        .field(FieldSpec::required("event_name", InputKind::Text))
        .field(FieldSpec::required("attendee_name", InputKind::Text))
        .field(FieldSpec::required("date", InputKind::Date))
        .ordered_by("date", Direction::Ascending)
}

pub fn registrations() -> Schema {
    Schema::new("registrations", "registration")
        .field(FieldSpec::required("full_name", InputKind::Text))
        .field(FieldSpec::required("email", InputKind::Email))
        .field(FieldSpec::required("student_id", InputKind::Text))
        .field(FieldSpec::required("club_name", InputKind::Text))
        .field(FieldSpec::optional("reason", InputKind::TextArea))
        .field(FieldSpec::optional(
            "experience",
            InputKind::select(EXPERIENCE_LEVELS),
        ))
}

/// Every schema, in navigation order.
pub fn all() -> Vec<Schema> {
    vec![
        events(),
        clubs(),
        announcements(),
        gallery(),
        blog_posts(),
        feedback(),
        attendance(),
        registrations(),
    ]
}

/// Look a schema up by collection name.
pub fn schema(collection: &str) -> Option<Schema> {
    all().into_iter().find(|s| s.collection() == collection)
}
