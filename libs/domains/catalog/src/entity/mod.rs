//! Sea-ORM entities for the relational course store.

pub mod course;
pub mod user_course;
