pub mod document;
pub mod knowledge;
pub mod web;
