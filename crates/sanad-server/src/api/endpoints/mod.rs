pub mod documents;
pub mod extraction;
pub mod health;
pub mod pages;
