pub mod endpoints;
pub mod error;
pub mod requester;
pub mod router;
