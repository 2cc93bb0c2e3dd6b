//! Everything that talks to the outside world: the card API and the
//! on-disk snapshot.

pub mod cache;
pub mod cards_api;
