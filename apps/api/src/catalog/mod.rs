// Card catalog: filename decoding, one-time seeding, storage and listing.

pub mod handlers;
pub mod naming;
pub mod seeder;
pub mod store;
