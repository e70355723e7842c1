// Two tiers: public (read-only) and protected (admin gate applied in server.rs)
pub mod protected;
pub mod public;
