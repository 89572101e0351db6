// Two tiers: public (no auth) and pets (bearer token, see middleware::auth)
pub mod pets;
pub mod public;
