// Two tiers: public (no auth) and protected (JWT under /api). Handlers stay
// thin; all rules live in the services.
pub mod protected;
pub mod public;
