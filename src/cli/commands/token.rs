use clap::Args;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::model::Role;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Caller id")]
    pub user: Uuid,

    #[arg(long, default_value = "user", help = "Caller role: admin or user")]
    pub role: Role,

    #[arg(long = "pet", help = "Owned pet id (repeatable)")]
    pub pets: Vec<Uuid>,

    #[arg(long, help = "Validity in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs) -> anyhow::Result<()> {
    let security = &config::config().security;
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);

    let claims = Claims::new(args.user, args.role, args.pets, hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    println!("{}", token);
    Ok(())
}
