use sqlx::PgPool;
use uuid::Uuid;

use crate::core::config::SeedAccount;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeedOutcome {
    Created,
    Updated,
    Unchanged,
}

pub(crate) async fn ensure_seed_accounts(state: &AppState) -> anyhow::Result<()> {
    let accounts = &state.settings().seed().accounts;
    if accounts.is_empty() {
        tracing::info!("No staff accounts configured; professors and TAs must be seeded");
        return Ok(());
    }

    for account in accounts {
        let outcome = ensure_account(state.db(), account).await?;
        tracing::info!(
            email = %account.email,
            role = account.role.as_str(),
            outcome = ?outcome,
            "Seed account checked"
        );
    }

    Ok(())
}

pub(crate) async fn ensure_account(
    pool: &PgPool,
    account: &SeedAccount,
) -> anyhow::Result<SeedOutcome> {
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_email(pool, &account.email).await? {
        let password_matches =
            security::verify_password(&account.password, &user.hashed_password).unwrap_or(false);
        if password_matches && user.role == account.role && user.is_verified {
            return Ok(SeedOutcome::Unchanged);
        }

        let hashed_password = if password_matches {
            user.hashed_password
        } else {
            security::hash_password(&account.password)?
        };
        repositories::users::apply_seed(pool, user.id, &hashed_password, account.role, now)
            .await?;
        return Ok(SeedOutcome::Updated);
    }

    let hashed_password = security::hash_password(&account.password)?;
    repositories::users::create(
        pool,
        repositories::users::CreateUser {
            id: Uuid::new_v4(),
            username: &account.username,
            email: &account.email,
            hashed_password,
            role: account.role,
            verification_code: None,
            is_verified: true,
            created_at: now,
        },
    )
    .await?;

    Ok(SeedOutcome::Created)
}
