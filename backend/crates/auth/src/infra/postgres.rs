//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use sqlx::PgPool;
use std::time::Duration;

use crate::domain::entity::{
    token::Token,
    user::{NewUser, User},
};
use crate::domain::repository::{PermissionRepository, TokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, permission::Permissions, token_plaintext::TokenPlaintext,
    token_scope::TokenScope, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired tokens of every scope
    pub async fn delete_expired_tokens(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM tokens WHERE expiry <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(tokens_deleted = deleted, "Cleaned up expired tokens");

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn get_for_token(
        &self,
        scope: TokenScope,
        plaintext: &TokenPlaintext,
    ) -> AuthResult<Option<User>> {
        let hash = plaintext.hash();

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                users.id,
                users.created_at,
                users.name,
                users.email,
                users.password_hash,
                users.activated,
                users.admin,
                users.version
            FROM users
            INNER JOIN tokens
                ON users.id = tokens.user_id
            WHERE tokens.hash = $1
                AND tokens.scope = $2
                AND tokens.expiry > $3
            "#,
        )
        .bind(hash.as_slice())
        .bind(scope.code())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn get_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                created_at,
                name,
                email,
                password_hash,
                activated,
                admin,
                version
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn insert(&self, user: NewUser) -> AuthResult<User> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                name,
                email,
                password_hash,
                activated,
                admin
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at, name, email, password_hash, activated, admin, version
            "#,
        )
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.activated)
        .bind(user.admin)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row.into_user(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Permission Repository Implementation
// ============================================================================

impl PermissionRepository for PgAuthRepository {
    async fn get_all_for_user(&self, user_id: UserId) -> AuthResult<Permissions> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permissions.code
            FROM permissions
            INNER JOIN users_permissions
                ON users_permissions.permission_id = permissions.id
            WHERE users_permissions.user_id = $1
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(codes.into_iter().collect())
    }

    async fn add_for_user(&self, user_id: UserId, codes: &[&str]) -> AuthResult<()> {
        let mut codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        codes.sort();
        codes.dedup();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO users_permissions (user_id, permission_id)
            SELECT $1, permissions.id
            FROM permissions
            WHERE permissions.code = ANY($2)
            "#,
        )
        .bind(user_id.get())
        .bind(&codes)
        .execute(&mut *tx)
        .await;

        let granted = match result {
            Ok(done) => done.rows_affected(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AuthError::DuplicatePermission);
            }
            Err(e) => return Err(e.into()),
        };

        // Dropping the transaction rolls back a partial grant
        ensure_all_granted(&codes, granted)?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, granted, "Permissions granted");
        Ok(())
    }
}

/// Codes with no row in `permissions` insert nothing
fn ensure_all_granted(codes: &[String], granted: u64) -> AuthResult<()> {
    if granted == codes.len() as u64 {
        Ok(())
    } else {
        Err(AuthError::Internal(format!(
            "unknown permission code in {codes:?}"
        )))
    }
}

// ============================================================================
// Token Repository Implementation
// ============================================================================

impl TokenRepository for PgAuthRepository {
    async fn new_token(
        &self,
        user_id: UserId,
        ttl: Duration,
        scope: TokenScope,
        origin_ip: Option<String>,
    ) -> AuthResult<Token> {
        let token = Token::generate(user_id, ttl, scope, origin_ip)?;
        TokenRepository::insert(self, &token).await?;
        Ok(token)
    }

    async fn insert(&self, token: &Token) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tokens (
                hash,
                user_id,
                expiry,
                scope,
                origin_ip
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(token.hash.as_slice())
        .bind(token.user_id.get())
        .bind(token.expiry)
        .bind(token.scope.code())
        .bind(token.origin_ip.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_all_for_user(
        &self,
        scope: TokenScope,
        user_id: UserId,
        origin_ip: Option<&str>,
    ) -> AuthResult<u64> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM tokens
            WHERE scope = $1
                AND user_id = $2
                AND ($3::text IS NULL OR origin_ip = $3)
            "#,
        )
        .bind(scope.code())
        .bind(user_id.get())
        .bind(origin_ip)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    created_at: DateTime<Utc>,
    name: String,
    email: String,
    password_hash: String,
    activated: bool,
    admin: bool,
    version: i32,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password_hash: {}", e)))?;

        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email: Email::from_db(self.email),
            password_hash,
            activated: self.activated,
            admin: self.admin,
            version: self.version,
            created_at: self.created_at,
        })
    }
}
