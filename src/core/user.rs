//! User account management.

use crate::{
    core::{auth, optional_text, required_text},
    entities::{Order, Session, User, order, session, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{info, instrument};

/// Role given to accounts that do not specify one.
pub const DEFAULT_ROLE: &str = "cliente";

/// Body of a user create, update or sign-up request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    /// Display name
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    /// Login email
    pub email: Option<String>,
    /// Plain-text password, hashed before storage
    pub password: Option<String>,
    /// Contact phone
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    /// Delivery address
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    /// Role name
    #[serde(rename = "rol")]
    pub role: Option<String>,
}

async fn ensure_email_free<C>(db: &C, email: &str, except: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = User::find().filter(user::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(user::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::conflict(format!("Email {email} is already registered")));
    }
    Ok(())
}

/// Finds a user by exact email.
pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all users ordered by id.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one user.
///
/// # Errors
/// Returns `UserNotFound` if no user has this id.
pub async fn get_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Creates a user with a hashed password.
///
/// # Errors
/// Returns `Validation` if the name, email or password is missing and
/// `Conflict` if the email is already registered.
#[instrument(skip(db, input))]
pub async fn create_user(db: &DatabaseConnection, input: UserInput) -> Result<user::Model> {
    let name = required_text(input.name, "nombre")?;
    let email = required_text(input.email, "email")?;
    let password = input
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::validation("Missing required field: password"))?;

    ensure_email_free(db, &email, None).await?;

    let created = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        password_hash: Set(auth::hash_password(&password)),
        phone: Set(optional_text(input.phone)),
        address: Set(optional_text(input.address)),
        role: Set(optional_text(input.role).unwrap_or_else(|| DEFAULT_ROLE.to_string())),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created user {}", created.id);
    Ok(created)
}

/// Updates the fields present in `input`; the password is rehashed only when
/// a non-empty one is given.
///
/// # Errors
/// Returns `UserNotFound`, `Validation` for a blank name or email, or
/// `Conflict` if the new email belongs to another user.
#[instrument(skip(db, input))]
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    input: UserInput,
) -> Result<user::Model> {
    let existing = get_user(db, user_id).await?;
    let mut account: user::ActiveModel = existing.into();

    if input.name.is_some() {
        account.name = Set(required_text(input.name, "nombre")?);
    }
    if input.email.is_some() {
        let email = required_text(input.email, "email")?;
        ensure_email_free(db, &email, Some(user_id)).await?;
        account.email = Set(email);
    }
    if let Some(password) = input.password.filter(|p| !p.is_empty()) {
        account.password_hash = Set(auth::hash_password(&password));
    }
    if input.phone.is_some() {
        account.phone = Set(optional_text(input.phone));
    }
    if input.address.is_some() {
        account.address = Set(optional_text(input.address));
    }
    if let Some(role) = optional_text(input.role) {
        account.role = Set(role);
    }

    let updated = account.update(db).await?;
    info!("Updated user {}", user_id);
    Ok(updated)
}

/// Deletes a user, closing their sessions and detaching their orders.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    Session::delete_many()
        .filter(session::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    Order::update_many()
        .col_expr(order::Column::UserId, Expr::value(Option::<i64>::None))
        .filter(order::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Deleted user {}", user_id);
    Ok(())
}
