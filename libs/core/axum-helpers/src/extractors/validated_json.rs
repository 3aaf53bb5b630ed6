//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has already passed `validator` checks.
///
/// Decoding failures become `400 {"message": ...}`; validation failures
/// become `400 {"<field>": "<message>", ...}`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateCategory {
///     #[validate(length(min = 1, max = 100))]
///     name: String,
/// }
///
/// async fn create(ValidatedJson(input): ValidatedJson<CreateCategory>) -> String {
///     input.name
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
