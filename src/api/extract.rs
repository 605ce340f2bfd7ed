use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::api::errors::ApiError;

/// JSON body that has passed its `validator` rules. Both a malformed body and a
/// failed rule are rejected with 400.
pub(crate) struct ValidatedJson<T>(pub(crate) T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        value.validate().map_err(|errors| ApiError::BadRequest(validation_message(&errors)))?;

        Ok(Self(value))
    }
}

/// Field messages joined in field order, falling back to validator's own text.
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();

    if messages.is_empty() {
        errors.to_string()
    } else {
        messages.join("; ")
    }
}
