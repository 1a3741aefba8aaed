//! DTOs for decoding Graph API JSON responses.
//!
//! Responses are decoded into these transport DTOs first and mapped into
//! domain values in one pass, so malformed identifiers surface as decode
//! errors rather than panics further in.

use serde::Deserialize;

use crate::domain::{AccessGrant, AccessToken, FacebookUserId, ManagedPage, PageId, PostId};

#[derive(Debug, Deserialize)]
pub(super) struct AccessTokenDto {
    pub(super) access_token: String,
    #[serde(default)]
    pub(super) expires_in: Option<u64>,
}

impl AccessTokenDto {
    pub(super) fn into_grant(self) -> Result<AccessGrant, String> {
        if self.access_token.trim().is_empty() {
            return Err("token response carried an empty access token".to_owned());
        }
        Ok(AccessGrant {
            access_token: AccessToken::new(self.access_token),
            expires_in: self.expires_in,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ObjectIdDto {
    pub(super) id: String,
}

impl ObjectIdDto {
    pub(super) fn into_user_id(self) -> Result<FacebookUserId, String> {
        FacebookUserId::new(self.id).map_err(|err| err.to_string())
    }

    pub(super) fn into_post_id(self) -> Result<PostId, String> {
        PostId::new(self.id).map_err(|err| err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountsDto {
    #[serde(default)]
    pub(super) data: Vec<AccountDto>,
    #[serde(default)]
    pub(super) paging: Option<PagingDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PagingDto {
    #[serde(default)]
    pub(super) next: Option<String>,
}

impl AccountsDto {
    /// Split one result page into managed pages and the next page URL.
    pub(super) fn into_parts(self) -> Result<(Vec<ManagedPage>, Option<String>), String> {
        let pages = self
            .data
            .into_iter()
            .map(|account| {
                PageId::new(account.id)
                    .map(|id| ManagedPage {
                        id,
                        name: account.name,
                    })
                    .map_err(|err| err.to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let next = self.paging.and_then(|paging| paging.next);
        Ok((pages, next))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PageAccessTokenDto {
    #[serde(default)]
    pub(super) access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteResultDto {
    #[serde(default)]
    pub(super) success: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphErrorEnvelopeDto {
    pub(super) error: GraphErrorDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphErrorDto {
    #[serde(default)]
    pub(super) message: String,
    #[serde(default)]
    pub(super) code: Option<i64>,
}

/// Provider error message from a Graph API error body, if it has one.
pub(super) fn graph_error_message(body: &[u8]) -> Option<String> {
    let envelope: GraphErrorEnvelopeDto = serde_json::from_slice(body).ok()?;
    let GraphErrorDto { message, code } = envelope.error;
    Some(match code {
        Some(code) => format!("{message} (code {code})"),
        None => message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_page_maps_ids_and_next_link() {
        let body = r#"{
            "data": [
                { "id": "111", "name": "Soup Kitchen", "category": "Restaurant" },
                { "id": "222", "name": "Noodle Bar" }
            ],
            "paging": { "next": "https://graph.test/v19.0/me/accounts?after=abc" }
        }"#;
        let dto: AccountsDto = serde_json::from_str(body).expect("decode");
        let (pages, next) = dto.into_parts().expect("valid pages");

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].id.as_str(), "111");
        assert_eq!(pages[1].name, "Noodle Bar");
        assert_eq!(
            next.as_deref(),
            Some("https://graph.test/v19.0/me/accounts?after=abc")
        );
    }

    #[test]
    fn blank_page_id_is_a_decode_error() {
        let dto: AccountsDto =
            serde_json::from_str(r#"{ "data": [ { "id": " " } ] }"#).expect("decode");
        assert!(dto.into_parts().is_err());
    }

    #[test]
    fn extracts_graph_error_message() {
        let body = br#"{"error":{"message":"Unsupported get request.","type":"GraphMethodException","code":100}}"#;
        assert_eq!(
            graph_error_message(body).as_deref(),
            Some("Unsupported get request. (code 100)")
        );
        assert!(graph_error_message(b"<html>oops</html>").is_none());
    }

    #[test]
    fn token_response_without_expiry_is_accepted() {
        let dto: AccessTokenDto =
            serde_json::from_str(r#"{ "access_token": "EAAB", "token_type": "bearer" }"#)
                .expect("decode");
        let grant = dto.into_grant().expect("grant");
        assert_eq!(grant.access_token.expose(), "EAAB");
        assert_eq!(grant.expires_in, None);
    }
}
