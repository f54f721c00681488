//! Client role selection from page query parameters.
//!
//! A player's role is fixed for the lifetime of a connection. It is derived
//! once from the `join` and `watch` query parameters of the page URL:
//!
//! | Query            | Role                     |
//! |------------------|--------------------------|
//! | `?join=<token>`  | [`Role::Join`]           |
//! | `?watch=<token>` | [`Role::Watch`]          |
//! | neither          | [`Role::Create`]         |
//!
//! When both are present `join` is checked first and wins.

use url::{form_urlencoded, Url};

use crate::error::Result;
use crate::protocol::{ClientMessage, GameToken};

/// Query parameter naming a game to join as the second player.
pub const JOIN_PARAM: &str = "join";

/// Query parameter naming a game to spectate.
pub const WATCH_PARAM: &str = "watch";

/// How this client takes part in a game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Role {
    /// First player; asks the server to start a new game.
    #[default]
    Create,
    /// Second player joining the game identified by the token.
    Join(GameToken),
    /// Spectator of the game identified by the token.
    Watch(GameToken),
}

impl Role {
    /// Derive the role from a query string.
    ///
    /// The leading `?` is optional and values are percent-decoded. A parameter
    /// with an empty value still counts as present.
    ///
    /// ```
    /// use connect_four_client::Role;
    ///
    /// assert_eq!(Role::from_query("?join=abc123"), Role::Join("abc123".into()));
    /// assert_eq!(Role::from_query("watch=xyz789"), Role::Watch("xyz789".into()));
    /// assert_eq!(Role::from_query(""), Role::Create);
    /// ```
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let first = |key: &str| {
            params
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        };

        if let Some(token) = first(JOIN_PARAM) {
            Self::Join(token)
        } else if let Some(token) = first(WATCH_PARAM) {
            Self::Watch(token)
        } else {
            Self::Create
        }
    }

    /// Derive the role from a full page URL.
    ///
    /// # Errors
    ///
    /// Returns [`GameClientError::InvalidUrl`](crate::GameClientError::InvalidUrl)
    /// if `url` cannot be parsed.
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        Ok(Self::from_query(url.query().unwrap_or_default()))
    }

    /// Returns `true` for spectators, who may not submit moves.
    pub fn is_spectator(&self) -> bool {
        matches!(self, Self::Watch(_))
    }

    /// The role announcement sent once the connection is ready.
    pub fn init_message(&self) -> ClientMessage {
        match self {
            Self::Create => ClientMessage::Init {
                join: None,
                watch: None,
            },
            Self::Join(token) => ClientMessage::Init {
                join: Some(token.clone()),
                watch: None,
            },
            Self::Watch(token) => ClientMessage::Init {
                join: None,
                watch: Some(token.clone()),
            },
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn init_json(query: &str) -> String {
        serde_json::to_string(&Role::from_query(query).init_message()).unwrap()
    }

    #[test]
    fn join_param_produces_join_init() {
        assert_eq!(init_json("?join=abc123"), r#"{"type":"init","join":"abc123"}"#);
    }

    #[test]
    fn watch_param_produces_watch_init() {
        assert_eq!(
            init_json("?watch=xyz789"),
            r#"{"type":"init","watch":"xyz789"}"#
        );
    }

    #[test]
    fn no_params_produces_bare_init() {
        assert_eq!(init_json(""), r#"{"type":"init"}"#);
        assert_eq!(init_json("?"), r#"{"type":"init"}"#);
        assert_eq!(init_json("?foo=bar"), r#"{"type":"init"}"#);
    }

    #[test]
    fn join_takes_precedence_over_watch() {
        assert_eq!(
            Role::from_query("?watch=w1&join=j1"),
            Role::Join("j1".into())
        );
    }

    #[test]
    fn first_occurrence_wins() {
        assert_eq!(Role::from_query("join=a&join=b"), Role::Join("a".into()));
    }

    #[test]
    fn empty_value_counts_as_present() {
        assert_eq!(Role::from_query("?join="), Role::Join(String::new()));
        assert_eq!(Role::from_query("?watch"), Role::Watch(String::new()));
    }

    #[test]
    fn values_are_percent_decoded() {
        assert_eq!(
            Role::from_query("?watch=a%2Bb+c"),
            Role::Watch("a+b c".into())
        );
    }

    #[test]
    fn from_url_reads_query() {
        let role = Role::from_url("http://localhost:8000/?watch=xyz789").unwrap();
        assert_eq!(role, Role::Watch("xyz789".into()));
        assert!(role.is_spectator());

        let role = Role::from_url("http://localhost:8000/").unwrap();
        assert_eq!(role, Role::Create);
        assert!(!role.is_spectator());
    }

    #[test]
    fn from_url_rejects_garbage() {
        let err = Role::from_url("not a url").unwrap_err();
        assert!(matches!(err, crate::GameClientError::InvalidUrl(_)));
    }
}
