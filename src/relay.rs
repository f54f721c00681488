//! Click-to-move relay.
//!
//! Turns a click on the rendered board into an optional `play` request. The
//! server is the sole judge of legality; no bounds or turn checks happen here.

use tracing::{debug, warn};

use crate::protocol::ClientMessage;
use crate::role::Role;

/// The element a click landed on, reduced to its column data attribute.
///
/// Board cells carry a column; decoration around the grid does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickTarget {
    /// Raw value of the element's column attribute, if it has one.
    pub column: Option<String>,
}

impl ClickTarget {
    /// A click on a cell whose column attribute holds `value`.
    pub fn column(value: impl Into<String>) -> Self {
        Self {
            column: Some(value.into()),
        }
    }

    /// A click on an element with no column attribute.
    pub fn decoration() -> Self {
        Self::default()
    }
}

/// Build the `play` request for a click, if one should be sent.
///
/// Returns `None` when the client is spectating, when the target carries no
/// column, or when the column is not a base-10 integer. Negative and
/// out-of-range columns are sent as is.
pub fn relay_click(role: &Role, target: &ClickTarget) -> Option<ClientMessage> {
    if role.is_spectator() {
        debug!("ignoring click: spectators cannot play");
        return None;
    }

    let raw = target.column.as_deref()?;
    match raw.trim().parse::<i64>() {
        Ok(column) => Some(ClientMessage::Play { column }),
        Err(e) => {
            warn!(raw = %raw, "ignoring click with unparsable column: {e}");
            None
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

    #[test]
    fn cell_click_produces_play() {
        let msg = relay_click(&Role::Create, &ClickTarget::column("3")).unwrap();
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"play","column":3}"#
        );
    }

    #[test]
    fn joiner_may_play() {
        let msg = relay_click(&Role::Join("abc".into()), &ClickTarget::column("0"));
        assert_eq!(msg, Some(ClientMessage::Play { column: 0 }));
    }

    #[test]
    fn decoration_click_is_ignored() {
        assert_eq!(relay_click(&Role::Create, &ClickTarget::decoration()), None);
    }

    #[test]
    fn spectator_clicks_are_ignored() {
        let role = Role::Watch("xyz".into());
        for target in [
            ClickTarget::column("3"),
            ClickTarget::column("0"),
            ClickTarget::decoration(),
        ] {
            assert_eq!(relay_click(&role, &target), None);
        }
    }

    #[test]
    fn unparsable_columns_are_ignored() {
        for raw in ["", "x", "1.5", "3px"] {
            assert_eq!(relay_click(&Role::Create, &ClickTarget::column(raw)), None);
        }
    }

    #[test]
    fn off_board_columns_are_still_sent() {
        let msg = relay_click(&Role::Create, &ClickTarget::column("-1")).unwrap();
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"play","column":-1}"#
        );
        assert_eq!(
            relay_click(&Role::Create, &ClickTarget::column("7")),
            Some(ClientMessage::Play { column: 7 })
        );
    }

    #[test]
    fn whitespace_around_column_is_tolerated() {
        assert_eq!(
            relay_click(&Role::Create, &ClickTarget::column(" 6 ")),
            Some(ClientMessage::Play { column: 6 })
        );
    }
}
