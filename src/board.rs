//! Rendering collaborator for the game board.
//!
//! The client never draws anything itself. Everything visible goes through
//! the [`Board`] trait: pieces placed by the server, invite links for a new
//! game, and user-facing messages such as the winner announcement.
//!
//! [`TextBoard`] is a ready-made implementation that keeps the grid in memory
//! and renders it as text, suitable for terminals and tests.

use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::protocol::GameToken;

/// Number of columns on a standard Connect Four board.
pub const COLUMNS: usize = 7;

/// Number of rows on a standard Connect Four board.
pub const ROWS: usize = 6;

/// Shareable links for a freshly created game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteLinks {
    /// Link for the second player, e.g. `?join=abc123`.
    pub join_href: String,
    /// Link for spectators, e.g. `?watch=xyz789`.
    pub watch_href: String,
}

impl InviteLinks {
    /// Build the invite links from the tokens in the server's `init` event.
    pub fn new(join: &GameToken, watch: &GameToken) -> Self {
        Self {
            join_href: format!("?join={join}"),
            watch_href: format!("?watch={watch}"),
        }
    }
}

/// Something that can show the game to the user.
///
/// Methods take `&self` because the board is shared between the session task
/// and the delayed message tasks; implementations use interior mutability.
pub trait Board: Send + Sync + 'static {
    /// Draw a piece for `player` at `column`/`row` (row 0 is the bottom).
    fn play_move(&self, player: &str, column: u32, row: u32);

    /// Point the two invite links at the given targets.
    fn set_invite_links(&self, links: &InviteLinks);

    /// Show an alert-style message.
    fn show_message(&self, message: &str);
}

/// In-memory board that renders as text.
///
/// Pieces are drawn with the upper-cased first letter of the player id, so
/// `"red"` shows as `R` and `"yellow"` as `Y`.
///
/// ```
/// use connect_four_client::{Board, TextBoard};
///
/// let board = TextBoard::new();
/// board.play_move("red", 3, 0);
/// assert!(board.render().ends_with(". . . R . . .\n"));
/// ```
#[derive(Debug, Default)]
pub struct TextBoard {
    inner: Mutex<TextBoardState>,
}

#[derive(Debug, Default)]
struct TextBoardState {
    /// Indexed `[row][column]`, row 0 at the bottom.
    cells: [[Option<char>; COLUMNS]; ROWS],
    links: Option<InviteLinks>,
    messages: Vec<String>,
}

impl TextBoard {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TextBoardState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The piece at `column`/`row`, if any.
    pub fn cell(&self, column: usize, row: usize) -> Option<char> {
        self.state()
            .cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .flatten()
    }

    /// The invite links, once the server has announced a new game.
    pub fn invite_links(&self) -> Option<InviteLinks> {
        self.state().links.clone()
    }

    /// Every message shown so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.state().messages.clone()
    }

    /// Render the grid top row first, one line per row.
    pub fn render(&self) -> String {
        let state = self.state();
        let mut out = String::new();
        for row in state.cells.iter().rev() {
            let line: Vec<String> = row
                .iter()
                .map(|cell| cell.unwrap_or('.').to_string())
                .collect();
            let _ = writeln!(out, "{}", line.join(" "));
        }
        out
    }
}

impl Board for TextBoard {
    fn play_move(&self, player: &str, column: u32, row: u32) {
        let glyph = player
            .chars()
            .next()
            .map_or('?', |c| c.to_ascii_uppercase());
        let mut state = self.state();
        let cell = match (usize::try_from(row), usize::try_from(column)) {
            (Ok(r), Ok(c)) => state.cells.get_mut(r).and_then(|cells| cells.get_mut(c)),
            _ => None,
        };
        match cell {
            Some(cell) => *cell = Some(glyph),
            None => warn!(column, row, "move outside the board, not drawn"),
        }
    }

    fn set_invite_links(&self, links: &InviteLinks) {
        self.state().links = Some(links.clone());
    }

    fn show_message(&self, message: &str) {
        self.state().messages.push(message.to_string());
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
    fn invite_links_use_query_form() {
        let links = InviteLinks::new(&"j1".to_string(), &"w1".to_string());
        assert_eq!(links.join_href, "?join=j1");
        assert_eq!(links.watch_href, "?watch=w1");
    }

    #[test]
    fn empty_board_renders_dots() {
        let board = TextBoard::new();
        let rendered = board.render();
        assert_eq!(rendered.lines().count(), ROWS);
        assert!(rendered.lines().all(|l| l == ". . . . . . ."));
    }

    #[test]
    fn pieces_stack_from_the_bottom() {
        let board = TextBoard::new();
        board.play_move("red", 3, 0);
        board.play_move("yellow", 3, 1);
        board.play_move("red", 0, 0);

        assert_eq!(board.cell(3, 0), Some('R'));
        assert_eq!(board.cell(3, 1), Some('Y'));
        assert_eq!(board.cell(0, 0), Some('R'));
        assert_eq!(board.cell(6, 5), None);

        let rendered = board.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[ROWS - 1], "R . . R . . .");
        assert_eq!(lines[ROWS - 2], ". . . Y . . .");
    }

    #[test]
    fn out_of_bounds_move_is_not_drawn() {
        let board = TextBoard::new();
        board.play_move("red", 7, 0);
        board.play_move("red", 0, 6);
        assert!(board.render().lines().all(|l| l == ". . . . . . ."));
    }

    #[test]
    fn records_links_and_messages() {
        let board = TextBoard::new();
        assert!(board.invite_links().is_none());
        board.set_invite_links(&InviteLinks::new(&"a".into(), &"b".into()));
        board.show_message("hello");
        assert_eq!(board.invite_links().unwrap().watch_href, "?watch=b");
        assert_eq!(board.messages(), vec!["hello".to_string()]);
    }
}
