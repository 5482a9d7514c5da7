//! Keyset pagination over `(created_at, id)`.

use chirp_common::{AppError, AppResult, clock};
use sea_orm::{ColumnTrait, Condition, prelude::DateTimeWithTimeZone};

/// Position in a reverse-chronological feed.
///
/// Encoded on the wire as `"<createdAtMillis>_<id>"`. Rows strictly older than
/// the cursor (by `created_at`, then `id`) come next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTimeWithTimeZone,
    pub id: String,
}

impl Cursor {
    /// Cursor pointing just past the given row.
    #[must_use]
    pub fn after(created_at: DateTimeWithTimeZone, id: &str) -> Self {
        Self {
            created_at,
            id: id.to_string(),
        }
    }

    /// Parse a cursor token.
    pub fn parse(token: &str) -> AppResult<Self> {
        let invalid = || AppError::BadRequest(format!("Invalid cursor: {token}"));

        let (millis, id) = token.split_once('_').ok_or_else(invalid)?;
        let millis: i64 = millis.parse().map_err(|_| invalid())?;
        if id.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            created_at: clock::from_millis(millis),
            id: id.to_string(),
        })
    }

    /// Parse an optional cursor token; an empty string means "from the top".
    pub fn parse_opt(token: Option<&str>) -> AppResult<Option<Self>> {
        match token {
            Some(t) if !t.is_empty() => Self::parse(t).map(Some),
            _ => Ok(None),
        }
    }

    /// Encode into the wire token.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}_{}", self.created_at.timestamp_millis(), self.id)
    }

    /// Filter selecting rows that sort after this cursor in
    /// `created_at desc, id desc` order.
    pub fn older_than<C: ColumnTrait>(&self, created_at: C, id: C) -> Condition {
        Condition::any().add(created_at.lt(self.created_at)).add(
            Condition::all()
                .add(created_at.eq(self.created_at))
                .add(id.lt(self.id.as_str())),
        )
    }
}
