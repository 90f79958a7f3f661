//! Domain errors raised by the calendar core.

/// Error type for calendar conversions and
/// user-supplied calendar input.
#[derive(
  Debug, Clone, PartialEq, Eq, thiserror::Error,
)]
pub enum CalendarError {
  /// A date that does not exist in its
  /// calendar or falls outside the
  /// supported range.
  #[error("invalid date: {reason}")]
  InvalidDate {
    /// What was wrong with the input.
    reason: String
  },

  /// A string that is not a `YYYYMMDD`
  /// Jalali day identifier.
  #[error("invalid day identifier `{raw}`")]
  InvalidDayId {
    /// The rejected input.
    raw: String
  },

  /// A wall-clock time that is not
  /// `HH:mm`.
  #[error("invalid time `{raw}`, expected HH:mm")]
  InvalidTime {
    /// The rejected input.
    raw: String
  },

  /// A required draft field was left
  /// empty.
  #[error("{field} is required")]
  MissingField {
    /// Name of the missing field.
    field: &'static str
  }
}

impl CalendarError {
  pub(crate) fn invalid_date(
    reason: impl Into<String>
  ) -> Self {
    CalendarError::InvalidDate {
      reason: reason.into()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalid_date_message() {
    let e = CalendarError::invalid_date(
      "jalali month 13 is outside 1..=12"
    );
    assert_eq!(
      e.to_string(),
      "invalid date: jalali month 13 is \
       outside 1..=12"
    );
  }

  #[test]
  fn invalid_day_id_message() {
    let e = CalendarError::InvalidDayId {
      raw: "1404-07".to_string()
    };
    assert_eq!(
      e.to_string(),
      "invalid day identifier `1404-07`"
    );
  }

  #[test]
  fn missing_field_message() {
    let e = CalendarError::MissingField {
      field: "title"
    };
    assert_eq!(e.to_string(), "title is required");
  }

  #[test]
  fn error_is_send_and_sync() {
    fn assert_impl<
      T: Send + Sync + std::error::Error
    >() {
    }
    assert_impl::<CalendarError>();
  }
}
