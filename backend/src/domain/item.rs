//! Item aggregate and its validated fields.
//!
//! An item is created once, listed, and deleted by identifier; it is never
//! updated in place. Every field is a newtype so adapters cannot hand the
//! coordinator an empty title or a negative cost.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum owner identifier length in characters.
pub const OWNER_ID_MAX: usize = 128;
/// Maximum title length in characters.
pub const TITLE_MAX: usize = 256;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX: usize = 4096;

/// Validation failures for item fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemValidationError {
    /// The item identifier is not a UUID.
    #[error("item id must be a UUID")]
    InvalidId,
    /// The owner identifier is blank.
    #[error("owner id must not be empty")]
    EmptyOwner,
    /// The owner identifier exceeds [`OWNER_ID_MAX`].
    #[error("owner id must be at most {max} characters")]
    OwnerTooLong { max: usize },
    /// The title is blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// The title exceeds [`TITLE_MAX`].
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    /// The description is blank.
    #[error("description must not be empty")]
    EmptyDescription,
    /// The description exceeds [`DESCRIPTION_MAX`].
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    /// The cost is not a non-negative decimal with at most two fraction digits.
    #[error("cost must be a non-negative decimal with at most two fraction digits")]
    InvalidCost,
    /// The cost does not fit in the minor-unit representation.
    #[error("cost is out of range")]
    CostOutOfRange,
}

/// Store-assigned item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Wrap a UUID read from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = ItemValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| ItemValidationError::InvalidId)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn bounded_text(
    raw: impl Into<String>,
    max: usize,
    empty: ItemValidationError,
    too_long: ItemValidationError,
) -> Result<String, ItemValidationError> {
    let value = raw.into();
    if value.trim().is_empty() {
        return Err(empty);
    }
    if value.chars().count() > max {
        return Err(too_long);
    }
    Ok(value)
}

macro_rules! text_field {
    ($(#[$meta:meta])* $name:ident, $max:expr, $empty:expr, $too_long:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap the raw value.
            pub fn new(raw: impl Into<String>) -> Result<Self, ItemValidationError> {
                bounded_text(raw, $max, $empty, $too_long).map(Self)
            }

            /// Borrow the value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_field!(
    /// Free-form owner identifier; items reference owners without enforcement.
    OwnerId,
    OWNER_ID_MAX,
    ItemValidationError::EmptyOwner,
    ItemValidationError::OwnerTooLong { max: OWNER_ID_MAX }
);

text_field!(
    /// Item title.
    ItemTitle,
    TITLE_MAX,
    ItemValidationError::EmptyTitle,
    ItemValidationError::TitleTooLong { max: TITLE_MAX }
);

text_field!(
    /// Item description.
    ItemDescription,
    DESCRIPTION_MAX,
    ItemValidationError::EmptyDescription,
    ItemValidationError::DescriptionTooLong {
        max: DESCRIPTION_MAX
    }
);

/// Non-negative monetary amount held in minor units (cents).
///
/// Parses from decimal text with at most two fraction digits and renders with
/// exactly two.
///
/// ```
/// use shop_items::domain::Cost;
///
/// let cost: Cost = "10.5".parse().expect("valid cost");
/// assert_eq!(cost.cents(), 1050);
/// assert_eq!(cost.to_string(), "10.50");
/// assert!("-1".parse::<Cost>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cost(i64);

impl Cost {
    /// Wrap a minor-unit amount read from storage.
    pub fn from_cents(cents: i64) -> Result<Self, ItemValidationError> {
        if cents < 0 {
            return Err(ItemValidationError::CostOutOfRange);
        }
        Ok(Self(cents))
    }

    /// Amount in minor units.
    pub fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Cost {
    type Err = ItemValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) if !fraction.is_empty() => (whole, fraction),
            Some(_) => return Err(ItemValidationError::InvalidCost),
            None => (trimmed, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || fraction.len() > 2 || !all_digits(fraction)
        {
            return Err(ItemValidationError::InvalidCost);
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| ItemValidationError::CostOutOfRange)?;
        let fraction_cents = match fraction.len() {
            0 => Ok(0),
            1 => fraction.parse::<i64>().map(|tenths| tenths * 10),
            _ => fraction.parse::<i64>(),
        }
        .map_err(|_| ItemValidationError::InvalidCost)?;

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction_cents))
            .map(Self)
            .ok_or(ItemValidationError::CostOutOfRange)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Item fields supplied by a caller; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Owning user.
    pub owner_id: OwnerId,
    /// Title.
    pub title: ItemTitle,
    /// Description.
    pub description: ItemDescription,
    /// Cost.
    pub cost: Cost,
}

/// A persisted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Store-assigned identifier.
    pub id: ItemId,
    /// Owning user.
    pub owner_id: OwnerId,
    /// Title.
    pub title: ItemTitle,
    /// Description.
    pub description: ItemDescription,
    /// Cost.
    pub cost: Cost,
    /// Creation instant assigned by the store.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Materialise a stored item from a new item and its assigned identity.
    pub fn from_new(new_item: NewItem, id: ItemId, created_at: DateTime<Utc>) -> Self {
        let NewItem {
            owner_id,
            title,
            description,
            cost,
        } = new_item;
        Self {
            id,
            owner_id,
            title,
            description,
            cost,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("10", 1000)]
    #[case("10.5", 1050)]
    #[case("10.50", 1050)]
    #[case("0.01", 1)]
    #[case(" 7.25 ", 725)]
    #[case("0", 0)]
    #[case("42", 4200)]
    fn parses_valid_costs(#[case] raw: &str, #[case] cents: i64) {
        let cost: Cost = raw.parse().expect("valid cost");
        assert_eq!(cost.cents(), cents);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("-1")]
    #[case("+1")]
    #[case("1e3")]
    #[case("10.")]
    #[case(".5")]
    #[case("1.234")]
    #[case("1.2.3")]
    fn rejects_malformed_costs(#[case] raw: &str) {
        assert_eq!(raw.parse::<Cost>(), Err(ItemValidationError::InvalidCost));
    }

    #[rstest]
    #[case("92233720368547759")]
    #[case("92233720368547758.08")]
    #[case("99999999999999999999")]
    fn rejects_overflowing_cost(#[case] raw: &str) {
        assert_eq!(raw.parse::<Cost>(), Err(ItemValidationError::CostOutOfRange));
    }

    #[rstest]
    fn accepts_largest_representable_cost() {
        let cost: Cost = "92233720368547758.07".parse().expect("fits in cents");
        assert_eq!(cost.cents(), i64::MAX);
    }

    #[rstest]
    #[case(1000, "10.00")]
    #[case(1050, "10.50")]
    #[case(5, "0.05")]
    fn renders_two_fraction_digits(#[case] cents: i64, #[case] expected: &str) {
        let cost = Cost::from_cents(cents).expect("non-negative");
        assert_eq!(cost.to_string(), expected);
    }

    #[rstest]
    fn rejects_negative_stored_cents() {
        assert_eq!(Cost::from_cents(-1), Err(ItemValidationError::CostOutOfRange));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_text_fields_are_rejected(#[case] raw: &str) {
        assert_eq!(OwnerId::new(raw), Err(ItemValidationError::EmptyOwner));
        assert_eq!(ItemTitle::new(raw), Err(ItemValidationError::EmptyTitle));
        assert_eq!(
            ItemDescription::new(raw),
            Err(ItemValidationError::EmptyDescription)
        );
    }

    #[rstest]
    fn overlong_title_is_rejected() {
        let raw = "t".repeat(TITLE_MAX + 1);
        assert_eq!(
            ItemTitle::new(raw),
            Err(ItemValidationError::TitleTooLong { max: TITLE_MAX })
        );
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn item_id_requires_uuid(#[case] raw: &str) {
        assert_eq!(raw.parse::<ItemId>(), Err(ItemValidationError::InvalidId));
    }

    #[rstest]
    fn item_id_round_trips_through_display() {
        let id = ItemId::random();
        assert_eq!(id.to_string().parse::<ItemId>(), Ok(id));
    }
}
