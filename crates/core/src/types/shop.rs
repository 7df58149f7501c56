//! Shops and their opening hours.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::id::{OpeningHoursId, ShopId};
use super::validation::{ValidationErrors, require_text};

/// Maximum length of a shop name accepted by the API.
pub const SHOP_NAME_MAX_LEN: usize = 255;

/// A shop as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    /// Server-assigned creation date.
    pub created_at: NaiveDate,
    pub in_vacations: bool,
    #[serde(default)]
    pub nb_products: i64,
    #[serde(default)]
    pub nb_categories: Option<i64>,
    #[serde(default)]
    pub opening_hours: Vec<OpeningHours>,
}

/// Draft used to create or edit a shop.
///
/// `id` is absent for a new shop and required for an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalShop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ShopId>,
    pub name: String,
    pub in_vacations: bool,
    #[serde(default)]
    pub opening_hours: Vec<OpeningHours>,
}

impl From<Shop> for MinimalShop {
    fn from(shop: Shop) -> Self {
        Self {
            id: Some(shop.id),
            name: shop.name,
            in_vacations: shop.in_vacations,
            opening_hours: shop.opening_hours,
        }
    }
}

impl MinimalShop {
    /// Validate the draft before submission.
    ///
    /// Checks the name and every opening-hours slot. Slot errors are keyed
    /// `opening_hours.<index>`.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "name", &self.name);
        if self.name.chars().count() > SHOP_NAME_MAX_LEN {
            errors.add("name", "Name must be between 1 and 255 characters");
        }

        for (index, hours) in self.opening_hours.iter().enumerate() {
            let field = format!("opening_hours.{index}");
            if !(1..=7).contains(&hours.day) {
                errors.add(&field, "Day must be between 1 and 7");
            } else if hours.open_at >= hours.close_at {
                errors.add(&field, "Opening time must be before closing time");
            }
        }

        if let Some((_, second)) = first_overlap(&self.opening_hours) {
            errors.add(
                format!("opening_hours.{second}"),
                "Opening hours overlap on the same day",
            );
        }

        errors.into_result()
    }
}

/// One opening slot of a shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OpeningHoursId>,
    /// Day of week, 1 = Monday through 7 = Sunday.
    pub day: u8,
    #[serde(with = "wire_time")]
    pub open_at: NaiveTime,
    #[serde(with = "wire_time")]
    pub close_at: NaiveTime,
}

impl OpeningHours {
    /// Default slot offered when a new row is added to the form.
    #[must_use]
    pub fn default_slot() -> Self {
        Self {
            id: None,
            day: 1,
            open_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            close_at: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
        }
    }

    /// English name of the slot's day.
    #[must_use]
    pub fn day_name(&self) -> &'static str {
        day_name(self.day)
    }

    /// Whether two slots on the same day intersect.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.open_at < other.close_at && self.close_at > other.open_at
    }
}

/// English name for a 1-based day of week. Unknown values map to `"?"`.
#[must_use]
pub const fn day_name(day: u8) -> &'static str {
    match day {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "?",
    }
}

/// Index pair of the first two overlapping slots, if any.
#[must_use]
pub fn first_overlap(hours: &[OpeningHours]) -> Option<(usize, usize)> {
    hours.iter().enumerate().find_map(|(i, a)| {
        hours
            .iter()
            .enumerate()
            .skip(i + 1)
            .find(|(_, b)| a.overlaps(b))
            .map(|(j, _)| (i, j))
    })
}

/// `HH:MM:SS` on the wire; `HH:MM` is accepted on input.
mod wire_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time: {raw}")))
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
#[must_use]
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
