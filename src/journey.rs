use crate::errors::InputError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAY_QUALITY: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayRating {
    Excellent,
    Good,
    Okay,
    Poor,
    Terrible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

pub fn support_message(rating: DayRating) -> &'static str {
    match rating {
        DayRating::Excellent => "What a wonderful day! Your positive energy is inspiring. Keep up the great work!",
        DayRating::Good => "You're doing great! It's lovely to see you taking care of yourself and staying positive.",
        DayRating::Okay => "Every day doesn't have to be perfect. You're doing your best, and that's enough.",
        DayRating::Poor => "It's okay to have difficult days. Remember, you're stronger than you think and tomorrow is a new opportunity.",
        DayRating::Terrible => "I'm sorry you're having such a tough time. Please be gentle with yourself and consider reaching out for support.",
    }
}

/// A validated daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckIn {
    pub rating: DayRating,
    pub weather: Weather,
    pub sleep: SleepQuality,
    pub day_quality: u8,
}

impl CheckIn {
    pub fn new(
        rating: Option<DayRating>,
        weather: Option<Weather>,
        sleep: Option<SleepQuality>,
        day_quality: Option<i64>,
    ) -> Result<Self, InputError> {
        let (Some(rating), Some(weather), Some(sleep)) = (rating, weather, sleep) else {
            return Err(InputError::IncompleteJourney);
        };
        let day_quality = match day_quality {
            None => DEFAULT_DAY_QUALITY,
            Some(value) => u8::try_from(value)
                .ok()
                .filter(|quality| (1..=10).contains(quality))
                .ok_or(InputError::DayQualityOutOfRange(value))?,
        };
        Ok(Self {
            rating,
            weather,
            sleep,
            day_quality,
        })
    }
}
