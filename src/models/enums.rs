use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serde representation matches the stored string form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(DosageForm {
    Tablet => "tablet",
    Capsule => "capsule",
    Liquid => "liquid",
    Injection => "injection",
    Topical => "topical",
    Inhaler => "inhaler",
    Patch => "patch",
});

str_enum!(FrequencyType {
    Daily => "daily",
    TwiceDaily => "twice_daily",
    ThreeTimesDaily => "three_times_daily",
    FourTimesDaily => "four_times_daily",
    Weekly => "weekly",
    AsNeeded => "as_needed",
    Custom => "custom",
});

str_enum!(DoseStatus {
    Scheduled => "scheduled",
    Taken => "taken",
    Missed => "missed",
    Skipped => "skipped",
});
