pub mod city;
pub mod preference;
pub mod trail;
pub mod weather;

pub use city::{City, Coordinates};
pub use preference::{CloudCoverBand, PreferenceProfile, ScoringWeights, TimeRange};
pub use trail::{Difficulty, Trail, TrailParams};
pub use weather::{ComfortBand, DailyComfort, WeatherObservation};
