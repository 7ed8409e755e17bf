pub mod catalog;
pub mod comfort;
pub mod filter;
pub mod open_meteo;
pub mod recommender;
pub mod weather_cache;
pub mod weather_source;
