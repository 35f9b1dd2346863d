//! Caller-owned state of one address check, driven by discrete transitions.
//!
//! The session never talks to the geocoder itself. Query changes hand back a
//! [`FetchRequest`] which the caller schedules (usually through
//! [`SuggestionDebouncer`]); the outcome comes back as a [`SuggestionEvent`].
//! Every request carries a generation number so results for superseded input
//! are dropped.

mod debounce;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SuggestConfig;
use crate::geocoder::is_query_long_enough;
use crate::models::{AddressSuggestion, City};
use crate::zone::ContainmentEngine;

pub use debounce::SuggestionDebouncer;

/// A suggestion fetch the caller should perform
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub generation: u64,
    pub city: City,
    pub query: String,
}

/// Outcome of a scheduled fetch
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionEvent {
    Started {
        generation: u64,
    },
    Loaded {
        generation: u64,
        suggestions: Vec<AddressSuggestion>,
    },
    Failed {
        generation: u64,
        error: String,
    },
}

/// Confirmed delivery address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confirmation {
    pub city: City,
    pub zone: &'static str,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct CheckSession {
    city: City,
    query: String,
    suggestions: Vec<AddressSuggestion>,
    selected: Option<AddressSuggestion>,
    in_zone: Option<bool>,
    loading: bool,
    generation: u64,
    min_query_len: usize,
}

impl CheckSession {
    pub fn new(city: City, config: &SuggestConfig) -> Self {
        Self {
            city,
            query: String::new(),
            suggestions: Vec::new(),
            selected: None,
            in_zone: None,
            loading: false,
            generation: 0,
            min_query_len: config.min_query_len,
        }
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[AddressSuggestion] {
        &self.suggestions
    }

    pub fn selected(&self) -> Option<&AddressSuggestion> {
        self.selected.as_ref()
    }

    /// `None` until an address has been selected
    pub fn in_zone(&self) -> Option<bool> {
        self.in_zone
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// New input text. Clears any previous selection and verdict.
    ///
    /// Returns the fetch to schedule, or `None` when the text is too short
    /// (the suggestion list is cleared then).
    pub fn on_query_changed(&mut self, text: &str) -> Option<FetchRequest> {
        self.query = text.to_string();
        self.selected = None;
        self.in_zone = None;
        self.generation += 1;

        if !is_query_long_enough(text, self.min_query_len) {
            self.suggestions.clear();
            self.loading = false;
            return None;
        }

        Some(FetchRequest {
            generation: self.generation,
            city: self.city,
            query: text.to_string(),
        })
    }

    /// Apply a fetch outcome. Returns false when it belongs to superseded input.
    pub fn apply(&mut self, event: SuggestionEvent) -> bool {
        match event {
            SuggestionEvent::Started { generation } => {
                if generation != self.generation {
                    return false;
                }
                self.loading = true;
            }
            SuggestionEvent::Loaded {
                generation,
                suggestions,
            } => {
                if generation != self.generation {
                    debug!(
                        "Dropping stale suggestions (generation {} < {})",
                        generation, self.generation
                    );
                    return false;
                }
                self.suggestions = suggestions;
                self.loading = false;
            }
            SuggestionEvent::Failed { generation, error } => {
                if generation != self.generation {
                    return false;
                }
                warn!("Error fetching suggestions: {}", error);
                self.suggestions.clear();
                self.loading = false;
            }
        }
        true
    }

    /// Pick one of the current suggestions and evaluate it against the zone.
    ///
    /// Returns the verdict, or `None` if `index` is out of range.
    pub fn on_suggestion_selected(
        &mut self,
        index: usize,
        engine: &ContainmentEngine,
    ) -> Option<bool> {
        let suggestion = self.suggestions.get(index)?.clone();
        let inside = engine.is_inside(self.city, suggestion.coordinate);

        self.query = suggestion.name.clone();
        self.selected = Some(suggestion);
        self.suggestions.clear();
        self.in_zone = Some(inside);
        // Anything still in flight was for the text before selection
        self.generation += 1;
        self.loading = false;

        Some(inside)
    }

    /// Switch city and start over
    pub fn on_city_changed(&mut self, city: City) {
        self.city = city;
        self.query.clear();
        self.suggestions.clear();
        self.selected = None;
        self.in_zone = None;
        self.loading = false;
        self.generation += 1;
    }

    /// Confirm delivery, only possible for a selected address inside the zone
    pub fn confirm(&self) -> Option<Confirmation> {
        match (&self.selected, self.in_zone) {
            (Some(selected), Some(true)) => Some(Confirmation {
                city: self.city,
                zone: self.city.zone_name(),
                address: selected.name.clone(),
            }),
            _ => None,
        }
    }

    /// Prompt shown above the input
    pub fn prompt(&self) -> String {
        format!(
            "Введите ваш адрес в {}. Мы доставляем только в пределах {}.",
            self.city.locative_ru(),
            self.city.zone_name()
        )
    }

    /// Verdict line for the selected address, if any
    pub fn verdict_message(&self) -> Option<String> {
        let zone = self.city.zone_name();
        self.in_zone.map(|inside| {
            if inside {
                format!("Отлично! Мы доставляем по этому адресу. Адрес находится в пределах {zone}")
            } else {
                format!(
                    "К сожалению, мы не доставляем по этому адресу. Адрес находится за пределами {zone}"
                )
            }
        })
    }
}
