use futures::future::{self, BoxFuture, FutureExt};

use super::{GeocodeError, Geocoder};
use crate::models::{AddressSuggestion, City};

/// In-memory geocoder answering from a fixed list of addresses.
///
/// Matches are case-insensitive substring matches on the address name.
#[derive(Debug, Clone)]
pub struct StaticGeocoder {
    entries: Vec<(City, AddressSuggestion)>,
    limit: usize,
}

impl StaticGeocoder {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    pub fn with_address(mut self, city: City, suggestion: AddressSuggestion) -> Self {
        self.entries.push((city, suggestion));
        self
    }

    fn lookup(&self, city: City, query: &str) -> Vec<AddressSuggestion> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|(c, s)| *c == city && s.name.to_lowercase().contains(&needle))
            .map(|(_, s)| s.clone())
            .take(self.limit)
            .collect()
    }
}

impl Geocoder for StaticGeocoder {
    fn suggest<'a>(
        &'a self,
        city: City,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<AddressSuggestion>, GeocodeError>> {
        future::ready(Ok(self.lookup(city, query))).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    #[tokio::test]
    async fn test_filters_by_city_and_text() {
        let geocoder = StaticGeocoder::new(5)
            .with_address(
                City::Moscow,
                AddressSuggestion::new(
                    "Москва, Тверская улица, 1",
                    Coordinate::new(55.757, 37.613),
                ),
            )
            .with_address(
                City::SaintPetersburg,
                AddressSuggestion::new(
                    "Санкт-Петербург, Тверская улица, 1",
                    Coordinate::new(59.946, 30.383),
                ),
            );

        let found = geocoder.suggest(City::Moscow, "тверская").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].coordinate, Coordinate::new(55.757, 37.613));

        let found = geocoder.suggest(City::Moscow, "Невский").await.unwrap();
        assert!(found.is_empty());
    }
}
