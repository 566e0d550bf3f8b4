/// Typed query parameters for the search and business endpoints.
///
/// Unset options never reach the wire: the API treats an absent parameter
/// differently from an empty one, so `None`, empty strings and `false`
/// flags are all dropped by [`SearchQuery::to_params`].
use super::errors::YelpError;
use super::signer::QueryParams;

/// Largest search radius the API accepts, in meters (25 miles).
pub const MAX_RADIUS_METERS: u32 = 40_000;

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    BestMatched,
    Distance,
    HighestRated,
}

impl SortMode {
    fn code(self) -> u8 {
        match self {
            Self::BestMatched => 0,
            Self::Distance => 1,
            Self::HighestRated => 2,
        }
    }
}

impl TryFrom<u8> for SortMode {
    type Error = YelpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::BestMatched),
            1 => Ok(Self::Distance),
            2 => Ok(Self::HighestRated),
            other => Err(YelpError::InvalidParameter {
                name: "sort",
                reason: format!("{other} is not one of 0, 1, 2"),
            }),
        }
    }
}

/// The three mutually exclusive ways to say where to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `sw_latitude,sw_longitude|ne_latitude,ne_longitude`
    Bounds(String),
    /// `latitude,longitude[,accuracy,altitude,altitude_accuracy]`
    Coordinate(String),
    /// Free-form address, with an optional `latitude,longitude` geocoder hint.
    Address { location: String, cll: Option<String> },
}

/// Every option the search endpoint understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: Option<SortMode>,
    pub category_filter: Option<String>,
    pub radius_filter: Option<u32>,
    pub deals_filter: bool,
    pub cc: Option<String>,
    pub lang: Option<String>,
    pub lang_filter: bool,
    pub location: Option<Location>,
}

impl SearchQuery {
    /// Check values the API would otherwise reject, before any request is made.
    ///
    /// # Errors
    ///
    /// Returns `YelpError::InvalidParameter` naming the offending option.
    pub fn validate(&self) -> Result<(), YelpError> {
        if self.limit == Some(0) {
            return Err(YelpError::InvalidParameter {
                name: "limit",
                reason: "must be at least 1".to_owned(),
            });
        }
        if let Some(radius) = self.radius_filter {
            if radius == 0 || radius > MAX_RADIUS_METERS {
                return Err(YelpError::InvalidParameter {
                    name: "radius_filter",
                    reason: format!("{radius} is outside 1..={MAX_RADIUS_METERS} meters"),
                });
            }
        }
        if let Some(cc) = non_empty(self.cc.as_deref()) {
            check_country_code(cc)?;
        }
        match &self.location {
            Some(Location::Bounds(bounds)) => check_bounds(bounds),
            Some(Location::Coordinate(ll)) => check_coordinates("ll", ll, 2, 5),
            Some(Location::Address { location, cll }) => {
                if location.trim().is_empty() {
                    return Err(YelpError::InvalidParameter {
                        name: "location",
                        reason: "must not be empty".to_owned(),
                    });
                }
                match non_empty(cll.as_deref()) {
                    Some(cll) => check_coordinates("cll", cll, 2, 2),
                    None => Ok(()),
                }
            }
            None => Ok(()),
        }
    }

    /// Render the set options as ordered query pairs.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut out = Params::default();
        out.text("term", self.term.as_deref());
        out.number("limit", self.limit);
        out.number("offset", self.offset);
        out.number("sort", self.sort.map(SortMode::code));
        out.text("category_filter", self.category_filter.as_deref());
        out.number("radius_filter", self.radius_filter);
        out.flag("deals_filter", self.deals_filter);
        out.text("cc", self.cc.as_deref());
        out.text("lang", self.lang.as_deref());
        out.flag("lang_filter", self.lang_filter);
        match &self.location {
            Some(Location::Bounds(bounds)) => out.text("bounds", Some(bounds.as_str())),
            Some(Location::Coordinate(ll)) => out.text("ll", Some(ll.as_str())),
            Some(Location::Address { location, cll }) => {
                out.text("location", Some(location.as_str()));
                out.text("cll", cll.as_deref());
            }
            None => {}
        }
        out.0
    }

    /// Copy of this query positioned at one page of results.
    #[must_use]
    pub fn page(&self, limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..self.clone()
        }
    }
}

/// Locale options for a single-business lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessQuery {
    pub cc: Option<String>,
    pub lang: Option<String>,
    pub lang_filter: bool,
}

impl BusinessQuery {
    /// # Errors
    ///
    /// Returns `YelpError::InvalidParameter` for a malformed country code.
    pub fn validate(&self) -> Result<(), YelpError> {
        match non_empty(self.cc.as_deref()) {
            Some(cc) => check_country_code(cc),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut out = Params::default();
        out.text("cc", self.cc.as_deref());
        out.text("lang", self.lang.as_deref());
        out.flag("lang_filter", self.lang_filter);
        out.0
    }
}

#[derive(Default)]
struct Params(QueryParams);

impl Params {
    /// Blank values are skipped; others are sent as given.
    fn text(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.0.push((key.to_owned(), v.to_owned()));
        }
    }

    fn number<N: ToString>(&mut self, key: &str, value: Option<N>) {
        if let Some(v) = value {
            self.0.push((key.to_owned(), v.to_string()));
        }
    }

    fn flag(&mut self, key: &str, value: bool) {
        if value {
            self.0.push((key.to_owned(), "true".to_owned()));
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_country_code(cc: &str) -> Result<(), YelpError> {
    if cc.len() == 2 && cc.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(YelpError::InvalidParameter {
            name: "cc",
            reason: format!("'{cc}' is not an ISO 3166-1 alpha-2 code"),
        })
    }
}

/// `value` must be `min..=max` comma-separated numbers.
fn check_coordinates(
    name: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), YelpError> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let numeric = parts.iter().all(|p| p.parse::<f64>().is_ok());
    if numeric && (min..=max).contains(&parts.len()) {
        Ok(())
    } else {
        Err(YelpError::InvalidParameter {
            name,
            reason: format!(
                "'{value}' must be {min} to {max} comma-separated numbers"
            ),
        })
    }
}

fn check_bounds(bounds: &str) -> Result<(), YelpError> {
    let corners: Vec<&str> = bounds.split('|').collect();
    let ok = corners.len() == 2
        && corners
            .iter()
            .all(|c| check_coordinates("bounds", c, 2, 2).is_ok());
    if ok {
        Ok(())
    } else {
        Err(YelpError::InvalidParameter {
            name: "bounds",
            reason: format!("'{bounds}' must be sw_lat,sw_lng|ne_lat,ne_lng"),
        })
    }
}
