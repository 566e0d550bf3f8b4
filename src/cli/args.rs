/// CLI argument definitions via clap derive.
use clap::{Parser, Subcommand, ValueEnum};

use crate::api::{
    BusinessQuery, DEFAULT_API_BASE, DEFAULT_MAX_PAGES, Location, MAX_RADIUS_METERS, SearchQuery,
    SortMode, YelpError,
};

/// yelp: search the Yelp v2 API from the command line.
///
/// Credentials are read from YELP_CONSUMER_KEY, YELP_CONSUMER_SECRET,
/// YELP_TOKEN and YELP_TOKEN_SECRET.
#[derive(Debug, Parser)]
#[command(
    name = "yelp",
    about = "Search the Yelp v2 local-business API from the CLI",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_name = "FORMAT", default_value = "pretty")]
    pub output: OutputFormat,

    /// Output businesses as JSON, one per line (shorthand for --output ndjson).
    #[arg(long, global = true, conflicts_with = "output")]
    pub json: bool,

    /// Omit table headers (useful for awk/cut processing).
    #[arg(long, global = true)]
    pub no_header: bool,

    /// Log requests and timings to stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    /// API scheme and host.
    #[arg(
        long,
        global = true,
        value_name = "URL",
        env = "YELP_API_BASE",
        default_value = DEFAULT_API_BASE
    )]
    pub api_base: String,

    /// HTTP timeout per request, in seconds.
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        env = "YELP_TIMEOUT",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON of the whole response.
    #[default]
    Pretty,
    /// The whole response as one line of JSON.
    Compact,
    /// One business per line, no enclosing array.
    Ndjson,
    /// Aligned table of name, rating, reviews, city and phone.
    Table,
}

/// All subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for businesses.
    Search(SearchArgs),
    /// Look up a single business by id.
    Business(BusinessArgs),
}

/// Arguments for `yelp search`.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    // General search parameters
    /// Search term (e.g. "food", "restaurants"). Without a term everything is searched.
    #[arg(long, help_heading = "General Search Parameters")]
    pub term: Option<String>,

    /// Number of business results to return (page size with --depaginate).
    #[arg(
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        help_heading = "General Search Parameters"
    )]
    pub limit: Option<u32>,

    /// Offset the list of returned business results by this amount.
    #[arg(
        long,
        value_name = "N",
        conflicts_with = "depaginate",
        help_heading = "General Search Parameters"
    )]
    pub offset: Option<u32>,

    /// Sort mode: 0=Best matched (default), 1=Distance, 2=Highest Rated.
    /// Sort by distance needs a location or geographic search.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = clap::value_parser!(u8).range(0..=2),
        help_heading = "General Search Parameters"
    )]
    pub sort: Option<u8>,

    /// Comma-delimited category identifiers, e.g. 'bars,french'.
    #[arg(long = "category_filter", value_name = "CATEGORIES", help_heading = "General Search Parameters")]
    pub category_filter: Option<String>,

    /// Search radius in meters (max 40000). Too large may yield AREA_TOO_LARGE.
    #[arg(
        long = "radius_filter",
        value_name = "METERS",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RADIUS_METERS)),
        help_heading = "General Search Parameters"
    )]
    pub radius_filter: Option<u32>,

    /// Only return businesses with deals.
    #[arg(long = "deals_filter", help_heading = "General Search Parameters")]
    pub deals_filter: bool,

    // Locale parameters
    /// ISO 3166-1 alpha-2 country code used when parsing the location (GB, not UK).
    #[arg(long, value_name = "CC", help_heading = "Locale Parameters")]
    pub cc: Option<String>,

    /// ISO 639 language code (default en). Reviews in this language are shown.
    #[arg(long, value_name = "LANG", help_heading = "Locale Parameters")]
    pub lang: Option<String>,

    /// Filter business reviews by --lang.
    #[arg(long = "lang_filter", help_heading = "Locale Parameters")]
    pub lang_filter: bool,

    // Location: exactly one of bounds, ll or location
    /// Bounding box: sw_latitude,sw_longitude|ne_latitude,ne_longitude
    #[arg(
        long,
        value_name = "BOX",
        conflicts_with_all = ["ll", "location"],
        help_heading = "Location"
    )]
    pub bounds: Option<String>,

    /// Coordinate: latitude,longitude[,accuracy,altitude,altitude_accuracy]
    #[arg(long, value_name = "COORD", conflicts_with = "location", help_heading = "Location")]
    pub ll: Option<String>,

    /// Address, neighborhood, city, state or zip, optional country.
    #[arg(long, value_name = "ADDRESS", help_heading = "Location")]
    pub location: Option<String>,

    /// latitude,longitude hint for geocoding --location.
    #[arg(long, value_name = "LAT,LNG", requires = "location", help_heading = "Location")]
    pub cll: Option<String>,

    // Local flags
    /// Fetch every page (offset 0, 20, 40, ...) until an empty page.
    #[arg(long, help_heading = "Local Flags")]
    pub depaginate: bool,

    /// Stop depaginating after this many pages (0 = no limit).
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_MAX_PAGES,
        requires = "depaginate",
        help_heading = "Local Flags"
    )]
    pub max_pages: u32,
}

impl SearchArgs {
    /// Convert flags to a typed query. A blank location flag counts as absent;
    /// other empty values are dropped later by [`SearchQuery::to_params`].
    ///
    /// # Errors
    ///
    /// Returns `YelpError::InvalidParameter` for an unknown sort mode.
    pub fn to_query(&self) -> Result<SearchQuery, YelpError> {
        let location = match (
            given(self.bounds.as_deref()),
            given(self.ll.as_deref()),
            given(self.location.as_deref()),
        ) {
            (Some(bounds), _, _) => Some(Location::Bounds(bounds)),
            (None, Some(ll), _) => Some(Location::Coordinate(ll)),
            (None, None, Some(location)) => Some(Location::Address {
                location,
                cll: self.cll.clone(),
            }),
            (None, None, None) => None,
        };

        Ok(SearchQuery {
            term: self.term.clone(),
            limit: self.limit,
            offset: self.offset,
            sort: self.sort.map(SortMode::try_from).transpose()?,
            category_filter: self.category_filter.clone(),
            radius_filter: self.radius_filter,
            deals_filter: self.deals_filter,
            cc: self.cc.clone(),
            lang: self.lang.clone(),
            lang_filter: self.lang_filter,
            location,
        })
    }

    /// The depagination ceiling, `None` when disabled.
    #[must_use]
    pub fn page_ceiling(&self) -> Option<u32> {
        (self.max_pages > 0).then_some(self.max_pages)
    }
}

fn given(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_owned)
}

/// Arguments for `yelp business`.
#[derive(Debug, Parser)]
pub struct BusinessArgs {
    /// Business id, e.g. "yelp-san-francisco".
    pub id: String,

    /// ISO 3166-1 alpha-2 country code.
    #[arg(long, value_name = "CC")]
    pub cc: Option<String>,

    /// ISO 639 language code.
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Filter business reviews by --lang.
    #[arg(long = "lang_filter")]
    pub lang_filter: bool,
}

impl BusinessArgs {
    #[must_use]
    pub fn to_query(&self) -> BusinessQuery {
        BusinessQuery {
            cc: self.cc.clone(),
            lang: self.lang.clone(),
            lang_filter: self.lang_filter,
        }
    }
}
