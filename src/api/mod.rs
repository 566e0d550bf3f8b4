/// Yelp v2 API layer: credentials, OAuth1 signing, typed params, HTTP, pagination.
pub mod client;
pub mod credentials;
pub mod errors;
pub mod paginate;
pub mod params;
pub mod signer;

pub use client::{DEFAULT_API_BASE, YelpClient};
pub use credentials::{CredentialVars, Credentials};
pub use errors::YelpError;
pub use paginate::DEFAULT_MAX_PAGES;
pub use params::{BusinessQuery, Location, MAX_RADIUS_METERS, SearchQuery, SortMode};
