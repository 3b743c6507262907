pub mod venue;

pub use venue::{Venue, VenueId, VenueRegistry, VenueWrapper};
