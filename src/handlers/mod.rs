//! One handler per subcommand. Handlers read their JSON inputs, call into
//! the library and hand back a serializable result.

pub mod attribute_handlers;
pub mod input;
pub mod listing_handlers;
