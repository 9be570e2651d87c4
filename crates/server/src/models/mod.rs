//! Domain models shared across repositories, services and routes.

pub mod location;
pub mod order;
pub mod product;
pub mod restaurant;

pub use location::Location;
pub use order::{NewOrder, NewOrderLine, Order, OrderLine, OrderWithLines};
pub use product::Product;
pub use restaurant::{MenuEntry, Restaurant};
