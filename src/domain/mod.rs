//! Domain entities shared by the repository, service, and API layers.

pub mod address;
pub mod audit;
pub mod cart;
pub mod events;
pub mod order;
pub mod product;

pub use address::Address;
pub use audit::Audit;
pub use cart::CartItem;
pub use events::OrderEvent;
pub use order::{Order, OrderDetail, OrderStatus, PaymentMethod, PaymentStatus};
pub use product::{Category, Product};
