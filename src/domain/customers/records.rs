//! Customer Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Customer UUID
pub type CustomerUuid = TypedUuid<CustomerRecord>;

/// Customer Record
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub uuid: CustomerUuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_at: Timestamp,

    /// Denormalized count of orders whose customer name equals `name`
    /// exactly. Recomputed whenever the order set changes.
    pub orders_count: u32,
}
