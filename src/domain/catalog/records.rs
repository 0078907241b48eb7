//! Catalog Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
///
/// `name` is the human-facing business key. The schema keeps it as a
/// non-unique indexed column: historical data and racing writers can leave
/// several rows sharing one name, and the reconciler repairs that reactively
/// instead of assuming uniqueness holds.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: u32,
    pub image: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Outcome of a write that went through read-after-write verification.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// The canonical record, as actually stored after the write.
    pub product: ProductRecord,

    /// Whether the read-back confirmed the intended image value.
    pub verification: Verification,
}

/// Result of read-after-write verification.
///
/// `Unconfirmed` is a soft condition: the write has already committed, so the
/// caller must inspect the returned record for the actual stored state rather
/// than treat the operation as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Confirmed,
    Unconfirmed,
}

impl Verification {
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}
