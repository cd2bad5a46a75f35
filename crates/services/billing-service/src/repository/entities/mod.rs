//! SeaORM entities, one module per table.

pub mod device;
pub mod invoice;
pub mod office;
pub mod payment_intent;
pub mod usage_record;
pub mod user;
