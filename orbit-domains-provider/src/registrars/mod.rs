//! Registrar adapters (domain search, registration, delegation).

mod godaddy;
mod namecheap;

pub use godaddy::GodaddyAdapter;
pub use namecheap::NamecheapAdapter;
