//! DNS provider adapter implementations.

pub mod common;
pub(crate) mod xml;

mod cloudflare;
mod route53;

pub use cloudflare::CloudflareAdapter;
pub use route53::Route53Adapter;
