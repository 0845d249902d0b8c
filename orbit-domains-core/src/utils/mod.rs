//! Small helpers shared across services.

mod token;

pub use token::{
    generate_email_code, generate_verification_token, http_challenge_path, txt_record_name,
};
