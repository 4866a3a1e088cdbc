//! HTTP clients for external services

mod otp_client;


pub use otp_client::HttpOtpApi;
