//! Wire types for the `auth.Auth` service.
//!
//! Field numbers must stay in sync with `proto/auth.proto`.

/// Request: the phone number to fingerprint.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PhoneNumber {
    #[prost(string, tag = "1")]
    pub number: ::prost::alloc::string::String,
}

/// Response: the issued fingerprint.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HashedCode {
    #[prost(string, tag = "1")]
    pub code: ::prost::alloc::string::String,
}

include!(concat!(env!("OUT_DIR"), "/auth.Auth.rs"));
