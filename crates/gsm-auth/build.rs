//! Generates the `auth.Auth` gRPC server and client.
//!
//! Messages are declared by hand in `src/proto.rs` (mirroring
//! `proto/auth.proto`), so no `protoc` is needed at build time.

use tonic_build::manual::{Builder, Method, Service};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let auth = Service::builder()
        .name("Auth")
        .package("auth")
        .method(
            Method::builder()
                .name("hash_and_store")
                .route_name("HashAndStore")
                .input_type("crate::proto::PhoneNumber")
                .output_type("crate::proto::HashedCode")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    Builder::new().compile(&[auth]);
}
